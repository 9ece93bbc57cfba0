//! Bank transaction primitives.
//!
//! Bank transactions mirror the cash movement lifecycle with bank
//! terminology: `pending` rows are confirmed by *clearing* them, and only
//! cleared transactions count toward the account balance or qualify for
//! reconciliation matching.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    Receipt,
}

impl BankTransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::Payment => "payment",
            Self::Receipt => "receipt",
        }
    }

    /// Deposits and receipts add to the balance; everything else draws on it.
    pub fn sign(self) -> i64 {
        match self {
            Self::Deposit | Self::Receipt => 1,
            Self::Withdrawal | Self::Transfer | Self::Payment => -1,
        }
    }
}

impl TryFrom<&str> for BankTransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "transfer" => Ok(Self::Transfer),
            "payment" => Ok(Self::Payment),
            "receipt" => Ok(Self::Receipt),
            other => Err(EngineError::Validation(format!(
                "invalid bank transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionStatus {
    Pending,
    Cleared,
    Cancelled,
}

impl BankTransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleared => "cleared",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for BankTransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "cleared" => Ok(Self::Cleared),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid bank transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: BankTransactionKind,
    pub date: NaiveDate,
    /// Value date reported by the bank, when it differs from the booking date.
    pub value_date: Option<NaiveDate>,
    pub description: String,
    pub amount_minor: i64,
    pub reference: String,
    /// External reference carried by the statement line (cheque number, wire
    /// id). Drives the reference rule of the auto-matcher.
    pub reference_number: Option<String>,
    pub running_balance_minor: Option<i64>,
    pub counterparty_user_id: Option<String>,
    pub status: BankTransactionStatus,
    pub created_by: String,
    pub cleared_by: Option<String>,
    pub cleared_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BankTransaction {
    pub fn signed_amount_minor(&self) -> i64 {
        self.kind.sign() * self.amount_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub date: Date,
    pub value_date: Option<Date>,
    pub description: String,
    pub amount_minor: i64,
    pub reference: String,
    pub reference_number: Option<String>,
    pub running_balance_minor: Option<i64>,
    pub counterparty_user_id: Option<String>,
    pub status: String,
    pub created_by: String,
    pub cleared_by: Option<String>,
    pub cleared_at: Option<DateTimeUtc>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::AccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankAccounts,
    #[sea_orm(has_many = "super::bank_reconciliation_items::Entity")]
    ReconciliationItems,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::bank_reconciliation_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReconciliationItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankTransaction> for ActiveModel {
    fn from(tx: &BankTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            date: ActiveValue::Set(tx.date),
            value_date: ActiveValue::Set(tx.value_date),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            reference: ActiveValue::Set(tx.reference.clone()),
            reference_number: ActiveValue::Set(tx.reference_number.clone()),
            running_balance_minor: ActiveValue::Set(tx.running_balance_minor),
            counterparty_user_id: ActiveValue::Set(tx.counterparty_user_id.clone()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            cleared_by: ActiveValue::Set(tx.cleared_by.clone()),
            cleared_at: ActiveValue::Set(tx.cleared_at),
            cancelled_by: ActiveValue::Set(tx.cancelled_by.clone()),
            cancelled_at: ActiveValue::Set(tx.cancelled_at),
            cancel_reason: ActiveValue::Set(tx.cancel_reason.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for BankTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("bank transaction".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
            kind: BankTransactionKind::try_from(model.kind.as_str())?,
            date: model.date,
            value_date: model.value_date,
            description: model.description,
            amount_minor: model.amount_minor,
            reference: model.reference,
            reference_number: model.reference_number,
            running_balance_minor: model.running_balance_minor,
            counterparty_user_id: model.counterparty_user_id,
            status: BankTransactionStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            cleared_by: model.cleared_by,
            cleared_at: model.cleared_at,
            cancelled_by: model.cancelled_by,
            cancelled_at: model.cancelled_at,
            cancel_reason: model.cancel_reason,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposits_and_receipts_are_inflows() {
        assert_eq!(BankTransactionKind::Deposit.sign(), 1);
        assert_eq!(BankTransactionKind::Receipt.sign(), 1);
        assert_eq!(BankTransactionKind::Withdrawal.sign(), -1);
        assert_eq!(BankTransactionKind::Transfer.sign(), -1);
        assert_eq!(BankTransactionKind::Payment.sign(), -1);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            BankTransactionKind::Deposit,
            BankTransactionKind::Withdrawal,
            BankTransactionKind::Transfer,
            BankTransactionKind::Payment,
            BankTransactionKind::Receipt,
        ] {
            assert_eq!(BankTransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(BankTransactionKind::try_from("income").is_err());
    }
}
