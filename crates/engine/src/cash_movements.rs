//! Cash movement primitives.
//!
//! A movement is a single signed monetary event against one cash account.
//! It is inserted `pending`, affects the account balance exactly once when
//! confirmed, and a later cancellation reverses that contribution.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    Income,
    Expense,
    TransferIn,
    TransferOut,
}

impl CashMovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
        }
    }

    /// Sign applied to the unsigned amount when the movement hits the balance.
    pub fn sign(self) -> i64 {
        match self {
            Self::Income | Self::TransferIn => 1,
            Self::Expense | Self::TransferOut => -1,
        }
    }
}

impl TryFrom<&str> for CashMovementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer_in" => Ok(Self::TransferIn),
            "transfer_out" => Ok(Self::TransferOut),
            other => Err(EngineError::Validation(format!(
                "invalid cash movement kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl CashMovementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for CashMovementStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid movement status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: CashMovementKind,
    pub date: NaiveDate,
    pub description: String,
    /// Unsigned amount; the kind decides the sign.
    pub amount_minor: i64,
    /// Sequential human-readable reference, unique per account.
    pub reference: String,
    /// Balance snapshot taken the moment the movement was confirmed.
    pub running_balance_minor: Option<i64>,
    pub counterparty_user_id: Option<String>,
    pub status: CashMovementStatus,
    pub created_by: String,
    pub confirmed_by: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    /// The amount with the kind's sign applied.
    pub fn signed_amount_minor(&self) -> i64 {
        self.kind.sign() * self.amount_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub date: Date,
    pub description: String,
    pub amount_minor: i64,
    pub reference: String,
    pub running_balance_minor: Option<i64>,
    pub counterparty_user_id: Option<String>,
    pub status: String,
    pub created_by: String,
    pub confirmed_by: Option<String>,
    pub confirmed_at: Option<DateTimeUtc>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_accounts::Entity",
        from = "Column::AccountId",
        to = "super::cash_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CashAccounts,
}

impl Related<super::cash_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashMovement> for ActiveModel {
    fn from(movement: &CashMovement) -> Self {
        Self {
            id: ActiveValue::Set(movement.id.to_string()),
            account_id: ActiveValue::Set(movement.account_id.to_string()),
            kind: ActiveValue::Set(movement.kind.as_str().to_string()),
            date: ActiveValue::Set(movement.date),
            description: ActiveValue::Set(movement.description.clone()),
            amount_minor: ActiveValue::Set(movement.amount_minor),
            reference: ActiveValue::Set(movement.reference.clone()),
            running_balance_minor: ActiveValue::Set(movement.running_balance_minor),
            counterparty_user_id: ActiveValue::Set(movement.counterparty_user_id.clone()),
            status: ActiveValue::Set(movement.status.as_str().to_string()),
            created_by: ActiveValue::Set(movement.created_by.clone()),
            confirmed_by: ActiveValue::Set(movement.confirmed_by.clone()),
            confirmed_at: ActiveValue::Set(movement.confirmed_at),
            cancelled_by: ActiveValue::Set(movement.cancelled_by.clone()),
            cancelled_at: ActiveValue::Set(movement.cancelled_at),
            cancel_reason: ActiveValue::Set(movement.cancel_reason.clone()),
            created_at: ActiveValue::Set(movement.created_at),
        }
    }
}

impl TryFrom<Model> for CashMovement {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("cash movement".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::NotFound("cash account".to_string()))?,
            kind: CashMovementKind::try_from(model.kind.as_str())?,
            date: model.date,
            description: model.description,
            amount_minor: model.amount_minor,
            reference: model.reference,
            running_balance_minor: model.running_balance_minor,
            counterparty_user_id: model.counterparty_user_id,
            status: CashMovementStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            confirmed_by: model.confirmed_by,
            confirmed_at: model.confirmed_at,
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
    fn kind_signs() {
        assert_eq!(CashMovementKind::Income.sign(), 1);
        assert_eq!(CashMovementKind::TransferIn.sign(), 1);
        assert_eq!(CashMovementKind::Expense.sign(), -1);
        assert_eq!(CashMovementKind::TransferOut.sign(), -1);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            CashMovementKind::Income,
            CashMovementKind::Expense,
            CashMovementKind::TransferIn,
            CashMovementKind::TransferOut,
        ] {
            assert_eq!(CashMovementKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(CashMovementKind::try_from("deposit").is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            CashMovementStatus::Pending,
            CashMovementStatus::Confirmed,
            CashMovementStatus::Cancelled,
        ] {
            assert_eq!(
                CashMovementStatus::try_from(status.as_str()).unwrap(),
                status
            );
        }
    }
}
