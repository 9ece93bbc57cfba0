//! Inter-bank transfer primitives.
//!
//! A transfer is pre-created `pending` and processed later: processing books
//! the debit leg on the source, the credit leg on the destination and an
//! optional fee leg, all inside one transaction. Cancellation is only legal
//! while pending.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterBankTransferStatus {
    Pending,
    Processed,
    Cancelled,
}

impl InterBankTransferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for InterBankTransferStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid transfer status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterBankTransfer {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub date: NaiveDate,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub status: InterBankTransferStatus,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub debit_transaction_id: Option<Uuid>,
    pub credit_transaction_id: Option<Uuid>,
    pub fee_transaction_id: Option<Uuid>,
    pub created_by: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inter_bank_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub date: Date,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub status: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub debit_transaction_id: Option<String>,
    pub credit_transaction_id: Option<String>,
    pub fee_transaction_id: Option<String>,
    pub created_by: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTimeUtc>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InterBankTransfer> for ActiveModel {
    fn from(transfer: &InterBankTransfer) -> Self {
        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            from_account_id: ActiveValue::Set(transfer.from_account_id.to_string()),
            to_account_id: ActiveValue::Set(transfer.to_account_id.to_string()),
            date: ActiveValue::Set(transfer.date),
            amount_minor: ActiveValue::Set(transfer.amount_minor),
            fee_minor: ActiveValue::Set(transfer.fee_minor),
            status: ActiveValue::Set(transfer.status.as_str().to_string()),
            description: ActiveValue::Set(transfer.description.clone()),
            reference: ActiveValue::Set(transfer.reference.clone()),
            debit_transaction_id: ActiveValue::Set(
                transfer.debit_transaction_id.map(|id| id.to_string()),
            ),
            credit_transaction_id: ActiveValue::Set(
                transfer.credit_transaction_id.map(|id| id.to_string()),
            ),
            fee_transaction_id: ActiveValue::Set(
                transfer.fee_transaction_id.map(|id| id.to_string()),
            ),
            created_by: ActiveValue::Set(transfer.created_by.clone()),
            processed_by: ActiveValue::Set(transfer.processed_by.clone()),
            processed_at: ActiveValue::Set(transfer.processed_at),
            cancelled_by: ActiveValue::Set(transfer.cancelled_by.clone()),
            cancelled_at: ActiveValue::Set(transfer.cancelled_at),
            cancel_reason: ActiveValue::Set(transfer.cancel_reason.clone()),
            created_at: ActiveValue::Set(transfer.created_at),
        }
    }
}

impl TryFrom<Model> for InterBankTransfer {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("inter-bank transfer".to_string()))?,
            from_account_id: Uuid::parse_str(&model.from_account_id)
                .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
            to_account_id: Uuid::parse_str(&model.to_account_id)
                .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
            date: model.date,
            amount_minor: model.amount_minor,
            fee_minor: model.fee_minor,
            status: InterBankTransferStatus::try_from(model.status.as_str())?,
            description: model.description,
            reference: model.reference,
            debit_transaction_id: model
                .debit_transaction_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            credit_transaction_id: model
                .credit_transaction_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            fee_transaction_id: model
                .fee_transaction_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            created_by: model.created_by,
            processed_by: model.processed_by,
            processed_at: model.processed_at,
            cancelled_by: model.cancelled_by,
            cancelled_at: model.cancelled_at,
            cancel_reason: model.cancel_reason,
            created_at: model.created_at,
        })
    }
}
