//! Bank reconciliation ("conciliación bancaria") primitives.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Reconciliation of a bank account against one statement.
///
/// `reconciled_balance_minor` accumulates the signed amounts of every
/// transaction matched to this statement (seeded or auto-matched).
/// Completion stamps the absolute difference against the statement balance;
/// unlike the cash arqueo there is no automatic adjustment path — a non-zero
/// difference is left for manual follow-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankReconciliation {
    pub id: Uuid,
    pub account_id: Uuid,
    pub statement_date: NaiveDate,
    pub statement_balance_minor: i64,
    pub reconciled_balance_minor: i64,
    pub is_reconciled: bool,
    pub difference_minor: Option<i64>,
    pub notes: Option<String>,
    pub created_by: String,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_reconciliations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub statement_date: Date,
    pub statement_balance_minor: i64,
    pub reconciled_balance_minor: i64,
    pub is_reconciled: bool,
    pub difference_minor: Option<i64>,
    pub notes: Option<String>,
    pub created_by: String,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTimeUtc>,
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
    Items,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::bank_reconciliation_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankReconciliation> for ActiveModel {
    fn from(recon: &BankReconciliation) -> Self {
        Self {
            id: ActiveValue::Set(recon.id.to_string()),
            account_id: ActiveValue::Set(recon.account_id.to_string()),
            statement_date: ActiveValue::Set(recon.statement_date),
            statement_balance_minor: ActiveValue::Set(recon.statement_balance_minor),
            reconciled_balance_minor: ActiveValue::Set(recon.reconciled_balance_minor),
            is_reconciled: ActiveValue::Set(recon.is_reconciled),
            difference_minor: ActiveValue::Set(recon.difference_minor),
            notes: ActiveValue::Set(recon.notes.clone()),
            created_by: ActiveValue::Set(recon.created_by.clone()),
            completed_by: ActiveValue::Set(recon.completed_by.clone()),
            completed_at: ActiveValue::Set(recon.completed_at),
            created_at: ActiveValue::Set(recon.created_at),
        }
    }
}

impl TryFrom<Model> for BankReconciliation {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("bank reconciliation".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
            statement_date: model.statement_date,
            statement_balance_minor: model.statement_balance_minor,
            reconciled_balance_minor: model.reconciled_balance_minor,
            is_reconciled: model.is_reconciled,
            difference_minor: model.difference_minor,
            notes: model.notes,
            created_by: model.created_by,
            completed_by: model.completed_by,
            completed_at: model.completed_at,
            created_at: model.created_at,
        })
    }
}
