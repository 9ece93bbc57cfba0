//! Cash reconciliation ("arqueo") primitives.
//!
//! An arqueo freezes the account balance as a snapshot, records the physical
//! count and classifies the signed difference. Approval may post a single
//! corrective movement for the absolute difference.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Sign classification of `counted − system`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    Balanced,
    Overage,
    Shortage,
}

impl ReconciliationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Overage => "overage",
            Self::Shortage => "shortage",
        }
    }

    /// Classifies a signed difference; balanced only at exactly zero.
    pub fn classify(difference_minor: i64) -> Self {
        match difference_minor {
            0 => Self::Balanced,
            d if d > 0 => Self::Overage,
            _ => Self::Shortage,
        }
    }
}

impl TryFrom<&str> for ReconciliationOutcome {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "balanced" => Ok(Self::Balanced),
            "overage" => Ok(Self::Overage),
            "shortage" => Ok(Self::Shortage),
            other => Err(EngineError::Validation(format!(
                "invalid reconciliation outcome: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    Pending,
    Approved,
    Adjusted,
}

impl ReconciliationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Adjusted => "adjusted",
        }
    }
}

impl TryFrom<&str> for ReconciliationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "adjusted" => Ok(Self::Adjusted),
            other => Err(EngineError::Validation(format!(
                "invalid reconciliation status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashReconciliation {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    /// Account balance at creation time; the arqueo compares against this
    /// snapshot, not the live balance.
    pub system_balance_minor: i64,
    pub counted_minor: i64,
    /// Signed `counted − system`; callers wanting the absolute difference
    /// take `difference_minor.abs()`.
    pub difference_minor: i64,
    pub outcome: ReconciliationOutcome,
    pub status: ReconciliationStatus,
    pub notes: Option<String>,
    pub adjustment_movement_id: Option<Uuid>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_reconciliations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub date: Date,
    pub system_balance_minor: i64,
    pub counted_minor: i64,
    pub difference_minor: i64,
    pub outcome: String,
    pub status: String,
    pub notes: Option<String>,
    pub adjustment_movement_id: Option<String>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
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

impl From<&CashReconciliation> for ActiveModel {
    fn from(arqueo: &CashReconciliation) -> Self {
        Self {
            id: ActiveValue::Set(arqueo.id.to_string()),
            account_id: ActiveValue::Set(arqueo.account_id.to_string()),
            date: ActiveValue::Set(arqueo.date),
            system_balance_minor: ActiveValue::Set(arqueo.system_balance_minor),
            counted_minor: ActiveValue::Set(arqueo.counted_minor),
            difference_minor: ActiveValue::Set(arqueo.difference_minor),
            outcome: ActiveValue::Set(arqueo.outcome.as_str().to_string()),
            status: ActiveValue::Set(arqueo.status.as_str().to_string()),
            notes: ActiveValue::Set(arqueo.notes.clone()),
            adjustment_movement_id: ActiveValue::Set(
                arqueo.adjustment_movement_id.map(|id| id.to_string()),
            ),
            created_by: ActiveValue::Set(arqueo.created_by.clone()),
            approved_by: ActiveValue::Set(arqueo.approved_by.clone()),
            approved_at: ActiveValue::Set(arqueo.approved_at),
            created_at: ActiveValue::Set(arqueo.created_at),
        }
    }
}

impl TryFrom<Model> for CashReconciliation {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("cash reconciliation".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::NotFound("cash account".to_string()))?,
            date: model.date,
            system_balance_minor: model.system_balance_minor,
            counted_minor: model.counted_minor,
            difference_minor: model.difference_minor,
            outcome: ReconciliationOutcome::try_from(model.outcome.as_str())?,
            status: ReconciliationStatus::try_from(model.status.as_str())?,
            notes: model.notes,
            adjustment_movement_id: model
                .adjustment_movement_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            created_by: model.created_by,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_balanced_only_at_zero() {
        assert_eq!(
            ReconciliationOutcome::classify(0),
            ReconciliationOutcome::Balanced
        );
        assert_eq!(
            ReconciliationOutcome::classify(1),
            ReconciliationOutcome::Overage
        );
        assert_eq!(
            ReconciliationOutcome::classify(-1),
            ReconciliationOutcome::Shortage
        );
        assert_eq!(
            ReconciliationOutcome::classify(-5000),
            ReconciliationOutcome::Shortage
        );
    }
}
