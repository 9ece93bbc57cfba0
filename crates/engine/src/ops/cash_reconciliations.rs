//! Cash reconciliation (arqueo) operations.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CashMovementCmd, CashMovementKind, CashReconciliation, CashReconciliationCmd, EngineError,
    ResultEngine, cash_reconciliations,
    cash_reconciliations::{ReconciliationOutcome, ReconciliationStatus},
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Opens an arqueo: snapshots the account balance under lock, records
    /// the physical count and classifies the signed difference.
    ///
    /// Only one pending arqueo may exist per account and date.
    pub async fn create_cash_reconciliation(
        &self,
        cmd: CashReconciliationCmd,
    ) -> ResultEngine<CashReconciliation> {
        if cmd.counted_minor < 0 {
            return Err(EngineError::Validation(
                "counted_minor must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let account = self.lock_cash_account(&db_tx, cmd.account_id).await?;
            if !account.active {
                return Err(EngineError::InactiveRef(format!(
                    "cash account {}",
                    account.code
                )));
            }

            let duplicate = cash_reconciliations::Entity::find()
                .filter(cash_reconciliations::Column::AccountId.eq(account.id.clone()))
                .filter(cash_reconciliations::Column::Date.eq(cmd.date))
                .filter(
                    cash_reconciliations::Column::Status
                        .eq(ReconciliationStatus::Pending.as_str()),
                )
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Conflict(format!(
                    "a pending reconciliation already exists for {} on {}",
                    account.code, cmd.date
                )));
            }

            let difference_minor = cmd.counted_minor - account.balance_minor;
            let arqueo = CashReconciliation {
                id: Uuid::new_v4(),
                account_id: cmd.account_id,
                date: cmd.date,
                system_balance_minor: account.balance_minor,
                counted_minor: cmd.counted_minor,
                difference_minor,
                outcome: ReconciliationOutcome::classify(difference_minor),
                status: ReconciliationStatus::Pending,
                notes: normalize_optional_text(cmd.notes.as_deref()),
                adjustment_movement_id: None,
                created_by: cmd.created_by.clone(),
                approved_by: None,
                approved_at: None,
                created_at: Utc::now(),
            };
            cash_reconciliations::ActiveModel::from(&arqueo)
                .insert(&db_tx)
                .await?;
            Ok(arqueo)
        })
    }

    /// Approves a pending arqueo.
    ///
    /// With `create_adjustment` and a non-zero difference, exactly one
    /// corrective movement for the absolute difference is posted and
    /// auto-confirmed (income on overage, expense on shortage) and the
    /// arqueo turns `adjusted`; otherwise it turns `approved`. Movement and
    /// status change share one transaction.
    pub async fn approve_cash_reconciliation(
        &self,
        reconciliation_id: Uuid,
        actor: &str,
        create_adjustment: bool,
    ) -> ResultEngine<CashReconciliation> {
        with_tx!(self, |db_tx| {
            let arqueo = self
                .find_cash_reconciliation_tx(&db_tx, reconciliation_id)
                .await?;
            if arqueo.status != ReconciliationStatus::Pending {
                return Err(EngineError::Conflict(format!(
                    "reconciliation is {}, expected pending",
                    arqueo.status.as_str()
                )));
            }

            let mut adjustment_movement_id = None;
            let status = if create_adjustment && arqueo.difference_minor != 0 {
                let kind = if arqueo.difference_minor > 0 {
                    CashMovementKind::Income
                } else {
                    CashMovementKind::Expense
                };
                let description = format!(
                    "Cash count adjustment ({})",
                    arqueo.outcome.as_str()
                );
                let movement_cmd = CashMovementCmd::new(
                    arqueo.account_id,
                    kind,
                    arqueo.date,
                    description.clone(),
                    arqueo.difference_minor.abs(),
                    actor.to_string(),
                );
                let movement_id = self
                    .create_cash_movement_tx(&db_tx, &movement_cmd, &description)
                    .await?;
                self.confirm_cash_movement_tx(&db_tx, movement_id, actor)
                    .await?;
                adjustment_movement_id = Some(movement_id);
                ReconciliationStatus::Adjusted
            } else {
                ReconciliationStatus::Approved
            };

            let update = cash_reconciliations::ActiveModel {
                id: ActiveValue::Set(arqueo.id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                adjustment_movement_id: ActiveValue::Set(
                    adjustment_movement_id.map(|id: Uuid| id.to_string()),
                ),
                approved_by: ActiveValue::Set(Some(actor.to_string())),
                approved_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            CashReconciliation::try_from(updated)
        })
    }

    pub(super) async fn find_cash_reconciliation_tx(
        &self,
        db_tx: &DatabaseTransaction,
        reconciliation_id: Uuid,
    ) -> ResultEngine<CashReconciliation> {
        let model = cash_reconciliations::Entity::find_by_id(reconciliation_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash reconciliation".to_string()))?;
        CashReconciliation::try_from(model)
    }
}
