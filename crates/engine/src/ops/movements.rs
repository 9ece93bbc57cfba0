//! Movement ledger: lifecycle of cash movements and bank transactions.
//!
//! State machine, both variants: `pending → confirmed/cleared`,
//! `pending → cancelled`, `confirmed/cleared → cancelled` (reversal).
//! Terminal states accept no further transitions; a repeated confirm or
//! cancel fails with a state conflict instead of touching any balance.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BankTransaction, BankTransactionCmd, BankTransactionStatus, CashMovement, CashMovementCmd,
    CashMovementStatus, EngineError, ResultEngine, bank_reconciliation_items, bank_transactions,
    cash_movements,
};

use super::{Engine, ensure_positive_amount, normalize_required_text, with_tx};

impl Engine {
    /// Creates a cash movement as `pending`; with `auto_confirm` the confirm
    /// transition runs in the same transaction.
    pub async fn create_cash_movement(&self, cmd: CashMovementCmd) -> ResultEngine<CashMovement> {
        ensure_positive_amount(cmd.amount_minor)?;
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let id = self
                .create_cash_movement_tx(&db_tx, &cmd, &description)
                .await?;
            if cmd.auto_confirm {
                self.confirm_cash_movement_tx(&db_tx, id, &cmd.created_by)
                    .await
            } else {
                self.find_cash_movement_tx(&db_tx, id).await
            }
        })
    }

    /// Inserts the pending row inside the caller's transaction. Shared by
    /// the public create, the transfer coordinator and the arqueo
    /// adjustment path.
    pub(super) async fn create_cash_movement_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CashMovementCmd,
        description: &str,
    ) -> ResultEngine<Uuid> {
        let account = self.lock_cash_account(db_tx, cmd.account_id).await?;
        if !account.active {
            return Err(EngineError::InactiveRef(format!(
                "cash account {}",
                account.code
            )));
        }
        if let Some(user_id) = cmd.counterparty_user_id.as_deref() {
            self.require_active_user(db_tx, user_id).await?;
        }

        let reference = match cmd.reference.as_deref() {
            Some(reference) => {
                let reference = normalize_required_text(reference, "reference")?;
                let duplicate = cash_movements::Entity::find()
                    .filter(cash_movements::Column::AccountId.eq(account.id.clone()))
                    .filter(cash_movements::Column::Reference.eq(reference.clone()))
                    .one(db_tx)
                    .await?;
                if duplicate.is_some() {
                    return Err(EngineError::Conflict(format!(
                        "reference {reference} already used on {}",
                        account.code
                    )));
                }
                reference
            }
            None => self.next_cash_reference(db_tx, cmd.account_id).await?,
        };

        let movement = CashMovement {
            id: Uuid::new_v4(),
            account_id: cmd.account_id,
            kind: cmd.kind,
            date: cmd.date,
            description: description.to_string(),
            amount_minor: cmd.amount_minor,
            reference,
            running_balance_minor: None,
            counterparty_user_id: cmd.counterparty_user_id.clone(),
            status: CashMovementStatus::Pending,
            created_by: cmd.created_by.clone(),
            confirmed_by: None,
            confirmed_at: None,
            cancelled_by: None,
            cancelled_at: None,
            cancel_reason: None,
            created_at: Utc::now(),
        };
        cash_movements::ActiveModel::from(&movement)
            .insert(db_tx)
            .await?;
        Ok(movement.id)
    }

    /// Confirms a pending cash movement, applying its signed amount to the
    /// account balance.
    pub async fn confirm_cash_movement(
        &self,
        movement_id: Uuid,
        actor: &str,
    ) -> ResultEngine<CashMovement> {
        with_tx!(self, |db_tx| {
            self.confirm_cash_movement_tx(&db_tx, movement_id, actor)
                .await
        })
    }

    pub(super) async fn confirm_cash_movement_tx(
        &self,
        db_tx: &DatabaseTransaction,
        movement_id: Uuid,
        actor: &str,
    ) -> ResultEngine<CashMovement> {
        let movement = self.find_cash_movement_tx(db_tx, movement_id).await?;
        if movement.status != CashMovementStatus::Pending {
            return Err(EngineError::Conflict(format!(
                "movement {} is {}, expected pending",
                movement.reference,
                movement.status.as_str()
            )));
        }

        let new_balance = self
            .apply_cash_delta(db_tx, movement.account_id, movement.signed_amount_minor())
            .await?;

        let update = cash_movements::ActiveModel {
            id: ActiveValue::Set(movement.id.to_string()),
            status: ActiveValue::Set(CashMovementStatus::Confirmed.as_str().to_string()),
            running_balance_minor: ActiveValue::Set(Some(new_balance)),
            confirmed_by: ActiveValue::Set(Some(actor.to_string())),
            confirmed_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        };
        let updated = update.update(db_tx).await?;
        CashMovement::try_from(updated)
    }

    /// Cancels a cash movement.
    ///
    /// A confirmed movement has its signed contribution reversed before the
    /// row turns `cancelled`; a pending one is marked with no balance
    /// effect; a cancelled one is rejected.
    pub async fn cancel_cash_movement(
        &self,
        movement_id: Uuid,
        actor: &str,
        reason: Option<&str>,
    ) -> ResultEngine<CashMovement> {
        let reason = super::normalize_optional_text(reason);
        with_tx!(self, |db_tx| {
            let movement = self.find_cash_movement_tx(&db_tx, movement_id).await?;
            match movement.status {
                CashMovementStatus::Cancelled => {
                    return Err(EngineError::Conflict(format!(
                        "movement {} is already cancelled",
                        movement.reference
                    )));
                }
                CashMovementStatus::Confirmed => {
                    self.apply_cash_delta(
                        &db_tx,
                        movement.account_id,
                        -movement.signed_amount_minor(),
                    )
                    .await?;
                }
                CashMovementStatus::Pending => {}
            }

            let update = cash_movements::ActiveModel {
                id: ActiveValue::Set(movement.id.to_string()),
                status: ActiveValue::Set(CashMovementStatus::Cancelled.as_str().to_string()),
                cancelled_by: ActiveValue::Set(Some(actor.to_string())),
                cancelled_at: ActiveValue::Set(Some(Utc::now())),
                cancel_reason: ActiveValue::Set(reason.clone()),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            CashMovement::try_from(updated)
        })
    }

    pub(super) async fn find_cash_movement_tx(
        &self,
        db_tx: &DatabaseTransaction,
        movement_id: Uuid,
    ) -> ResultEngine<CashMovement> {
        let model = cash_movements::Entity::find_by_id(movement_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash movement".to_string()))?;
        CashMovement::try_from(model)
    }

    /// Creates a bank transaction as `pending`; with `auto_clear` the clear
    /// transition runs in the same transaction.
    pub async fn create_bank_transaction(
        &self,
        cmd: BankTransactionCmd,
    ) -> ResultEngine<BankTransaction> {
        ensure_positive_amount(cmd.amount_minor)?;
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let id = self
                .create_bank_transaction_tx(&db_tx, &cmd, &description)
                .await?;
            if cmd.auto_clear {
                self.clear_bank_transaction_tx(&db_tx, id, &cmd.created_by)
                    .await
            } else {
                self.find_bank_transaction_tx(&db_tx, id).await
            }
        })
    }

    pub(super) async fn create_bank_transaction_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &BankTransactionCmd,
        description: &str,
    ) -> ResultEngine<Uuid> {
        let account = self.lock_bank_account(db_tx, cmd.account_id).await?;
        if !account.active {
            return Err(EngineError::InactiveRef(format!(
                "bank account {}",
                account.code
            )));
        }
        if let Some(user_id) = cmd.counterparty_user_id.as_deref() {
            self.require_active_user(db_tx, user_id).await?;
        }

        let reference = match cmd.reference.as_deref() {
            Some(reference) => {
                let reference = normalize_required_text(reference, "reference")?;
                let duplicate = bank_transactions::Entity::find()
                    .filter(bank_transactions::Column::AccountId.eq(account.id.clone()))
                    .filter(bank_transactions::Column::Reference.eq(reference.clone()))
                    .one(db_tx)
                    .await?;
                if duplicate.is_some() {
                    return Err(EngineError::Conflict(format!(
                        "reference {reference} already used on {}",
                        account.code
                    )));
                }
                reference
            }
            None => self.next_bank_reference(db_tx, cmd.account_id).await?,
        };

        let tx = BankTransaction {
            id: Uuid::new_v4(),
            account_id: cmd.account_id,
            kind: cmd.kind,
            date: cmd.date,
            value_date: cmd.value_date,
            description: description.to_string(),
            amount_minor: cmd.amount_minor,
            reference,
            reference_number: cmd.reference_number.clone(),
            running_balance_minor: None,
            counterparty_user_id: cmd.counterparty_user_id.clone(),
            status: BankTransactionStatus::Pending,
            created_by: cmd.created_by.clone(),
            cleared_by: None,
            cleared_at: None,
            cancelled_by: None,
            cancelled_at: None,
            cancel_reason: None,
            created_at: Utc::now(),
        };
        bank_transactions::ActiveModel::from(&tx).insert(db_tx).await?;
        Ok(tx.id)
    }

    /// Clears a pending bank transaction, applying its signed amount to the
    /// account balance.
    pub async fn clear_bank_transaction(
        &self,
        transaction_id: Uuid,
        actor: &str,
    ) -> ResultEngine<BankTransaction> {
        with_tx!(self, |db_tx| {
            self.clear_bank_transaction_tx(&db_tx, transaction_id, actor)
                .await
        })
    }

    pub(super) async fn clear_bank_transaction_tx(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        actor: &str,
    ) -> ResultEngine<BankTransaction> {
        let tx = self.find_bank_transaction_tx(db_tx, transaction_id).await?;
        if tx.status != BankTransactionStatus::Pending {
            return Err(EngineError::Conflict(format!(
                "transaction {} is {}, expected pending",
                tx.reference,
                tx.status.as_str()
            )));
        }

        let new_balance = self
            .apply_bank_delta(db_tx, tx.account_id, tx.signed_amount_minor())
            .await?;

        let update = bank_transactions::ActiveModel {
            id: ActiveValue::Set(tx.id.to_string()),
            status: ActiveValue::Set(BankTransactionStatus::Cleared.as_str().to_string()),
            running_balance_minor: ActiveValue::Set(Some(new_balance)),
            cleared_by: ActiveValue::Set(Some(actor.to_string())),
            cleared_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        };
        let updated = update.update(db_tx).await?;
        BankTransaction::try_from(updated)
    }

    /// Cancels a bank transaction, reversing the balance effect of a cleared
    /// one. Transactions already committed to a reconciliation stay put.
    pub async fn cancel_bank_transaction(
        &self,
        transaction_id: Uuid,
        actor: &str,
        reason: Option<&str>,
    ) -> ResultEngine<BankTransaction> {
        let reason = super::normalize_optional_text(reason);
        with_tx!(self, |db_tx| {
            let tx = self.find_bank_transaction_tx(&db_tx, transaction_id).await?;
            match tx.status {
                BankTransactionStatus::Cancelled => {
                    return Err(EngineError::Conflict(format!(
                        "transaction {} is already cancelled",
                        tx.reference
                    )));
                }
                BankTransactionStatus::Cleared => {
                    let reconciled = bank_reconciliation_items::Entity::find()
                        .filter(
                            bank_reconciliation_items::Column::TransactionId
                                .eq(tx.id.to_string()),
                        )
                        .filter(bank_reconciliation_items::Column::IsReconciled.eq(true))
                        .one(&db_tx)
                        .await?;
                    if reconciled.is_some() {
                        return Err(EngineError::Conflict(format!(
                            "transaction {} is tied to a reconciliation",
                            tx.reference
                        )));
                    }
                    self.apply_bank_delta(&db_tx, tx.account_id, -tx.signed_amount_minor())
                        .await?;
                }
                BankTransactionStatus::Pending => {}
            }

            let update = bank_transactions::ActiveModel {
                id: ActiveValue::Set(tx.id.to_string()),
                status: ActiveValue::Set(BankTransactionStatus::Cancelled.as_str().to_string()),
                cancelled_by: ActiveValue::Set(Some(actor.to_string())),
                cancelled_at: ActiveValue::Set(Some(Utc::now())),
                cancel_reason: ActiveValue::Set(reason.clone()),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            BankTransaction::try_from(updated)
        })
    }

    pub(super) async fn find_bank_transaction_tx(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<BankTransaction> {
        let model = bank_transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank transaction".to_string()))?;
        BankTransaction::try_from(model)
    }
}
