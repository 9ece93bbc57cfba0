//! Transfer coordinator: two-leg operations over the movement ledger.
//!
//! Both legs of a transfer run in one transaction, so either both balances
//! move or neither does. Account rows are locked in ascending id order
//! before any write; two concurrent opposite-direction transfers therefore
//! queue on the same first lock instead of deadlocking.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BankTransactionCmd, BankTransactionKind, CashMovement, CashMovementCmd, CashMovementKind,
    CashTransferCmd, EngineError, InterBankTransfer, InterBankTransferCmd,
    InterBankTransferStatus, ResultEngine, inter_bank_transfers,
};

use super::{Engine, ensure_positive_amount, normalize_required_text, with_tx};

impl Engine {
    /// Moves cash between two cash accounts: a confirmed transfer-out on the
    /// source and a confirmed transfer-in on the destination, atomically.
    pub async fn transfer_cash(
        &self,
        cmd: CashTransferCmd,
    ) -> ResultEngine<(CashMovement, CashMovement)> {
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::Validation(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        ensure_positive_amount(cmd.amount_minor)?;
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            self.lock_cash_pair(&db_tx, cmd.from_account_id, cmd.to_account_id)
                .await?;

            let source = self.lock_cash_account(&db_tx, cmd.from_account_id).await?;
            if source.balance_minor < cmd.amount_minor {
                // Early reject; apply_cash_delta re-validates on the same
                // locked row when the leg confirms.
                return Err(EngineError::InsufficientFunds(source.code));
            }

            let out_cmd = CashMovementCmd::new(
                cmd.from_account_id,
                CashMovementKind::TransferOut,
                cmd.date,
                description.clone(),
                cmd.amount_minor,
                cmd.created_by.clone(),
            );
            let out_id = self
                .create_cash_movement_tx(&db_tx, &out_cmd, &description)
                .await?;
            let out = self
                .confirm_cash_movement_tx(&db_tx, out_id, &cmd.created_by)
                .await?;

            let in_cmd = CashMovementCmd::new(
                cmd.to_account_id,
                CashMovementKind::TransferIn,
                cmd.date,
                description.clone(),
                cmd.amount_minor,
                cmd.created_by.clone(),
            );
            let in_id = self
                .create_cash_movement_tx(&db_tx, &in_cmd, &description)
                .await?;
            let incoming = self
                .confirm_cash_movement_tx(&db_tx, in_id, &cmd.created_by)
                .await?;

            Ok((out, incoming))
        })
    }

    /// Pre-creates a pending inter-bank transfer record.
    pub async fn create_inter_bank_transfer(
        &self,
        cmd: InterBankTransferCmd,
    ) -> ResultEngine<InterBankTransfer> {
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::Validation(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        ensure_positive_amount(cmd.amount_minor)?;
        if cmd.fee_minor < 0 {
            return Err(EngineError::Validation("fee_minor must be >= 0".to_string()));
        }

        with_tx!(self, |db_tx| {
            let source = self.lock_bank_account(&db_tx, cmd.from_account_id).await?;
            if !source.active {
                return Err(EngineError::InactiveRef(format!(
                    "bank account {}",
                    source.code
                )));
            }
            let dest = self.lock_bank_account(&db_tx, cmd.to_account_id).await?;
            if !dest.active {
                return Err(EngineError::InactiveRef(format!(
                    "bank account {}",
                    dest.code
                )));
            }

            let transfer = InterBankTransfer {
                id: Uuid::new_v4(),
                from_account_id: cmd.from_account_id,
                to_account_id: cmd.to_account_id,
                date: cmd.date,
                amount_minor: cmd.amount_minor,
                fee_minor: cmd.fee_minor,
                status: InterBankTransferStatus::Pending,
                description: super::normalize_optional_text(cmd.description.as_deref()),
                reference: super::normalize_optional_text(cmd.reference.as_deref()),
                debit_transaction_id: None,
                credit_transaction_id: None,
                fee_transaction_id: None,
                created_by: cmd.created_by.clone(),
                processed_by: None,
                processed_at: None,
                cancelled_by: None,
                cancelled_at: None,
                cancel_reason: None,
                created_at: Utc::now(),
            };
            inter_bank_transfers::ActiveModel::from(&transfer)
                .insert(&db_tx)
                .await?;
            Ok(transfer)
        })
    }

    /// Processes a pending inter-bank transfer: debit leg on the source,
    /// credit leg on the destination and a fee leg when a non-zero fee was
    /// agreed — all cleared inside one transaction.
    pub async fn process_inter_bank_transfer(
        &self,
        transfer_id: Uuid,
        actor: &str,
    ) -> ResultEngine<InterBankTransfer> {
        with_tx!(self, |db_tx| {
            let transfer = self.find_inter_bank_transfer_tx(&db_tx, transfer_id).await?;
            if transfer.status != InterBankTransferStatus::Pending {
                return Err(EngineError::Conflict(format!(
                    "transfer is {}, expected pending",
                    transfer.status.as_str()
                )));
            }

            self.lock_bank_pair(&db_tx, transfer.from_account_id, transfer.to_account_id)
                .await?;

            let source = self
                .lock_bank_account(&db_tx, transfer.from_account_id)
                .await?;
            let dest = self.lock_bank_account(&db_tx, transfer.to_account_id).await?;
            if source.balance_minor < transfer.amount_minor + transfer.fee_minor {
                return Err(EngineError::InsufficientFunds(source.code));
            }

            let description = transfer
                .description
                .clone()
                .unwrap_or_else(|| format!("Transfer to {}", dest.code));

            let debit_cmd = BankTransactionCmd::new(
                transfer.from_account_id,
                BankTransactionKind::Transfer,
                transfer.date,
                description.clone(),
                transfer.amount_minor,
                actor.to_string(),
            );
            let debit_id = self
                .create_bank_transaction_tx(&db_tx, &debit_cmd, &description)
                .await?;
            self.clear_bank_transaction_tx(&db_tx, debit_id, actor)
                .await?;

            let credit_description = transfer
                .description
                .clone()
                .unwrap_or_else(|| format!("Transfer from {}", source.code));
            let credit_cmd = BankTransactionCmd::new(
                transfer.to_account_id,
                BankTransactionKind::Deposit,
                transfer.date,
                credit_description.clone(),
                transfer.amount_minor,
                actor.to_string(),
            );
            let credit_id = self
                .create_bank_transaction_tx(&db_tx, &credit_cmd, &credit_description)
                .await?;
            self.clear_bank_transaction_tx(&db_tx, credit_id, actor)
                .await?;

            let fee_id = if transfer.fee_minor > 0 {
                let fee_description = format!("Transfer fee ({})", dest.code);
                let fee_cmd = BankTransactionCmd::new(
                    transfer.from_account_id,
                    BankTransactionKind::Payment,
                    transfer.date,
                    fee_description.clone(),
                    transfer.fee_minor,
                    actor.to_string(),
                );
                let id = self
                    .create_bank_transaction_tx(&db_tx, &fee_cmd, &fee_description)
                    .await?;
                self.clear_bank_transaction_tx(&db_tx, id, actor).await?;
                Some(id)
            } else {
                None
            };

            let update = inter_bank_transfers::ActiveModel {
                id: ActiveValue::Set(transfer.id.to_string()),
                status: ActiveValue::Set(InterBankTransferStatus::Processed.as_str().to_string()),
                debit_transaction_id: ActiveValue::Set(Some(debit_id.to_string())),
                credit_transaction_id: ActiveValue::Set(Some(credit_id.to_string())),
                fee_transaction_id: ActiveValue::Set(fee_id.map(|id| id.to_string())),
                processed_by: ActiveValue::Set(Some(actor.to_string())),
                processed_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            InterBankTransfer::try_from(updated)
        })
    }

    /// Cancels an inter-bank transfer; legal only while pending.
    pub async fn cancel_inter_bank_transfer(
        &self,
        transfer_id: Uuid,
        actor: &str,
        reason: Option<&str>,
    ) -> ResultEngine<InterBankTransfer> {
        let reason = super::normalize_optional_text(reason);
        with_tx!(self, |db_tx| {
            let transfer = self.find_inter_bank_transfer_tx(&db_tx, transfer_id).await?;
            if transfer.status != InterBankTransferStatus::Pending {
                return Err(EngineError::Conflict(format!(
                    "transfer is {}, only pending transfers can be cancelled",
                    transfer.status.as_str()
                )));
            }

            let update = inter_bank_transfers::ActiveModel {
                id: ActiveValue::Set(transfer.id.to_string()),
                status: ActiveValue::Set(InterBankTransferStatus::Cancelled.as_str().to_string()),
                cancelled_by: ActiveValue::Set(Some(actor.to_string())),
                cancelled_at: ActiveValue::Set(Some(Utc::now())),
                cancel_reason: ActiveValue::Set(reason.clone()),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            InterBankTransfer::try_from(updated)
        })
    }

    // Locks both rows of a two-leg cash operation in ascending id order.
    async fn lock_cash_pair(
        &self,
        db_tx: &DatabaseTransaction,
        a: Uuid,
        b: Uuid,
    ) -> ResultEngine<()> {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_model = self.lock_cash_account(db_tx, first).await?;
        let second_model = self.lock_cash_account(db_tx, second).await?;
        for model in [&first_model, &second_model] {
            if !model.active {
                return Err(EngineError::InactiveRef(format!(
                    "cash account {}",
                    model.code
                )));
            }
        }
        Ok(())
    }

    async fn lock_bank_pair(
        &self,
        db_tx: &DatabaseTransaction,
        a: Uuid,
        b: Uuid,
    ) -> ResultEngine<()> {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_model = self.lock_bank_account(db_tx, first).await?;
        let second_model = self.lock_bank_account(db_tx, second).await?;
        for model in [&first_model, &second_model] {
            if !model.active {
                return Err(EngineError::InactiveRef(format!(
                    "bank account {}",
                    model.code
                )));
            }
        }
        Ok(())
    }

    pub(super) async fn find_inter_bank_transfer_tx(
        &self,
        db_tx: &DatabaseTransaction,
        transfer_id: Uuid,
    ) -> ResultEngine<InterBankTransfer> {
        let model = inter_bank_transfers::Entity::find_by_id(transfer_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("inter-bank transfer".to_string()))?;
        InterBankTransfer::try_from(model)
    }
}
