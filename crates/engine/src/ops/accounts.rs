//! Account registry: creation, deactivation and the balance delta path.
//!
//! `apply_cash_delta` / `apply_bank_delta` are the only writers of the
//! balance columns. They always run inside the caller's transaction, against
//! a row locked by the access helpers, so concurrent confirmations against
//! the same account serialize instead of racing on a stale balance.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BankAccount, CashAccount, EngineError, NewBankAccountCmd, NewCashAccountCmd, ResultEngine,
    bank_accounts, bank_transactions, cash_accounts, cash_movements,
    cash_movements::CashMovementStatus,
};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Creates a cash account.
    ///
    /// Rejects duplicate codes and broken references (currency, ledger
    /// account, responsible user).
    pub async fn create_cash_account(&self, cmd: NewCashAccountCmd) -> ResultEngine<CashAccount> {
        let code = normalize_required_text(&cmd.code, "account code")?;
        let name = normalize_required_text(&cmd.name, "account name")?;
        if cmd.initial_balance_minor < 0 {
            return Err(EngineError::Validation(
                "initial balance must be >= 0".to_string(),
            ));
        }
        if let Some(max) = cmd.max_amount_minor
            && max < cmd.initial_balance_minor
        {
            return Err(EngineError::Validation(
                "maximum amount must cover the initial balance".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let duplicate = cash_accounts::Entity::find()
                .filter(cash_accounts::Column::Code.eq(code.clone()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Conflict(format!(
                    "cash account code {code} already exists"
                )));
            }

            self.require_currency(&db_tx, &cmd.currency_id).await?;
            if let Some(ledger_id) = cmd.ledger_account_id.as_deref() {
                self.require_posting_ledger_account(&db_tx, ledger_id)
                    .await?;
            }
            if let Some(user_id) = cmd.responsible_user_id.as_deref() {
                self.require_active_user(&db_tx, user_id).await?;
            }

            let account = CashAccount {
                id: Uuid::new_v4(),
                code,
                name,
                currency_id: cmd.currency_id.clone(),
                ledger_account_id: cmd.ledger_account_id.clone(),
                balance_minor: cmd.initial_balance_minor,
                max_amount_minor: cmd.max_amount_minor,
                responsible_user_id: cmd.responsible_user_id.clone(),
                active: true,
                created_at: Utc::now(),
            };
            cash_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;
            Ok(account)
        })
    }

    /// Creates a bank account.
    pub async fn create_bank_account(&self, cmd: NewBankAccountCmd) -> ResultEngine<BankAccount> {
        let code = normalize_required_text(&cmd.code, "account code")?;
        let name = normalize_required_text(&cmd.name, "account name")?;
        let bank_name = normalize_required_text(&cmd.bank_name, "bank name")?;
        let account_number = normalize_required_text(&cmd.account_number, "account number")?;
        if cmd.initial_balance_minor < 0 {
            return Err(EngineError::Validation(
                "initial balance must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let duplicate = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::Code.eq(code.clone()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Conflict(format!(
                    "bank account code {code} already exists"
                )));
            }

            self.require_currency(&db_tx, &cmd.currency_id).await?;
            if let Some(ledger_id) = cmd.ledger_account_id.as_deref() {
                self.require_posting_ledger_account(&db_tx, ledger_id)
                    .await?;
            }

            let account = BankAccount {
                id: Uuid::new_v4(),
                code,
                name,
                bank_name,
                account_number,
                currency_id: cmd.currency_id.clone(),
                ledger_account_id: cmd.ledger_account_id.clone(),
                balance_minor: cmd.initial_balance_minor,
                active: true,
                created_at: Utc::now(),
            };
            bank_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;
            Ok(account)
        })
    }

    /// Applies a signed delta to a cash account balance.
    ///
    /// The single mutator of `cash_accounts.balance_minor`. Joins the
    /// caller's transaction and validates non-negativity and the configured
    /// ceiling against the freshly locked row.
    pub(super) async fn apply_cash_delta(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<i64> {
        let model = self.lock_cash_account(db_tx, account_id).await?;
        let new_balance = model.balance_minor + delta_minor;
        if new_balance < 0 {
            return Err(EngineError::InsufficientFunds(model.code));
        }
        if let Some(max) = model.max_amount_minor
            && new_balance > max
        {
            return Err(EngineError::CeilingExceeded(model.code));
        }

        let update = cash_accounts::ActiveModel {
            id: ActiveValue::Set(model.id),
            balance_minor: ActiveValue::Set(new_balance),
            ..Default::default()
        };
        update.update(db_tx).await?;
        Ok(new_balance)
    }

    /// Applies a signed delta to a bank account balance. Counterpart of
    /// [`Self::apply_cash_delta`]; bank accounts carry no ceiling.
    pub(super) async fn apply_bank_delta(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<i64> {
        let model = self.lock_bank_account(db_tx, account_id).await?;
        let new_balance = model.balance_minor + delta_minor;
        if new_balance < 0 {
            return Err(EngineError::InsufficientFunds(model.code));
        }

        let update = bank_accounts::ActiveModel {
            id: ActiveValue::Set(model.id),
            balance_minor: ActiveValue::Set(new_balance),
            ..Default::default()
        };
        update.update(db_tx).await?;
        Ok(new_balance)
    }

    /// Deactivates a cash account. Legal only at zero balance with no
    /// pending movements.
    pub async fn deactivate_cash_account(&self, account_id: Uuid) -> ResultEngine<CashAccount> {
        with_tx!(self, |db_tx| {
            let model = self.lock_cash_account(&db_tx, account_id).await?;
            if !model.active {
                return Err(EngineError::Conflict(format!(
                    "cash account {} is already inactive",
                    model.code
                )));
            }
            if model.balance_minor != 0 {
                return Err(EngineError::Conflict(format!(
                    "cash account {} still holds a balance",
                    model.code
                )));
            }
            let pending = cash_movements::Entity::find()
                .filter(cash_movements::Column::AccountId.eq(model.id.clone()))
                .filter(
                    cash_movements::Column::Status.eq(CashMovementStatus::Pending.as_str()),
                )
                .count(&db_tx)
                .await?;
            if pending > 0 {
                return Err(EngineError::Conflict(format!(
                    "cash account {} has pending movements",
                    model.code
                )));
            }

            let update = cash_accounts::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                active: ActiveValue::Set(false),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            CashAccount::try_from(updated)
        })
    }

    /// Deactivates a bank account under the same zero-balance / no-pending
    /// guard as the cash variant.
    pub async fn deactivate_bank_account(&self, account_id: Uuid) -> ResultEngine<BankAccount> {
        with_tx!(self, |db_tx| {
            let model = self.lock_bank_account(&db_tx, account_id).await?;
            if !model.active {
                return Err(EngineError::Conflict(format!(
                    "bank account {} is already inactive",
                    model.code
                )));
            }
            if model.balance_minor != 0 {
                return Err(EngineError::Conflict(format!(
                    "bank account {} still holds a balance",
                    model.code
                )));
            }
            let pending = bank_transactions::Entity::find()
                .filter(bank_transactions::Column::AccountId.eq(model.id.clone()))
                .filter(
                    bank_transactions::Column::Status
                        .eq(crate::BankTransactionStatus::Pending.as_str()),
                )
                .count(&db_tx)
                .await?;
            if pending > 0 {
                return Err(EngineError::Conflict(format!(
                    "bank account {} has pending transactions",
                    model.code
                )));
            }

            let update = bank_accounts::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                active: ActiveValue::Set(false),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            BankAccount::try_from(updated)
        })
    }
}
