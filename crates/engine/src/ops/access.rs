//! Reference lookups and locked account reads.
//!
//! Every read of a balance that precedes a write in the same operation goes
//! through the `lock_*_account` helpers, which take an exclusive row lock
//! held for the rest of the caller's transaction.

use sea_orm::{ActiveValue, DatabaseTransaction, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, bank_accounts, cash_accounts, currencies, ledger_accounts, users,
};

use super::Engine;

/// Generates the locked-read and reference-sequence helpers for an account
/// entity.
macro_rules! impl_account_access {
    ($lock_fn:ident, $next_ref_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $lock_fn(
            &self,
            db: &DatabaseTransaction,
            account_id: Uuid,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(account_id.to_string())
                .lock_exclusive()
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound($err_msg.to_string()))
        }

        // Issues the next sequential reference for the account. Reads the
        // counter fresh under the row lock so repeated calls in one
        // transaction keep advancing it.
        pub(super) async fn $next_ref_fn(
            &self,
            db: &DatabaseTransaction,
            account_id: Uuid,
        ) -> ResultEngine<String> {
            let model = self.$lock_fn(db, account_id).await?;
            let seq = model.movement_seq + 1;
            let update = $module::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                movement_seq: ActiveValue::Set(seq),
                ..Default::default()
            };
            update.update(db).await?;
            Ok(format!("{}-{:06}", model.code, seq))
        }
    };
}

impl Engine {
    impl_account_access!(
        lock_cash_account,
        next_cash_reference,
        cash_accounts,
        "cash account"
    );

    impl_account_access!(
        lock_bank_account,
        next_bank_reference,
        bank_accounts,
        "bank account"
    );

    pub(super) async fn require_currency(
        &self,
        db: &DatabaseTransaction,
        currency_id: &str,
    ) -> ResultEngine<()> {
        let model = currencies::Entity::find_by_id(currency_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("currency".to_string()))?;
        if !model.active {
            return Err(EngineError::InactiveRef(format!(
                "currency {}",
                model.code
            )));
        }
        Ok(())
    }

    pub(super) async fn require_posting_ledger_account(
        &self,
        db: &DatabaseTransaction,
        ledger_account_id: &str,
    ) -> ResultEngine<()> {
        let model = ledger_accounts::Entity::find_by_id(ledger_account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("ledger account".to_string()))?;
        if !model.allows_postings {
            return Err(EngineError::InactiveRef(format!(
                "ledger account {} does not accept postings",
                model.code
            )));
        }
        Ok(())
    }

    pub(super) async fn require_active_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
        if !model.active {
            return Err(EngineError::InactiveRef(format!("user {username}")));
        }
        Ok(())
    }
}
