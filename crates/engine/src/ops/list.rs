//! Read operations: lookups and filtered listings.
//!
//! Filters are typed value objects translated to parameterized predicates;
//! no SQL fragments are ever assembled from strings.

use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    BankAccount, BankReconciliation, BankTransaction, BankTransactionKind, CashAccount,
    CashMovement, CashMovementKind, CashReconciliation, EngineError, InterBankTransfer,
    ResultEngine, bank_accounts, bank_reconciliation_items, bank_reconciliations,
    bank_transactions, cash_accounts, cash_movements, cash_reconciliations, inter_bank_transfers,
};

use super::Engine;

/// Optional predicates for cash movement listings.
#[derive(Clone, Debug, Default)]
pub struct CashMovementListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kinds: Option<Vec<CashMovementKind>>,
    pub include_cancelled: bool,
}

/// Optional predicates for bank transaction listings.
#[derive(Clone, Debug, Default)]
pub struct BankTransactionListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kinds: Option<Vec<BankTransactionKind>>,
    pub include_cancelled: bool,
}

impl Engine {
    pub async fn cash_account(&self, account_id: Uuid) -> ResultEngine<CashAccount> {
        let model = cash_accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash account".to_string()))?;
        CashAccount::try_from(model)
    }

    pub async fn cash_account_by_code(&self, code: &str) -> ResultEngine<CashAccount> {
        let model = cash_accounts::Entity::find()
            .filter(cash_accounts::Column::Code.eq(code.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash account".to_string()))?;
        CashAccount::try_from(model)
    }

    pub async fn list_cash_accounts(
        &self,
        include_inactive: bool,
    ) -> ResultEngine<Vec<CashAccount>> {
        let mut query = cash_accounts::Entity::find().order_by_asc(cash_accounts::Column::Code);
        if !include_inactive {
            query = query.filter(cash_accounts::Column::Active.eq(true));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(CashAccount::try_from).collect()
    }

    pub async fn bank_account(&self, account_id: Uuid) -> ResultEngine<BankAccount> {
        let model = bank_accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank account".to_string()))?;
        BankAccount::try_from(model)
    }

    pub async fn bank_account_by_code(&self, code: &str) -> ResultEngine<BankAccount> {
        let model = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::Code.eq(code.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank account".to_string()))?;
        BankAccount::try_from(model)
    }

    pub async fn list_bank_accounts(
        &self,
        include_inactive: bool,
    ) -> ResultEngine<Vec<BankAccount>> {
        let mut query = bank_accounts::Entity::find().order_by_asc(bank_accounts::Column::Code);
        if !include_inactive {
            query = query.filter(bank_accounts::Column::Active.eq(true));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(BankAccount::try_from).collect()
    }

    pub async fn cash_movement(&self, movement_id: Uuid) -> ResultEngine<CashMovement> {
        let model = cash_movements::Entity::find_by_id(movement_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash movement".to_string()))?;
        CashMovement::try_from(model)
    }

    /// Lists an account's movements, newest first.
    pub async fn list_cash_movements(
        &self,
        account_id: Uuid,
        filter: &CashMovementListFilter,
        limit: u64,
    ) -> ResultEngine<Vec<CashMovement>> {
        let mut query = cash_movements::Entity::find()
            .filter(cash_movements::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(cash_movements::Column::Date)
            .order_by_desc(cash_movements::Column::CreatedAt)
            .limit(limit);

        if let Some(from) = filter.from {
            query = query.filter(cash_movements::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(cash_movements::Column::Date.lte(to));
        }
        if let Some(kinds) = &filter.kinds {
            query = query.filter(
                cash_movements::Column::Kind
                    .is_in(kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>()),
            );
        }
        if !filter.include_cancelled {
            query = query.filter(
                cash_movements::Column::Status
                    .ne(crate::CashMovementStatus::Cancelled.as_str()),
            );
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(CashMovement::try_from).collect()
    }

    pub async fn bank_transaction(&self, transaction_id: Uuid) -> ResultEngine<BankTransaction> {
        let model = bank_transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank transaction".to_string()))?;
        BankTransaction::try_from(model)
    }

    /// Lists an account's bank transactions, newest first.
    pub async fn list_bank_transactions(
        &self,
        account_id: Uuid,
        filter: &BankTransactionListFilter,
        limit: u64,
    ) -> ResultEngine<Vec<BankTransaction>> {
        let mut query = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(bank_transactions::Column::Date)
            .order_by_desc(bank_transactions::Column::CreatedAt)
            .limit(limit);

        if let Some(from) = filter.from {
            query = query.filter(bank_transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(bank_transactions::Column::Date.lte(to));
        }
        if let Some(kinds) = &filter.kinds {
            query = query.filter(
                bank_transactions::Column::Kind
                    .is_in(kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>()),
            );
        }
        if !filter.include_cancelled {
            query = query.filter(
                bank_transactions::Column::Status
                    .ne(crate::BankTransactionStatus::Cancelled.as_str()),
            );
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(BankTransaction::try_from).collect()
    }

    pub async fn cash_reconciliation(
        &self,
        reconciliation_id: Uuid,
    ) -> ResultEngine<CashReconciliation> {
        let model = cash_reconciliations::Entity::find_by_id(reconciliation_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash reconciliation".to_string()))?;
        CashReconciliation::try_from(model)
    }

    pub async fn list_cash_reconciliations(
        &self,
        account_id: Uuid,
    ) -> ResultEngine<Vec<CashReconciliation>> {
        let models = cash_reconciliations::Entity::find()
            .filter(cash_reconciliations::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(cash_reconciliations::Column::Date)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(CashReconciliation::try_from)
            .collect()
    }

    pub async fn bank_reconciliation(
        &self,
        reconciliation_id: Uuid,
    ) -> ResultEngine<BankReconciliation> {
        let model = bank_reconciliations::Entity::find_by_id(reconciliation_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank reconciliation".to_string()))?;
        BankReconciliation::try_from(model)
    }

    pub async fn list_bank_reconciliations(
        &self,
        account_id: Uuid,
    ) -> ResultEngine<Vec<BankReconciliation>> {
        let models = bank_reconciliations::Entity::find()
            .filter(bank_reconciliations::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(bank_reconciliations::Column::StatementDate)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(BankReconciliation::try_from)
            .collect()
    }

    /// Transactions linked to a reconciliation through its items.
    pub async fn bank_reconciliation_transactions(
        &self,
        reconciliation_id: Uuid,
    ) -> ResultEngine<Vec<BankTransaction>> {
        let items = bank_reconciliation_items::Entity::find()
            .filter(
                bank_reconciliation_items::Column::ReconciliationId
                    .eq(reconciliation_id.to_string()),
            )
            .all(&self.database)
            .await?;

        let ids: Vec<String> = items.into_iter().map(|item| item.transaction_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::Id.is_in(ids))
            .order_by_asc(bank_transactions::Column::Date)
            .all(&self.database)
            .await?;
        models.into_iter().map(BankTransaction::try_from).collect()
    }

    pub async fn inter_bank_transfer(
        &self,
        transfer_id: Uuid,
    ) -> ResultEngine<InterBankTransfer> {
        let model = inter_bank_transfers::Entity::find_by_id(transfer_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("inter-bank transfer".to_string()))?;
        InterBankTransfer::try_from(model)
    }

    pub async fn list_inter_bank_transfers(
        &self,
        account_id: Option<Uuid>,
    ) -> ResultEngine<Vec<InterBankTransfer>> {
        let mut query = inter_bank_transfers::Entity::find()
            .order_by_desc(inter_bank_transfers::Column::Date);
        if let Some(account_id) = account_id {
            let id = account_id.to_string();
            query = query.filter(
                inter_bank_transfers::Column::FromAccountId
                    .eq(id.clone())
                    .or(inter_bank_transfers::Column::ToAccountId.eq(id)),
            );
        }
        let models = query.all(&self.database).await?;
        models
            .into_iter()
            .map(InterBankTransfer::try_from)
            .collect()
    }
}
