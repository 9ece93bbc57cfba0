//! Bank reconciliation operations, including the statement auto-matcher.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    AutoMatchCmd, BankReconciliation, BankReconciliationCmd, BankTransaction, EngineError,
    MatchCriteria, ResultEngine, bank_reconciliation_items, bank_reconciliations,
    bank_transactions, bank_transactions::BankTransactionStatus,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Result of one auto-match run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoMatchSummary {
    pub matched_count: u64,
    pub matched_amount_minor: i64,
    pub candidates_considered: u64,
    /// `matched / considered` as a percentage; zero when nothing was
    /// considered.
    pub match_percentage: f64,
}

impl Engine {
    /// Opens a bank reconciliation against one statement.
    ///
    /// Optionally seeds items from an explicit transaction list; only
    /// cleared transactions of the same account that are not yet committed
    /// to another reconciliation are accepted.
    pub async fn create_bank_reconciliation(
        &self,
        cmd: BankReconciliationCmd,
    ) -> ResultEngine<BankReconciliation> {
        with_tx!(self, |db_tx| {
            let account = self.lock_bank_account(&db_tx, cmd.account_id).await?;
            if !account.active {
                return Err(EngineError::InactiveRef(format!(
                    "bank account {}",
                    account.code
                )));
            }

            let duplicate = bank_reconciliations::Entity::find()
                .filter(bank_reconciliations::Column::AccountId.eq(account.id.clone()))
                .filter(bank_reconciliations::Column::StatementDate.eq(cmd.statement_date))
                .filter(bank_reconciliations::Column::IsReconciled.eq(false))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Conflict(format!(
                    "an open reconciliation already exists for {} on {}",
                    account.code, cmd.statement_date
                )));
            }

            let mut recon = BankReconciliation {
                id: Uuid::new_v4(),
                account_id: cmd.account_id,
                statement_date: cmd.statement_date,
                statement_balance_minor: cmd.statement_balance_minor,
                reconciled_balance_minor: 0,
                is_reconciled: false,
                difference_minor: None,
                notes: normalize_optional_text(cmd.notes.as_deref()),
                created_by: cmd.created_by.clone(),
                completed_by: None,
                completed_at: None,
                created_at: Utc::now(),
            };
            bank_reconciliations::ActiveModel::from(&recon)
                .insert(&db_tx)
                .await?;

            let mut seeded_minor = 0;
            for transaction_id in &cmd.seed_transaction_ids {
                let tx = self.find_bank_transaction_tx(&db_tx, *transaction_id).await?;
                if tx.account_id != cmd.account_id {
                    return Err(EngineError::Conflict(format!(
                        "transaction {} belongs to another account",
                        tx.reference
                    )));
                }
                if tx.status != BankTransactionStatus::Cleared {
                    return Err(EngineError::Conflict(format!(
                        "transaction {} is {}, only cleared transactions can be reconciled",
                        tx.reference,
                        tx.status.as_str()
                    )));
                }
                self.ensure_not_reconciled(&db_tx, tx.id).await?;
                self.insert_reconciliation_item(&db_tx, recon.id, tx.id).await?;
                seeded_minor += tx.signed_amount_minor();
            }

            if seeded_minor != 0 {
                let update = bank_reconciliations::ActiveModel {
                    id: ActiveValue::Set(recon.id.to_string()),
                    reconciled_balance_minor: ActiveValue::Set(seeded_minor),
                    ..Default::default()
                };
                update.update(&db_tx).await?;
                recon.reconciled_balance_minor = seeded_minor;
            }

            Ok(recon)
        })
    }

    /// Marks a reconciliation as completed, stamping the absolute difference
    /// between the statement balance and the reconciled balance.
    ///
    /// No corrective movement is posted: bank differences are a manual
    /// follow-up, unlike the cash arqueo path.
    pub async fn complete_bank_reconciliation(
        &self,
        reconciliation_id: Uuid,
        actor: &str,
    ) -> ResultEngine<BankReconciliation> {
        with_tx!(self, |db_tx| {
            let recon = self
                .find_bank_reconciliation_tx(&db_tx, reconciliation_id)
                .await?;
            if recon.is_reconciled {
                return Err(EngineError::Conflict(
                    "reconciliation is already completed".to_string(),
                ));
            }

            let difference =
                (recon.statement_balance_minor - recon.reconciled_balance_minor).abs();
            let update = bank_reconciliations::ActiveModel {
                id: ActiveValue::Set(recon.id.to_string()),
                is_reconciled: ActiveValue::Set(true),
                difference_minor: ActiveValue::Set(Some(difference)),
                completed_by: ActiveValue::Set(Some(actor.to_string())),
                completed_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            BankReconciliation::try_from(updated)
        })
    }

    /// Runs the auto-matcher against an open reconciliation.
    ///
    /// Candidates are the account's cleared transactions inside the lookback
    /// window ending at the statement date that are not yet committed to any
    /// reconciliation. Rules fire per candidate in date order, first hit
    /// wins:
    ///
    /// 1. exact: transaction date equals the statement date;
    /// 2. reference: the transaction carries a non-empty external reference
    ///    number (not cross-checked against statement line data, which is
    ///    not modeled);
    /// 3. range: the day distance to the statement date is within
    ///    `max_days_diff`.
    pub async fn auto_match_bank_reconciliation(
        &self,
        cmd: AutoMatchCmd,
    ) -> ResultEngine<AutoMatchSummary> {
        if cmd.lookback_days <= 0 {
            return Err(EngineError::Validation(
                "lookback_days must be > 0".to_string(),
            ));
        }
        if cmd.criteria.max_days_diff < 0 {
            return Err(EngineError::Validation(
                "max_days_diff must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let recon = self
                .find_bank_reconciliation_tx(&db_tx, cmd.reconciliation_id)
                .await?;
            if recon.is_reconciled {
                return Err(EngineError::Conflict(
                    "reconciliation is already completed".to_string(),
                ));
            }

            let window_start = recon.statement_date - Duration::days(cmd.lookback_days);
            let candidate_models = bank_transactions::Entity::find()
                .filter(bank_transactions::Column::AccountId.eq(recon.account_id.to_string()))
                .filter(
                    bank_transactions::Column::Status.eq(BankTransactionStatus::Cleared.as_str()),
                )
                .filter(bank_transactions::Column::Date.gte(window_start))
                .filter(bank_transactions::Column::Date.lte(recon.statement_date))
                .order_by_asc(bank_transactions::Column::Date)
                .order_by_asc(bank_transactions::Column::Reference)
                .all(&db_tx)
                .await?;

            let reconciled_ids = self
                .reconciled_transaction_ids(
                    &db_tx,
                    candidate_models.iter().map(|m| m.id.clone()).collect(),
                )
                .await?;

            let mut summary = AutoMatchSummary {
                matched_count: 0,
                matched_amount_minor: 0,
                candidates_considered: 0,
                match_percentage: 0.0,
            };

            for model in candidate_models {
                if reconciled_ids.contains(&model.id) {
                    continue;
                }
                let tx = BankTransaction::try_from(model)?;
                summary.candidates_considered += 1;

                if !matches_statement(&tx, &recon, &cmd.criteria) {
                    continue;
                }

                self.insert_reconciliation_item(&db_tx, recon.id, tx.id).await?;
                summary.matched_count += 1;
                summary.matched_amount_minor += tx.signed_amount_minor();
            }

            if summary.matched_amount_minor != 0 {
                let update = bank_reconciliations::ActiveModel {
                    id: ActiveValue::Set(recon.id.to_string()),
                    reconciled_balance_minor: ActiveValue::Set(
                        recon.reconciled_balance_minor + summary.matched_amount_minor,
                    ),
                    ..Default::default()
                };
                update.update(&db_tx).await?;
            }

            if summary.candidates_considered > 0 {
                summary.match_percentage =
                    summary.matched_count as f64 / summary.candidates_considered as f64 * 100.0;
            }

            tracing::debug!(
                reconciliation = %recon.id,
                matched = summary.matched_count,
                considered = summary.candidates_considered,
                "auto-match finished"
            );

            Ok(summary)
        })
    }

    async fn ensure_not_reconciled(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let existing = bank_reconciliation_items::Entity::find()
            .filter(
                bank_reconciliation_items::Column::TransactionId.eq(transaction_id.to_string()),
            )
            .filter(bank_reconciliation_items::Column::IsReconciled.eq(true))
            .one(db_tx)
            .await?;
        if existing.is_some() {
            return Err(EngineError::Conflict(
                "transaction is already reconciled".to_string(),
            ));
        }
        Ok(())
    }

    // Transaction ids among `ids` that already belong to a reconciled item.
    async fn reconciled_transaction_ids(
        &self,
        db_tx: &DatabaseTransaction,
        ids: Vec<String>,
    ) -> ResultEngine<HashSet<String>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let items = bank_reconciliation_items::Entity::find()
            .filter(bank_reconciliation_items::Column::TransactionId.is_in(ids))
            .filter(bank_reconciliation_items::Column::IsReconciled.eq(true))
            .all(db_tx)
            .await?;
        Ok(items.into_iter().map(|item| item.transaction_id).collect())
    }

    async fn insert_reconciliation_item(
        &self,
        db_tx: &DatabaseTransaction,
        reconciliation_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let item = bank_reconciliation_items::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            reconciliation_id: ActiveValue::Set(reconciliation_id.to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            is_reconciled: ActiveValue::Set(true),
            matched_at: ActiveValue::Set(Utc::now()),
        };
        item.insert(db_tx).await?;
        Ok(())
    }

    pub(super) async fn find_bank_reconciliation_tx(
        &self,
        db_tx: &DatabaseTransaction,
        reconciliation_id: Uuid,
    ) -> ResultEngine<BankReconciliation> {
        let model = bank_reconciliations::Entity::find_by_id(reconciliation_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank reconciliation".to_string()))?;
        BankReconciliation::try_from(model)
    }
}

// First satisfied rule wins; a candidate never counts twice.
fn matches_statement(
    tx: &BankTransaction,
    recon: &BankReconciliation,
    criteria: &MatchCriteria,
) -> bool {
    if criteria.exact_match && tx.date == recon.statement_date {
        return true;
    }
    if criteria.reference_match
        && tx
            .reference_number
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    {
        return true;
    }
    if criteria.range_match {
        let days = recon
            .statement_date
            .signed_duration_since(tx.date)
            .num_days()
            .abs();
        if days <= criteria.max_days_diff {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{BankTransactionKind, MatchCriteria};

    fn transaction(date: NaiveDate, reference_number: Option<&str>) -> BankTransaction {
        BankTransaction {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            kind: BankTransactionKind::Deposit,
            date,
            value_date: None,
            description: "statement line".to_string(),
            amount_minor: 1000,
            reference: "BCP-000001".to_string(),
            reference_number: reference_number.map(ToString::to_string),
            running_balance_minor: None,
            counterparty_user_id: None,
            status: crate::BankTransactionStatus::Cleared,
            created_by: "tester".to_string(),
            cleared_by: None,
            cleared_at: None,
            cancelled_by: None,
            cancelled_at: None,
            cancel_reason: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn reconciliation(statement_date: NaiveDate) -> BankReconciliation {
        BankReconciliation {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            statement_date,
            statement_balance_minor: 0,
            reconciled_balance_minor: 0,
            is_reconciled: false,
            difference_minor: None,
            notes: None,
            created_by: "tester".to_string(),
            completed_by: None,
            completed_at: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn exact_rule_beats_range() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let recon = reconciliation(date);
        let criteria = MatchCriteria {
            reference_match: false,
            ..MatchCriteria::default()
        };
        assert!(matches_statement(&transaction(date, None), &recon, &criteria));
    }

    #[test]
    fn range_rule_respects_max_days_diff() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let recon = reconciliation(date);
        let criteria = MatchCriteria {
            reference_match: false,
            ..MatchCriteria::default()
        };
        let near = transaction(date - Duration::days(3), None);
        let far = transaction(date - Duration::days(4), None);
        assert!(matches_statement(&near, &recon, &criteria));
        assert!(!matches_statement(&far, &recon, &criteria));
    }

    #[test]
    fn reference_rule_ignores_blank_references() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let recon = reconciliation(date);
        let criteria = MatchCriteria {
            exact_match: false,
            range_match: false,
            ..MatchCriteria::default()
        };
        let blank = transaction(date - Duration::days(10), Some("  "));
        let carried = transaction(date - Duration::days(10), Some("CHQ-1180"));
        assert!(!matches_statement(&blank, &recon, &criteria));
        assert!(matches_statement(&carried, &recon, &criteria));
    }

    #[test]
    fn disabled_rules_never_match() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let recon = reconciliation(date);
        let criteria = MatchCriteria {
            exact_match: false,
            reference_match: false,
            range_match: false,
            max_days_diff: 3,
        };
        assert!(!matches_statement(
            &transaction(date, Some("CHQ-1180")),
            &recon,
            &criteria
        ));
    }
}
