//! Request/response types shared between the HTTP server and its clients.
//!
//! Amounts are integer minor units (cents); dates are calendar dates in the
//! company timezone, timestamps are UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    Income,
    Expense,
    TransferIn,
    TransferOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    Receipt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    Pending,
    Confirmed,
    Cleared,
    Cancelled,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashAccountNew {
        pub code: String,
        pub name: String,
        pub currency_id: String,
        pub ledger_account_id: Option<String>,
        pub initial_balance_minor: Option<i64>,
        pub max_amount_minor: Option<i64>,
        pub responsible_user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountNew {
        pub code: String,
        pub name: String,
        pub bank_name: String,
        pub account_number: String,
        pub currency_id: String,
        pub ledger_account_id: Option<String>,
        pub initial_balance_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashAccountView {
        pub id: Uuid,
        pub code: String,
        pub name: String,
        pub currency_id: String,
        pub balance_minor: i64,
        pub max_amount_minor: Option<i64>,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountView {
        pub id: Uuid,
        pub code: String,
        pub name: String,
        pub bank_name: String,
        pub account_number: String,
        pub currency_id: String,
        pub balance_minor: i64,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub include_inactive: Option<bool>,
    }
}

pub mod movement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashMovementNew {
        pub account_id: Uuid,
        pub kind: CashMovementKind,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub reference: Option<String>,
        pub counterparty_user_id: Option<String>,
        pub auto_confirm: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankTransactionNew {
        pub account_id: Uuid,
        pub kind: BankTransactionKind,
        pub date: NaiveDate,
        pub value_date: Option<NaiveDate>,
        pub description: String,
        pub amount_minor: i64,
        pub reference: Option<String>,
        pub reference_number: Option<String>,
        pub counterparty_user_id: Option<String>,
        pub auto_clear: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementCancel {
        pub reason: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashMovementView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub kind: CashMovementKind,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub reference: String,
        pub running_balance_minor: Option<i64>,
        pub status: MovementStatus,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankTransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub kind: BankTransactionKind,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub reference: String,
        pub reference_number: Option<String>,
        pub running_balance_minor: Option<i64>,
        pub status: MovementStatus,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementList {
        pub account_id: Uuid,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub include_cancelled: Option<bool>,
        pub limit: Option<u64>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashTransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub date: NaiveDate,
        pub amount_minor: i64,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashTransferCreated {
        pub out_movement_id: Uuid,
        pub in_movement_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InterBankTransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub date: NaiveDate,
        pub amount_minor: i64,
        pub fee_minor: Option<i64>,
        pub description: Option<String>,
        pub reference: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InterBankTransferView {
        pub id: Uuid,
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub date: NaiveDate,
        pub amount_minor: i64,
        pub fee_minor: i64,
        pub status: String,
        pub debit_transaction_id: Option<Uuid>,
        pub credit_transaction_id: Option<Uuid>,
        pub fee_transaction_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCancel {
        pub reason: Option<String>,
    }
}

pub mod reconciliation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashReconciliationNew {
        pub account_id: Uuid,
        pub date: NaiveDate,
        pub counted_minor: i64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashReconciliationApprove {
        pub create_adjustment: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashReconciliationView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub date: NaiveDate,
        pub system_balance_minor: i64,
        pub counted_minor: i64,
        pub difference_minor: i64,
        pub outcome: String,
        pub status: String,
        pub adjustment_movement_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankReconciliationNew {
        pub account_id: Uuid,
        pub statement_date: NaiveDate,
        pub statement_balance_minor: i64,
        pub seed_transaction_ids: Option<Vec<Uuid>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankReconciliationView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub statement_date: NaiveDate,
        pub statement_balance_minor: i64,
        pub reconciled_balance_minor: i64,
        pub is_reconciled: bool,
        pub difference_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AutoMatchRequest {
        pub exact_match: Option<bool>,
        pub reference_match: Option<bool>,
        pub range_match: Option<bool>,
        pub max_days_diff: Option<i64>,
        pub lookback_days: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AutoMatchResult {
        pub matched_count: u64,
        pub matched_amount_minor: i64,
        pub candidates_considered: u64,
        pub match_percentage: f64,
    }
}
