//! Treasury ledger & reconciliation engine.
//!
//! The engine owns cash and bank account balances and is the only code path
//! allowed to mutate them. Every mutation happens inside one database
//! transaction together with the movement row that caused it, so balances and
//! ledger history never diverge:
//!
//! - movements are created `pending` and affect a balance only when confirmed
//!   (cash) or cleared (bank); cancelling a confirmed movement reverses its
//!   contribution;
//! - transfers compose two movement legs into one atomic unit;
//! - reconciliations compare the ledger-derived balance against an external
//!   count (physical cash count, bank statement) and can post a corrective
//!   movement (cash) or auto-match statement-window transactions (bank).

pub use bank_accounts::BankAccount;
pub use bank_reconciliations::BankReconciliation;
pub use bank_transactions::{BankTransaction, BankTransactionKind, BankTransactionStatus};
pub use cash_accounts::CashAccount;
pub use cash_movements::{CashMovement, CashMovementKind, CashMovementStatus};
pub use cash_reconciliations::{CashReconciliation, ReconciliationOutcome, ReconciliationStatus};
pub use commands::{
    AutoMatchCmd, BankReconciliationCmd, BankTransactionCmd, CashMovementCmd,
    CashReconciliationCmd, CashTransferCmd, InterBankTransferCmd, MatchCriteria, NewBankAccountCmd,
    NewCashAccountCmd,
};
pub use error::{EngineError, ErrorKind};
pub use inter_bank_transfers::{InterBankTransfer, InterBankTransferStatus};
pub use ops::{
    AutoMatchSummary, BankTransactionListFilter, CashMovementListFilter, Engine, EngineBuilder,
};

mod bank_accounts;
mod bank_reconciliation_items;
mod bank_reconciliations;
mod bank_transactions;
mod cash_accounts;
mod cash_movements;
mod cash_reconciliations;
mod commands;
mod currencies;
mod error;
mod inter_bank_transfers;
mod ledger_accounts;
mod ops;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
