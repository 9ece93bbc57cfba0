//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

/// Create a cash or bank account.
#[derive(Clone, Debug)]
pub struct NewCashAccountCmd {
    pub code: String,
    pub name: String,
    pub currency_id: String,
    pub ledger_account_id: Option<String>,
    pub initial_balance_minor: i64,
    pub max_amount_minor: Option<i64>,
    pub responsible_user_id: Option<String>,
    pub created_by: String,
}

impl NewCashAccountCmd {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        currency_id: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            currency_id: currency_id.into(),
            ledger_account_id: None,
            initial_balance_minor: 0,
            max_amount_minor: None,
            responsible_user_id: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn ledger_account_id(mut self, id: impl Into<String>) -> Self {
        self.ledger_account_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn initial_balance_minor(mut self, balance_minor: i64) -> Self {
        self.initial_balance_minor = balance_minor;
        self
    }

    #[must_use]
    pub fn max_amount_minor(mut self, max_minor: i64) -> Self {
        self.max_amount_minor = Some(max_minor);
        self
    }

    #[must_use]
    pub fn responsible_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.responsible_user_id = Some(user_id.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct NewBankAccountCmd {
    pub code: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub currency_id: String,
    pub ledger_account_id: Option<String>,
    pub initial_balance_minor: i64,
    pub created_by: String,
}

impl NewBankAccountCmd {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        bank_name: impl Into<String>,
        account_number: impl Into<String>,
        currency_id: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            bank_name: bank_name.into(),
            account_number: account_number.into(),
            currency_id: currency_id.into(),
            ledger_account_id: None,
            initial_balance_minor: 0,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn ledger_account_id(mut self, id: impl Into<String>) -> Self {
        self.ledger_account_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn initial_balance_minor(mut self, balance_minor: i64) -> Self {
        self.initial_balance_minor = balance_minor;
        self
    }
}

/// Create a cash movement (pending, or confirmed when `auto_confirm`).
#[derive(Clone, Debug)]
pub struct CashMovementCmd {
    pub account_id: Uuid,
    pub kind: crate::CashMovementKind,
    pub date: NaiveDate,
    pub description: String,
    pub amount_minor: i64,
    pub reference: Option<String>,
    pub counterparty_user_id: Option<String>,
    pub auto_confirm: bool,
    pub created_by: String,
}

impl CashMovementCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        kind: crate::CashMovementKind,
        date: NaiveDate,
        description: impl Into<String>,
        amount_minor: i64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            kind,
            date,
            description: description.into(),
            amount_minor,
            reference: None,
            counterparty_user_id: None,
            auto_confirm: false,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn counterparty_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.counterparty_user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn auto_confirm(mut self) -> Self {
        self.auto_confirm = true;
        self
    }
}

/// Create a bank transaction (pending, or cleared when `auto_clear`).
#[derive(Clone, Debug)]
pub struct BankTransactionCmd {
    pub account_id: Uuid,
    pub kind: crate::BankTransactionKind,
    pub date: NaiveDate,
    pub value_date: Option<NaiveDate>,
    pub description: String,
    pub amount_minor: i64,
    pub reference: Option<String>,
    pub reference_number: Option<String>,
    pub counterparty_user_id: Option<String>,
    pub auto_clear: bool,
    pub created_by: String,
}

impl BankTransactionCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        kind: crate::BankTransactionKind,
        date: NaiveDate,
        description: impl Into<String>,
        amount_minor: i64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            kind,
            date,
            value_date: None,
            description: description.into(),
            amount_minor,
            reference: None,
            reference_number: None,
            counterparty_user_id: None,
            auto_clear: false,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn value_date(mut self, date: NaiveDate) -> Self {
        self.value_date = Some(date);
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn reference_number(mut self, number: impl Into<String>) -> Self {
        self.reference_number = Some(number.into());
        self
    }

    #[must_use]
    pub fn counterparty_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.counterparty_user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn auto_clear(mut self) -> Self {
        self.auto_clear = true;
        self
    }
}

/// Transfer between two cash accounts (both legs auto-confirmed).
#[derive(Clone, Debug)]
pub struct CashTransferCmd {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub date: NaiveDate,
    pub amount_minor: i64,
    pub description: String,
    pub created_by: String,
}

impl CashTransferCmd {
    #[must_use]
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        date: NaiveDate,
        amount_minor: i64,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            from_account_id,
            to_account_id,
            date,
            amount_minor,
            description: description.into(),
            created_by: created_by.into(),
        }
    }
}

/// Pre-create a pending inter-bank transfer.
#[derive(Clone, Debug)]
pub struct InterBankTransferCmd {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub date: NaiveDate,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub created_by: String,
}

impl InterBankTransferCmd {
    #[must_use]
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        date: NaiveDate,
        amount_minor: i64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            from_account_id,
            to_account_id,
            date,
            amount_minor,
            fee_minor: 0,
            description: None,
            reference: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn fee_minor(mut self, fee_minor: i64) -> Self {
        self.fee_minor = fee_minor;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Open a cash reconciliation (arqueo) for an account and date.
#[derive(Clone, Debug)]
pub struct CashReconciliationCmd {
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub counted_minor: i64,
    pub notes: Option<String>,
    pub created_by: String,
}

impl CashReconciliationCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        date: NaiveDate,
        counted_minor: i64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            date,
            counted_minor,
            notes: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Open a bank reconciliation for an account and statement date.
#[derive(Clone, Debug)]
pub struct BankReconciliationCmd {
    pub account_id: Uuid,
    pub statement_date: NaiveDate,
    pub statement_balance_minor: i64,
    /// Transactions to seed as reconciled items; only cleared transactions of
    /// the same account are accepted.
    pub seed_transaction_ids: Vec<Uuid>,
    pub notes: Option<String>,
    pub created_by: String,
}

impl BankReconciliationCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        statement_date: NaiveDate,
        statement_balance_minor: i64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            statement_date,
            statement_balance_minor,
            seed_transaction_ids: Vec::new(),
            notes: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn seed_transaction_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.seed_transaction_ids = ids;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Rule toggles for the bank auto-matcher. Every rule can be switched off
/// independently; defaults enable all three with a three-day range.
#[derive(Clone, Copy, Debug)]
pub struct MatchCriteria {
    /// Match transactions dated exactly on the statement date.
    pub exact_match: bool,
    /// Treat any non-empty external reference number as a positive signal.
    pub reference_match: bool,
    /// Match transactions within `max_days_diff` days of the statement date.
    pub range_match: bool,
    pub max_days_diff: i64,
}

impl Default for MatchCriteria {
    fn default() -> Self {
        Self {
            exact_match: true,
            reference_match: true,
            range_match: true,
            max_days_diff: 3,
        }
    }
}

/// Run the auto-matcher against an open bank reconciliation.
#[derive(Clone, Debug)]
pub struct AutoMatchCmd {
    pub reconciliation_id: Uuid,
    pub criteria: MatchCriteria,
    /// Days before the statement date to scan for candidates.
    pub lookback_days: i64,
}

impl AutoMatchCmd {
    pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

    #[must_use]
    pub fn new(reconciliation_id: Uuid) -> Self {
        Self {
            reconciliation_id,
            criteria: MatchCriteria::default(),
            lookback_days: Self::DEFAULT_LOOKBACK_DAYS,
        }
    }

    #[must_use]
    pub fn criteria(mut self, criteria: MatchCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    #[must_use]
    pub fn lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }
}
