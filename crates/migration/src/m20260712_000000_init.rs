//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for the treasury module:
//!
//! - `users`, `currencies`, `ledger_accounts`: reference tables the engine
//!   validates against (authentication, currency and GL linkage live in
//!   sibling subsystems)
//! - `cash_accounts` / `cash_movements` / `cash_reconciliations`: cash boxes,
//!   their signed movement ledger and physical-count reconciliations
//! - `bank_accounts` / `bank_transactions`: bank side of the ledger
//! - `bank_reconciliations` / `bank_reconciliation_items`: statement
//!   reconciliations and their matched-transaction links
//! - `inter_bank_transfers`: two-leg transfers between bank accounts

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    FullName,
    Active,
}

#[derive(Iden)]
enum Currencies {
    Table,
    Id,
    Code,
    Name,
    Active,
}

#[derive(Iden)]
enum LedgerAccounts {
    Table,
    Id,
    Code,
    Name,
    AllowsPostings,
}

#[derive(Iden)]
enum CashAccounts {
    Table,
    Id,
    Code,
    Name,
    CurrencyId,
    LedgerAccountId,
    BalanceMinor,
    MaxAmountMinor,
    ResponsibleUserId,
    Active,
    MovementSeq,
    CreatedAt,
}

#[derive(Iden)]
enum CashMovements {
    Table,
    Id,
    AccountId,
    Kind,
    Date,
    Description,
    AmountMinor,
    Reference,
    RunningBalanceMinor,
    CounterpartyUserId,
    Status,
    CreatedBy,
    ConfirmedBy,
    ConfirmedAt,
    CancelledBy,
    CancelledAt,
    CancelReason,
    CreatedAt,
}

#[derive(Iden)]
enum CashReconciliations {
    Table,
    Id,
    AccountId,
    Date,
    SystemBalanceMinor,
    CountedMinor,
    DifferenceMinor,
    Outcome,
    Status,
    Notes,
    AdjustmentMovementId,
    CreatedBy,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
}

#[derive(Iden)]
enum BankAccounts {
    Table,
    Id,
    Code,
    Name,
    BankName,
    AccountNumber,
    CurrencyId,
    LedgerAccountId,
    BalanceMinor,
    Active,
    MovementSeq,
    CreatedAt,
}

#[derive(Iden)]
enum BankTransactions {
    Table,
    Id,
    AccountId,
    Kind,
    Date,
    ValueDate,
    Description,
    AmountMinor,
    Reference,
    ReferenceNumber,
    RunningBalanceMinor,
    CounterpartyUserId,
    Status,
    CreatedBy,
    ClearedBy,
    ClearedAt,
    CancelledBy,
    CancelledAt,
    CancelReason,
    CreatedAt,
}

#[derive(Iden)]
enum BankReconciliations {
    Table,
    Id,
    AccountId,
    StatementDate,
    StatementBalanceMinor,
    ReconciledBalanceMinor,
    IsReconciled,
    DifferenceMinor,
    Notes,
    CreatedBy,
    CompletedBy,
    CompletedAt,
    CreatedAt,
}

#[derive(Iden)]
enum BankReconciliationItems {
    Table,
    Id,
    ReconciliationId,
    TransactionId,
    IsReconciled,
    MatchedAt,
}

#[derive(Iden)]
enum InterBankTransfers {
    Table,
    Id,
    FromAccountId,
    ToAccountId,
    Date,
    AmountMinor,
    FeeMinor,
    Status,
    Description,
    Reference,
    DebitTransactionId,
    CreditTransactionId,
    FeeTransactionId,
    CreatedBy,
    ProcessedBy,
    ProcessedAt,
    CancelledBy,
    CancelledAt,
    CancelReason,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string())
                    .col(
                        ColumnDef::new(Users::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Currencies
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Currencies::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Currencies::Code).string().not_null())
                    .col(ColumnDef::new(Currencies::Name).string().not_null())
                    .col(
                        ColumnDef::new(Currencies::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-currencies-code-unique")
                    .table(Currencies::Table)
                    .col(Currencies::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ledger accounts (reference only)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerAccounts::Code).string().not_null())
                    .col(ColumnDef::new(LedgerAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(LedgerAccounts::AllowsPostings)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Cash accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashAccounts::Code).string().not_null())
                    .col(ColumnDef::new(CashAccounts::Name).string().not_null())
                    .col(ColumnDef::new(CashAccounts::CurrencyId).string().not_null())
                    .col(ColumnDef::new(CashAccounts::LedgerAccountId).string())
                    .col(
                        ColumnDef::new(CashAccounts::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashAccounts::MaxAmountMinor).big_integer())
                    .col(ColumnDef::new(CashAccounts::ResponsibleUserId).string())
                    .col(ColumnDef::new(CashAccounts::Active).boolean().not_null())
                    .col(
                        ColumnDef::new(CashAccounts::MovementSeq)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_accounts-currency_id")
                            .from(CashAccounts::Table, CashAccounts::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_accounts-ledger_account_id")
                            .from(CashAccounts::Table, CashAccounts::LedgerAccountId)
                            .to(LedgerAccounts::Table, LedgerAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_accounts-responsible_user_id")
                            .from(CashAccounts::Table, CashAccounts::ResponsibleUserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_accounts-code-unique")
                    .table(CashAccounts::Table)
                    .col(CashAccounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Cash movements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashMovements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashMovements::AccountId).string().not_null())
                    .col(ColumnDef::new(CashMovements::Kind).string().not_null())
                    .col(ColumnDef::new(CashMovements::Date).date().not_null())
                    .col(
                        ColumnDef::new(CashMovements::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashMovements::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashMovements::Reference).string().not_null())
                    .col(ColumnDef::new(CashMovements::RunningBalanceMinor).big_integer())
                    .col(ColumnDef::new(CashMovements::CounterpartyUserId).string())
                    .col(ColumnDef::new(CashMovements::Status).string().not_null())
                    .col(ColumnDef::new(CashMovements::CreatedBy).string().not_null())
                    .col(ColumnDef::new(CashMovements::ConfirmedBy).string())
                    .col(ColumnDef::new(CashMovements::ConfirmedAt).timestamp())
                    .col(ColumnDef::new(CashMovements::CancelledBy).string())
                    .col(ColumnDef::new(CashMovements::CancelledAt).timestamp())
                    .col(ColumnDef::new(CashMovements::CancelReason).string())
                    .col(
                        ColumnDef::new(CashMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_movements-account_id")
                            .from(CashMovements::Table, CashMovements::AccountId)
                            .to(CashAccounts::Table, CashAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_movements-account_id-date")
                    .table(CashMovements::Table)
                    .col(CashMovements::AccountId)
                    .col(CashMovements::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_movements-account_id-reference-unique")
                    .table(CashMovements::Table)
                    .col(CashMovements::AccountId)
                    .col(CashMovements::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_movements-status")
                    .table(CashMovements::Table)
                    .col(CashMovements::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Cash reconciliations (arqueos)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashReconciliations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashReconciliations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashReconciliations::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashReconciliations::Date).date().not_null())
                    .col(
                        ColumnDef::new(CashReconciliations::SystemBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashReconciliations::CountedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashReconciliations::DifferenceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashReconciliations::Outcome)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashReconciliations::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashReconciliations::Notes).string())
                    .col(ColumnDef::new(CashReconciliations::AdjustmentMovementId).string())
                    .col(
                        ColumnDef::new(CashReconciliations::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashReconciliations::ApprovedBy).string())
                    .col(ColumnDef::new(CashReconciliations::ApprovedAt).timestamp())
                    .col(
                        ColumnDef::new(CashReconciliations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_reconciliations-account_id")
                            .from(CashReconciliations::Table, CashReconciliations::AccountId)
                            .to(CashAccounts::Table, CashAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_reconciliations-account_id-date")
                    .table(CashReconciliations::Table)
                    .col(CashReconciliations::AccountId)
                    .col(CashReconciliations::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Bank accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankAccounts::Code).string().not_null())
                    .col(ColumnDef::new(BankAccounts::Name).string().not_null())
                    .col(ColumnDef::new(BankAccounts::BankName).string().not_null())
                    .col(
                        ColumnDef::new(BankAccounts::AccountNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankAccounts::CurrencyId).string().not_null())
                    .col(ColumnDef::new(BankAccounts::LedgerAccountId).string())
                    .col(
                        ColumnDef::new(BankAccounts::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankAccounts::Active).boolean().not_null())
                    .col(
                        ColumnDef::new(BankAccounts::MovementSeq)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_accounts-currency_id")
                            .from(BankAccounts::Table, BankAccounts::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_accounts-ledger_account_id")
                            .from(BankAccounts::Table, BankAccounts::LedgerAccountId)
                            .to(LedgerAccounts::Table, LedgerAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_accounts-code-unique")
                    .table(BankAccounts::Table)
                    .col(BankAccounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Bank transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankTransactions::Kind).string().not_null())
                    .col(ColumnDef::new(BankTransactions::Date).date().not_null())
                    .col(ColumnDef::new(BankTransactions::ValueDate).date())
                    .col(
                        ColumnDef::new(BankTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::Reference)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankTransactions::ReferenceNumber).string())
                    .col(ColumnDef::new(BankTransactions::RunningBalanceMinor).big_integer())
                    .col(ColumnDef::new(BankTransactions::CounterpartyUserId).string())
                    .col(ColumnDef::new(BankTransactions::Status).string().not_null())
                    .col(
                        ColumnDef::new(BankTransactions::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankTransactions::ClearedBy).string())
                    .col(ColumnDef::new(BankTransactions::ClearedAt).timestamp())
                    .col(ColumnDef::new(BankTransactions::CancelledBy).string())
                    .col(ColumnDef::new(BankTransactions::CancelledAt).timestamp())
                    .col(ColumnDef::new(BankTransactions::CancelReason).string())
                    .col(
                        ColumnDef::new(BankTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_transactions-account_id")
                            .from(BankTransactions::Table, BankTransactions::AccountId)
                            .to(BankAccounts::Table, BankAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_transactions-account_id-date")
                    .table(BankTransactions::Table)
                    .col(BankTransactions::AccountId)
                    .col(BankTransactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_transactions-account_id-reference-unique")
                    .table(BankTransactions::Table)
                    .col(BankTransactions::AccountId)
                    .col(BankTransactions::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_transactions-status")
                    .table(BankTransactions::Table)
                    .col(BankTransactions::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Bank reconciliations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankReconciliations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankReconciliations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliations::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliations::StatementDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliations::StatementBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliations::ReconciledBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BankReconciliations::IsReconciled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BankReconciliations::DifferenceMinor).big_integer())
                    .col(ColumnDef::new(BankReconciliations::Notes).string())
                    .col(
                        ColumnDef::new(BankReconciliations::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankReconciliations::CompletedBy).string())
                    .col(ColumnDef::new(BankReconciliations::CompletedAt).timestamp())
                    .col(
                        ColumnDef::new(BankReconciliations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_reconciliations-account_id")
                            .from(BankReconciliations::Table, BankReconciliations::AccountId)
                            .to(BankAccounts::Table, BankAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_reconciliations-account_id-statement_date")
                    .table(BankReconciliations::Table)
                    .col(BankReconciliations::AccountId)
                    .col(BankReconciliations::StatementDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Bank reconciliation items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankReconciliationItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankReconciliationItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliationItems::ReconciliationId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliationItems::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankReconciliationItems::IsReconciled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BankReconciliationItems::MatchedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_reconciliation_items-reconciliation_id")
                            .from(
                                BankReconciliationItems::Table,
                                BankReconciliationItems::ReconciliationId,
                            )
                            .to(BankReconciliations::Table, BankReconciliations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_reconciliation_items-transaction_id")
                            .from(
                                BankReconciliationItems::Table,
                                BankReconciliationItems::TransactionId,
                            )
                            .to(BankTransactions::Table, BankTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_reconciliation_items-transaction_id")
                    .table(BankReconciliationItems::Table)
                    .col(BankReconciliationItems::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_reconciliation_items-reconciliation_id")
                    .table(BankReconciliationItems::Table)
                    .col(BankReconciliationItems::ReconciliationId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Inter-bank transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InterBankTransfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InterBankTransfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InterBankTransfers::FromAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InterBankTransfers::ToAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InterBankTransfers::Date).date().not_null())
                    .col(
                        ColumnDef::new(InterBankTransfers::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InterBankTransfers::FeeMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(InterBankTransfers::Status).string().not_null())
                    .col(ColumnDef::new(InterBankTransfers::Description).string())
                    .col(ColumnDef::new(InterBankTransfers::Reference).string())
                    .col(ColumnDef::new(InterBankTransfers::DebitTransactionId).string())
                    .col(ColumnDef::new(InterBankTransfers::CreditTransactionId).string())
                    .col(ColumnDef::new(InterBankTransfers::FeeTransactionId).string())
                    .col(
                        ColumnDef::new(InterBankTransfers::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InterBankTransfers::ProcessedBy).string())
                    .col(ColumnDef::new(InterBankTransfers::ProcessedAt).timestamp())
                    .col(ColumnDef::new(InterBankTransfers::CancelledBy).string())
                    .col(ColumnDef::new(InterBankTransfers::CancelledAt).timestamp())
                    .col(ColumnDef::new(InterBankTransfers::CancelReason).string())
                    .col(
                        ColumnDef::new(InterBankTransfers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inter_bank_transfers-from_account_id")
                            .from(InterBankTransfers::Table, InterBankTransfers::FromAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inter_bank_transfers-to_account_id")
                            .from(InterBankTransfers::Table, InterBankTransfers::ToAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inter_bank_transfers-status")
                    .table(InterBankTransfers::Table)
                    .col(InterBankTransfers::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(InterBankTransfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankReconciliationItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankReconciliations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashReconciliations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
