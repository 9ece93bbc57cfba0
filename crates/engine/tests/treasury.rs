use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AutoMatchCmd, BankTransactionCmd, BankTransactionKind, BankTransactionStatus,
    BankReconciliationCmd, CashMovementCmd, CashMovementKind, CashMovementStatus,
    CashReconciliationCmd, CashTransferCmd, Engine, EngineError, ErrorKind, InterBankTransferCmd,
    InterBankTransferStatus, MatchCriteria, NewBankAccountCmd, NewCashAccountCmd,
    ReconciliationOutcome, ReconciliationStatus,
};
use migration::MigratorTrait;

const ACTOR: &str = "tesorero";

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();

    for (username, active) in [("tesorero", true), ("exempleado", false)] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, active) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), active.into()],
        ))
        .await
        .unwrap();
    }

    for (id, code, name, active) in [
        ("PEN", "PEN", "Sol", true),
        ("OLD", "OLD", "Retired currency", false),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO currencies (id, code, name, active) VALUES (?, ?, ?, ?)",
            vec![id.into(), code.into(), name.into(), active.into()],
        ))
        .await
        .unwrap();
    }

    for (id, code, name, allows) in [
        ("gl-101", "10.1", "Caja", true),
        ("gl-root", "10", "Activo disponible", false),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO ledger_accounts (id, code, name, allows_postings) VALUES (?, ?, ?, ?)",
            vec![id.into(), code.into(), name.into(), allows.into()],
        ))
        .await
        .unwrap();
    }

    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
}

async fn cash_account(engine: &Engine, code: &str) -> Uuid {
    engine
        .create_cash_account(NewCashAccountCmd::new(code, "Caja", "PEN", ACTOR))
        .await
        .unwrap()
        .id
}

async fn bank_account(engine: &Engine, code: &str) -> Uuid {
    engine
        .create_bank_account(NewBankAccountCmd::new(
            code,
            "Cuenta corriente",
            "BCP",
            "191-000111222",
            "PEN",
            ACTOR,
        ))
        .await
        .unwrap()
        .id
}

async fn confirmed_income(engine: &Engine, account_id: Uuid, amount_minor: i64) {
    engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Income,
                date(1),
                "Opening income",
                amount_minor,
                ACTOR,
            )
            .auto_confirm(),
        )
        .await
        .unwrap();
}

async fn cleared_deposit(engine: &Engine, account_id: Uuid, amount_minor: i64) {
    engine
        .create_bank_transaction(
            BankTransactionCmd::new(
                account_id,
                BankTransactionKind::Deposit,
                date(1),
                "Opening deposit",
                amount_minor,
                ACTOR,
            )
            .auto_clear(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn create_cash_account_rejects_duplicate_code() {
    let (engine, _db) = engine_with_db().await;
    cash_account(&engine, "CAJA-01").await;

    let err = engine
        .create_cash_account(NewCashAccountCmd::new("CAJA-01", "Otra caja", "PEN", ACTOR))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn create_cash_account_validates_references() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_cash_account(NewCashAccountCmd::new("CAJA-01", "Caja", "XXX", ACTOR))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("currency".to_string()));

    let err = engine
        .create_cash_account(NewCashAccountCmd::new("CAJA-01", "Caja", "OLD", ACTOR))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    let err = engine
        .create_cash_account(
            NewCashAccountCmd::new("CAJA-01", "Caja", "PEN", ACTOR).ledger_account_id("gl-root"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    let err = engine
        .create_cash_account(
            NewCashAccountCmd::new("CAJA-01", "Caja", "PEN", ACTOR)
                .responsible_user_id("exempleado"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InactiveRef("user exempleado".to_string()));

    // A valid combination still goes through.
    engine
        .create_cash_account(
            NewCashAccountCmd::new("CAJA-01", "Caja", "PEN", ACTOR)
                .ledger_account_id("gl-101")
                .responsible_user_id("tesorero"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn pending_movement_never_touches_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;

    let movement = engine
        .create_cash_movement(CashMovementCmd::new(
            account_id,
            CashMovementKind::Income,
            date(2),
            "Sale in cash",
            10_000,
            ACTOR,
        ))
        .await
        .unwrap();
    assert_eq!(movement.status, CashMovementStatus::Pending);
    assert_eq!(movement.running_balance_minor, None);

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 0);

    // Cancelling a pending movement has no balance effect either.
    let cancelled = engine
        .cancel_cash_movement(movement.id, ACTOR, Some("typo"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, CashMovementStatus::Cancelled);
    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 0);
}

#[tokio::test]
async fn confirm_applies_signed_amount_once() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;

    let movement = engine
        .create_cash_movement(CashMovementCmd::new(
            account_id,
            CashMovementKind::Income,
            date(2),
            "Sale in cash",
            10_000,
            ACTOR,
        ))
        .await
        .unwrap();

    let confirmed = engine.confirm_cash_movement(movement.id, ACTOR).await.unwrap();
    assert_eq!(confirmed.status, CashMovementStatus::Confirmed);
    assert_eq!(confirmed.running_balance_minor, Some(10_000));
    assert_eq!(confirmed.confirmed_by.as_deref(), Some(ACTOR));

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);

    // A second confirm is a state conflict and leaves the balance alone.
    let err = engine
        .confirm_cash_movement(movement.id, ACTOR)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn cancel_confirmed_reverses_and_is_terminal() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 10_000).await;

    let expense = engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Expense,
                date(3),
                "Stationery",
                2_500,
                ACTOR,
            )
            .auto_confirm(),
        )
        .await
        .unwrap();
    assert_eq!(expense.running_balance_minor, Some(7_500));

    let cancelled = engine
        .cancel_cash_movement(expense.id, ACTOR, Some("charged twice"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, CashMovementStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("charged twice"));

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);

    // Cancelling again must not double-reverse.
    let err = engine
        .cancel_cash_movement(expense.id, ACTOR, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn insufficient_funds_rolls_back_the_movement_row() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 1_000).await;

    let err = engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Expense,
                date(3),
                "Too large",
                5_000,
                ACTOR,
            )
            .auto_confirm(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("CAJA-01".to_string()));

    // Whole transaction rolled back: no movement row, no balance change.
    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 1_000);
    let movements = engine
        .list_cash_movements(account_id, &Default::default(), 50)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
}

#[tokio::test]
async fn ceiling_is_enforced_on_confirm() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .create_cash_account(
            NewCashAccountCmd::new("CAJA-02", "Caja chica", "PEN", ACTOR).max_amount_minor(50_000),
        )
        .await
        .unwrap();

    confirmed_income(&engine, account.id, 45_000).await;

    let err = engine
        .create_cash_movement(
            CashMovementCmd::new(
                account.id,
                CashMovementKind::Income,
                date(4),
                "Deposit over the cap",
                10_000,
                ACTOR,
            )
            .auto_confirm(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::CeilingExceeded("CAJA-02".to_string()));

    let account = engine.cash_account(account.id).await.unwrap();
    assert_eq!(account.balance_minor, 45_000);
}

#[tokio::test]
async fn references_are_sequential_per_account() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;

    let mut references = Vec::new();
    for i in 0..3 {
        let movement = engine
            .create_cash_movement(CashMovementCmd::new(
                account_id,
                CashMovementKind::Income,
                date(2),
                format!("Movement {i}"),
                1_000,
                ACTOR,
            ))
            .await
            .unwrap();
        references.push(movement.reference);
    }
    assert_eq!(
        references,
        vec!["CAJA-01-000001", "CAJA-01-000002", "CAJA-01-000003"]
    );

    // Supplied references must be unique per account.
    engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Income,
                date(2),
                "Manual ref",
                1_000,
                ACTOR,
            )
            .reference("REC-77"),
        )
        .await
        .unwrap();
    let err = engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Income,
                date(2),
                "Manual ref again",
                1_000,
                ACTOR,
            )
            .reference("REC-77"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn transfer_moves_both_balances_atomically() {
    let (engine, _db) = engine_with_db().await;
    let from = cash_account(&engine, "CAJA-01").await;
    let to = cash_account(&engine, "CAJA-02").await;
    confirmed_income(&engine, from, 10_000).await;

    let (out, incoming) = engine
        .transfer_cash(CashTransferCmd::new(
            from,
            to,
            date(5),
            2_500,
            "Replenish small box",
            ACTOR,
        ))
        .await
        .unwrap();
    assert_eq!(out.kind, CashMovementKind::TransferOut);
    assert_eq!(out.status, CashMovementStatus::Confirmed);
    assert_eq!(incoming.kind, CashMovementKind::TransferIn);
    assert_eq!(incoming.status, CashMovementStatus::Confirmed);

    assert_eq!(engine.cash_account(from).await.unwrap().balance_minor, 7_500);
    assert_eq!(engine.cash_account(to).await.unwrap().balance_minor, 2_500);
}

#[tokio::test]
async fn failed_transfer_leaves_no_trace_on_either_account() {
    let (engine, _db) = engine_with_db().await;
    let from = cash_account(&engine, "CAJA-01").await;
    let to = cash_account(&engine, "CAJA-02").await;
    confirmed_income(&engine, from, 1_000).await;

    let err = engine
        .transfer_cash(CashTransferCmd::new(
            from,
            to,
            date(5),
            5_000,
            "Too large",
            ACTOR,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("CAJA-01".to_string()));

    assert_eq!(engine.cash_account(from).await.unwrap().balance_minor, 1_000);
    assert_eq!(engine.cash_account(to).await.unwrap().balance_minor, 0);
    let to_movements = engine
        .list_cash_movements(to, &Default::default(), 50)
        .await
        .unwrap();
    assert!(to_movements.is_empty());
}

#[tokio::test]
async fn transfer_to_same_account_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;

    let err = engine
        .transfer_cash(CashTransferCmd::new(
            account_id,
            account_id,
            date(5),
            1_000,
            "Loop",
            ACTOR,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn deactivation_requires_zero_balance_and_no_pending_movements() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 1_000).await;

    let err = engine.deactivate_cash_account(account_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Drain the balance, then leave a pending movement around.
    engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Expense,
                date(6),
                "Drain",
                1_000,
                ACTOR,
            )
            .auto_confirm(),
        )
        .await
        .unwrap();
    let pending = engine
        .create_cash_movement(CashMovementCmd::new(
            account_id,
            CashMovementKind::Income,
            date(6),
            "Still pending",
            500,
            ACTOR,
        ))
        .await
        .unwrap();
    let err = engine.deactivate_cash_account(account_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    engine
        .cancel_cash_movement(pending.id, ACTOR, None)
        .await
        .unwrap();
    let account = engine.deactivate_cash_account(account_id).await.unwrap();
    assert!(!account.active);

    // No movements against an inactive account.
    let err = engine
        .create_cash_movement(CashMovementCmd::new(
            account_id,
            CashMovementKind::Income,
            date(7),
            "Too late",
            500,
            ACTOR,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
}

#[tokio::test]
async fn arqueo_classifies_difference_and_blocks_duplicates() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 10_000).await;

    let arqueo = engine
        .create_cash_reconciliation(CashReconciliationCmd::new(
            account_id,
            date(10),
            9_500,
            ACTOR,
        ))
        .await
        .unwrap();
    assert_eq!(arqueo.system_balance_minor, 10_000);
    assert_eq!(arqueo.difference_minor, -500);
    assert_eq!(arqueo.outcome, ReconciliationOutcome::Shortage);
    assert_eq!(arqueo.status, ReconciliationStatus::Pending);

    let err = engine
        .create_cash_reconciliation(CashReconciliationCmd::new(
            account_id,
            date(10),
            10_000,
            ACTOR,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn arqueo_balanced_only_at_exact_match() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 10_000).await;

    let arqueo = engine
        .create_cash_reconciliation(CashReconciliationCmd::new(
            account_id,
            date(10),
            10_000,
            ACTOR,
        ))
        .await
        .unwrap();
    assert_eq!(arqueo.outcome, ReconciliationOutcome::Balanced);
    assert_eq!(arqueo.difference_minor, 0);
}

#[tokio::test]
async fn arqueo_shortage_adjustment_posts_one_expense() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 10_000).await;

    let arqueo = engine
        .create_cash_reconciliation(CashReconciliationCmd::new(
            account_id,
            date(10),
            9_950,
            ACTOR,
        ))
        .await
        .unwrap();

    let approved = engine
        .approve_cash_reconciliation(arqueo.id, ACTOR, true)
        .await
        .unwrap();
    assert_eq!(approved.status, ReconciliationStatus::Adjusted);

    let adjustment_id = approved.adjustment_movement_id.unwrap();
    let adjustment = engine.cash_movement(adjustment_id).await.unwrap();
    assert_eq!(adjustment.kind, CashMovementKind::Expense);
    assert_eq!(adjustment.amount_minor, 50);
    assert_eq!(adjustment.status, CashMovementStatus::Confirmed);

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 9_950);

    // Terminal: a second approval attempt is rejected.
    let err = engine
        .approve_cash_reconciliation(arqueo.id, ACTOR, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn arqueo_overage_adjustment_posts_one_income() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 10_000).await;

    let arqueo = engine
        .create_cash_reconciliation(CashReconciliationCmd::new(
            account_id,
            date(10),
            10_200,
            ACTOR,
        ))
        .await
        .unwrap();
    assert_eq!(arqueo.outcome, ReconciliationOutcome::Overage);

    let approved = engine
        .approve_cash_reconciliation(arqueo.id, ACTOR, true)
        .await
        .unwrap();
    let adjustment = engine
        .cash_movement(approved.adjustment_movement_id.unwrap())
        .await
        .unwrap();
    assert_eq!(adjustment.kind, CashMovementKind::Income);
    assert_eq!(adjustment.amount_minor, 200);

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 10_200);
}

#[tokio::test]
async fn arqueo_approval_without_adjustment_keeps_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;
    confirmed_income(&engine, account_id, 10_000).await;

    let arqueo = engine
        .create_cash_reconciliation(CashReconciliationCmd::new(
            account_id,
            date(10),
            9_500,
            ACTOR,
        ))
        .await
        .unwrap();
    let approved = engine
        .approve_cash_reconciliation(arqueo.id, ACTOR, false)
        .await
        .unwrap();
    assert_eq!(approved.status, ReconciliationStatus::Approved);
    assert_eq!(approved.adjustment_movement_id, None);

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn bank_transactions_mirror_the_cash_lifecycle() {
    let (engine, _db) = engine_with_db().await;
    let account_id = bank_account(&engine, "BCP-01").await;

    let deposit = engine
        .create_bank_transaction(BankTransactionCmd::new(
            account_id,
            BankTransactionKind::Deposit,
            date(2),
            "Client wire",
            50_000,
            ACTOR,
        ))
        .await
        .unwrap();
    assert_eq!(deposit.status, BankTransactionStatus::Pending);
    assert_eq!(engine.bank_account(account_id).await.unwrap().balance_minor, 0);

    let cleared = engine
        .clear_bank_transaction(deposit.id, ACTOR)
        .await
        .unwrap();
    assert_eq!(cleared.status, BankTransactionStatus::Cleared);
    assert_eq!(cleared.running_balance_minor, Some(50_000));

    let err = engine
        .clear_bank_transaction(deposit.id, ACTOR)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let cancelled = engine
        .cancel_bank_transaction(deposit.id, ACTOR, Some("bank reversed the wire"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, BankTransactionStatus::Cancelled);
    assert_eq!(engine.bank_account(account_id).await.unwrap().balance_minor, 0);
}

#[tokio::test]
async fn inter_bank_transfer_books_both_legs_and_fee() {
    let (engine, _db) = engine_with_db().await;
    let from = bank_account(&engine, "BCP-01").await;
    let to = bank_account(&engine, "BBVA-01").await;
    cleared_deposit(&engine, from, 100_000).await;

    let transfer = engine
        .create_inter_bank_transfer(
            InterBankTransferCmd::new(from, to, date(8), 30_000, ACTOR).fee_minor(1_500),
        )
        .await
        .unwrap();
    assert_eq!(transfer.status, InterBankTransferStatus::Pending);
    // Pending transfers have no balance effect.
    assert_eq!(
        engine.bank_account(from).await.unwrap().balance_minor,
        100_000
    );

    let processed = engine
        .process_inter_bank_transfer(transfer.id, ACTOR)
        .await
        .unwrap();
    assert_eq!(processed.status, InterBankTransferStatus::Processed);
    assert!(processed.debit_transaction_id.is_some());
    assert!(processed.credit_transaction_id.is_some());
    assert!(processed.fee_transaction_id.is_some());

    assert_eq!(
        engine.bank_account(from).await.unwrap().balance_minor,
        68_500
    );
    assert_eq!(engine.bank_account(to).await.unwrap().balance_minor, 30_000);

    let fee_tx = engine
        .bank_transaction(processed.fee_transaction_id.unwrap())
        .await
        .unwrap();
    assert_eq!(fee_tx.kind, BankTransactionKind::Payment);
    assert_eq!(fee_tx.amount_minor, 1_500);
}

#[tokio::test]
async fn inter_bank_transfer_without_fee_books_two_legs() {
    let (engine, _db) = engine_with_db().await;
    let from = bank_account(&engine, "BCP-01").await;
    let to = bank_account(&engine, "BBVA-01").await;
    cleared_deposit(&engine, from, 50_000).await;

    let transfer = engine
        .create_inter_bank_transfer(InterBankTransferCmd::new(from, to, date(8), 20_000, ACTOR))
        .await
        .unwrap();
    let processed = engine
        .process_inter_bank_transfer(transfer.id, ACTOR)
        .await
        .unwrap();
    assert_eq!(processed.fee_transaction_id, None);
    assert_eq!(
        engine.bank_account(from).await.unwrap().balance_minor,
        30_000
    );
}

#[tokio::test]
async fn inter_bank_transfer_failure_rolls_back_both_accounts() {
    let (engine, _db) = engine_with_db().await;
    let from = bank_account(&engine, "BCP-01").await;
    let to = bank_account(&engine, "BBVA-01").await;
    cleared_deposit(&engine, from, 10_000).await;

    let transfer = engine
        .create_inter_bank_transfer(
            InterBankTransferCmd::new(from, to, date(8), 10_000, ACTOR).fee_minor(500),
        )
        .await
        .unwrap();

    // amount + fee exceeds the source balance
    let err = engine
        .process_inter_bank_transfer(transfer.id, ACTOR)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("BCP-01".to_string()));

    assert_eq!(
        engine.bank_account(from).await.unwrap().balance_minor,
        10_000
    );
    assert_eq!(engine.bank_account(to).await.unwrap().balance_minor, 0);
    let reloaded = engine.inter_bank_transfer(transfer.id).await.unwrap();
    assert_eq!(reloaded.status, InterBankTransferStatus::Pending);
}

#[tokio::test]
async fn inter_bank_transfer_cancel_is_pending_only() {
    let (engine, _db) = engine_with_db().await;
    let from = bank_account(&engine, "BCP-01").await;
    let to = bank_account(&engine, "BBVA-01").await;
    cleared_deposit(&engine, from, 50_000).await;

    let transfer = engine
        .create_inter_bank_transfer(InterBankTransferCmd::new(from, to, date(8), 10_000, ACTOR))
        .await
        .unwrap();
    engine
        .process_inter_bank_transfer(transfer.id, ACTOR)
        .await
        .unwrap();

    let err = engine
        .cancel_inter_bank_transfer(transfer.id, ACTOR, Some("changed our mind"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let other = engine
        .create_inter_bank_transfer(InterBankTransferCmd::new(from, to, date(9), 5_000, ACTOR))
        .await
        .unwrap();
    let cancelled = engine
        .cancel_inter_bank_transfer(other.id, ACTOR, Some("duplicate request"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, InterBankTransferStatus::Cancelled);
}

#[tokio::test]
async fn bank_reconciliation_seeds_only_cleared_transactions() {
    let (engine, _db) = engine_with_db().await;
    let account_id = bank_account(&engine, "BCP-01").await;

    let deposit = engine
        .create_bank_transaction(
            BankTransactionCmd::new(
                account_id,
                BankTransactionKind::Deposit,
                date(20),
                "Client wire",
                40_000,
                ACTOR,
            )
            .auto_clear(),
        )
        .await
        .unwrap();
    let pending = engine
        .create_bank_transaction(BankTransactionCmd::new(
            account_id,
            BankTransactionKind::Withdrawal,
            date(21),
            "Cheque not yet presented",
            5_000,
            ACTOR,
        ))
        .await
        .unwrap();

    let err = engine
        .create_bank_reconciliation(
            BankReconciliationCmd::new(account_id, date(30), 40_000, ACTOR)
                .seed_transaction_ids(vec![pending.id]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let recon = engine
        .create_bank_reconciliation(
            BankReconciliationCmd::new(account_id, date(30), 40_000, ACTOR)
                .seed_transaction_ids(vec![deposit.id]),
        )
        .await
        .unwrap();
    assert_eq!(recon.reconciled_balance_minor, 40_000);

    // Duplicate open reconciliation for the same account and date.
    let err = engine
        .create_bank_reconciliation(BankReconciliationCmd::new(
            account_id,
            date(30),
            40_000,
            ACTOR,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn auto_match_applies_rules_in_date_order() {
    let (engine, _db) = engine_with_db().await;
    let account_id = bank_account(&engine, "BCP-01").await;
    let statement_date = date(30);

    // Three cleared candidates: on the statement date, one day before, ten
    // days before. No external reference numbers, so only the exact and
    // range rules can fire.
    for (day, kind, amount, description) in [
        (30, BankTransactionKind::Deposit, 10_000, "On the date"),
        (29, BankTransactionKind::Withdrawal, 2_000, "Day before"),
        (20, BankTransactionKind::Deposit, 5_000, "Ten days before"),
    ] {
        engine
            .create_bank_transaction(
                BankTransactionCmd::new(
                    account_id,
                    kind,
                    date(day),
                    description,
                    amount,
                    ACTOR,
                )
                .auto_clear(),
            )
            .await
            .unwrap();
    }

    let recon = engine
        .create_bank_reconciliation(BankReconciliationCmd::new(
            account_id,
            statement_date,
            8_000,
            ACTOR,
        ))
        .await
        .unwrap();

    let summary = engine
        .auto_match_bank_reconciliation(AutoMatchCmd::new(recon.id))
        .await
        .unwrap();
    assert_eq!(summary.candidates_considered, 3);
    assert_eq!(summary.matched_count, 2);
    assert_eq!(summary.matched_amount_minor, 8_000);
    assert!((summary.match_percentage - 66.67).abs() < 0.01);

    let recon = engine.bank_reconciliation(recon.id).await.unwrap();
    assert_eq!(recon.reconciled_balance_minor, 8_000);

    let matched = engine
        .bank_reconciliation_transactions(recon.id)
        .await
        .unwrap();
    assert_eq!(matched.len(), 2);
    assert!(matched.iter().all(|tx| tx.date >= date(29)));
}

#[tokio::test]
async fn auto_match_reference_rule_catches_distant_transactions() {
    let (engine, _db) = engine_with_db().await;
    let account_id = bank_account(&engine, "BCP-01").await;

    engine
        .create_bank_transaction(
            BankTransactionCmd::new(
                account_id,
                BankTransactionKind::Payment,
                date(20),
                "Cheque with statement reference",
                3_000,
                ACTOR,
            )
            .reference_number("CHQ-1180")
            .auto_clear(),
        )
        .await
        .unwrap();

    let recon = engine
        .create_bank_reconciliation(BankReconciliationCmd::new(account_id, date(30), 0, ACTOR))
        .await
        .unwrap();

    // Outside the range window but carrying a reference number.
    let summary = engine
        .auto_match_bank_reconciliation(AutoMatchCmd::new(recon.id))
        .await
        .unwrap();
    assert_eq!(summary.matched_count, 1);
    assert_eq!(summary.matched_amount_minor, -3_000);

    // With the reference rule off the same transaction stays unmatched.
    let recon2 = engine
        .create_bank_reconciliation(BankReconciliationCmd::new(account_id, date(29), 0, ACTOR))
        .await
        .unwrap();
    let summary = engine
        .auto_match_bank_reconciliation(AutoMatchCmd::new(recon2.id).criteria(MatchCriteria {
            reference_match: false,
            ..MatchCriteria::default()
        }))
        .await
        .unwrap();
    assert_eq!(summary.matched_count, 0);
    // Already-reconciled candidates leave the pool entirely.
    assert_eq!(summary.candidates_considered, 0);
}

#[tokio::test]
async fn complete_reconciliation_stamps_difference_without_adjustment() {
    let (engine, _db) = engine_with_db().await;
    let account_id = bank_account(&engine, "BCP-01").await;

    engine
        .create_bank_transaction(
            BankTransactionCmd::new(
                account_id,
                BankTransactionKind::Deposit,
                date(30),
                "Client wire",
                10_000,
                ACTOR,
            )
            .auto_clear(),
        )
        .await
        .unwrap();

    let recon = engine
        .create_bank_reconciliation(BankReconciliationCmd::new(
            account_id,
            date(30),
            12_000,
            ACTOR,
        ))
        .await
        .unwrap();
    engine
        .auto_match_bank_reconciliation(AutoMatchCmd::new(recon.id))
        .await
        .unwrap();

    let completed = engine
        .complete_bank_reconciliation(recon.id, ACTOR)
        .await
        .unwrap();
    assert!(completed.is_reconciled);
    assert_eq!(completed.difference_minor, Some(2_000));
    assert_eq!(completed.completed_by.as_deref(), Some(ACTOR));

    // The account balance is untouched; the difference is manual follow-up.
    assert_eq!(
        engine.bank_account(account_id).await.unwrap().balance_minor,
        10_000
    );

    let err = engine
        .complete_bank_reconciliation(recon.id, ACTOR)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = engine
        .auto_match_bank_reconciliation(AutoMatchCmd::new(recon.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn reconciled_transactions_cannot_be_cancelled() {
    let (engine, _db) = engine_with_db().await;
    let account_id = bank_account(&engine, "BCP-01").await;

    let deposit = engine
        .create_bank_transaction(
            BankTransactionCmd::new(
                account_id,
                BankTransactionKind::Deposit,
                date(30),
                "Client wire",
                10_000,
                ACTOR,
            )
            .auto_clear(),
        )
        .await
        .unwrap();
    engine
        .create_bank_reconciliation(
            BankReconciliationCmd::new(account_id, date(30), 10_000, ACTOR)
                .seed_transaction_ids(vec![deposit.id]),
        )
        .await
        .unwrap();

    let err = engine
        .cancel_bank_transaction(deposit.id, ACTOR, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        engine.bank_account(account_id).await.unwrap().balance_minor,
        10_000
    );
}

#[tokio::test]
async fn balance_always_equals_confirmed_movement_sum() {
    let (engine, _db) = engine_with_db().await;
    let account_id = cash_account(&engine, "CAJA-01").await;

    confirmed_income(&engine, account_id, 10_000).await;
    let expense = engine
        .create_cash_movement(
            CashMovementCmd::new(
                account_id,
                CashMovementKind::Expense,
                date(3),
                "Supplies",
                1_500,
                ACTOR,
            )
            .auto_confirm(),
        )
        .await
        .unwrap();
    engine
        .create_cash_movement(CashMovementCmd::new(
            account_id,
            CashMovementKind::Expense,
            date(3),
            "Pending buy",
            700,
            ACTOR,
        ))
        .await
        .unwrap();
    engine
        .cancel_cash_movement(expense.id, ACTOR, None)
        .await
        .unwrap();

    let filter = engine::CashMovementListFilter {
        include_cancelled: true,
        ..Default::default()
    };
    let movements = engine
        .list_cash_movements(account_id, &filter, 50)
        .await
        .unwrap();
    let confirmed_sum: i64 = movements
        .iter()
        .filter(|m| m.status == CashMovementStatus::Confirmed)
        .map(|m| m.signed_amount_minor())
        .sum();

    let account = engine.cash_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, confirmed_sum);
    assert_eq!(account.balance_minor, 10_000);
}
