//! Movement API endpoints (cash movements and bank transactions).

use api_types::movement::{
    BankTransactionNew, BankTransactionView, CashMovementNew, CashMovementView, MovementCancel,
    MovementList,
};
use api_types::{
    BankTransactionKind as ApiBankKind, CashMovementKind as ApiCashKind, MovementStatus,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{
    BankTransactionCmd, BankTransactionListFilter, CashMovementCmd, CashMovementListFilter,
};

fn cash_kind(kind: ApiCashKind) -> engine::CashMovementKind {
    match kind {
        ApiCashKind::Income => engine::CashMovementKind::Income,
        ApiCashKind::Expense => engine::CashMovementKind::Expense,
        ApiCashKind::TransferIn => engine::CashMovementKind::TransferIn,
        ApiCashKind::TransferOut => engine::CashMovementKind::TransferOut,
    }
}

fn cash_kind_view(kind: engine::CashMovementKind) -> ApiCashKind {
    match kind {
        engine::CashMovementKind::Income => ApiCashKind::Income,
        engine::CashMovementKind::Expense => ApiCashKind::Expense,
        engine::CashMovementKind::TransferIn => ApiCashKind::TransferIn,
        engine::CashMovementKind::TransferOut => ApiCashKind::TransferOut,
    }
}

fn bank_kind(kind: ApiBankKind) -> engine::BankTransactionKind {
    match kind {
        ApiBankKind::Deposit => engine::BankTransactionKind::Deposit,
        ApiBankKind::Withdrawal => engine::BankTransactionKind::Withdrawal,
        ApiBankKind::Transfer => engine::BankTransactionKind::Transfer,
        ApiBankKind::Payment => engine::BankTransactionKind::Payment,
        ApiBankKind::Receipt => engine::BankTransactionKind::Receipt,
    }
}

fn bank_kind_view(kind: engine::BankTransactionKind) -> ApiBankKind {
    match kind {
        engine::BankTransactionKind::Deposit => ApiBankKind::Deposit,
        engine::BankTransactionKind::Withdrawal => ApiBankKind::Withdrawal,
        engine::BankTransactionKind::Transfer => ApiBankKind::Transfer,
        engine::BankTransactionKind::Payment => ApiBankKind::Payment,
        engine::BankTransactionKind::Receipt => ApiBankKind::Receipt,
    }
}

fn cash_status(status: engine::CashMovementStatus) -> MovementStatus {
    match status {
        engine::CashMovementStatus::Pending => MovementStatus::Pending,
        engine::CashMovementStatus::Confirmed => MovementStatus::Confirmed,
        engine::CashMovementStatus::Cancelled => MovementStatus::Cancelled,
    }
}

fn bank_status(status: engine::BankTransactionStatus) -> MovementStatus {
    match status {
        engine::BankTransactionStatus::Pending => MovementStatus::Pending,
        engine::BankTransactionStatus::Cleared => MovementStatus::Cleared,
        engine::BankTransactionStatus::Cancelled => MovementStatus::Cancelled,
    }
}

fn cash_movement_view(movement: engine::CashMovement) -> CashMovementView {
    CashMovementView {
        id: movement.id,
        account_id: movement.account_id,
        kind: cash_kind_view(movement.kind),
        date: movement.date,
        description: movement.description,
        amount_minor: movement.amount_minor,
        reference: movement.reference,
        running_balance_minor: movement.running_balance_minor,
        status: cash_status(movement.status),
        created_by: movement.created_by,
        created_at: movement.created_at,
    }
}

fn bank_transaction_view(tx: engine::BankTransaction) -> BankTransactionView {
    BankTransactionView {
        id: tx.id,
        account_id: tx.account_id,
        kind: bank_kind_view(tx.kind),
        date: tx.date,
        description: tx.description,
        amount_minor: tx.amount_minor,
        reference: tx.reference,
        reference_number: tx.reference_number,
        running_balance_minor: tx.running_balance_minor,
        status: bank_status(tx.status),
        created_by: tx.created_by,
        created_at: tx.created_at,
    }
}

pub async fn cash_movement_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashMovementNew>,
) -> Result<Json<CashMovementView>, ServerError> {
    let mut cmd = CashMovementCmd::new(
        payload.account_id,
        cash_kind(payload.kind),
        payload.date,
        payload.description,
        payload.amount_minor,
        user.username,
    );
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }
    if let Some(counterparty) = payload.counterparty_user_id {
        cmd = cmd.counterparty_user_id(counterparty);
    }
    if payload.auto_confirm.unwrap_or(false) {
        cmd = cmd.auto_confirm();
    }

    let movement = state.engine.create_cash_movement(cmd).await?;
    Ok(Json(cash_movement_view(movement)))
}

pub async fn cash_movement_confirm(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CashMovementView>, ServerError> {
    let movement = state.engine.confirm_cash_movement(id, &user.username).await?;
    Ok(Json(cash_movement_view(movement)))
}

pub async fn cash_movement_cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovementCancel>,
) -> Result<Json<CashMovementView>, ServerError> {
    let movement = state
        .engine
        .cancel_cash_movement(id, &user.username, payload.reason.as_deref())
        .await?;
    Ok(Json(cash_movement_view(movement)))
}

pub async fn cash_movement_list(
    State(state): State<ServerState>,
    Json(payload): Json<MovementList>,
) -> Result<Json<Vec<CashMovementView>>, ServerError> {
    let filter = CashMovementListFilter {
        from: payload.from,
        to: payload.to,
        kinds: None,
        include_cancelled: payload.include_cancelled.unwrap_or(false),
    };
    let movements = state
        .engine
        .list_cash_movements(payload.account_id, &filter, payload.limit.unwrap_or(50))
        .await?;
    Ok(Json(
        movements.into_iter().map(cash_movement_view).collect(),
    ))
}

pub async fn bank_transaction_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BankTransactionNew>,
) -> Result<Json<BankTransactionView>, ServerError> {
    let mut cmd = BankTransactionCmd::new(
        payload.account_id,
        bank_kind(payload.kind),
        payload.date,
        payload.description,
        payload.amount_minor,
        user.username,
    );
    if let Some(value_date) = payload.value_date {
        cmd = cmd.value_date(value_date);
    }
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }
    if let Some(number) = payload.reference_number {
        cmd = cmd.reference_number(number);
    }
    if let Some(counterparty) = payload.counterparty_user_id {
        cmd = cmd.counterparty_user_id(counterparty);
    }
    if payload.auto_clear.unwrap_or(false) {
        cmd = cmd.auto_clear();
    }

    let tx = state.engine.create_bank_transaction(cmd).await?;
    Ok(Json(bank_transaction_view(tx)))
}

pub async fn bank_transaction_clear(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankTransactionView>, ServerError> {
    let tx = state.engine.clear_bank_transaction(id, &user.username).await?;
    Ok(Json(bank_transaction_view(tx)))
}

pub async fn bank_transaction_cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovementCancel>,
) -> Result<Json<BankTransactionView>, ServerError> {
    let tx = state
        .engine
        .cancel_bank_transaction(id, &user.username, payload.reason.as_deref())
        .await?;
    Ok(Json(bank_transaction_view(tx)))
}

pub async fn bank_transaction_list(
    State(state): State<ServerState>,
    Json(payload): Json<MovementList>,
) -> Result<Json<Vec<BankTransactionView>>, ServerError> {
    let filter = BankTransactionListFilter {
        from: payload.from,
        to: payload.to,
        kinds: None,
        include_cancelled: payload.include_cancelled.unwrap_or(false),
    };
    let transactions = state
        .engine
        .list_bank_transactions(payload.account_id, &filter, payload.limit.unwrap_or(50))
        .await?;
    Ok(Json(
        transactions.into_iter().map(bank_transaction_view).collect(),
    ))
}
