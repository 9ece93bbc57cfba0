//! Account API endpoints.

use api_types::account::{
    AccountList, BankAccountNew, BankAccountView, CashAccountNew, CashAccountView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{NewBankAccountCmd, NewCashAccountCmd};

fn cash_view(account: engine::CashAccount) -> CashAccountView {
    CashAccountView {
        id: account.id,
        code: account.code,
        name: account.name,
        currency_id: account.currency_id,
        balance_minor: account.balance_minor,
        max_amount_minor: account.max_amount_minor,
        active: account.active,
    }
}

fn bank_view(account: engine::BankAccount) -> BankAccountView {
    BankAccountView {
        id: account.id,
        code: account.code,
        name: account.name,
        bank_name: account.bank_name,
        account_number: account.account_number,
        currency_id: account.currency_id,
        balance_minor: account.balance_minor,
        active: account.active,
    }
}

pub async fn cash_account_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashAccountNew>,
) -> Result<Json<CashAccountView>, ServerError> {
    let mut cmd = NewCashAccountCmd::new(
        payload.code,
        payload.name,
        payload.currency_id,
        user.username,
    );
    if let Some(ledger_id) = payload.ledger_account_id {
        cmd = cmd.ledger_account_id(ledger_id);
    }
    if let Some(balance) = payload.initial_balance_minor {
        cmd = cmd.initial_balance_minor(balance);
    }
    if let Some(max) = payload.max_amount_minor {
        cmd = cmd.max_amount_minor(max);
    }
    if let Some(responsible) = payload.responsible_user_id {
        cmd = cmd.responsible_user_id(responsible);
    }

    let account = state.engine.create_cash_account(cmd).await?;
    Ok(Json(cash_view(account)))
}

pub async fn cash_account_get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CashAccountView>, ServerError> {
    let account = state.engine.cash_account(id).await?;
    Ok(Json(cash_view(account)))
}

pub async fn cash_account_list(
    State(state): State<ServerState>,
    Query(params): Query<AccountList>,
) -> Result<Json<Vec<CashAccountView>>, ServerError> {
    let accounts = state
        .engine
        .list_cash_accounts(params.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(accounts.into_iter().map(cash_view).collect()))
}

pub async fn cash_account_deactivate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CashAccountView>, ServerError> {
    let account = state.engine.deactivate_cash_account(id).await?;
    Ok(Json(cash_view(account)))
}

pub async fn bank_account_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BankAccountNew>,
) -> Result<Json<BankAccountView>, ServerError> {
    let mut cmd = NewBankAccountCmd::new(
        payload.code,
        payload.name,
        payload.bank_name,
        payload.account_number,
        payload.currency_id,
        user.username,
    );
    if let Some(ledger_id) = payload.ledger_account_id {
        cmd = cmd.ledger_account_id(ledger_id);
    }
    if let Some(balance) = payload.initial_balance_minor {
        cmd = cmd.initial_balance_minor(balance);
    }

    let account = state.engine.create_bank_account(cmd).await?;
    Ok(Json(bank_view(account)))
}

pub async fn bank_account_get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankAccountView>, ServerError> {
    let account = state.engine.bank_account(id).await?;
    Ok(Json(bank_view(account)))
}

pub async fn bank_account_list(
    State(state): State<ServerState>,
    Query(params): Query<AccountList>,
) -> Result<Json<Vec<BankAccountView>>, ServerError> {
    let accounts = state
        .engine
        .list_bank_accounts(params.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(accounts.into_iter().map(bank_view).collect()))
}

pub async fn bank_account_deactivate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankAccountView>, ServerError> {
    let account = state.engine.deactivate_bank_account(id).await?;
    Ok(Json(bank_view(account)))
}
