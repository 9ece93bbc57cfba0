//! Transfer API endpoints.

use api_types::transfer::{
    CashTransferCreated, CashTransferNew, InterBankTransferNew, InterBankTransferView,
    TransferCancel,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{CashTransferCmd, InterBankTransferCmd};

fn transfer_view(transfer: engine::InterBankTransfer) -> InterBankTransferView {
    InterBankTransferView {
        id: transfer.id,
        from_account_id: transfer.from_account_id,
        to_account_id: transfer.to_account_id,
        date: transfer.date,
        amount_minor: transfer.amount_minor,
        fee_minor: transfer.fee_minor,
        status: transfer.status.as_str().to_string(),
        debit_transaction_id: transfer.debit_transaction_id,
        credit_transaction_id: transfer.credit_transaction_id,
        fee_transaction_id: transfer.fee_transaction_id,
    }
}

pub async fn cash_transfer_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashTransferNew>,
) -> Result<Json<CashTransferCreated>, ServerError> {
    let cmd = CashTransferCmd::new(
        payload.from_account_id,
        payload.to_account_id,
        payload.date,
        payload.amount_minor,
        payload.description,
        user.username,
    );
    let (out, incoming) = state.engine.transfer_cash(cmd).await?;
    Ok(Json(CashTransferCreated {
        out_movement_id: out.id,
        in_movement_id: incoming.id,
    }))
}

pub async fn inter_bank_transfer_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<InterBankTransferNew>,
) -> Result<Json<InterBankTransferView>, ServerError> {
    let mut cmd = InterBankTransferCmd::new(
        payload.from_account_id,
        payload.to_account_id,
        payload.date,
        payload.amount_minor,
        user.username,
    );
    if let Some(fee) = payload.fee_minor {
        cmd = cmd.fee_minor(fee);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }

    let transfer = state.engine.create_inter_bank_transfer(cmd).await?;
    Ok(Json(transfer_view(transfer)))
}

pub async fn inter_bank_transfer_process(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterBankTransferView>, ServerError> {
    let transfer = state
        .engine
        .process_inter_bank_transfer(id, &user.username)
        .await?;
    Ok(Json(transfer_view(transfer)))
}

pub async fn inter_bank_transfer_cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferCancel>,
) -> Result<Json<InterBankTransferView>, ServerError> {
    let transfer = state
        .engine
        .cancel_inter_bank_transfer(id, &user.username, payload.reason.as_deref())
        .await?;
    Ok(Json(transfer_view(transfer)))
}
