//! Reconciliation API endpoints (cash arqueos and bank statements).

use api_types::reconciliation::{
    AutoMatchRequest, AutoMatchResult, BankReconciliationNew, BankReconciliationView,
    CashReconciliationApprove, CashReconciliationNew, CashReconciliationView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{AutoMatchCmd, BankReconciliationCmd, CashReconciliationCmd, MatchCriteria};

fn cash_view(arqueo: engine::CashReconciliation) -> CashReconciliationView {
    CashReconciliationView {
        id: arqueo.id,
        account_id: arqueo.account_id,
        date: arqueo.date,
        system_balance_minor: arqueo.system_balance_minor,
        counted_minor: arqueo.counted_minor,
        difference_minor: arqueo.difference_minor,
        outcome: arqueo.outcome.as_str().to_string(),
        status: arqueo.status.as_str().to_string(),
        adjustment_movement_id: arqueo.adjustment_movement_id,
    }
}

fn bank_view(recon: engine::BankReconciliation) -> BankReconciliationView {
    BankReconciliationView {
        id: recon.id,
        account_id: recon.account_id,
        statement_date: recon.statement_date,
        statement_balance_minor: recon.statement_balance_minor,
        reconciled_balance_minor: recon.reconciled_balance_minor,
        is_reconciled: recon.is_reconciled,
        difference_minor: recon.difference_minor,
    }
}

pub async fn cash_reconciliation_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashReconciliationNew>,
) -> Result<Json<CashReconciliationView>, ServerError> {
    let mut cmd = CashReconciliationCmd::new(
        payload.account_id,
        payload.date,
        payload.counted_minor,
        user.username,
    );
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let arqueo = state.engine.create_cash_reconciliation(cmd).await?;
    Ok(Json(cash_view(arqueo)))
}

pub async fn cash_reconciliation_approve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CashReconciliationApprove>,
) -> Result<Json<CashReconciliationView>, ServerError> {
    let arqueo = state
        .engine
        .approve_cash_reconciliation(
            id,
            &user.username,
            payload.create_adjustment.unwrap_or(false),
        )
        .await?;
    Ok(Json(cash_view(arqueo)))
}

pub async fn bank_reconciliation_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BankReconciliationNew>,
) -> Result<Json<BankReconciliationView>, ServerError> {
    let mut cmd = BankReconciliationCmd::new(
        payload.account_id,
        payload.statement_date,
        payload.statement_balance_minor,
        user.username,
    );
    if let Some(ids) = payload.seed_transaction_ids {
        cmd = cmd.seed_transaction_ids(ids);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let recon = state.engine.create_bank_reconciliation(cmd).await?;
    Ok(Json(bank_view(recon)))
}

pub async fn bank_reconciliation_complete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankReconciliationView>, ServerError> {
    let recon = state
        .engine
        .complete_bank_reconciliation(id, &user.username)
        .await?;
    Ok(Json(bank_view(recon)))
}

pub async fn bank_reconciliation_auto_match(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AutoMatchRequest>,
) -> Result<Json<AutoMatchResult>, ServerError> {
    let defaults = MatchCriteria::default();
    let criteria = MatchCriteria {
        exact_match: payload.exact_match.unwrap_or(defaults.exact_match),
        reference_match: payload.reference_match.unwrap_or(defaults.reference_match),
        range_match: payload.range_match.unwrap_or(defaults.range_match),
        max_days_diff: payload.max_days_diff.unwrap_or(defaults.max_days_diff),
    };
    let mut cmd = AutoMatchCmd::new(id).criteria(criteria);
    if let Some(lookback) = payload.lookback_days {
        cmd = cmd.lookback_days(lookback);
    }

    let summary = state.engine.auto_match_bank_reconciliation(cmd).await?;
    Ok(Json(AutoMatchResult {
        matched_count: summary.matched_count,
        matched_amount_minor: summary.matched_amount_minor,
        candidates_considered: summary.candidates_considered,
        match_percentage: summary.match_percentage,
    }))
}
