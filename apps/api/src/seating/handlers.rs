//! Axum route handlers for the Seating API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::seating::balance::{balance_workload, WorkloadItem, WorkloadPlan};
use crate::seating::service::{run_seating, SeatingRun};
use crate::seating::store::StoredTable;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RunQuery {
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct StoredSeatingResponse {
    pub option_id: Uuid,
    pub option_name: String,
    pub tables: Vec<StoredTable>,
}

/// Upper bound on `reviewer_count` for one balance request.
pub const MAX_REVIEWERS: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub reviewer_count: usize,
    pub items: Vec<WorkloadItem>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/options/:id/seating
///
/// Recomputes the seating plan for an option. With `?dry_run=true` the plan is
/// returned without replacing the stored one.
pub async fn handle_run_seating(
    State(state): State<AppState>,
    Path(option_id): Path<Uuid>,
    Query(query): Query<RunQuery>,
) -> Result<Json<SeatingRun>, AppError> {
    let run = run_seating(
        state.store.as_ref(),
        &state.config.seating,
        option_id,
        query.dry_run,
    )
    .await?;
    Ok(Json(run))
}

/// GET /api/v1/options/:id/seating
pub async fn handle_get_seating(
    State(state): State<AppState>,
    Path(option_id): Path<Uuid>,
) -> Result<Json<StoredSeatingResponse>, AppError> {
    let option = state
        .store
        .load_option(option_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Seating option {option_id} not found")))?;

    let tables = state.store.load_assignment(option_id).await?;

    Ok(Json(StoredSeatingResponse {
        option_id,
        option_name: option.name,
        tables,
    }))
}

/// POST /api/v1/balance
///
/// Spreads weighted work items (e.g. heats) across a number of reviewers.
pub async fn handle_balance(
    Json(request): Json<BalanceRequest>,
) -> Result<Json<WorkloadPlan>, AppError> {
    if request.reviewer_count == 0 {
        return Err(AppError::Validation(
            "reviewer_count must be at least 1".to_string(),
        ));
    }
    if request.reviewer_count > MAX_REVIEWERS {
        return Err(AppError::Validation(format!(
            "reviewer_count must be at most {MAX_REVIEWERS}, got {}",
            request.reviewer_count
        )));
    }
    Ok(Json(balance_workload(request.items, request.reviewer_count)?))
}
