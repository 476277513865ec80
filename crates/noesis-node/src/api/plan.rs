//! Current plan endpoint.

use axum::{extract::State, http::StatusCode, Json};

use crate::state::{AppState, PlanRecord};

/// The most recently decided plan.
pub async fn current_plan(
    State(state): State<AppState>,
) -> Result<Json<PlanRecord>, (StatusCode, String)> {
    state
        .current_plan()
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No plan decided yet".to_string()))
}
