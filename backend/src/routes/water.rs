//! Water intake routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::WaterService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use fitcoach_shared::types::{LogWaterRequest, WaterTodayResponse};
use fitcoach_shared::WaterEntry;
use uuid::Uuid;

/// Create water routes
pub fn water_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(log_water))
        .route("/today", get(water_today))
        .route("/:id", delete(delete_entry))
}

/// POST /api/v1/water
async fn log_water(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogWaterRequest>,
) -> ApiResult<(StatusCode, Json<WaterEntry>)> {
    let entry = WaterService::log(state.db(), auth.user_id, req.amount_ml, state.now(), state.today().date).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/water/today
async fn water_today(State(state): State<AppState>, auth: AuthUser) -> Json<WaterTodayResponse> {
    let default_goal = state.config().tracker.default_water_goal_ml;
    Json(WaterService::today(state.db(), auth.user_id, state.today().date, default_goal).await)
}

/// DELETE /api/v1/water/:id
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    WaterService::delete(state.db(), auth.user_id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
