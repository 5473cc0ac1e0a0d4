//! Streak and dashboard routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{DashboardService, StreakService};
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use fitcoach_shared::dashboard::StreakSummary;
use fitcoach_shared::DashboardSnapshot;

pub fn streak_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_streak))
        .route("/reset", post(reset_streak))
}

/// GET /api/v1/streak
async fn get_streak(State(state): State<AppState>, auth: AuthUser) -> Json<StreakSummary> {
    Json(StreakService::get_summary(state.db(), auth.user_id, state.today().date).await)
}

/// POST /api/v1/streak/reset
async fn reset_streak(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<StreakSummary>> {
    let summary = StreakService::reset(state.db(), auth.user_id, state.today().date).await?;
    Ok(Json(summary))
}

/// GET /api/v1/dashboard
pub async fn dashboard(State(state): State<AppState>, auth: AuthUser) -> Json<DashboardSnapshot> {
    let default_goal = state.config().tracker.default_water_goal_ml;
    Json(DashboardService::snapshot(state.db(), auth.user_id, state.today(), default_goal).await)
}
