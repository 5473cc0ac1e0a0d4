//! User profile and preferences API routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use fitcoach_shared::profile::{Preferences, PreferencesPatch};
use fitcoach_shared::types::{ProfileResponse, UpdateProfileRequest};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/preferences", get(get_preferences).put(update_preferences))
}

/// GET /api/v1/profile
async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<ProfileResponse>> {
    let default_goal = state.config().tracker.default_water_goal_ml;
    let profile = ProfileService::get_profile(state.db(), auth.user_id, default_goal).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let default_goal = state.config().tracker.default_water_goal_ml;
    let profile = ProfileService::update_profile(state.db(), auth.user_id, req, default_goal).await?;
    Ok(Json(profile))
}

/// GET /api/v1/profile/preferences
async fn get_preferences(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Preferences>> {
    let preferences = ProfileService::get_preferences(state.db(), auth.user_id).await?;
    Ok(Json(preferences))
}

/// PUT /api/v1/profile/preferences
///
/// Absent fields keep their stored value.
async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(patch): Json<PreferencesPatch>,
) -> ApiResult<Json<Preferences>> {
    let preferences = ProfileService::update_preferences(state.db(), auth.user_id, patch).await?;
    Ok(Json(preferences))
}
