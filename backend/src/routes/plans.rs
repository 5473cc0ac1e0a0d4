//! Workout and diet plan routes
//!
//! Reads, guarded completion actions, the full-week reset and the plan
//! generation gateway. The gateway answers with its own success/failure
//! envelope instead of the regular error body.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, GenerationError};
use crate::repositories::PgPlanStore;
use crate::services::{DietService, PlanGenerationService, WorkoutService};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use fitcoach_shared::plan::{GeneratePlanRequest, GenerationSuccess};
use fitcoach_shared::types::{CompletionResponse, DietDayView, ResetResponse, WorkoutDayView};
use uuid::Uuid;

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_plan))
        .route("/workout", get(list_workout))
        .route("/workout/today", get(workout_today))
        .route("/workout/reset", post(reset_week))
        .route("/workout/exercises/:id/complete", post(complete_exercise))
        .route("/diet", get(list_diet))
        .route("/diet/today", get(diet_today))
        .route("/diet/meals/:id/confirm", post(confirm_meal))
}

/// POST /api/v1/plans/generate
///
/// Authentication and body errors are taken as values so they are reported
/// in the gateway envelope. Requests turned away here are counted in
/// `plan_generation_total` like any other outcome.
async fn generate_plan(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    body: Result<Json<GeneratePlanRequest>, JsonRejection>,
) -> Result<Json<GenerationSuccess>, GenerationError> {
    let auth = auth.map_err(|e| rejected(None, GenerationError::Unauthorized(e.to_string())))?;
    let Json(request) =
        body.map_err(|e| rejected(Some(auth.user_id), GenerationError::InvalidProfile(e.body_text())))?;

    let model = state
        .plan_model
        .clone()
        .ok_or_else(|| rejected(Some(auth.user_id), GenerationError::Disabled))?;
    let store = PgPlanStore::new(state.db.clone());

    let plan = PlanGenerationService::generate(
        model.as_ref(),
        &store,
        &state.generation_guard,
        auth.user_id,
        request,
        state.now(),
    )
    .await?;

    Ok(Json(GenerationSuccess::new(plan)))
}

fn rejected(user_id: Option<Uuid>, error: GenerationError) -> GenerationError {
    PlanGenerationService::record_rejection(user_id, &error);
    error
}

/// GET /api/v1/plans/workout
async fn list_workout(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<WorkoutDayView>> {
    Json(WorkoutService::list_days(state.db(), auth.user_id, state.today()).await)
}

/// GET /api/v1/plans/workout/today
async fn workout_today(State(state): State<AppState>, auth: AuthUser) -> Json<Option<WorkoutDayView>> {
    Json(WorkoutService::today(state.db(), auth.user_id, state.today()).await)
}

/// POST /api/v1/plans/workout/exercises/:id/complete
async fn complete_exercise(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(exercise_id): Path<Uuid>,
) -> ApiResult<Json<CompletionResponse>> {
    let response =
        WorkoutService::complete_exercise(state.db(), auth.user_id, exercise_id, state.today()).await?;
    Ok(Json(response))
}

/// POST /api/v1/plans/workout/reset
async fn reset_week(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<ResetResponse>> {
    let response = WorkoutService::reset_week(state.db(), auth.user_id).await?;
    Ok(Json(response))
}

/// GET /api/v1/plans/diet
async fn list_diet(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<DietDayView>> {
    Json(DietService::list_days(state.db(), auth.user_id, state.today()).await)
}

/// GET /api/v1/plans/diet/today
async fn diet_today(State(state): State<AppState>, auth: AuthUser) -> Json<Option<DietDayView>> {
    Json(DietService::today(state.db(), auth.user_id, state.today()).await)
}

/// POST /api/v1/plans/diet/meals/:id/confirm
async fn confirm_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(meal_id): Path<Uuid>,
) -> ApiResult<Json<CompletionResponse>> {
    let response = DietService::confirm_meal(state.db(), auth.user_id, meal_id, state.today()).await?;
    Ok(Json(response))
}
