//! Route definitions for the FitCoach API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;
mod plans;
mod profile;
mod streak;
mod water;

#[cfg(test)]
mod gateway_tests;

pub use auth::auth_routes;
pub use plans::plan_routes;
pub use profile::profile_routes;
pub use streak::streak_routes;
pub use water::water_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    // Generation waits on the model, so the request timeout follows the model timeout
    let timeout = Duration::from_secs(state.config().ai.timeout_secs.max(30) + 10);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "FitCoach API v1" }))
        .nest("/auth", auth::auth_routes())
        .nest("/profile", profile::profile_routes())
        .nest("/plans", plans::plan_routes())
        .nest("/water", water::water_routes())
        .nest("/streak", streak::streak_routes())
        .route("/dashboard", get(streak::dashboard))
}
