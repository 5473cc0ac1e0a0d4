//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod dashboard;
pub mod diet;
pub mod generation_guard;
pub mod plan_generation;
pub mod plan_model;
pub mod profile;
pub mod streak;
pub mod user;
pub mod water;
pub mod workout;

pub use dashboard::DashboardService;
pub use diet::DietService;
pub use generation_guard::{GenerationGuard, GenerationPermit};
pub use plan_generation::PlanGenerationService;
pub use plan_model::{OllamaClient, PlanModel, PlanModelError};
pub use profile::ProfileService;
pub use streak::StreakService;
pub use user::UserService;
pub use water::WaterService;
pub use workout::WorkoutService;

use tracing::warn;
use uuid::Uuid;

/// Degrade a failed read to an empty value.
///
/// Screens render empty states rather than errors, so read paths log the
/// failure and carry on. Write paths never go through here.
pub(crate) fn read_or_default<T: Default>(
    result: anyhow::Result<T>,
    operation: &str,
    user_id: Uuid,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(operation, user_id = %user_id, error = %e, "Read failed, using empty value");
            T::default()
        }
    }
}
