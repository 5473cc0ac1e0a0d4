//! FitCoach Shared Library
//!
//! Pure domain logic used by the backend and the WASM bindings: weekday
//! keys, the plan scheduler, progress figures, the onboarding wizard and the
//! plan generation contract. Nothing in this crate performs I/O.

pub mod dashboard;
pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod onboarding;
pub mod plan;
pub mod profile;
pub mod progress;
pub mod schedule;
pub mod session;
pub mod types;
pub mod validation;
pub mod weekday;

// Re-export commonly used items
pub use dashboard::{DashboardInputs, DashboardSnapshot};
pub use errors::*;
pub use models::{DietPlanDay, Exercise, Meal, StreakRecord, WaterEntry, WorkoutPlanDay};
pub use profile::{Language, Preferences};
pub use schedule::{CompletionPlan, DayStatus, ScheduledDay};
pub use weekday::{DayKey, Today};
