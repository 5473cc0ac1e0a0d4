//! Database repositories
//!
//! Data access for users, plans, water logs and streaks. Read functions
//! that take a generic executor can run on the pool or inside a transaction.

pub mod diet_plan;
pub mod plan_store;
pub mod streak;
pub mod user;
pub mod water_log;
pub mod workout_plan;

pub use diet_plan::DietPlanRepository;
pub use plan_store::{PgPlanStore, PlanStore};
pub use streak::StreakRepository;
pub use user::{UpdateUserProfile, UserRecord, UserRepository};
pub use water_log::{CreateWaterLog, WaterLogRecord, WaterLogRepository};
pub use workout_plan::WorkoutPlanRepository;
