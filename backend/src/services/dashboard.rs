//! Dashboard service
//!
//! Every input of the snapshot is read inside a single `REPEATABLE READ`
//! transaction so the figures agree with each other even while completions
//! are being written. The snapshot itself is never stored.

use crate::repositories::{
    DietPlanRepository, StreakRepository, UserRepository, WaterLogRepository, WorkoutPlanRepository,
};
use crate::services::water::resolve_goal;
use anyhow::Result;
use chrono::NaiveDate;
use fitcoach_shared::{DashboardInputs, DashboardSnapshot, Today, WaterEntry};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

pub struct DashboardService;

impl DashboardService {
    async fn read_inputs(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
        default_goal_ml: u32,
    ) -> Result<DashboardInputs> {
        let mut tx = crate::db::begin_snapshot(db).await?;

        let workout_days = WorkoutPlanRepository::list_for_user(&mut *tx, user_id).await?;
        let diet_days = DietPlanRepository::list_for_user(&mut *tx, user_id).await?;
        let water_today = WaterLogRepository::list_for_date(&mut *tx, user_id, today)
            .await?
            .into_iter()
            .map(WaterEntry::from)
            .collect();
        let user_goal = UserRepository::water_goal(&mut *tx, user_id).await?;
        let streak = StreakRepository::get(&mut *tx, user_id).await?;

        tx.commit().await?;

        Ok(DashboardInputs {
            workout_days,
            diet_days,
            water_today,
            water_goal_ml: Some(resolve_goal(user_goal, default_goal_ml)),
            streak,
        })
    }

    /// Build today's snapshot. A failed read yields an empty dashboard.
    pub async fn snapshot(
        db: &PgPool,
        user_id: Uuid,
        today: Today,
        default_goal_ml: u32,
    ) -> DashboardSnapshot {
        let inputs = Self::read_inputs(db, user_id, today.date, default_goal_ml).await;
        let inputs = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!(operation = "dashboard.snapshot", user_id = %user_id, error = %e, "Read failed, using empty value");
                DashboardInputs {
                    water_goal_ml: Some(default_goal_ml),
                    ..Default::default()
                }
            }
        };
        DashboardSnapshot::build(&inputs, today)
    }
}
