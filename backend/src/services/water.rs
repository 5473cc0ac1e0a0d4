//! Water intake service
//!
//! Entries are bucketed by calendar date in the reference timezone; the
//! daily summary is derived from today's entries and the user's goal.

use crate::error::ApiError;
use crate::repositories::{CreateWaterLog, UserRepository, WaterLogRepository};
use crate::services::read_or_default;
use chrono::{DateTime, NaiveDate, Utc};
use fitcoach_shared::dashboard::WaterSummary;
use fitcoach_shared::types::WaterTodayResponse;
use fitcoach_shared::validation::validate_water_amount_ml;
use fitcoach_shared::WaterEntry;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// The user's goal, or the configured default when unset
pub(crate) fn resolve_goal(user_goal_ml: Option<i32>, default_goal_ml: u32) -> u32 {
    user_goal_ml
        .and_then(|g| u32::try_from(g).ok())
        .filter(|g| *g > 0)
        .unwrap_or(default_goal_ml)
}

pub struct WaterService;

impl WaterService {
    pub async fn log(
        db: &PgPool,
        user_id: Uuid,
        amount_ml: i32,
        logged_at: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<WaterEntry, ApiError> {
        validate_water_amount_ml(amount_ml).map_err(ApiError::Validation)?;

        let record = WaterLogRepository::create(
            db,
            CreateWaterLog {
                user_id,
                log_date: today,
                amount_ml,
                logged_at,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(user_id = %user_id, amount_ml, "Water logged");
        Ok(record.into())
    }

    pub async fn today(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
        default_goal_ml: u32,
    ) -> WaterTodayResponse {
        let entries: Vec<WaterEntry> = read_or_default(
            WaterLogRepository::list_for_date(db, user_id, today).await,
            "water.list_today",
            user_id,
        )
        .into_iter()
        .map(WaterEntry::from)
        .collect();

        let user_goal = read_or_default(UserRepository::water_goal(db, user_id).await, "water.goal", user_id);
        let summary = WaterSummary::from_entries(&entries, Some(resolve_goal(user_goal, default_goal_ml)));

        WaterTodayResponse {
            date: today,
            entries,
            summary,
        }
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, entry_id: Uuid) -> Result<(), ApiError> {
        let deleted = WaterLogRepository::delete(db, entry_id, user_id)
            .await
            .map_err(ApiError::Internal)?;

        if !deleted {
            return Err(ApiError::NotFound("Water entry not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(2200), 3000, 2200)]
    #[case(None, 3000, 3000)]
    #[case(Some(0), 2500, 2500)]
    #[case(Some(-10), 2500, 2500)]
    fn test_resolve_goal(#[case] user_goal: Option<i32>, #[case] default: u32, #[case] expected: u32) {
        assert_eq!(resolve_goal(user_goal, default), expected);
    }
}
