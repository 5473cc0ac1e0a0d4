//! Workout plan service
//!
//! Reads decorate each day with its occurrence date, status and completion
//! percentage. Those figures are always recomputed from the stored flags.
//!
//! Completing an exercise runs in one transaction: the owning day is locked,
//! the guard decides, the flags are written and the streak registers the
//! activity. A rejected completion writes nothing.

use crate::error::ApiError;
use crate::repositories::{DietPlanRepository, WorkoutPlanRepository};
use crate::services::{read_or_default, StreakService};
use fitcoach_shared::dashboard::StreakSummary;
use fitcoach_shared::errors::CompletionRejected;
use fitcoach_shared::progress::completion_percent;
use fitcoach_shared::schedule::{classify, day_for_today, plan_exercise_completion, ScheduledDay};
use fitcoach_shared::types::{CompletionResponse, ResetResponse, WorkoutDayView};
use fitcoach_shared::{Today, WorkoutPlanDay};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// Count a rejected completion attempt
pub(crate) fn record_rejection(rejected: &CompletionRejected, user_id: Uuid, item_id: Uuid) {
    warn!(user_id = %user_id, item_id = %item_id, kind = rejected.kind(), "Completion rejected");
    metrics::counter!("completion_rejected_total", "kind" => rejected.kind()).increment(1);
}

pub fn workout_view(day: WorkoutPlanDay, today: Today) -> WorkoutDayView {
    WorkoutDayView {
        occurrence: day.occurrence(today),
        status: classify(&day, today),
        completion_percent: completion_percent(day.completed_count(), day.exercises.len()),
        day,
    }
}

pub struct WorkoutService;

impl WorkoutService {
    pub async fn list_days(db: &PgPool, user_id: Uuid, today: Today) -> Vec<WorkoutDayView> {
        let days = read_or_default(
            WorkoutPlanRepository::list_for_user(db, user_id).await,
            "workout.list",
            user_id,
        );
        days.into_iter().map(|d| workout_view(d, today)).collect()
    }

    /// The day whose occurrence is today, if any
    pub async fn today(db: &PgPool, user_id: Uuid, today: Today) -> Option<WorkoutDayView> {
        let days = read_or_default(
            WorkoutPlanRepository::list_for_user(db, user_id).await,
            "workout.today",
            user_id,
        );
        day_for_today(&days, today).cloned().map(|d| workout_view(d, today))
    }

    pub async fn complete_exercise(
        db: &PgPool,
        user_id: Uuid,
        exercise_id: Uuid,
        today: Today,
    ) -> Result<CompletionResponse, ApiError> {
        let mut tx = db.begin().await?;

        let day = WorkoutPlanRepository::find_day_for_exercise(&mut tx, user_id, exercise_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Exercise not found".to_string()))?;

        let plan = plan_exercise_completion(&day, exercise_id, today).map_err(|rejected| {
            record_rejection(&rejected, user_id, exercise_id);
            ApiError::Completion(rejected)
        })?;

        if !WorkoutPlanRepository::apply_completion(&mut tx, &plan)
            .await
            .map_err(ApiError::Internal)?
        {
            let rejected = CompletionRejected::AlreadyCompleted(exercise_id);
            record_rejection(&rejected, user_id, exercise_id);
            return Err(rejected.into());
        }

        let streak = StreakService::register_activity(&mut tx, user_id, today.date)
            .await
            .map_err(ApiError::Internal)?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            exercise_id = %exercise_id,
            day_completed = plan.completes_day,
            "Exercise completed"
        );

        Ok(CompletionResponse {
            item_id: exercise_id,
            day_id: plan.day_id,
            day_completed: plan.completes_day,
            streak: StreakSummary::from_record(&streak, today.date),
        })
    }

    /// Full-week reset: every exercise, workout day and meal flag is cleared
    /// together, or none are.
    pub async fn reset_week(db: &PgPool, user_id: Uuid) -> Result<ResetResponse, ApiError> {
        let mut tx = db.begin().await?;

        let (exercises_cleared, days_cleared) = WorkoutPlanRepository::reset_week(&mut tx, user_id)
            .await
            .map_err(ApiError::Internal)?;
        let meals_cleared = DietPlanRepository::reset_week(&mut tx, user_id)
            .await
            .map_err(ApiError::Internal)?;

        tx.commit().await?;

        info!(user_id = %user_id, exercises_cleared, days_cleared, meals_cleared, "Week reset");
        Ok(ResetResponse {
            exercises_cleared,
            days_cleared,
            meals_cleared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use fitcoach_shared::schedule::DayStatus;
    use fitcoach_shared::{DayKey, Exercise};

    fn exercise(completed: bool, order_index: i32) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: "Squat".to_string(),
            sets: 3,
            reps: "10".to_string(),
            rest: "60s".to_string(),
            note: None,
            video_url: None,
            order_index,
            completed,
        }
    }

    #[test]
    fn test_view_for_partially_completed_day() {
        // Generated Wednesday 2024-01-03, Friday's occurrence is 2024-01-05
        let day = WorkoutPlanDay {
            id: Uuid::new_v4(),
            day: DayKey::Friday,
            name: "Legs".to_string(),
            objective: None,
            completed: false,
            generated_at: Some(Utc.with_ymd_and_hms(2024, 1, 3, 15, 0, 0).unwrap()),
            exercises: vec![exercise(true, 0), exercise(false, 1), exercise(false, 2)],
        };
        let today = Today::in_reference(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());

        let view = workout_view(day, today);
        assert_eq!(view.occurrence, today.date);
        assert_eq!(view.status, DayStatus::Today);
        assert_eq!(view.completion_percent, 33);
    }

    #[test]
    fn test_view_for_rest_day() {
        let day = WorkoutPlanDay {
            id: Uuid::new_v4(),
            day: DayKey::Sunday,
            name: "Rest".to_string(),
            objective: None,
            completed: false,
            generated_at: None,
            exercises: Vec::new(),
        };
        let view = workout_view(day, Today::in_reference(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()));

        assert_eq!(view.status, DayStatus::Rest);
        assert_eq!(view.completion_percent, 0);
    }
}
