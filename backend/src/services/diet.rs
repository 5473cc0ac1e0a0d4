//! Diet plan service
//!
//! Same shape as the workout service: decorated reads, and a guarded meal
//! confirmation that registers streak activity in the same transaction.

use crate::error::ApiError;
use crate::repositories::DietPlanRepository;
use crate::services::workout::record_rejection;
use crate::services::{read_or_default, StreakService};
use fitcoach_shared::dashboard::StreakSummary;
use fitcoach_shared::errors::CompletionRejected;
use fitcoach_shared::progress::completion_percent;
use fitcoach_shared::schedule::{classify, day_for_today, plan_meal_confirmation, ScheduledDay};
use fitcoach_shared::types::{CompletionResponse, DietDayView};
use fitcoach_shared::{DietPlanDay, Today};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

pub fn diet_view(day: DietPlanDay, today: Today) -> DietDayView {
    DietDayView {
        occurrence: day.occurrence(today),
        status: classify(&day, today),
        completion_percent: completion_percent(day.confirmed_count(), day.meals.len()),
        day,
    }
}

pub struct DietService;

impl DietService {
    pub async fn list_days(db: &PgPool, user_id: Uuid, today: Today) -> Vec<DietDayView> {
        let days = read_or_default(
            DietPlanRepository::list_for_user(db, user_id).await,
            "diet.list",
            user_id,
        );
        days.into_iter().map(|d| diet_view(d, today)).collect()
    }

    pub async fn today(db: &PgPool, user_id: Uuid, today: Today) -> Option<DietDayView> {
        let days = read_or_default(
            DietPlanRepository::list_for_user(db, user_id).await,
            "diet.today",
            user_id,
        );
        day_for_today(&days, today).cloned().map(|d| diet_view(d, today))
    }

    pub async fn confirm_meal(
        db: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        today: Today,
    ) -> Result<CompletionResponse, ApiError> {
        let mut tx = db.begin().await?;

        let day = DietPlanRepository::find_day_for_meal(&mut tx, user_id, meal_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))?;

        let plan = plan_meal_confirmation(&day, meal_id, today).map_err(|rejected| {
            record_rejection(&rejected, user_id, meal_id);
            ApiError::Completion(rejected)
        })?;

        if !DietPlanRepository::apply_confirmation(&mut tx, &plan)
            .await
            .map_err(ApiError::Internal)?
        {
            let rejected = CompletionRejected::AlreadyCompleted(meal_id);
            record_rejection(&rejected, user_id, meal_id);
            return Err(rejected.into());
        }

        let streak = StreakService::register_activity(&mut tx, user_id, today.date)
            .await
            .map_err(ApiError::Internal)?;

        tx.commit().await?;

        info!(user_id = %user_id, meal_id = %meal_id, "Meal confirmed");

        Ok(CompletionResponse {
            item_id: meal_id,
            day_id: plan.day_id,
            day_completed: plan.completes_day,
            streak: StreakSummary::from_record(&streak, today.date),
        })
    }
}
