//! Atomic plan replacement
//!
//! A generated plan replaces the user's previous plan in a single
//! transaction: old exercises, workout days, meals and diet days are
//! deleted, the new rows inserted and the generation profile stored. If any
//! step fails the transaction rolls back and the old plan stays in place.

use crate::repositories::UserRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fitcoach_shared::plan::{GeneratedPlan, PlannedWorkoutDay, UserProfileInput};
use fitcoach_shared::DayKey;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

/// Destination for generated plans
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn replace_plan(
        &self,
        user_id: Uuid,
        profile: &UserProfileInput,
        plan: &GeneratedPlan,
        generated_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// First entry per weekday; later duplicates are dropped
pub fn unique_days(days: &[PlannedWorkoutDay]) -> Vec<&PlannedWorkoutDay> {
    let mut seen = [false; 7];
    days.iter()
        .filter(|d| !std::mem::replace(&mut seen[d.day.index() as usize], true))
        .collect()
}

#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn delete_existing(conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"DELETE FROM exercises WHERE workout_plan_id IN (SELECT id FROM workout_plans WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        sqlx::query(r#"DELETE FROM workout_plans WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"DELETE FROM meals WHERE diet_plan_id IN (SELECT id FROM diet_plans WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        sqlx::query(r#"DELETE FROM diet_plans WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn insert_workout(
        conn: &mut PgConnection,
        user_id: Uuid,
        plan: &GeneratedPlan,
        generated_at: DateTime<Utc>,
    ) -> Result<usize> {
        let days = unique_days(&plan.workout_plan);
        if days.len() < plan.workout_plan.len() {
            warn!(user_id = %user_id, "Generated plan repeats weekdays, keeping the first of each");
        }

        for day in &days {
            let (day_id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO workout_plans (user_id, day, name, objective, generated_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(user_id)
            .bind(day.day.as_str())
            .bind(&day.name)
            .bind(&day.objective)
            .bind(generated_at)
            .fetch_one(&mut *conn)
            .await?;

            for (order_index, exercise) in day.exercises.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO exercises (workout_plan_id, name, sets, reps, rest, note, video_url, order_index)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(day_id)
                .bind(&exercise.name)
                .bind(exercise.sets as i32)
                .bind(&exercise.reps)
                .bind(&exercise.rest)
                .bind(&exercise.note)
                .bind(&exercise.video_url)
                .bind(order_index as i32)
                .execute(&mut *conn)
                .await?;
            }
        }
        Ok(days.len())
    }

    async fn insert_diet(
        conn: &mut PgConnection,
        user_id: Uuid,
        plan: &GeneratedPlan,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        for day in DayKey::ALL {
            let (day_id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO diet_plans (user_id, day, generated_at)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(user_id)
            .bind(day.as_str())
            .bind(generated_at)
            .fetch_one(&mut *conn)
            .await?;

            for (order_index, meal) in plan.nutrition_plan.meals_for(day).into_iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO meals (diet_plan_id, name, time, description, calories, order_index)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(day_id)
                .bind(&meal.name)
                .bind(&meal.time)
                .bind(&meal.description)
                .bind(meal.calories as i32)
                .bind(order_index as i32)
                .execute(&mut *conn)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn replace_plan(
        &self,
        user_id: Uuid,
        profile: &UserProfileInput,
        plan: &GeneratedPlan,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        Self::delete_existing(&mut tx, user_id)
            .await
            .context("deleting previous plan")?;
        let workout_days = Self::insert_workout(&mut tx, user_id, plan, generated_at)
            .await
            .context("inserting workout plan")?;
        Self::insert_diet(&mut tx, user_id, plan, generated_at)
            .await
            .context("inserting diet plan")?;

        let profile_json = serde_json::to_value(profile)?;
        UserRepository::save_generation_profile(
            &mut *tx,
            user_id,
            &profile_json,
            profile.settings.water_goal_ml.map(|g| g as i32),
        )
        .await
        .context("saving generation profile")?;

        tx.commit().await?;

        info!(user_id = %user_id, workout_days, "Plan replaced");
        Ok(())
    }
}
