//! Workout plan repository
//!
//! Days and their exercises are read with one joined query so a day is
//! never observed without its exercises.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fitcoach_shared::schedule::CompletionPlan;
use fitcoach_shared::{DayKey, Exercise, WorkoutPlanDay};
use sqlx::postgres::PgExecutor;
use sqlx::PgConnection;
use tracing::warn;
use uuid::Uuid;

/// One day/exercise row of the joined read
#[derive(Debug, Clone, sqlx::FromRow)]
struct WorkoutRow {
    day_id: Uuid,
    day: String,
    day_name: String,
    objective: Option<String>,
    day_completed: bool,
    generated_at: Option<DateTime<Utc>>,
    exercise_id: Option<Uuid>,
    exercise_name: Option<String>,
    sets: Option<i32>,
    reps: Option<String>,
    rest: Option<String>,
    note: Option<String>,
    video_url: Option<String>,
    order_index: Option<i32>,
    exercise_completed: Option<bool>,
}

const SELECT_DAYS: &str = r#"
    SELECT w.id AS day_id, w.day, w.name AS day_name, w.objective,
           w.completed AS day_completed, w.generated_at,
           e.id AS exercise_id, e.name AS exercise_name, e.sets, e.reps, e.rest,
           e.note, e.video_url, e.order_index, e.completed AS exercise_completed
    FROM workout_plans w
    LEFT JOIN exercises e ON e.workout_plan_id = w.id
"#;

const DAY_ORDER: &str = "array_position(ARRAY['sunday','monday','tuesday','wednesday','thursday','friday','saturday'], w.day)";

/// Fold joined rows into days, keeping row order
fn group_rows(rows: Vec<WorkoutRow>) -> Vec<WorkoutPlanDay> {
    let mut days: Vec<WorkoutPlanDay> = Vec::new();

    for row in rows {
        if days.last().map(|d| d.id) != Some(row.day_id) {
            let Some(day) = DayKey::normalize(&row.day) else {
                warn!(day_id = %row.day_id, day = %row.day, "Skipping workout day with unknown weekday");
                continue;
            };
            days.push(WorkoutPlanDay {
                id: row.day_id,
                day,
                name: row.day_name.clone(),
                objective: row.objective.clone(),
                completed: row.day_completed,
                generated_at: row.generated_at,
                exercises: Vec::new(),
            });
        }

        let (Some(current), Some(id)) = (days.last_mut(), row.exercise_id) else {
            continue;
        };
        if current.id != row.day_id {
            continue;
        }
        current.exercises.push(Exercise {
            id,
            name: row.exercise_name.unwrap_or_default(),
            sets: row.sets.unwrap_or(0),
            reps: row.reps.unwrap_or_default(),
            rest: row.rest.unwrap_or_default(),
            note: row.note,
            video_url: row.video_url,
            order_index: row.order_index.unwrap_or(0),
            completed: row.exercise_completed.unwrap_or(false),
        });
    }

    for day in &mut days {
        day.sort_exercises();
    }
    days
}

pub struct WorkoutPlanRepository;

impl WorkoutPlanRepository {
    /// All days of the user's plan, Sunday first
    pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<WorkoutPlanDay>>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, WorkoutRow>(&format!(
            "{} WHERE w.user_id = $1 ORDER BY {}, w.id, e.order_index",
            SELECT_DAYS, DAY_ORDER
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(group_rows(rows))
    }

    /// The day owning `exercise_id`, locked for update
    pub async fn find_day_for_exercise(
        conn: &mut PgConnection,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Option<WorkoutPlanDay>> {
        let rows = sqlx::query_as::<_, WorkoutRow>(&format!(
            r#"{}
            WHERE w.user_id = $1
              AND w.id = (SELECT workout_plan_id FROM exercises WHERE id = $2)
            ORDER BY e.order_index
            FOR UPDATE OF w"#,
            SELECT_DAYS
        ))
        .bind(user_id)
        .bind(exercise_id)
        .fetch_all(conn)
        .await?;

        Ok(group_rows(rows).into_iter().next())
    }

    /// Apply a permitted completion. Returns false if the exercise was
    /// already completed by a concurrent request.
    pub async fn apply_completion(conn: &mut PgConnection, plan: &CompletionPlan) -> Result<bool> {
        let updated = sqlx::query(
            r#"UPDATE exercises SET completed = TRUE WHERE id = $1 AND completed = FALSE"#,
        )
        .bind(plan.item_id)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        if plan.completes_day {
            sqlx::query(r#"UPDATE workout_plans SET completed = TRUE WHERE id = $1"#)
                .bind(plan.day_id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(true)
    }

    /// Clear every exercise and day completion flag. Returns (exercises, days) cleared.
    pub async fn reset_week(conn: &mut PgConnection, user_id: Uuid) -> Result<(u64, u64)> {
        let exercises = sqlx::query(
            r#"
            UPDATE exercises SET completed = FALSE
            WHERE completed = TRUE
              AND workout_plan_id IN (SELECT id FROM workout_plans WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let days = sqlx::query(
            r#"UPDATE workout_plans SET completed = FALSE WHERE user_id = $1 AND completed = TRUE"#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Ok((exercises.rows_affected(), days.rows_affected()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day_id: Uuid, day: &str, exercise: Option<(Uuid, i32)>) -> WorkoutRow {
        WorkoutRow {
            day_id,
            day: day.to_string(),
            day_name: "Push".to_string(),
            objective: None,
            day_completed: false,
            generated_at: None,
            exercise_id: exercise.map(|(id, _)| id),
            exercise_name: exercise.map(|_| "Bench".to_string()),
            sets: exercise.map(|_| 4),
            reps: exercise.map(|_| "8".to_string()),
            rest: exercise.map(|_| "90s".to_string()),
            note: None,
            video_url: None,
            order_index: exercise.map(|(_, i)| i),
            exercise_completed: exercise.map(|_| false),
        }
    }

    #[test]
    fn test_group_rows_folds_exercises_into_days() {
        let monday = Uuid::new_v4();
        let wednesday = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let days = group_rows(vec![
            row(monday, "monday", Some((b, 1))),
            row(monday, "monday", Some((a, 0))),
            row(wednesday, "wednesday", None),
        ]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, DayKey::Monday);
        assert_eq!(days[0].exercises.iter().map(|e| e.id).collect::<Vec<_>>(), vec![a, b]);
        assert!(days[1].exercises.is_empty());
    }

    #[test]
    fn test_group_rows_skips_unknown_weekday() {
        let days = group_rows(vec![row(Uuid::new_v4(), "someday", Some((Uuid::new_v4(), 0)))]);
        assert!(days.is_empty());
    }
}
