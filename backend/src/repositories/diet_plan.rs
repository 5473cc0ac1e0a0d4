//! Diet plan repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use fitcoach_shared::schedule::CompletionPlan;
use fitcoach_shared::{DayKey, DietPlanDay, Meal};
use sqlx::postgres::PgExecutor;
use sqlx::PgConnection;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
struct DietRow {
    day_id: Uuid,
    day: String,
    generated_at: Option<DateTime<Utc>>,
    meal_id: Option<Uuid>,
    meal_name: Option<String>,
    time: Option<String>,
    description: Option<String>,
    calories: Option<i32>,
    confirmed: Option<bool>,
}

const SELECT_DAYS: &str = r#"
    SELECT d.id AS day_id, d.day, d.generated_at,
           m.id AS meal_id, m.name AS meal_name, m.time, m.description,
           m.calories, m.confirmed
    FROM diet_plans d
    LEFT JOIN meals m ON m.diet_plan_id = d.id
"#;

fn group_rows(rows: Vec<DietRow>) -> Vec<DietPlanDay> {
    let mut days: Vec<DietPlanDay> = Vec::new();

    for row in rows {
        if days.last().map(|d| d.id) != Some(row.day_id) {
            let Some(day) = DayKey::normalize(&row.day) else {
                warn!(day_id = %row.day_id, day = %row.day, "Skipping diet day with unknown weekday");
                continue;
            };
            days.push(DietPlanDay {
                id: row.day_id,
                day,
                generated_at: row.generated_at,
                meals: Vec::new(),
            });
        }

        match (days.last_mut(), row.meal_id) {
            (Some(current), Some(id)) if current.id == row.day_id => current.meals.push(Meal {
                id,
                name: row.meal_name.unwrap_or_default(),
                time: row.time.unwrap_or_default(),
                description: row.description.unwrap_or_default(),
                calories: row.calories.unwrap_or(0),
                confirmed: row.confirmed.unwrap_or(false),
            }),
            _ => {}
        }
    }
    days
}

pub struct DietPlanRepository;

impl DietPlanRepository {
    /// All days of the user's diet plan, Sunday first, meals by time
    pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<DietPlanDay>>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, DietRow>(&format!(
            r#"{}
            WHERE d.user_id = $1
            ORDER BY array_position(ARRAY['sunday','monday','tuesday','wednesday','thursday','friday','saturday'], d.day),
                     d.id, m.order_index, m.time"#,
            SELECT_DAYS
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(group_rows(rows))
    }

    /// The day owning `meal_id`, locked for update
    pub async fn find_day_for_meal(
        conn: &mut PgConnection,
        user_id: Uuid,
        meal_id: Uuid,
    ) -> Result<Option<DietPlanDay>> {
        let rows = sqlx::query_as::<_, DietRow>(&format!(
            r#"{}
            WHERE d.user_id = $1
              AND d.id = (SELECT diet_plan_id FROM meals WHERE id = $2)
            ORDER BY m.order_index, m.time
            FOR UPDATE OF d"#,
            SELECT_DAYS
        ))
        .bind(user_id)
        .bind(meal_id)
        .fetch_all(conn)
        .await?;

        Ok(group_rows(rows).into_iter().next())
    }

    /// Confirm a meal. Returns false if it was already confirmed.
    ///
    /// A diet day has no stored completion flag; it is complete when every
    /// meal is confirmed.
    pub async fn apply_confirmation(conn: &mut PgConnection, plan: &CompletionPlan) -> Result<bool> {
        let updated = sqlx::query(
            r#"UPDATE meals SET confirmed = TRUE WHERE id = $1 AND confirmed = FALSE"#,
        )
        .bind(plan.item_id)
        .execute(conn)
        .await?;

        Ok(updated.rows_affected() > 0)
    }

    /// Clear every meal confirmation. Returns the number cleared.
    pub async fn reset_week(conn: &mut PgConnection, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE meals SET confirmed = FALSE
            WHERE confirmed = TRUE
              AND diet_plan_id IN (SELECT id FROM diet_plans WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_rows_keeps_empty_days() {
        let day_id = Uuid::new_v4();
        let days = group_rows(vec![DietRow {
            day_id,
            day: "sábado".to_string(),
            generated_at: None,
            meal_id: None,
            meal_name: None,
            time: None,
            description: None,
            calories: None,
            confirmed: None,
        }]);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day, DayKey::Saturday);
        assert!(days[0].meals.is_empty());
    }
}
