//! Streak repository
//!
//! One row per user. A missing row reads as an empty streak.

use anyhow::Result;
use chrono::NaiveDate;
use fitcoach_shared::StreakRecord;
use sqlx::postgres::PgExecutor;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StreakRow {
    pub consecutive_days: i32,
    pub best_streak: i32,
    pub last_activity: Option<NaiveDate>,
}

impl From<StreakRow> for StreakRecord {
    fn from(row: StreakRow) -> Self {
        StreakRecord {
            consecutive_days: row.consecutive_days.max(0) as u32,
            best_streak: row.best_streak.max(0) as u32,
            last_activity: row.last_activity,
        }
    }
}

pub struct StreakRepository;

impl StreakRepository {
    pub async fn get<'e, E>(executor: E, user_id: Uuid) -> Result<StreakRecord>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, StreakRow>(
            r#"SELECT consecutive_days, best_streak, last_activity FROM streaks WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(StreakRecord::from).unwrap_or_default())
    }

    /// Read and lock the user's streak for a read-modify-write
    pub async fn get_for_update(conn: &mut PgConnection, user_id: Uuid) -> Result<StreakRecord> {
        sqlx::query(
            r#"INSERT INTO streaks (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING"#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let row = sqlx::query_as::<_, StreakRow>(
            r#"
            SELECT consecutive_days, best_streak, last_activity
            FROM streaks WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row.into())
    }

    pub async fn save<'e, E>(executor: E, user_id: Uuid, record: &StreakRecord) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO streaks (user_id, consecutive_days, best_streak, last_activity, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET consecutive_days = EXCLUDED.consecutive_days,
                best_streak = EXCLUDED.best_streak,
                last_activity = EXCLUDED.last_activity,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(record.consecutive_days as i32)
        .bind(record.best_streak as i32)
        .bind(record.last_activity)
        .execute(executor)
        .await?;

        Ok(())
    }
}
