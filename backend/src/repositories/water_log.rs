//! Water log repository

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use fitcoach_shared::WaterEntry;
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// Water log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaterLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub amount_ml: i32,
    pub logged_at: DateTime<Utc>,
}

impl From<WaterLogRecord> for WaterEntry {
    fn from(record: WaterLogRecord) -> Self {
        WaterEntry {
            id: record.id,
            date: record.log_date,
            logged_at: record.logged_at,
            amount_ml: record.amount_ml,
        }
    }
}

/// Input for creating a water log
#[derive(Debug, Clone)]
pub struct CreateWaterLog {
    pub user_id: Uuid,
    /// Date in the reference timezone
    pub log_date: NaiveDate,
    pub amount_ml: i32,
    pub logged_at: DateTime<Utc>,
}

pub struct WaterLogRepository;

impl WaterLogRepository {
    pub async fn create(pool: &PgPool, input: CreateWaterLog) -> Result<WaterLogRecord> {
        let record = sqlx::query_as::<_, WaterLogRecord>(
            r#"
            INSERT INTO water_logs (user_id, log_date, amount_ml, logged_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, log_date, amount_ml, logged_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.log_date)
        .bind(input.amount_ml)
        .bind(input.logged_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Entries for one reference-timezone date, oldest first
    pub async fn list_for_date<'e, E>(executor: E, user_id: Uuid, date: NaiveDate) -> Result<Vec<WaterLogRecord>>
    where
        E: PgExecutor<'e>,
    {
        let records = sqlx::query_as::<_, WaterLogRecord>(
            r#"
            SELECT id, user_id, log_date, amount_ml, logged_at
            FROM water_logs
            WHERE user_id = $1 AND log_date = $2
            ORDER BY logged_at ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM water_logs WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
