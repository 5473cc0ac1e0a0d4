//! Streak service

use crate::error::ApiError;
use crate::repositories::StreakRepository;
use crate::services::read_or_default;
use anyhow::Result;
use chrono::NaiveDate;
use fitcoach_shared::dashboard::StreakSummary;
use fitcoach_shared::StreakRecord;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

pub struct StreakService;

impl StreakService {
    pub async fn get_summary(db: &PgPool, user_id: Uuid, today: NaiveDate) -> StreakSummary {
        let record = read_or_default(StreakRepository::get(db, user_id).await, "streak.get", user_id);
        StreakSummary::from_record(&record, today)
    }

    /// Register activity inside the caller's transaction.
    ///
    /// The row is locked for the read-modify-write, so two completions on
    /// the same day count once.
    pub async fn register_activity(
        conn: &mut PgConnection,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<StreakRecord> {
        let mut record = StreakRepository::get_for_update(&mut *conn, user_id).await?;
        if record.register_activity(today) {
            StreakRepository::save(&mut *conn, user_id, &record).await?;
        }
        Ok(record)
    }

    pub async fn reset(db: &PgPool, user_id: Uuid, today: NaiveDate) -> Result<StreakSummary, ApiError> {
        let mut tx = db.begin().await?;
        let mut record = StreakRepository::get_for_update(&mut tx, user_id)
            .await
            .map_err(ApiError::Internal)?;
        record.reset();
        StreakRepository::save(&mut *tx, user_id, &record)
            .await
            .map_err(ApiError::Internal)?;
        tx.commit().await?;

        info!(user_id = %user_id, best_streak = record.best_streak, "Streak reset");
        Ok(StreakSummary::from_record(&record, today))
    }
}
