//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub water_goal_ml: Option<i32>,
    pub preferences: Option<String>,
    pub generation_profile: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating profile fields; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateUserProfile {
    pub display_name: Option<String>,
    pub water_goal_ml: Option<i32>,
}

const USER_COLUMNS: &str = "id, email, password_hash, display_name, water_goal_ml, preferences, \
                            generation_profile, created_at, updated_at";

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
    ) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(exists.0)
    }

    pub async fn update_profile(pool: &PgPool, id: Uuid, input: UpdateUserProfile) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                water_goal_ml = COALESCE($3, water_goal_ml),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.display_name)
        .bind(input.water_goal_ml)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn update_preferences(pool: &PgPool, id: Uuid, preferences: &str) -> Result<()> {
        sqlx::query(
            r#"UPDATE users SET preferences = $2, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .bind(preferences)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store the profile used for generation, and its water goal when given
    pub async fn save_generation_profile<'e, E>(
        executor: E,
        id: Uuid,
        profile: &serde_json::Value,
        water_goal_ml: Option<i32>,
    ) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE users
            SET generation_profile = $2,
                water_goal_ml = COALESCE($3, water_goal_ml),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(profile)
        .bind(water_goal_ml)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn water_goal<'e, E>(executor: E, id: Uuid) -> Result<Option<i32>>
    where
        E: PgExecutor<'e>,
    {
        let goal: Option<(Option<i32>,)> =
            sqlx::query_as(r#"SELECT water_goal_ml FROM users WHERE id = $1"#)
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(goal.and_then(|(g,)| g))
    }
}
