//! Profile service - display name, water goal and preferences

use crate::error::ApiError;
use crate::repositories::{UpdateUserProfile, UserRecord, UserRepository};
use fitcoach_shared::plan::UserProfileInput;
use fitcoach_shared::profile::{Preferences, PreferencesPatch};
use fitcoach_shared::types::{ProfileResponse, UpdateProfileRequest};
use fitcoach_shared::validation::{get_field_display_label, validate_display_name, validate_water_goal_ml};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

pub struct ProfileService;

impl ProfileService {
    async fn load_user(db: &PgPool, user_id: Uuid) -> Result<UserRecord, ApiError> {
        UserRepository::find_by_id(db, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    fn to_response(user: UserRecord, default_water_goal_ml: u32) -> ProfileResponse {
        // A stored profile that no longer matches the current shape is dropped, not fatal
        let generation_profile = user.generation_profile.and_then(|value| {
            serde_json::from_value::<UserProfileInput>(value)
                .map_err(|e| warn!(user_id = %user.id, error = %e, "Ignoring unreadable generation profile"))
                .ok()
        });
        let water_goal_ml = user.water_goal_ml.and_then(|g| u32::try_from(g).ok());

        ProfileResponse {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            water_goal_ml,
            effective_water_goal_ml: water_goal_ml.unwrap_or(default_water_goal_ml),
            generation_profile,
            preferences: Preferences::from_json_text(user.preferences.as_deref()),
            created_at: user.created_at,
        }
    }

    pub async fn get_profile(
        db: &PgPool,
        user_id: Uuid,
        default_water_goal_ml: u32,
    ) -> Result<ProfileResponse, ApiError> {
        let user = Self::load_user(db, user_id).await?;
        Ok(Self::to_response(user, default_water_goal_ml))
    }

    fn validate_update(req: &UpdateProfileRequest) -> Result<(), ApiError> {
        let labelled = |field: &str, msg: String| {
            ApiError::Validation(format!("{}: {}", get_field_display_label(field), msg))
        };

        if let Some(name) = &req.display_name {
            validate_display_name(name).map_err(|m| labelled("display_name", m))?;
        }
        if let Some(goal) = req.water_goal_ml {
            validate_water_goal_ml(goal).map_err(|m| labelled("water_goal_ml", m))?;
        }
        Ok(())
    }

    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        req: UpdateProfileRequest,
        default_water_goal_ml: u32,
    ) -> Result<ProfileResponse, ApiError> {
        Self::validate_update(&req)?;

        let updates = UpdateUserProfile {
            display_name: req.display_name.map(|n| n.trim().to_string()),
            water_goal_ml: req.water_goal_ml.map(|g| g as i32),
        };
        UserRepository::update_profile(db, user_id, updates)
            .await
            .map_err(ApiError::Internal)?;

        Self::get_profile(db, user_id, default_water_goal_ml).await
    }

    pub async fn get_preferences(db: &PgPool, user_id: Uuid) -> Result<Preferences, ApiError> {
        let user = Self::load_user(db, user_id).await?;
        Ok(Preferences::from_json_text(user.preferences.as_deref()))
    }

    /// Apply a partial update and store the normalized result
    pub async fn update_preferences(
        db: &PgPool,
        user_id: Uuid,
        patch: PreferencesPatch,
    ) -> Result<Preferences, ApiError> {
        let updated = Self::get_preferences(db, user_id).await?.apply(&patch);

        UserRepository::update_preferences(db, user_id, &updated.to_json_text())
            .await
            .map_err(ApiError::Internal)?;

        Ok(updated)
    }
}
