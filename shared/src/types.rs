//! API request and response types

use crate::dashboard::{StreakSummary, WaterSummary};
use crate::models::{DietPlanDay, WaterEntry, WorkoutPlanDay};
use crate::plan::UserProfileInput;
use crate::profile::Preferences;
use crate::schedule::DayStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Auth
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Account summary returned by `/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// Stored goal, if the user set one
    pub water_goal_ml: Option<u32>,
    /// Goal used for percentages (stored goal or the default)
    pub effective_water_goal_ml: u32,
    /// Last profile submitted for plan generation
    pub generation_profile: Option<UserProfileInput>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub water_goal_ml: Option<u32>,
}

// ============================================================================
// Plans
// ============================================================================

/// Workout day with its derived schedule fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDayView {
    #[serde(flatten)]
    pub day: WorkoutPlanDay,
    pub occurrence: NaiveDate,
    pub status: DayStatus,
    pub completion_percent: u8,
}

/// Diet day with its derived schedule fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietDayView {
    #[serde(flatten)]
    pub day: DietPlanDay,
    pub occurrence: NaiveDate,
    pub status: DayStatus,
    pub completion_percent: u8,
}

/// Result of completing an exercise or confirming a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub item_id: Uuid,
    pub day_id: Uuid,
    pub day_completed: bool,
    pub streak: StreakSummary,
}

/// Counts cleared by a full-week reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub exercises_cleared: u64,
    pub days_cleared: u64,
    pub meals_cleared: u64,
}

// ============================================================================
// Water
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWaterRequest {
    pub amount_ml: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterTodayResponse {
    pub date: NaiveDate,
    pub entries: Vec<WaterEntry>,
    #[serde(flatten)]
    pub summary: WaterSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekday::DayKey;

    #[test]
    fn test_workout_view_flattens_day() {
        let view = WorkoutDayView {
            day: WorkoutPlanDay {
                id: Uuid::nil(),
                day: DayKey::Monday,
                name: "Push".to_string(),
                objective: None,
                completed: false,
                generated_at: None,
                exercises: Vec::new(),
            },
            occurrence: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: DayStatus::Rest,
            completion_percent: 0,
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["day"], "monday");
        assert_eq!(value["name"], "Push");
        assert_eq!(value["occurrence"], "2024-01-01");
        assert_eq!(value["status"], "rest");
    }

    #[test]
    fn test_register_request_display_name_is_optional() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"secret123"}"#).unwrap();
        assert!(req.display_name.is_none());
    }
}
