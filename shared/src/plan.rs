//! Plan generation contract
//!
//! Request: `{ "userProfile": { ... } }` with a bearer credential.
//! Success: `200 { success: true, message, data: { workoutPlan, nutritionPlan, initialMessage } }`.
//! Failure: non-200 `{ success: false, error, details, timestamp }`.
//!
//! The model's text output is parsed leniently (numbers as strings, localized
//! weekday names), but `workoutPlan` and `nutritionPlan` are mandatory.

use crate::errors::PlanContractError;
use crate::health_metrics::BmiCategory;
use crate::profile::{ExperienceLevel, FitnessGoal, Language, Sex};
use crate::weekday::DayKey;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

// ============================================================================
// Request
// ============================================================================

/// Body of a plan generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub user_profile: Option<UserProfileInput>,
}

/// Structured profile collected by the onboarding wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileInput {
    #[validate(nested)]
    pub personal_info: PersonalInfo,
    #[validate(nested)]
    pub physical_metrics: PhysicalMetrics,
    #[validate(nested)]
    pub fitness_profile: FitnessProfile,
    #[serde(default)]
    pub health: HealthFlags,
    #[serde(default)]
    #[validate(nested)]
    pub settings: ProfileSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(range(min = 13, max = 120))]
    pub age: u32,
    pub sex: Sex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalMetrics {
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    #[validate(range(min = 20.0, max = 500.0))]
    pub target_weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FitnessProfile {
    pub experience_level: ExperienceLevel,
    pub goal: FitnessGoal,
    #[validate(range(min = 1, max = 7))]
    pub days_per_week: u8,
    #[validate(range(min = 10, max = 240))]
    pub session_minutes: Option<u16>,
    pub workout_location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthFlags {
    pub injuries: Vec<String>,
    pub medical_conditions: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub takes_medication: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSettings {
    pub language: Language,
    #[validate(range(min = 500, max = 10000))]
    pub water_goal_ml: Option<u32>,
}

// ============================================================================
// Response
// ============================================================================

/// Parsed plan returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub workout_plan: Vec<PlannedWorkoutDay>,
    pub nutrition_plan: NutritionPlan,
    #[serde(default)]
    pub initial_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedWorkoutDay {
    #[serde(deserialize_with = "lenient_day")]
    pub day: DayKey,
    pub name: String,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedExercise {
    pub name: String,
    #[serde(default = "default_sets", deserialize_with = "lenient_u32")]
    pub sets: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reps: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rest: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "video")]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPlan {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub daily_calories: Option<u32>,
    #[serde(default)]
    pub meals: Vec<PlannedMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    /// When absent the meal applies to every weekday
    #[serde(default, deserialize_with = "lenient_optional_day")]
    pub day: Option<DayKey>,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub calories: u32,
}

impl NutritionPlan {
    /// Meals to store for one weekday: meals tagged with that day, or all
    /// untagged meals when none are tagged for it.
    pub fn meals_for(&self, day: DayKey) -> Vec<&PlannedMeal> {
        let tagged: Vec<&PlannedMeal> = self.meals.iter().filter(|m| m.day == Some(day)).collect();
        if !tagged.is_empty() {
            return tagged;
        }
        self.meals.iter().filter(|m| m.day.is_none()).collect()
    }
}

/// Success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSuccess {
    pub success: bool,
    pub message: String,
    pub data: GeneratedPlan,
}

impl GenerationSuccess {
    pub fn new(plan: GeneratedPlan) -> Self {
        Self {
            success: true,
            message: "Plan generated successfully".to_string(),
            data: plan,
        }
    }
}

/// Failure envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub success: bool,
    pub error: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl GenerationFailure {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Model output parsing
// ============================================================================

/// Keys that must be present for a generation to count as successful
pub const REQUIRED_KEYS: [&str; 2] = ["workoutPlan", "nutritionPlan"];

/// Parse the model's text output into a plan.
///
/// Direct JSON parsing is tried first; if that fails, the first top-level
/// `{...}` span in the text is parsed instead.
pub fn parse_model_output(text: &str) -> Result<GeneratedPlan, PlanContractError> {
    let value = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value,
        Err(direct_err) => {
            let span = extract_first_object(text)
                .ok_or_else(|| PlanContractError::NotJson(direct_err.to_string()))?;
            serde_json::from_str::<Value>(span)
                .map_err(|e| PlanContractError::NotJson(e.to_string()))?
        }
    };

    validate_plan_value(&value)?;

    serde_json::from_value(value).map_err(|e| PlanContractError::Malformed(e.to_string()))
}

/// Check the required top-level keys are present and non-null
pub fn validate_plan_value(value: &Value) -> Result<(), PlanContractError> {
    let object = value
        .as_object()
        .ok_or_else(|| PlanContractError::Malformed("top level is not an object".to_string()))?;

    for key in REQUIRED_KEYS {
        match object.get(key) {
            None | Some(Value::Null) => return Err(PlanContractError::MissingKey(key)),
            Some(_) => {}
        }
    }
    Ok(())
}

/// First balanced top-level `{...}` span, skipping braces inside strings
pub fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn default_sets() -> u32 {
    3
}

fn lenient_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DayKey, D::Error> {
    let raw = String::deserialize(deserializer)?;
    DayKey::normalize(&raw).ok_or_else(|| D::Error::custom(format!("unknown weekday `{}`", raw)))
}

fn lenient_optional_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DayKey>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(DayKey::normalize))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number, got {}", other))),
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u32)
            .ok_or_else(|| D::Error::custom("expected a non-negative number")),
        Value::String(s) => parse_quantity(&s)
            .ok_or_else(|| D::Error::custom(format!("expected a number, got `{}`", s))),
        other => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn is_separator(c: char) -> bool {
    c == '.' || c == ','
}

/// Leading quantity of a text like `"1.200 kcal"` or `"1,050"`
///
/// A separator followed by exactly three digits groups thousands; one
/// followed by one or two digits starts a fraction, which is rounded.
/// Anything ambiguous yields `None` instead of a truncated value.
fn parse_quantity(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || is_separator(c)))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(end);
    if number.is_empty() || unit.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let (integer, fraction) = match number.rfind(is_separator) {
        Some(i) if number.len() - i - 1 != 3 => (&number[..i], Some(&number[i + 1..])),
        _ => (number, None),
    };

    let mut groups = integer.split(is_separator);
    let lead = groups.next().filter(|g| !g.is_empty())?;
    let mut digits = lead.to_string();
    for group in groups {
        if group.len() != 3 || lead.len() > 3 {
            return None;
        }
        digits.push_str(group);
    }

    let round_up = match fraction {
        Some(f) if f.is_empty() || f.len() > 2 => return None,
        Some(f) => f.as_bytes()[0] >= b'5',
        None => false,
    };
    let whole: u64 = digits.parse().ok()?;
    u32::try_from(whole + u64::from(round_up)).ok()
}
