//! FitCoach WASM Module
//!
//! Browser bindings over the shared scheduling and progress logic, so the
//! client disables controls and renders percentages with exactly the rules
//! the server enforces.

use chrono::NaiveDate;
use fitcoach_shared::health_metrics::bmi_reading;
use fitcoach_shared::onboarding::Wizard;
use fitcoach_shared::progress::{self, StreakLevel};
use fitcoach_shared::schedule::{self, classify, plan_exercise_completion, plan_meal_confirmation};
use fitcoach_shared::session::{reduce, Action, SessionState};
use fitcoach_shared::{DayKey, DietPlanDay, Today, WorkoutPlanDay};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

fn parse_date(iso: &str) -> Result<NaiveDate, String> {
    iso.parse::<NaiveDate>()
        .map_err(|e| format!("Invalid date `{}`: {}", iso, e))
}

/// A date the client computed in the reference timezone
fn parse_today(iso: &str) -> Result<Today, String> {
    parse_date(iso).map(Today::in_reference)
}

fn parse_day(raw: &str) -> Result<DayKey, String> {
    raw.parse::<DayKey>().map_err(|e| e.to_string())
}

/// Canonical key for a localized weekday name, if it names one
#[wasm_bindgen]
pub fn normalize_day(raw: &str) -> Option<String> {
    DayKey::normalize(raw).map(|k| k.as_str().to_string())
}

/// Weekday key of "now" in the reference timezone
#[wasm_bindgen]
pub fn today_key() -> String {
    DayKey::today().as_str().to_string()
}

fn first_occurrence_inner(base_iso: &str, day: &str) -> Result<String, String> {
    let base = parse_date(base_iso)?;
    let target = parse_day(day)?;
    Ok(schedule::first_occurrence(base, target).to_string())
}

/// First date on or after `base_iso` falling on `day`
#[wasm_bindgen]
pub fn first_occurrence(base_iso: &str, day: &str) -> Result<String, JsValue> {
    first_occurrence_inner(base_iso, day).map_err(|e| JsValue::from_str(&e))
}

fn workout_status_inner(day_json: &str, today_iso: &str) -> Result<String, String> {
    let day: WorkoutPlanDay = serde_json::from_str(day_json).map_err(|e| e.to_string())?;
    let today = parse_today(today_iso)?;
    let status = serde_json::to_value(classify(&day, today)).map_err(|e| e.to_string())?;
    Ok(status.as_str().unwrap_or_default().to_string())
}

/// Status of a workout day (`rest`, `completed`, `today`, `overdue`, `upcoming`)
#[wasm_bindgen]
pub fn workout_day_status(day_json: &str, today_iso: &str) -> Result<String, JsValue> {
    workout_status_inner(day_json, today_iso).map_err(|e| JsValue::from_str(&e))
}

fn exercise_check_inner(day_json: &str, exercise_id: &str, today_iso: &str) -> Result<bool, String> {
    let day: WorkoutPlanDay = serde_json::from_str(day_json).map_err(|e| e.to_string())?;
    let id = Uuid::parse_str(exercise_id).map_err(|e| e.to_string())?;
    let today = parse_today(today_iso)?;
    plan_exercise_completion(&day, id, today)
        .map(|plan| plan.completes_day)
        .map_err(|e| e.to_string())
}

/// Whether an exercise may be completed today.
///
/// Resolves to `true` when completing it also completes the day; rejects
/// with the user-facing message otherwise.
#[wasm_bindgen]
pub fn check_exercise_completion(day_json: &str, exercise_id: &str, today_iso: &str) -> Result<bool, JsValue> {
    exercise_check_inner(day_json, exercise_id, today_iso).map_err(|e| JsValue::from_str(&e))
}

fn meal_check_inner(day_json: &str, meal_id: &str, today_iso: &str) -> Result<bool, String> {
    let day: DietPlanDay = serde_json::from_str(day_json).map_err(|e| e.to_string())?;
    let id = Uuid::parse_str(meal_id).map_err(|e| e.to_string())?;
    let today = parse_today(today_iso)?;
    plan_meal_confirmation(&day, id, today)
        .map(|plan| plan.completes_day)
        .map_err(|e| e.to_string())
}

/// Meal counterpart of [`check_exercise_completion`]
#[wasm_bindgen]
pub fn check_meal_confirmation(day_json: &str, meal_id: &str, today_iso: &str) -> Result<bool, JsValue> {
    meal_check_inner(day_json, meal_id, today_iso).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn completion_percent(completed: u32, total: u32) -> u8 {
    progress::completion_percent(completed as usize, total as usize)
}

#[wasm_bindgen]
pub fn water_percent(consumed_ml: u32, goal_ml: Option<u32>) -> f64 {
    progress::water_percent(consumed_ml, goal_ml)
}

#[wasm_bindgen]
pub fn water_remaining_ml(consumed_ml: u32, goal_ml: Option<u32>) -> u32 {
    progress::water_remaining_ml(consumed_ml, goal_ml)
}

#[wasm_bindgen]
pub fn intensity_percent(consecutive_days: u32) -> u8 {
    progress::intensity_percent(consecutive_days)
}

/// Display label of the streak band containing `consecutive_days`
#[wasm_bindgen]
pub fn streak_level_label(consecutive_days: u32) -> String {
    StreakLevel::for_days(consecutive_days).label().to_string()
}

#[wasm_bindgen]
pub fn progress_to_next_level(consecutive_days: u32) -> u8 {
    progress::progress_to_next_level(consecutive_days)
}

/// BMI rounded to one decimal, or 0 for invalid measurements
#[wasm_bindgen]
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    bmi_reading(weight_kg, height_cm).map(|r| r.value).unwrap_or(0.0)
}

// ============================================================================
// Onboarding wizard
// ============================================================================

fn parse_wizard(wizard_json: &str) -> Result<Wizard, String> {
    serde_json::from_str(wizard_json).map_err(|e| format!("Invalid wizard state: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

/// Empty wizard on the first step
#[wasm_bindgen]
pub fn wizard_new() -> String {
    to_json(&Wizard::new()).unwrap_or_default()
}

fn wizard_checklist_inner(wizard_json: &str) -> Result<String, String> {
    to_json(&parse_wizard(wizard_json)?.checklist())
}

/// Labels of the fields still blocking the current step, as a JSON array
#[wasm_bindgen]
pub fn wizard_checklist(wizard_json: &str) -> Result<String, JsValue> {
    wizard_checklist_inner(wizard_json).map_err(|e| JsValue::from_str(&e))
}

fn wizard_advance_inner(wizard_json: &str) -> Result<String, String> {
    let mut wizard = parse_wizard(wizard_json)?;
    wizard.advance().map_err(|e| e.to_string())?;
    to_json(&wizard)
}

/// Wizard moved to the next step; rejects with the missing fields
#[wasm_bindgen]
pub fn wizard_advance(wizard_json: &str) -> Result<String, JsValue> {
    wizard_advance_inner(wizard_json).map_err(|e| JsValue::from_str(&e))
}

fn wizard_back_inner(wizard_json: &str) -> Result<String, String> {
    let mut wizard = parse_wizard(wizard_json)?;
    wizard.back().map_err(|e| e.to_string())?;
    to_json(&wizard)
}

#[wasm_bindgen]
pub fn wizard_back(wizard_json: &str) -> Result<String, JsValue> {
    wizard_back_inner(wizard_json).map_err(|e| JsValue::from_str(&e))
}

fn wizard_finish_inner(wizard_json: &str) -> Result<String, String> {
    let profile = parse_wizard(wizard_json)?.finish().map_err(|e| e.to_string())?;
    to_json(&serde_json::json!({ "userProfile": profile }))
}

/// Body of the plan generation request built from a complete wizard
#[wasm_bindgen]
pub fn wizard_finish(wizard_json: &str) -> Result<String, JsValue> {
    wizard_finish_inner(wizard_json).map_err(|e| JsValue::from_str(&e))
}

// ============================================================================
// Session
// ============================================================================

/// Session of a freshly mounted screen
#[wasm_bindgen]
pub fn session_mounted() -> String {
    to_json(&SessionState::mounted()).unwrap_or_default()
}

fn reduce_session_inner(state_json: &str, action_json: &str) -> Result<String, String> {
    let state: SessionState =
        serde_json::from_str(state_json).map_err(|e| format!("Invalid session state: {}", e))?;
    let action: Action =
        serde_json::from_str(action_json).map_err(|e| format!("Invalid action: {}", e))?;
    to_json(&reduce(&state, action))
}

/// Apply one `{ "type", "payload" }` action to a session
#[wasm_bindgen]
pub fn reduce_session(state_json: &str, action_json: &str) -> Result<String, JsValue> {
    reduce_session_inner(state_json, action_json).map_err(|e| JsValue::from_str(&e))
}
