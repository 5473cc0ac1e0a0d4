//! Input validation functions
//!
//! Used by the onboarding wizard's per-step checklists and by the backend
//! before anything is written.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a display name
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > 80 {
        return Err("Name must be at most 80 characters".to_string());
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age: u32) -> Result<(), String> {
    if age < 13 {
        return Err("Age must be at least 13 years".to_string());
    }
    if age > 120 {
        return Err("Age must be at most 120 years".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate weekly training frequency
pub fn validate_days_per_week(days: u8) -> Result<(), String> {
    if !(1..=7).contains(&days) {
        return Err("Training days must be between 1 and 7".to_string());
    }
    Ok(())
}

/// Validate a daily water goal
pub fn validate_water_goal_ml(goal_ml: u32) -> Result<(), String> {
    if !(500..=10_000).contains(&goal_ml) {
        return Err("Daily water goal must be between 500 and 10000 ml".to_string());
    }
    Ok(())
}

/// Validate a single water intake entry
pub fn validate_water_amount_ml(amount_ml: i32) -> Result<(), String> {
    if amount_ml <= 0 {
        return Err("Amount must be greater than 0".to_string());
    }
    if amount_ml > 5000 {
        return Err("Amount cannot exceed 5000ml".to_string());
    }
    Ok(())
}

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "name" | "display_name" => "Name",
        "age" => "Age",
        "sex" => "Sex",
        "weight" | "weight_kg" => "Current Weight",
        "height" | "height_cm" => "Height",
        "target_weight_kg" => "Target Weight",
        "experience_level" => "Experience Level",
        "goal" => "Goal",
        "days_per_week" => "Training Days per Week",
        "session_minutes" => "Session Length",
        "water_goal_ml" => "Daily Water Goal",
        "language" => "Language",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_body_ranges() {
        assert!(validate_weight(70.0).is_ok());
        assert!(validate_weight(10.0).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_height_cm(175.0).is_ok());
        assert!(validate_height_cm(400.0).is_err());
        assert!(validate_age(30).is_ok());
        assert!(validate_age(5).is_err());
    }

    #[test]
    fn test_water_ranges() {
        assert!(validate_water_amount_ml(250).is_ok());
        assert!(validate_water_amount_ml(0).is_err());
        assert!(validate_water_amount_ml(6000).is_err());
        assert!(validate_water_goal_ml(3000).is_ok());
        assert!(validate_water_goal_ml(100).is_err());
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(get_field_display_label("height_cm"), "Height");
        assert_eq!(get_field_display_label("days_per_week"), "Training Days per Week");
        assert_eq!(get_field_display_label("custom"), "custom");
    }
}
