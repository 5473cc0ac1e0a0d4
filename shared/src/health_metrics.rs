//! Body metrics derived during onboarding
//!
//! The onboarding wizard derives a BMI value and category from the
//! physical metrics step; both are sent to the plan model with the profile.

use serde::{Deserialize, Serialize};

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    SeverelyUnderweight,
    Underweight,
    Normal,
    Overweight,
    ObeseClass1,
    ObeseClass2,
    ObeseClass3,
}

impl BmiCategory {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::SeverelyUnderweight => "Severely Underweight",
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal/Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObeseClass1 => "Obese (Class I)",
            BmiCategory::ObeseClass2 => "Obese (Class II)",
            BmiCategory::ObeseClass3 => "Obese (Class III)",
        }
    }
}

/// BMI value with its category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiReading {
    /// Rounded to one decimal
    pub value: f64,
    pub category: BmiCategory,
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 || !height_cm.is_finite() || !weight_kg.is_finite() {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight_kg / (height_m * height_m))
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 16.0 {
        BmiCategory::SeverelyUnderweight
    } else if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::ObeseClass1
    } else if bmi < 40.0 {
        BmiCategory::ObeseClass2
    } else {
        BmiCategory::ObeseClass3
    }
}

/// BMI reading for a weight/height pair
pub fn bmi_reading(weight_kg: f64, height_cm: f64) -> Option<BmiReading> {
    calculate_bmi(weight_kg, height_cm).map(|bmi| BmiReading {
        value: (bmi * 10.0).round() / 10.0,
        category: classify_bmi(bmi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_calculation() {
        // 70kg, 175cm -> BMI ~22.86
        let bmi = calculate_bmi(70.0, 175.0).unwrap();
        assert!((bmi - 22.86).abs() < 0.1);
    }

    #[test]
    fn test_bmi_rejects_zero_height() {
        assert_eq!(calculate_bmi(70.0, 0.0), None);
        assert_eq!(bmi_reading(70.0, -5.0), None);
    }

    #[test]
    fn test_bmi_categories() {
        assert_eq!(classify_bmi(15.0), BmiCategory::SeverelyUnderweight);
        assert_eq!(classify_bmi(17.0), BmiCategory::Underweight);
        assert_eq!(classify_bmi(22.0), BmiCategory::Normal);
        assert_eq!(classify_bmi(27.0), BmiCategory::Overweight);
        assert_eq!(classify_bmi(32.0), BmiCategory::ObeseClass1);
        assert_eq!(classify_bmi(37.0), BmiCategory::ObeseClass2);
        assert_eq!(classify_bmi(42.0), BmiCategory::ObeseClass3);
    }

    #[test]
    fn test_reading_is_rounded() {
        let reading = bmi_reading(70.0, 175.0).unwrap();
        assert_eq!(reading.value, 22.9);
        assert_eq!(reading.category, BmiCategory::Normal);
    }
}
