//! User profile and typed preferences
//!
//! Preferences are persisted as JSON text. They are parsed once, on read,
//! into [`Preferences`]; unknown keys are ignored and missing or malformed
//! values fall back to their defaults instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Biological sex, used for the generated plan only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "masculino", alias = "m")]
    Male,
    #[serde(alias = "feminino", alias = "f")]
    Female,
}

/// Training experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[serde(alias = "iniciante")]
    Beginner,
    #[serde(alias = "intermediario")]
    Intermediate,
    #[serde(alias = "avancado")]
    Advanced,
}

/// Primary fitness goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    GainMuscle,
    Maintain,
    Endurance,
}

macro_rules! impl_str_enum {
    ($ty:ty { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_json::from_value(Value::String(s.trim().to_lowercase()))
                    .map_err(|_| format!("Invalid value: {}", s))
            }
        }
    };
}

impl_str_enum!(Sex { Male => "male", Female => "female" });
impl_str_enum!(ExperienceLevel {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});
impl_str_enum!(FitnessGoal {
    LoseWeight => "lose_weight",
    GainMuscle => "gain_muscle",
    Maintain => "maintain",
    Endurance => "endurance",
});

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "pt-BR", alias = "pt", alias = "pt-br")]
    PtBr,
    #[serde(rename = "en", alias = "en-US")]
    En,
    #[serde(rename = "es")]
    Es,
}

impl Language {
    /// Human-readable name, used when instructing the plan model
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::PtBr => "Brazilian Portuguese",
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }
}

/// Recognized user preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
    pub language: Language,
    pub share_workouts: bool,
    pub share_diets: bool,
}

impl Preferences {
    /// Parse the stored JSON text, defaulting anything missing or invalid
    pub fn from_json_text(text: Option<&str>) -> Self {
        text.and_then(|t| serde_json::from_str::<Value>(t).ok())
            .map(|v| Self::from_value(&v))
            .unwrap_or_default()
    }

    /// Read recognized options from a JSON value, field by field
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, fallback: bool| value.get(key).and_then(Value::as_bool).unwrap_or(fallback);

        Self {
            dark_mode: flag("darkMode", defaults.dark_mode),
            language: value
                .get("language")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or(defaults.language),
            share_workouts: flag("shareWorkouts", defaults.share_workouts),
            share_diets: flag("shareDiets", defaults.share_diets),
        }
    }

    /// Serialize for storage
    pub fn to_json_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<'de> Deserialize<'de> for Preferences {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Partial preferences update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub dark_mode: Option<bool>,
    pub language: Option<Language>,
    pub share_workouts: Option<bool>,
    pub share_diets: Option<bool>,
}

impl Preferences {
    /// Apply a partial update
    pub fn apply(self, patch: &PreferencesPatch) -> Self {
        Self {
            dark_mode: patch.dark_mode.unwrap_or(self.dark_mode),
            language: patch.language.unwrap_or(self.language),
            share_workouts: patch.share_workouts.unwrap_or(self.share_workouts),
            share_diets: patch.share_diets.unwrap_or(self.share_diets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_preferences_default() {
        let prefs = Preferences::from_json_text(None);
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.language, Language::PtBr);
    }

    #[test]
    fn test_malformed_text_defaults() {
        let prefs = Preferences::from_json_text(Some("{not json"));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_invalid_fields_default_individually() {
        let value = json!({
            "darkMode": "yes",
            "language": "klingon",
            "shareWorkouts": true,
            "unknownOption": 42
        });
        let prefs = Preferences::from_value(&value);

        assert!(!prefs.dark_mode);
        assert_eq!(prefs.language, Language::PtBr);
        assert!(prefs.share_workouts);
        assert!(!prefs.share_diets);
    }

    #[test]
    fn test_preferences_round_trip_through_text() {
        let prefs = Preferences {
            dark_mode: true,
            language: Language::En,
            share_workouts: false,
            share_diets: true,
        };
        let text = prefs.to_json_text();
        assert!(text.contains("\"language\":\"en\""));
        assert_eq!(Preferences::from_json_text(Some(&text)), prefs);
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let prefs = Preferences {
            dark_mode: true,
            ..Default::default()
        };
        let patched = prefs.apply(&PreferencesPatch {
            share_diets: Some(true),
            ..Default::default()
        });
        assert!(patched.dark_mode);
        assert!(patched.share_diets);
    }

    #[test]
    fn test_enum_parsing_accepts_portuguese_aliases() {
        assert_eq!("Masculino".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("iniciante".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Beginner);
        assert_eq!("gain_muscle".parse::<FitnessGoal>().unwrap(), FitnessGoal::GainMuscle);
        assert!("unknown".parse::<FitnessGoal>().is_err());
    }
}
