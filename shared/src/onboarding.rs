//! Onboarding wizard
//!
//! Six ordered steps collect the profile sent to plan generation. Each step
//! exposes a checklist of missing or invalid fields; the wizard only moves
//! forward when the current checklist is empty.

use crate::errors::WizardError;
use crate::health_metrics::{bmi_reading, BmiReading};
use crate::plan::{
    FitnessProfile, HealthFlags, PersonalInfo, PhysicalMetrics, ProfileSettings, UserProfileInput,
};
use crate::profile::{ExperienceLevel, FitnessGoal, Language, Sex};
use crate::validation::{
    get_field_display_label, validate_age, validate_days_per_week, validate_display_name,
    validate_height_cm, validate_water_goal_ml, validate_weight,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    PersonalInfo,
    PhysicalMetrics,
    FitnessProfile,
    HealthFlags,
    Settings,
    Summary,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::PersonalInfo,
        WizardStep::PhysicalMetrics,
        WizardStep::FitnessProfile,
        WizardStep::HealthFlags,
        WizardStep::Settings,
        WizardStep::Summary,
    ];

    pub fn position(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.position().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Missing or invalid fields for this step, as display labels
    pub fn checklist(&self, draft: &ProfileDraft) -> Vec<String> {
        let mut missing = Vec::new();
        let mut check = |field: &str, ok: bool| {
            if !ok {
                missing.push(get_field_display_label(field).to_string());
            }
        };

        match self {
            WizardStep::PersonalInfo => {
                check("name", draft.name.as_deref().is_some_and(|n| validate_display_name(n).is_ok()));
                check("age", draft.age.is_some_and(|a| validate_age(a).is_ok()));
                check("sex", draft.sex.is_some());
            }
            WizardStep::PhysicalMetrics => {
                check("weight_kg", draft.weight_kg.is_some_and(|w| validate_weight(w).is_ok()));
                check("height_cm", draft.height_cm.is_some_and(|h| validate_height_cm(h).is_ok()));
                check(
                    "target_weight_kg",
                    draft.target_weight_kg.map_or(true, |w| validate_weight(w).is_ok()),
                );
            }
            WizardStep::FitnessProfile => {
                check("experience_level", draft.experience_level.is_some());
                check("goal", draft.goal.is_some());
                check(
                    "days_per_week",
                    draft.days_per_week.is_some_and(|d| validate_days_per_week(d).is_ok()),
                );
                check(
                    "session_minutes",
                    draft.session_minutes.map_or(true, |m| (10..=240).contains(&m)),
                );
            }
            WizardStep::HealthFlags => {}
            WizardStep::Settings => {
                check(
                    "water_goal_ml",
                    draft.water_goal_ml.map_or(true, |g| validate_water_goal_ml(g).is_ok()),
                );
            }
            WizardStep::Summary => {}
        }
        missing
    }
}

/// Values entered so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub experience_level: Option<ExperienceLevel>,
    pub goal: Option<FitnessGoal>,
    pub days_per_week: Option<u8>,
    pub session_minutes: Option<u16>,
    pub workout_location: Option<String>,
    pub health: HealthFlags,
    pub language: Language,
    pub water_goal_ml: Option<u32>,
}

impl ProfileDraft {
    /// Derived BMI, available once weight and height are set
    pub fn bmi(&self) -> Option<BmiReading> {
        bmi_reading(self.weight_kg?, self.height_cm?)
    }
}

/// Wizard position and draft; the browser keeps it as JSON between steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wizard {
    step: WizardStep,
    pub draft: ProfileDraft,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn checklist(&self) -> Vec<String> {
        self.step().checklist(&self.draft)
    }

    /// Move to the next step if the current one is complete
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.step().next().ok_or(WizardError::AtLastStep)?;
        let missing = self.checklist();
        if !missing.is_empty() {
            return Err(WizardError::Incomplete(missing));
        }
        self.step = next;
        Ok(next)
    }

    /// Go back one step; never validates
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.step().previous().ok_or(WizardError::AtFirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    /// Build the generation profile from the summary step
    pub fn finish(&self) -> Result<UserProfileInput, WizardError> {
        let missing: Vec<String> = WizardStep::ALL
            .iter()
            .flat_map(|step| step.checklist(&self.draft))
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::Incomplete(missing));
        }

        let d = &self.draft;
        let incomplete = || WizardError::Incomplete(Vec::new());
        let bmi = d.bmi();

        Ok(UserProfileInput {
            personal_info: PersonalInfo {
                name: d.name.clone().ok_or_else(incomplete)?.trim().to_string(),
                age: d.age.ok_or_else(incomplete)?,
                sex: d.sex.ok_or_else(incomplete)?,
            },
            physical_metrics: PhysicalMetrics {
                weight_kg: d.weight_kg.ok_or_else(incomplete)?,
                height_cm: d.height_cm.ok_or_else(incomplete)?,
                target_weight_kg: d.target_weight_kg,
                bmi: bmi.map(|b| b.value),
                bmi_category: bmi.map(|b| b.category),
            },
            fitness_profile: FitnessProfile {
                experience_level: d.experience_level.ok_or_else(incomplete)?,
                goal: d.goal.ok_or_else(incomplete)?,
                days_per_week: d.days_per_week.ok_or_else(incomplete)?,
                session_minutes: d.session_minutes,
                workout_location: d.workout_location.clone(),
            },
            health: d.health.clone(),
            settings: ProfileSettings {
                language: d.language,
                water_goal_ml: d.water_goal_ml,
            },
        })
    }
}
