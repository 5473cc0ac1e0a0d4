//! Data models for plans, logs and streaks
//!
//! Every entity here belongs to exactly one user. Percentages and other
//! derived figures are never stored on these types; see [`crate::progress`].

use crate::weekday::DayKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recurring weekly workout slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlanDay {
    pub id: Uuid,
    pub day: DayKey,
    pub name: String,
    pub objective: Option<String>,
    pub completed: bool,
    /// When the recurring schedule was generated, if known
    pub generated_at: Option<DateTime<Utc>>,
    /// Ordered by `order_index`
    pub exercises: Vec<Exercise>,
}

impl WorkoutPlanDay {
    /// Number of exercises already completed
    pub fn completed_count(&self) -> usize {
        self.exercises.iter().filter(|e| e.completed).count()
    }

    /// Find an exercise of this day by id
    pub fn exercise(&self, exercise_id: Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    /// Sort exercises by their stable order index
    pub fn sort_exercises(&mut self) {
        self.exercises.sort_by_key(|e| e.order_index);
    }
}

/// A prescribed exercise within a workout day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    pub rest: String,
    pub note: Option<String>,
    pub video_url: Option<String>,
    pub order_index: i32,
    /// One-way: only a full-week reset clears it
    pub completed: bool,
}

/// One recurring weekly diet slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DietPlanDay {
    pub id: Uuid,
    pub day: DayKey,
    pub generated_at: Option<DateTime<Utc>>,
    pub meals: Vec<Meal>,
}

impl DietPlanDay {
    /// Number of meals already confirmed
    pub fn confirmed_count(&self) -> usize {
        self.meals.iter().filter(|m| m.confirmed).count()
    }

    /// True once every meal has been confirmed (and there is at least one)
    pub fn is_completed(&self) -> bool {
        !self.meals.is_empty() && self.confirmed_count() == self.meals.len()
    }

    /// Find a meal of this day by id
    pub fn meal(&self, meal_id: Uuid) -> Option<&Meal> {
        self.meals.iter().find(|m| m.id == meal_id)
    }
}

/// A scheduled meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    /// Scheduled time of day, e.g. "07:30"
    pub time: String,
    pub description: String,
    pub calories: i32,
    /// One-way: only a full-week reset clears it
    pub confirmed: bool,
}

/// A single water intake entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterEntry {
    pub id: Uuid,
    /// Calendar date in the reference timezone
    pub date: NaiveDate,
    pub logged_at: DateTime<Utc>,
    pub amount_ml: i32,
}

/// Consecutive-day activity counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StreakRecord {
    pub consecutive_days: u32,
    pub best_streak: u32,
    /// Last calendar day (reference timezone) with registered activity
    pub last_activity: Option<NaiveDate>,
}
