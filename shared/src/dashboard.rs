//! Dashboard snapshot
//!
//! A read-only aggregate rebuilt from plan, water and streak entities every
//! time it is requested. It is never persisted.

use crate::models::{DietPlanDay, StreakRecord, WaterEntry, WorkoutPlanDay};
use crate::progress::{
    completion_percent, days_with_workout, diet_completion_percent, effective_water_goal,
    intensity_percent, progress_to_next_level, unlocked_achievements, water_percent,
    water_remaining_ml, workout_completion_percent, Achievement, StreakLevel,
};
use crate::schedule::{classify, day_for_today, DayStatus, ScheduledDay};
use crate::weekday::{DayKey, Today};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything a snapshot is computed from, read in one consistent pass
#[derive(Debug, Clone, Default)]
pub struct DashboardInputs {
    pub workout_days: Vec<WorkoutPlanDay>,
    pub diet_days: Vec<DietPlanDay>,
    /// Water entries for today only
    pub water_today: Vec<WaterEntry>,
    pub water_goal_ml: Option<u32>,
    pub streak: StreakRecord,
}

/// Water figures for today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSummary {
    pub consumed_ml: u32,
    pub goal_ml: u32,
    pub percent: f64,
    pub remaining_ml: u32,
}

impl WaterSummary {
    pub fn from_entries(entries: &[WaterEntry], goal_ml: Option<u32>) -> Self {
        let consumed_ml = entries.iter().map(|e| e.amount_ml.max(0) as u32).sum();
        Self {
            consumed_ml,
            goal_ml: effective_water_goal(goal_ml),
            percent: water_percent(consumed_ml, goal_ml),
            remaining_ml: water_remaining_ml(consumed_ml, goal_ml),
        }
    }
}

/// Streak figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub consecutive_days: u32,
    pub best_streak: u32,
    pub intensity_percent: u8,
    pub level: StreakLevel,
    pub level_label: String,
    pub progress_to_next_level: u8,
    pub achievements: Vec<Achievement>,
}

impl StreakSummary {
    pub fn from_record(record: &StreakRecord, today: NaiveDate) -> Self {
        let days = record.current_days(today);
        let level = StreakLevel::for_days(days);
        Self {
            consecutive_days: days,
            best_streak: record.best_streak,
            intensity_percent: intensity_percent(days),
            level,
            level_label: level.label().to_string(),
            progress_to_next_level: progress_to_next_level(days),
            achievements: unlocked_achievements(record.best_streak),
        }
    }
}

/// One weekday of the current plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayHistory {
    pub day: DayKey,
    pub has_plan: bool,
    pub occurrence: Option<NaiveDate>,
    pub status: Option<DayStatus>,
    pub workout_percent: u8,
}

/// Derived dashboard aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub date: NaiveDate,
    pub today: DayKey,
    pub workout_percent: u8,
    pub diet_percent: u8,
    pub water: WaterSummary,
    pub streak: StreakSummary,
    pub days_with_workout: usize,
    pub weekly_history: Vec<WeekdayHistory>,
}

impl DashboardSnapshot {
    /// Build the snapshot for `today`
    pub fn build(inputs: &DashboardInputs, today: Today) -> Self {
        let workout_today = day_for_today(&inputs.workout_days, today);
        let diet_today = day_for_today(&inputs.diet_days, today);

        let weekly_history = DayKey::ALL
            .iter()
            .map(|key| {
                let day = inputs.workout_days.iter().find(|d| d.day == *key);
                WeekdayHistory {
                    day: *key,
                    has_plan: day.is_some(),
                    occurrence: day.map(|d| d.occurrence(today)),
                    status: day.map(|d| classify(d, today)),
                    workout_percent: day
                        .map(|d| completion_percent(d.completed_count(), d.exercises.len()))
                        .unwrap_or(0),
                }
            })
            .collect();

        Self {
            date: today.date,
            today: today.key(),
            workout_percent: workout_completion_percent(workout_today),
            diet_percent: diet_completion_percent(diet_today),
            water: WaterSummary::from_entries(&inputs.water_today, inputs.water_goal_ml),
            streak: StreakSummary::from_record(&inputs.streak, today.date),
            days_with_workout: days_with_workout(&inputs.workout_days),
            weekly_history,
        }
    }
}
