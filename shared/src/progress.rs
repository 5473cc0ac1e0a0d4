//! Progress aggregation
//!
//! Completion percentages, water progress, streak intensity and streak
//! levels. Everything here is recomputed from the plan and log entities on
//! demand; nothing is cached.

use crate::models::{DietPlanDay, StreakRecord, WorkoutPlanDay};
use crate::schedule::ScheduledDay;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Water goal used when the user has not set one
pub const DEFAULT_WATER_GOAL_ML: u32 = 3000;

/// Consecutive days that count as full intensity
pub const FULL_INTENSITY_DAYS: u32 = 30;

/// `round(100 * completed / total)`, 0 when there is nothing to complete
pub fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// Workout completion for the day scheduled as today
pub fn workout_completion_percent(day: Option<&WorkoutPlanDay>) -> u8 {
    day.map(|d| completion_percent(d.completed_count(), d.exercises.len()))
        .unwrap_or(0)
}

/// Diet completion for the day scheduled as today
pub fn diet_completion_percent(day: Option<&DietPlanDay>) -> u8 {
    day.map(|d| completion_percent(d.confirmed_count(), d.meals.len()))
        .unwrap_or(0)
}

/// Goal in effect, falling back to the default when unset or zero
pub fn effective_water_goal(goal_ml: Option<u32>) -> u32 {
    goal_ml.filter(|g| *g > 0).unwrap_or(DEFAULT_WATER_GOAL_ML)
}

/// `100 * consumed / goal`. Not capped; callers clamp for display.
pub fn water_percent(consumed_ml: u32, goal_ml: Option<u32>) -> f64 {
    let goal = effective_water_goal(goal_ml);
    (consumed_ml as f64 / goal as f64) * 100.0
}

/// Milliliters still missing to reach the goal
pub fn water_remaining_ml(consumed_ml: u32, goal_ml: Option<u32>) -> u32 {
    effective_water_goal(goal_ml).saturating_sub(consumed_ml)
}

/// `min(100, round(100 * days / 30))`
pub fn intensity_percent(consecutive_days: u32) -> u8 {
    let raw = (consecutive_days as f64 / FULL_INTENSITY_DAYS as f64) * 100.0;
    raw.round().min(100.0) as u8
}

/// Named streak bands, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakLevel {
    Beginner,
    Warming,
    Consistent,
    Dedicated,
    Intense,
    Legend,
}

impl StreakLevel {
    /// All levels in ascending order
    pub const ALL: [StreakLevel; 6] = [
        StreakLevel::Beginner,
        StreakLevel::Warming,
        StreakLevel::Consistent,
        StreakLevel::Dedicated,
        StreakLevel::Intense,
        StreakLevel::Legend,
    ];

    /// Closed range of days for this band; the top band is unbounded
    pub fn range(&self) -> (u32, Option<u32>) {
        match self {
            StreakLevel::Beginner => (0, Some(2)),
            StreakLevel::Warming => (3, Some(6)),
            StreakLevel::Consistent => (7, Some(13)),
            StreakLevel::Dedicated => (14, Some(29)),
            StreakLevel::Intense => (30, Some(99)),
            StreakLevel::Legend => (100, None),
        }
    }

    /// Whether `days` falls inside this band
    pub fn contains(&self, days: u32) -> bool {
        let (start, end) = self.range();
        days >= start && end.map_or(true, |end| days <= end)
    }

    /// The band containing `days`
    pub fn for_days(days: u32) -> StreakLevel {
        Self::ALL
            .iter()
            .rev()
            .find(|level| days >= level.range().0)
            .copied()
            .unwrap_or(StreakLevel::Beginner)
    }

    /// The following band, if any
    pub fn next(&self) -> Option<StreakLevel> {
        Self::ALL.get(*self as usize + 1).copied()
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            StreakLevel::Beginner => "Beginner",
            StreakLevel::Warming => "Warming Up",
            StreakLevel::Consistent => "Consistent",
            StreakLevel::Dedicated => "Dedicated",
            StreakLevel::Intense => "Intense",
            StreakLevel::Legend => "Legend",
        }
    }
}

/// Position within the current band relative to the next band's start
pub fn progress_to_next_level(consecutive_days: u32) -> u8 {
    let level = StreakLevel::for_days(consecutive_days);
    match level.next() {
        None => 100,
        Some(next) => {
            let start = level.range().0;
            let span = (next.range().0 - start) as f64;
            let position = (consecutive_days - start) as f64;
            ((position / span) * 100.0).round().min(100.0) as u8
        }
    }
}

/// Streak milestones. Unlocking is driven by the best streak and is never revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    WeekStreak,
    MonthStreak,
}

impl Achievement {
    pub const ALL: [Achievement; 2] = [Achievement::WeekStreak, Achievement::MonthStreak];

    /// Best streak required to unlock
    pub fn threshold(&self) -> u32 {
        match self {
            Achievement::WeekStreak => 7,
            Achievement::MonthStreak => 30,
        }
    }
}

/// Achievements unlocked by a best streak
pub fn unlocked_achievements(best_streak: u32) -> Vec<Achievement> {
    Achievement::ALL
        .iter()
        .copied()
        .filter(|a| best_streak >= a.threshold())
        .collect()
}

/// Number of days that have training in them (rest days excluded)
pub fn days_with_workout(days: &[WorkoutPlanDay]) -> usize {
    days.iter().filter(|d| !d.is_rest()).count()
}

impl StreakRecord {
    /// Register activity on `today`.
    ///
    /// Same day is a no-op, the day after the last activity extends the
    /// streak, and any gap restarts it at 1. Returns whether anything changed.
    pub fn register_activity(&mut self, today: NaiveDate) -> bool {
        match self.last_activity {
            Some(last) if last == today => return false,
            Some(last) if last > today => return false,
            Some(last) if last + Duration::days(1) == today => {
                self.consecutive_days += 1;
            }
            _ => {
                self.consecutive_days = 1;
            }
        }
        self.last_activity = Some(today);
        self.best_streak = self.best_streak.max(self.consecutive_days);
        true
    }

    /// Explicit reset of the current streak. The best streak is kept.
    pub fn reset(&mut self) {
        self.consecutive_days = 0;
        self.last_activity = None;
    }

    /// Current streak as seen on `today`: a streak whose last activity is
    /// older than yesterday has lapsed and reads as 0.
    pub fn current_days(&self, today: NaiveDate) -> u32 {
        match self.last_activity {
            Some(last) if today - last <= Duration::days(1) => self.consecutive_days,
            _ => 0,
        }
    }

    pub fn intensity_percent(&self, today: NaiveDate) -> u8 {
        intensity_percent(self.current_days(today))
    }

    pub fn level(&self, today: NaiveDate) -> StreakLevel {
        StreakLevel::for_days(self.current_days(today))
    }
}
