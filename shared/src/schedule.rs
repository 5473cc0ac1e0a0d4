//! Plan scheduling
//!
//! A recurring plan day is keyed by weekday. Its *occurrence date* is the
//! first date on or after a base date (the plan's generation date, or today
//! when unknown) that falls on that weekday. Completion actions are only
//! allowed on the day whose occurrence date is today.

use crate::errors::CompletionRejected;
use crate::models::{DietPlanDay, WorkoutPlanDay};
use crate::weekday::{fold_text, DayKey, Today};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Words in a day's name or objective that mark it as a rest day
const REST_MARKERS: &[&str] = &["rest", "descanso", "folga", "recovery", "recuperacao"];

/// "off" only marks rest next to "day" ("day off", "off day")
const OFF_PHRASES: &[[&str; 2]] = &[["day", "off"], ["off", "day"]];

/// First date on or after `base` whose weekday is `target`
pub fn first_occurrence(base: NaiveDate, target: DayKey) -> NaiveDate {
    let base_index = DayKey::from_date(base).index() as i64;
    let offset = (target.index() as i64 - base_index + 7) % 7;
    base + Duration::days(offset)
}

/// Occurrence date of a plan day generated at `generated_at`.
///
/// The generation instant is read in the same timezone as `today`. With no
/// generation date the base falls back to today, so every day collapses
/// onto the current week.
pub fn occurrence_date(generated_at: Option<DateTime<Utc>>, target: DayKey, today: Today) -> NaiveDate {
    let base = generated_at.map(|at| today.local_date(at)).unwrap_or(today.date);
    first_occurrence(base, target)
}

/// True when a day has nothing to train, or is tagged as rest
pub fn is_rest_day(name: &str, objective: Option<&str>, item_count: usize) -> bool {
    if item_count == 0 {
        return true;
    }
    let text = fold_text(&format!("{} {}", name, objective.unwrap_or_default()));
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    words.iter().any(|word| REST_MARKERS.contains(word))
        || words.windows(2).any(|pair| OFF_PHRASES.iter().any(|phrase| pair == phrase))
}

/// Where a plan day stands relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Rest,
    Completed,
    Today,
    Overdue,
    Upcoming,
}

/// Common view over workout and diet days for scheduling decisions
pub trait ScheduledDay {
    fn day_key(&self) -> DayKey;
    fn generated_at(&self) -> Option<DateTime<Utc>>;
    fn is_completed(&self) -> bool;
    fn is_rest(&self) -> bool;

    /// Occurrence date relative to `today`
    fn occurrence(&self, today: Today) -> NaiveDate {
        occurrence_date(self.generated_at(), self.day_key(), today)
    }

    /// True when the occurrence date is today
    fn is_scheduled_for(&self, today: Today) -> bool {
        self.occurrence(today) == today.date
    }
}

impl ScheduledDay for WorkoutPlanDay {
    fn day_key(&self) -> DayKey {
        self.day
    }

    fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn is_rest(&self) -> bool {
        is_rest_day(&self.name, self.objective.as_deref(), self.exercises.len())
    }
}

impl ScheduledDay for DietPlanDay {
    fn day_key(&self) -> DayKey {
        self.day
    }

    fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    fn is_completed(&self) -> bool {
        DietPlanDay::is_completed(self)
    }

    fn is_rest(&self) -> bool {
        self.meals.is_empty()
    }
}

/// Classify a plan day. Rest days are rest regardless of date.
pub fn classify<D: ScheduledDay>(day: &D, today: Today) -> DayStatus {
    if day.is_rest() {
        return DayStatus::Rest;
    }
    if day.is_completed() {
        return DayStatus::Completed;
    }
    let occurrence = day.occurrence(today);
    if occurrence == today.date {
        DayStatus::Today
    } else if occurrence < today.date {
        DayStatus::Overdue
    } else {
        DayStatus::Upcoming
    }
}

/// Guard for completion actions on any item of `day`
pub fn ensure_completable<D: ScheduledDay>(day: &D, today: Today) -> Result<(), CompletionRejected> {
    if day.is_rest() {
        return Err(CompletionRejected::RestDay);
    }
    let scheduled_for = day.occurrence(today);
    if scheduled_for != today.date {
        return Err(CompletionRejected::NotScheduledToday { scheduled_for });
    }
    Ok(())
}

/// The writes a permitted completion action must perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPlan {
    pub day_id: Uuid,
    pub item_id: Uuid,
    /// Set when this completion closes the last open item of the day
    pub completes_day: bool,
}

/// Decide whether an exercise may be completed today, and what to write
pub fn plan_exercise_completion(
    day: &WorkoutPlanDay,
    exercise_id: Uuid,
    today: Today,
) -> Result<CompletionPlan, CompletionRejected> {
    let exercise = day
        .exercise(exercise_id)
        .ok_or(CompletionRejected::UnknownItem(exercise_id))?;
    ensure_completable(day, today)?;
    if exercise.completed {
        return Err(CompletionRejected::AlreadyCompleted(exercise_id));
    }

    let remaining = day.exercises.len() - day.completed_count();
    Ok(CompletionPlan {
        day_id: day.id,
        item_id: exercise_id,
        completes_day: remaining == 1,
    })
}

/// Decide whether a meal may be confirmed today, and what to write
pub fn plan_meal_confirmation(
    day: &DietPlanDay,
    meal_id: Uuid,
    today: Today,
) -> Result<CompletionPlan, CompletionRejected> {
    let meal = day.meal(meal_id).ok_or(CompletionRejected::UnknownItem(meal_id))?;
    ensure_completable(day, today)?;
    if meal.confirmed {
        return Err(CompletionRejected::AlreadyCompleted(meal_id));
    }

    let remaining = day.meals.len() - day.confirmed_count();
    Ok(CompletionPlan {
        day_id: day.id,
        item_id: meal_id,
        completes_day: remaining == 1,
    })
}

/// The plan day (if any) whose occurrence is today
pub fn day_for_today<D: ScheduledDay>(days: &[D], today: Today) -> Option<&D> {
    days.iter().find(|d| d.is_scheduled_for(today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, Meal};
    use crate::progress::workout_completion_percent;
    use crate::weekday::offset_from_hours;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exercise(name: &str, order_index: i32, completed: bool) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sets: 3,
            reps: "10-12".to_string(),
            rest: "60s".to_string(),
            note: None,
            video_url: None,
            order_index,
            completed,
        }
    }

    fn workout_day(day: DayKey, exercises: Vec<Exercise>) -> WorkoutPlanDay {
        WorkoutPlanDay {
            id: Uuid::new_v4(),
            day,
            name: "Upper body".to_string(),
            objective: Some("Strength".to_string()),
            completed: false,
            generated_at: None,
            exercises,
        }
    }

    /// Write a permitted completion the way the repository does
    fn apply(day: &mut WorkoutPlanDay, plan: &CompletionPlan) {
        if let Some(exercise) = day.exercises.iter_mut().find(|e| e.id == plan.item_id) {
            exercise.completed = true;
        }
        if plan.completes_day {
            day.completed = true;
        }
    }

    // 2024-01-03 is a Wednesday
    fn wednesday() -> NaiveDate {
        date(2024, 1, 3)
    }

    fn on_wednesday() -> Today {
        Today::in_reference(wednesday())
    }

    #[test]
    fn test_first_occurrence_same_day() {
        assert_eq!(first_occurrence(wednesday(), DayKey::Wednesday), wednesday());
    }

    #[test]
    fn test_first_occurrence_later_in_week() {
        assert_eq!(first_occurrence(wednesday(), DayKey::Friday), date(2024, 1, 5));
    }

    #[test]
    fn test_first_occurrence_wraps_to_next_week() {
        assert_eq!(first_occurrence(wednesday(), DayKey::Monday), date(2024, 1, 8));
        assert_eq!(first_occurrence(wednesday(), DayKey::Tuesday), date(2024, 1, 9));
    }

    #[test]
    fn test_no_generation_date_uses_today() {
        assert_eq!(occurrence_date(None, DayKey::Wednesday, on_wednesday()), wednesday());
    }

    #[test]
    fn test_generation_date_is_read_in_reference_timezone() {
        // 02:00 UTC on Thursday is Wednesday at UTC-3
        let generated_at = Utc.with_ymd_and_hms(2024, 1, 4, 2, 0, 0).unwrap();
        let today = Today::in_reference(date(2024, 1, 10));
        assert_eq!(
            occurrence_date(Some(generated_at), DayKey::Wednesday, today),
            wednesday()
        );
    }

    #[test]
    fn test_day_generated_now_is_today_in_any_offset() {
        // 01:00 UTC Thursday: still Wednesday at UTC-3, already Thursday at UTC
        let generated_at = Utc.with_ymd_and_hms(2024, 1, 4, 1, 0, 0).unwrap();

        for hours in [-3, 0, 9] {
            let today = Today::at(generated_at, offset_from_hours(hours));
            let mut day = workout_day(today.key(), vec![exercise("Squat", 0, false)]);
            day.generated_at = Some(generated_at);

            assert_eq!(day.occurrence(today), today.date, "offset {}", hours);
            assert_eq!(classify(&day, today), DayStatus::Today, "offset {}", hours);
        }

        // The day before is next week's, not overdue
        let utc = Today::at(generated_at, offset_from_hours(0));
        let mut wednesday_day = workout_day(DayKey::Wednesday, vec![exercise("Row", 0, false)]);
        wednesday_day.generated_at = Some(generated_at);
        assert_eq!(wednesday_day.occurrence(utc), date(2024, 1, 10));
        assert_eq!(classify(&wednesday_day, utc), DayStatus::Upcoming);
    }

    #[test]
    fn test_rest_day_detection() {
        assert!(is_rest_day("Anything", None, 0));
        assert!(is_rest_day("Descanso", None, 3));
        assert!(is_rest_day("Sunday", Some("Recuperação ativa"), 2));
        assert!(is_rest_day("REST DAY", None, 1));
        assert!(is_rest_day("Day off", None, 1));
        assert!(is_rest_day("Saturday", Some("off-day stretching"), 1));
        assert!(!is_rest_day("Legs", Some("Hypertrophy"), 4));
    }

    #[test]
    fn test_off_alone_is_not_rest() {
        assert!(!is_rest_day("Kick-off circuit", None, 3));
        assert!(!is_rest_day("Push", Some("Take off the belt for the last set"), 2));
    }

    #[test]
    fn test_classification() {
        let today = on_wednesday();

        let today_day = workout_day(DayKey::Wednesday, vec![exercise("Squat", 0, false)]);
        assert_eq!(classify(&today_day, today), DayStatus::Today);

        let upcoming = workout_day(DayKey::Friday, vec![exercise("Row", 0, false)]);
        assert_eq!(classify(&upcoming, today), DayStatus::Upcoming);

        let rest = workout_day(DayKey::Thursday, vec![]);
        assert_eq!(classify(&rest, today), DayStatus::Rest);

        let mut done = workout_day(DayKey::Wednesday, vec![exercise("Press", 0, true)]);
        done.completed = true;
        assert_eq!(classify(&done, today), DayStatus::Completed);
    }

    #[test]
    fn test_overdue_when_generated_in_a_past_week() {
        // Plan generated on Monday 2024-01-01; Tuesday's occurrence is 2024-01-02
        let generated_at = Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap();
        let mut day = workout_day(DayKey::Tuesday, vec![exercise("Deadlift", 0, false)]);
        day.generated_at = Some(generated_at);

        assert_eq!(classify(&day, on_wednesday()), DayStatus::Overdue);
        assert_eq!(
            ensure_completable(&day, on_wednesday()),
            Err(CompletionRejected::NotScheduledToday {
                scheduled_for: date(2024, 1, 2)
            })
        );
    }

    #[test]
    fn test_completion_rejected_on_other_day() {
        let friday = workout_day(DayKey::Friday, vec![exercise("Row", 0, false)]);
        let id = friday.exercises[0].id;

        let result = plan_exercise_completion(&friday, id, on_wednesday());
        assert_eq!(
            result,
            Err(CompletionRejected::NotScheduledToday {
                scheduled_for: date(2024, 1, 5)
            })
        );
        assert!(!friday.exercises[0].completed);
    }

    #[test]
    fn test_completion_rejected_on_rest_day() {
        let mut rest = workout_day(DayKey::Wednesday, vec![exercise("Walk", 0, false)]);
        rest.name = "Descanso".to_string();
        let id = rest.exercises[0].id;

        assert_eq!(
            plan_exercise_completion(&rest, id, on_wednesday()),
            Err(CompletionRejected::RestDay)
        );
    }

    #[test]
    fn test_completion_plan_flags_last_item() {
        let day = workout_day(
            DayKey::Wednesday,
            vec![exercise("A", 0, true), exercise("B", 1, false)],
        );
        let plan = plan_exercise_completion(&day, day.exercises[1].id, on_wednesday()).unwrap();
        assert!(plan.completes_day);
        assert_eq!(plan.day_id, day.id);

        assert_eq!(
            plan_exercise_completion(&day, day.exercises[0].id, on_wednesday()),
            Err(CompletionRejected::AlreadyCompleted(day.exercises[0].id))
        );

        let stranger = Uuid::new_v4();
        assert_eq!(
            plan_exercise_completion(&day, stranger, on_wednesday()),
            Err(CompletionRejected::UnknownItem(stranger))
        );
    }

    #[test]
    fn test_wednesday_completion_sequence() {
        // No generation date: every day is placed in the current week
        let today = on_wednesday();
        let mut days = vec![
            workout_day(DayKey::Wednesday, vec![exercise("A", 0, false), exercise("B", 1, false)]),
            workout_day(DayKey::Friday, vec![exercise("C", 0, false)]),
        ];
        let (a, b) = (days[0].exercises[0].id, days[0].exercises[1].id);
        let c = days[1].exercises[0].id;

        assert_eq!(workout_completion_percent(day_for_today(&days, today)), 0);

        let plan = plan_exercise_completion(&days[0], a, today).unwrap();
        assert!(!plan.completes_day);
        apply(&mut days[0], &plan);
        assert_eq!(workout_completion_percent(day_for_today(&days, today)), 50);
        assert_eq!(classify(&days[0], today), DayStatus::Today);

        let plan = plan_exercise_completion(&days[0], b, today).unwrap();
        assert!(plan.completes_day);
        apply(&mut days[0], &plan);
        assert_eq!(workout_completion_percent(day_for_today(&days, today)), 100);
        assert_eq!(classify(&days[0], today), DayStatus::Completed);

        // Friday's exercise stays locked the same day
        assert_eq!(
            plan_exercise_completion(&days[1], c, today),
            Err(CompletionRejected::NotScheduledToday {
                scheduled_for: date(2024, 1, 5)
            })
        );
        assert!(!days[1].exercises[0].completed);
        assert_eq!(classify(&days[1], today), DayStatus::Upcoming);
    }

    #[test]
    fn test_meal_confirmation_guard() {
        let meal = Meal {
            id: Uuid::new_v4(),
            name: "Breakfast".to_string(),
            time: "07:30".to_string(),
            description: "Oats".to_string(),
            calories: 400,
            confirmed: false,
        };
        let day = DietPlanDay {
            id: Uuid::new_v4(),
            day: DayKey::Wednesday,
            generated_at: None,
            meals: vec![meal.clone()],
        };

        let plan = plan_meal_confirmation(&day, meal.id, on_wednesday()).unwrap();
        assert!(plan.completes_day);

        let thursday = Today::in_reference(date(2024, 1, 4));
        assert!(matches!(
            plan_meal_confirmation(&day, meal.id, thursday),
            Err(CompletionRejected::NotScheduledToday { .. })
        ));
    }

    #[test]
    fn test_day_for_today() {
        let days = vec![
            workout_day(DayKey::Monday, vec![exercise("A", 0, false)]),
            workout_day(DayKey::Wednesday, vec![exercise("B", 0, false)]),
        ];
        let found = day_for_today(&days, on_wednesday()).unwrap();
        assert_eq!(found.day, DayKey::Wednesday);
        assert!(day_for_today(&days, Today::in_reference(date(2024, 1, 4))).is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The first occurrence is on/after the base, on the target weekday, and the earliest such date
        #[test]
        fn prop_first_occurrence_is_earliest_match(
            offset in 0i64..3650,
            target_index in 0u8..7
        ) {
            let base = date(2020, 1, 1) + Duration::days(offset);
            let target = DayKey::from_index(target_index);
            let result = first_occurrence(base, target);

            prop_assert!(result >= base);
            prop_assert_eq!(DayKey::from_date(result), target);
            prop_assert!(result - base < Duration::days(7));

            let mut between = base;
            while between < result {
                prop_assert_ne!(DayKey::from_date(between), target);
                between += Duration::days(1);
            }
        }

        /// Without a generation date, today's own weekday resolves to today
        #[test]
        fn prop_today_resolves_to_today(offset in 0i64..3650, hours in -12i32..=14) {
            let today = Today::new(date(2020, 1, 1) + Duration::days(offset), offset_from_hours(hours));
            prop_assert_eq!(occurrence_date(None, today.key(), today), today.date);
        }
    }
}
