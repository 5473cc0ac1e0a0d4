//! Canonical weekday keys
//!
//! Recurring plan days are stored against a lowercase, unaccented weekday
//! key. Every comparison between "today" and a stored plan day goes through
//! [`DayKey`], so locale, casing and diacritic drift cannot produce silent
//! mismatches.
//!
//! "Today" is always evaluated in a fixed reference timezone (UTC-3) so day
//! boundaries do not move with the host's local timezone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset of the reference timezone in hours (UTC-3)
pub const REFERENCE_UTC_OFFSET_HOURS: i32 = -3;

/// Matches the Portuguese "-feira" suffix ("segunda-feira", "terça feira")
static FEIRA_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]*feira$").unwrap());

/// One of the 7 canonical weekday keys (0 = Sunday … 6 = Saturday)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayKey {
    /// All keys in index order, starting on Sunday
    pub const ALL: [DayKey; 7] = [
        DayKey::Sunday,
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
    ];

    /// Stored key
    pub fn as_str(&self) -> &'static str {
        match self {
            DayKey::Sunday => "sunday",
            DayKey::Monday => "monday",
            DayKey::Tuesday => "tuesday",
            DayKey::Wednesday => "wednesday",
            DayKey::Thursday => "thursday",
            DayKey::Friday => "friday",
            DayKey::Saturday => "saturday",
        }
    }

    /// Index with Sunday = 0
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Key for an index, wrapping modulo 7
    pub fn from_index(index: u8) -> DayKey {
        Self::ALL[(index % 7) as usize]
    }

    /// Weekday of a calendar date
    pub fn from_date(date: NaiveDate) -> DayKey {
        date.weekday().into()
    }

    /// Weekday of "now" in the reference timezone
    pub fn today() -> DayKey {
        Self::from_date(local_today(Utc::now()))
    }

    /// Normalize a locale-specific weekday name into a canonical key.
    ///
    /// Accepts English and Portuguese names in any casing, with or without
    /// diacritics and the "-feira" suffix, plus three letter abbreviations.
    /// Returns `None` for anything that is not a weekday name.
    pub fn normalize(raw: &str) -> Option<DayKey> {
        let folded = fold_diacritics(raw.trim()).to_lowercase();
        let stripped = FEIRA_SUFFIX.replace(&folded, "");

        let key = match stripped.trim() {
            "sunday" | "sun" | "domingo" | "dom" => DayKey::Sunday,
            "monday" | "mon" | "segunda" | "seg" => DayKey::Monday,
            "tuesday" | "tue" | "tues" | "terca" | "ter" => DayKey::Tuesday,
            "wednesday" | "wed" | "quarta" | "qua" => DayKey::Wednesday,
            "thursday" | "thu" | "thur" | "thurs" | "quinta" | "qui" => DayKey::Thursday,
            "friday" | "fri" | "sexta" | "sex" => DayKey::Friday,
            "saturday" | "sat" | "sabado" | "sab" => DayKey::Saturday,
            _ => return None,
        };

        Some(key)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = UnknownDayKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayKey::normalize(s).ok_or_else(|| UnknownDayKey(s.to_string()))
    }
}

impl From<Weekday> for DayKey {
    fn from(weekday: Weekday) -> Self {
        DayKey::from_index(weekday.num_days_from_sunday() as u8)
    }
}

impl From<DayKey> for Weekday {
    fn from(key: DayKey) -> Self {
        match key {
            DayKey::Sunday => Weekday::Sun,
            DayKey::Monday => Weekday::Mon,
            DayKey::Tuesday => Weekday::Tue,
            DayKey::Wednesday => Weekday::Wed,
            DayKey::Thursday => Weekday::Thu,
            DayKey::Friday => Weekday::Fri,
            DayKey::Saturday => Weekday::Sat,
        }
    }
}

/// Error returned when a string does not name a weekday
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown weekday: {0}")]
pub struct UnknownDayKey(pub String);

/// The reference timezone (UTC-3)
pub fn reference_offset() -> FixedOffset {
    offset_from_hours(REFERENCE_UTC_OFFSET_HOURS)
}

/// Build a fixed offset from whole hours, falling back to UTC when out of range
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Today's date together with the timezone it was read in
///
/// Plan generation timestamps are converted with the same offset, so a day
/// generated "now" is scheduled for today whatever the offset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
    pub date: NaiveDate,
    pub offset: FixedOffset,
}

impl Today {
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        Self { date, offset }
    }

    /// Date of `now` in `offset`
    pub fn at(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::new(local_date_in(now, offset), offset)
    }

    /// A date in the reference timezone
    pub fn in_reference(date: NaiveDate) -> Self {
        Self::new(date, reference_offset())
    }

    /// Calendar date of another instant in the same timezone
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        local_date_in(instant, self.offset)
    }

    pub fn key(&self) -> DayKey {
        DayKey::from_date(self.date)
    }
}

/// Calendar date of an instant in the reference timezone
pub fn local_today(now: DateTime<Utc>) -> NaiveDate {
    local_date_in(now, reference_offset())
}

/// Calendar date of an instant in the given timezone
pub fn local_date_in(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Replace accented Latin letters with their unaccented base letter
fn fold_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Lowercase, diacritic-free form of free text, used for keyword matching
pub fn fold_text(input: &str) -> String {
    fold_diacritics(input).to_lowercase()
}
