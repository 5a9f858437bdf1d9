//! Due dates.
//!
//! A due date is either a calendar day or a precise wall-clock time. Day-only
//! deadlines fall due at the last millisecond of that day in the local zone;
//! only precise deadlines take part in risk evaluation.
//!
//! Accepted string forms:
//! - `2026-03-02` (day)
//! - `2026-03-02T17:30` or `2026-03-02T17:30:15` (local wall-clock time)
//! - `2026-03-02T17:30:00+02:00` / `...Z` (instant with explicit offset)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::clock::resolve_local;
use crate::error::ValidationError;

const DAY_FORMAT: &str = "%Y-%m-%d";
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DueDate {
    /// Due by the end of the given local day.
    Day(NaiveDate),
    /// Due at a local wall-clock time.
    At(NaiveDateTime),
    /// Due at an instant carrying its own offset.
    Exact(DateTime<FixedOffset>),
}

impl DueDate {
    /// True if the deadline names a time of day, not just a date.
    pub fn has_time(&self) -> bool {
        !matches!(self, DueDate::Day(_))
    }

    /// The deadline as an instant in `tz`.
    ///
    /// `None` when the wall-clock time does not exist in `tz` (DST gap).
    pub fn instant_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        match self {
            DueDate::Day(day) => resolve_local(tz, &day.and_time(end_of_day())),
            DueDate::At(at) => resolve_local(tz, at),
            DueDate::Exact(at) => Some(at.with_timezone(tz)),
        }
    }

    /// The calendar day this deadline falls on, as seen from `tz`.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        match self {
            DueDate::Day(day) => *day,
            DueDate::At(at) => at.date(),
            DueDate::Exact(at) => at.with_timezone(tz).date_naive(),
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default()
}

impl FromStr for DueDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains('T') {
            return NaiveDate::parse_from_str(s, DAY_FORMAT)
                .map(DueDate::Day)
                .map_err(|_| ValidationError::InvalidDueDate(s.to_string()));
        }
        if let Ok(exact) = DateTime::parse_from_rfc3339(s) {
            return Ok(DueDate::Exact(exact));
        }
        LOCAL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(DueDate::At)
            .ok_or_else(|| ValidationError::InvalidDueDate(s.to_string()))
    }
}

impl TryFrom<String> for DueDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DueDate> for String {
    fn from(due: DueDate) -> Self {
        due.to_string()
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Day(day) => write!(f, "{}", day.format(DAY_FORMAT)),
            DueDate::At(at) if at.second() == 0 && at.nanosecond() == 0 => {
                write!(f, "{}", at.format("%Y-%m-%dT%H:%M"))
            }
            DueDate::At(at) => write!(f, "{}", at.format("%Y-%m-%dT%H:%M:%S")),
            DueDate::Exact(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    #[test]
    fn parses_day() {
        let due: DueDate = "2026-03-02".parse().unwrap();
        assert_eq!(due, DueDate::Day(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
        assert!(!due.has_time());
    }

    #[test]
    fn parses_local_minutes_and_seconds() {
        let due: DueDate = "2026-03-02T17:30".parse().unwrap();
        assert!(due.has_time());
        assert_eq!(due.to_string(), "2026-03-02T17:30");

        let due: DueDate = "2026-03-02T17:30:15".parse().unwrap();
        assert_eq!(due.to_string(), "2026-03-02T17:30:15");
    }

    #[test]
    fn parses_offset_instant() {
        let due: DueDate = "2026-03-02T17:30:00Z".parse().unwrap();
        assert!(matches!(due, DueDate::Exact(_)));
        assert_eq!(
            due.instant_in(&Utc).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            "next tuesday".parse::<DueDate>(),
            Err(ValidationError::InvalidDueDate("next tuesday".to_string()))
        );
        assert!("2026-13-40".parse::<DueDate>().is_err());
        assert!("2026-03-02T25:00".parse::<DueDate>().is_err());
    }

    #[test]
    fn day_falls_due_at_last_millisecond() {
        let due: DueDate = "2026-03-02".parse().unwrap();
        let instant = due.instant_in(&Utc).unwrap();
        assert_eq!(instant.day(), 2);
        assert_eq!(instant.hour(), 23);
        assert_eq!(instant.minute(), 59);
        assert_eq!(instant.second(), 59);
        assert_eq!(instant.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn date_in_follows_zone_for_exact() {
        let due: DueDate = "2026-03-02T23:30:00Z".parse().unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(due.date_in(&tokyo), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
    }

    #[test]
    fn serde_round_trips_string_form() {
        let json = serde_json::to_string(&"2026-03-02T08:05".parse::<DueDate>().unwrap()).unwrap();
        assert_eq!(json, "\"2026-03-02T08:05\"");
        let back: DueDate = serde_json::from_str(&json).unwrap();
        assert!(back.has_time());
        assert!(serde_json::from_str::<DueDate>("\"soon\"").is_err());
    }
}
