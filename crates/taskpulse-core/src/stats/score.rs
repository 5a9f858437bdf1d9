//! Weekly score: +3 on-time, +1 late, -2 overdue, as a percentage of the
//! on-time ceiling.
//!
//! The ceiling only counts completed tasks. Overdue tasks pull points down
//! without raising it, so a week of nothing but overdue tasks falls back to
//! a ceiling of 1 and scores 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bias::clamp;
use super::weekly::Bucket;

const ON_TIME_POINTS: i64 = 3;
const LATE_POINTS: i64 = 1;
const OVERDUE_PENALTY: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    S,
    A,
    B,
    C,
}

impl ScoreTier {
    /// Tier for a 0..=100 score; lower bounds are inclusive.
    pub fn for_value(value: u8) -> Self {
        match value {
            90.. => ScoreTier::S,
            75.. => ScoreTier::A,
            60.. => ScoreTier::B,
            _ => ScoreTier::C,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::S => "Excellent",
            ScoreTier::A => "Very Good",
            ScoreTier::B => "Good",
            ScoreTier::C => "Keep Going",
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ScoreTier::S => "s",
            ScoreTier::A => "a",
            ScoreTier::B => "b",
            ScoreTier::C => "c",
        };
        write!(f, "{code}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyScore {
    /// 0..=100
    pub value: u8,
    pub tier: ScoreTier,
    pub label: &'static str,
    pub points: i64,
    pub max_possible: i64,
}

pub fn score(totals: &Bucket) -> WeeklyScore {
    let points = i64::from(totals.on_time) * ON_TIME_POINTS + i64::from(totals.late) * LATE_POINTS
        - i64::from(totals.overdue) * OVERDUE_PENALTY;
    let max_possible = ((i64::from(totals.on_time) + i64::from(totals.late)) * ON_TIME_POINTS).max(1);

    let pct = points as f64 / max_possible as f64 * 100.0;
    let value = clamp(pct, 0.0, 100.0).round() as u8;
    let tier = ScoreTier::for_value(value);

    WeeklyScore {
        value,
        tier,
        label: tier.label(),
        points,
        max_possible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(on_time: u32, late: u32, overdue: u32) -> Bucket {
        Bucket { on_time, late, overdue }
    }

    #[test]
    fn perfect_week() {
        let s = score(&bucket(10, 0, 0));
        assert_eq!(s.points, 30);
        assert_eq!(s.max_possible, 30);
        assert_eq!(s.value, 100);
        assert_eq!(s.tier, ScoreTier::S);
        assert_eq!(s.label, "Excellent");
    }

    #[test]
    fn only_overdue_floors_at_zero() {
        let s = score(&bucket(0, 0, 5));
        assert_eq!(s.max_possible, 1);
        assert_eq!(s.points, -10);
        assert_eq!(s.value, 0);
        assert_eq!(s.tier, ScoreTier::C);
        assert_eq!(s.label, "Keep Going");
    }

    #[test]
    fn empty_week_scores_zero() {
        let s = score(&Bucket::default());
        assert_eq!(s.value, 0);
        assert_eq!(s.tier, ScoreTier::C);
    }

    #[test]
    fn all_late_is_a_third() {
        // 4 / 12 = 33.3%
        let s = score(&bucket(0, 4, 0));
        assert_eq!(s.value, 33);
        assert_eq!(s.tier, ScoreTier::C);
    }

    #[test]
    fn mixed_week_rounds() {
        // (8*3 + 2 - 2) / 30 = 80%
        let s = score(&bucket(8, 2, 1));
        assert_eq!(s.value, 80);
        assert_eq!(s.tier, ScoreTier::A);
        assert_eq!(s.label, "Very Good");
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(ScoreTier::for_value(100), ScoreTier::S);
        assert_eq!(ScoreTier::for_value(90), ScoreTier::S);
        assert_eq!(ScoreTier::for_value(89), ScoreTier::A);
        assert_eq!(ScoreTier::for_value(75), ScoreTier::A);
        assert_eq!(ScoreTier::for_value(74), ScoreTier::B);
        assert_eq!(ScoreTier::for_value(60), ScoreTier::B);
        assert_eq!(ScoreTier::for_value(59), ScoreTier::C);
        assert_eq!(ScoreTier::for_value(0), ScoreTier::C);
    }

    #[test]
    fn tier_serializes_as_code() {
        let json = serde_json::to_value(score(&bucket(10, 0, 0))).unwrap();
        assert_eq!(json["tier"], "s");
        assert_eq!(json["value"], 100);
        assert_eq!(ScoreTier::B.to_string(), "b");
    }
}
