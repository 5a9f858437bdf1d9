//! Trailing seven-day performance buckets.
//!
//! Each local calendar day in the window counts two independent kinds of
//! event:
//! - completions on that day, split into on-time and late against the
//!   task's deadline (no deadline counts as on-time);
//! - deadlines on that day that have passed while the task is still open
//!   (overdue).
//!
//! A task can therefore show up twice: once on the day it was completed and
//! once on the day it fell due.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::Task;

pub const WINDOW_DAYS: usize = 7;

/// Per-classification counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub on_time: u32,
    pub late: u32,
    pub overdue: u32,
}

impl Bucket {
    pub fn total(&self) -> u32 {
        self.on_time + self.late + self.overdue
    }

    fn add(&mut self, other: &Bucket) {
        self.on_time += other.on_time;
        self.late += other.late;
        self.overdue += other.overdue;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Bucket,
}

/// Seven days of buckets, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub days: [DayBucket; WINDOW_DAYS],
    pub totals: Bucket,
    /// Largest single-day total, at least 1, for scaling chart bars
    pub max: u32,
}

impl WeeklyReport {
    pub fn first_day(&self) -> NaiveDate {
        self.days[0].date
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days[WINDOW_DAYS - 1].date
    }
}

/// Bucket every task into the seven local days ending on `now`'s date.
pub fn aggregate_week<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> WeeklyReport {
    let tz = now.timezone();
    let today = now.date_naive();
    let first = today - Duration::days(WINDOW_DAYS as i64 - 1);

    let mut days: [DayBucket; WINDOW_DAYS] = std::array::from_fn(|i| DayBucket {
        date: first + Duration::days(i as i64),
        counts: Bucket::default(),
    });
    let slot = |date: NaiveDate| -> Option<usize> {
        let offset = (date - first).num_days();
        usize::try_from(offset).ok().filter(|i| *i < WINDOW_DAYS)
    };

    for task in tasks {
        let due = task.due_instant_in(&tz);

        if let Some(completed_at) = task.completed_at {
            let completed_local = completed_at.with_timezone(&tz);
            if let Some(i) = slot(completed_local.date_naive()) {
                match &due {
                    Some(due) if completed_local > *due => days[i].counts.late += 1,
                    _ => days[i].counts.on_time += 1,
                }
            }
        }

        if !task.completed {
            if let Some(due) = &due {
                if *now > *due {
                    if let Some(i) = slot(due.date_naive()) {
                        days[i].counts.overdue += 1;
                    }
                }
            }
        }
    }

    let mut totals = Bucket::default();
    for day in &days {
        totals.add(&day.counts);
    }
    let max = days.iter().map(|d| d.counts.total()).max().unwrap_or(0).max(1);

    WeeklyReport { days, totals, max }
}
