//! Injectable wall clock.
//!
//! Every computation in this crate takes `now` as an argument instead of
//! reading the system time itself. Callers obtain `now` from a [`Clock`]:
//! [`SystemClock`] in production, [`FixedClock`] in tests.
//!
//! The clock's time zone doubles as the "local" zone used to resolve
//! date-only deadlines and calendar-day windows.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};

/// Source of the current instant.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// The device's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a given instant until moved explicitly.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    /// Move the clock forward (or backward, for a negative delta).
    pub fn advance(&mut self, delta: Duration) {
        self.now = self.now.clone() + delta;
    }
}

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now.clone()
    }
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fold) resolve to the earlier instant; times that do
/// not exist (DST gap) yield `None`.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(naive).earliest()
}
