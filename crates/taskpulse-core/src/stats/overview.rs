//! All-time completion overview and estimation insights.
//!
//! Looks only at banked time: a finished task's running session (if any)
//! is not counted here.

use chrono::{TimeZone, Utc};
use serde::Serialize;

use super::bias::clamp;
use crate::task::Task;

const RATIO_MIN: f64 = 0.1;
const RATIO_MAX: f64 = 5.0;
const MULTIPLIER_MIN: f64 = 1.0;
const MULTIPLIER_MAX: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// All completed tasks
    pub completed: usize,
    /// Estimated, completed, dated tasks finished by their deadline
    pub on_time: usize,
    /// Estimated, completed, dated tasks finished after their deadline
    pub missed: usize,
    /// `on_time / (on_time + missed)`; 1.0 with no dated completions
    pub on_time_rate: f64,
    /// Mean clamped actual/estimated ratio; 1.0 with no samples
    pub bias: f64,
    /// `bias` clamped to a realistic planning multiplier
    pub multiplier: f64,
    pub avg_overrun_minutes: f64,
    pub avg_underrun_minutes: f64,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Overview of `tasks`, resolving day-only deadlines in `tz`.
pub fn overview<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> Overview {
    let completed: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();

    let mut on_time = 0;
    let mut missed = 0;
    let mut ratios = Vec::new();
    let mut overruns = Vec::new();
    let mut underruns = Vec::new();

    for task in completed.iter().filter(|t| t.estimated_ms().is_some()) {
        if let (Some(due), Some(done)) = (task.due_instant_in(tz), task.completed_at) {
            if done > due.with_timezone(&Utc) {
                missed += 1;
            } else {
                on_time += 1;
            }
        }

        let estimated_min = f64::from(task.estimated_minutes.unwrap_or(0));
        let actual_min = task.tracking.accumulated_ms as f64 / 60_000.0;
        ratios.push(clamp(actual_min / estimated_min, RATIO_MIN, RATIO_MAX));

        let diff = actual_min - estimated_min;
        if diff > 0.0 {
            overruns.push(diff);
        } else {
            underruns.push(-diff);
        }
    }

    let bias = mean(&ratios).unwrap_or(1.0);
    let on_time_rate = if on_time + missed > 0 {
        on_time as f64 / (on_time + missed) as f64
    } else {
        1.0
    };

    Overview {
        completed: completed.len(),
        on_time,
        missed,
        on_time_rate,
        bias,
        multiplier: clamp(bias, MULTIPLIER_MIN, MULTIPLIER_MAX),
        avg_overrun_minutes: mean(&overruns).unwrap_or(0.0),
        avg_underrun_minutes: mean(&underruns).unwrap_or(0.0),
    }
}
