//! Deadline risk and overdue detection.
//!
//! A task is *at risk* when its remaining estimated work, scaled by the
//! historical bias coefficient, would finish after its deadline. Only tasks
//! with a precise (time-of-day) deadline that has not yet passed are
//! evaluated; once the deadline passes the task is *overdue* instead.
//!
//! The evaluator is stateless. Deduplicating repeated warnings for the same
//! task is left to whoever delivers them.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::bias::{BiasEstimate, BiasEstimator, BiasPolicy};
use crate::task::Task;

/// Default cap on simultaneous "start now" warnings.
pub const DEFAULT_MAX_WARNINGS: usize = 3;

/// True if the task is incomplete and its deadline has been reached.
///
/// Day-only deadlines are reached at the end of that day.
pub fn is_overdue<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    if task.completed {
        return false;
    }
    match task.due_instant_in(&now.timezone()) {
        Some(due) => *now >= due,
        None => false,
    }
}

/// Remaining estimated work at `now`, never negative.
pub fn remaining_work_ms<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> Option<u64> {
    let estimated = task.estimated_ms()?;
    Some(estimated.saturating_sub(task.actual_elapsed_ms(now)))
}

/// Deadline instant for a task that is eligible for risk evaluation.
fn risk_deadline<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    if task.completed || task.estimated_ms().is_none() {
        return None;
    }
    let due_date = task.due_date.as_ref().filter(|d| d.has_time())?;
    let due = due_date.instant_in(&now.timezone())?;
    (due > *now).then_some(due)
}

/// True if the bias-scaled remaining work would overrun the deadline.
pub fn is_at_risk<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>, bias: f64) -> bool {
    evaluate(task, now, bias).is_some()
}

fn evaluate<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>, bias: f64) -> Option<RiskWarning> {
    let due = risk_deadline(task, now)?;
    let remaining = remaining_work_ms(task, now)?;
    let projected_ms = remaining as f64 * bias;

    // NaN bias never overruns.
    let overruns = now.timestamp_millis() as f64 + projected_ms > due.timestamp_millis() as f64;
    if !overruns {
        return None;
    }

    let projected_finish = Duration::try_milliseconds(projected_ms.round() as i64)
        .and_then(|d| now.with_timezone(&Utc).checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Some(RiskWarning {
        task_id: task.id.clone(),
        title: task.title.clone(),
        due_at: due.with_timezone(&Utc),
        remaining_work_ms: remaining,
        projected_finish,
    })
}

/// A task that should be started now to make its deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWarning {
    pub task_id: String,
    pub title: String,
    pub due_at: DateTime<Utc>,
    pub remaining_work_ms: u64,
    /// `now` plus bias-scaled remaining work, saturating at the latest
    /// representable instant
    pub projected_finish: DateTime<Utc>,
}

/// At-risk tasks in collection order, at most `max_warnings` of them.
pub fn at_risk_tasks<Tz: TimeZone>(
    tasks: &[Task],
    now: &DateTime<Tz>,
    bias: f64,
    max_warnings: usize,
) -> Vec<RiskWarning> {
    tasks
        .iter()
        .filter_map(|t| evaluate(t, now, bias))
        .take(max_warnings)
        .collect()
}

/// Bias policy plus warning cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub bias: BiasPolicy,
    pub max_warnings: usize,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            bias: BiasPolicy::default(),
            max_warnings: DEFAULT_MAX_WARNINGS,
        }
    }
}

/// Everything a notifier needs from one evaluation pass.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub bias: BiasEstimate,
    pub warnings: Vec<RiskWarning>,
    /// Ids of incomplete tasks whose deadline has passed
    pub overdue: Vec<String>,
}

/// Runs bias estimation and risk evaluation over a snapshot.
#[derive(Debug, Clone, Default)]
pub struct RiskEvaluator {
    pub policy: RiskPolicy,
}

impl RiskEvaluator {
    pub fn new(policy: RiskPolicy) -> Self {
        Self { policy }
    }

    pub fn evaluate<Tz: TimeZone>(&self, tasks: &[Task], now: &DateTime<Tz>) -> RiskReport {
        let bias = BiasEstimator::with_policy(self.policy.bias).estimate(tasks, now);
        let warnings = at_risk_tasks(tasks, now, bias.coefficient, self.policy.max_warnings);
        let overdue: Vec<String> = tasks
            .iter()
            .filter(|t| is_overdue(t, now))
            .map(|t| t.id.clone())
            .collect();

        tracing::debug!(
            coefficient = bias.coefficient,
            warnings = warnings.len(),
            overdue = overdue.len(),
            "risk evaluation"
        );

        RiskReport {
            bias,
            warnings,
            overdue,
        }
    }
}
