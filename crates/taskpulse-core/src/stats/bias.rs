//! Estimation bias coefficient.
//!
//! Derives a multiplier from how long finished tasks actually took compared
//! to their estimates. Each task's actual/estimated ratio is clamped before
//! averaging so one runaway task cannot dominate, and the average itself is
//! clamped to a sane range.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Clamp ranges and fallback for the bias coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasPolicy {
    /// Lower clamp for a single task's actual/estimated ratio
    pub ratio_min: f64,
    /// Upper clamp for a single task's actual/estimated ratio
    pub ratio_max: f64,
    /// Lower clamp for the averaged coefficient
    pub coefficient_min: f64,
    /// Upper clamp for the averaged coefficient
    pub coefficient_max: f64,
    /// Returned when no finished task qualifies (assumes mild underestimation)
    pub default_coefficient: f64,
}

impl BiasPolicy {
    pub const fn new() -> Self {
        Self {
            ratio_min: 0.5,
            ratio_max: 3.0,
            coefficient_min: 1.0,
            coefficient_max: 2.5,
            default_coefficient: 1.2,
        }
    }
}

impl Default for BiasPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp that tolerates an inverted range instead of panicking.
pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Result of a bias estimation, with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiasEstimate {
    /// Coefficient to scale remaining work by
    pub coefficient: f64,
    /// Number of finished tasks that contributed a ratio
    pub sample_count: usize,
    /// Mean of the clamped ratios before the final clamp
    pub mean_ratio: Option<f64>,
}

/// Computes the bias coefficient from a task snapshot.
#[derive(Debug, Clone, Default)]
pub struct BiasEstimator {
    pub policy: BiasPolicy,
}

impl BiasEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: BiasPolicy) -> Self {
        Self { policy }
    }

    /// Clamped actual/estimated ratios of every qualifying task.
    ///
    /// A task qualifies when it is completed, has a positive estimate, and
    /// has any recorded time.
    pub fn ratios<Tz: TimeZone>(&self, tasks: &[Task], now: &DateTime<Tz>) -> Vec<f64> {
        tasks
            .iter()
            .filter(|t| t.completed && t.tracking.has_recorded_time())
            .filter_map(|t| {
                let estimated = t.estimated_ms()? as f64;
                let actual = t.actual_elapsed_ms(now) as f64;
                Some(clamp(
                    actual / estimated,
                    self.policy.ratio_min,
                    self.policy.ratio_max,
                ))
            })
            .collect()
    }

    pub fn estimate<Tz: TimeZone>(&self, tasks: &[Task], now: &DateTime<Tz>) -> BiasEstimate {
        let ratios = self.ratios(tasks, now);
        if ratios.is_empty() {
            tracing::debug!("no finished tasks with recorded time; using default bias");
            return BiasEstimate {
                coefficient: self.policy.default_coefficient,
                sample_count: 0,
                mean_ratio: None,
            };
        }

        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        BiasEstimate {
            coefficient: clamp(mean, self.policy.coefficient_min, self.policy.coefficient_max),
            sample_count: ratios.len(),
            mean_ratio: Some(mean),
        }
    }
}

/// Bias coefficient in `[1.0, 2.5]` under the default policy.
pub fn estimate_bias<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> f64 {
    BiasEstimator::new().estimate(tasks, now).coefficient
}
