//! Analytics over a task snapshot.
//!
//! - [`bias`]: estimation bias coefficient from finished tasks
//! - [`risk`]: at-risk and overdue detection
//! - [`weekly`]: trailing seven-day on-time/late/overdue buckets
//! - [`score`]: weekly score and tier
//! - [`overview`]: all-time completion and estimation insights
//!
//! Everything here is a pure function of the snapshot and `now`.

mod bias;
mod overview;
mod risk;
mod score;
mod weekly;

pub use bias::{estimate_bias, BiasEstimate, BiasEstimator, BiasPolicy};

pub use overview::{overview, Overview};

pub use risk::{
    at_risk_tasks, is_at_risk, is_overdue, remaining_work_ms, RiskEvaluator, RiskPolicy,
    RiskReport, RiskWarning, DEFAULT_MAX_WARNINGS,
};

pub use score::{score, ScoreTier, WeeklyScore};

pub use weekly::{aggregate_week, Bucket, DayBucket, WeeklyReport, WINDOW_DAYS};
