//! # Taskpulse Core Library
//!
//! Time tracking and deadline-risk analytics for a personal task list.
//! Every operation is available via the standalone `taskpulse` CLI, which is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a per-task stopwatch. Banked milliseconds plus an optional
//!   running session; elapsed time is always derived, never ticked
//! - **Tasks**: snapshot records transformed by [`TaskAction`]s
//! - **Stats**: bias estimation, risk warnings, weekly buckets and score,
//!   all pure functions of a snapshot and `now`
//! - **Storage**: a JSON snapshot in a key-value [`BlobStore`] and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`Task`]: the task record and its transitions
//! - [`RiskEvaluator`]: bias-adjusted at-risk warnings
//! - [`aggregate_week`] / [`score`]: the weekly performance view
//! - [`Repository`]: snapshot persistence
//! - [`Clock`]: injectable source of `now`

pub mod clock;
pub mod error;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use stats::{
    aggregate_week, at_risk_tasks, estimate_bias, is_at_risk, is_overdue, overview, score,
    BiasEstimate, BiasEstimator, BiasPolicy, Bucket, DayBucket, Overview, RiskEvaluator,
    RiskPolicy, RiskReport, RiskWarning, ScoreTier, WeeklyReport, WeeklyScore,
};
pub use storage::{AppData, BlobStore, Config, FileStore, MemoryStore, Repository};
pub use task::query::{Inbox, SortOrder};
pub use task::{DueDate, Label, Priority, Project, Task, TaskAction, TaskEdit};
pub use timer::{TimeTracking, TimerState};
