//! Task records and their snapshot transitions.
//!
//! A [`Task`] is never mutated in place by the analytics code. User actions
//! are expressed as [`TaskAction`]s and applied with [`Task::apply`], which
//! returns the next version of the record.
//!
//! Timer transitions follow [`TimeTracking`]; completion toggling
//! force-pauses a running timer so the in-flight session is banked before
//! the task is marked done:
//!
//! ```text
//!             start                      toggle
//!   Idle ─────────────> Running ─────────────────> Idle + completed
//!    ^                     |                            |
//!    +------- pause -------+                            |
//!    ^                                                  |
//!    +-------------- toggle (completedAt cleared) ------+
//! ```

pub mod due;
pub mod query;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use due::DueDate;

use crate::error::ValidationError;
use crate::timer::TimeTracking;

/// Urgency from 1 (most urgent) to 4 (least).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const URGENT: Priority = Priority(1);
    pub const HIGH: Priority = Priority(2);
    pub const MEDIUM: Priority = Priority(3);
    pub const LOW: Priority = Priority(4);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        Self::try_from(i64::from(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::LOW
    }
}

impl TryFrom<i64> for Priority {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1..=4 => Ok(Priority(value as u8)),
            _ => Err(ValidationError::InvalidPriority(value)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A unit of work with an optional deadline and estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` means the task lives in the inbox.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DueDate>,
    #[serde(
        default,
        deserialize_with = "lenient_estimate",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_minutes: Option<u32>,
    #[serde(flatten)]
    pub tracking: TimeTracking,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Malformed due dates in stored data are dropped rather than failing the
/// whole collection.
fn lenient_due_date<'de, D>(deserializer: D) -> Result<Option<DueDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse::<DueDate>() {
        Ok(due) => Some(due),
        Err(e) => {
            tracing::warn!("dropping unreadable due date: {e}");
            None
        }
    }))
}

/// Fractional estimates round to the nearest minute. Negative, non-finite
/// and non-numeric estimates are dropped.
fn lenient_estimate<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let minutes = match raw {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    Ok(match minutes {
        Some(m) if m.is_finite() && m >= 0.0 && m.round() <= f64::from(u32::MAX) => {
            Some(m.round() as u32)
        }
        other => {
            tracing::warn!(?other, "dropping unusable estimate");
            None
        }
    })
}

impl Task {
    /// Create a new, idle, incomplete task.
    pub fn new<Tz: TimeZone>(title: impl Into<String>, now: &DateTime<Tz>) -> Self {
        let now = now.with_timezone(&Utc);
        Task {
            id: format!("task-{}-{}", now.timestamp(), uuid::Uuid::new_v4().simple()),
            title: title.into(),
            description: None,
            project_id: None,
            label_ids: Vec::new(),
            due_date: None,
            estimated_minutes: None,
            tracking: TimeTracking::default(),
            completed_at: None,
            priority: Priority::default(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Estimate in milliseconds, if one is set and positive.
    pub fn estimated_ms(&self) -> Option<u64> {
        self.estimated_minutes
            .filter(|m| *m > 0)
            .map(|m| u64::from(m) * 60_000)
    }

    /// Actual elapsed work time at `now`.
    pub fn actual_elapsed_ms<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        self.tracking.elapsed_ms(now)
    }

    /// Due instant resolved in `tz`; day-only deadlines resolve to the end
    /// of that day.
    pub fn due_instant_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        self.due_date.as_ref().and_then(|d| d.instant_in(tz))
    }

    /// Apply a user action, producing the next version of the task.
    #[must_use]
    pub fn apply<Tz: TimeZone>(&self, action: TaskAction, now: &DateTime<Tz>) -> Task {
        let mut next = self.clone();
        match action {
            TaskAction::StartTimer => {
                if self.tracking.is_running() {
                    return next;
                }
                next.tracking = self.tracking.start(now);
            }
            TaskAction::PauseTimer => {
                if !self.tracking.is_running() {
                    return next;
                }
                next.tracking = self.tracking.pause(now);
            }
            TaskAction::ToggleComplete => {
                next.tracking = self.tracking.pause(now);
                next.completed = !self.completed;
                next.completed_at = next.completed.then(|| now.with_timezone(&Utc));
            }
            TaskAction::AddEstimate { minutes } => {
                next.estimated_minutes =
                    Some(self.estimated_minutes.unwrap_or(0).saturating_add(minutes));
            }
        }
        next.updated_at = now.with_timezone(&Utc);
        next
    }

    /// Apply field edits, leaving timer state and completion untouched.
    ///
    /// # Errors
    /// [`ValidationError::InvalidValue`] if the new title is blank.
    pub fn edit<Tz: TimeZone>(
        &self,
        edit: &TaskEdit,
        now: &DateTime<Tz>,
    ) -> Result<Task, ValidationError> {
        let mut next = self.clone();
        if let Some(title) = &edit.title {
            if title.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "title".to_string(),
                    message: "must not be blank".to_string(),
                });
            }
            next.title = title.clone();
        }
        if let Some(description) = &edit.description {
            next.description = description.clone();
        }
        if let Some(due_date) = edit.due_date {
            next.due_date = due_date;
        }
        if let Some(estimated_minutes) = edit.estimated_minutes {
            next.estimated_minutes = estimated_minutes;
        }
        if let Some(priority) = edit.priority {
            next.priority = priority;
        }
        if let Some(project_id) = &edit.project_id {
            next.project_id = project_id.clone();
        }
        if let Some(label_ids) = &edit.label_ids {
            next.label_ids = label_ids.clone();
        }
        next.updated_at = now.with_timezone(&Utc);
        Ok(next)
    }
}

/// Field changes for [`Task::edit`].
///
/// `None` leaves a field alone. For optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<DueDate>>,
    pub estimated_minutes: Option<Option<u32>>,
    pub priority: Option<Priority>,
    pub project_id: Option<Option<String>>,
    pub label_ids: Option<Vec<String>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        *self == TaskEdit::default()
    }
}

/// A user-facing operation on a single task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Begin a work session: Idle -> Running
    StartTimer,
    /// Bank the running session: Running -> Idle
    PauseTimer,
    /// Flip completion, banking any running session first
    ToggleComplete,
    /// Re-estimate upward; does not log time
    AddEstimate { minutes: u32 },
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::StartTimer => write!(f, "start"),
            TaskAction::PauseTimer => write!(f, "pause"),
            TaskAction::ToggleComplete => write!(f, "toggle"),
            TaskAction::AddEstimate { minutes } => write!(f, "extend({}m)", minutes),
        }
    }
}

/// Colors handed to projects created without one.
pub const PROJECT_PALETTE: [&str; 6] = ["#FFB6C1", "#FFD27F", "#A3F7BF", "#5CC8FF", "#C6B7FF", "#FFA3A3"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. `#5CC8FF`
    pub color: String,
}

impl Project {
    /// New project with a fresh id; without `color` one is picked from
    /// [`PROJECT_PALETTE`].
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        let uuid = uuid::Uuid::new_v4();
        let color = color.unwrap_or_else(|| {
            let index = usize::from(uuid.as_bytes()[0]) % PROJECT_PALETTE.len();
            PROJECT_PALETTE[index].to_string()
        });
        Project {
            id: format!("p_{}", uuid.simple()),
            name: name.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label {
            id: format!("l_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn task_creation() {
        let task = Task::new("Write report", &t0());
        assert_eq!(task.title, "Write report");
        assert!(task.id.starts_with("task-"));
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert!(!task.tracking.is_running());
        assert_eq!(task.priority, Priority::LOW);
        assert_eq!(task.created_at, t0());
    }

    #[test]
    fn priority_bounds() {
        assert!(Priority::new(1).is_ok());
        assert!(Priority::new(4).is_ok());
        assert_eq!(Priority::new(0), Err(ValidationError::InvalidPriority(0)));
        assert_eq!(Priority::new(5), Err(ValidationError::InvalidPriority(5)));
        assert!(Priority::URGENT < Priority::LOW);
    }

    #[test]
    fn start_then_pause_banks_time() {
        let task = Task::new("Test", &t0());
        let running = task.apply(TaskAction::StartTimer, &t0());
        assert!(running.tracking.is_running());

        let later = t0() + Duration::minutes(10);
        let paused = running.apply(TaskAction::PauseTimer, &later);
        assert!(!paused.tracking.is_running());
        assert_eq!(paused.tracking.accumulated_ms, 600_000);
        assert_eq!(paused.updated_at, later);
    }

    #[test]
    fn start_while_running_keeps_original_start() {
        let running = Task::new("Test", &t0()).apply(TaskAction::StartTimer, &t0());
        let again = running.apply(TaskAction::StartTimer, &(t0() + Duration::minutes(3)));
        assert_eq!(again, running);
    }

    #[test]
    fn completing_force_pauses() {
        let running = Task::new("Test", &t0()).apply(TaskAction::StartTimer, &t0());
        let done_at = t0() + Duration::minutes(45);
        let done = running.apply(TaskAction::ToggleComplete, &done_at);

        assert!(done.completed);
        assert_eq!(done.completed_at, Some(done_at));
        assert!(!done.tracking.is_running());
        assert_eq!(done.tracking.accumulated_ms, 45 * 60_000);
    }

    #[test]
    fn reopening_clears_completion_and_keeps_timer_idle() {
        let done = Task::new("Test", &t0()).apply(TaskAction::ToggleComplete, &t0());
        let reopened = done.apply(TaskAction::ToggleComplete, &(t0() + Duration::hours(1)));
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());
        assert!(!reopened.tracking.is_running());
    }

    #[test]
    fn add_estimate_does_not_log_time() {
        let mut task = Task::new("Test", &t0());
        task.estimated_minutes = Some(30);
        let extended = task.apply(TaskAction::AddEstimate { minutes: 15 }, &t0());
        assert_eq!(extended.estimated_minutes, Some(45));
        assert_eq!(extended.tracking.accumulated_ms, 0);

        let unestimated = Task::new("Other", &t0());
        let extended = unestimated.apply(TaskAction::AddEstimate { minutes: 5 }, &t0());
        assert_eq!(extended.estimated_minutes, Some(5));
    }

    #[test]
    fn estimated_ms_ignores_zero() {
        let mut task = Task::new("Test", &t0());
        assert_eq!(task.estimated_ms(), None);
        task.estimated_minutes = Some(0);
        assert_eq!(task.estimated_ms(), None);
        task.estimated_minutes = Some(2);
        assert_eq!(task.estimated_ms(), Some(120_000));
    }

    #[test]
    fn deserializes_stored_shape() {
        let json = r#"{
            "id": "t_abc",
            "title": "Finish algorithm assignment",
            "projectId": "p_school",
            "labelIds": ["l_group"],
            "dueDate": "2026-03-04",
            "estimatedMinutes": 120,
            "accumulatedMs": 1500,
            "timerStartedAt": null,
            "completedAt": null,
            "priority": 2,
            "completed": false,
            "createdAt": "2026-03-01T10:00:00.000Z",
            "updatedAt": "2026-03-01T10:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::HIGH);
        assert_eq!(task.tracking.accumulated_ms, 1500);
        assert!(!task.tracking.is_running());
        assert!(matches!(task.due_date, Some(DueDate::Day(_))));

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["accumulatedMs"], 1500);
        assert_eq!(back["dueDate"], "2026-03-04");
        assert_eq!(back["projectId"], "p_school");
    }

    #[test]
    fn unreadable_due_date_is_dropped() {
        let json = r#"{
            "id": "t_1", "title": "x", "dueDate": "whenever",
            "createdAt": "2026-03-01T10:00:00Z", "updatedAt": "2026-03-01T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.due_date.is_none());
        assert_eq!(task.tracking, TimeTracking::default());
    }

    #[test]
    fn edit_changes_only_named_fields() {
        let task = Task::new("Draft", &t0()).apply(TaskAction::StartTimer, &t0());
        let later = t0() + Duration::minutes(5);
        let edit = TaskEdit {
            title: Some("Final draft".into()),
            due_date: Some(Some("2026-03-06".parse().unwrap())),
            priority: Some(Priority::HIGH),
            label_ids: Some(vec!["l_1".into()]),
            ..TaskEdit::default()
        };
        let edited = task.edit(&edit, &later).unwrap();
        assert_eq!(edited.title, "Final draft");
        assert_eq!(edited.priority, Priority::HIGH);
        assert_eq!(edited.label_ids, ["l_1"]);
        assert!(edited.due_date.is_some());
        assert!(edited.tracking.is_running());
        assert_eq!(edited.created_at, task.created_at);
        assert_eq!(edited.updated_at, later);

        let cleared = edited
            .edit(
                &TaskEdit {
                    due_date: Some(None),
                    ..TaskEdit::default()
                },
                &later,
            )
            .unwrap();
        assert!(cleared.due_date.is_none());
        assert_eq!(cleared.title, "Final draft");
    }

    #[test]
    fn edit_rejects_blank_title() {
        let task = Task::new("Draft", &t0());
        let edit = TaskEdit {
            title: Some("   ".into()),
            ..TaskEdit::default()
        };
        assert!(matches!(
            task.edit(&edit, &t0()),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(TaskEdit::default().is_empty());
        assert!(!edit.is_empty());
    }

    #[test]
    fn new_project_gets_palette_color() {
        let project = Project::new("School", None);
        assert!(project.id.starts_with("p_"));
        assert!(PROJECT_PALETTE.contains(&project.color.as_str()));
        assert_eq!(Project::new("Home", Some("#000000".into())).color, "#000000");
        assert!(Label::new("group").id.starts_with("l_"));
    }

    fn with_estimate(raw: &str) -> Task {
        let json = format!(
            r#"{{
                "id": "t_1", "title": "x", "estimatedMinutes": {raw},
                "createdAt": "2026-03-01T10:00:00Z", "updatedAt": "2026-03-01T10:00:00Z"
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn fractional_estimate_rounds_to_minutes() {
        assert_eq!(with_estimate("22.5").estimated_minutes, Some(23));
        assert_eq!(with_estimate("22.4").estimated_minutes, Some(22));
        assert_eq!(with_estimate("45").estimated_minutes, Some(45));
        assert_eq!(with_estimate(r#""90""#).estimated_minutes, Some(90));
        assert_eq!(with_estimate("22.5").estimated_ms(), Some(23 * 60_000));
    }

    #[test]
    fn unusable_estimate_is_dropped() {
        assert_eq!(with_estimate("-5").estimated_minutes, None);
        assert_eq!(with_estimate("1e300").estimated_minutes, None);
        assert_eq!(with_estimate(r#""soon""#).estimated_minutes, None);
        assert_eq!(with_estimate("null").estimated_minutes, None);
        assert_eq!(with_estimate("[30]").estimated_minutes, None);
    }
}
