//! Task list queries: inbox, today, overdue, upcoming, completed, plus
//! project, label and title-search filters.
//!
//! All queries borrow from a snapshot and never reorder it in place.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::Task;
use crate::error::ValidationError;
use crate::stats::is_overdue;

/// Ordering for task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Earliest deadline first, undated last; ties broken by priority
    #[default]
    Time,
    /// Most urgent first; ties broken by deadline
    Priority,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(SortOrder::Time),
            "priority" => Ok(SortOrder::Priority),
            other => Err(ValidationError::InvalidValue {
                field: "sort".to_string(),
                message: format!("expected 'time' or 'priority', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Time => write!(f, "time"),
            SortOrder::Priority => write!(f, "priority"),
        }
    }
}

fn due_key<Tz: TimeZone>(task: &Task, tz: &Tz) -> i64 {
    task.due_instant_in(tz)
        .map(|d| d.timestamp_millis())
        .unwrap_or(i64::MAX)
}

/// Sort borrowed tasks in place by `order`.
pub fn sort_tasks<Tz: TimeZone>(tasks: &mut [&Task], order: SortOrder, tz: &Tz) {
    match order {
        SortOrder::Time => tasks.sort_by_key(|t| (due_key(t, tz), t.priority)),
        SortOrder::Priority => tasks.sort_by_key(|t| (t.priority, due_key(t, tz))),
    }
}

/// Incomplete tasks due on `now`'s calendar day.
pub fn today<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>, order: SortOrder) -> Vec<&'a Task> {
    let tz = now.timezone();
    let date = now.date_naive();
    let mut list: Vec<&Task> = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| t.due_date.is_some_and(|d| d.date_in(&tz) == date))
        .collect();
    sort_tasks(&mut list, order, &tz);
    list
}

/// Incomplete tasks whose deadline has passed, grouped by due day.
pub fn overdue<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    now: &DateTime<Tz>,
    order: SortOrder,
) -> BTreeMap<NaiveDate, Vec<&'a Task>> {
    let list = tasks.iter().filter(|t| is_overdue(t, now));
    group_by_due_date(list, &now.timezone(), order)
}

/// Incomplete tasks due today or later, grouped by due day.
pub fn upcoming<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    now: &DateTime<Tz>,
    order: SortOrder,
) -> BTreeMap<NaiveDate, Vec<&'a Task>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let list = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| t.due_date.is_some_and(|d| d.date_in(&tz) >= today));
    group_by_due_date(list, &tz, order)
}

/// The default task list: open tasks not due on a past day.
///
/// Tasks whose precise deadline passed earlier today stay under `today`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbox<'a> {
    pub today: Vec<&'a Task>,
    pub upcoming: BTreeMap<NaiveDate, Vec<&'a Task>>,
    pub no_due_date: Vec<&'a Task>,
}

impl Inbox<'_> {
    pub fn len(&self) -> usize {
        self.today.len() + self.upcoming.values().map(Vec::len).sum::<usize>() + self.no_due_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the [`Inbox`], keeping only titles matching `search` when given.
pub fn inbox<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    now: &DateTime<Tz>,
    order: SortOrder,
    search: Option<&str>,
) -> Inbox<'a> {
    let tz = now.timezone();
    let date = now.date_naive();
    let mut view = Inbox::default();
    let mut later = Vec::new();

    let open = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| search.map_or(true, |needle| title_matches(t, needle)));
    for task in open {
        match task.due_date.map(|d| d.date_in(&tz)) {
            None => view.no_due_date.push(task),
            Some(day) if day == date => view.today.push(task),
            Some(day) if day > date => later.push(task),
            Some(_) => {}
        }
    }

    sort_tasks(&mut view.today, order, &tz);
    sort_tasks(&mut view.no_due_date, order, &tz);
    view.upcoming = group_by_due_date(later.into_iter(), &tz, order);
    view
}

/// Case-insensitive substring match on the title. An empty needle matches.
pub fn title_matches(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(&needle.to_lowercase())
}

/// Open tasks whose title contains `needle`.
pub fn search<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    needle: &str,
    tz: &Tz,
    order: SortOrder,
) -> Vec<&'a Task> {
    open_where(tasks, tz, order, |t| title_matches(t, needle))
}

/// Open tasks in a project.
pub fn by_project<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    project_id: &str,
    tz: &Tz,
    order: SortOrder,
) -> Vec<&'a Task> {
    open_where(tasks, tz, order, |t| t.project_id.as_deref() == Some(project_id))
}

/// Open tasks carrying a label.
pub fn by_label<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    label_id: &str,
    tz: &Tz,
    order: SortOrder,
) -> Vec<&'a Task> {
    open_where(tasks, tz, order, |t| t.label_ids.iter().any(|l| l == label_id))
}

fn open_where<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    tz: &Tz,
    order: SortOrder,
    keep: impl Fn(&Task) -> bool,
) -> Vec<&'a Task> {
    let mut list: Vec<&Task> = tasks.iter().filter(|t| !t.completed && keep(*t)).collect();
    sort_tasks(&mut list, order, tz);
    list
}

/// Completed tasks, most recently completed first.
pub fn completed(tasks: &[Task]) -> Vec<&Task> {
    let mut list: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();
    list.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    list
}

fn group_by_due_date<'a, Tz: TimeZone>(
    tasks: impl Iterator<Item = &'a Task>,
    tz: &Tz,
    order: SortOrder,
) -> BTreeMap<NaiveDate, Vec<&'a Task>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&'a Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(due) = task.due_date {
            groups.entry(due.date_in(tz)).or_default().push(task);
        }
    }
    for group in groups.values_mut() {
        sort_tasks(group, order, tz);
    }
    groups
}
