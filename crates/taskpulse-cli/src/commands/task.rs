//! Task management and timer commands for CLI.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use taskpulse_core::task::query;
use taskpulse_core::{
    is_overdue, AppData, Clock, Config, DueDate, FileStore, Priority, Repository, SortOrder,
    SystemClock, Task, TaskAction, TaskEdit,
};

use super::{open_repository, print_json, CommandResult};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Due date: YYYY-MM-DD or YYYY-MM-DDTHH:MM (local time)
        #[arg(long)]
        due: Option<DueDate>,
        /// Estimated minutes (default from config)
        #[arg(long)]
        estimate: Option<u32>,
        /// Priority 1 (urgent) to 4
        #[arg(long, default_value_t = 4)]
        priority: u8,
        /// Project ID to associate with
        #[arg(long)]
        project: Option<String>,
        /// Label ID (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
        /// Task description
        #[arg(long)]
        description: Option<String>,
    },
    /// Change a task's fields; timer and completion are left alone
    Edit {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        /// Due date: YYYY-MM-DD or YYYY-MM-DDTHH:MM (local time)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<DueDate>,
        #[arg(long)]
        clear_due: bool,
        /// Estimated minutes
        #[arg(long, conflicts_with = "clear_estimate")]
        estimate: Option<u32>,
        #[arg(long)]
        clear_estimate: bool,
        /// Priority 1 (urgent) to 4
        #[arg(long)]
        priority: Option<u8>,
        /// Move to a project
        #[arg(long, conflicts_with = "no_project")]
        project: Option<String>,
        /// Move back to the inbox
        #[arg(long)]
        no_project: bool,
        /// Replace labels (repeatable)
        #[arg(long = "label", conflicts_with = "clear_labels")]
        labels: Vec<String>,
        #[arg(long)]
        clear_labels: bool,
    },
    /// List tasks
    List {
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
        /// time or priority (default from config)
        #[arg(long)]
        sort: Option<SortOrder>,
        /// Keep only titles containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// Project ID, required by `--view project`
        #[arg(long, required_if_eq("view", "project"))]
        project: Option<String>,
        /// Label ID, required by `--view label`
        #[arg(long, required_if_eq("view", "label"))]
        label: Option<String>,
    },
    /// Show a task with its elapsed time
    Show {
        /// Task ID
        id: String,
    },
    /// Start the task's timer
    Start {
        /// Task ID
        id: String,
    },
    /// Pause the task's timer
    Pause {
        /// Task ID
        id: String,
    },
    /// Toggle completion (pauses a running timer)
    Toggle {
        /// Task ID
        id: String,
    },
    /// Add minutes to the estimate
    Extend {
        /// Task ID
        id: String,
        /// Minutes to add
        minutes: u32,
    },
    /// Delete a task
    Remove {
        /// Task ID
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum View {
    /// Every task, completed ones included
    All,
    /// Open tasks grouped as today, upcoming by day, and undated
    Inbox,
    Today,
    Overdue,
    Upcoming,
    Completed,
    /// Open tasks in `--project`
    Project,
    /// Open tasks carrying `--label`
    Label,
}

/// A task plus values derived at `now`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDetail<'a> {
    #[serde(flatten)]
    task: &'a Task,
    elapsed_ms: u64,
    overdue: bool,
}

impl<'a> TaskDetail<'a> {
    fn at<Tz: TimeZone>(task: &'a Task, now: &DateTime<Tz>) -> Self {
        Self {
            task,
            elapsed_ms: task.actual_elapsed_ms(now),
            overdue: is_overdue(task, now),
        }
    }
}

pub fn run(action: TaskCommand) -> CommandResult {
    let repo = open_repository()?;
    let data = repo.load()?;
    let now = SystemClock.now();

    match action {
        TaskCommand::Add {
            title,
            due,
            estimate,
            priority,
            project,
            labels,
            description,
        } => {
            let config = Config::load();
            let mut task = Task::new(title, &now);
            task.due_date = due;
            task.estimated_minutes = Some(estimate.unwrap_or(config.display.default_estimate_minutes));
            task.priority = Priority::new(priority)?;
            task.project_id = project;
            task.label_ids = labels;
            task.description = description;

            let data = data.add_task(task.clone());
            repo.save(&data)?;
            print_json(&TaskDetail::at(&task, &now))?;
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            clear_description,
            due,
            clear_due,
            estimate,
            clear_estimate,
            priority,
            project,
            no_project,
            labels,
            clear_labels,
        } => {
            let edit = TaskEdit {
                title,
                description: optional_field(description, clear_description),
                due_date: optional_field(due, clear_due),
                estimated_minutes: optional_field(estimate, clear_estimate),
                priority: priority.map(Priority::new).transpose()?,
                project_id: optional_field(project, no_project),
                label_ids: if clear_labels {
                    Some(Vec::new())
                } else {
                    (!labels.is_empty()).then_some(labels)
                },
            };
            if edit.is_empty() {
                return Err("nothing to edit".into());
            }
            let data = data.update_task(&id, &edit, &now)?;
            repo.save(&data)?;
            if let Some(task) = data.task(&id) {
                print_json(&TaskDetail::at(task, &now))?;
            }
        }
        TaskCommand::List {
            view,
            sort,
            search,
            project,
            label,
        } => {
            let order = sort.unwrap_or_else(|| Config::load().display.sort);
            let tz = now.timezone();
            let needle = search.as_deref();
            let keep = |task: &&Task| needle.map_or(true, |n| query::title_matches(task, n));
            match view {
                View::All => {
                    let mut list: Vec<&Task> = data.tasks.iter().filter(keep).collect();
                    query::sort_tasks(&mut list, order, &tz);
                    print_json(&list)?;
                }
                View::Inbox => print_json(&query::inbox(&data.tasks, &now, order, needle))?,
                View::Today => {
                    let mut list = query::today(&data.tasks, &now, order);
                    list.retain(keep);
                    print_json(&list)?;
                }
                View::Overdue => {
                    let mut groups = query::overdue(&data.tasks, &now, order);
                    retain_grouped(&mut groups, keep);
                    print_json(&groups)?;
                }
                View::Upcoming => {
                    let mut groups = query::upcoming(&data.tasks, &now, order);
                    retain_grouped(&mut groups, keep);
                    print_json(&groups)?;
                }
                View::Completed => {
                    let mut list = query::completed(&data.tasks);
                    list.retain(keep);
                    print_json(&list)?;
                }
                View::Project => {
                    let id = project.ok_or("--project is required for the project view")?;
                    let mut list = query::by_project(&data.tasks, &id, &tz, order);
                    list.retain(keep);
                    print_json(&list)?;
                }
                View::Label => {
                    let id = label.ok_or("--label is required for the label view")?;
                    let mut list = query::by_label(&data.tasks, &id, &tz, order);
                    list.retain(keep);
                    print_json(&list)?;
                }
            }
        }
        TaskCommand::Show { id } => {
            let task = data
                .task(&id)
                .ok_or_else(|| format!("Task not found: {id}"))?;
            print_json(&TaskDetail::at(task, &now))?;
        }
        TaskCommand::Start { id } => transition(&repo, data, &id, TaskAction::StartTimer, &now)?,
        TaskCommand::Pause { id } => transition(&repo, data, &id, TaskAction::PauseTimer, &now)?,
        TaskCommand::Toggle { id } => {
            transition(&repo, data, &id, TaskAction::ToggleComplete, &now)?
        }
        TaskCommand::Extend { id, minutes } => {
            transition(&repo, data, &id, TaskAction::AddEstimate { minutes }, &now)?
        }
        TaskCommand::Remove { id } => {
            let data = data.remove_task(&id)?;
            repo.save(&data)?;
            println!("Task removed: {id}");
        }
    }
    Ok(())
}

/// `Some(None)` clears the field, `Some(Some(v))` sets it.
fn optional_field<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn retain_grouped<K: Ord>(groups: &mut BTreeMap<K, Vec<&Task>>, keep: impl Fn(&&Task) -> bool) {
    for list in groups.values_mut() {
        list.retain(&keep);
    }
    groups.retain(|_, list| !list.is_empty());
}

fn transition<Tz: TimeZone>(
    repo: &Repository<FileStore>,
    data: AppData,
    id: &str,
    action: TaskAction,
    now: &DateTime<Tz>,
) -> CommandResult {
    let data = data.apply(id, action, now)?;
    repo.save(&data)?;
    if let Some(task) = data.task(id) {
        print_json(&TaskDetail::at(task, now))?;
    }
    tracing::debug!(task_id = id, %action, at = %now.with_timezone(&Utc), "task updated");
    Ok(())
}
