//! Persisted application snapshot and the repository that loads/saves it.
//!
//! The whole snapshot lives under a single key. Mutations produce a new
//! [`AppData`]; callers decide when to [`Repository::save`] it.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::store::BlobStore;
use crate::error::{CoreError, Result, StorageError, ValidationError};
use crate::task::{Label, Project, Task, TaskAction, TaskEdit};

/// Key under which the snapshot is stored.
pub const STORAGE_KEY: &str = "taskpulse_v1";

const REQUIRED_COLLECTIONS: [&str; 3] = ["tasks", "projects", "labels"];

/// Everything the app persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl AppData {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Apply `action` to the task with `id`.
    ///
    /// # Errors
    /// [`CoreError::TaskNotFound`] if no task has that id.
    pub fn apply<Tz: TimeZone>(
        &self,
        id: &str,
        action: TaskAction,
        now: &DateTime<Tz>,
    ) -> Result<AppData> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;

        let mut next = self.clone();
        next.tasks[index] = self.tasks[index].apply(action, now);
        tracing::debug!(task_id = id, %action, "applied task action");
        Ok(next)
    }

    /// New tasks go to the front so the most recent shows first.
    #[must_use]
    pub fn add_task(&self, task: Task) -> AppData {
        let mut next = self.clone();
        next.tasks.insert(0, task);
        next
    }

    /// # Errors
    /// [`CoreError::TaskNotFound`] if no task has that id.
    pub fn remove_task(&self, id: &str) -> Result<AppData> {
        if self.task(id).is_none() {
            return Err(CoreError::TaskNotFound(id.to_string()));
        }
        let mut next = self.clone();
        next.tasks.retain(|t| t.id != id);
        Ok(next)
    }

    /// Replace fields of the task with `id`.
    ///
    /// # Errors
    /// [`CoreError::TaskNotFound`] if no task has that id, or a validation
    /// error from [`Task::edit`].
    pub fn update_task<Tz: TimeZone>(
        &self,
        id: &str,
        edit: &TaskEdit,
        now: &DateTime<Tz>,
    ) -> Result<AppData> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;

        let mut next = self.clone();
        next.tasks[index] = self.tasks[index].edit(edit, now)?;
        tracing::debug!(task_id = id, "edited task");
        Ok(next)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn label(&self, id: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    /// Projects keep creation order.
    #[must_use]
    pub fn add_project(&self, project: Project) -> AppData {
        let mut next = self.clone();
        next.projects.push(project);
        next
    }

    #[must_use]
    pub fn add_label(&self, label: Label) -> AppData {
        let mut next = self.clone();
        next.labels.push(label);
        next
    }

    /// # Errors
    /// [`CoreError::ProjectNotFound`] if no project has that id.
    pub fn rename_project(&self, id: &str, name: &str) -> Result<AppData> {
        let mut next = self.clone();
        let project = next
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProjectNotFound(id.to_string()))?;
        project.name = name.to_string();
        Ok(next)
    }

    /// # Errors
    /// [`CoreError::LabelNotFound`] if no label has that id.
    pub fn rename_label(&self, id: &str, name: &str) -> Result<AppData> {
        let mut next = self.clone();
        let label = next
            .labels
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::LabelNotFound(id.to_string()))?;
        label.name = name.to_string();
        Ok(next)
    }

    /// Drop a project; its tasks move back to the inbox.
    ///
    /// # Errors
    /// [`CoreError::ProjectNotFound`] if no project has that id.
    pub fn remove_project<Tz: TimeZone>(&self, id: &str, now: &DateTime<Tz>) -> Result<AppData> {
        if self.project(id).is_none() {
            return Err(CoreError::ProjectNotFound(id.to_string()));
        }
        let now = now.with_timezone(&Utc);
        let mut next = self.clone();
        next.projects.retain(|p| p.id != id);
        for task in next
            .tasks
            .iter_mut()
            .filter(|t| t.project_id.as_deref() == Some(id))
        {
            task.project_id = None;
            task.updated_at = now;
        }
        Ok(next)
    }

    /// Drop a label and strip it from every task that carried it.
    ///
    /// # Errors
    /// [`CoreError::LabelNotFound`] if no label has that id.
    pub fn remove_label<Tz: TimeZone>(&self, id: &str, now: &DateTime<Tz>) -> Result<AppData> {
        if self.label(id).is_none() {
            return Err(CoreError::LabelNotFound(id.to_string()));
        }
        let now = now.with_timezone(&Utc);
        let mut next = self.clone();
        next.labels.retain(|l| l.id != id);
        for task in next.tasks.iter_mut() {
            let before = task.label_ids.len();
            task.label_ids.retain(|l| l != id);
            if task.label_ids.len() != before {
                task.updated_at = now;
            }
        }
        Ok(next)
    }

    /// Parse an import payload.
    ///
    /// # Errors
    /// [`ValidationError::InvalidImport`] unless `json` is an object with
    /// `tasks`, `projects` and `labels` arrays whose records are readable.
    pub fn from_import(json: &str) -> Result<AppData> {
        let invalid = |message: String| CoreError::from(ValidationError::InvalidImport(message));

        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| invalid(format!("not JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| invalid("expected a JSON object".to_string()))?;

        for field in REQUIRED_COLLECTIONS {
            if !object.get(field).is_some_and(serde_json::Value::is_array) {
                return Err(invalid(format!("'{field}' must be an array")));
            }
        }

        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }
}

/// Loads and saves [`AppData`] through a [`BlobStore`].
pub struct Repository<S> {
    store: S,
}

impl<S: BlobStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the snapshot; an empty one if nothing was saved yet.
    pub fn load(&self) -> Result<AppData> {
        let Some(raw) = self.store.read(STORAGE_KEY)? else {
            tracing::debug!("no stored snapshot, starting empty");
            return Ok(AppData::default());
        };

        serde_json::from_str(&raw).map_err(|e| {
            CoreError::from(StorageError::Corrupt {
                key: STORAGE_KEY.to_string(),
                message: e.to_string(),
            })
        })
    }

    pub fn save(&self, data: &AppData) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.store.write(STORAGE_KEY, &json)?;
        tracing::info!(tasks = data.tasks.len(), "snapshot saved");
        Ok(())
    }

    /// Pretty-printed JSON of the stored snapshot.
    pub fn export(&self) -> Result<String> {
        let data = self.load()?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Validate `json` and replace the stored snapshot with it.
    ///
    /// Nothing is written when validation fails.
    pub fn import(&self, json: &str) -> Result<AppData> {
        let data = AppData::from_import(json)?;
        self.save(&data)?;
        tracing::info!(
            tasks = data.tasks.len(),
            projects = data.projects.len(),
            labels = data.labels.len(),
            "snapshot imported"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn sample() -> AppData {
        let mut a = Task::new("a", &t0());
        a.id = "a".into();
        a.project_id = Some("p1".into());
        a.label_ids = vec!["l1".into(), "l2".into()];
        let mut b = Task::new("b", &t0());
        b.id = "b".into();
        AppData {
            tasks: vec![a, b],
            projects: vec![Project {
                id: "p1".into(),
                name: "School".into(),
                color: "#5CC8FF".into(),
            }],
            labels: vec![
                Label { id: "l1".into(), name: "group".into() },
                Label { id: "l2".into(), name: "solo".into() },
            ],
        }
    }

    #[test]
    fn apply_touches_only_target() {
        let data = sample();
        let later = t0() + Duration::minutes(5);
        let next = data.apply("a", TaskAction::StartTimer, &later).unwrap();
        assert!(next.task("a").unwrap().tracking.is_running());
        assert_eq!(next.task("b"), data.task("b"));
        assert!(!data.task("a").unwrap().tracking.is_running());
    }

    #[test]
    fn apply_unknown_task() {
        let err = sample().apply("zzz", TaskAction::ToggleComplete, &t0()).unwrap_err();
        assert!(matches!(err, CoreError::TaskNotFound(id) if id == "zzz"));
    }

    #[test]
    fn add_and_remove_task() {
        let data = sample().add_task(Task::new("c", &t0()));
        assert_eq!(data.tasks[0].title, "c");
        let data = data.remove_task("a").unwrap();
        assert!(data.task("a").is_none());
        assert!(data.remove_task("a").is_err());
    }

    #[test]
    fn removing_project_unassigns_tasks() {
        let later = t0() + Duration::hours(1);
        let data = sample().remove_project("p1", &later).unwrap();
        assert!(data.projects.is_empty());
        let a = data.task("a").unwrap();
        assert_eq!(a.project_id, None);
        assert_eq!(a.updated_at, later);
        assert_eq!(data.task("b").unwrap().updated_at, t0());
    }

    #[test]
    fn removing_label_prunes_ids() {
        let later = t0() + Duration::hours(1);
        let data = sample().remove_label("l1", &later).unwrap();
        assert_eq!(data.labels.len(), 1);
        let a = data.task("a").unwrap();
        assert_eq!(a.label_ids, vec!["l2".to_string()]);
        assert_eq!(a.updated_at, later);
    }

    #[test]
    fn unknown_project_or_label_is_an_error() {
        let data = sample();
        assert!(matches!(
            data.remove_project("nope", &t0()),
            Err(CoreError::ProjectNotFound(id)) if id == "nope"
        ));
        assert!(matches!(
            data.remove_label("nope", &t0()),
            Err(CoreError::LabelNotFound(_))
        ));
        assert!(matches!(
            data.rename_project("nope", "x"),
            Err(CoreError::ProjectNotFound(_))
        ));
        assert!(matches!(
            data.rename_label("nope", "x"),
            Err(CoreError::LabelNotFound(_))
        ));
    }

    #[test]
    fn add_and_rename_project_and_label() {
        let project = Project::new("Home", None);
        let label = Label::new("errand");
        let data = sample().add_project(project.clone()).add_label(label.clone());
        assert_eq!(data.projects.last(), Some(&project));
        assert_eq!(data.labels.last(), Some(&label));

        let data = data
            .rename_project(&project.id, "Household")
            .unwrap()
            .rename_label("l1", "team")
            .unwrap();
        assert_eq!(data.project(&project.id).unwrap().name, "Household");
        assert_eq!(data.project(&project.id).unwrap().color, project.color);
        assert_eq!(data.label("l1").unwrap().name, "team");
        assert_eq!(data.task("a").unwrap().label_ids, ["l1", "l2"]);
    }

    #[test]
    fn update_task_edits_one_record() {
        let later = t0() + Duration::minutes(10);
        let edit = TaskEdit {
            title: Some("renamed".into()),
            project_id: Some(None),
            ..TaskEdit::default()
        };
        let data = sample().update_task("a", &edit, &later).unwrap();
        let a = data.task("a").unwrap();
        assert_eq!(a.title, "renamed");
        assert_eq!(a.project_id, None);
        assert_eq!(a.updated_at, later);
        assert_eq!(data.task("b"), sample().task("b"));

        assert!(matches!(
            sample().update_task("zzz", &edit, &later),
            Err(CoreError::TaskNotFound(_))
        ));
        let blank = TaskEdit {
            title: Some(String::new()),
            ..TaskEdit::default()
        };
        assert!(matches!(
            sample().update_task("a", &blank, &later),
            Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn load_missing_is_empty() {
        let repo = Repository::new(MemoryStore::new());
        assert_eq!(repo.load().unwrap(), AppData::default());
    }

    #[test]
    fn save_then_load() {
        let repo = Repository::new(MemoryStore::new());
        let data = sample();
        repo.save(&data).unwrap();
        assert_eq!(repo.load().unwrap(), data);
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let store = MemoryStore::new();
        store.write(STORAGE_KEY, "{not json").unwrap();
        let repo = Repository::new(store);
        assert!(matches!(
            repo.load(),
            Err(CoreError::Storage(StorageError::Corrupt { .. }))
        ));
    }

    #[test]
    fn import_requires_all_collections() {
        let repo = Repository::new(MemoryStore::new());
        repo.save(&sample()).unwrap();

        for bad in [
            "[]",
            "nope",
            r#"{"tasks": [], "projects": []}"#,
            r#"{"tasks": {}, "projects": [], "labels": []}"#,
        ] {
            let err = repo.import(bad).unwrap_err();
            assert!(
                matches!(err, CoreError::Validation(ValidationError::InvalidImport(_))),
                "{bad}: {err}"
            );
        }
        assert_eq!(repo.load().unwrap(), sample());
    }

    #[test]
    fn import_replaces_snapshot() {
        let repo = Repository::new(MemoryStore::new());
        repo.save(&sample()).unwrap();
        let imported = repo
            .import(r#"{"tasks": [], "projects": [], "labels": [{"id": "x", "name": "X"}]}"#)
            .unwrap();
        assert_eq!(imported.labels.len(), 1);
        assert_eq!(repo.load().unwrap(), imported);
    }

    #[test]
    fn export_is_pretty() {
        let repo = Repository::new(MemoryStore::new());
        repo.save(&sample()).unwrap();
        let out = repo.export().unwrap();
        assert!(out.contains("\n  \"tasks\""));
        assert_eq!(AppData::from_import(&out).unwrap(), sample());
    }
}
