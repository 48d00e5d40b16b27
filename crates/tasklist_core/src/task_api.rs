use crate::config::Config;
use crate::error::AppError;
use crate::model::{Task, TaskDraft, TaskPatch};
use crate::storage::{JsonFileStore, TaskPersistence, json_store};
use crate::store::{DragResult, TaskStore};
use crate::view::{self, TaskStats, ViewEntry, ViewFilter};
use time::Date;
use tracing::{debug, info};

/// The task list together with where it is kept.
///
/// Every operation that changes the list is followed by a save of the whole
/// list before the call returns. Operations that change nothing do not
/// touch storage.
#[derive(Debug)]
pub struct TaskSession<P: TaskPersistence> {
    store: TaskStore,
    persistence: P,
}

/// Opens the list at the configured location.
pub fn open_default(config: &Config) -> Result<TaskSession<JsonFileStore>, AppError> {
    let path = json_store::store_path(config.store_path.as_deref())?;
    TaskSession::open(JsonFileStore::new(path))
}

impl<P: TaskPersistence> TaskSession<P> {
    pub fn open(persistence: P) -> Result<Self, AppError> {
        let tasks = persistence.load()?;
        info!(count = tasks.len(), "loaded tasks");
        Ok(Self {
            store: TaskStore::from_tasks(tasks),
            persistence,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.store.get(id)
    }

    /// Maps user input to a task id: an exact id wins, otherwise a prefix
    /// matching exactly one task. Input matching nothing comes back trimmed
    /// and unchanged, so operations on it fall through as no-ops.
    pub fn resolve_id(&self, input: &str) -> Result<String, AppError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        if self.store.get(trimmed).is_some() {
            return Ok(trimmed.to_string());
        }

        let mut matches = self
            .tasks()
            .iter()
            .filter(|task| task.id.starts_with(trimmed));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(AppError::invalid_input(format!(
                "id prefix '{trimmed}' matches more than one task"
            ))),
            (None, _) => Ok(trimmed.to_string()),
        }
    }

    pub fn create(&mut self, draft: TaskDraft) -> Result<Option<Task>, AppError> {
        let created = self.store.create(draft);
        self.commit(created)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let toggled = self.store.toggle_complete(id);
        self.commit(toggled)
    }

    pub fn toggle_important(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let toggled = self.store.toggle_important(id);
        self.commit(toggled)
    }

    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>, AppError> {
        let updated = self.store.update(id, patch);
        self.commit(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let removed = self.store.delete(id);
        self.commit(removed)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool, AppError> {
        let moved = self.store.reorder(from, to);
        Ok(self.commit(moved.then_some(()))?.is_some())
    }

    pub fn apply_drag(&mut self, drag: DragResult) -> Result<bool, AppError> {
        let moved = self.store.apply_drag(drag);
        Ok(self.commit(moved.then_some(()))?.is_some())
    }

    pub fn view(&self, filter: &ViewFilter) -> Vec<ViewEntry<'_>> {
        filter.apply(self.tasks())
    }

    pub fn stats(&self) -> TaskStats {
        self.stats_on(view::local_today())
    }

    pub fn stats_on(&self, today: Date) -> TaskStats {
        view::compute_stats(self.tasks(), today)
    }

    fn commit<T>(&mut self, outcome: Option<T>) -> Result<Option<T>, AppError> {
        match outcome {
            Some(value) => {
                self.persistence.save(self.store.tasks())?;
                Ok(Some(value))
            }
            None => {
                debug!("operation left the list unchanged");
                Ok(None)
            }
        }
    }
}
