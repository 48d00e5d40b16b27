//! The authoritative ordered task list and its mutation operations.
//!
//! Every operation is total: a missing id, a blank text or an out-of-range
//! position leaves the list untouched and is reported as `None`/`false`
//! rather than as an error.

use crate::model::{Task, TaskDraft, TaskPatch};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

/// Outcome of a drag gesture: where the item started and where it was
/// dropped, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragResult {
    pub source: usize,
    pub destination: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already validated sequence, such as one returned by a
    /// `TaskPersistence::load`.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn create(&mut self, draft: TaskDraft) -> Option<Task> {
        self.create_at(draft, OffsetDateTime::now_utc())
    }

    /// Appends a task built from `draft`, stamped with `now`.
    ///
    /// Returns `None` and leaves the list unchanged when the trimmed text is
    /// empty.
    pub fn create_at(&mut self, draft: TaskDraft, now: OffsetDateTime) -> Option<Task> {
        let text = draft.text.trim();
        if text.is_empty() {
            debug!("rejected task with blank text");
            return None;
        }

        let task = Task {
            id: self.fresh_id(),
            text: text.to_string(),
            completed: false,
            important: false,
            category: draft.category.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            due_date: draft.due_date,
            notes: normalize_notes(draft.notes),
            created_at: now,
            completed_at: None,
        };

        debug!(id = %task.id, "created task");
        self.tasks.push(task.clone());
        Some(task)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Option<Task> {
        self.toggle_complete_at(id, OffsetDateTime::now_utc())
    }

    pub fn toggle_complete_at(&mut self, id: &str, now: OffsetDateTime) -> Option<Task> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        Some(task.clone())
    }

    pub fn toggle_important(&mut self, id: &str) -> Option<Task> {
        let task = self.find_mut(id)?;
        task.important = !task.important;
        Some(task.clone())
    }

    /// Merges `patch` into the task with `id`.
    ///
    /// A patch carrying blank text is rejected whole.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Option<Task> {
        let text = match patch.text.as_deref().map(str::trim) {
            Some("") => {
                debug!(id, "rejected update with blank text");
                return None;
            }
            Some(text) => Some(text.to_string()),
            None => None,
        };

        let task = self.find_mut(id)?;
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(notes) = patch.notes {
            task.notes = normalize_notes(notes);
        }
        Some(task.clone())
    }

    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Moves the task at `from` so that it ends up at `to`, shifting the
    /// tasks in between. Returns `false` when nothing moved, including when
    /// either position is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tasks.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        true
    }

    /// Applies a finished drag; a drop outside any position is ignored.
    pub fn apply_drag(&mut self, drag: DragResult) -> bool {
        match drag.destination {
            Some(destination) => self.reorder(drag.source, destination),
            None => false,
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
