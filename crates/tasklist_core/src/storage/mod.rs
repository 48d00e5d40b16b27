//! Persistence boundary for the task list.
//!
//! The whole list is stored as one JSON array under a single key. Reads never
//! fail on malformed content: anything that does not decode into a valid
//! task sequence loads as an empty list and is reported through `tracing`.

pub mod json_store;
pub mod memory_store;

use crate::error::AppError;
use crate::model::Task;
use std::collections::HashSet;
use tracing::warn;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Key under which the list is stored.
pub const STORE_KEY: &str = "todos";

pub trait TaskPersistence {
    /// Returns the saved sequence, or an empty one when nothing usable is
    /// stored. Only I/O failures surface as errors.
    fn load(&self) -> Result<Vec<Task>, AppError>;

    /// Replaces the stored value with the full sequence.
    fn save(&mut self, tasks: &[Task]) -> Result<(), AppError>;
}

pub(crate) fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string_pretty(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub(crate) fn decode_tasks(content: &str, source: &str) -> Vec<Task> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let tasks: Vec<Task> = match serde_json::from_str(content) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!(source, error = %err, "stored tasks are not valid JSON, starting empty");
            return Vec::new();
        }
    };

    if let Err(err) = check_sequence(&tasks) {
        warn!(source, error = %err, "stored tasks break list invariants, starting empty");
        return Vec::new();
    }

    tasks
}

fn check_sequence(tasks: &[Task]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.id.trim().is_empty() {
            return Err(AppError::invalid_data("task id is empty"));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(AppError::invalid_data(format!("duplicate task id {}", task.id)));
        }
        if task.text.trim().is_empty() {
            return Err(AppError::invalid_data(format!("task {} has no text", task.id)));
        }
        if !task.completion_consistent() {
            return Err(AppError::invalid_data(format!(
                "task {} has completed and completedAt out of sync",
                task.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_tasks, encode_tasks};
    use crate::model::{Category, Priority, Task};
    use time::macros::{date, datetime};

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            text: format!("task {id}"),
            completed: false,
            important: false,
            category: Category::Inbox,
            priority: Priority::Medium,
            due_date: None,
            notes: None,
            created_at: datetime!(2025-12-20 10:30:00.123 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn decode_round_trips_encoded_sequence() {
        let mut done = task("b");
        done.completed = true;
        done.completed_at = Some(datetime!(2025-12-21 08:00 UTC));
        done.due_date = Some(date!(2025-12-22));
        done.notes = Some("bring bags".to_string());
        let tasks = vec![task("a"), done, task("c")];

        let encoded = encode_tasks(&tasks).unwrap();
        assert_eq!(decode_tasks(&encoded, "test"), tasks);
    }

    #[test]
    fn decode_treats_garbage_as_empty() {
        assert!(decode_tasks("{ not json", "test").is_empty());
        assert!(decode_tasks("{\"tasks\": []}", "test").is_empty());
        assert!(decode_tasks("", "test").is_empty());
        assert!(decode_tasks("null", "test").is_empty());
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let encoded = encode_tasks(&[task("a"), task("a")]).unwrap();
        assert!(decode_tasks(&encoded, "test").is_empty());
    }

    #[test]
    fn decode_rejects_unpaired_completion() {
        let mut broken = task("a");
        broken.completed = true;
        let encoded = encode_tasks(&[broken]).unwrap();
        assert!(decode_tasks(&encoded, "test").is_empty());
    }

    #[test]
    fn decode_rejects_unknown_category() {
        let raw = r#"[{"id":"a","text":"x","category":"errands","priority":"low","createdAt":"2025-12-20T00:00:00Z"}]"#;
        assert!(decode_tasks(raw, "test").is_empty());
    }
}
