use crate::error::AppError;
use crate::model::Task;
use crate::storage::{STORE_KEY, TaskPersistence, decode_tasks, encode_tasks};

/// Keeps the serialized value in memory. Reads go through the same decoding
/// and recovery path as the file store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    value: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw stored value, as if written by an earlier run.
    pub fn with_raw<T: Into<String>>(value: T) -> Self {
        Self {
            value: Some(value.into()),
            saves: 0,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of `save` calls so far.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl TaskPersistence for MemoryStore {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        Ok(self
            .value
            .as_deref()
            .map(|value| decode_tasks(value, STORE_KEY))
            .unwrap_or_default())
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), AppError> {
        self.value = Some(encode_tasks(tasks)?);
        self.saves += 1;
        Ok(())
    }
}
