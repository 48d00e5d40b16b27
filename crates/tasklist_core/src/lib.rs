pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod task_api;
pub mod view;

pub use error::AppError;
pub use model::{Category, Priority, Task, TaskDraft, TaskPatch};
pub use storage::{JsonFileStore, MemoryStore, TaskPersistence};
pub use store::{DragResult, TaskStore};
pub use task_api::TaskSession;
pub use view::{FilterStage, Selection, TaskStats, ViewEntry, ViewFilter};
