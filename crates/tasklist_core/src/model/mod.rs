mod date;
mod task;

pub use date::{format_due_date, parse_due_date};
pub use task::{Category, Priority, Task, TaskDraft, TaskPatch};
