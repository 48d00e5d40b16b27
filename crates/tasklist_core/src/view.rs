//! What the user currently sees: the filtered projection of the list and
//! the aggregate counters shown above it.
//!
//! Filter state is transient and never persisted. Statistics always cover
//! the full list, not the filtered subset.

use crate::error::AppError;
use crate::model::{Category, Priority, Task};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime, UtcOffset};

/// Either every value, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr<Err = AppError>> FromStr for Selection<T> {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            raw.parse().map(Selection::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    pub search: String,
    pub category: Selection<Category>,
    pub priority: Selection<Priority>,
    pub show_completed: bool,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: Selection::All,
            priority: Selection::All,
            show_completed: true,
        }
    }
}

/// One predicate of the filtering pipeline. Stages are independent, so any
/// order yields the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Completed,
    Search,
    Category,
    Priority,
}

impl FilterStage {
    pub const PIPELINE: [FilterStage; 4] = [
        FilterStage::Completed,
        FilterStage::Search,
        FilterStage::Category,
        FilterStage::Priority,
    ];

    pub fn keeps(self, filter: &ViewFilter, task: &Task) -> bool {
        match self {
            FilterStage::Completed => filter.show_completed || !task.completed,
            FilterStage::Search => matches_search(&task.text, &filter.search),
            FilterStage::Category => filter.category.admits(&task.category),
            FilterStage::Priority => filter.priority.admits(&task.priority),
        }
    }
}

fn matches_search(text: &str, query: &str) -> bool {
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
}

/// A task that survived filtering, with its index in the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEntry<'a> {
    pub position: usize,
    pub task: &'a Task,
}

impl ViewFilter {
    pub fn matches(&self, task: &Task) -> bool {
        FilterStage::PIPELINE
            .iter()
            .all(|stage| stage.keeps(self, task))
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<ViewEntry<'a>> {
        self.apply_stages(tasks, &FilterStage::PIPELINE)
    }

    /// Runs `stages` one after another, each narrowing the previous result.
    pub fn apply_stages<'a>(&self, tasks: &'a [Task], stages: &[FilterStage]) -> Vec<ViewEntry<'a>> {
        let mut entries: Vec<ViewEntry<'a>> = tasks
            .iter()
            .enumerate()
            .map(|(position, task)| ViewEntry { position, task })
            .collect();
        for stage in stages {
            entries.retain(|entry| stage.keeps(self, entry.task));
        }
        entries
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

/// A pending task is overdue once its due date lies strictly before `today`.
pub fn is_overdue(task: &Task, today: Date) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < today)
}

pub fn compute_stats(tasks: &[Task], today: Date) -> TaskStats {
    tasks.iter().fold(TaskStats::default(), |mut stats, task| {
        stats.total += 1;
        if task.completed {
            stats.completed += 1;
        } else {
            stats.pending += 1;
        }
        if is_overdue(task, today) {
            stats.overdue += 1;
        }
        stats
    })
}

/// Today's date on the local wall clock, or in UTC when the local offset
/// cannot be determined.
pub fn local_today() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}
