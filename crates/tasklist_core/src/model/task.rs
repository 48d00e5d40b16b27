use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        default,
        with = "super::date::optional_calendar_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
}

impl Task {
    /// `completed_at` is present exactly when the task is completed.
    pub fn completion_consistent(&self) -> bool {
        self.completed == self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Inbox,
    Work,
    Personal,
    Shopping,
    Health,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Inbox,
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Health,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Inbox => "inbox",
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Shopping => "shopping",
            Category::Health => "health",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Inbox => "📥 Inbox",
            Category::Work => "💼 Work",
            Category::Personal => "🏠 Personal",
            Category::Shopping => "🛒 Shopping",
            Category::Health => "❤️ Health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "unknown category '{wanted}' (expected inbox, work, personal, shopping or health)"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "unknown priority '{wanted}' (expected low, medium or high)"
                ))
            })
    }
}

/// Caller input for a new task. Missing metadata falls back to the
/// `Category` and `Priority` defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<Date>,
    pub notes: Option<String>,
}

impl TaskDraft {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: Date) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn notes<T: Into<String>>(mut self, notes: T) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial field set merged into an existing task.
///
/// `due_date` and `notes` use a nested `Option`: `Some(None)` clears the
/// field, `None` leaves it alone. Completion and importance are not part of
/// a patch; they only change through their toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<Date>>,
    pub notes: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Priority, Task, TaskPatch};
    use time::macros::datetime;

    fn sample() -> Task {
        Task {
            id: "task-1".to_string(),
            text: "demo".to_string(),
            completed: false,
            important: false,
            category: Category::default(),
            priority: Priority::default(),
            due_date: None,
            notes: None,
            created_at: datetime!(2025-12-20 00:00 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn defaults_match_new_task_form() {
        assert_eq!(Category::default(), Category::Inbox);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn category_and_priority_parse_case_insensitively() {
        assert_eq!("Shopping".parse::<Category>().unwrap(), Category::Shopping);
        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("errands".parse::<Category>().unwrap_err().code(), "invalid_input");
        assert_eq!("urgent".parse::<Priority>().unwrap_err().code(), "invalid_input");
    }

    #[test]
    fn serializes_with_camel_case_keys_and_omits_absent_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["createdAt"], "2025-12-20T00:00:00Z");
        assert_eq!(object["category"], "inbox");
        assert_eq!(object["priority"], "medium");
        assert!(!object.contains_key("dueDate"));
        assert!(!object.contains_key("notes"));
        assert!(!object.contains_key("completedAt"));
    }

    #[test]
    fn reads_blank_due_date_as_absent() {
        let raw = r#"{
            "id": "task-1",
            "text": "demo",
            "completed": false,
            "important": true,
            "category": "work",
            "priority": "high",
            "dueDate": "",
            "notes": "",
            "createdAt": "2025-12-20T08:15:00.000Z"
        }"#;

        let task: Task = serde_json::from_str(raw).unwrap();

        assert_eq!(task.due_date, None);
        assert!(task.important);
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.notes.as_deref(), Some(""));
    }

    #[test]
    fn completion_consistent_checks_pairing() {
        let mut task = sample();
        assert!(task.completion_consistent());

        task.completed = true;
        assert!(!task.completion_consistent());

        task.completed_at = Some(datetime!(2025-12-21 09:00 UTC));
        assert!(task.completion_consistent());
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            notes: Some(None),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
