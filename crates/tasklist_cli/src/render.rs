use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::AppError;
use tasklist_core::config::Palette;
use tasklist_core::model::{Task, format_due_date};
use tasklist_core::view::{TaskStats, ViewEntry, ViewFilter, is_overdue};
use time::Date;
use time::format_description::well_known::Rfc3339;

const SHORT_ID_LEN: usize = 8;

/// Leading characters of an id, enough to address a task from the prompt.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "done")]
    done: &'static str,
    #[tabled(rename = "!")]
    important: &'static str,
    #[tabled(rename = "task")]
    text: String,
    #[tabled(rename = "category")]
    category: &'static str,
    #[tabled(rename = "priority")]
    priority: &'static str,
    #[tabled(rename = "due")]
    due: String,
}

fn due_label(task: &Task, today: Date) -> Result<String, AppError> {
    let Some(due) = task.due_date else {
        return Ok("-".to_string());
    };
    let formatted = format_due_date(due)?;
    if is_overdue(task, today) {
        Ok(format!("{formatted} (overdue)"))
    } else {
        Ok(formatted)
    }
}

pub fn tasks_table(entries: &[ViewEntry<'_>], today: Date) -> Result<String, AppError> {
    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let task = entry.task;
        rows.push(TaskRow {
            position: entry.position + 1,
            id: short_id(&task.id).to_string(),
            done: if task.completed { "x" } else { "" },
            important: if task.important { "*" } else { "" },
            text: task.text.clone(),
            category: task.category.label(),
            priority: task.priority.label(),
            due: due_label(task, today)?,
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    Ok(table.to_string())
}

pub fn task_details(task: &Task, today: Date) -> Result<String, AppError> {
    let created = task
        .created_at
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    let mut lines = vec![
        format!("id:        {}", task.id),
        format!("task:      {}", task.text),
        format!("status:    {}", if task.completed { "completed" } else { "pending" }),
        format!("important: {}", if task.important { "yes" } else { "no" }),
        format!("category:  {}", task.category.label()),
        format!("priority:  {}", task.priority.label()),
        format!("due:       {}", due_label(task, today)?),
        format!("created:   {created}"),
    ];
    if let Some(completed_at) = task.completed_at {
        let completed = completed_at
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        lines.push(format!("completed: {completed}"));
    }
    if let Some(notes) = task.notes.as_deref() {
        lines.push(format!("notes:     {notes}"));
    }
    Ok(lines.join("\n"))
}

pub fn stats_line(stats: &TaskStats, palette: &Palette) -> String {
    let overdue = format!("{} overdue", stats.overdue);
    let overdue = if stats.overdue > 0 {
        palette.alertize(&overdue)
    } else {
        overdue
    };
    format!(
        "{} total | {} completed | {} pending | {}",
        palette.accentize(&stats.total.to_string()),
        stats.completed,
        stats.pending,
        overdue
    )
}

pub fn filter_summary(filter: &ViewFilter) -> String {
    if filter.is_default() {
        return "Showing all tasks".to_string();
    }
    let search = if filter.search.is_empty() {
        "-".to_string()
    } else {
        format!("\"{}\"", filter.search)
    };
    format!(
        "search: {search} | category: {} | priority: {} | completed: {}",
        filter.category,
        filter.priority,
        if filter.show_completed { "shown" } else { "hidden" }
    )
}

/// The stored task fields plus where the task sits and whether it is late.
pub fn task_json(
    task: &Task,
    position: Option<usize>,
    today: Date,
) -> Result<serde_json::Value, AppError> {
    let mut value =
        serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    if let Some(object) = value.as_object_mut() {
        if let Some(position) = position {
            object.insert("position".to_string(), serde_json::json!(position + 1));
        }
        object.insert(
            "overdue".to_string(),
            serde_json::Value::Bool(is_overdue(task, today)),
        );
    }
    Ok(value)
}

pub fn tasks_json(entries: &[ViewEntry<'_>], today: Date) -> Result<serde_json::Value, AppError> {
    let mut payload = Vec::with_capacity(entries.len());
    for entry in entries {
        payload.push(task_json(entry.task, Some(entry.position), today)?);
    }
    Ok(serde_json::Value::Array(payload))
}

pub fn stats_json(stats: &TaskStats) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(stats).map_err(|err| AppError::invalid_data(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{filter_summary, short_id, stats_line, task_details, task_json, tasks_table};
    use tasklist_core::config::palette_for_theme;
    use tasklist_core::model::{Category, Priority, Task};
    use tasklist_core::view::{Selection, TaskStats, ViewEntry, ViewFilter};
    use time::macros::{date, datetime};

    fn sample() -> Task {
        Task {
            id: "0f8fad5b-d9cb-469f-a165-70867728950e".to_string(),
            text: "Buy milk".to_string(),
            completed: false,
            important: true,
            category: Category::Shopping,
            priority: Priority::High,
            due_date: Some(date!(2025-12-19)),
            notes: Some("oat".to_string()),
            created_at: datetime!(2025-12-01 09:30 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn short_id_truncates_long_ids_only() {
        assert_eq!(short_id("0f8fad5b-d9cb"), "0f8fad5b");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn table_lists_rows_with_positions_and_overdue_marker() {
        let task = sample();
        let entries = [ViewEntry {
            position: 2,
            task: &task,
        }];

        let table = tasks_table(&entries, date!(2025-12-20)).unwrap();

        assert!(table.contains("Buy milk"));
        assert!(table.contains("0f8fad5b"));
        assert!(table.contains("2025-12-19 (overdue)"));
        assert!(table.contains(" 3 "));
    }

    #[test]
    fn details_include_optional_fields() {
        let details = task_details(&sample(), date!(2025-12-10)).unwrap();

        assert!(details.contains("notes:     oat"));
        assert!(details.contains("due:       2025-12-19"));
        assert!(!details.contains("overdue"));
        assert!(!details.contains("completed:"));
    }

    #[test]
    fn json_adds_position_and_overdue() {
        let value = task_json(&sample(), Some(0), date!(2025-12-20)).unwrap();

        assert_eq!(value["position"], 1);
        assert_eq!(value["overdue"], true);
        assert_eq!(value["dueDate"], "2025-12-19");
        assert_eq!(value["category"], "shopping");
        assert!(value.get("completedAt").is_none());
    }

    #[test]
    fn stats_line_plain_palette() {
        let stats = TaskStats {
            total: 3,
            completed: 1,
            pending: 2,
            overdue: 1,
        };
        let line = stats_line(&stats, &palette_for_theme(None));
        assert_eq!(line, "3 total | 1 completed | 2 pending | 1 overdue");
    }

    #[test]
    fn filter_summary_describes_active_filters() {
        assert_eq!(filter_summary(&ViewFilter::default()), "Showing all tasks");

        let filter = ViewFilter {
            search: "milk".into(),
            priority: Selection::Only(Priority::High),
            show_completed: false,
            ..ViewFilter::default()
        };
        assert_eq!(
            filter_summary(&filter),
            "search: \"milk\" | category: all | priority: high | completed: hidden"
        );
    }
}
