use std::path::Path;
use std::process::{Command, Output};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(args)
        .env("TASKLIST_STORE_PATH", dir.join("todos.json"))
        .env("TASKLIST_CONFIG_PATH", dir.join("config.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tasklist")
}

fn read_store(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join("todos.json")).expect("store file");
    serde_json::from_str(&content).expect("store json")
}

#[test]
fn add_command_stores_task_with_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Buy milk"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk"));

    let stored = read_store(dir.path());
    let tasks = stored.as_array().expect("plain array");
    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task["text"], "Buy milk");
    assert_eq!(task["completed"], false);
    assert_eq!(task["important"], false);
    assert_eq!(task["category"], "inbox");
    assert_eq!(task["priority"], "medium");
    assert!(task.get("dueDate").is_none());
    assert!(task.get("notes").is_none());
    assert!(task.get("completedAt").is_none());
    OffsetDateTime::parse(task["createdAt"].as_str().expect("createdAt"), &Rfc3339)
        .expect("createdAt rfc3339");
}

#[test]
fn add_command_json_includes_metadata() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(
        dir.path(),
        &[
            "--json",
            "add",
            "  Write report  ",
            "--category",
            "work",
            "--priority",
            "HIGH",
            "--due",
            "2999-01-31",
            "--notes",
            "  quarterly  ",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["text"], "Write report");
    assert_eq!(parsed["category"], "work");
    assert_eq!(parsed["priority"], "high");
    assert_eq!(parsed["dueDate"], "2999-01-31");
    assert_eq!(parsed["notes"], "quarterly");
    assert_eq!(parsed["position"], 1);
    assert_eq!(parsed["overdue"], false);
    assert!(parsed["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[test]
fn add_command_appends_in_creation_order() {
    let dir = tempfile::tempdir().unwrap();

    for text in ["first", "second", "third"] {
        assert!(run(dir.path(), &["add", text]).status.success());
    }

    let stored = read_store(dir.path());
    let texts: Vec<&str> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[test]
fn add_command_rejects_blank_text() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "   "]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - text is required"));
    assert!(!dir.path().join("todos.json").exists());
}

#[test]
fn add_command_rejects_unknown_category_and_bad_date() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "x", "--category", "garden"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));

    let output = run(dir.path(), &["add", "x", "--due", "tomorrow"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));

    assert!(!dir.path().join("todos.json").exists());
}

#[test]
fn config_override_selects_store_path() {
    let dir = tempfile::tempdir().unwrap();
    let other = dir.path().join("nested").join("other.json");
    let override_arg = format!("store_path={}", other.display());

    let output = Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(["--config-override", &override_arg, "add", "elsewhere"])
        .env_remove("TASKLIST_STORE_PATH")
        .env("TASKLIST_CONFIG_PATH", dir.path().join("config.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tasklist");

    assert!(output.status.success());
    let content = std::fs::read_to_string(&other).expect("override store written");
    assert!(content.contains("elsewhere"));
}

#[test]
fn unknown_config_override_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["--config-override", "colour=red", "stats"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown config field 'colour'"));
}
