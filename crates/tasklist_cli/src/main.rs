use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, Write};
use tasklist_cli::cli::{Cli, Command, collect_overrides, take_config_overrides};
use tasklist_cli::render;
use tasklist_core::AppError;
use tasklist_core::config::{self, Config, Palette};
use tasklist_core::logging::init_logging;
use tasklist_core::model::{Task, TaskDraft};
use tasklist_core::storage::JsonFileStore;
use tasklist_core::task_api::{self, TaskSession};
use tasklist_core::view::{ViewFilter, local_today};
use tracing::{debug, warn};

/// Everything one invocation works on. The filter lives only as long as
/// the process.
struct Runtime {
    session: TaskSession<JsonFileStore>,
    config: Config,
    filter: ViewFilter,
    palette: Palette,
}

impl Runtime {
    fn open(config: Config) -> Result<Self, AppError> {
        let session = task_api::open_default(&config)?;
        debug!(path = %session.persistence().path().display(), "opened task store");
        let palette = config::palette_for_theme(config.theme.as_deref());
        Ok(Self {
            session,
            config,
            filter: ViewFilter::default(),
            palette,
        })
    }
}

fn build_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "falling back to default config");
        eprintln!("WARNING: {}", err);
    }
    let overrides = collect_overrides(raw_overrides)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

/// Expands an alias in the first word after any leading flags.
fn expand_aliases(config: &Config, args: Vec<String>) -> Vec<String> {
    let split = args
        .iter()
        .position(|arg| !arg.starts_with('-'))
        .unwrap_or(args.len());
    let mut args = args;
    let rest = args.split_off(split);
    args.extend(config.expand_alias(rest));
    args
}

fn print_task_message(
    runtime: &Runtime,
    json: bool,
    verb: &str,
    task: &Task,
) -> Result<(), AppError> {
    if json {
        let position = runtime.session.store().position(&task.id);
        println!("{}", render::task_json(task, position, local_today())?);
    } else {
        println!(
            "{verb} task: {} ({})",
            task.text,
            runtime.palette.mutedize(render::short_id(&task.id))
        );
    }
    Ok(())
}

fn print_no_match(json: bool, id: &str) {
    if json {
        println!("{}", serde_json::json!({ "matched": false, "id": id }));
    } else {
        println!("No task matched '{id}'");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_display_request(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
    println!("Interactive only: `n` or `new` asks for the text of a new task on the next line.");
}

fn run_command(runtime: &mut Runtime, cli: Cli) -> Result<(), AppError> {
    let json = cli.json;
    match cli.command {
        Command::Add {
            text,
            category,
            priority,
            due,
            notes,
        } => {
            let text = match text {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("text is required")),
            };

            let mut draft = TaskDraft::new(text);
            draft.category = category;
            draft.priority = priority;
            draft.due_date = due;
            draft.notes = notes;

            match runtime.session.create(draft)? {
                Some(task) => print_task_message(runtime, json, "Added", &task)?,
                None => return Err(AppError::invalid_input("text is required")),
            }
        }
        Command::Done { id } => {
            let id = runtime.session.resolve_id(&id)?;
            match runtime.session.toggle_complete(&id)? {
                Some(task) => {
                    let verb = if task.completed { "Completed" } else { "Reopened" };
                    print_task_message(runtime, json, verb, &task)?;
                }
                None => print_no_match(json, &id),
            }
        }
        Command::Star { id } => {
            let id = runtime.session.resolve_id(&id)?;
            match runtime.session.toggle_important(&id)? {
                Some(task) => {
                    let verb = if task.important { "Starred" } else { "Unstarred" };
                    print_task_message(runtime, json, verb, &task)?;
                }
                None => print_no_match(json, &id),
            }
        }
        Command::Edit { id, changes } => {
            let patch = changes.into_patch()?;
            let id = runtime.session.resolve_id(&id)?;
            match runtime.session.update(&id, patch)? {
                Some(task) => print_task_message(runtime, json, "Updated", &task)?,
                None => print_no_match(json, &id),
            }
        }
        Command::Delete { id } => {
            let id = runtime.session.resolve_id(&id)?;
            match runtime.session.delete(&id)? {
                Some(task) => print_task_message(runtime, json, "Deleted", &task)?,
                None => print_no_match(json, &id),
            }
        }
        Command::Move { from, to } => {
            let len = runtime.session.tasks().len();
            if from > len || to > len {
                return Err(AppError::invalid_input(format!(
                    "position out of range (the list has {len} tasks)"
                )));
            }
            let moved = runtime.session.reorder(from - 1, to - 1)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "moved": moved, "from": from, "to": to })
                );
            } else if moved {
                println!("Moved task from position {from} to {to}");
            } else {
                println!("Task is already at position {to}");
            }
        }
        Command::List(args) => {
            let filter = args.overlay(&runtime.filter);
            let entries = runtime.session.view(&filter);
            let today = local_today();
            if json {
                println!("{}", render::tasks_json(&entries, today)?);
            } else if entries.is_empty() {
                println!("No tasks to show");
            } else {
                println!("{}", render::tasks_table(&entries, today)?);
                if !filter.is_default() {
                    let summary = format!(
                        "{} of {} tasks | {}",
                        entries.len(),
                        runtime.session.tasks().len(),
                        render::filter_summary(&filter)
                    );
                    println!("{}", runtime.palette.mutedize(&summary));
                }
            }
        }
        Command::Stats => {
            let stats = runtime.session.stats();
            if json {
                println!("{}", render::stats_json(&stats)?);
            } else {
                println!("{}", render::stats_line(&stats, &runtime.palette));
            }
        }
        Command::Show { id } => {
            let id = runtime.session.resolve_id(&id)?;
            match runtime.session.find(&id) {
                Some(task) => {
                    let position = runtime.session.store().position(&task.id);
                    if json {
                        println!("{}", render::task_json(task, position, local_today())?);
                    } else {
                        println!("{}", render::task_details(task, local_today())?);
                    }
                }
                None => print_no_match(json, &id),
            }
        }
        Command::Filter(args) => {
            args.apply_to(&mut runtime.filter);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "search": runtime.filter.search,
                        "category": runtime.filter.category.to_string(),
                        "priority": runtime.filter.priority.to_string(),
                        "showCompleted": runtime.filter.show_completed,
                    })
                );
            } else {
                println!("{}", render::filter_summary(&runtime.filter));
            }
        }
    }

    Ok(())
}

fn read_line(stdin_lock: &mut impl BufRead, input: &mut String) -> Result<bool, AppError> {
    input.clear();
    let bytes = stdin_lock
        .read_line(input)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(bytes > 0)
}

fn add_from_prompt(runtime: &mut Runtime, stdin_lock: &mut impl BufRead) -> Result<(), AppError> {
    print!("New task: ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let mut text = String::new();
    if !read_line(stdin_lock, &mut text)? {
        println!();
        return Ok(());
    }

    match runtime.session.create(TaskDraft::new(text.trim()))? {
        Some(task) => print_task_message(runtime, false, "Added", &task),
        None => {
            println!("Nothing added");
            Ok(())
        }
    }
}

fn run_interactive(runtime: &mut Runtime) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    while read_line(&mut stdin_lock, &mut input)? {
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        if line.eq_ignore_ascii_case("n") || line.eq_ignore_ascii_case("new") {
            if let Err(err) = add_from_prompt(runtime, &mut stdin_lock) {
                eprintln!("ERROR: {}", err);
            }
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => expand_aliases(&runtime.config, args),
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_display_request(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(runtime, cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run(args: Vec<String>) -> Result<(), AppError> {
    let (args, raw_overrides) = take_config_overrides(args)?;
    let config = build_config(&raw_overrides)?;

    if args.is_empty() {
        let mut runtime = Runtime::open(config)?;
        return run_interactive(&mut runtime);
    }

    let args = expand_aliases(&config, args);
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("tasklist".to_string());
    argv.extend(args);

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if is_display_request(&err) => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };

    let mut runtime = Runtime::open(config)?;
    run_command(&mut runtime, cli)
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    if let Err(err) = run(args) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{expand_aliases, split_command_line};
    use tasklist_core::config::Config;

    #[test]
    fn split_command_line_groups_quoted_words() {
        let args = split_command_line(r#"add "Buy \"oat\" milk" --category shopping"#).unwrap();
        assert_eq!(args, vec!["add", "Buy \"oat\" milk", "--category", "shopping"]);
    }

    #[test]
    fn split_command_line_rejects_open_quote() {
        let err = split_command_line(r#"add "Buy milk"#).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn expand_aliases_skips_leading_flags() {
        let config = Config {
            aliases: [("w".to_string(), "list --category work".to_string())]
                .into_iter()
                .collect(),
            ..Config::default()
        };

        let expanded = expand_aliases(&config, vec!["--json".into(), "w".into()]);

        assert_eq!(expanded, vec!["--json", "list", "--category", "work"]);
    }
}
