use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tasklist_core::AppError;
use tasklist_core::config::ConfigOverrides;
use tasklist_core::model::{Category, Priority, TaskPatch, parse_due_date};
use tasklist_core::view::{Selection, ViewFilter};
use time::Date;

#[derive(Parser, Debug)]
#[command(name = "tasklist", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk" --category shopping --priority high
    Add {
        text: Option<String>,
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        due: Option<Date>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Toggle whether a task is completed
    ///
    /// Example: tasklist done 3f2a
    Done { id: String },
    /// Toggle whether a task is marked important
    ///
    /// Example: tasklist star 3f2a
    Star { id: String },
    /// Edit fields of a task
    ///
    /// Example: tasklist edit 3f2a --text "Buy oat milk" --due 2025-12-24
    /// Example: tasklist edit 3f2a --clear-notes
    Edit {
        id: String,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete a task
    ///
    /// Example: tasklist delete 3f2a
    Delete { id: String },
    /// Move a task to another position (positions start at 1)
    ///
    /// Example: tasklist move 1 3
    Move {
        #[arg(value_parser = parse_position)]
        from: usize,
        #[arg(value_parser = parse_position)]
        to: usize,
    },
    /// List tasks through the current filter
    ///
    /// Example: tasklist list --category work --hide-completed
    List(ListArgs),
    /// Show task counters
    ///
    /// Example: tasklist stats
    Stats,
    /// Show details of a task
    ///
    /// Example: tasklist show 3f2a
    Show { id: String },
    /// Change the filter used by `list` for the rest of the session
    ///
    /// Example: tasklist filter --priority high --show-completed false
    /// Example: tasklist filter --reset
    Filter(FilterArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct EditArgs {
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date, conflicts_with = "clear_due")]
    pub due: Option<Date>,
    #[arg(long)]
    pub clear_due: bool,
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,
    #[arg(long)]
    pub clear_notes: bool,
}

impl EditArgs {
    /// Builds the patch for these flags. Blank text is refused here rather
    /// than silently ignored further down.
    pub fn into_patch(self) -> Result<TaskPatch, AppError> {
        if let Some(text) = self.text.as_deref()
            && text.trim().is_empty()
        {
            return Err(AppError::invalid_input("text cannot be blank"));
        }

        let due_date = if self.clear_due {
            Some(None)
        } else {
            self.due.map(Some)
        };
        let notes = if self.clear_notes {
            Some(None)
        } else {
            self.notes.map(Some)
        };

        let patch = TaskPatch {
            text: self.text,
            category: self.category,
            priority: self.priority,
            due_date,
            notes,
        };
        if patch.is_empty() {
            return Err(AppError::invalid_input("nothing to change"));
        }
        Ok(patch)
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_name = "CATEGORY|all", value_parser = parse_category_selection)]
    pub category: Option<Selection<Category>>,
    #[arg(long, value_name = "PRIORITY|all", value_parser = parse_priority_selection)]
    pub priority: Option<Selection<Priority>>,
    #[arg(long)]
    pub hide_completed: bool,
}

impl ListArgs {
    /// The filter for one listing: `base` with these flags laid over it.
    pub fn overlay(&self, base: &ViewFilter) -> ViewFilter {
        let mut filter = base.clone();
        if let Some(search) = &self.search {
            filter.search = search.clone();
        }
        if let Some(category) = self.category {
            filter.category = category;
        }
        if let Some(priority) = self.priority {
            filter.priority = priority;
        }
        if self.hide_completed {
            filter.show_completed = false;
        }
        filter
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_name = "CATEGORY|all", value_parser = parse_category_selection)]
    pub category: Option<Selection<Category>>,
    #[arg(long, value_name = "PRIORITY|all", value_parser = parse_priority_selection)]
    pub priority: Option<Selection<Priority>>,
    #[arg(long, value_name = "BOOL")]
    pub show_completed: Option<bool>,
    /// Clear every filter before applying the other flags
    #[arg(long)]
    pub reset: bool,
}

impl FilterArgs {
    pub fn apply_to(&self, filter: &mut ViewFilter) {
        if self.reset {
            filter.reset();
        }
        let overlaid = ListArgs {
            search: self.search.clone(),
            category: self.category,
            priority: self.priority,
            hide_completed: false,
        }
        .overlay(filter);
        *filter = overlaid;
        if let Some(show) = self.show_completed {
            filter.show_completed = show;
        }
    }
}

fn parse_category(raw: &str) -> Result<Category, String> {
    raw.parse().map_err(|err: AppError| err.message().to_string())
}

fn parse_priority(raw: &str) -> Result<Priority, String> {
    raw.parse().map_err(|err: AppError| err.message().to_string())
}

fn parse_category_selection(raw: &str) -> Result<Selection<Category>, String> {
    raw.parse().map_err(|err: AppError| err.message().to_string())
}

fn parse_priority_selection(raw: &str) -> Result<Selection<Priority>, String> {
    raw.parse().map_err(|err: AppError| err.message().to_string())
}

fn parse_date(raw: &str) -> Result<Date, String> {
    parse_due_date(raw).map_err(|err| err.message().to_string())
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(position) => Ok(position),
        Err(_) => Err(format!("'{raw}' is not a position")),
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => {
            if remainder.is_some() {
                return Err("theme override cannot have subfields".to_string());
            }
            ConfigOverrideTarget::Theme
        }
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            ConfigOverrideTarget::Alias(alias_name.to_string())
        }
        "store_path" | "store" => {
            if remainder.is_some() {
                return Err("store_path override cannot have subfields".to_string());
            }
            if value.is_empty() {
                return Err("store_path override requires a path".to_string());
            }
            ConfigOverrideTarget::StorePath
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Parses every raw override and folds them, last one winning.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value));
            }
        }
    }
    Ok(overrides)
}

/// Pulls `--config-override` values out of raw arguments, returning the
/// remaining arguments and the override strings in order.
pub fn take_config_overrides(args: Vec<String>) -> Result<(Vec<String>, Vec<String>), AppError> {
    let prefixed = format!("{CONFIG_OVERRIDE_FLAG}=");
    let mut rest = Vec::with_capacity(args.len());
    let mut overrides = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == CONFIG_OVERRIDE_FLAG {
            let value = iter.next().ok_or_else(|| {
                AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG} requires a KEY=VALUE"))
            })?;
            overrides.push(value);
        } else if let Some(value) = arg.strip_prefix(&prefixed) {
            overrides.push(value.to_string());
        } else {
            rest.push(arg);
        }
    }

    Ok((rest, overrides))
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
