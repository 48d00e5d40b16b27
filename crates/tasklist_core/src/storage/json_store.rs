use crate::error::AppError;
use crate::model::Task;
use crate::storage::{STORE_KEY, TaskPersistence, decode_tasks, encode_tasks};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STORE_ENV_VAR: &str = "TASKLIST_STORE_PATH";
const APP_DIR_NAME: &str = "tasklist";

/// Resolves where the list lives: the env override first, then a path from
/// configuration, then the per-user default.
pub fn store_path(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    default_store_path()
}

fn default_store_path() -> Result<PathBuf, AppError> {
    let file_name = format!("{STORE_KEY}.json");
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME).join(file_name))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(file_name))
    }
}

/// File-backed store: one JSON file holds the value of the single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskPersistence for JsonFileStore {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored tasks yet");
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(AppError::io(format!("{}: {}", self.path.display(), err)));
            }
        };

        let source = self.path.display().to_string();
        Ok(decode_tasks(&content, &source))
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
        }

        let content = encode_tasks(tasks)?;
        std::fs::write(&self.path, content)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}
