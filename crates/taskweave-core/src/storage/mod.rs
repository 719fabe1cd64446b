mod config;
pub mod state;

pub use config::{
    AnalysisConfig, CalendarConfig, Config, HttpConfig, ListsConfig, MarkersConfig,
    ScheduleConfig, TasksConfig,
};
pub use state::StateStore;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns `~/.config/taskweave[-dev]/` based on TASKWEAVE_ENV, or
/// `override_dir` when given.
///
/// Set TASKWEAVE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TASKWEAVE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("taskweave-dev")
            } else {
                base_dir.join("taskweave")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!(
        "{}: {e}",
        dir.display()
    )))?;
    Ok(dir)
}

/// Path of the task/event mapping snapshot inside `dir`.
pub fn state_path_in(dir: &Path) -> PathBuf {
    dir.join("state.json")
}
