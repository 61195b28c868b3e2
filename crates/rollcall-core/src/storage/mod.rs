mod config;
pub mod state;
pub mod store;

pub use config::{
    ChannelsConfig, CheckinConfig, Config, ReportConfig, ScheduleConfig, MAX_REPORT_DAYS,
};
pub use state::{AttendanceLog, AttendanceState};
pub use store::{JsonFileStore, MemoryStore, StateStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `ROLLCALL_HOME` wins outright. Otherwise `~/.config/rollcall[-dev]/`,
/// with `ROLLCALL_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ROLLCALL_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ROLLCALL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("rollcall-dev")
            } else {
                base_dir.join("rollcall")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
