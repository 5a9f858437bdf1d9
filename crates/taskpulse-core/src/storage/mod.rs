mod config;
pub mod repository;
pub mod store;

pub use config::{Config, DisplayConfig, RiskConfig};
pub use repository::{AppData, Repository, STORAGE_KEY};
pub use store::{BlobStore, FileStore, MemoryStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory.
///
/// `TASKPULSE_DATA_DIR` wins when set. Otherwise `~/.config/taskpulse[-dev]/`
/// based on `TASKPULSE_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TASKPULSE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TASKPULSE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("taskpulse-dev")
            } else {
                base_dir.join("taskpulse")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
