mod config;
pub mod migrations;
pub mod store;

pub use config::Config;
pub use store::{ScheduleStore, TaskFilter, TaskSort};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/busybee[-dev]/` based on BUSYBEE_ENV.
///
/// Set BUSYBEE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BUSYBEE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("busybee-dev")
    } else {
        base_dir.join("busybee")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
