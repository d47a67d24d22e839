//! Persisting retrieved configurations

use super::DeviceConfigs;
use crate::config::runtime::OutputSettings;
use crate::log_success;
use crate::logging::codes;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[error("Failed to write {}: {source}", .path.display())]
pub struct StorageError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Paths the configurations were written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredConfigs {
    pub running: PathBuf,
    pub startup: PathBuf,
}

/// Write both configurations, overwriting existing files
pub fn persist_configs(
    configs: &DeviceConfigs,
    output: &OutputSettings,
) -> Result<StoredConfigs, StorageError> {
    fs::create_dir_all(&output.directory).map_err(|source| StorageError {
        path: output.directory.clone(),
        source,
    })?;

    let stored = StoredConfigs {
        running: output.running_path(),
        startup: output.startup_path(),
    };
    write_text(&stored.running, configs.running.as_str())?;
    write_text(&stored.startup, configs.startup.as_str())?;

    log_success!(codes::success::CONFIGS_STORED, "Configurations stored",
        "running" => stored.running.display(),
        "startup" => stored.startup.display()
    );
    Ok(stored)
}

fn write_text(path: &Path, text: &str) -> Result<(), StorageError> {
    fs::write(path, text).map_err(|source| StorageError {
        path: path.to_path_buf(),
        source,
    })
}
