//! Configuration retrieval
//!
//! Both configurations are read inside one session; the text is kept verbatim.

pub mod storage;

pub use storage::{persist_configs, StorageError, StoredConfigs};

use crate::logging::codes;
use crate::session::{DeviceSession, DeviceType, PlatformProfile, SessionError};
use crate::{log_debug, log_success};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which configuration a text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    Running,
    Startup,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigKind::Running => "running-config",
            ConfigKind::Startup => "startup-config",
        };
        f.write_str(name)
    }
}

/// Opaque configuration text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationText {
    kind: ConfigKind,
    text: String,
}

impl ConfigurationText {
    pub fn new(kind: ConfigKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> ConfigKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Running and startup configuration read in one session
#[derive(Debug, Clone)]
pub struct DeviceConfigs {
    pub running: ConfigurationText,
    pub startup: ConfigurationText,
}

/// Read both configurations over an open, privileged session
pub fn fetch_configs(
    session: &mut dyn DeviceSession,
    device_type: DeviceType,
) -> Result<DeviceConfigs, SessionError> {
    let profile = PlatformProfile::for_device(device_type);

    let running = fetch_one(session, profile.running_config_command, ConfigKind::Running)?;
    let startup = fetch_one(session, profile.startup_config_command, ConfigKind::Startup)?;

    log_success!(codes::success::CONFIGS_RETRIEVED, "Configurations retrieved",
        "host" => session.host(),
        "running_lines" => running.line_count(),
        "startup_lines" => startup.line_count()
    );

    Ok(DeviceConfigs { running, startup })
}

fn fetch_one(
    session: &mut dyn DeviceSession,
    command: &str,
    kind: ConfigKind,
) -> Result<ConfigurationText, SessionError> {
    log_debug!("Fetching configuration", "kind" => kind, "command" => command);
    let output = session.send_command(command)?;
    Ok(ConfigurationText::new(kind, output))
}
