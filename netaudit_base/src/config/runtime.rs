// RUNTIME CONFIGURATION (per audit)

use crate::comparison::CompareOptions;
use crate::hardening::{default_rules, HardeningRule, HardeningTemplate};
use crate::remediation::SyslogTarget;
use crate::session::{DeviceCredentials, DeviceType, SessionSettings};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::compile_time::comparison::DEFAULT_CONTEXT_LINES;

/// Environment variables consulted after the file is loaded
pub mod env_vars {
    pub const PASSWORD: &str = "NETAUDIT_PASSWORD";
    pub const SECRET: &str = "NETAUDIT_SECRET";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {reason}")]
    Validation { reason: String },
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Validation {
            reason: reason.into(),
        }
    }
}

/// Where retrieved configurations and the JSON report are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub running_file: String,
    pub startup_file: String,
    /// Optional JSON audit report
    pub result_json: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            running_file: "running_config.txt".to_string(),
            startup_file: "startup_config.txt".to_string(),
            result_json: None,
        }
    }
}

impl OutputSettings {
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn running_path(&self) -> PathBuf {
        self.directory.join(&self.running_file)
    }

    pub fn startup_path(&self) -> PathBuf {
        self.directory.join(&self.startup_file)
    }
}

/// Everything one audit run needs
///
/// Every section is optional in the TOML file; missing values fall back to
/// the built-in lab defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub device: DeviceCredentials,
    pub template: HardeningTemplate,
    pub syslog: SyslogTarget,
    pub rules: Vec<HardeningRule>,
    pub output: OutputSettings,
    pub session: SessionSettings,
    /// Lines of context around each diff hunk
    pub diff_context: usize,
    /// Skip the write phase entirely
    pub skip_syslog: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            device: DeviceCredentials::default(),
            template: HardeningTemplate::default(),
            syslog: SyslogTarget::default(),
            rules: default_rules(),
            output: OutputSettings::default(),
            session: SessionSettings::default(),
            diff_context: DEFAULT_CONTEXT_LINES,
            skip_syslog: false,
        }
    }
}

impl AuditConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `NETAUDIT_PASSWORD` / `NETAUDIT_SECRET` from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(env_vars::PASSWORD) {
            self.device.password = password;
        }
        if let Some(secret) = lookup(env_vars::SECRET) {
            self.device.secret = secret;
        }
    }

    /// Reject configurations that cannot produce a meaningful audit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.host.trim().is_empty() {
            return Err(ConfigError::invalid("device host is empty"));
        }
        if self.device.username.trim().is_empty() {
            return Err(ConfigError::invalid("device username is empty"));
        }
        if self.device.port == 0 {
            return Err(ConfigError::invalid("device port must be non-zero"));
        }
        if self.syslog.server.trim().is_empty() {
            return Err(ConfigError::invalid("syslog server is empty"));
        }
        if self.syslog.trap_level.trim().is_empty() || self.syslog.source_interface.trim().is_empty()
        {
            return Err(ConfigError::invalid(
                "syslog trap level and source interface must be set",
            ));
        }
        if self.rules.is_empty() {
            return Err(ConfigError::invalid("at least one hardening rule is required"));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "hardening rule #{} has an empty name",
                    index + 1
                )));
            }
            if rule.pattern.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "hardening rule '{}' has an empty pattern",
                    rule.name
                )));
            }
        }
        if self.output.running_file.is_empty() || self.output.startup_file.is_empty() {
            return Err(ConfigError::invalid("output file names must be set"));
        }
        if self.session.connect_timeout_ms == 0 || self.session.read_timeout_ms == 0 {
            return Err(ConfigError::invalid("session timeouts must be non-zero"));
        }
        Ok(())
    }

    pub fn comparison_options(&self) -> CompareOptions {
        CompareOptions::default().with_context_lines(self.diff_context)
    }

    pub fn with_device(mut self, device: DeviceCredentials) -> Self {
        self.device = device;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.device.host = host.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.device.username = username.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.device.port = port;
        self
    }

    pub fn with_device_type(mut self, device_type: DeviceType) -> Self {
        self.device.device_type = device_type;
        self
    }

    pub fn with_syslog_server(mut self, server: impl Into<String>) -> Self {
        self.syslog.server = server.into();
        self
    }

    pub fn with_rules(mut self, rules: Vec<HardeningRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_template(mut self, text: impl Into<String>) -> Self {
        self.template = HardeningTemplate::new(text);
        self
    }

    pub fn with_output_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }

    pub fn with_result_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.result_json = Some(path.into());
        self
    }

    pub fn with_skip_syslog(mut self, skip: bool) -> Self {
        self.skip_syslog = skip;
        self
    }

    pub fn with_diff_context(mut self, lines: usize) -> Self {
        self.diff_context = lines;
        self
    }
}
