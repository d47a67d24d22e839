//! Runtime logging preferences
//!
//! Preferences come from the environment by default and can be overridden by
//! the CLI before the global service is initialized.

use super::events::LogLevel;
use std::env;

/// Environment variable names for logging preferences
pub mod env_vars {
    pub const LOG_LEVEL: &str = "NETAUDIT_LOG_LEVEL";
    pub const LOG_STRUCTURED: &str = "NETAUDIT_LOG_STRUCTURED";
}

/// Where log events are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogBackend {
    /// JSON lines on stderr
    Structured,
    /// Forward to the `log` facade (the CLI installs env_logger)
    LogFacade,
}

#[derive(Debug, Clone)]
pub struct LoggingPreferences {
    pub min_log_level: LogLevel,
    pub backend: LogBackend,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        let structured = env::var(env_vars::LOG_STRUCTURED)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Self {
            min_log_level: env::var(env_vars::LOG_LEVEL)
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            backend: if structured {
                LogBackend::Structured
            } else {
                LogBackend::LogFacade
            },
        }
    }
}

impl LoggingPreferences {
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_log_level = level;
        self
    }

    pub fn with_backend(mut self, backend: LogBackend) -> Self {
        self.backend = backend;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let prefs = LoggingPreferences::default()
            .with_min_level(LogLevel::Debug)
            .with_backend(LogBackend::Structured);

        assert_eq!(prefs.min_log_level, LogLevel::Debug);
        assert_eq!(prefs.backend, LogBackend::Structured);
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(!env_vars::LOG_LEVEL.is_empty());
        assert!(!env_vars::LOG_STRUCTURED.is_empty());
    }
}
