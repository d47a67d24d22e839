//! # Audit Errors

use crate::config::ConfigError;
use crate::logging::codes::{self, Code};
use crate::results::ReportError;
use crate::retrieval::StorageError;
use crate::session::SessionError;

/// Fatal errors of an audit run
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Session establishment or read-phase failure
    #[error("Connection error: {0}")]
    Connection(#[source] SessionError),

    /// Failure while pushing configuration
    #[error("Config push error: {0}")]
    ConfigPush(#[source] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Console output could not be written
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl AuditError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Log code for this error
    pub fn log_code(&self) -> Code {
        match self {
            AuditError::Connection(e) => e.log_code(),
            AuditError::ConfigPush(_) => codes::remediation::CONFIG_PUSH_FAILED,
            AuditError::Storage(_) => codes::storage::WRITE_FAILED,
            AuditError::Configuration(ConfigError::Read { .. }) => codes::config::CONFIG_READ_FAILED,
            AuditError::Configuration(ConfigError::Parse(_)) => codes::config::CONFIG_PARSE_FAILED,
            AuditError::Configuration(ConfigError::Validation { .. }) => {
                codes::config::CONFIG_INVALID
            }
            AuditError::Report(_) => codes::storage::REPORT_WRITE_FAILED,
            AuditError::Output(_) => codes::system::INTERNAL_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AuditError::Connection(e) => format!("Error connecting to the device: {}", e),
            AuditError::ConfigPush(e) => format!("Error configuring syslog: {}", e),
            AuditError::Storage(e) => format!("Error storing configurations: {}", e),
            AuditError::Configuration(e) => format!("Invalid audit configuration: {}", e),
            AuditError::Report(e) => format!("Error producing audit report: {}", e),
            AuditError::Output(e) => format!("Error writing output: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_every_error_exits_with_one() {
        let errors = vec![
            AuditError::Connection(SessionError::Closed),
            AuditError::ConfigPush(SessionError::command_failed("logging on", "% Invalid input")),
            AuditError::Configuration(ConfigError::Validation {
                reason: "device host is empty".to_string(),
            }),
        ];
        for error in errors {
            assert_eq!(error.exit_code(), 1);
        }
    }

    #[test]
    fn test_log_codes() {
        let err = AuditError::Connection(SessionError::AuthenticationFailed {
            username: "prne".to_string(),
        });
        assert_eq!(err.log_code(), codes::session::AUTHENTICATION_FAILED);

        let err = AuditError::ConfigPush(SessionError::Closed);
        assert_eq!(err.log_code(), codes::remediation::CONFIG_PUSH_FAILED);
    }

    #[test]
    fn test_user_messages() {
        let err = AuditError::Connection(SessionError::ConnectFailed {
            address: "10.0.0.1:22".to_string(),
            reason: "connection refused".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "Error connecting to the device: Connection to 10.0.0.1:22 failed: connection refused"
        );

        let err = AuditError::from(ConfigError::Validation {
            reason: "syslog server is empty".to_string(),
        });
        assert_matches!(err, AuditError::Configuration(_));
        assert_eq!(err.log_code(), codes::config::CONFIG_INVALID);
    }
}
