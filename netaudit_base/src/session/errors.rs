//! Session error types

use crate::logging::codes::{self, Code};

/// Remote CLI session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Connection to {address} failed: {reason}")]
    ConnectFailed { address: String, reason: String },

    #[error("SSH handshake with {address} failed: {reason}")]
    HandshakeFailed { address: String, reason: String },

    #[error("Authentication failed for user '{username}'")]
    AuthenticationFailed { username: String },

    #[error("Could not enter privileged mode: {reason}")]
    EnableFailed { reason: String },

    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Timed out after {timeout_ms}ms waiting for {waiting_for}")]
    Timeout { timeout_ms: u64, waiting_for: String },

    #[error("Output of '{command}' exceeded {limit} bytes")]
    OutputTooLarge { command: String, limit: usize },

    #[error("Session is closed")]
    Closed,

    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Log code for this error
    pub fn log_code(&self) -> Code {
        match self {
            SessionError::ConnectFailed { .. } | SessionError::HandshakeFailed { .. } => {
                codes::session::CONNECT_FAILED
            }
            SessionError::AuthenticationFailed { .. } => codes::session::AUTHENTICATION_FAILED,
            SessionError::EnableFailed { .. } => codes::session::ENABLE_FAILED,
            SessionError::Timeout { .. } => codes::session::SESSION_TIMEOUT,
            SessionError::CommandFailed { .. }
            | SessionError::OutputTooLarge { .. }
            | SessionError::Closed
            | SessionError::Ssh(_)
            | SessionError::Io(_) => codes::session::COMMAND_FAILED,
        }
    }

    pub fn command_failed(command: &str, reason: impl Into<String>) -> Self {
        SessionError::CommandFailed {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}
