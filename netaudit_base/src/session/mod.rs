//! Remote CLI sessions
//!
//! `SessionConnector` opens sessions, `DeviceSession` is the per-connection
//! command surface. `with_session` scopes one session: it connects, enters
//! privileged mode, runs the caller's work and always disconnects.

pub mod credentials;
pub mod errors;
pub mod mock;
pub mod platform;
pub mod prompt;
pub mod shell;
pub mod ssh;

pub use credentials::{DeviceCredentials, DeviceType};
pub use errors::SessionError;
pub use mock::{MockConnector, MockEvent, MockSession};
pub use platform::PlatformProfile;
pub use shell::{ShellSession, ShellStream};
pub use ssh::{SshConnector, SshDeviceSession, SshStream};

use crate::config::compile_time::session::{CONNECT_TIMEOUT_MS, READ_TIMEOUT_MS};
use crate::logging::codes;
use crate::{log_debug, log_success, log_warning};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An open, authenticated CLI session to one device
pub trait DeviceSession {
    /// Host this session is connected to
    fn host(&self) -> &str;

    /// Enter privileged mode; a no-op when already privileged
    fn enable(&mut self) -> Result<(), SessionError>;

    /// Run one command and return its output verbatim
    fn send_command(&mut self, command: &str) -> Result<String, SessionError>;

    /// Enter configuration mode, send every command in order, leave
    /// configuration mode. Returns the combined device output; a line the
    /// device rejects does not stop the remaining lines.
    fn send_config_set(&mut self, commands: &[String]) -> Result<String, SessionError>;

    /// Close the session. Calling it twice is harmless.
    fn disconnect(&mut self) -> Result<(), SessionError>;
}

/// Opens authenticated sessions
pub trait SessionConnector {
    fn connect(
        &self,
        credentials: &DeviceCredentials,
    ) -> Result<Box<dyn DeviceSession>, SessionError>;

    /// Identifier for logs
    fn connector_id(&self) -> &str;
}

/// Transport timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            read_timeout_ms: READ_TIMEOUT_MS,
        }
    }
}

impl SessionSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Run `work` inside one scoped session
///
/// Connection and enable failures are returned as `SessionError` converted
/// into `E`. The session is disconnected on every path once it was opened; an
/// error from `work` takes precedence over a disconnect error, which is only
/// logged.
pub fn with_session<T, E, F>(
    connector: &dyn SessionConnector,
    credentials: &DeviceCredentials,
    work: F,
) -> Result<T, E>
where
    E: From<SessionError>,
    F: FnOnce(&mut dyn DeviceSession) -> Result<T, E>,
{
    log_debug!("Opening session",
        "connector" => connector.connector_id(),
        "address" => credentials.address()
    );

    let mut session = connector.connect(credentials)?;

    if let Err(e) = session.enable() {
        close_quietly(session.as_mut());
        return Err(e.into());
    }

    log_success!(codes::success::SESSION_ESTABLISHED, "Session established",
        "host" => session.host(),
        "device_type" => credentials.device_type
    );

    let result = work(session.as_mut());
    close_quietly(session.as_mut());
    result
}

fn close_quietly(session: &mut dyn DeviceSession) {
    match session.disconnect() {
        Ok(()) => {
            log_success!(codes::success::SESSION_CLOSED, "Session closed",
                "host" => session.host()
            );
        }
        Err(e) => {
            log_warning!("Session did not close cleanly",
                "host" => session.host(),
                "code" => codes::session::DISCONNECT_FAILED,
                "error" => e
            );
        }
    }
}
