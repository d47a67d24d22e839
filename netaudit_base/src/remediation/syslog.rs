//! Remote syslog enablement

use crate::logging::codes;
use crate::session::{DeviceSession, SessionError};
use crate::{log_debug, log_success};
use serde::{Deserialize, Serialize};

/// Syslog server and the logging options pushed with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogTarget {
    pub server: String,
    pub trap_level: String,
    pub source_interface: String,
}

impl Default for SyslogTarget {
    fn default() -> Self {
        Self {
            server: "192.168.1.100".to_string(),
            trap_level: "informational".to_string(),
            source_interface: "Vlan1".to_string(),
        }
    }
}

impl SyslogTarget {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }

    pub fn with_trap_level(mut self, level: impl Into<String>) -> Self {
        self.trap_level = level.into();
        self
    }

    pub fn with_source_interface(mut self, interface: impl Into<String>) -> Self {
        self.source_interface = interface.into();
        self
    }

    /// Configuration lines, in push order
    pub fn commands(&self) -> Vec<String> {
        vec![
            format!("logging {}", self.server),
            format!("logging trap {}", self.trap_level),
            format!("logging source-interface {}", self.source_interface),
            "logging on".to_string(),
        ]
    }

    /// Push the commands as one configuration transaction
    ///
    /// The device reply is not inspected line by line; any transport or CLI
    /// rejection surfaces as the returned error.
    pub fn apply(&self, session: &mut dyn DeviceSession) -> Result<String, SessionError> {
        let commands = self.commands();
        log_debug!("Pushing syslog configuration",
            "host" => session.host(),
            "commands" => commands.len()
        );

        let output = session.send_config_set(&commands)?;

        log_success!(codes::success::SYSLOG_APPLIED, "Syslog configuration applied",
            "host" => session.host(),
            "server" => self.server
        );
        Ok(output)
    }

    pub fn confirmation_line(&self) -> String {
        format!("Syslog Configuration Applied: Syslog server {}", self.server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DeviceCredentials, MockConnector, MockEvent, SessionConnector};

    #[test]
    fn test_default_commands() {
        assert_eq!(
            SyslogTarget::default().commands(),
            vec![
                "logging 192.168.1.100",
                "logging trap informational",
                "logging source-interface Vlan1",
                "logging on",
            ]
        );
    }

    #[test]
    fn test_custom_target() {
        let target = SyslogTarget::new("10.9.9.9")
            .with_trap_level("warnings")
            .with_source_interface("Loopback0");

        assert_eq!(target.commands()[0], "logging 10.9.9.9");
        assert_eq!(target.commands()[1], "logging trap warnings");
        assert_eq!(target.commands()[2], "logging source-interface Loopback0");
        assert_eq!(
            target.confirmation_line(),
            "Syslog Configuration Applied: Syslog server 10.9.9.9"
        );
    }

    #[test]
    fn test_apply_sends_one_config_set() {
        let connector = MockConnector::new();
        let credentials = DeviceCredentials::default();
        let mut session = connector.connect(&credentials).unwrap();

        SyslogTarget::default().apply(session.as_mut()).unwrap();

        let events = connector.events();
        assert_eq!(
            events[1],
            MockEvent::ConfigSet(SyslogTarget::default().commands())
        );
    }

    #[test]
    fn test_apply_propagates_push_failure() {
        let connector = MockConnector::new().failing_config_push("% Invalid input");
        let mut session = connector.connect(&DeviceCredentials::default()).unwrap();

        let result = SyslogTarget::default().apply(session.as_mut());
        assert!(matches!(result, Err(SessionError::CommandFailed { .. })));
    }
}
