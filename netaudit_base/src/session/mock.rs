//! Scripted sessions for testing without real devices
//!
//! `MockConnector` hands out `MockSession`s that answer from a response table
//! and record every call in a shared journal, so tests can assert what was
//! sent and that sessions were closed. Failures can be injected at connect,
//! enable, command or configuration push time.

use super::credentials::DeviceCredentials;
use super::errors::SessionError;
use super::{DeviceSession, SessionConnector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One recorded session call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Connect(String),
    Enable,
    Command(String),
    ConfigSet(Vec<String>),
    Disconnect,
}

const UNKNOWN_COMMAND_OUTPUT: &str = "% Invalid input detected at '^' marker.";

#[derive(Debug, Clone, Default)]
struct MockScript {
    responses: HashMap<String, String>,
    failing_commands: HashMap<String, String>,
    connect_failure: Option<String>,
    enable_failure: Option<String>,
    config_push_failure: Option<String>,
}

/// Connector producing scripted sessions
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    script: MockScript,
    journal: Arc<Mutex<Vec<MockEvent>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `output`
    pub fn with_response(mut self, command: &str, output: &str) -> Self {
        self.script
            .responses
            .insert(command.to_string(), output.to_string());
        self
    }

    pub fn with_running_config(self, text: &str) -> Self {
        self.with_response("show running-config", text)
    }

    pub fn with_startup_config(self, text: &str) -> Self {
        self.with_response("show startup-config", text)
    }

    pub fn failing_connect(mut self, reason: &str) -> Self {
        self.script.connect_failure = Some(reason.to_string());
        self
    }

    pub fn failing_enable(mut self, reason: &str) -> Self {
        self.script.enable_failure = Some(reason.to_string());
        self
    }

    pub fn failing_command(mut self, command: &str, reason: &str) -> Self {
        self.script
            .failing_commands
            .insert(command.to_string(), reason.to_string());
        self
    }

    pub fn failing_config_push(mut self, reason: &str) -> Self {
        self.script.config_push_failure = Some(reason.to_string());
        self
    }

    /// Every call recorded so far, across all sessions
    pub fn events(&self) -> Vec<MockEvent> {
        self.journal.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, MockEvent::Connect(_)))
            .count()
    }

    /// Configuration sets pushed so far
    pub fn pushed_config_sets(&self) -> Vec<Vec<String>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::ConfigSet(commands) => Some(commands),
                _ => None,
            })
            .collect()
    }
}

impl SessionConnector for MockConnector {
    fn connect(
        &self,
        credentials: &DeviceCredentials,
    ) -> Result<Box<dyn DeviceSession>, SessionError> {
        if let Some(reason) = &self.script.connect_failure {
            return Err(SessionError::ConnectFailed {
                address: credentials.address(),
                reason: reason.clone(),
            });
        }

        self.journal
            .lock()
            .unwrap()
            .push(MockEvent::Connect(credentials.host.clone()));

        Ok(Box::new(MockSession {
            host: credentials.host.clone(),
            script: self.script.clone(),
            journal: Arc::clone(&self.journal),
            connected: true,
        }))
    }

    fn connector_id(&self) -> &str {
        "mock"
    }
}

/// Scripted session handed out by `MockConnector`
pub struct MockSession {
    host: String,
    script: MockScript,
    journal: Arc<Mutex<Vec<MockEvent>>>,
    connected: bool,
}

impl MockSession {
    fn record(&self, event: MockEvent) {
        self.journal.lock().unwrap().push(event);
    }

    fn ensure_connected(&self) -> Result<(), SessionError> {
        if self.connected {
            Ok(())
        } else {
            Err(SessionError::Closed)
        }
    }
}

impl DeviceSession for MockSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn enable(&mut self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        self.record(MockEvent::Enable);

        match &self.script.enable_failure {
            Some(reason) => Err(SessionError::EnableFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        self.ensure_connected()?;
        self.record(MockEvent::Command(command.to_string()));

        if let Some(reason) = self.script.failing_commands.get(command) {
            return Err(SessionError::command_failed(command, reason.clone()));
        }

        Ok(self
            .script
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_COMMAND_OUTPUT.to_string()))
    }

    fn send_config_set(&mut self, commands: &[String]) -> Result<String, SessionError> {
        self.ensure_connected()?;
        self.record(MockEvent::ConfigSet(commands.to_vec()));

        if let Some(reason) = &self.script.config_push_failure {
            let first = commands.first().map(String::as_str).unwrap_or_default();
            return Err(SessionError::command_failed(first, reason.clone()));
        }

        let mut output = String::from("configure terminal\n");
        for command in commands {
            output.push_str(command);
            output.push('\n');
        }
        output.push_str("end");
        Ok(output)
    }

    fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.connected {
            self.connected = false;
            self.record(MockEvent::Disconnect);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> DeviceCredentials {
        DeviceCredentials::new("r1.lab", "admin", "pw", "secret")
    }

    #[test]
    fn test_scripted_responses() {
        let connector = MockConnector::new().with_running_config("hostname R1");
        let mut session = connector.connect(&credentials()).unwrap();

        assert_eq!(
            session.send_command("show running-config").unwrap(),
            "hostname R1"
        );
        assert_eq!(
            session.send_command("show bogus").unwrap(),
            UNKNOWN_COMMAND_OUTPUT
        );
    }

    #[test]
    fn test_closed_session_rejects_commands() {
        let connector = MockConnector::new();
        let mut session = connector.connect(&credentials()).unwrap();

        session.disconnect().unwrap();
        session.disconnect().unwrap();

        assert!(matches!(
            session.send_command("show version"),
            Err(SessionError::Closed)
        ));
        let disconnects = connector
            .events()
            .iter()
            .filter(|e| **e == MockEvent::Disconnect)
            .count();
        assert_eq!(disconnects, 1);
    }

    #[test]
    fn test_injected_command_failure() {
        let connector = MockConnector::new().failing_command("show startup-config", "timeout");
        let mut session = connector.connect(&credentials()).unwrap();

        assert!(matches!(
            session.send_command("show startup-config"),
            Err(SessionError::CommandFailed { .. })
        ));
    }

    #[test]
    fn test_config_set_recorded() {
        let connector = MockConnector::new();
        let mut session = connector.connect(&credentials()).unwrap();
        let commands = vec!["logging on".to_string()];

        let output = session.send_config_set(&commands).unwrap();
        assert!(output.contains("logging on"));
        assert_eq!(connector.pushed_config_sets(), vec![commands]);
        assert_eq!(connector.connect_count(), 1);
    }
}
