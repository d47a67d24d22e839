//! Device credentials and device type tags

use crate::config::compile_time::session::DEFAULT_SSH_PORT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported device families
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    CiscoIos,
    CiscoXe,
    CiscoNxos,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoXe => "cisco_xe",
            DeviceType::CiscoNxos => "cisco_nxos",
        }
    }

    pub fn all() -> &'static [DeviceType] {
        &[DeviceType::CiscoIos, DeviceType::CiscoXe, DeviceType::CiscoNxos]
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                let known: Vec<&str> = DeviceType::all().iter().map(|t| t.as_str()).collect();
                format!(
                    "Unknown device type '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                )
            })
    }
}

/// Connection details for a single device
///
/// Supplied once at startup and never mutated afterwards. `Debug` output
/// redacts the password and enable secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Privileged ("enable") mode secret
    pub secret: String,
    pub device_type: DeviceType,
}

impl Default for DeviceCredentials {
    fn default() -> Self {
        Self {
            host: "192.168.56.101".to_string(),
            port: DEFAULT_SSH_PORT,
            username: "prne".to_string(),
            password: "cisco123!".to_string(),
            secret: "cisco12345!".to_string(),
            device_type: DeviceType::CiscoIos,
        }
    }
}

impl DeviceCredentials {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    /// `host:port` form used for socket connection and log context
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for DeviceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("device_type", &self.device_type)
            .finish()
    }
}
