//! Hardening rules and the baseline template

use serde::{Deserialize, Serialize};

/// Named substring that must appear in the running configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardeningRule {
    /// Check name shown in the report
    pub name: String,
    /// Substring searched for, matched case-sensitively
    pub pattern: String,
}

impl HardeningRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    pub fn is_satisfied_by(&self, config_text: &str) -> bool {
        config_text.contains(self.pattern.as_str())
    }
}

/// Built-in rule set, in report order
pub fn default_rules() -> Vec<HardeningRule> {
    vec![
        HardeningRule::new("SSH enabled", "ip ssh version 2"),
        HardeningRule::new("Telnet disabled", "no service telnet"),
        HardeningRule::new("Password encryption", "service password-encryption"),
        HardeningRule::new("Logging enabled", "logging buffered"),
        HardeningRule::new("NTP configured", "ntp server"),
    ]
}

const DEFAULT_TEMPLATE: &str = "
service password-encryption
no ip http server
no ip http secure-server
ip ssh version 2
no service telnet
logging buffered
ntp server 192.168.1.100
";

/// Baseline configuration the running configuration is compared against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardeningTemplate {
    pub text: String,
}

impl Default for HardeningTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl HardeningTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
