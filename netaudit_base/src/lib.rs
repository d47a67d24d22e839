//! # netaudit - Network Device Configuration Auditor
//!
//! Retrieves a device's running and startup configuration over SSH, diffs the
//! running configuration against a hardening template, pushes a syslog
//! configuration and reports pass/fail hardening checks.

#[macro_use]
pub mod logging;

pub mod api;
pub mod comparison;
pub mod config;
pub mod hardening;
pub mod remediation;
pub mod results;
pub mod retrieval;
pub mod session;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{AuditConfig, AuditError, AuditReport, DeviceAuditor};

    pub use crate::comparison::{compare_configurations, CompareOptions, ConfigDiff, DiffLine};
    pub use crate::hardening::{
        check_hardening, default_rules, CheckOutcome, HardeningRule, HardeningTemplate,
        RuleResult,
    };
    pub use crate::remediation::SyslogTarget;
    pub use crate::retrieval::{fetch_configs, persist_configs, ConfigurationText, DeviceConfigs};

    pub use crate::session::{
        with_session, DeviceCredentials, DeviceSession, DeviceType, MockConnector,
        SessionConnector, SessionError, SessionSettings, SshConnector,
    };
}
