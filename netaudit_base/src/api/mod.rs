//! # Public API for netaudit
//!
//! The auditor entry point and its error type.

pub mod auditor;
pub mod errors;

pub use auditor::DeviceAuditor;
pub use errors::AuditError;
pub use crate::config::{AuditConfig, ConfigError, OutputSettings};
pub use crate::results::{AuditReport, ComplianceStatus};
