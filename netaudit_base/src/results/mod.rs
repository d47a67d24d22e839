//! # Audit Results
//!
//! Structured record of one audit run, serialized to JSON for archiving or
//! downstream tooling. Console output is produced separately by the auditor.

pub mod types;

pub use types::{
    AuditReport, AuditorContext, ComparisonSummary, ComplianceStatus, DeviceSummary,
    HardeningSummary, ReportError, SyslogSummary, TimestampInfo,
};
