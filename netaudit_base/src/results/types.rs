//! # Audit Report Types

use crate::comparison::ConfigDiff;
use crate::hardening::RuleResult;
use crate::remediation::SyslogTarget;
use crate::retrieval::StoredConfigs;
use crate::session::{DeviceCredentials, DeviceType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize audit report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write audit report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Complete record of one audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Unique identifier for this audit run
    pub audit_id: String,

    /// Machine the audit ran from
    pub auditor: AuditorContext,

    /// Audited device
    pub device: DeviceSummary,

    /// Saved configuration files, once written
    pub stored_files: Option<StoredFiles>,

    pub comparison: ComparisonSummary,

    pub syslog: SyslogSummary,

    pub hardening: HardeningSummary,

    pub timestamp: TimestampInfo,
}

/// Host executing the audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditorContext {
    pub hostname: String,
    pub os_info: String,
}

impl AuditorContext {
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

/// Audited device, without credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub host: String,
    pub port: u16,
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFiles {
    pub running_config: PathBuf,
    pub startup_config: PathBuf,
}

/// Diff line counts against the hardening template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub identical: bool,
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Input exceeded the comparison limit; no diff was produced
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyslogSummary {
    pub server: String,
    pub commands: Vec<String>,
    pub applied: bool,
    pub skipped: bool,
}

/// Hardening rule outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardeningSummary {
    pub results: Vec<RuleResult>,
    pub total_checks: u32,
    pub passed_checks: u32,
    pub failed_checks: u32,
    /// Percentage of checks that passed (0-100)
    pub pass_percentage: f32,
    pub status: ComplianceStatus,
}

/// Overall hardening status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Every check passed
    Compliant,
    /// At least one check failed
    NonCompliant,
    /// Checks did not run
    NotEvaluated,
}

/// Audit timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampInfo {
    /// When the audit started (RFC3339 format)
    pub audit_start: DateTime<Utc>,

    /// When the audit completed (RFC3339 format)
    pub audit_end: DateTime<Utc>,

    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl AuditReport {
    pub fn new(credentials: &DeviceCredentials, syslog: &SyslogTarget) -> Self {
        let now = Utc::now();

        Self {
            audit_id: uuid::Uuid::new_v4().to_string(),
            auditor: AuditorContext::from_system(),
            device: DeviceSummary {
                host: credentials.host.clone(),
                port: credentials.port,
                device_type: credentials.device_type,
            },
            stored_files: None,
            comparison: ComparisonSummary::default(),
            syslog: SyslogSummary {
                server: syslog.server.clone(),
                commands: syslog.commands(),
                applied: false,
                skipped: false,
            },
            hardening: HardeningSummary {
                results: Vec::new(),
                total_checks: 0,
                passed_checks: 0,
                failed_checks: 0,
                pass_percentage: 0.0,
                status: ComplianceStatus::NotEvaluated,
            },
            timestamp: TimestampInfo {
                audit_start: now,
                audit_end: now,
                duration_ms: 0,
            },
        }
    }

    pub fn record_stored(&mut self, stored: &StoredConfigs) {
        self.stored_files = Some(StoredFiles {
            running_config: stored.running.clone(),
            startup_config: stored.startup.clone(),
        });
    }

    pub fn record_comparison(&mut self, diff: &ConfigDiff) {
        self.comparison = ComparisonSummary {
            identical: diff.is_empty(),
            lines_added: diff.additions(),
            lines_removed: diff.removals(),
            skipped: false,
        };
    }

    pub fn record_comparison_skipped(&mut self) {
        self.comparison = ComparisonSummary {
            skipped: true,
            ..ComparisonSummary::default()
        };
    }

    pub fn record_syslog(&mut self, applied: bool, skipped: bool) {
        self.syslog.applied = applied;
        self.syslog.skipped = skipped;
    }

    pub fn record_checks(&mut self, results: Vec<RuleResult>) {
        let summary = &mut self.hardening;
        summary.total_checks = results.len() as u32;
        summary.passed_checks = results.iter().filter(|r| r.passed()).count() as u32;
        summary.failed_checks = summary.total_checks - summary.passed_checks;
        summary.results = results;
    }

    /// Mark the audit as completed and calculate final metrics
    pub fn finalize(&mut self) {
        self.timestamp.audit_end = Utc::now();
        self.timestamp.duration_ms = (self.timestamp.audit_end - self.timestamp.audit_start)
            .num_milliseconds()
            .max(0) as u64;

        let summary = &mut self.hardening;
        if summary.total_checks > 0 {
            summary.pass_percentage =
                (summary.passed_checks as f32 / summary.total_checks as f32) * 100.0;
            summary.status = if summary.failed_checks == 0 {
                ComplianceStatus::Compliant
            } else {
                ComplianceStatus::NonCompliant
            };
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
