//! Consolidated log codes and classification system
//!
//! Single source of truth for every code the auditor emits, together with its
//! behavioral metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl CodeMetadata {
    const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration error codes
pub mod config {
    use super::Code;

    pub const CONFIG_READ_FAILED: Code = Code::new("E100");
    pub const CONFIG_PARSE_FAILED: Code = Code::new("E101");
    pub const CONFIG_INVALID: Code = Code::new("E102");
}

/// Session error codes
pub mod session {
    use super::Code;

    pub const CONNECT_FAILED: Code = Code::new("E200");
    pub const AUTHENTICATION_FAILED: Code = Code::new("E201");
    pub const ENABLE_FAILED: Code = Code::new("E202");
    pub const COMMAND_FAILED: Code = Code::new("E203");
    pub const SESSION_TIMEOUT: Code = Code::new("E204");
    pub const DISCONNECT_FAILED: Code = Code::new("E205");
}

/// Comparison codes
pub mod comparison {
    use super::Code;

    pub const COMPARISON_SKIPPED: Code = Code::new("E300");
}

/// Storage error codes
pub mod storage {
    use super::Code;

    pub const WRITE_FAILED: Code = Code::new("E400");
    pub const REPORT_WRITE_FAILED: Code = Code::new("E401");
}

/// Remediation error codes
pub mod remediation {
    use super::Code;

    pub const CONFIG_PUSH_FAILED: Code = Code::new("E500");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const SESSION_ESTABLISHED: Code = Code::new("I010");
    pub const SESSION_CLOSED: Code = Code::new("I011");
    pub const CONFIGS_RETRIEVED: Code = Code::new("I020");
    pub const CONFIGS_STORED: Code = Code::new("I021");
    pub const COMPARISON_COMPLETE: Code = Code::new("I030");
    pub const SYSLOG_APPLIED: Code = Code::new("I040");
    pub const HARDENING_CHECKS_COMPLETE: Code = Code::new("I050");
    pub const AUDIT_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const METADATA: &[CodeMetadata] = &[
    CodeMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        true,
        "Internal error",
        "Report the failure with the full log output",
    ),
    CodeMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        true,
        "Initialization failure",
        "Check logging and build configuration",
    ),
    CodeMetadata::new(
        "E100",
        "Configuration",
        Severity::High,
        true,
        "Configuration file could not be read",
        "Verify the --config path and file permissions",
    ),
    CodeMetadata::new(
        "E101",
        "Configuration",
        Severity::High,
        true,
        "Configuration file is not valid TOML",
        "Fix the reported syntax error",
    ),
    CodeMetadata::new(
        "E102",
        "Configuration",
        Severity::High,
        true,
        "Configuration value failed validation",
        "Supply the missing or invalid value via file, flag or environment",
    ),
    CodeMetadata::new(
        "E200",
        "Session",
        Severity::Critical,
        true,
        "Connection to the device failed",
        "Check device reachability, port and SSH service",
    ),
    CodeMetadata::new(
        "E201",
        "Session",
        Severity::Critical,
        true,
        "Authentication rejected by the device",
        "Verify username and password",
    ),
    CodeMetadata::new(
        "E202",
        "Session",
        Severity::Critical,
        true,
        "Privileged mode could not be entered",
        "Verify the enable secret",
    ),
    CodeMetadata::new(
        "E203",
        "Session",
        Severity::High,
        true,
        "Command execution failed",
        "Inspect the session log for the device response",
    ),
    CodeMetadata::new(
        "E204",
        "Session",
        Severity::High,
        true,
        "Timed out waiting for the device prompt",
        "Increase the read timeout or check the device prompt format",
    ),
    CodeMetadata::new(
        "E205",
        "Session",
        Severity::Low,
        false,
        "Session did not close cleanly",
        "No action required; the transport is released regardless",
    ),
    CodeMetadata::new(
        "E300",
        "Comparison",
        Severity::Low,
        false,
        "Configuration diff skipped",
        "Inspect the stored configuration files directly",
    ),
    CodeMetadata::new(
        "E400",
        "Storage",
        Severity::High,
        true,
        "Configuration text could not be written",
        "Check the output directory and permissions",
    ),
    CodeMetadata::new(
        "E401",
        "Storage",
        Severity::Medium,
        true,
        "Audit report could not be written",
        "Check the --result-json path",
    ),
    CodeMetadata::new(
        "E500",
        "Remediation",
        Severity::Critical,
        true,
        "Configuration push failed",
        "Check configuration privileges and the session log",
    ),
    CodeMetadata::new(
        "I001",
        "System",
        Severity::Low,
        false,
        "Logging system initialized",
        "Continue",
    ),
    CodeMetadata::new(
        "I010",
        "Session",
        Severity::Low,
        false,
        "Session established in privileged mode",
        "Continue",
    ),
    CodeMetadata::new(
        "I011",
        "Session",
        Severity::Low,
        false,
        "Session closed",
        "Continue",
    ),
    CodeMetadata::new(
        "I020",
        "Retrieval",
        Severity::Low,
        false,
        "Running and startup configuration retrieved",
        "Continue",
    ),
    CodeMetadata::new(
        "I021",
        "Storage",
        Severity::Low,
        false,
        "Configuration text written to storage",
        "Continue",
    ),
    CodeMetadata::new(
        "I030",
        "Comparison",
        Severity::Low,
        false,
        "Configuration comparison completed",
        "Review the printed diff",
    ),
    CodeMetadata::new(
        "I040",
        "Remediation",
        Severity::Low,
        false,
        "Syslog configuration applied",
        "Continue",
    ),
    CodeMetadata::new(
        "I050",
        "Hardening",
        Severity::Low,
        false,
        "Hardening checks completed",
        "Review failed checks",
    ),
    CodeMetadata::new(
        "I060",
        "System",
        Severity::Low,
        false,
        "Audit completed",
        "Continue",
    ),
];

/// Metadata registry using OnceLock for thread safety
static CODE_REGISTRY: OnceLock<HashMap<&'static str, &'static CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, &'static CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| METADATA.iter().map(|m| (m.code, m)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code).copied()
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if code requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
