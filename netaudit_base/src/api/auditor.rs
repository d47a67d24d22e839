//! # Device Auditor
//!
//! Runs one audit against one device:
//!
//! 1. read phase: one session fetches running and startup configuration
//! 2. both texts are written to the output directory
//! 3. the running configuration is diffed against the hardening template;
//!    inputs over the comparison limit skip the diff instead of failing
//! 4. write phase: a second session pushes the syslog configuration
//! 5. hardening rules are evaluated against the fetched running configuration
//!
//! Console text goes to the supplied writer; diagnostics go through the
//! logging layer. The first fatal error stops the run.

use super::errors::AuditError;
use crate::comparison::compare_configurations;
use crate::config::AuditConfig;
use crate::hardening::check_hardening;
use crate::logging::{self, codes};
use crate::results::AuditReport;
use crate::retrieval::{fetch_configs, persist_configs};
use crate::session::{with_session, SessionConnector};
use crate::{log_error, log_info, log_success, log_warning};
use std::io::Write;

pub const RETRIEVED_MESSAGE: &str = "Configs retrieved and stored successfully.";
pub const COMPARISON_HEADING: &str = "Configuration Comparison:";
pub const CHECKS_HEADING: &str = "Hardening Checks:";
pub const DIFF_SKIPPED_PREFIX: &str = "Diff skipped:";

/// Audits one device with a validated configuration
#[derive(Debug, Clone)]
pub struct DeviceAuditor {
    config: AuditConfig,
}

impl DeviceAuditor {
    /// Validate `config` and build the auditor
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the audit, printing the report to `out`
    ///
    /// Returns the structured report on success. Any error has already been
    /// logged when it is returned.
    pub fn run(
        &self,
        connector: &dyn SessionConnector,
        out: &mut dyn Write,
    ) -> Result<AuditReport, AuditError> {
        let host = self.config.device.host.clone();
        let result = logging::with_device_context(&host, || self.run_phases(connector, out));

        if let Err(e) = &result {
            log_error!(e.log_code(), &e.user_message(),
                "host" => host,
                "connector" => connector.connector_id()
            );
        }
        result
    }

    fn run_phases(
        &self,
        connector: &dyn SessionConnector,
        out: &mut dyn Write,
    ) -> Result<AuditReport, AuditError> {
        let config = &self.config;
        let credentials = &config.device;
        let mut report = AuditReport::new(credentials, &config.syslog);

        log_info!("Starting audit",
            "audit_id" => report.audit_id,
            "device_type" => credentials.device_type,
            "connector" => connector.connector_id()
        );

        let configs = with_session(connector, credentials, |session| {
            fetch_configs(session, credentials.device_type)
        })
        .map_err(AuditError::Connection)?;

        let stored = persist_configs(&configs, &config.output)?;
        report.record_stored(&stored);
        writeln!(out, "{}", RETRIEVED_MESSAGE)?;

        writeln!(out)?;
        writeln!(out, "{}", COMPARISON_HEADING)?;
        match compare_configurations(
            configs.running.as_str(),
            &config.template.text,
            config.comparison_options(),
        ) {
            Ok(diff) => {
                report.record_comparison(&diff);
                for line in diff.render_lines() {
                    writeln!(out, "{}", line)?;
                }
            }
            // The diff is informational; the audit carries on without it
            Err(e) => {
                log_warning!("Configuration diff skipped",
                    "code" => codes::comparison::COMPARISON_SKIPPED,
                    "reason" => e
                );
                report.record_comparison_skipped();
                writeln!(out, "{} {}", DIFF_SKIPPED_PREFIX, e)?;
            }
        }

        if config.skip_syslog {
            log_info!("Syslog configuration skipped", "server" => config.syslog.server);
            report.record_syslog(false, true);
        } else {
            with_session(connector, credentials, |session| config.syslog.apply(session))
                .map_err(AuditError::ConfigPush)?;
            report.record_syslog(true, false);

            writeln!(out)?;
            writeln!(out, "{}", config.syslog.confirmation_line())?;
        }

        let results = check_hardening(configs.running.as_str(), &config.rules);
        writeln!(out)?;
        writeln!(out, "{}", CHECKS_HEADING)?;
        for result in &results {
            writeln!(out, "{}", result.report_line())?;
        }
        report.record_checks(results);
        report.finalize();

        log_success!(codes::success::HARDENING_CHECKS_COMPLETE, "Hardening checks complete",
            "passed" => report.hardening.passed_checks,
            "failed" => report.hardening.failed_checks
        );

        if let Some(path) = &config.output.result_json {
            report.write_json(path)?;
            log_info!("Audit report written", "path" => path.display());
        }

        log_success!(codes::success::AUDIT_COMPLETE, "Audit complete",
            "duration_ms" => report.timestamp.duration_ms
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::comparison::MAX_COMPARED_LINES;
    use crate::hardening::HardeningRule;
    use crate::results::ComplianceStatus;
    use crate::session::{MockConnector, MockEvent, SessionError};
    use assert_matches::assert_matches;
    use std::fs;
    use std::path::Path;

    const HARDENED_CONFIG: &str = "hostname R1\n\
        service password-encryption\n\
        ip ssh version 2\n\
        no service telnet\n\
        logging buffered\n\
        ntp server 192.168.1.100\n";

    fn auditor(dir: &Path) -> DeviceAuditor {
        let config = AuditConfig::default().with_output_dir(dir);
        DeviceAuditor::new(config).unwrap()
    }

    fn run(auditor: &DeviceAuditor, connector: &MockConnector) -> (Result<AuditReport, AuditError>, String) {
        let mut out = Vec::new();
        let result = auditor.run(connector, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_full_audit_all_checks_pass() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new()
            .with_running_config(HARDENED_CONFIG)
            .with_startup_config("hostname R1\n");

        let (result, output) = run(&auditor(dir.path()), &connector);
        let report = result.unwrap();

        assert!(output.starts_with("Configs retrieved and stored successfully.\n\nConfiguration Comparison:\n"));
        assert!(output.contains(
            "\nSyslog Configuration Applied: Syslog server 192.168.1.100\n\nHardening Checks:\n"
        ));
        assert!(output.ends_with(
            "Hardening Checks:\n\
             [PASS] SSH enabled\n\
             [PASS] Telnet disabled\n\
             [PASS] Password encryption\n\
             [PASS] Logging enabled\n\
             [PASS] NTP configured\n"
        ));
        assert_eq!(report.hardening.status, ComplianceStatus::Compliant);
        assert!(report.syslog.applied);
        assert_eq!(
            fs::read_to_string(dir.path().join("running_config.txt")).unwrap(),
            HARDENED_CONFIG
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("startup_config.txt")).unwrap(),
            "hostname R1\n"
        );
    }

    #[test]
    fn test_sessions_are_sequential_and_closed() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new().with_running_config(HARDENED_CONFIG);

        let (result, _) = run(&auditor(dir.path()), &connector);
        assert!(result.is_ok());

        let host = AuditConfig::default().device.host;
        assert_eq!(
            connector.events(),
            vec![
                MockEvent::Connect(host.clone()),
                MockEvent::Enable,
                MockEvent::Command("show running-config".to_string()),
                MockEvent::Command("show startup-config".to_string()),
                MockEvent::Disconnect,
                MockEvent::Connect(host),
                MockEvent::Enable,
                MockEvent::ConfigSet(vec![
                    "logging 192.168.1.100".to_string(),
                    "logging trap informational".to_string(),
                    "logging source-interface Vlan1".to_string(),
                    "logging on".to_string(),
                ]),
                MockEvent::Disconnect,
            ]
        );
    }

    #[test]
    fn test_failing_checks_still_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new().with_running_config("hostname R1\nline vty 0 4\n");

        let (result, output) = run(&auditor(dir.path()), &connector);
        let report = result.unwrap();

        assert_eq!(output.matches("[FAIL]").count(), 5);
        assert!(!output.contains("[PASS]"));
        assert_eq!(report.hardening.status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_diff_printed_after_heading() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new().with_running_config("hostname R1\n");

        let (result, output) = run(&auditor(dir.path()), &connector);
        let report = result.unwrap();

        assert!(output.contains("Configuration Comparison:\n--- Running Config\n+++ Hardening Advice\n@@"));
        assert!(output.contains("\n-hostname R1\n"));
        assert!(output.contains("\n+ip ssh version 2\n"));
        assert_eq!(report.comparison.lines_removed, 1);
        assert!(!report.comparison.identical);
    }

    #[test]
    fn test_identical_template_prints_empty_diff() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig::default()
            .with_output_dir(dir.path())
            .with_template(HARDENED_CONFIG);
        let connector = MockConnector::new().with_running_config(HARDENED_CONFIG);

        let mut out = Vec::new();
        let report = DeviceAuditor::new(config).unwrap().run(&connector, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("Configuration Comparison:\n\nSyslog Configuration Applied"));
        assert!(report.comparison.identical);
    }

    #[test]
    fn test_oversized_running_config_skips_diff_only() {
        let dir = tempfile::tempdir().unwrap();
        let running = format!("{}ip ssh version 2\n", "!\n".repeat(MAX_COMPARED_LINES + 1));
        let connector = MockConnector::new().with_running_config(&running);

        let (result, output) = run(&auditor(dir.path()), &connector);
        let report = result.unwrap();

        assert!(output.contains("Configuration Comparison:\nDiff skipped: Running Config has"));
        assert!(!output.contains("--- Running Config"));
        assert!(output.contains("Syslog Configuration Applied"));
        assert!(output.contains("Hardening Checks:\n[PASS] SSH enabled\n[FAIL] Telnet disabled"));
        assert_eq!(connector.pushed_config_sets().len(), 1);
        assert!(report.comparison.skipped);
        assert_eq!(
            fs::read_to_string(dir.path().join("running_config.txt")).unwrap(),
            running
        );
    }

    #[test]
    fn test_connection_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new().failing_connect("connection refused");

        let (result, output) = run(&auditor(dir.path()), &connector);

        let err = result.unwrap_err();
        assert_matches!(err, AuditError::Connection(SessionError::ConnectFailed { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(output.is_empty());
        assert!(!dir.path().join("running_config.txt").exists());
        assert!(!dir.path().join("startup_config.txt").exists());
    }

    #[test]
    fn test_read_phase_command_failure_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new().failing_command("show startup-config", "channel closed");

        let (result, _) = run(&auditor(dir.path()), &connector);

        assert_matches!(result, Err(AuditError::Connection(SessionError::CommandFailed { .. })));
        assert!(!dir.path().join("running_config.txt").exists());
        assert_eq!(connector.events().last(), Some(&MockEvent::Disconnect));
    }

    #[test]
    fn test_config_push_failure_after_successful_read() {
        let dir = tempfile::tempdir().unwrap();
        let connector = MockConnector::new()
            .with_running_config("hostname R1\n")
            .with_startup_config("hostname R1-startup\n")
            .failing_config_push("% Invalid input detected");

        let (result, output) = run(&auditor(dir.path()), &connector);

        let err = result.unwrap_err();
        assert_matches!(err, AuditError::ConfigPush(_));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("running_config.txt")).unwrap(),
            "hostname R1\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("startup_config.txt")).unwrap(),
            "hostname R1-startup\n"
        );
        assert!(output.contains("Configuration Comparison:\n--- Running Config"));
        assert!(!output.contains("Syslog Configuration Applied"));
        assert!(!output.contains("Hardening Checks:"));
        assert_eq!(connector.events().last(), Some(&MockEvent::Disconnect));
    }

    #[test]
    fn test_skip_syslog_opens_one_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig::default()
            .with_output_dir(dir.path())
            .with_skip_syslog(true);
        let connector = MockConnector::new().with_running_config(HARDENED_CONFIG);

        let mut out = Vec::new();
        let report = DeviceAuditor::new(config).unwrap().run(&connector, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(connector.connect_count(), 1);
        assert!(connector.pushed_config_sets().is_empty());
        assert!(!output.contains("Syslog Configuration Applied"));
        assert!(output.contains("Hardening Checks:\n[PASS] SSH enabled"));
        assert!(report.syslog.skipped);
    }

    #[test]
    fn test_custom_rules_and_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("audit.json");
        let config = AuditConfig::default()
            .with_output_dir(dir.path())
            .with_result_json(&json_path)
            .with_rules(vec![
                HardeningRule::new("AAA enabled", "aaa new-model"),
                HardeningRule::new("SSH enabled", "ip ssh version 2"),
            ]);
        let connector = MockConnector::new().with_running_config("aaa new-model\n");

        let mut out = Vec::new();
        DeviceAuditor::new(config).unwrap().run(&connector, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.ends_with("Hardening Checks:\n[PASS] AAA enabled\n[FAIL] SSH enabled\n"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["hardening"]["passed_checks"], 1);
        assert_eq!(json["hardening"]["failed_checks"], 1);
        assert_eq!(json["hardening"]["results"][0]["outcome"], "pass");
    }

    #[test]
    fn test_invalid_config_rejected_before_connecting() {
        let result = DeviceAuditor::new(AuditConfig::default().with_host(""));
        assert_matches!(result, Err(AuditError::Configuration(_)));
    }
}
