//! # netaudit CLI
//!
//! Argument parsing, configuration assembly and logging setup for the
//! `netaudit` binary.

use clap::Parser;
use netaudit_base::logging::{self, codes, LogBackend, LogLevel, LoggingPreferences};
use netaudit_base::session::{DeviceType, SshConnector};
use netaudit_base::{log_error, log_info};
use netaudit_base::{AuditConfig, AuditError, ConfigError, DeviceAuditor};
use std::io::{self, Write};
use std::path::PathBuf;

/// Audit a network device against a hardening baseline
#[derive(Debug, Parser)]
#[command(name = "netaudit", version, about)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Device address
    #[arg(long)]
    pub host: Option<String>,

    /// Login user name
    #[arg(short, long)]
    pub username: Option<String>,

    /// cisco_ios, cisco_xe or cisco_nxos
    #[arg(long, value_name = "TYPE")]
    pub device_type: Option<DeviceType>,

    /// SSH port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Syslog server pushed to the device
    #[arg(long, value_name = "ADDRESS")]
    pub syslog_server: Option<String>,

    /// Directory for running_config.txt and startup_config.txt
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write the audit report as JSON
    #[arg(long, value_name = "FILE")]
    pub result_json: Option<PathBuf>,

    /// Do not push the syslog configuration
    #[arg(long)]
    pub skip_syslog: bool,

    /// error, warning, info or debug
    #[arg(long, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub structured_logs: bool,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{}'", value))
}

/// Load the configuration file (if any), then apply environment and flags
pub fn build_config(cli: &Cli) -> Result<AuditConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(host) = &cli.host {
        config = config.with_host(host.clone());
    }
    if let Some(username) = &cli.username {
        config = config.with_username(username.clone());
    }
    if let Some(device_type) = cli.device_type {
        config = config.with_device_type(device_type);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(server) = &cli.syslog_server {
        config = config.with_syslog_server(server.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config = config.with_output_dir(dir.clone());
    }
    if let Some(path) = &cli.result_json {
        config = config.with_result_json(path.clone());
    }
    if cli.skip_syslog {
        config = config.with_skip_syslog(true);
    }

    Ok(config)
}

/// Logging preferences from the environment, overridden by flags
pub fn logging_preferences(cli: &Cli) -> LoggingPreferences {
    let mut preferences = LoggingPreferences::default();
    if let Some(level) = cli.log_level {
        preferences = preferences.with_min_level(level);
    }
    if cli.structured_logs {
        preferences = preferences.with_backend(LogBackend::Structured);
    }
    preferences
}

fn level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    }
}

/// Install the global logging service, plus env_logger for the facade backend
pub fn init_logging(preferences: LoggingPreferences) -> Result<(), String> {
    if preferences.backend == LogBackend::LogFacade {
        env_logger::Builder::new()
            .filter_level(level_filter(preferences.min_log_level))
            .parse_default_env()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .target(env_logger::Target::Stderr)
            .try_init()
            .map_err(|e| e.to_string())?;
    }
    logging::init_global_logging_with_preferences(preferences)
}

/// Run the whole program and return the process exit status
pub fn run(cli: Cli) -> i32 {
    if let Err(e) = init_logging(logging_preferences(&cli)) {
        logging::safe_log_critical(
            codes::system::INITIALIZATION_FAILURE,
            &format!("Failed to initialize logging: {}", e),
        );
        return 1;
    }

    match audit(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e.user_message());
            e.exit_code()
        }
    }
}

fn audit(cli: &Cli) -> Result<(), AuditError> {
    let config = build_config(cli).map_err(|e| {
        log_error!(codes::config::CONFIG_READ_FAILED, "Could not load configuration",
            "error" => e
        );
        AuditError::from(e)
    })?;

    let auditor = DeviceAuditor::new(config).map_err(|e| {
        log_error!(e.log_code(), &e.user_message());
        e
    })?;

    log_info!("netaudit starting",
        "version" => env!("CARGO_PKG_VERSION"),
        "build_profile" => netaudit_base::config::build_info::profile()
    );

    let connector = SshConnector::new(auditor.config().session);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    auditor.run(&connector, &mut out)?;
    out.flush()?;
    Ok(())
}
