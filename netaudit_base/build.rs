// build.rs - TOML-driven constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    session: SessionLimits,
    comparison: ComparisonLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct SessionLimits {
    default_ssh_port: u16,
    connect_timeout_ms: u64,
    read_timeout_ms: u64,
    max_command_output_bytes: usize,
    read_chunk_size: usize,
}

#[derive(serde::Deserialize)]
struct ComparisonLimits {
    default_context_lines: usize,
    max_compared_lines: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=NETAUDIT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=NETAUDIT_CONFIG_DIR");

    let profile = env::var("NETAUDIT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("NETAUDIT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of netaudit_base
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_OUTPUT_BYTES: usize = 256 * 1024 * 1024;
    const ABSOLUTE_MAX_TIMEOUT_MS: u64 = 600_000;

    if config.session.max_command_output_bytes > ABSOLUTE_MAX_OUTPUT_BYTES {
        panic!("SECURITY: max_command_output_bytes exceeds absolute maximum");
    }

    if config.session.connect_timeout_ms > ABSOLUTE_MAX_TIMEOUT_MS
        || config.session.read_timeout_ms > ABSOLUTE_MAX_TIMEOUT_MS
    {
        panic!("SECURITY: session timeout exceeds absolute maximum");
    }

    if config.session.connect_timeout_ms == 0 || config.session.read_timeout_ms == 0 {
        panic!("session timeouts must be non-zero");
    }

    if config.session.read_chunk_size == 0 {
        panic!("read_chunk_size must be non-zero");
    }

    if profile == "production" && config.session.read_timeout_ms > 60_000 {
        panic!("PRODUCTION: read_timeout_ms too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod session {{
        pub const DEFAULT_SSH_PORT: u16 = {};
        pub const CONNECT_TIMEOUT_MS: u64 = {};
        pub const READ_TIMEOUT_MS: u64 = {};
        pub const MAX_COMMAND_OUTPUT_BYTES: usize = {};
        pub const READ_CHUNK_SIZE: usize = {};
    }}

    pub mod comparison {{
        pub const DEFAULT_CONTEXT_LINES: usize = {};
        pub const MAX_COMPARED_LINES: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.session.default_ssh_port,
        config.session.connect_timeout_ms,
        config.session.read_timeout_ms,
        config.session.max_command_output_bytes,
        config.session.read_chunk_size,
        config.comparison.default_context_lines,
        config.comparison.max_compared_lines,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
