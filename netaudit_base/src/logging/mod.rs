//! Global logging module
//!
//! Provides thread-safe global logging with a per-thread device context and a
//! clean macro interface.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use config::{LogBackend, LoggingPreferences};
pub use events::{LogEvent, LogLevel};
pub use service::{LogFacadeLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static DEVICE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging with explicit preferences
pub fn init_global_logging_with_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    let service = Arc::new(LoggingService::from_preferences(&preferences));

    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized")?;

    service.log_event(
        LogEvent::success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Global logging system initialized",
        )
        .with_context("min_level", preferences.min_log_level.as_str()),
    );

    Ok(())
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Minimum level of the global logger, `Info` when uninitialized
pub fn get_min_log_level() -> LogLevel {
    try_get_global_logger()
        .map(|service| service.min_level())
        .unwrap_or(LogLevel::Info)
}

// ============================================================================
// DEVICE CONTEXT MANAGEMENT
// ============================================================================

/// Set the device host attached to events on this thread
pub fn set_device_context(host: &str) {
    DEVICE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(host.to_string());
    });
}

/// Clear device context for current thread
pub fn clear_device_context() {
    DEVICE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with device context
pub fn with_device_context<F, R>(host: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_device_context(host);
    let result = f();
    clear_device_context();
    result
}

/// Get current device context (used by macros)
pub fn get_current_device_context() -> Option<String> {
    DEVICE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn dispatch(mut event: LogEvent, context: Vec<(&str, &str)>) {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(host) = get_current_device_context() {
        event = event.with_context("device", &host);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::error(code, message), context);
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::success(code, message), context);
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::info(message), context);
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::warning(message), context);
}

/// Log debug with context (used by log_debug! macro)
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if get_min_log_level() >= LogLevel::Debug {
        dispatch(LogEvent::debug(message), context);
    }
}

/// Safe critical error logging (always reaches stderr)
pub fn safe_log_critical(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("CRITICAL ERROR [{}]: {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_context_management() {
        assert!(get_current_device_context().is_none());

        set_device_context("192.168.56.101");
        assert_eq!(
            get_current_device_context().as_deref(),
            Some("192.168.56.101")
        );

        clear_device_context();
        assert!(get_current_device_context().is_none());
    }

    #[test]
    fn test_with_device_context() {
        let result = with_device_context("10.1.1.1", || {
            assert_eq!(get_current_device_context().as_deref(), Some("10.1.1.1"));
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_device_context().is_none());
    }

    #[test]
    fn test_safe_logging() {
        // Should not panic whether or not global logging is initialized
        safe_log_critical(codes::system::INTERNAL_ERROR, "Test critical error");
        log_info_with_context("uninitialized is fine", vec![("k", "v")]);
    }
}
