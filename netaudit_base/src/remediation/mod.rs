//! Configuration pushed to the device during the write phase

pub mod syslog;

pub use syslog::SyslogTarget;
