//! # Logging Setup
//!
//! `env_logger` initialization for the CLI and tests, plus the debug-level
//! hex logger the mailbox uses for SET and GET payloads.

use log::{debug, log_enabled, Level, LevelFilter};

use crate::util::hex::format_hex_compact;

/// Payload bytes rendered per log line before truncation
const MAX_LOG_BYTES: usize = 32;

/// Initializes the logger with the `env_logger` crate.
///
/// Honors `RUST_LOG`; defaults to `warn` when it is unset.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

/// Initializes the logger with an explicit level, ignoring `RUST_LOG`.
pub fn init_logger_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::new().filter_level(level).try_init();
}

/// Direction of a mailbox payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadDirection {
    Set,
    Get,
}

/// Logs a mailbox payload as compact hex at debug level.
pub fn log_payload(direction: PayloadDirection, object_id: u8, data: &[u8]) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };
    debug!(
        "mailbox {direction:?} object 0x{object_id:02X}: {}{suffix}",
        format_hex_compact(shown)
    );
}
