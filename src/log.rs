//! Leveled log ring buffer for the page manager.
//!
//! Every manager owns an [`EventLog`] holding the most recent log lines, so
//! a debug page (or a test) can inspect what the navigation core did. With
//! the `defmt` feature enabled each line is also forwarded to `defmt`.
//!
//! # Log Levels
//!
//! - `Trace`: verbose state machine tracing
//! - `Debug`: stash copies, drag geometry
//! - `Info`: navigation and lifecycle progress
//! - `Warn`: rejected requests, recoverable oddities
//! - `Error`: configuration and identity errors
//!
//! # Usage
//!
//! ```ignore
//! use crate::log::{pm_info, pm_warn};
//!
//! pm_info!(self.log, "Page({}) push >> [Screen]", name);
//! pm_warn!(self.log, "Page stack is empty, can't pop");
//! ```

use core::fmt;

use heapless::{Deque, String};

/// Maximum number of log lines kept in the ring.
pub const LOG_ENTRIES: usize = 32;

/// Maximum characters per log line.
pub const LOG_MSG_LEN: usize = 64;

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    /// Verbose state machine tracing
    Trace = 0,
    /// Debug information
    Debug = 1,
    /// Normal operation
    #[default]
    Info = 2,
    /// Warnings
    Warn = 3,
    /// Errors
    Error = 4,
}

impl LogLevel {
    /// Get the single-character prefix for this level.
    pub const fn prefix(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log line with its level.
#[derive(Clone, Debug, Default)]
pub struct LogEntry {
    /// Log severity level.
    pub level: LogLevel,
    /// Log message (truncated to `LOG_MSG_LEN`).
    pub message: String<LOG_MSG_LEN>,
}

impl LogEntry {
    /// Create a new log entry, truncating the message if needed.
    pub fn new(
        level: LogLevel,
        message: &str,
    ) -> Self {
        let mut msg: String<LOG_MSG_LEN> = String::new();
        for c in message.chars() {
            if msg.push(c).is_err() {
                break;
            }
        }
        Self { level, message: msg }
    }
}

/// Ring buffer of log lines. Oldest line is dropped when full.
pub struct EventLog {
    entries: Deque<LogEntry, LOG_ENTRIES>,
    min_level: LogLevel,
}

impl EventLog {
    /// Create a new empty log accepting lines at `min_level` and above.
    pub const fn new(min_level: LogLevel) -> Self {
        Self {
            entries: Deque::new(),
            min_level,
        }
    }

    /// Change the minimum level.
    #[inline]
    pub fn set_level(
        &mut self,
        level: LogLevel,
    ) {
        self.min_level = level;
    }

    /// Current minimum level.
    #[inline]
    pub const fn level(&self) -> LogLevel { self.min_level }

    /// Whether a line at `level` would be recorded.
    #[inline]
    pub fn enabled(
        &self,
        level: LogLevel,
    ) -> bool {
        level >= self.min_level
    }

    /// Push a log line. Lines below the minimum level are dropped.
    pub fn push(
        &mut self,
        level: LogLevel,
        message: &str,
    ) {
        if !self.enabled(level) {
            return;
        }
        forward(level, message);

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry::new(level, message)).ok();
    }

    /// Iterate over lines from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> { self.entries.iter() }

    /// Whether any recorded line at `level` contains `needle`.
    pub fn contains(
        &self,
        level: LogLevel,
        needle: &str,
    ) -> bool {
        self.entries
            .iter()
            .any(|e| e.level == level && e.message.as_str().contains(needle))
    }

    /// Drop every recorded line.
    pub fn clear(&mut self) { self.entries.clear(); }

    /// Get the number of recorded lines.
    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Check if the log is empty.
    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl Default for EventLog {
    fn default() -> Self { Self::new(LogLevel::Info) }
}

// =============================================================================
// Formatting
// =============================================================================

/// Line buffer that silently truncates instead of failing.
pub struct LineBuf(pub String<LOG_MSG_LEN>);

impl LineBuf {
    pub const fn new() -> Self { Self(String::new()) }

    #[inline]
    pub fn as_str(&self) -> &str { self.0.as_str() }
}

impl Default for LineBuf {
    fn default() -> Self { Self::new() }
}

impl fmt::Write for LineBuf {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
fn forward(
    level: LogLevel,
    message: &str,
) {
    match level {
        LogLevel::Trace => defmt::trace!("[PM] {=str}", message),
        LogLevel::Debug => defmt::debug!("[PM] {=str}", message),
        LogLevel::Info => defmt::info!("[PM] {=str}", message),
        LogLevel::Warn => defmt::warn!("[PM] {=str}", message),
        LogLevel::Error => defmt::error!("[PM] {=str}", message),
    }
}

#[cfg(not(feature = "defmt"))]
#[inline]
fn forward(
    _level: LogLevel,
    _message: &str,
) {
}

// =============================================================================
// Macros
// =============================================================================

/// Log a formatted line into an [`EventLog`] at the given level.
macro_rules! pm_log {
    ($log:expr, $level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $log.enabled(level) {
            use core::fmt::Write;
            let mut buf = $crate::log::LineBuf::new();
            let _ = write!(buf, $($arg)*);
            $log.push(level, buf.as_str());
        }
    }};
}

/// Log a line at Trace level.
macro_rules! pm_trace {
    ($log:expr, $($arg:tt)*) => { $crate::log::pm_log!($log, $crate::log::LogLevel::Trace, $($arg)*) };
}

/// Log a line at Debug level.
macro_rules! pm_debug {
    ($log:expr, $($arg:tt)*) => { $crate::log::pm_log!($log, $crate::log::LogLevel::Debug, $($arg)*) };
}

/// Log a line at Info level.
macro_rules! pm_info {
    ($log:expr, $($arg:tt)*) => { $crate::log::pm_log!($log, $crate::log::LogLevel::Info, $($arg)*) };
}

/// Log a line at Warn level.
macro_rules! pm_warn {
    ($log:expr, $($arg:tt)*) => { $crate::log::pm_log!($log, $crate::log::LogLevel::Warn, $($arg)*) };
}

/// Log a line at Error level.
macro_rules! pm_error {
    ($log:expr, $($arg:tt)*) => { $crate::log::pm_log!($log, $crate::log::LogLevel::Error, $($arg)*) };
}

pub(crate) use {pm_debug, pm_error, pm_info, pm_log, pm_trace, pm_warn};

// =============================================================================
// Tests
// =============================================================================
