//! The logging collaborator.
//!
//! Everything in this crate reports through `LogSink::log(message, severity)`
//! and never looks at the outcome. Two sinks ship with it: `LogCrateSink`
//! forwards to the `log` facade, `BufferedLog` keeps timestamped lines in
//! memory and appends them to a file on flush.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LoggingConfig;

/// File buffered lines go to unless configured otherwise.
pub const DEFAULT_LOG_FILE: &str = "memento_log.txt";

const UNSERIALIZABLE: &str = "[Unserializable Object]";

/// Message severity. Lower is more severe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[serde(alias = "error")]
    Error = 0,
    #[serde(alias = "warning")]
    Warning = 1,
    #[default]
    #[serde(alias = "info")]
    Info = 2,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Severity::Error),
            "WARNING" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Receives log messages. Must never fail or panic.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, severity: Severity);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn log(&self, message: &str, severity: Severity) {
        self.as_ref().log(message, severity)
    }
}

/// Forwards messages to the `log` facade under the `entryview` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => log::error!(target: "entryview", "{}", message),
            Severity::Warning => log::warn!(target: "entryview", "{}", message),
            Severity::Info => log::info!(target: "entryview", "{}", message),
        }
    }
}

struct LogState {
    level: Severity,
    enabled: bool,
    target: Option<PathBuf>,
    buffer: Vec<String>,
}

impl LogState {
    fn push(&mut self, message: &str, severity: Severity) {
        if !self.enabled || severity > self.level {
            return;
        }
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.buffer
            .push(format!("[{}] [{}] {}", timestamp, severity, message));
    }

    fn flush(&mut self) -> io::Result<usize> {
        let Some(target) = self.target.as_deref() else {
            return Ok(0);
        };
        if self.buffer.is_empty() {
            return Ok(0);
        }

        match append_lines(target, &self.buffer) {
            Ok(()) => {
                let flushed = self.buffer.len();
                self.buffer.clear();
                Ok(flushed)
            }
            Err(e) => {
                // Reporting through ourselves would re-buffer the failure.
                log::error!(target: "entryview", "Logging flush error: {}", e);
                Err(e)
            }
        }
    }
}

fn append_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()
}

/// Buffered, level-filtered, append-only log.
///
/// Lines look like `[2026-10-19T08:15:02.113Z] [WARNING] message`. They stay
/// in memory until `flush()` appends them to the target file; dropping the
/// log flushes whatever is left.
///
/// A log built with `new()` has no target file. Its lines can be inspected
/// with `lines()` and `flush()` leaves them in place.
///
/// # Example
///
/// ```rust
/// use entryview_access::{BufferedLog, LogSink, Severity};
///
/// let log = BufferedLog::new();
/// log.set_level("warning");
/// log.log("kept", Severity::Error);
/// log.log("dropped", Severity::Info);
///
/// let lines = log.lines();
/// assert!(lines.last().unwrap().ends_with("[ERROR] kept"));
/// ```
pub struct BufferedLog {
    state: Mutex<LogState>,
}

impl BufferedLog {
    /// An enabled log at INFO level with no target file.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState {
                level: Severity::Info,
                enabled: true,
                target: None,
                buffer: Vec::new(),
            }),
        }
    }

    /// An enabled log at INFO level that flushes to `path`.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let log = Self::new();
        log.state().target = Some(path.into());
        log
    }

    /// A log configured from `config`.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            state: Mutex::new(LogState {
                level: config.level,
                enabled: config.enabled,
                target: Some(config.file.clone()),
                buffer: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the buffer, optionally retarget and relevel, and mark the start
    /// of a new log. An unrecognised level name is ignored.
    pub fn initialize(&self, file: Option<PathBuf>, level: Option<&str>) {
        let mut state = self.state();
        if let Some(file) = file {
            state.target = Some(file);
        }
        if let Some(level) = level.and_then(|l| l.parse().ok()) {
            state.level = level;
        }
        state.buffer.clear();
        state.push("----- Log Initialized -----", Severity::Info);
    }

    /// Log a serializable object as JSON.
    pub fn log_object<T: Serialize + ?Sized>(&self, object: &T, severity: Severity) {
        let serialized =
            serde_json::to_string(object).unwrap_or_else(|_| UNSERIALIZABLE.to_string());
        self.log(&serialized, severity);
    }

    /// Change the level by name. Returns `false`, and logs an error, if the
    /// name is not a level.
    pub fn set_level(&self, name: &str) -> bool {
        let mut state = self.state();
        match name.parse::<Severity>() {
            Ok(level) => {
                state.level = level;
                state.push(&format!("Log level set to {}.", level), Severity::Info);
                true
            }
            Err(message) => {
                state.push(&message, Severity::Error);
                false
            }
        }
    }

    pub fn level(&self) -> Severity {
        self.state().level
    }

    /// Turn logging on or off. The announcement is itself logged, so turning
    /// logging off leaves no trace.
    pub fn set_enabled(&self, enable: bool) {
        let mut state = self.state();
        state.enabled = enable;
        let mode = if enable { "ENABLED" } else { "DISABLED" };
        state.push(&format!("Logging mode set to {}.", mode), Severity::Info);
    }

    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    /// The file `flush()` appends to.
    pub fn target(&self) -> Option<PathBuf> {
        self.state().target.clone()
    }

    /// Buffered lines not yet flushed.
    pub fn lines(&self) -> Vec<String> {
        self.state().buffer.clone()
    }

    pub fn len(&self) -> usize {
        self.state().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().buffer.is_empty()
    }

    /// Append buffered lines to the target file and clear the buffer.
    ///
    /// Returns how many lines were written. On failure the buffer is kept so
    /// a later flush can retry.
    pub fn flush(&self) -> io::Result<usize> {
        self.state().flush()
    }
}

impl Default for BufferedLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for BufferedLog {
    fn log(&self, message: &str, severity: Severity) {
        self.state().push(message, severity);
    }
}

impl Drop for BufferedLog {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let _ = state.flush();
    }
}

impl fmt::Debug for BufferedLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("BufferedLog")
            .field("level", &state.level)
            .field("enabled", &state.enabled)
            .field("target", &state.target)
            .field("buffered", &state.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(log: &BufferedLog) -> Vec<String> {
        log.lines()
            .into_iter()
            .map(|line| line.splitn(2, "] ").nth(1).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_orders_error_first() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }

    #[test]
    fn line_format() {
        let log = BufferedLog::new();
        log.log("hello", Severity::Warning);

        let line = &log.lines()[0];
        assert!(line.starts_with('['));
        assert!(line.ends_with("] [WARNING] hello"));
    }

    #[test]
    fn filters_by_level() {
        let log = BufferedLog::new();
        log.log("info", Severity::Info);
        assert!(log.set_level("ERROR"));
        log.log("warning", Severity::Warning);
        log.log("error", Severity::Error);

        assert_eq!(
            messages(&log),
            vec!["[INFO] info", "[ERROR] error"]
        );
    }

    #[test]
    fn set_level_announces_change() {
        let log = BufferedLog::new();
        assert!(log.set_level("warning"));
        assert_eq!(log.level(), Severity::Warning);
        assert!(log.is_empty());

        assert!(log.set_level("info"));
        assert_eq!(messages(&log), vec!["[INFO] Log level set to INFO."]);
    }

    #[test]
    fn invalid_level_is_rejected() {
        let log = BufferedLog::new();
        assert!(!log.set_level("loud"));
        assert_eq!(log.level(), Severity::Info);
        assert_eq!(messages(&log), vec!["[ERROR] Invalid log level: loud"]);
    }

    #[test]
    fn disabled_log_drops_messages() {
        let log = BufferedLog::new();
        log.set_enabled(false);
        log.log("nope", Severity::Error);
        assert!(log.is_empty());
        assert!(!log.is_enabled());

        log.set_enabled(true);
        assert_eq!(messages(&log), vec!["[INFO] Logging mode set to ENABLED."]);
    }

    #[test]
    fn initialize_resets_buffer() {
        let log = BufferedLog::new();
        log.log("old", Severity::Info);
        log.initialize(Some(PathBuf::from("custom.txt")), Some("warning"));

        assert_eq!(log.level(), Severity::Warning);
        assert_eq!(log.target(), Some(PathBuf::from("custom.txt")));
        assert!(log.is_empty());

        log.set_level("info");
        log.initialize(None, None);
        assert_eq!(messages(&log), vec!["[INFO] ----- Log Initialized -----"]);
    }

    #[test]
    fn log_object_serializes() {
        let log = BufferedLog::new();
        log.log_object(&serde_json::json!({"title": "Dune"}), Severity::Info);
        assert_eq!(messages(&log), vec![r#"[INFO] {"title":"Dune"}"#]);
    }

    #[test]
    fn flush_without_target_keeps_lines() {
        let log = BufferedLog::new();
        log.log("kept", Severity::Info);
        assert_eq!(log.flush().unwrap(), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn flush_appends_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        let log = BufferedLog::with_file(&path);
        log.log("first", Severity::Info);
        assert_eq!(log.flush().unwrap(), 1);
        assert!(log.is_empty());

        log.log("second", Severity::Error);
        assert_eq!(log.flush().unwrap(), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] first"));
        assert!(lines[1].ends_with("[ERROR] second"));
    }

    #[test]
    fn failed_flush_keeps_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.txt");

        let log = BufferedLog::with_file(&path);
        log.log("kept", Severity::Info);
        assert!(log.flush().is_err());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        {
            let log = BufferedLog::with_file(&path);
            log.log("on shutdown", Severity::Info);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[INFO] on shutdown"));
    }
}
