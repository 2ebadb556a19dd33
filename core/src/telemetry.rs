//! # Telemetry: Pluggable Flow Logging
//!
//! Flow diagnostics go through a [`FlowLogger`] sink. The default sink forwards
//! to `tracing`; [`MemoryLogger`] keeps entries around for inspection.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    /// Silences the logger entirely.
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sink for flow diagnostics.
pub trait FlowLogger: Send + Sync + 'static {
    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>);
}

/// Forwards flow diagnostics to `tracing`, tagged with the flow name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    flow: String,
}

impl TracingLogger {
    pub fn new(flow: impl Into<String>) -> Self {
        Self { flow: flow.into() }
    }
}

impl FlowLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        let flow = self.flow.as_str();
        let chain = error.map(error_chain);
        match (level, chain) {
            (LogLevel::Error, Some(err)) => tracing::error!(screenflow.flow = %flow, error = %err, "{message}"),
            (LogLevel::Error, None) => tracing::error!(screenflow.flow = %flow, "{message}"),
            (LogLevel::Warning, Some(err)) => tracing::warn!(screenflow.flow = %flow, error = %err, "{message}"),
            (LogLevel::Warning, None) => tracing::warn!(screenflow.flow = %flow, "{message}"),
            (LogLevel::Info, _) => tracing::info!(screenflow.flow = %flow, "{message}"),
            (LogLevel::Debug, _) => tracing::debug!(screenflow.flow = %flow, "{message}"),
            (LogLevel::Off, _) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Rendered error chain, outermost first.
    pub error: Option<String>,
}

/// Records every entry it receives. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn at_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl FlowLogger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
            error: error.map(error_chain),
        });
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// A logger bound to a minimum level. Entries below the threshold never reach the sink.
#[derive(Clone)]
pub struct LogSink {
    threshold: LogLevel,
    logger: Arc<dyn FlowLogger>,
}

impl LogSink {
    pub fn new(threshold: LogLevel, logger: Arc<dyn FlowLogger>) -> Self {
        Self { threshold, logger }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && self.threshold != LogLevel::Off && level >= self.threshold
    }

    pub fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        if self.enabled(level) {
            self.logger.log(level, message, error);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, None);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: &str, error: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Warning, message, error);
    }

    pub fn error(&self, message: &str, error: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Error, message, error);
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("threshold", &self.threshold)
            .finish()
    }
}
