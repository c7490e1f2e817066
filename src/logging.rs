//! Injected logging capability.
//!
//! The engine never calls a global logger directly; it holds an
//! [`EngineLog`] chosen at construction. [`TracingLog`] is the default and
//! forwards to `tracing` under the `packml` target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an engine log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Fire-and-forget, leveled log sink.
///
/// Called from the transition-processing thread and from action threads, so
/// implementations must be cheap and must not call back into the engine.
pub trait EngineLog: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

impl<F> EngineLog for F
where
    F: Fn(LogLevel, &str) + Send + Sync,
{
    fn log(&self, level: LogLevel, message: &str) {
        self(level, message)
    }
}

/// Default sink backed by `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl EngineLog for TracingLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "packml", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "packml", "{}", message),
            LogLevel::Info => tracing::info!(target: "packml", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "packml", "{}", message),
            LogLevel::Error => tracing::error!(target: "packml", "{}", message),
        }
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLog;

impl EngineLog for NullLog {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_are_log_sinks() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let lines = Arc::clone(&lines);
            move |level: LogLevel, message: &str| {
                lines.lock().unwrap().push(format!("{level} {message}"));
            }
        };

        sink.log(LogLevel::Info, "Entering: Idle");
        TracingLog.log(LogLevel::Debug, "not captured");
        NullLog.log(LogLevel::Error, "dropped");

        assert_eq!(*lines.lock().unwrap(), vec!["INFO Entering: Idle"]);
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
