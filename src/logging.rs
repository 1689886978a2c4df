//! Logging mirrored to the host.
//!
//! Every line goes to `tracing` (the local console) and is forwarded to the
//! host as a `logger_event` so the controlling process can show engine logs
//! next to its own.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::bridge::{HostBridge, LOGGER_CHANNEL};

/// Log severity mirrored to the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logger bound to one window label.
#[derive(Debug, Clone)]
pub struct EngineLogger {
    bridge: HostBridge,
    window: String,
}

impl EngineLogger {
    #[must_use]
    pub fn new(bridge: HostBridge, window: impl Into<String>) -> Self {
        Self {
            bridge,
            window: window.into(),
        }
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        let message = message.as_ref();
        match level {
            LogLevel::Error => tracing::error!(window = %self.window, "{message}"),
            LogLevel::Warn => tracing::warn!(window = %self.window, "{message}"),
            LogLevel::Info => tracing::info!(window = %self.window, "{message}"),
            LogLevel::Debug => tracing::debug!(window = %self.window, "{message}"),
        }

        let payload = json!({
            "window": self.window,
            "message": format!("[{level}] {message}"),
        });
        if let Err(err) = self.bridge.emit(LOGGER_CHANNEL, payload) {
            tracing::debug!(%err, "failed to forward log line to host");
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default
/// `rs_pagescrape=info`). Safe to call more than once.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rs_pagescrape=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
