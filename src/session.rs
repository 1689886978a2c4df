//! Extraction sessions and at-most-once result delivery.
//!
//! Each invocation of the orchestrator gets its own [`ExtractionSession`]
//! owning its own delivery latch, so a stray callback from an earlier
//! invocation can neither be swallowed by nor double-report into a later one.

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use crate::bridge::HostBridge;
use crate::logging::EngineLogger;
use crate::result::ExtractionOutcome;

/// Orchestrator progress for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingDependencies,
    RunningSchema,
    RunningGeneric,
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingDependencies => "awaiting_dependencies",
            SessionState::RunningSchema => "running_schema",
            SessionState::RunningGeneric => "running_generic",
            SessionState::Done => "done",
        };
        f.write_str(name)
    }
}

/// One orchestrator invocation.
pub struct ExtractionSession {
    id: Uuid,
    channel: String,
    bridge: HostBridge,
    logger: EngineLogger,
    delivered: OnceLock<ExtractionOutcome>,
    state: Mutex<SessionState>,
}

impl fmt::Debug for ExtractionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionSession")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("state", &self.state())
            .field("delivered", &self.delivered.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ExtractionSession {
    /// A fresh session whose outcome is published on `channel`.
    #[must_use]
    pub fn new(channel: impl Into<String>, bridge: HostBridge, logger: EngineLogger) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            bridge,
            logger,
            delivered: OnceLock::new(),
            state: Mutex::new(SessionState::Idle),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn transition(&self, next: SessionState) {
        let previous = std::mem::replace(
            &mut *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            next,
        );
        tracing::debug!(session = %self.id, %previous, %next, "session transition");
    }

    /// The delivered outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<&ExtractionOutcome> {
        self.delivered.get()
    }

    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.delivered.get().is_some()
    }

    /// Publish `outcome` unless this session already delivered one.
    ///
    /// Returns `true` for the call that won the latch. Later calls are
    /// no-ops logged at debug level. A missing host still consumes the latch.
    pub fn dispatch_once(&self, outcome: ExtractionOutcome) -> bool {
        if self.delivered.set(outcome.clone()).is_err() {
            self.logger.debug(format!(
                "Result already sent for session {}, ignoring duplicate",
                self.id
            ));
            return false;
        }

        let payload = match serde_json::to_value(&outcome) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(%err, "failed to encode outcome");
                Value::Null
            }
        };
        match self.bridge.emit(&self.channel, payload) {
            Ok(true) => self.logger.debug(format!("Result sent on `{}`", self.channel)),
            Ok(false) => self.logger.warn(format!(
                "Host bridge unavailable, result for `{}` not delivered",
                self.channel
            )),
            Err(err) => self.logger.error(format!("Failed to send result: {err}")),
        }
        true
    }
}
