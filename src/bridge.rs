//! Host bridge: the publish side of the channel between the engine and the
//! process that owns the viewport.
//!
//! The host attaches an [`EventEmitter`] whenever it is ready; until then
//! every emission is a logged no-op.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::wait;

/// Channel carrying mirrored log lines.
pub const LOGGER_CHANNEL: &str = "logger_event";

/// Host-provided publish primitive.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, channel: &str, payload: Value) -> Result<()>;
}

/// Cloneable handle to the (possibly not yet attached) host emitter.
#[derive(Clone, Default)]
pub struct HostBridge {
    emitter: Arc<RwLock<Option<Arc<dyn EventEmitter>>>>,
}

impl std::fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBridge")
            .field("available", &self.is_available())
            .finish()
    }
}

impl HostBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge with an emitter already attached.
    #[must_use]
    pub fn with_emitter(emitter: Arc<dyn EventEmitter>) -> Self {
        let bridge = Self::new();
        bridge.attach(emitter);
        bridge
    }

    /// Install (or replace) the host emitter.
    pub fn attach(&self, emitter: Arc<dyn EventEmitter>) {
        *self.emitter.write().unwrap_or_else(PoisonError::into_inner) = Some(emitter);
    }

    /// Remove the host emitter.
    pub fn detach(&self) {
        *self.emitter.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.emitter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Poll for an attached emitter. Returns `false` on timeout.
    pub async fn wait_until_available(&self, interval: Duration, timeout: Duration) -> bool {
        wait::poll_until(interval, timeout, || self.is_available()).await
    }

    /// Publish `payload` on `channel`.
    ///
    /// Returns `Ok(false)` when no emitter is attached.
    pub fn emit(&self, channel: &str, payload: Value) -> Result<bool> {
        let emitter = self
            .emitter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match emitter {
            Some(emitter) => emitter.emit(channel, payload).map(|()| true),
            None => {
                tracing::debug!(channel, "host bridge unavailable, event dropped");
                Ok(false)
            }
        }
    }
}

/// An event as received by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub channel: String,
    pub payload: Value,
    pub emitted_at: DateTime<Utc>,
}

/// Emitter forwarding events into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelEmitter {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventEmitter for ChannelEmitter {
    fn emit(&self, channel: &str, payload: Value) -> Result<()> {
        self.tx
            .send(HostEvent {
                channel: channel.to_string(),
                payload,
                emitted_at: Utc::now(),
            })
            .map_err(|_| Error::Bridge(format!("receiver for `{channel}` dropped")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emit_without_host_is_a_no_op() {
        let bridge = HostBridge::new();
        assert!(matches!(bridge.emit("scrape_result", json!({})), Ok(false)));
    }

    #[test]
    fn attached_emitter_receives_events() {
        let (emitter, mut rx) = ChannelEmitter::new();
        let bridge = HostBridge::with_emitter(Arc::new(emitter));

        assert!(matches!(bridge.emit("page_loaded_w", Value::Null), Ok(true)));
        let event = rx.try_recv().unwrap_or_else(|e| panic!("expected event: {e}"));
        assert_eq!(event.channel, "page_loaded_w");
    }

    #[test]
    fn detached_host_drops_events() {
        let (emitter, mut rx) = ChannelEmitter::new();
        let bridge = HostBridge::with_emitter(Arc::new(emitter));
        bridge.detach();

        assert!(!bridge.is_available());
        assert!(matches!(bridge.emit("scrape_result", json!({})), Ok(false)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_is_a_bridge_error() {
        let (emitter, rx) = ChannelEmitter::new();
        drop(rx);
        let bridge = HostBridge::with_emitter(Arc::new(emitter));
        assert!(matches!(bridge.emit("x", Value::Null), Err(Error::Bridge(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_until_available_times_out() {
        let bridge = HostBridge::new();
        let available = bridge
            .wait_until_available(Duration::from_millis(50), Duration::from_millis(5000))
            .await;
        assert!(!available);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_until_available_sees_late_attach() {
        let bridge = HostBridge::new();
        let late = bridge.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            let (emitter, _rx) = ChannelEmitter::new();
            late.attach(Arc::new(emitter));
        });
        assert!(
            bridge
                .wait_until_available(Duration::from_millis(50), Duration::from_millis(5000))
                .await
        );
    }
}
