//! Page-loaded lifecycle signal.
//!
//! Independent of any extraction: once per page load, wait for the host
//! bridge, wait for the page to settle on a final URL, then tell the host
//! the page is loaded.

use std::future;
use std::sync::Arc;

use serde_json::Value;

use crate::bridge::HostBridge;
use crate::logging::EngineLogger;
use crate::options::EngineOptions;
use crate::readiness::is_final_page;
use crate::retry::{retry, RetryPolicy};
use crate::viewport::Viewport;

/// Announce page load to the host once the page is final.
///
/// Returns `true` when the signal was emitted. An unavailable host does not
/// stop the readiness check; the emission then becomes a no-op.
pub async fn signal_page_loaded(
    viewport: Arc<dyn Viewport>,
    bridge: HostBridge,
    options: EngineOptions,
    logger: EngineLogger,
) -> bool {
    if !bridge
        .wait_until_available(options.bridge_poll_interval(), options.bridge_timeout())
        .await
    {
        tracing::debug!(
            timeout_ms = options.bridge_timeout_ms,
            "host bridge not available, continuing"
        );
    }

    // Same 2s/4s schedule as the schema poll, without sleeping after the last check.
    let policy = RetryPolicy {
        delay_after_last: false,
        ..RetryPolicy::schema_poll(options.max_attempts, options.backoff_base())
    };
    let reached = retry(&policy, |_attempt| {
        let url = viewport.current_url();
        future::ready(if is_final_page(&url) { Ok(url) } else { Err(url) })
    })
    .await;

    match reached {
        Ok(url) => {
            logger.debug(format!("Page loaded: {url}"));
            let channel = options.page_loaded_channel();
            match bridge.emit(&channel, Value::Null) {
                Ok(sent) => sent,
                Err(err) => {
                    logger.error(format!("Failed to emit `{channel}`: {err}"));
                    false
                }
            }
        }
        Err(url) => {
            logger.warn(format!("Page never reached a final URL, last seen: {url}"));
            false
        }
    }
}
