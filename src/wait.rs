//! Bounded waits.
//!
//! [`poll_until`] re-checks a predicate on a fixed interval; [`wait_for_change`]
//! re-checks only when a change notification arrives. [`wait_for_element`]
//! builds the element waiter on top of the latter.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::dom;
use crate::error::{Error, Result};
use crate::viewport::Viewport;

/// Poll `predicate` every `interval` until it holds or `timeout` elapses.
///
/// The predicate is checked immediately and once more at the deadline.
pub async fn poll_until<F>(interval: Duration, timeout: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        time::sleep(interval.min(deadline - now)).await;
    }
}

/// Evaluate `check` now and after every change notification until it yields
/// a value or `timeout` elapses.
///
/// The receiver is consumed and dropped on every exit path. If the sender
/// goes away, no further changes can arrive; the check is re-run once at
/// the deadline.
pub async fn wait_for_change<T, F>(
    mut changes: watch::Receiver<u64>,
    timeout: Duration,
    mut check: F,
) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    let deadline = Instant::now() + timeout;
    changes.borrow_and_update();
    if let Some(found) = check() {
        return Some(found);
    }
    loop {
        match time::timeout_at(deadline, changes.changed()).await {
            Ok(Ok(())) => {
                changes.borrow_and_update();
                if let Some(found) = check() {
                    return Some(found);
                }
            }
            Ok(Err(_closed)) => {
                time::sleep_until(deadline).await;
                return check();
            }
            Err(_elapsed) => return None,
        }
    }
}

/// Resolve with the outer HTML of the first element matching `selector`,
/// waiting up to `timeout_ms` for it to appear.
pub async fn wait_for_element(
    viewport: &dyn Viewport,
    selector: &str,
    timeout_ms: u64,
) -> Result<String> {
    let matcher = dom::compile(selector)?;
    let changes = viewport.watch_mutations();
    let check = || {
        let doc = dom::parse(&viewport.document_html());
        let found = doc.select_matcher(&matcher);
        found.exists().then(|| found.first().html().to_string())
    };

    wait_for_change(changes, Duration::from_millis(timeout_ms), check)
        .await
        .ok_or_else(|| Error::ElementTimeout {
            selector: selector.to_string(),
            timeout_ms,
        })
}
