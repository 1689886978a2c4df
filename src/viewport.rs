//! The browser-controlled surface the engine reads from.
//!
//! The engine never mutates the page: it reads the current URL, a serialized
//! snapshot of the document, and a mutation counter that ticks whenever the
//! document changes.

use std::sync::{PoisonError, RwLock};

use tokio::sync::watch;

/// A navigable page the engine extracts from.
pub trait Viewport: Send + Sync {
    /// URL of the document currently loaded.
    fn current_url(&self) -> String;

    /// Serialized HTML of the live document.
    fn document_html(&self) -> String;

    /// Mutation generation; changes whenever the document does.
    fn watch_mutations(&self) -> watch::Receiver<u64>;
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    html: String,
}

/// In-process viewport fed by the host.
///
/// # Example
///
/// ```rust
/// use rs_pagescrape::{MemoryViewport, Viewport};
///
/// let page = MemoryViewport::new("https://example.com", "<p>hi</p>");
/// page.set_html("<p>hydrated</p>");
/// assert_eq!(page.document_html(), "<p>hydrated</p>");
/// ```
#[derive(Debug)]
pub struct MemoryViewport {
    state: RwLock<PageState>,
    mutations: watch::Sender<u64>,
}

impl MemoryViewport {
    #[must_use]
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(PageState {
                url: url.into(),
                html: html.into(),
            }),
            mutations: watch::Sender::new(0),
        }
    }

    /// Load a new document at a new URL.
    pub fn navigate(&self, url: impl Into<String>, html: impl Into<String>) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.url = url.into();
            state.html = html.into();
        }
        self.bump();
    }

    /// Replace the document in place, as client-side hydration would.
    pub fn set_html(&self, html: impl Into<String>) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).html = html.into();
        self.bump();
    }

    fn bump(&self) {
        self.mutations.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

impl Viewport for MemoryViewport {
    fn current_url(&self) -> String {
        self.state.read().unwrap_or_else(PoisonError::into_inner).url.clone()
    }

    fn document_html(&self) -> String {
        self.state.read().unwrap_or_else(PoisonError::into_inner).html.clone()
    }

    fn watch_mutations(&self) -> watch::Receiver<u64> {
        self.mutations.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_are_observed() {
        let page = MemoryViewport::new("https://a.test", "");
        let mut rx = page.watch_mutations();
        assert!(!rx.has_changed().unwrap_or(true));

        page.navigate("https://b.test", "<p>b</p>");
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(page.current_url(), "https://b.test");
    }
}
