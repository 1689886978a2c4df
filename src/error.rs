//! Error types for rs-pagescrape.
//!
//! This module defines the error types returned by readiness waits,
//! extraction passes and host bridge emission.

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The schema has no `base_selector`.
    #[error("base_selector is required")]
    MissingBaseSelector,

    /// A CSS selector could not be parsed.
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// `wait_for_element` gave up before the selector matched.
    #[error("timed out after {timeout_ms}ms waiting for element `{selector}`")]
    ElementTimeout {
        /// Selector that never matched.
        selector: String,
        /// Deadline that elapsed.
        timeout_ms: u64,
    },

    /// The page never became a final, non-redirect document.
    #[error("page not ready after {timeout_ms}ms: {url}")]
    NotReady {
        /// Last URL observed.
        url: String,
        /// Deadline that elapsed.
        timeout_ms: u64,
    },

    /// The base selector matched nothing on this poll.
    #[error("no elements matched `{0}`")]
    NoMatches(String),

    /// The document has no body to extract from.
    #[error("cannot find body child elements")]
    NoBody,

    /// Extracted content was below the minimum length.
    #[error("content too short ({len} < {min} characters)")]
    ContentTooShort {
        /// Character count of the normalized content.
        len: usize,
        /// Required minimum.
        min: usize,
    },

    /// HTML to Markdown conversion failed.
    #[error("markdown conversion failed: {0}")]
    Markdown(String),

    /// The host rejected an emitted event.
    #[error("host bridge error: {0}")]
    Bridge(String),

    /// Payload (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
