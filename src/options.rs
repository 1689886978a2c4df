//! Configuration options for the extraction engine.
//!
//! `EngineOptions` carries the timing knobs of the readiness, bridge and
//! retry loops together with the window label used to scope host channels.

use std::time::Duration;

use serde::Deserialize;

/// Configuration options for an extraction engine.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings. Hosts may also deserialize the struct from JSON;
/// missing keys fall back to their defaults.
///
/// # Example
///
/// ```rust
/// use rs_pagescrape::EngineOptions;
///
/// let options = EngineOptions {
///     window_label: Some("scraper-1".to_string()),
///     ..EngineOptions::default()
/// };
/// assert_eq!(options.result_channel(), "scrape_result_scraper-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Window/session label used to scope result and lifecycle channels.
    ///
    /// Default: `None`
    pub window_label: Option<String>,

    /// Interval between page readiness checks before extraction.
    ///
    /// Default: `100`
    pub readiness_poll_interval_ms: u64,

    /// Deadline for the page to reach a final URL before extraction is abandoned.
    ///
    /// Default: `3000`
    pub readiness_timeout_ms: u64,

    /// Interval between host bridge availability checks.
    ///
    /// Default: `50`
    pub bridge_poll_interval_ms: u64,

    /// Deadline for the host bridge to become available.
    ///
    /// Default: `5000`
    pub bridge_timeout_ms: u64,

    /// Attempts made by every retry loop (zero-match polling, generic extraction,
    /// lifecycle readiness).
    ///
    /// Default: `3`
    pub max_attempts: u32,

    /// Base of the exponential backoff, `base * 2^n`.
    ///
    /// Default: `1000`
    pub backoff_base_ms: u64,

    /// Minimum character count of generic content.
    ///
    /// Default: `50`
    pub min_content_chars: usize,

    /// Timeout applied to `config.wait_for` when the schema gives none.
    ///
    /// Default: `10000`
    pub default_wait_timeout_ms: u64,

    /// Decode Bing click-redirect links found in URL-bearing schema fields.
    ///
    /// Default: `false`
    pub decode_redirect_links: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            window_label: None,
            readiness_poll_interval_ms: 100,
            readiness_timeout_ms: 3000,
            bridge_poll_interval_ms: 50,
            bridge_timeout_ms: 5000,
            max_attempts: 3,
            backoff_base_ms: 1000,
            min_content_chars: 50,
            default_wait_timeout_ms: 10_000,
            decode_redirect_links: false,
        }
    }
}

impl EngineOptions {
    /// Label reported in `logger_event` payloads (empty when unset).
    #[must_use]
    pub fn window(&self) -> &str {
        self.window_label.as_deref().unwrap_or_default()
    }

    /// Channel carrying the extraction outcome.
    #[must_use]
    pub fn result_channel(&self) -> String {
        match &self.window_label {
            Some(label) => format!("scrape_result_{label}"),
            None => "scrape_result".to_string(),
        }
    }

    /// Channel carrying the page-loaded lifecycle signal.
    #[must_use]
    pub fn page_loaded_channel(&self) -> String {
        match &self.window_label {
            Some(label) => format!("page_loaded_{label}"),
            None => "page_loaded".to_string(),
        }
    }

    #[must_use]
    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_interval_ms)
    }

    #[must_use]
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    #[must_use]
    pub fn bridge_poll_interval(&self) -> Duration {
        Duration::from_millis(self.bridge_poll_interval_ms)
    }

    #[must_use]
    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_timeout_ms)
    }

    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_without_label() {
        let options = EngineOptions::default();
        assert_eq!(options.result_channel(), "scrape_result");
        assert_eq!(options.page_loaded_channel(), "page_loaded");
        assert_eq!(options.window(), "");
    }

    #[test]
    fn channels_are_scoped_by_label() {
        let options = EngineOptions {
            window_label: Some("w7".to_string()),
            ..EngineOptions::default()
        };
        assert_eq!(options.result_channel(), "scrape_result_w7");
        assert_eq!(options.page_loaded_channel(), "page_loaded_w7");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let options: EngineOptions =
            serde_json::from_str(r#"{"window_label":"a","max_attempts":5}"#)
                .unwrap_or_else(|e| panic!("options should parse: {e}"));
        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.readiness_timeout_ms, 3000);
        assert_eq!(options.window(), "a");
    }
}
