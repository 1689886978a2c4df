//! Result types for extraction output.

use serde::{Deserialize, Serialize};

/// One structured record: field name to extracted value, in schema order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Payload of a successful generic extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericContent {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// The single outcome reported to the host per extraction session.
///
/// Serializes as `{"success": "<json>"}` or `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionOutcome {
    /// JSON-encoded payload: an array of records or a [`GenericContent`].
    Success(String),
    /// Human-readable failure.
    Error(String),
}

impl ExtractionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }

    /// Split into the host's `Ok(payload)` / `Err(message)` view.
    pub fn into_result(self) -> std::result::Result<String, String> {
        match self {
            ExtractionOutcome::Success(payload) => Ok(payload),
            ExtractionOutcome::Error(message) => Err(message),
        }
    }
}
