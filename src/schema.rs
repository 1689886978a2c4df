//! Caller-supplied extraction inputs.
//!
//! The serde layout matches the JSON hosts already send:
//! `{ "config": { "wait_for": ".list", ... },
//!    "selectors": { "base_selector": ".item", "fields": [...] } }`.

use serde::{Deserialize, Serialize};

/// Declarative schema for structured extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    #[serde(default)]
    pub config: SchemaConfig,
    pub selectors: Selectors,
}

/// Timing and identification for a schema.
///
/// Fields the engine does not use (URL templates, pagination) are accepted
/// and ignored so host configuration files deserialize unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Name used in log lines.
    pub name: Option<String>,
    /// Selector to wait for before polling; empty means no wait.
    pub wait_for: Option<String>,
    /// Milliseconds to wait for `wait_for`; zero means the engine default.
    pub wait_timeout: Option<u64>,
}

impl SchemaConfig {
    /// The wait selector, ignoring blank values.
    #[must_use]
    pub fn wait_selector(&self) -> Option<&str> {
        self.wait_for.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The wait timeout, falling back to `default_ms` for unset or zero values.
    #[must_use]
    pub fn wait_timeout_ms(&self, default_ms: u64) -> u64 {
        self.wait_timeout.filter(|ms| *ms > 0).unwrap_or(default_ms)
    }
}

/// Container selector and the fields read from each container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default)]
    pub base_selector: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One extracted value per container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output key.
    pub name: String,
    /// Selector relative to the container.
    #[serde(default)]
    pub selector: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Attribute to read when `kind` is `attribute`.
    #[serde(default)]
    pub attribute: Option<String>,
    /// Drop the whole record when this field comes back empty.
    #[serde(default)]
    pub required: Option<bool>,
}

impl FieldSpec {
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// How a field's target element is turned into a value.
///
/// Unknown tags deserialize as [`FieldKind::Text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Attribute,
    Html,
    Markdown,
    #[default]
    #[serde(other)]
    Text,
}

/// Options for readability-style extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericContentRule {
    pub format: ContentFormat,
    pub keep_image: bool,
    pub keep_link: bool,
}

/// Output format of generic extraction. Anything but `"text"` means Markdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Text,
    #[default]
    #[serde(other)]
    Markdown,
}

impl std::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentFormat::Markdown => write!(f, "markdown"),
            ContentFormat::Text => write!(f, "text"),
        }
    }
}
