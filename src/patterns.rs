//! Compiled regex patterns and fixed selector tables.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! The tables here are configuration data shared by every extractor; they are
//! not extensible at runtime.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Readiness
// =============================================================================

/// Search-engine redirect and interstitial URL prefixes. A page whose URL
/// starts with one of these is never treated as final content.
pub const REDIRECT_URL_PREFIXES: &[&str] = &[
    "https://www.bing.com/ck/",
    "https://cn.bing.com/ck/",
    "https://www.so.com/link",
    "https://www.sogou.com/link",
    "http://www.bing.com/ck/",
    "http://cn.bing.com/ck/",
    "http://www.so.com/link",
    "http://www.sogou.com/link",
];

// =============================================================================
// Sanitizer
// =============================================================================

/// Tags removed from every subtree before text or Markdown is produced.
pub const REMOVAL_TAGS: &[&str] = &[
    "script", "style", "noscript", "form", "iframe", "frame", "object", "embed",
    "video", "audio", "link", "svg", "canvas", "meta", "head", "base", "template",
    "symbol", "button", "select", "textarea", "datalist", "dialog", "source",
    "picture", "track", "map",
];

/// Comma-joined form of [`REMOVAL_TAGS`], usable as a single CSS selector.
pub static REMOVAL_SELECTOR: LazyLock<String> = LazyLock::new(|| REMOVAL_TAGS.join(", "));

/// Page chrome stripped from plain-text output and link-free Markdown.
pub const CHROME_SELECTOR: &str = "nav, aside, header, footer";

/// Title fallback when `<title>` is empty.
pub const HEADING_SELECTOR: &str = "h1, h2, h3";

// =============================================================================
// URL attributes
// =============================================================================

/// Attributes whose live DOM property is an absolute URL.
pub const URL_ATTRIBUTES: &[&str] = &["href", "src", "srcset", "data-src", "poster", "action"];

// =============================================================================
// Text normalization
// =============================================================================

/// Three or more consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("MULTIPLE_NEWLINES regex"));

/// Any whitespace run.
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

/// Backslash-escaped square bracket, e.g. `\[` or `\]`.
pub static ESCAPED_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([\[\]])").expect("ESCAPED_BRACKET regex"));

/// Spaced thematic break (`- - -`) as some converters emit it.
pub static SPACED_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*-( -){2,}[ \t]*$").expect("SPACED_RULE regex"));

/// Collapse 3+ newlines to exactly two and trim.
#[must_use]
pub fn normalize_newlines(text: &str) -> String {
    MULTIPLE_NEWLINES.replace_all(text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_selector_lists_every_tag() {
        for tag in REMOVAL_TAGS {
            assert!(REMOVAL_SELECTOR.split(", ").any(|t| t == *tag));
        }
    }

    #[test]
    fn normalize_newlines_collapses_runs() {
        assert_eq!(normalize_newlines("\n a\n\n\n\nb\n\nc\n"), "a\n\nb\n\nc");
    }

    #[test]
    fn normalize_newlines_keeps_line_end_spaces() {
        assert_eq!(normalize_newlines("a   \nb  \n\n\n\nc"), "a   \nb  \n\nc");
    }

    #[test]
    fn escaped_bracket_is_unescaped() {
        assert_eq!(ESCAPED_BRACKET.replace_all(r"\[x\] done", "$1"), "[x] done");
    }

    #[test]
    fn spaced_rule_matches_dashes_only() {
        assert!(SPACED_RULE.is_match("- - -"));
        assert!(!SPACED_RULE.is_match("- item"));
    }
}
