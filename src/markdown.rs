//! HTML to Markdown conversion.
//!
//! Wraps `htmd` with a fixed turndown-style configuration (ATX headings,
//! `---` rules, `*` bullets, fenced code, `_` emphasis) and the
//! post-processing applied to every converted document.

use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, HrStyle, Options};
use htmd::HtmlToMarkdown;

use crate::error::{Error, Result};
use crate::patterns::{normalize_newlines, ESCAPED_BRACKET, SPACED_RULE};

/// Markdown converter used by both the `markdown` field type and the
/// generic extractor.
///
/// Stateless; the `htmd` converter is built per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        Options {
            heading_style: HeadingStyle::Atx,
            hr_style: HrStyle::Dashes,
            bullet_list_marker: BulletListMarker::Asterisk,
            code_block_style: CodeBlockStyle::Fenced,
            ..Options::default()
        }
    }

    /// Convert an HTML fragment to raw Markdown.
    pub fn convert(&self, html: &str) -> Result<String> {
        let converter = HtmlToMarkdown::builder().options(Self::options()).build();
        let markdown = converter
            .convert(html)
            .map_err(|e| Error::Markdown(e.to_string()))?;
        Ok(SPACED_RULE.replace_all(&markdown, "---").into_owned())
    }

    /// Convert and post-process: un-escape bracket sequences, collapse 3+
    /// newlines and trim.
    pub fn convert_clean(&self, html: &str) -> Result<String> {
        self.convert(html).map(|md| post_process_markdown(&md))
    }
}

/// Post-process converter output.
///
/// # Examples
///
/// ```
/// use rs_pagescrape::markdown::post_process_markdown;
///
/// assert_eq!(post_process_markdown("\\[x\\] done\n\n\n\nnext\n"), "[x] done\n\nnext");
/// ```
#[must_use]
pub fn post_process_markdown(markdown: &str) -> String {
    let unescaped = ESCAPED_BRACKET.replace_all(markdown, "$1");
    normalize_newlines(&unescaped)
}
