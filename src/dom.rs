//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate: attribute access, subtree
//! rewriting and an `innerText`-style text walk. Documents are always parsed
//! from a snapshot, so every function here works on a private copy of the page.

pub use dom_query::{Document, Matcher, NodeRef, Selection};

use crate::error::{Error, Result};
use crate::patterns::WHITESPACE_RUN;

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Compile a CSS selector, reporting parse failures instead of matching nothing.
pub fn compile(selector: &str) -> Result<Matcher> {
    Matcher::new(selector).map_err(|_| Error::InvalidSelector(selector.to_string()))
}

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get all attributes as key-value pairs
///
/// Returns empty vector if node has no attributes or if selection is empty.
#[must_use]
pub fn get_all_attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Remove every attribute not listed in `keep`.
pub fn retain_attributes(sel: &Selection, keep: &[&str]) {
    for (name, _) in get_all_attributes(sel) {
        if !keep.contains(&name.as_str()) {
            sel.remove_attr(&name);
        }
    }
}

// === Tag/Node Information ===

/// Whether the selection holds at least one element child.
#[must_use]
pub fn has_element_children(sel: &Selection) -> bool {
    sel.nodes()
        .first()
        .is_some_and(|node| node.children().iter().any(NodeRef::is_element))
}

// === Text ===

/// Collapse every whitespace run to a single space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Escape text for insertion as HTML content or a quoted attribute value.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Elements that start and end on their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "header", "hr", "li", "main",
    "nav", "ol", "pre", "section", "summary", "table", "tbody", "thead", "tfoot", "tr", "ul",
];

/// Elements separated from their neighbours by a blank line.
const PARAGRAPH_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that never render text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

struct TextBuffer {
    out: String,
    pre_depth: usize,
}

impl TextBuffer {
    fn push_text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.out.push_str(text);
            return;
        }
        for ch in WHITESPACE_RUN.replace_all(text, " ").chars() {
            if ch == ' ' {
                if !(self.out.is_empty() || self.out.ends_with(' ') || self.out.ends_with('\n')) {
                    self.out.push(' ');
                }
            } else {
                self.out.push(ch);
            }
        }
    }

    fn break_lines(&mut self, count: usize) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        if self.out.is_empty() {
            return;
        }
        let existing = self.out.len() - self.out.trim_end_matches('\n').len();
        for _ in existing..count {
            self.out.push('\n');
        }
    }

    fn walk(&mut self, node: &NodeRef) {
        if node.is_text() {
            self.push_text(&node.text());
            return;
        }
        if !node.is_element() {
            for child in node.children() {
                self.walk(&child);
            }
            return;
        }

        let tag = node.node_name().map(|t| t.to_ascii_lowercase()).unwrap_or_default();
        if HIDDEN_TAGS.contains(&tag.as_str()) {
            return;
        }
        match tag.as_str() {
            "br" => {
                while self.pre_depth == 0 && self.out.ends_with(' ') {
                    self.out.pop();
                }
                self.out.push('\n');
                return;
            }
            "td" | "th" => self.push_text(" "),
            _ => {}
        }

        let lines = if PARAGRAPH_TAGS.contains(&tag.as_str()) {
            2
        } else if BLOCK_TAGS.contains(&tag.as_str()) {
            1
        } else {
            0
        };
        if lines > 0 {
            self.break_lines(lines);
        }
        if tag == "pre" {
            self.pre_depth += 1;
        }
        for child in node.children() {
            self.walk(&child);
        }
        if tag == "pre" {
            self.pre_depth -= 1;
        }
        if lines > 0 {
            self.break_lines(lines);
        }
    }
}

/// Rendered text of a subtree, approximating the browser's `innerText`:
/// block elements sit on their own lines, paragraphs and headings are
/// separated by a blank line, inline whitespace collapses to one space.
#[must_use]
pub fn inner_text(sel: &Selection) -> String {
    let mut buffer = TextBuffer {
        out: String::new(),
        pre_depth: 0,
    };
    for node in sel.nodes() {
        buffer.walk(node);
    }
    buffer.out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_text_breaks_blocks_and_paragraphs() {
        let doc = parse(
            "<div><h2>Title</h2><p>One   two</p><div>three<br>four</div><script>x()</script></div>",
        );
        let text = inner_text(&doc.select("div").first());
        assert_eq!(text.trim(), "Title\n\nOne two\n\nthree\nfour");
    }

    #[test]
    fn line_breaks_drop_spaces_before_them() {
        let doc = parse("<div>three   <br>four</div>");
        assert_eq!(inner_text(&doc.select("div")).trim(), "three\nfour");
    }

    #[test]
    fn inner_text_keeps_preformatted_whitespace() {
        let doc = parse("<pre>a  b\n  c</pre>");
        assert!(inner_text(&doc.select("pre")).contains("a  b\n  c"));
    }

    #[test]
    fn retain_attributes_drops_the_rest() {
        let doc = parse(r#"<img src="a.png" alt="A" data-track="1" class="x">"#);
        let img = doc.select("img");
        retain_attributes(&img, &["src", "alt"]);
        let mut names: Vec<String> = get_all_attributes(&img).into_iter().map(|(k, _)| k).collect();
        names.sort();
        assert_eq!(names, vec!["alt".to_string(), "src".to_string()]);
    }

    #[test]
    fn compile_rejects_invalid_selectors() {
        assert!(compile("div > ").is_err());
        assert!(compile(".item a[href]").is_ok());
    }

    #[test]
    fn escape_html_escapes_markup() {
        assert_eq!(escape_html(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
