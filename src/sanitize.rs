//! Content sanitizer.
//!
//! Strips non-content nodes (scripts, styles, embeds, form controls, media
//! wrappers) from a subtree. Both extractors run it on their private copy of
//! the page before producing text or Markdown.

use crate::dom::Selection;
use crate::patterns::{CHROME_SELECTOR, REMOVAL_SELECTOR};

/// Remove every element of the fixed removal set from `root`'s subtree.
///
/// Mutates and returns the same selection.
pub fn clean<'a, 'b>(root: &'b Selection<'a>) -> &'b Selection<'a> {
    root.select(REMOVAL_SELECTOR.as_str()).remove();
    root
}

/// Remove navigation, sidebars, headers and footers from `root`'s subtree.
pub fn strip_chrome(root: &Selection) {
    root.select(CHROME_SELECTOR).remove();
}
