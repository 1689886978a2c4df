//! Page readiness detection.
//!
//! A page is "final" when it is an http(s) document that is not one of the
//! known search-engine redirect interstitials; extraction never runs against
//! anything else.

use crate::patterns::REDIRECT_URL_PREFIXES;

/// Whether `url` is a final content page.
///
/// # Example
///
/// ```rust
/// use rs_pagescrape::readiness::is_final_page;
///
/// assert!(is_final_page("https://example.com/article"));
/// assert!(!is_final_page("https://www.bing.com/ck/a?u=a1aHR0cHM"));
/// assert!(!is_final_page("ftp://example.com"));
/// ```
#[must_use]
pub fn is_final_page(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://"))
        && !REDIRECT_URL_PREFIXES
            .iter()
            .any(|prefix| url.starts_with(prefix))
}
