//! URL Utility Functions
//!
//! Validation and resolution helpers that reproduce the browser's URL
//! property semantics on a parsed snapshot, plus decoding of search-engine
//! click-redirect links.

use base64::{engine::general_purpose, Engine as _};
use url::Url;

use crate::dom::{self, Document};

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Convert a relative or absolute URL to absolute form.
///
/// Special schemes (`data:`, `javascript:`, `mailto:`, `tel:`, `blob:`) are
/// returned unchanged, as is anything that cannot be joined onto `base`.
#[must_use]
pub fn create_absolute_url(url_str: &str, base: Option<&Url>) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return String::new();
    }

    if ["data:", "javascript:", "mailto:", "tel:", "blob:"]
        .iter()
        .any(|scheme| url_str.starts_with(scheme))
    {
        return url_str.to_string();
    }

    if let Ok(absolute) = Url::parse(url_str) {
        return absolute.to_string();
    }

    match base.map(|b| b.join(url_str)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => url_str.to_string(),
    }
}

/// Base URL used for resolution: the document's `<base href>` when present,
/// else the page URL.
#[must_use]
pub fn document_base_url(doc: &Document, page_url: &str) -> Option<Url> {
    let page = Url::parse(page_url).ok();
    let declared = dom::get_attribute(&doc.select("base[href]").first(), "href");

    match (declared, page) {
        (Some(href), page) => Url::parse(&create_absolute_url(&href, page.as_ref())).ok().or(page),
        (None, page) => page,
    }
}

/// Resolve every candidate URL in a `srcset` value, keeping descriptors.
#[must_use]
pub fn resolve_srcset(srcset: &str, base: Option<&Url>) -> String {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            let mut parts = candidate.splitn(2, char::is_whitespace);
            let url = parts.next().unwrap_or_default();
            match parts.next() {
                Some(descriptor) => {
                    format!("{} {}", create_absolute_url(url, base), descriptor.trim())
                }
                None => create_absolute_url(url, base),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Query parameters a click-redirect may carry its target in, in lookup order.
const REDIRECT_PARAMS: &[&str] = &["u", "r", "url", "redirect_url", "link"];

/// Markers Bing prepends to a base64 target.
const BASE64_MARKERS: &[&str] = &["a1", "a2", "a3"];

/// Decode a Bing click-redirect (`bing.com/ck/a?...&u=a1<base64>`) into the
/// target it points at.
///
/// The target may sit in `u`, `r`, `url`, `redirect_url` or `link`, either
/// base64 encoded behind an `a1`/`a2`/`a3` marker or as a (possibly doubly)
/// percent-encoded URL. Returns `None` for non-Bing URLs or when no
/// parameter yields an absolute http(s) URL.
#[must_use]
pub fn decode_bing_redirect(bing_url: &str) -> Option<String> {
    let parsed = Url::parse(bing_url).ok()?;
    let host = parsed.host_str()?;
    if !(host == "bing.com" || host.ends_with(".bing.com")) {
        return None;
    }

    REDIRECT_PARAMS.iter().find_map(|param| {
        parsed
            .query_pairs()
            .filter(|(key, _)| key == param)
            .find_map(|(_, value)| decode_redirect_target(&value))
    })
}

/// One redirect parameter value (already percent-decoded once) to its target.
fn decode_redirect_target(value: &str) -> Option<String> {
    let value = value.trim();
    if is_absolute_url(value).0 {
        return Some(value.to_string());
    }
    if let Ok(decoded) = urlencoding::decode(value) {
        if is_absolute_url(&decoded).0 {
            return Some(decoded.into_owned());
        }
    }

    let unmarked = BASE64_MARKERS
        .iter()
        .find_map(|marker| value.strip_prefix(marker));
    unmarked
        .and_then(decode_base64_url)
        .or_else(|| decode_base64_url(value))
}

fn decode_base64_url(payload: &str) -> Option<String> {
    [
        &general_purpose::URL_SAFE_NO_PAD,
        &general_purpose::URL_SAFE,
        &general_purpose::STANDARD_NO_PAD,
        &general_purpose::STANDARD,
    ]
    .iter()
    .filter_map(|engine| engine.decode(payload).ok())
    .filter_map(|bytes| String::from_utf8(bytes).ok())
    .find(|target| is_absolute_url(target).0)
}
