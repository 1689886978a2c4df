//! Schema-driven extraction.
//!
//! Each element matched by `base_selector` becomes one record; every field
//! spec is evaluated relative to that container. Records missing a required
//! field are dropped. Zero matches are polled with backoff to tolerate lists
//! that hydrate after load, and an exhausted poll is an empty success.

use std::future;

use url::Url;

use super::ExtractContext;
use crate::dom::{self, Document, Matcher, Selection};
use crate::error::{Error, Result};
use crate::markdown::MarkdownConverter;
use crate::patterns::{normalize_newlines, URL_ATTRIBUTES};
use crate::result::Record;
use crate::retry::{retry, RetryPolicy};
use crate::sanitize;
use crate::schema::{ExtractionSchema, FieldKind, FieldSpec};
use crate::url_utils::{
    create_absolute_url, decode_bing_redirect, document_base_url, resolve_srcset,
};
use crate::wait::wait_for_element;

/// A field spec with its selector compiled. `None` targets the container itself.
pub struct CompiledField<'s> {
    pub spec: &'s FieldSpec,
    matcher: Option<Matcher>,
}

/// Compile every field selector up front.
pub fn compile_fields(fields: &[FieldSpec]) -> Result<Vec<CompiledField<'_>>> {
    fields
        .iter()
        .map(|spec| {
            let selector = spec.selector.trim();
            let matcher = if selector.is_empty() {
                None
            } else {
                Some(dom::compile(selector)?)
            };
            Ok(CompiledField { spec, matcher })
        })
        .collect()
}

/// Per-document settings for field evaluation.
pub struct FieldContext<'a> {
    pub base_url: Option<Url>,
    pub converter: &'a MarkdownConverter,
    pub decode_redirects: bool,
}

/// Number of containers `base` matches in `html`.
#[must_use]
pub fn count_matches(html: &str, base: &Matcher) -> usize {
    dom::parse(html).select_matcher(base).length()
}

/// Build the records for every container in `html`.
pub fn extract_records(
    html: &str,
    page_url: &str,
    base: &Matcher,
    fields: &[CompiledField<'_>],
    converter: &MarkdownConverter,
    decode_redirects: bool,
) -> Result<Vec<Record>> {
    let doc: Document = dom::parse(html);
    let ctx = FieldContext {
        base_url: document_base_url(&doc, page_url),
        converter,
        decode_redirects,
    };

    let mut records = Vec::new();
    for container in doc.select_matcher(base).iter() {
        if let Some(record) = extract_record(&container, fields, &ctx)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// One record, or `None` when a required field is empty.
fn extract_record(
    container: &Selection,
    fields: &[CompiledField<'_>],
    ctx: &FieldContext<'_>,
) -> Result<Option<Record>> {
    let mut record = Record::new();
    for field in fields {
        let target = match &field.matcher {
            Some(matcher) => container.select_matcher(matcher).first(),
            None => container.clone(),
        };
        let value = if target.exists() {
            extract_field(&target, field.spec, ctx)?
        } else {
            None
        };

        if field.spec.is_required() && value.as_deref().map_or(true, str::is_empty) {
            return Ok(None);
        }
        record.insert(
            field.spec.name.clone(),
            value.map_or(serde_json::Value::Null, serde_json::Value::String),
        );
    }
    Ok(Some(record))
}

fn extract_field(
    target: &Selection,
    spec: &FieldSpec,
    ctx: &FieldContext<'_>,
) -> Result<Option<String>> {
    let value = match spec.kind {
        FieldKind::Attribute => {
            let Some(name) = spec
                .attribute
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
            else {
                return Ok(None);
            };
            read_attribute(target, name, ctx)
        }
        FieldKind::Html => Some(target.inner_html().trim().to_string()),
        FieldKind::Markdown => {
            let copy = dom::parse(&target.html());
            let root = copy.select("body");
            sanitize::clean(&root);
            Some(ctx.converter.convert_clean(&root.inner_html())?)
        }
        FieldKind::Text => Some(normalize_newlines(&dom::inner_text(target))),
    };
    Ok(value)
}

/// Attribute value with browser property semantics for URL-bearing attributes.
fn read_attribute(target: &Selection, name: &str, ctx: &FieldContext<'_>) -> Option<String> {
    let raw = dom::get_attribute(target, name)?;
    let name = name.to_ascii_lowercase();
    if !URL_ATTRIBUTES.contains(&name.as_str()) {
        return Some(raw);
    }

    let base = ctx.base_url.as_ref();
    if name == "srcset" {
        return Some(resolve_srcset(&raw, base));
    }
    let absolute = create_absolute_url(&raw, base);
    if ctx.decode_redirects {
        if let Some(decoded) = decode_bing_redirect(&absolute) {
            return Some(decoded);
        }
    }
    Some(absolute)
}

/// Run a schema against the live page.
pub async fn run_schema(
    ctx: &ExtractContext<'_>,
    schema: &ExtractionSchema,
) -> Result<Vec<Record>> {
    let base_selector = schema.selectors.base_selector.trim();
    if base_selector.is_empty() {
        return Err(Error::MissingBaseSelector);
    }
    let base = dom::compile(base_selector)?;
    let fields = compile_fields(&schema.selectors.fields)?;

    if let Some(wait_for) = schema.config.wait_selector() {
        let timeout_ms = schema.config.wait_timeout_ms(ctx.options.default_wait_timeout_ms);
        ctx.logger.debug(format!("Waiting up to {timeout_ms}ms for `{wait_for}`"));
        wait_for_element(ctx.viewport, wait_for, timeout_ms).await?;
    }

    let policy = RetryPolicy::schema_poll(ctx.options.max_attempts, ctx.options.backoff_base());
    let polled = retry(&policy, |attempt| {
        let html = ctx.viewport.document_html();
        let found = count_matches(&html, &base);
        let outcome = if found > 0 {
            ctx.logger.debug(format!("Found {found} elements for `{base_selector}`"));
            Ok(html)
        } else {
            ctx.logger.debug(format!(
                "No elements for `{base_selector}` (attempt {}/{}), retrying in {}ms",
                attempt + 1,
                policy.max_attempts,
                policy.delay_for(attempt).as_millis()
            ));
            Err(Error::NoMatches(base_selector.to_string()))
        };
        future::ready(outcome)
    })
    .await;

    let Ok(html) = polled else {
        ctx.logger.info(format!(
            "No elements for `{base_selector}` after all attempts, returning empty result"
        ));
        return Ok(Vec::new());
    };

    let records = extract_records(
        &html,
        &ctx.viewport.current_url(),
        &base,
        &fields,
        ctx.converter,
        ctx.options.decode_redirect_links,
    )?;
    ctx.logger.debug(format!("Extracted {} records", records.len()));
    Ok(records)
}
