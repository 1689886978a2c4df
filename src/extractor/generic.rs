//! Readability-style extraction of the whole page.
//!
//! The body is sanitized and rendered either as plain text or as Markdown
//! with configurable image and link retention. Output shorter than the
//! minimum length counts as a failed attempt and is retried with backoff.

use std::future;

use url::Url;

use super::ExtractContext;
use crate::dom::{self, Document, Selection};
use crate::error::{Error, Result};
use crate::markdown::MarkdownConverter;
use crate::patterns::{normalize_newlines, HEADING_SELECTOR};
use crate::result::GenericContent;
use crate::retry::{retry, RetryPolicy};
use crate::sanitize;
use crate::schema::{ContentFormat, GenericContentRule};
use crate::url_utils::{create_absolute_url, document_base_url, is_absolute_url};

/// Document title, falling back to the first `h1`-`h3`.
#[must_use]
pub fn page_title(doc: &Document) -> String {
    let title = dom::collapse_whitespace(&doc.select("title").first().text());
    if !title.is_empty() {
        return title;
    }
    dom::collapse_whitespace(&dom::inner_text(&doc.select(HEADING_SELECTOR).first()))
}

/// Keep only images with a real network `src`, reduced to `src` and `alt`.
fn retain_network_images(body: &Selection, base: Option<&Url>) {
    for img in body.select("img").iter() {
        let src = dom::get_attribute(&img, "src").unwrap_or_default();
        let resolved = create_absolute_url(&src, base);
        if is_absolute_url(&resolved).0 {
            dom::retain_attributes(&img, &["src", "alt"]);
            img.set_attr("src", &resolved);
        } else {
            img.remove();
        }
    }
}

/// Resolve anchor targets, dropping dead ones, and collapse anchor text.
fn normalize_links(body: &Selection, base: Option<&Url>) {
    for anchor in body.select("a").iter() {
        let href = dom::get_attribute(&anchor, "href").unwrap_or_default();
        let href = href.trim();
        if href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:") {
            anchor.remove_attr("href");
        } else {
            anchor.set_attr("href", &create_absolute_url(href, base));
        }

        if !dom::has_element_children(&anchor) {
            let text = dom::collapse_whitespace(&anchor.text());
            anchor.set_html(dom::escape_html(&text).as_str());
        }
    }
}

/// Replace every anchor with its collapsed text.
fn unwrap_links(body: &Selection) {
    for anchor in body.select("a").iter() {
        let text = dom::collapse_whitespace(&dom::inner_text(&anchor));
        if text.is_empty() {
            anchor.remove();
        } else {
            anchor.replace_with_html(dom::escape_html(&text).as_str());
        }
    }
}

fn check_length(content: String, min_chars: usize) -> Result<String> {
    let len = content.chars().count();
    if len < min_chars {
        return Err(Error::ContentTooShort { len, min: min_chars });
    }
    Ok(content)
}

/// One extraction attempt over a page snapshot.
pub fn extract_generic(
    html: &str,
    page_url: &str,
    rule: &GenericContentRule,
    converter: &MarkdownConverter,
    min_chars: usize,
) -> Result<GenericContent> {
    let doc = dom::parse(html);
    let title = page_title(&doc);
    let base = document_base_url(&doc, page_url);

    let body = doc.select("body").first();
    if !body.nodes().first().is_some_and(|node| !node.children().is_empty()) {
        return Err(Error::NoBody);
    }
    sanitize::clean(&body);

    let content = match rule.format {
        ContentFormat::Text => {
            sanitize::strip_chrome(&body);
            check_length(normalize_newlines(&dom::inner_text(&body)), min_chars)?
        }
        ContentFormat::Markdown => {
            if rule.keep_image {
                retain_network_images(&body, base.as_ref());
            } else {
                body.select("img").remove();
            }

            if rule.keep_link {
                normalize_links(&body, base.as_ref());
            } else {
                unwrap_links(&body);
                sanitize::strip_chrome(&body);
            }

            sanitize::clean(&body);
            check_length(converter.convert_clean(&body.inner_html())?, min_chars)?
        }
    };

    Ok(GenericContent {
        title,
        content,
        url: page_url.to_string(),
    })
}

/// Run generic extraction against the live page, retrying short or missing
/// content.
pub async fn run_generic(
    ctx: &ExtractContext<'_>,
    rule: &GenericContentRule,
) -> Result<GenericContent> {
    let policy = RetryPolicy::exponential(ctx.options.max_attempts, ctx.options.backoff_base());
    retry(&policy, |attempt| {
        let attempted = extract_generic(
            &ctx.viewport.document_html(),
            &ctx.viewport.current_url(),
            rule,
            ctx.converter,
            ctx.options.min_content_chars,
        );
        match &attempted {
            Ok(content) => ctx.logger.debug(format!(
                "Generic {} extraction succeeded with {} characters",
                rule.format,
                content.content.chars().count()
            )),
            Err(err) => ctx.logger.warn(format!(
                "Generic attempt {}/{} failed: {err}",
                attempt + 1,
                policy.max_attempts
            )),
        }
        future::ready(attempted)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/post/1";

    fn run(html: &str, rule: &GenericContentRule) -> Result<GenericContent> {
        extract_generic(html, URL, rule, &MarkdownConverter::new(), 50)
    }

    fn markdown(keep_image: bool, keep_link: bool) -> GenericContentRule {
        GenericContentRule {
            format: ContentFormat::Markdown,
            keep_image,
            keep_link,
        }
    }

    const ARTICLE: &str = r#"<html><head><title> The  Post </title></head><body>
        <nav>Home | About</nav>
        <article>
          <h1>Heading</h1>
          <p>This paragraph is comfortably longer than fifty characters in total.</p>
          <p>See <a href="/more">  the   docs </a> or <a href="javascript:void(0)">nothing</a>.</p>
          <img src="/a.png" alt="A" data-tracking="1"><img src="data:image/png;base64,AAAA">
        </article>
        <script>track()</script>
        <footer>Copyright</footer>
    </body></html>"#;

    #[test]
    fn text_format_strips_chrome() {
        let rule = GenericContentRule {
            format: ContentFormat::Text,
            ..GenericContentRule::default()
        };
        let out = run(ARTICLE, &rule).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.title, "The Post");
        assert_eq!(out.url, URL);
        assert!(out.content.starts_with("Heading"));
        assert!(!out.content.contains("Home | About"));
        assert!(!out.content.contains("Copyright"));
        assert!(!out.content.contains("track()"));
    }

    #[test]
    fn markdown_without_links_or_images() {
        let out = run(ARTICLE, &markdown(false, false)).unwrap_or_else(|e| panic!("{e}"));
        assert!(out.content.starts_with("# Heading"), "{}", out.content);
        assert!(out.content.contains("See the docs or nothing."), "{}", out.content);
        assert!(!out.content.contains("]("), "{}", out.content);
        assert!(!out.content.contains("Copyright"));
    }

    #[test]
    fn markdown_keeps_resolved_links_and_network_images() {
        let out = run(ARTICLE, &markdown(true, true)).unwrap_or_else(|e| panic!("{e}"));
        assert!(out.content.contains("[the docs](https://example.com/more)"), "{}", out.content);
        assert!(out.content.contains("https://example.com/a.png"), "{}", out.content);
        assert!(!out.content.contains("data:image"), "{}", out.content);
        assert!(!out.content.contains("javascript:"), "{}", out.content);
    }

    #[test]
    fn title_falls_back_to_heading() {
        let doc = dom::parse(
            "<html><head><title></title></head><body><h2>Second</h2><h1>First</h1></body></html>",
        );
        assert_eq!(page_title(&doc), "Second");
    }

    #[test]
    fn short_content_is_rejected() {
        let html = format!("<body><p>{}</p></body>", "a".repeat(49));
        let rule = GenericContentRule {
            format: ContentFormat::Text,
            ..GenericContentRule::default()
        };
        assert!(matches!(run(&html, &rule), Err(Error::ContentTooShort { len: 49, min: 50 })));

        let html = format!("<body><p>{}</p></body>", "a".repeat(50));
        assert!(run(&html, &rule).is_ok());
    }

    #[test]
    fn markdown_length_boundary() {
        let html = format!("<body><p>{}</p></body>", "a".repeat(49));
        assert!(matches!(
            run(&html, &markdown(false, false)),
            Err(Error::ContentTooShort { len: 49, min: 50 })
        ));

        let html = format!("<body><p>{}</p></body>", "a".repeat(50));
        let out = run(&html, &markdown(false, false)).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.content.chars().count(), 50);
    }

    #[test]
    fn preformatted_line_end_spaces_count_toward_length() {
        let html = format!("<body><pre>{}   \nb</pre></body>", "a".repeat(46));
        let rule = GenericContentRule {
            format: ContentFormat::Text,
            ..GenericContentRule::default()
        };
        let out = run(&html, &rule).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.content, format!("{}   \nb", "a".repeat(46)));
        assert_eq!(out.content.chars().count(), 51);
    }

    #[test]
    fn kept_links_drop_empty_and_fragment_targets() {
        let html = r##"<body><p>This paragraph pads the page well past the fifty character mark.</p>
            <p><a href="">Empty</a> and <a href="#">Top</a> and <a href="/x">Real</a></p></body>"##;
        let out = run(html, &markdown(false, true)).unwrap_or_else(|e| panic!("{e}"));
        assert!(
            out.content.contains("Empty and Top and [Real](https://example.com/x)"),
            "{}",
            out.content
        );
        assert!(!out.content.contains("](#)"), "{}", out.content);
        assert!(!out.content.contains("]()"), "{}", out.content);
    }

    #[test]
    fn blob_images_are_dropped() {
        let html = r#"<body><p>This paragraph pads the page well past the fifty character mark.</p>
            <img src="blob:https://example.com/abc" alt="B"><img src="/kept.png" alt="K"></body>"#;
        let out = run(html, &markdown(true, false)).unwrap_or_else(|e| panic!("{e}"));
        assert!(!out.content.contains("blob:"), "{}", out.content);
        assert!(out.content.contains("![K](https://example.com/kept.png)"), "{}", out.content);
    }

    #[test]
    fn empty_body_is_reported() {
        assert!(matches!(run("", &markdown(false, false)), Err(Error::NoBody)));
    }
}
