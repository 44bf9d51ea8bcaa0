//! CSS asset extraction from page markup.
//!
//! GitLab serves its stylesheets with a content hash baked into the
//! filename (`application-<hash>.css`). This module pulls those
//! filenames out of `<link>` elements so they can be looked up in the
//! knowledge base.

use scraper::{ElementRef, Html, Selector};

/// `rel` tokens that mark a link as a stylesheet reference.
const CSS_REL_TOKENS: &[&str] = &["stylesheet", "preload"];

const CSS_SUFFIX: &str = ".css";

/// Returns the CSS filenames referenced by stylesheet and preload links,
/// in document order.
///
/// Duplicates are kept. Markup that cannot be parsed yields an empty
/// list rather than an error.
///
/// # Example
///
/// ```
/// use gitlab_fingerprint::extractor::extract_css_filenames;
///
/// let html = r#"<link rel="stylesheet" href="/assets/application-abc123.css">"#;
/// assert_eq!(extract_css_filenames(html), vec!["application-abc123.css"]);
/// ```
pub fn extract_css_filenames(markup: &str) -> Vec<String> {
    let selector = match Selector::parse("link, noscript") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut filenames = Vec::new();
    collect_css_filenames(&Html::parse_document(markup), &selector, &mut filenames);
    filenames
}

fn collect_css_filenames(document: &Html, selector: &Selector, out: &mut Vec<String>) {
    for element in document.select(selector) {
        // Parsing runs with scripting enabled, so <noscript> contents
        // arrive as raw text and have to be parsed again.
        if element.value().name() == "noscript" {
            let inner: String = element.text().collect();
            if !inner.trim().is_empty() {
                collect_css_filenames(&Html::parse_fragment(&inner), selector, out);
            }
            continue;
        }

        if !has_css_rel(&element) {
            continue;
        }
        if let Some(name) = element.value().attr("href").and_then(css_filename) {
            out.push(name);
        }
    }
}

fn has_css_rel(link: &ElementRef<'_>) -> bool {
    link.value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace().any(|token| {
                CSS_REL_TOKENS
                    .iter()
                    .any(|wanted| token.eq_ignore_ascii_case(wanted))
            })
        })
        .unwrap_or(false)
}

/// Final path segment of `href` when it names a `.css` file.
fn css_filename(href: &str) -> Option<String> {
    if !href.ends_with(CSS_SUFFIX) {
        return None;
    }
    let name = href.rsplit('/').next().unwrap_or(href);
    Some(name.to_string())
}
