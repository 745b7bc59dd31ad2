// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML documentation files.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Unlike a crawler, we do not resolve relative links against a base URL
// here: a relative href in a local .html file points at another local file
// and is resolved against the filesystem by the local checker.
// =============================================================================

use scraper::{Html, Selector};

use super::markdown::is_checkable_link;

// (selector, attribute) pairs that carry links
const LINK_ATTRIBUTES: [(&str, &str); 4] = [
    ("a[href]", "href"),
    ("link[href]", "href"),
    ("img[src]", "src"),
    ("script[src]", "src"),
];

// Extracts all checkable links from HTML content
//
// Example:
//   html = "<a href='https://example.com'>x</a><img src='logo.png'>"
//   result = ["https://example.com", "logo.png"]
pub fn extract_html_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for (css, attribute) in LINK_ATTRIBUTES {
        // Our selectors are constants; a failure here is a programmer error
        let Ok(selector) = Selector::parse(css) else {
            tracing::error!(css, "invalid built-in selector");
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                if is_checkable_link(value) {
                    links.push(value.trim().to_string());
                }
            }
        }
    }

    links
}
