// src/checker/markdown.rs
// =============================================================================
// This module extracts links from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Resolves reference-style links ([text][ref]) for us
//
// Both links and images are collected. Relative destinations are kept:
// they are checked against the filesystem later.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

// Extracts every checkable link destination from Markdown text
//
// Example input:
//   "See [Rust](https://www.rust-lang.org) and ![logo](img/logo.png)"
//
// Example output:
//   vec!["https://www.rust-lang.org", "img/logo.png"]
pub fn extract_markdown_links(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link(_, dest_url, _)) | Event::Start(Tag::Image(_, dest_url, _)) => {
                Some(dest_url.to_string())
            }
            _ => None,
        })
        .filter(|url| is_checkable_link(url))
        .collect()
}

// Decides whether a link destination is something we can check
//
// We skip:
// - mailto:, tel:, javascript:, data: links
// - pure in-page anchors ("#usage")
// - empty destinations
pub fn is_checkable_link(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.starts_with('#') {
        return false;
    }
    let lower = url.to_lowercase();
    !["mailto:", "tel:", "javascript:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_link() {
        let markdown = "Check out [Rust](https://www.rust-lang.org)!";
        let links = extract_markdown_links(markdown);
        assert_eq!(links, vec!["https://www.rust-lang.org"]);
    }

    #[test]
    fn test_extract_multiple_links_and_images() {
        let markdown = r#"
# Resources

- [Rust](https://www.rust-lang.org)
- [Widgets](https://github.com/acme/widgets/blob/main/README.md#install)
- ![logo](img/logo.png)
- [Setup][setup]

[setup]: ../SETUP.md
        "#;
        let links = extract_markdown_links(markdown);
        assert_eq!(links.len(), 4);
        assert!(links.contains(&"img/logo.png".to_string()));
        assert!(links.contains(&"../SETUP.md".to_string()));
    }

    #[test]
    fn test_skip_mailto_and_anchors() {
        let markdown = "Email [me](mailto:test@example.com) or jump to [usage](#usage)";
        let links = extract_markdown_links(markdown);
        assert!(links.is_empty());
    }

    #[test]
    fn test_keep_relative_links() {
        let markdown = "See [docs](./docs/README.md)";
        let links = extract_markdown_links(markdown);
        assert_eq!(links, vec!["./docs/README.md"]);
    }
}
