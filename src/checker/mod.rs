// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - markdown / html: extract links from documentation files
// - http: checks plain URLs with HEAD/GET requests
// - github: checks GitHub URLs through the GitHub API validator
// - local: checks relative links against the filesystem
//
// Every link is classified first (GitHub, plain HTTP, local file), then the
// unique targets are checked concurrently.
// =============================================================================

mod github;
mod html;
mod http;
mod local;
mod markdown;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub use github::GithubChecker;
pub use html::extract_html_links;
pub use markdown::extract_markdown_links;

// Represents the status of a link after checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Link is working
    Ok,
    /// Link redirects to another URL (301, 302, etc.)
    Redirect { location: String },
    /// Link is definitively broken (404, 410, missing file, missing GitHub resource)
    Broken,
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Matched an ignore_links pattern, not checked
    Skipped,
    /// Could not confirm either way (5xx, auth failure, malformed URL)
    Error,
}

// Represents the result of checking a single link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCheckResult {
    /// The URL (or resolved path) that was checked
    pub url: String,
    #[serde(flatten)]
    pub status: LinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Documentation files the link appeared in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl LinkCheckResult {
    pub fn new(url: String, status: LinkStatus, message: impl Into<String>) -> Self {
        Self {
            url,
            status,
            message: Some(message.into()),
            sources: Vec::new(),
        }
    }

    /// Returns true for Ok, Redirect and Skipped statuses
    pub fn is_ok(&self) -> bool {
        matches!(
            self.status,
            LinkStatus::Ok | LinkStatus::Redirect { .. } | LinkStatus::Skipped
        )
    }

    /// True only when the target is confirmed missing
    pub fn is_broken(&self) -> bool {
        self.status == LinkStatus::Broken
    }
}

/// Where a link points
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkTarget {
    Github(String),
    Http(String),
    Local(PathBuf),
}

impl LinkTarget {
    // Classifies a raw link found in a file under `base`
    //
    // Returns None for schemes we never check (ftp:, mailto:, ...).
    pub fn classify(link: &str, base: &Path, root: &Path, github_hosts: &[String]) -> Option<Self> {
        match url::Url::parse(link) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                let host = url.host_str().unwrap_or_default();
                if github_hosts.iter().any(|h| h == host) {
                    Some(LinkTarget::Github(link.to_string()))
                } else {
                    Some(LinkTarget::Http(link.to_string()))
                }
            }
            Ok(_) => None,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Some(LinkTarget::Local(local::resolve_local(link, base, root)))
            }
            Err(_) => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            LinkTarget::Github(url) | LinkTarget::Http(url) => url.clone(),
            LinkTarget::Local(path) => path.display().to_string(),
        }
    }
}

/// Everything needed to check links, shared by all concurrent checks
pub struct Checker {
    http: reqwest::Client,
    github: GithubChecker,
    ignore: RegexSet,
    github_hosts: Vec<String>,
    concurrency: usize,
}

impl Checker {
    pub fn new(config: &Config, github: GithubChecker) -> Result<Self> {
        let ignore = RegexSet::new(&config.ignore_links).context("Invalid ignore_links pattern")?;
        Ok(Self {
            http: http::build_client(Duration::from_secs(config.timeout_secs))?,
            github,
            ignore,
            github_hosts: config.github_hosts(),
            concurrency: config.concurrency.max(1),
        })
    }

    pub fn classify(&self, link: &str, base: &Path, root: &Path) -> Option<LinkTarget> {
        LinkTarget::classify(link, base, root, &self.github_hosts)
    }

    // Checks one target
    pub async fn check(&self, target: &LinkTarget) -> LinkCheckResult {
        let display = target.display();
        if self.ignore.is_match(&display) {
            return LinkCheckResult::new(display, LinkStatus::Skipped, "ignored by configuration");
        }
        match target {
            LinkTarget::Github(url) => self.github.check(url.clone()).await,
            LinkTarget::Http(url) => http::check_http_link(&self.http, url.clone()).await,
            LinkTarget::Local(path) => local::check_local(path),
        }
    }

    // Checks every unique target concurrently
    //
    // `targets` maps each target to the files it appeared in. Up to
    // `concurrency` checks are in flight at once; results come back in
    // completion order, so we sort them by URL afterwards.
    pub async fn check_all(
        self: Arc<Self>,
        targets: BTreeMap<LinkTarget, Vec<String>>,
    ) -> Vec<LinkCheckResult> {
        let concurrency = self.concurrency;
        let futures = targets.into_iter().map(|(target, sources)| {
            let checker = self.clone();
            async move {
                let mut result = checker.check(&target).await;
                result.sources = sources;
                result
            }
        });

        let mut results: Vec<LinkCheckResult> = stream::iter(futures)
            .buffer_unordered(concurrency)
            .collect()
            .await;
        results.sort_by(|a, b| a.url.cmp(&b.url));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::FakeClient;

    fn hosts() -> Vec<String> {
        Config::default().github_hosts()
    }

    #[test]
    fn test_classify_links() {
        let base = Path::new("/repo/docs");
        let root = Path::new("/repo");

        assert_eq!(
            LinkTarget::classify("https://github.com/acme/widgets", base, root, &hosts()),
            Some(LinkTarget::Github("https://github.com/acme/widgets".to_string()))
        );
        assert_eq!(
            LinkTarget::classify("https://raw.githubusercontent.com/a/b/main/x", base, root, &hosts()),
            Some(LinkTarget::Http("https://raw.githubusercontent.com/a/b/main/x".to_string()))
        );
        assert_eq!(
            LinkTarget::classify("img/logo.png", base, root, &hosts()),
            Some(LinkTarget::Local(PathBuf::from("/repo/docs/img/logo.png")))
        );
        assert_eq!(
            LinkTarget::classify("ftp://example.com/file", base, root, &hosts()),
            None
        );
    }

    #[test]
    fn test_link_result_is_ok() {
        let ok = LinkCheckResult::new("https://example.com".to_string(), LinkStatus::Ok, "HTTP 200");
        assert!(ok.is_ok());

        let broken = LinkCheckResult::new("https://example.com".to_string(), LinkStatus::Broken, "HTTP 404");
        assert!(!broken.is_ok());
        assert!(broken.is_broken());
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = LinkCheckResult::new(
            "https://example.com".to_string(),
            LinkStatus::Redirect {
                location: "https://example.org".to_string(),
            },
            "HTTP 301",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "redirect");
        assert_eq!(json["location"], "https://example.org");
        assert!(json.get("sources").is_none());
    }

    #[tokio::test]
    async fn test_check_all_local_ignored_and_github() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.md"), "# here").unwrap();

        let mut config = Config::default();
        config.ignore_links = vec!["^https://localhost".to_string()];
        let github = GithubChecker::new(
            Arc::new(FakeClient::new().missing("get_contents")),
            Duration::from_secs(5),
        );
        let checker = Arc::new(Checker::new(&config, github).unwrap());

        let mut targets = BTreeMap::new();
        for link in [
            "present.md",
            "absent.md",
            "https://localhost:8080/admin",
            "https://github.com/acme/widgets/blob/main/gone.md",
        ] {
            let target = checker.classify(link, dir.path(), dir.path()).unwrap();
            targets.insert(target, vec!["README.md".to_string()]);
        }

        let results = checker.check_all(targets).await;
        assert_eq!(results.len(), 4);
        let status_of = |needle: &str| {
            results
                .iter()
                .find(|r| r.url.contains(needle))
                .map(|r| r.status.clone())
                .unwrap()
        };
        assert_eq!(status_of("present.md"), LinkStatus::Ok);
        assert_eq!(status_of("absent.md"), LinkStatus::Broken);
        assert_eq!(status_of("localhost"), LinkStatus::Skipped);
        assert_eq!(status_of("gone.md"), LinkStatus::Broken);
        assert!(results.iter().all(|r| r.sources == vec!["README.md"]));
    }

    #[tokio::test]
    async fn test_public_orgs_link_can_be_ignored() {
        let mut config = Config::default();
        config.ignore_links = vec!["^https://github\\.com/orgs/".to_string()];
        let client = Arc::new(FakeClient::new());
        let checker = Checker::new(&config, GithubChecker::new(client.clone(), Duration::from_secs(5))).unwrap();

        let target = checker
            .classify("https://github.com/orgs/acme/people", Path::new("."), Path::new("."))
            .unwrap();
        let result = checker.check(&target).await;
        assert_eq!(result.status, LinkStatus::Skipped);
        assert!(client.calls().is_empty());
    }
}
