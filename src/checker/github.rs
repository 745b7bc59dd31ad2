// src/checker/github.rs
// =============================================================================
// This module plugs the GitHub validator into link checking.
//
// It owns one GitHub client per host (github.com plus each configured
// enterprise host), runs the resolution under a deadline and turns the
// outcome into a LinkCheckResult:
//
//   Ok                 -> Ok
//   NotFound           -> Broken     (confirmed broken)
//   Format/Unsupported -> Error      (the URL itself is wrong)
//   Client error       -> Error      (could not confirm), or Ok if the
//                                     API rate limited us
//   Timeout            -> Timeout
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::http::RATE_LIMITED;
use super::{LinkCheckResult, LinkStatus};
use crate::config::Config;
use crate::github::{is_public_host, parse_url, resolve_url, GithubClient, GithubError, RestClient};

pub struct GithubChecker {
    public: Arc<dyn GithubClient>,
    enterprise: HashMap<String, Arc<dyn GithubClient>>,
    timeout: Duration,
}

impl GithubChecker {
    pub fn new(public: Arc<dyn GithubClient>, timeout: Duration) -> Self {
        Self {
            public,
            enterprise: HashMap::new(),
            timeout,
        }
    }

    /// Registers the client for an enterprise host
    pub fn with_enterprise(mut self, host: &str, client: Arc<dyn GithubClient>) -> Self {
        self.enterprise.insert(host.to_lowercase(), client);
        self
    }

    // Builds REST clients from the config.
    //
    // `token` (from --github-token or GITHUB_TOKEN) wins over the file's
    // github.token for github.com.
    pub fn from_config(config: &Config, token: Option<&str>) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let public_token = token.or(config.github.token.as_deref());
        if public_token.is_none() {
            tracing::warn!("no GitHub token configured, API rate limits will be low");
        }

        let public = RestClient::new(&config.github.api_url, public_token, timeout)?;
        let mut checker = GithubChecker::new(Arc::new(public), timeout);

        for host in &config.github.enterprise {
            let api_url = host
                .api_url
                .clone()
                .unwrap_or_else(|| RestClient::enterprise_api_url(&host.host));
            let client = RestClient::new(&api_url, host.token.as_deref(), timeout)?;
            checker = checker.with_enterprise(&host.host, Arc::new(client));
        }
        Ok(checker)
    }

    fn client_for(&self, host: &str) -> Option<&Arc<dyn GithubClient>> {
        if is_public_host(host) {
            Some(&self.public)
        } else {
            self.enterprise.get(&host.to_lowercase())
        }
    }

    // Dropping the resolution future on timeout aborts its in-flight request
    async fn validate(&self, url: &str) -> Result<(), GithubError> {
        let host = parse_url(url)
            .map_err(|e| GithubError::format(e.to_string()))?
            .host;
        let client = self.client_for(&host).ok_or_else(|| {
            GithubError::format(format!("no GitHub client configured for host {}", host))
        })?;

        match tokio::time::timeout(self.timeout, resolve_url(client.as_ref(), url)).await {
            Ok(result) => result,
            Err(_) => Err(GithubError::Timeout(self.timeout.as_secs())),
        }
    }

    pub async fn check(&self, url: String) -> LinkCheckResult {
        let outcome = self.validate(&url).await;
        to_result(url, outcome)
    }
}

fn to_result(url: String, outcome: Result<(), GithubError>) -> LinkCheckResult {
    match outcome {
        Ok(()) => LinkCheckResult::new(url, LinkStatus::Ok, "exists on GitHub"),
        Err(e @ GithubError::NotFound { .. }) => {
            LinkCheckResult::new(url, LinkStatus::Broken, e.to_string())
        }
        Err(GithubError::Client(e)) if e.is_rate_limited() => {
            tracing::warn!(%url, "GitHub API rate limit hit, not verified");
            LinkCheckResult::new(url, LinkStatus::Ok, RATE_LIMITED)
        }
        Err(e @ GithubError::Timeout(_)) => {
            LinkCheckResult::new(url, LinkStatus::Timeout, e.to_string())
        }
        Err(e) => LinkCheckResult::new(url, LinkStatus::Error, e.to_string()),
    }
}
