// src/github/rest.rs
// =============================================================================
// GithubClient implemented over GitHub's REST API with reqwest.
//
// One RestClient exists per GitHub host:
// - github.com talks to https://api.github.com
// - an enterprise host talks to https://<host>/api/v3 (or a configured URL)
//
// The reqwest::Client inside is cheap to clone and pools connections, so a
// single RestClient is shared by every concurrent link check.
// =============================================================================

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::client::*;
use super::error::ClientError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT_VALUE: &str = concat!("link-guardian/", env!("CARGO_PKG_VERSION"));

// GitHub's maximum page size for list endpoints
const PER_PAGE: usize = 100;

// Shape of GitHub's error bodies: {"message": "Not Found", ...}
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct RestClient {
    http: Client,
    api_url: String,
}

impl RestClient {
    // Builds a client for one GitHub host
    //
    // Parameters:
    //   api_url: REST root, e.g. "https://api.github.com"
    //   token: optional personal access token
    //   timeout: per-request timeout
    pub fn new(api_url: &str, token: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Default REST root for an enterprise host
    pub fn enterprise_api_url(host: &str) -> String {
        format!("https://{}/api/v3", host)
    }

    fn repo_endpoint(owner: &str, repo: &str, rest: &str) -> String {
        if rest.is_empty() {
            format!("/repos/{}/{}", owner, repo)
        } else {
            format!("/repos/{}/{}/{}", owner, repo, rest)
        }
    }

    // reqwest percent-encodes query values, so a ref taken from a URL path
    // ("caf%C3%A9") is decoded first or it would be encoded twice
    fn query_value(value: &str) -> Cow<'_, str> {
        urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
    }

    fn contents_request(&self, owner: &str, repo: &str, path: &str, reference: &str) -> (String, RequestBuilder) {
        let endpoint = Self::repo_endpoint(owner, repo, &format!("contents/{}", path));
        let mut request = self.get(&endpoint);
        if !reference.is_empty() {
            request = request.query(&[("ref", Self::query_value(reference))]);
        }
        (endpoint, request)
    }

    fn commits_request(&self, owner: &str, repo: &str, sha: Option<&str>) -> (String, RequestBuilder) {
        let endpoint = Self::repo_endpoint(owner, repo, "commits");
        let mut request = self.get(&endpoint).query(&[("per_page", "1")]);
        if let Some(sha) = sha {
            request = request.query(&[("sha", Self::query_value(sha))]);
        }
        (endpoint, request)
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.http.get(format!("{}{}", self.api_url, endpoint))
    }

    // Sends a request and decodes a 2xx body; anything else becomes a
    // ClientError carrying the status and GitHub's message
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        tracing::trace!(endpoint, "GitHub API request");

        let response = request.send().await.map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message,
            });
        }

        response.json::<T>().await.map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.send(endpoint, self.get(endpoint)).await
    }

    // Walks a list endpoint page by page until a short page comes back
    async fn fetch_all<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let request = self
                .get(endpoint)
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let batch: Vec<T> = self.send(endpoint, request).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl GithubClient for RestClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, ClientError> {
        self.fetch(&Self::repo_endpoint(owner, repo, "")).await
    }

    async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Contents, ClientError> {
        let (endpoint, request) = self.contents_request(owner, repo, path, reference);
        self.send(&endpoint, request).await
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit, ClientError> {
        self.fetch(&Self::repo_endpoint(owner, repo, &format!("commits/{}", sha)))
            .await
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        sha: Option<&str>,
    ) -> Result<Vec<Commit>, ClientError> {
        let (endpoint, request) = self.commits_request(owner, repo, sha);
        self.send(&endpoint, request).await
    }

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, ClientError> {
        let rest = format!("compare/{}...{}", base, head);
        let endpoint = Self::repo_endpoint(owner, repo, &rest);
        // The diff itself can be huge; one file is enough to prove it exists
        let request = self.get(&endpoint).query(&[("per_page", "1")]);
        self.send(&endpoint, request).await
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, ClientError> {
        self.fetch(&Self::repo_endpoint(owner, repo, &format!("pulls/{}", number)))
            .await
    }

    async fn list_pull_request_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, ClientError> {
        let rest = format!("pulls/{}/commits", number);
        self.fetch_all(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> Result<Comment, ClientError> {
        let rest = format!("pulls/comments/{}", id);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> Result<Comment, ClientError> {
        let rest = format!("issues/comments/{}", id);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Issue, ClientError> {
        self.fetch(&Self::repo_endpoint(owner, repo, &format!("issues/{}", number)))
            .await
    }

    async fn get_milestone(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Milestone, ClientError> {
        let rest = format!("milestones/{}", number);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn list_security_advisories(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<SecurityAdvisory>, ClientError> {
        self.fetch_all(&Self::repo_endpoint(owner, repo, "security-advisories"))
            .await
    }

    async fn get_workflow(
        &self,
        owner: &str,
        repo: &str,
        file_name: &str,
    ) -> Result<Workflow, ClientError> {
        let rest = format!("actions/workflows/{}", file_name);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRun, ClientError> {
        let rest = format!("actions/runs/{}", run_id);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_workflow_job(
        &self,
        owner: &str,
        repo: &str,
        job_id: u64,
    ) -> Result<WorkflowJob, ClientError> {
        let rest = format!("actions/jobs/{}", job_id);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn list_workflow_jobs_attempt(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        attempt: u64,
    ) -> Result<WorkflowJobs, ClientError> {
        let rest = format!("actions/runs/{}/attempts/{}/jobs", run_id, attempt);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, ClientError> {
        let rest = format!("releases/tags/{}", tag);
        self.fetch(&Self::repo_endpoint(owner, repo, &rest)).await
    }

    async fn get_latest_release(&self, owner: &str, repo: &str) -> Result<Release, ClientError> {
        self.fetch(&Self::repo_endpoint(owner, repo, "releases/latest"))
            .await
    }

    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>, ClientError> {
        self.fetch_all(&Self::repo_endpoint(owner, repo, "labels")).await
    }

    async fn get_user(&self, login: &str) -> Result<Account, ClientError> {
        self.fetch(&format!("/users/{}", login)).await
    }

    async fn get_organization(&self, login: &str) -> Result<Account, ClientError> {
        self.fetch(&format!("/orgs/{}", login)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_endpoint() {
        assert_eq!(RestClient::repo_endpoint("o", "r", ""), "/repos/o/r");
        assert_eq!(
            RestClient::repo_endpoint("o", "r", "releases/latest"),
            "/repos/o/r/releases/latest"
        );
    }

    #[test]
    fn test_enterprise_api_url() {
        assert_eq!(
            RestClient::enterprise_api_url("github.mycorp.com"),
            "https://github.mycorp.com/api/v3"
        );
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client =
            RestClient::new("https://api.github.com/", Some("t0ken"), Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_encoded_ref_is_sent_once_encoded() {
        let client = RestClient::new(DEFAULT_API_URL, None, Duration::from_secs(5)).unwrap();

        let (endpoint, request) = client.contents_request("o", "r", "README.md", "caf%C3%A9");
        assert_eq!(endpoint, "/repos/o/r/contents/README.md");
        let url = request.build().unwrap().url().clone();
        assert_eq!(url.query(), Some("ref=caf%C3%A9"));
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "ref").map(|(_, v)| v.into_owned()),
            Some("café".to_string())
        );

        let (_, request) = client.commits_request("o", "r", Some("feature%2Fx"));
        let url = request.build().unwrap().url().clone();
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "sha").map(|(_, v)| v.into_owned()),
            Some("feature/x".to_string())
        );
    }

    #[test]
    fn test_contents_deserializes_file_and_dir() {
        let file: Contents = serde_json::from_str(
            r#"{"name":"README.md","path":"README.md","type":"file","content":"aGk=","encoding":"base64"}"#,
        )
        .unwrap();
        assert!(matches!(file, Contents::File(ref f) if f.path == "README.md" && f.content.is_some()));

        let dir: Contents =
            serde_json::from_str(r#"[{"name":"a.md","path":"docs/a.md","type":"file"}]"#).unwrap();
        assert!(matches!(dir, Contents::Dir(ref items) if items.len() == 1));
    }
}
