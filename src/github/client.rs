// src/github/client.rs
// =============================================================================
// The narrow interface the handlers use to talk to GitHub.
//
// Handlers only ever see `&dyn GithubClient`, never reqwest directly. That
// keeps the dispatch logic testable against a fake (see testing.rs) and lets
// github.com and every enterprise host have their own authenticated client.
//
// The response models below hold only the fields a handler actually reads.
// serde ignores everything else in GitHub's (large) JSON payloads.
// =============================================================================

use async_trait::async_trait;
use serde::Deserialize;

use super::error::ClientError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub default_branch: String,
    #[serde(default)]
    pub has_wiki: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentItem {
    pub path: String,
    /// Base64 file body; only present for single files
    #[serde(default)]
    pub content: Option<String>,
}

/// What the contents endpoint returns: one file or a directory listing
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    File(ContentItem),
    Dir(Vec<ContentItem>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Commit {
    pub sha: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityAdvisory {
    pub ghsa_id: String,
}

// Existence-only answers: a 2xx is all the handlers need, the body is ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comparison {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Milestone {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Workflow {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowRun {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowJob {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowJobs {}

/// A user or organization account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {}

/// Every remote call the handlers can make.
///
/// Implementations must be safe to share across tasks: the checker resolves
/// many links concurrently through one client.
#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, ClientError>;

    async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Contents, ClientError>;

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit, ClientError>;

    /// Most recent commits, optionally starting from a branch/tag/SHA
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        sha: Option<&str>,
    ) -> Result<Vec<Commit>, ClientError>;

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, ClientError>;

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, ClientError>;

    async fn list_pull_request_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, ClientError>;

    /// Review comment on a diff (`#discussion_r<id>`)
    async fn get_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> Result<Comment, ClientError>;

    /// Conversation comment (`#issuecomment-<id>`), shared by issues and PRs
    async fn get_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> Result<Comment, ClientError>;

    async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Issue, ClientError>;

    async fn get_milestone(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Milestone, ClientError>;

    async fn list_security_advisories(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<SecurityAdvisory>, ClientError>;

    /// Workflow by its file name, e.g. `ci.yml`
    async fn get_workflow(
        &self,
        owner: &str,
        repo: &str,
        file_name: &str,
    ) -> Result<Workflow, ClientError>;

    async fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRun, ClientError>;

    async fn get_workflow_job(
        &self,
        owner: &str,
        repo: &str,
        job_id: u64,
    ) -> Result<WorkflowJob, ClientError>;

    async fn list_workflow_jobs_attempt(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        attempt: u64,
    ) -> Result<WorkflowJobs, ClientError>;

    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, ClientError>;

    async fn get_latest_release(&self, owner: &str, repo: &str) -> Result<Release, ClientError>;

    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>, ClientError>;

    async fn get_user(&self, login: &str) -> Result<Account, ClientError>;

    async fn get_organization(&self, login: &str) -> Result<Account, ClientError>;
}
