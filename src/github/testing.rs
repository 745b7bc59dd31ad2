// src/github/testing.rs
// =============================================================================
// In-memory GithubClient used by the handler and dispatcher tests.
//
// Every call is recorded as "<operation> <args...>" so tests can assert
// which remote calls were (or were not) made. Any operation can be told to
// answer 404 or another HTTP status.
// =============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use super::client::*;
use super::error::ClientError;

pub struct FakeClient {
    calls: Mutex<Vec<String>>,
    statuses: HashMap<&'static str, u16>,
    pub default_branch: String,
    pub has_wiki: bool,
    pub file_body: Option<String>,
    pub release_assets: Vec<String>,
    pub labels: Vec<String>,
    pub advisories: Vec<String>,
    pub pr_commits: Vec<String>,
    /// How long get_repository stalls before answering
    pub stall: Option<Duration>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            statuses: HashMap::new(),
            default_branch: "main".to_string(),
            has_wiki: true,
            file_body: None,
            release_assets: Vec::new(),
            labels: Vec::new(),
            advisories: Vec::new(),
            pr_commits: Vec::new(),
            stall: None,
        }
    }

    /// Make `operation` answer 404
    pub fn missing(self, operation: &'static str) -> Self {
        self.failing(operation, 404)
    }

    /// Make `operation` answer with the given HTTP status
    pub fn failing(mut self, operation: &'static str, status: u16) -> Self {
        self.statuses.insert(operation, status);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, operation: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| c.split(' ').next() == Some(operation))
    }

    fn call(&self, operation: &'static str, args: &[&dyn ToString]) -> Result<(), ClientError> {
        let mut line = operation.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.to_string());
        }
        self.calls.lock().unwrap().push(line);

        match self.statuses.get(operation) {
            Some(&status) => Err(ClientError::Status {
                status,
                endpoint: operation.to_string(),
                message: "fake".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn commits(shas: &[String]) -> Vec<Commit> {
    shas.iter().map(|sha| Commit { sha: sha.clone() }).collect()
}

#[async_trait]
impl GithubClient for FakeClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, ClientError> {
        self.call("get_repository", &[&owner, &repo])?;
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        Ok(Repository {
            default_branch: self.default_branch.clone(),
            has_wiki: self.has_wiki,
        })
    }

    async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Contents, ClientError> {
        self.call("get_contents", &[&owner, &repo, &path, &reference])?;
        Ok(Contents::File(ContentItem {
            path: path.to_string(),
            content: self
                .file_body
                .as_ref()
                .map(|body| base64::engine::general_purpose::STANDARD.encode(body)),
        }))
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit, ClientError> {
        self.call("get_commit", &[&owner, &repo, &sha])?;
        Ok(Commit {
            sha: sha.to_string(),
        })
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        sha: Option<&str>,
    ) -> Result<Vec<Commit>, ClientError> {
        self.call("list_commits", &[&owner, &repo, &sha.unwrap_or("-")])?;
        Ok(vec![Commit::default()])
    }

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, ClientError> {
        self.call("compare_commits", &[&owner, &repo, &base, &head])?;
        Ok(Comparison::default())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, ClientError> {
        self.call("get_pull_request", &[&owner, &repo, &number])?;
        Ok(PullRequest::default())
    }

    async fn list_pull_request_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, ClientError> {
        self.call("list_pull_request_commits", &[&owner, &repo, &number])?;
        Ok(commits(&self.pr_commits))
    }

    async fn get_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> Result<Comment, ClientError> {
        self.call("get_pull_request_comment", &[&owner, &repo, &id])?;
        Ok(Comment::default())
    }

    async fn get_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> Result<Comment, ClientError> {
        self.call("get_issue_comment", &[&owner, &repo, &id])?;
        Ok(Comment::default())
    }

    async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Issue, ClientError> {
        self.call("get_issue", &[&owner, &repo, &number])?;
        Ok(Issue::default())
    }

    async fn get_milestone(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Milestone, ClientError> {
        self.call("get_milestone", &[&owner, &repo, &number])?;
        Ok(Milestone::default())
    }

    async fn list_security_advisories(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<SecurityAdvisory>, ClientError> {
        self.call("list_security_advisories", &[&owner, &repo])?;
        Ok(self
            .advisories
            .iter()
            .map(|id| SecurityAdvisory { ghsa_id: id.clone() })
            .collect())
    }

    async fn get_workflow(
        &self,
        owner: &str,
        repo: &str,
        file_name: &str,
    ) -> Result<Workflow, ClientError> {
        self.call("get_workflow", &[&owner, &repo, &file_name])?;
        Ok(Workflow::default())
    }

    async fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRun, ClientError> {
        self.call("get_workflow_run", &[&owner, &repo, &run_id])?;
        Ok(WorkflowRun::default())
    }

    async fn get_workflow_job(
        &self,
        owner: &str,
        repo: &str,
        job_id: u64,
    ) -> Result<WorkflowJob, ClientError> {
        self.call("get_workflow_job", &[&owner, &repo, &job_id])?;
        Ok(WorkflowJob::default())
    }

    async fn list_workflow_jobs_attempt(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        attempt: u64,
    ) -> Result<WorkflowJobs, ClientError> {
        self.call("list_workflow_jobs_attempt", &[&owner, &repo, &run_id, &attempt])?;
        Ok(WorkflowJobs::default())
    }

    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, ClientError> {
        self.call("get_release_by_tag", &[&owner, &repo, &tag])?;
        Ok(Release {
            assets: self
                .release_assets
                .iter()
                .map(|name| ReleaseAsset { name: name.clone() })
                .collect(),
        })
    }

    async fn get_latest_release(&self, owner: &str, repo: &str) -> Result<Release, ClientError> {
        self.call("get_latest_release", &[&owner, &repo])?;
        Ok(Release {
            assets: self
                .release_assets
                .iter()
                .map(|name| ReleaseAsset { name: name.clone() })
                .collect(),
        })
    }

    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>, ClientError> {
        self.call("list_labels", &[&owner, &repo])?;
        Ok(self
            .labels
            .iter()
            .map(|name| Label { name: name.clone() })
            .collect())
    }

    async fn get_user(&self, login: &str) -> Result<Account, ClientError> {
        self.call("get_user", &[&login])?;
        Ok(Account::default())
    }

    async fn get_organization(&self, login: &str) -> Result<Account, ClientError> {
        self.call("get_organization", &[&login])?;
        Ok(Account::default())
    }
}
