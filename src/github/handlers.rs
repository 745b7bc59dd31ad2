// src/github/handlers.rs
// =============================================================================
// One handler per GitHub resource family.
//
// Every handler has the same shape: it gets the client plus a Target
// (owner, repo, reference, path, fragment) and answers Ok(()) or an error.
// The uniform shape lets handlers fall back on each other; an empty
// reference on a pull request URL, for example, is just a repo check.
//
// Some GitHub features have no API to check against. Those handlers are
// explicit approximations:
// - wiki pages: only "the wiki is enabled" can be confirmed
// - diff-<hash> fragments on pull requests: accepted as-is
// - packages: need authenticated, non-public APIs; the repo check stands in
// =============================================================================

use std::collections::HashMap;

use base64::Engine;
use pulldown_cmark::{Event, Parser, Tag};

use super::client::{Contents, GithubClient};
use super::error::GithubError;
use super::url::ResourceType;

/// The URL parts a handler works with
#[derive(Debug, Clone, Copy, Default)]
pub struct Target<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub reference: &'a str,
    pub path: &'a str,
    pub fragment: &'a str,
}

/// Every resource check the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    RepoExists,
    Organization,
    User,
    Contents,
    Commit,
    Commits,
    Compare,
    PullRequest,
    Pulls,
    Issue,
    Milestone,
    Releases,
    Workflows,
    Labels,
    Advisory,
    Wiki,
    Packages,
    Nothing,
}

impl Handler {
    // The fixed resource-type -> handler table.
    //
    // Unknown(..) has no handler; the dispatcher turns that into an
    // "unsupported" error so the table can be extended.
    pub fn for_type(typ: &ResourceType) -> Option<Handler> {
        let handler = match typ {
            ResourceType::Repo
            | ResourceType::Branches
            | ResourceType::Tags
            | ResourceType::Discussions
            | ResourceType::Projects
            | ResourceType::Settings
            | ResourceType::Security
            | ResourceType::Attestations => Handler::RepoExists,
            ResourceType::Blob | ResourceType::Tree | ResourceType::Raw | ResourceType::Blame => {
                Handler::Contents
            }
            ResourceType::Commit => Handler::Commit,
            ResourceType::Commits => Handler::Commits,
            ResourceType::Compare => Handler::Compare,
            ResourceType::Pull => Handler::PullRequest,
            ResourceType::Pulls => Handler::Pulls,
            ResourceType::Issues => Handler::Issue,
            ResourceType::Milestone | ResourceType::Milestones => Handler::Milestone,
            ResourceType::Releases => Handler::Releases,
            ResourceType::Actions => Handler::Workflows,
            ResourceType::Labels => Handler::Labels,
            ResourceType::Advisories => Handler::Advisory,
            ResourceType::Wiki => Handler::Wiki,
            ResourceType::Packages | ResourceType::Pkgs => Handler::Packages,
            ResourceType::Orgs => Handler::Organization,
            ResourceType::User => Handler::User,
            ResourceType::Nope => Handler::Nothing,
            ResourceType::Unknown(_) => return None,
        };
        Some(handler)
    }

    /// Static name used in log lines
    pub fn name(self) -> &'static str {
        match self {
            Handler::RepoExists => "repo-exists",
            Handler::Organization => "org-exists",
            Handler::User => "user-exists",
            Handler::Contents => "contents",
            Handler::Commit => "commit",
            Handler::Commits => "commits",
            Handler::Compare => "compare",
            Handler::PullRequest => "pull-request",
            Handler::Pulls => "pulls",
            Handler::Issue => "issue",
            Handler::Milestone => "milestone",
            Handler::Releases => "releases",
            Handler::Workflows => "workflows",
            Handler::Labels => "labels",
            Handler::Advisory => "security-advisory",
            Handler::Wiki => "wiki",
            Handler::Packages => "packages",
            Handler::Nothing => "nothing",
        }
    }

    pub async fn run(self, client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
        match self {
            Handler::RepoExists => repo_exists(client, t).await,
            Handler::Organization => org_exists(client, t).await,
            Handler::User => user_exists(client, t).await,
            Handler::Contents => contents(client, t).await,
            Handler::Commit => commit(client, t).await,
            Handler::Commits => commits(client, t).await,
            Handler::Compare => compare(client, t).await,
            Handler::PullRequest => pull_request(client, t).await,
            Handler::Pulls => pulls(client, t).await,
            Handler::Issue => issue(client, t).await,
            Handler::Milestone => milestone(client, t).await,
            Handler::Releases => releases(client, t).await,
            Handler::Workflows => workflows(client, t).await,
            Handler::Labels => labels(client, t).await,
            Handler::Advisory => advisory(client, t).await,
            Handler::Wiki => wiki(client, t).await,
            Handler::Packages => packages(client, t).await,
            Handler::Nothing => Ok(()),
        }
    }
}

// Parses a numeric URL component, e.g. the 12 in /pull/12
fn parse_number(kind: &str, value: &str) -> Result<u64, GithubError> {
    value
        .parse::<u64>()
        .map_err(|_| GithubError::format(format!("invalid {} number {:?}", kind, value)))
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

async fn repo_exists(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.owner.is_empty() {
        return Ok(());
    }
    if t.repo.is_empty() {
        return org_exists(client, t).await;
    }
    client.get_repository(t.owner, t.repo).await?;
    Ok(())
}

// Some URL shapes legitimately parse to an empty owner; those are vacuously valid
async fn org_exists(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.owner.is_empty() {
        return Ok(());
    }
    client.get_organization(t.owner).await?;
    Ok(())
}

async fn user_exists(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.owner.is_empty() {
        return Ok(());
    }
    client.get_user(t.owner).await?;
    Ok(())
}

// blob / tree / raw / blame: the content (file or directory) has to exist
async fn contents(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }
    let found = client
        .get_contents(t.owner, t.repo, t.path, t.reference)
        .await?;

    if t.fragment.is_empty() || is_line_anchor(t.fragment) {
        return Ok(());
    }
    if let Contents::File(file) = &found {
        if let Some(text) = markdown_text(&file.path, file.content.as_deref()) {
            if !has_anchor(&text, t.fragment) {
                return Err(GithubError::missing(format!(
                    "anchor '{}' wasn't found in '{}'",
                    t.fragment, t.path
                )));
            }
        }
    }
    Ok(())
}

// L10, L10C5, L10-L20, L10C1-L12C4
fn is_line_anchor(fragment: &str) -> bool {
    match fragment.split_once('-') {
        Some((start, end)) => is_line_ref(start) && is_line_ref(end),
        None => is_line_ref(fragment),
    }
}

fn is_line_ref(value: &str) -> bool {
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let Some(rest) = value.strip_prefix('L') else {
        return false;
    };
    match rest.split_once('C') {
        Some((line, column)) => is_number(line) && is_number(column),
        None => is_number(rest),
    }
}

// Decoded body of a markdown file, when the API returned it inline
fn markdown_text(path: &str, content: Option<&str>) -> Option<String> {
    let lower = path.to_lowercase();
    if !(lower.ends_with(".md") || lower.ends_with(".markdown")) {
        return None;
    }
    let compact: String = content?.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()?;
    String::from_utf8(bytes).ok()
}

// Heading texts of a markdown document, in order
//
// Only the Text/Code events inside a heading count, so link targets and
// inline HTML never leak into the slug. Setext headings are headings too;
// '#' lines inside code blocks are not.
fn heading_texts(markdown: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut current: Option<String> = None;
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(..)) => current = Some(String::new()),
            Event::End(Tag::Heading(..)) => headings.extend(current.take()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            _ => {}
        }
    }
    headings
}

// Best-effort heading search. GitHub derives anchors from headings by
// lowercasing, dropping punctuation and turning spaces into '-', and
// numbers duplicates "-1", "-2", ...
fn has_anchor(markdown: &str, fragment: &str) -> bool {
    let wanted = decode(fragment).to_lowercase();
    let wanted = wanted.strip_prefix("user-content-").unwrap_or(wanted.as_str());

    if markdown.contains(&format!("id=\"{}\"", wanted))
        || markdown.contains(&format!("name=\"{}\"", wanted))
    {
        return true;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for heading in heading_texts(markdown) {
        let slug = slugify(heading.trim());
        let count = seen.entry(slug.clone()).or_insert(0);
        let anchor = if *count == 0 {
            slug
        } else {
            format!("{}-{}", slug, count)
        };
        *count += 1;
        if anchor == wanted {
            return true;
        }
    }
    false
}

fn slugify(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

// A single commit, or the commit history page when there is no SHA
async fn commit(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        client.list_commits(t.owner, t.repo, None).await?;
        return Ok(());
    }
    client.get_commit(t.owner, t.repo, t.reference).await?;
    Ok(())
}

// Commit history, optionally of a given branch/tag
async fn commits(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    let sha = Some(t.reference).filter(|r| !r.is_empty());
    client.list_commits(t.owner, t.repo, sha).await?;
    Ok(())
}

// Compare view: "base...head", "base..head", or just "head" against the
// default branch
async fn compare(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }

    let separator = if t.reference.contains("...") { "..." } else { ".." };
    let tokens: Vec<&str> = t.reference.split(separator).collect();
    if tokens.len() > 2 || tokens.iter().any(|tok| tok.is_empty()) {
        return Err(GithubError::format(format!(
            "invalid compare expression {:?}",
            t.reference
        )));
    }

    let (base, head) = match tokens.as_slice() {
        [base, head] => (base.to_string(), head.to_string()),
        _ => {
            let repo = client.get_repository(t.owner, t.repo).await?;
            (repo.default_branch, t.reference.to_string())
        }
    };
    client.compare_commits(t.owner, t.repo, &base, &head).await?;
    Ok(())
}

async fn pull_request(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }
    let number = parse_number("pull request", t.reference)?;
    client.get_pull_request(t.owner, t.repo, number).await?;

    // No API looks up a PR commit by SHA, so list them and search
    if let Some(rest) = t.path.strip_prefix("commits/") {
        let sha = rest.split('/').next().unwrap_or_default();
        if !sha.is_empty() {
            let commits = client
                .list_pull_request_commits(t.owner, t.repo, number)
                .await?;
            if !commits.iter().any(|c| c.sha.starts_with(sha)) {
                return Err(GithubError::missing(format!(
                    "commit '{}' wasn't found in pull request #{}",
                    sha, number
                )));
            }
        }
    }

    comment_fragment(client, t).await
}

// Resolves the comment a PR/issue fragment points at
async fn comment_fragment(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if let Some(id) = t.fragment.strip_prefix("issuecomment-") {
        let id = parse_number("comment", id)?;
        client.get_issue_comment(t.owner, t.repo, id).await?;
    } else if let Some(id) = t.fragment.strip_prefix("discussion_r") {
        let id = parse_number("review comment", id)?;
        client.get_pull_request_comment(t.owner, t.repo, id).await?;
    } else if t.fragment.starts_with("diff-") {
        tracing::debug!(fragment = t.fragment, "diff anchors cannot be verified, accepting");
    }
    Ok(())
}

// Pull request list, optionally filtered by author (/pulls/<login>)
async fn pulls(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    repo_exists(client, t).await?;
    if !t.reference.is_empty() {
        client.get_user(t.reference).await?;
    }
    Ok(())
}

async fn issue(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }
    let number = parse_number("issue", t.reference)?;
    client.get_issue(t.owner, t.repo, number).await?;
    comment_fragment(client, t).await
}

async fn milestone(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }
    let number = parse_number("milestone", t.reference)?;
    client.get_milestone(t.owner, t.repo, number).await?;
    Ok(())
}

// releases/latest, releases/tag/<t>, releases/download/<t>/<asset>
async fn releases(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    match t.reference {
        "" if t.path == "latest" => {
            client.get_latest_release(t.owner, t.repo).await?;
        }
        "tag" if !t.path.is_empty() => {
            client.get_release_by_tag(t.owner, t.repo, t.path).await?;
        }
        "download" => {
            let (tag, asset) = t
                .path
                .split_once('/')
                .filter(|(tag, asset)| !tag.is_empty() && !asset.is_empty())
                .ok_or_else(|| {
                    GithubError::format(format!("invalid release download path {:?}", t.path))
                })?;
            let release = if tag == "latest" {
                client.get_latest_release(t.owner, t.repo).await?
            } else {
                client.get_release_by_tag(t.owner, t.repo, tag).await?
            };
            let asset = decode(asset);
            if !release.assets.iter().any(|a| a.name == asset) {
                return Err(GithubError::missing(format!(
                    "asset '{}' wasn't found in the release assets",
                    asset
                )));
            }
        }
        _ => return repo_exists(client, t).await,
    }
    Ok(())
}

// actions/workflows/<file>[/badge.svg] and actions/runs/<id>/...
async fn workflows(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    let parts: Vec<&str> = t.path.split('/').filter(|p| !p.is_empty()).collect();
    match (t.reference, parts.as_slice()) {
        // The badge exists whenever the workflow does
        ("workflows", [file, ..]) => {
            client.get_workflow(t.owner, t.repo, file).await?;
        }
        ("runs", [run, "job", job, ..]) => {
            parse_number("workflow run", run)?;
            let job = parse_number("workflow job", job)?;
            client.get_workflow_job(t.owner, t.repo, job).await?;
        }
        ("runs", [run, "attempts", attempt, ..]) => {
            let run = parse_number("workflow run", run)?;
            let attempt = parse_number("run attempt", attempt)?;
            client
                .list_workflow_jobs_attempt(t.owner, t.repo, run, attempt)
                .await?;
        }
        ("runs", [run, ..]) => {
            let run = parse_number("workflow run", run)?;
            client.get_workflow_run(t.owner, t.repo, run).await?;
        }
        _ => return repo_exists(client, t).await,
    }
    Ok(())
}

// Case-sensitive name match over every label of the repository
async fn labels(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }
    let name = decode(t.reference);
    let labels = client.list_labels(t.owner, t.repo).await?;
    if labels.iter().any(|l| l.name == name) {
        Ok(())
    } else {
        Err(GithubError::missing(format!("label '{}' not found", name)))
    }
}

// There is no get-by-id endpoint for advisories
async fn advisory(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    if t.reference.is_empty() {
        return repo_exists(client, t).await;
    }
    let advisories = client.list_security_advisories(t.owner, t.repo).await?;
    if advisories
        .iter()
        .any(|a| a.ghsa_id.eq_ignore_ascii_case(t.reference))
    {
        Ok(())
    } else {
        Err(GithubError::missing(format!(
            "security advisory '{}' not found",
            t.reference
        )))
    }
}

// Wikis have no content API: only "repo exists and wiki is enabled" is checked
async fn wiki(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    let repo = client.get_repository(t.owner, t.repo).await?;
    if !repo.has_wiki {
        return Err(GithubError::missing(format!(
            "wiki is not enabled for {}/{}",
            t.owner, t.repo
        )));
    }
    if !t.reference.is_empty() {
        tracing::debug!(page = t.reference, "wiki pages cannot be verified individually");
    }
    Ok(())
}

async fn packages(client: &dyn GithubClient, t: &Target<'_>) -> Result<(), GithubError> {
    tracing::debug!(path = t.path, "package contents cannot be verified, checking the repository");
    repo_exists(client, t).await
}
