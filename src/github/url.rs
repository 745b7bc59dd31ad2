// src/github/url.rs
// =============================================================================
// This module turns a GitHub web URL into a structured GhUrl.
//
// GitHub's web UI uses dozens of URL shapes:
//   /owner                                 -> user profile
//   /owner/repo                            -> repository
//   /owner/repo/blob/<ref>/<path>          -> file
//   /owner/repo/pull/12/files#diff-abc     -> pull request sub-view
//   /owner/repo/releases/download/v1/a.zip -> release asset
//   /owner/repo/actions/runs/7/job/9       -> workflow job
//   /organizations/acme/settings           -> organization
//   ...
//
// Parsing is lenient: anything with a host parses. A third segment we do not
// recognize becomes ResourceType::Unknown and is rejected later, by the
// dispatcher, with an "unsupported" error.
//
// Known limitation: a branch or file literally named like a keyword (say a
// branch called "releases") is always read as the keyword.
// =============================================================================

use std::fmt;

use thiserror::Error;
use url::Url;

/// The public GitHub host. Every other host is treated as enterprise.
pub const PUBLIC_HOST: &str = "github.com";

/// Which GitHub feature a URL points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Repo,
    Blob,
    Tree,
    Raw,
    Blame,
    Commit,
    Commits,
    Compare,
    Issues,
    Pull,
    Pulls,
    Milestone,
    Milestones,
    Releases,
    Actions,
    Labels,
    Branches,
    Tags,
    Discussions,
    Projects,
    Settings,
    Security,
    Advisories,
    Wiki,
    Packages,
    Pkgs,
    Attestations,
    Orgs,
    User,
    /// Recognized page that cannot be verified (account settings)
    Nope,
    /// Third path segment outside the vocabulary
    Unknown(String),
}

impl ResourceType {
    // Maps the third path segment to a resource type
    fn from_keyword(segment: &str) -> Option<ResourceType> {
        let typ = match segment {
            "blob" => ResourceType::Blob,
            "tree" => ResourceType::Tree,
            "raw" => ResourceType::Raw,
            "blame" => ResourceType::Blame,
            "commit" => ResourceType::Commit,
            "commits" => ResourceType::Commits,
            "compare" => ResourceType::Compare,
            "issues" => ResourceType::Issues,
            "pull" => ResourceType::Pull,
            "pulls" => ResourceType::Pulls,
            "milestone" => ResourceType::Milestone,
            "milestones" => ResourceType::Milestones,
            "releases" => ResourceType::Releases,
            "actions" => ResourceType::Actions,
            "labels" => ResourceType::Labels,
            "branches" => ResourceType::Branches,
            "tags" => ResourceType::Tags,
            "discussions" => ResourceType::Discussions,
            "projects" => ResourceType::Projects,
            "settings" => ResourceType::Settings,
            "security" => ResourceType::Security,
            "wiki" => ResourceType::Wiki,
            "packages" => ResourceType::Packages,
            "pkgs" => ResourceType::Pkgs,
            "attestations" => ResourceType::Attestations,
            _ => return None,
        };
        Some(typ)
    }

    /// The tag as it appears in URLs and log lines
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Repo => "repo",
            ResourceType::Blob => "blob",
            ResourceType::Tree => "tree",
            ResourceType::Raw => "raw",
            ResourceType::Blame => "blame",
            ResourceType::Commit => "commit",
            ResourceType::Commits => "commits",
            ResourceType::Compare => "compare",
            ResourceType::Issues => "issues",
            ResourceType::Pull => "pull",
            ResourceType::Pulls => "pulls",
            ResourceType::Milestone => "milestone",
            ResourceType::Milestones => "milestones",
            ResourceType::Releases => "releases",
            ResourceType::Actions => "actions",
            ResourceType::Labels => "labels",
            ResourceType::Branches => "branches",
            ResourceType::Tags => "tags",
            ResourceType::Discussions => "discussions",
            ResourceType::Projects => "projects",
            ResourceType::Settings => "settings",
            ResourceType::Security => "security",
            ResourceType::Advisories => "advisories",
            ResourceType::Wiki => "wiki",
            ResourceType::Packages => "packages",
            ResourceType::Pkgs => "pkgs",
            ResourceType::Attestations => "attestations",
            ResourceType::Orgs => "orgs",
            ResourceType::User => "user",
            ResourceType::Nope => "nope",
            ResourceType::Unknown(segment) => segment,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GitHub URL broken into the parts the handlers need.
///
/// `typ == None` means "no resource keyword": an org (owner only), a repo
/// (owner + repo) or the bare host (neither).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GhUrl {
    pub host: String,
    pub enterprise: bool,
    pub owner: String,
    pub repo: String,
    pub typ: Option<ResourceType>,
    /// Type-dependent: branch/tag/SHA, sub-kind keyword, or numeric id
    pub reference: String,
    pub path: String,
    /// URL fragment without the leading '#'
    pub anchor: String,
}

/// Structural parse failure. Unknown shapes are NOT errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("URL {0:?} has no host")]
    MissingHost(String),
}

// Parses a GitHub web URL.
//
// Fails only when the input is not a URL or has no host. The query string
// is ignored and the fragment is kept in `anchor`.
pub fn parse_url(raw: &str) -> Result<GhUrl, ParseError> {
    let parsed = Url::parse(raw).map_err(|e| ParseError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(ParseError::MissingHost(raw.to_string())),
    };

    let mut gh = GhUrl {
        enterprise: !is_public_host(&host),
        host,
        anchor: parsed.fragment().unwrap_or_default().to_string(),
        ..GhUrl::default()
    };

    // "/owner/repo/" and "/owner/repo" are the same URL
    let mut segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    let Some((&owner, rest)) = segments.split_first() else {
        return Ok(gh);
    };
    gh.owner = owner.to_string();

    let Some((&second, rest)) = rest.split_first() else {
        if owner != "organizations" {
            gh.typ = Some(ResourceType::User);
        }
        return Ok(gh);
    };

    // Non-repository forms that live directly under the host.
    //
    // `/orgs/<login>` is only an organization page on enterprise hosts. On
    // github.com "orgs" parses as an ordinary owner, so a public
    // `https://github.com/orgs/...` link resolves as a repository and fails.
    // List such links under `ignore_links` in link-guardian.toml.
    if owner == "organizations" || (gh.enterprise && owner == "orgs") {
        gh.owner = second.to_string();
        gh.typ = Some(ResourceType::Orgs);
        gh.path = join(rest);
        return Ok(gh);
    }
    if owner == "settings" {
        gh.owner = String::new();
        gh.typ = Some(ResourceType::Nope);
        gh.path = join(&segments);
        return Ok(gh);
    }

    gh.repo = second.strip_suffix(".git").unwrap_or(second).to_string();

    let Some((&keyword, rest)) = rest.split_first() else {
        gh.typ = Some(ResourceType::Repo);
        return Ok(gh);
    };

    let Some(typ) = ResourceType::from_keyword(keyword) else {
        gh.typ = Some(ResourceType::Unknown(keyword.to_string()));
        gh.path = join(rest);
        return Ok(gh);
    };

    consume(&mut gh, typ, rest);
    Ok(gh)
}

/// True for the public github.com host (with or without "www.")
pub fn is_public_host(host: &str) -> bool {
    let host = host.to_lowercase();
    host == PUBLIC_HOST || host == "www.github.com"
}

// Claims the segments after the keyword into reference/path, following
// the per-type rules
fn consume(gh: &mut GhUrl, typ: ResourceType, rest: &[&str]) {
    let first = rest.first().copied().unwrap_or_default();
    let tail = rest.get(1..).unwrap_or_default();

    gh.typ = Some(typ.clone());
    match typ {
        ResourceType::Blob | ResourceType::Tree | ResourceType::Raw | ResourceType::Blame => {
            // Full-ref form: blob/refs/heads/<branch>/<path>
            match rest {
                ["refs", "heads" | "tags", name, path @ ..] => {
                    gh.reference = name.to_string();
                    gh.path = join(path);
                }
                _ => {
                    gh.reference = first.to_string();
                    gh.path = join(tail);
                }
            }
        }
        ResourceType::Commit => {
            let sha = first
                .strip_suffix(".patch")
                .or_else(|| first.strip_suffix(".diff"))
                .unwrap_or(first);
            gh.reference = sha.to_string();
        }
        ResourceType::Compare => {
            // Branch names may contain '/', keep them whole
            gh.reference = join(rest);
        }
        ResourceType::Releases => match rest {
            [] => {}
            ["latest"] => gh.path = "latest".to_string(),
            ["latest", "download", asset @ ..] => {
                gh.reference = "download".to_string();
                gh.path = format!("latest/{}", join(asset));
            }
            ["tag", tag @ ..] => {
                gh.reference = "tag".to_string();
                gh.path = join(tag);
            }
            ["download", more @ ..] => {
                gh.reference = "download".to_string();
                gh.path = join(more);
            }
            _ => gh.path = join(rest),
        },
        ResourceType::Actions => {
            gh.reference = first.to_string();
            gh.path = join(tail);
        }
        ResourceType::Security => match rest {
            ["advisories", id, more @ ..] => {
                gh.typ = Some(ResourceType::Advisories);
                gh.reference = id.to_string();
                gh.path = join(more);
            }
            _ => gh.path = join(rest),
        },
        ResourceType::Pull
        | ResourceType::Pulls
        | ResourceType::Issues
        | ResourceType::Milestone
        | ResourceType::Milestones
        | ResourceType::Commits
        | ResourceType::Labels
        | ResourceType::Wiki => {
            gh.reference = first.to_string();
            gh.path = join(tail);
        }
        // List/identity pages: only owner/repo matter
        _ => gh.path = join(rest),
    }
}

// Joins path segments with '/', dropping empty trailing components
fn join(segments: &[&str]) -> String {
    let mut end = segments.len();
    while end > 0 && segments[end - 1].is_empty() {
        end -= 1;
    }
    segments[..end].join("/")
}
