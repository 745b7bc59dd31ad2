// src/github/dispatch.rs
// =============================================================================
// Routes a parsed GitHub URL to the handler that can check it.
//
//   raw URL -> parse_url() -> GhUrl -> resolve() -> Handler::run() -> client
//                                         |
//                          map_gh_error() normalizes 404s
//
// resolve() is a pure function of (GhUrl, client): no state is kept between
// calls, so any number of links can be resolved concurrently with one client.
// =============================================================================

use super::client::GithubClient;
use super::error::{map_gh_error, GithubError};
use super::handlers::{Handler, Target};
use super::url::{parse_url, GhUrl};

// Picks the handler for a URL.
//
// - no resource type (or the bare /organizations page): org check when
//   there is no repo, repo check otherwise
// - a known type: its entry in the handler table
// - an unknown type: an error naming it
pub fn select_handler(gh: &GhUrl) -> Result<Handler, GithubError> {
    match &gh.typ {
        Some(typ) if gh.owner != "organizations" => {
            Handler::for_type(typ).ok_or_else(|| GithubError::Unsupported {
                typ: typ.to_string(),
            })
        }
        _ if gh.repo.is_empty() => Ok(Handler::Organization),
        _ => Ok(Handler::RepoExists),
    }
}

/// Checks that the resource behind `gh` exists.
pub async fn resolve(client: &dyn GithubClient, gh: &GhUrl) -> Result<(), GithubError> {
    let handler = select_handler(gh)?;

    tracing::debug!(
        handler = handler.name(),
        host = %gh.host,
        owner = %gh.owner,
        repo = %gh.repo,
        reference = %gh.reference,
        path = %gh.path,
        "resolving GitHub URL"
    );

    let target = Target {
        owner: &gh.owner,
        repo: &gh.repo,
        reference: &gh.reference,
        path: &gh.path,
        fragment: &gh.anchor,
    };
    handler.run(client, &target).await
}

// Parses, resolves and maps errors in one go.
//
// A URL that cannot even be parsed is reported as a format error.
pub async fn resolve_url(client: &dyn GithubClient, raw: &str) -> Result<(), GithubError> {
    let gh = parse_url(raw).map_err(|e| GithubError::format(e.to_string()))?;
    map_gh_error(raw, resolve(client, &gh).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::FakeClient;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_blob_exists() {
        let client = FakeClient::new();
        resolve_url(&client, "https://github.com/acme/widgets/blob/main/README.md")
            .await
            .unwrap();
        assert_eq!(
            client.calls(),
            vec!["get_contents acme widgets README.md main"]
        );
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found_with_url() {
        let url = "https://github.com/acme/widgets/blob/main/missing.md";
        let client = FakeClient::new().missing("get_contents");
        let err = resolve_url(&client, url).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains(url));
    }

    #[tokio::test]
    async fn test_missing_release_asset() {
        let mut client = FakeClient::new();
        client.release_assets = vec!["other.zip".to_string()];
        let err = resolve_url(
            &client,
            "https://github.com/acme/widgets/releases/download/v1.0.0/asset.zip",
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
        assert!(err
            .to_string()
            .contains("asset 'asset.zip' wasn't found in the release assets"));
    }

    #[tokio::test]
    async fn test_compare_single_token_against_default_branch() {
        let client = FakeClient::new();
        resolve_url(&client, "https://github.com/acme/widgets/compare/dev")
            .await
            .unwrap();
        assert!(client
            .calls()
            .contains(&"compare_commits acme widgets main dev".to_string()));
    }

    #[tokio::test]
    async fn test_pull_request_issue_comment() {
        let url = "https://github.com/acme/widgets/pull/1#issuecomment-42";

        let client = FakeClient::new();
        resolve_url(&client, url).await.unwrap();
        assert_eq!(
            client.calls(),
            vec![
                "get_pull_request acme widgets 1",
                "get_issue_comment acme widgets 42"
            ]
        );

        let client = FakeClient::new().missing("get_issue_comment");
        let err = resolve_url(&client, url).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bad_milestone_number_never_calls_client() {
        let client = FakeClient::new();
        let err = resolve_url(&client, "https://github.com/acme/widgets/milestones/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::Format(_)));
        assert_eq!(err.to_string(), "invalid milestone number \"abc\"");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_unsupported() {
        let client = FakeClient::new();
        let err = resolve_url(&client, "https://github.com/acme/widgets/stargazers")
            .await
            .unwrap_err();
        match err {
            GithubError::Unsupported { typ } => assert_eq!(typ, "stargazers"),
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallbacks() {
        let client = FakeClient::new();
        resolve_url(&client, "https://github.com/organizations").await.unwrap();
        resolve_url(&client, "https://github.com/acme/widgets/branches").await.unwrap();
        resolve_url(&client, "https://github.com/octocat").await.unwrap();
        resolve_url(&client, "https://github.com/").await.unwrap();
        resolve_url(&client, "https://github.com/settings/organizations").await.unwrap();
        assert_eq!(
            client.calls(),
            vec![
                "get_organization organizations",
                "get_repository acme widgets",
                "get_user octocat",
            ]
        );
    }

    #[tokio::test]
    async fn test_server_error_is_not_not_found() {
        let client = FakeClient::new().failing("get_repository", 503);
        let err = resolve_url(&client, "https://github.com/acme/widgets")
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, GithubError::Client(_)));
    }

    #[tokio::test]
    async fn test_concurrent_resolution_shares_client() {
        let client = Arc::new(FakeClient::new());
        let mut tasks = Vec::new();
        for n in 1..=8 {
            let client = client.clone();
            tasks.push(tokio::spawn(async move {
                let url = format!("https://github.com/acme/widgets/issues/{}", n);
                resolve_url(client.as_ref(), &url).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(client.calls().len(), 8);
    }
}
