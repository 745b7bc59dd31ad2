// src/github/error.rs
// =============================================================================
// Error types for the GitHub validation layer.
//
// There are two levels:
// - ClientError: what a single REST call can fail with (HTTP status,
//   transport failure, undecodable body)
// - GithubError: what resolving a whole URL can fail with. This is the
//   taxonomy callers see: NotFound (confirmed broken), Format/Unsupported
//   (the URL itself is malformed), Client/Timeout (could not confirm)
//
// map_gh_error() is the single place where a remote 404 becomes NotFound.
// =============================================================================

use thiserror::Error;

/// Failure of a single GitHub REST call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-2xx status
    #[error("GitHub API returned HTTP {status} for {endpoint}: {message}")]
    Status {
        status: u16,
        endpoint: String,
        message: String,
    },
    /// The request never got a response (DNS, TLS, connection reset, timeout)
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The response body did not match the expected shape
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport { source, .. } | ClientError::Decode { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for 429, and for the 403 GitHub sends when the hourly quota is spent
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ClientError::Status {
                status: 429, ..
            } => true,
            ClientError::Status {
                status: 403,
                message,
                ..
            } => message.to_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

/// Outcome of resolving a GitHub URL.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The resource definitively does not exist
    #[error("{}", not_found_message(.url, .detail))]
    NotFound {
        url: String,
        detail: Option<String>,
    },
    /// The URL parsed, but a component its type requires is malformed
    #[error("{0}")]
    Format(String),
    /// The URL has a shape no handler knows how to check
    #[error("unsupported GitHub URL type {typ:?}")]
    Unsupported { typ: String },
    /// Anything else the client reported, passed through untouched
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

impl GithubError {
    /// A miss detected locally (a linear scan that found nothing).
    /// The URL is attached later by map_gh_error().
    pub fn missing(detail: impl Into<String>) -> Self {
        GithubError::NotFound {
            url: String::new(),
            detail: Some(detail.into()),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        GithubError::Format(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GithubError::NotFound { .. })
    }
}

fn not_found_message(url: &str, detail: &Option<String>) -> String {
    match (detail, url.is_empty()) {
        (Some(detail), false) => format!("{} ({})", detail, url),
        (Some(detail), true) => detail.clone(),
        (None, _) => format!("GitHub resource not found: {}", url),
    }
}

// Normalizes the result of a resolution for the given URL.
//
// - Ok stays Ok
// - a client error carrying HTTP 404 becomes NotFound { url }
// - a locally detected NotFound gets the URL attached
// - everything else passes through unchanged; in particular a 5xx or a
//   network failure is never reported as "not found"
pub fn map_gh_error(url: &str, result: Result<(), GithubError>) -> Result<(), GithubError> {
    match result {
        Ok(()) => Ok(()),
        Err(GithubError::Client(e)) if e.is_not_found() => Err(GithubError::NotFound {
            url: url.to_string(),
            detail: None,
        }),
        Err(GithubError::NotFound { url: found, detail }) => Err(GithubError::NotFound {
            url: if found.is_empty() {
                url.to_string()
            } else {
                found
            },
            detail,
        }),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, message: &str) -> ClientError {
        ClientError::Status {
            status: code,
            endpoint: "/repos/acme/widgets".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_404_becomes_not_found_with_url() {
        let url = "https://github.com/acme/widgets/blob/main/missing.md";
        let err = map_gh_error(url, Err(status(404, "Not Found").into())).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains(url));
    }

    #[test]
    fn test_server_error_passes_through() {
        let err = map_gh_error("https://github.com/a/b", Err(status(502, "Bad Gateway").into()))
            .unwrap_err();
        match err {
            GithubError::Client(e) => assert_eq!(e.status(), Some(502)),
            other => panic!("expected pass-through, got {:?}", other),
        }
    }

    #[test]
    fn test_format_error_is_not_reinterpreted() {
        let err = map_gh_error(
            "https://github.com/a/b/issues/x",
            Err(GithubError::format("invalid issue number \"x\"")),
        )
        .unwrap_err();
        assert!(matches!(err, GithubError::Format(_)));
    }

    #[test]
    fn test_local_miss_keeps_detail_and_gains_url() {
        let url = "https://github.com/acme/widgets/labels/bug";
        let err = map_gh_error(url, Err(GithubError::missing("label 'bug' not found"))).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("label 'bug' not found"));
        assert!(message.contains(url));
    }

    #[test]
    fn test_ok_stays_ok() {
        assert!(map_gh_error("https://github.com/a", Ok(())).is_ok());
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(status(429, "").is_rate_limited());
        assert!(status(403, "API rate limit exceeded for 1.2.3.4").is_rate_limited());
        assert!(!status(403, "Resource not accessible by integration").is_rate_limited());
        assert!(!status(404, "Not Found").is_rate_limited());
    }
}
