// src/checker/http.rs
// =============================================================================
// This module checks if plain (non-GitHub) URLs are alive over HTTP.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when a server refuses HEAD (405, 501, 403)
// - Detects various failure modes (404, timeout, SSL errors, etc.)
// - Treats 429 Too Many Requests as "assumed healthy": we do not retry
// =============================================================================

use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::{LinkCheckResult, LinkStatus};

/// Message attached to links we could not check because of rate limiting
pub const RATE_LIMITED: &str = "rate limited, assumed healthy";

// Builds the HTTP client shared by every plain-link check
//
// Client is cheap to clone (it's a reference counter around a connection
// pool), so one instance serves all concurrent checks.
pub fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(concat!("link-guardian/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

// Checks a single link
//
// First a HEAD request; if the server does not allow HEAD we retry the
// same URL once with GET before deciding.
pub async fn check_http_link(client: &Client, url: String) -> LinkCheckResult {
    let response = match client.head(&url).send().await {
        Ok(response) if needs_get_fallback(response.status()) => {
            tracing::debug!(%url, status = %response.status(), "HEAD refused, retrying with GET");
            client.get(&url).send().await
        }
        other => other,
    };

    match response {
        Ok(response) => {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());
            classify_status(url, response.status(), location)
        }
        Err(e) => categorize_error(url, e),
    }
}

fn needs_get_fallback(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED | StatusCode::FORBIDDEN
    )
}

// Turns an HTTP status into a link status
//
// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect (only seen once the redirect limit is hit)
// - 404/410: Broken
// - 429: Rate limited, assumed healthy
// - anything else: Error (we could not confirm either way)
pub fn classify_status(url: String, status: StatusCode, location: Option<String>) -> LinkCheckResult {
    let code = status.as_u16();

    if status.is_success() {
        LinkCheckResult::new(url, LinkStatus::Ok, format!("HTTP {}", code))
    } else if status.is_redirection() {
        let target = location.unwrap_or_else(|| "unknown".to_string());
        let message = format!("HTTP {} -> {}", code, target);
        LinkCheckResult::new(url, LinkStatus::Redirect { location: target }, message)
    } else if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
        LinkCheckResult::new(url, LinkStatus::Broken, format!("HTTP {}", code))
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(%url, "rate limited, not verified");
        LinkCheckResult::new(url, LinkStatus::Ok, RATE_LIMITED)
    } else {
        LinkCheckResult::new(url, LinkStatus::Error, format!("HTTP {}", code))
    }
}

// Categorizes different error types from reqwest
fn categorize_error(url: String, error: reqwest::Error) -> LinkCheckResult {
    let error_string = error.to_string();

    let (status, message) = if error.is_timeout() {
        (LinkStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (LinkStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            (LinkStatus::DnsError, "Could not resolve hostname".to_string())
        } else {
            (LinkStatus::Error, "Connection failed".to_string())
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        (LinkStatus::SslError, "SSL certificate error".to_string())
    } else {
        (LinkStatus::Error, error_string)
    };

    LinkCheckResult::new(url, status, message)
}
