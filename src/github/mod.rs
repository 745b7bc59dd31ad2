// src/github/mod.rs
// =============================================================================
// This module validates links that point at GitHub (public or enterprise).
//
// Submodules:
// - url: turns a web URL into a structured GhUrl (owner, repo, type, ...)
// - dispatch: picks the handler for a GhUrl and runs it
// - handlers: one existence check per GitHub feature
// - client: the narrow GithubClient trait the handlers call
// - rest: GithubClient over GitHub's REST API (reqwest)
// - error: ClientError / GithubError and the 404 -> NotFound mapping
// =============================================================================

mod client;
mod dispatch;
mod error;
mod handlers;
mod rest;
mod url;

#[cfg(test)]
pub mod testing;

pub use client::GithubClient;
pub use dispatch::resolve_url;
pub use error::GithubError;
pub use rest::{RestClient, DEFAULT_API_URL};
pub use self::url::{is_public_host, parse_url};
