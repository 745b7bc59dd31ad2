// src/config.rs
// =============================================================================
// Settings loaded from link-guardian.toml (all optional).
//
// Example:
//
//   timeout_secs = 15
//   concurrency = 32
//   file_mask = ["docs/**/*.md", "README.md"]
//   ignore_links = ["^https://localhost"]
//
//   [github]
//   token = "ghp_..."
//
//   [[github.enterprise]]
//   host = "github.mycorp.com"
//   token = "..."
//
// CLI flags are applied on top of whatever the file says.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory when --config is not given
pub const DEFAULT_CONFIG_FILE: &str = "link-guardian.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Deadline for one link check, in seconds
    pub timeout_secs: u64,
    /// Maximum number of link checks in flight
    pub concurrency: usize,
    /// Glob patterns selecting documentation files
    pub file_mask: Vec<String>,
    /// Glob patterns for paths that are never scanned
    pub exclude_paths: Vec<String>,
    /// Regexes; matching links are reported as skipped
    pub ignore_links: Vec<String>,
    pub github: GithubConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            concurrency: 50,
            file_mask: vec![
                "**/*.md".to_string(),
                "**/*.markdown".to_string(),
                "**/*.html".to_string(),
                "**/*.htm".to_string(),
            ],
            exclude_paths: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/.git/**".to_string(),
            ],
            ignore_links: Vec::new(),
            github: GithubConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    /// Token for github.com (GITHUB_TOKEN / --github-token win over this)
    pub token: Option<String>,
    pub api_url: String,
    pub enterprise: Vec<EnterpriseHost>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: crate::github::DEFAULT_API_URL.to_string(),
            enterprise: Vec::new(),
        }
    }
}

/// A GitHub Enterprise Server installation
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnterpriseHost {
    pub host: String,
    /// Defaults to https://<host>/api/v3
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    // Loads the config file.
    //
    // An explicit path must exist. Without one, link-guardian.toml in the
    // working directory is used when present, and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Config::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        Ok(config)
    }

    /// Every host whose URLs go through the GitHub validator
    pub fn github_hosts(&self) -> Vec<String> {
        let mut hosts = vec!["github.com".to_string(), "www.github.com".to_string()];
        hosts.extend(self.github.enterprise.iter().map(|e| e.host.to_lowercase()));
        hosts
    }
}
