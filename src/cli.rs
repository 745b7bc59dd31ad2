// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described by structs and
// attributes, and clap generates the parsing code (plus --help/--version).
//
// Two subcommands:
// - check: scan documentation files on disk and check every link in them
// - url:   check the given URLs directly (handy for debugging one link)
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "link-guardian",
    version,
    about = "Find broken links in documentation, with deep checks for GitHub URLs",
    long_about = "link-guardian scans Markdown and HTML documentation for broken links. \
                  GitHub links are verified through the GitHub API: files, anchors, commits, \
                  issues, pull requests, releases, workflow runs and more. \
                  It's built for CI pipelines: the exit code is 1 when a link is broken."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// Each variant is one subcommand; its fields become that subcommand's arguments
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan documentation files for broken links
    ///
    /// Example: link-guardian check README.md docs/
    Check {
        /// Files or directories to scan (directories are walked recursively)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Maximum number of links checked at once (overrides the config file)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-link timeout in seconds (overrides the config file)
        #[arg(long)]
        timeout: Option<u64>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Check one or more URLs directly
    ///
    /// Example: link-guardian url https://github.com/rust-lang/rust/blob/master/README.md#quick-start
    Url {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

// Flags shared by every subcommand
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Config file (default: ./link-guardian.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub API token for github.com
    ///
    /// Without a token the API allows only 60 requests per hour.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Check { common, .. } | Commands::Url { common, .. } => common,
        }
    }
}
