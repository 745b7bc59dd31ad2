// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the config file and apply CLI overrides
// 3. Collect links (from documentation files, or straight from the CLI)
// 4. Check every unique link concurrently and print the results
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod checker; // src/checker/ - link extraction and checking
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - link-guardian.toml
mod docs; // src/docs.rs - finding documentation files
mod github; // src/github/ - GitHub URL validation
mod logging; // src/logging.rs - tracing setup

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use checker::{Checker, GithubChecker, LinkCheckResult, LinkStatus, LinkTarget};
use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole anyhow context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err   = internal error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let common = cli.command.common();
    logging::init_logging(common.verbose);

    let mut config = Config::load(common.config.as_deref())?;
    if let Commands::Check {
        concurrency,
        timeout,
        ..
    } = &cli.command
    {
        if let Some(concurrency) = concurrency {
            config.concurrency = (*concurrency).max(1);
        }
        if let Some(timeout) = timeout {
            config.timeout_secs = *timeout;
        }
    }

    let github = GithubChecker::from_config(&config, common.github_token.as_deref())?;
    let checker = Arc::new(Checker::new(&config, github)?);
    let json = common.json;

    let targets = match &cli.command {
        Commands::Check { paths, .. } => collect_from_files(&checker, &config, paths)?,
        Commands::Url { urls, .. } => collect_from_args(&checker, urls),
    };

    if targets.is_empty() {
        tracing::info!("no links found to check");
        print_results(&[], json)?;
        return Ok(0);
    }

    tracing::info!("checking {} unique link(s)", targets.len());
    let results = checker.check_all(targets).await;
    print_results(&results, json)?;

    if results.iter().any(|r| !r.is_ok()) {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Walks the given paths and maps every link target to the files it appears in
fn collect_from_files(
    checker: &Checker,
    config: &Config,
    paths: &[PathBuf],
) -> Result<BTreeMap<LinkTarget, Vec<String>>> {
    let files = docs::find_doc_files(paths, &config.file_mask, &config.exclude_paths)?;
    tracing::info!("found {} documentation file(s)", files.len());

    let mut targets: BTreeMap<LinkTarget, Vec<String>> = BTreeMap::new();
    for file in &files {
        let links = docs::extract_links(&file.path)?;
        let source = file.display();
        tracing::debug!("{} link(s) in {}", links.len(), source);

        for link in links {
            let Some(target) = checker.classify(&link, file.dir(), &file.root) else {
                tracing::debug!(%link, "unsupported scheme, not checked");
                continue;
            };
            let sources = targets.entry(target).or_default();
            if !sources.contains(&source) {
                sources.push(source.clone());
            }
        }
    }
    Ok(targets)
}

// Links given on the command line; relative ones resolve against the working directory
fn collect_from_args(checker: &Checker, urls: &[String]) -> BTreeMap<LinkTarget, Vec<String>> {
    let cwd = Path::new(".");
    urls.iter()
        .filter_map(|url| checker.classify(url, cwd, cwd))
        .map(|target| (target, Vec::new()))
        .collect()
}

// Prints the results either as a table or JSON
fn print_results(results: &[LinkCheckResult], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        print_table(results);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[LinkCheckResult]) {
    println!("{:<60} {:<22} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(112));

    for result in results {
        let status_display = format_status(&result.status);
        let message = result.message.as_deref().unwrap_or("");

        // Truncate on a char boundary so multi-byte URLs don't panic
        let url_display = if result.url.chars().count() > 57 {
            format!("{}...", result.url.chars().take(57).collect::<String>())
        } else {
            result.url.clone()
        };

        println!("{:<60} {:<22} {:<30}", url_display, status_display, message);
        if !result.is_ok() && !result.sources.is_empty() {
            println!("    in {}", result.sources.join(", "));
        }
    }

    println!();

    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    let broken_count = results.iter().filter(|r| r.is_broken()).count();
    let error_count = results.len() - ok_count - broken_count;

    println!("📊 Summary:");
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Broken: {}", broken_count);
    println!("   ⚠️  Errors: {}", error_count);
    println!("   📋 Total: {}", results.len());
}

fn format_status(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Ok => "✅ OK".to_string(),
        LinkStatus::Redirect { .. } => "🔀 REDIRECT".to_string(),
        LinkStatus::Broken => "❌ BROKEN".to_string(),
        LinkStatus::Timeout => "⏱️  TIMEOUT".to_string(),
        LinkStatus::SslError => "🔒 SSL ERROR".to_string(),
        LinkStatus::TooManyRedirects => "🔁 TOO MANY REDIRECTS".to_string(),
        LinkStatus::DnsError => "🌐 DNS ERROR".to_string(),
        LinkStatus::Skipped => "⏭️  SKIPPED".to_string(),
        LinkStatus::Error => "⚠️  ERROR".to_string(),
    }
}
