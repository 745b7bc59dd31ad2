// src/docs.rs
// =============================================================================
// This module finds documentation files and pulls links out of them.
//
// - walkdir walks each path given on the command line
// - glob patterns (file_mask / exclude_paths) decide which files count,
//   matched against the path relative to the scan root
// - the file extension picks the extractor: HTML for .html/.htm,
//   Markdown for everything else
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

use crate::checker::{extract_html_links, extract_markdown_links};

/// A documentation file found under a scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocFile {
    pub path: PathBuf,
    /// Directory the file was found under (for root-relative links)
    pub root: PathBuf,
}

impl DocFile {
    /// Directory relative links in this file resolve against
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.root)
    }

    pub fn display(&self) -> String {
        self.path
            .strip_prefix(&self.root)
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern '{}'", p)))
        .collect()
}

// Finds every documentation file under `paths`
//
// A path that is a file is taken as-is (no mask applied); directories are
// walked recursively and filtered by the masks.
pub fn find_doc_files(paths: &[PathBuf], file_mask: &[String], exclude: &[String]) -> Result<Vec<DocFile>> {
    let include = compile(file_mask)?;
    let exclude = compile(exclude)?;
    let mut files = Vec::new();

    for root in paths {
        if root.is_file() {
            files.push(DocFile {
                path: root.clone(),
                root: root.parent().map(Path::to_path_buf).unwrap_or_default(),
            });
            continue;
        }
        if !root.exists() {
            anyhow::bail!("Path does not exist: {}", root.display());
        }

        for entry in WalkDir::new(root).follow_links(false).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if include.iter().any(|p| p.matches_path(relative))
                && !exclude.iter().any(|p| p.matches_path(relative))
            {
                files.push(DocFile {
                    path: entry.path().to_path_buf(),
                    root: root.clone(),
                });
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup();
    Ok(files)
}

// Reads a documentation file and returns the links it contains
pub fn extract_links(file: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let is_html = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);

    Ok(if is_html {
        extract_html_links(&content)
    } else {
        extract_markdown_links(&content)
    })
}
