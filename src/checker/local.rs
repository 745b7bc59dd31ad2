// src/checker/local.rs
// =============================================================================
// This module checks relative links between documentation files.
//
//   docs/guide.md contains [setup](../SETUP.md#linux)
//   -> resolves to <docs>/../SETUP.md -> must exist on disk
//
// A link starting with '/' is taken relative to the scan root, the way
// GitHub renders repository-absolute links. Queries and fragments are
// dropped and the path is percent-decoded ("my%20file.md").
// =============================================================================

use std::path::{Path, PathBuf};

use super::{LinkCheckResult, LinkStatus};

// Resolves a relative link to a filesystem path
//
// `base` is the directory of the file the link was found in.
pub fn resolve_local(link: &str, base: &Path, root: &Path) -> PathBuf {
    let without_fragment = link.split(['#', '?']).next().unwrap_or_default();
    let decoded = urlencoding::decode(without_fragment)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| without_fragment.to_string());

    match decoded.strip_prefix('/') {
        Some(from_root) => root.join(from_root),
        None => base.join(decoded),
    }
}

// A file or a directory both count as "exists"
pub fn check_local(path: &Path) -> LinkCheckResult {
    let display = path.display().to_string();
    if path.exists() {
        LinkCheckResult::new(display, LinkStatus::Ok, "exists")
    } else {
        LinkCheckResult::new(display, LinkStatus::Broken, "no such file or directory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_relative_to_containing_dir() {
        let path = resolve_local("../SETUP.md#linux", Path::new("/repo/docs"), Path::new("/repo"));
        assert_eq!(path, PathBuf::from("/repo/docs/../SETUP.md"));
    }

    #[test]
    fn test_absolute_is_relative_to_root() {
        let path = resolve_local("/docs/a%20b.md?plain=1", Path::new("/repo"), Path::new("/repo"));
        assert_eq!(path, PathBuf::from("/repo/docs/a b.md"));
    }

    #[test]
    fn test_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("present.md");
        fs::write(&file, "# hi").unwrap();

        assert!(check_local(&file).is_ok());
        assert!(check_local(dir.path()).is_ok());
        assert_eq!(
            check_local(&dir.path().join("absent.md")).status,
            LinkStatus::Broken
        );
    }
}
