//! Source file discovery

use crate::error::{FrontEndError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directories never descended into
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".git",
    ".turbo",
    ".cache",
];

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Result of looking up an analysis target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The target path does not exist
    Missing(PathBuf),
    /// Files to analyze, sorted by path
    Files(Vec<PathBuf>),
}

impl Discovery {
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Discovery::Missing(_) => &[],
            Discovery::Files(files) => files,
        }
    }
}

/// Check whether a path names a TypeScript source (declaration files included)
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Locate the files to analyze.
///
/// A single file target is returned as-is. A directory yields its source
/// files, descending into subdirectories only when `recursive` is set.
/// The result is sorted lexicographically so collection order is stable.
pub fn discover(target: &Path, recursive: bool) -> Result<Discovery> {
    if !target.exists() {
        return Ok(Discovery::Missing(target.to_path_buf()));
    }

    if !target.is_dir() {
        return Ok(Discovery::Files(vec![target.to_path_buf()]));
    }

    let mut files = Vec::new();
    walk(target, recursive, &mut files)?;
    files.sort();
    tracing::debug!("Discovered {} source file(s) under {}", files.len(), target.display());
    Ok(Discovery::Files(files))
}

fn walk(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| FrontEndError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| FrontEndError::io(dir, e))?;
        let path = entry.path();
        // symlinked directories are not descended into
        let file_type = entry.file_type().map_err(|e| FrontEndError::io(&path, e))?;

        if file_type.is_dir() {
            let skipped = path
                .file_name()
                .map(|n| SKIP_DIRS.iter().any(|&s| n == s))
                .unwrap_or(false);
            if recursive && !skipped {
                walk(&path, recursive, files)?;
            }
        } else if is_source_file(&path) && !path.is_dir() {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_missing_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nope");
        let found = discover(&target, true).unwrap();
        assert_eq!(found, Discovery::Missing(target.clone()));
        assert!(found.files().is_empty());
    }

    #[test]
    fn test_single_file_target() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("only.ts");
        touch(&file);
        let found = discover(&file, false).unwrap();
        assert_eq!(found.files(), &[file]);
    }

    #[test]
    fn test_directory_is_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.ts"));
        touch(&dir.path().join("a.tsx"));
        touch(&dir.path().join("notes.md"));
        touch(&dir.path().join("types.d.ts"));

        let found = discover(dir.path(), false).unwrap();
        let names: Vec<_> = found
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.tsx", "b.ts", "types.d.ts"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("sub/inner.ts"));
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("alias.ts")).unwrap();

        let deep = discover(dir.path(), true).unwrap();
        assert_eq!(deep.files(), &[dir.path().join("sub/inner.ts")]);
    }

    #[test]
    fn test_recursion_is_opt_in() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("top.ts"));
        touch(&dir.path().join("sub/inner.ts"));
        touch(&dir.path().join("node_modules/dep/index.ts"));

        let flat = discover(dir.path(), false).unwrap();
        assert_eq!(flat.files().len(), 1);

        let deep = discover(dir.path(), true).unwrap();
        let names: Vec<_> = deep
            .files()
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["sub/inner.ts", "top.ts"]);
    }
}
