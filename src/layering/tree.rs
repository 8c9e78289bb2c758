//! File tree snapshots and copies.
//!
//! Trees are addressed by `/`-separated paths relative to their root so that
//! patches and snapshots read the same on every platform.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::error::Result;

/// Relative path to file contents, ordered by path.
pub type TreeSnapshot = BTreeMap<String, Vec<u8>>;

/// `/`-joined path of `path` relative to `root`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Native path for a `/`-separated relative path under `root`.
pub fn native_path(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Read every file under `root` into memory.
pub fn snapshot(root: &Path) -> Result<TreeSnapshot> {
    let mut files = TreeSnapshot::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let content = fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        files.insert(relative_path(root, entry.path()), content);
    }

    Ok(files)
}

/// Recursively copy `src` into `dst`, creating `dst` as needed.
///
/// Existing files in `dst` are overwritten.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let target = dst.join(entry.path().strip_prefix(src).unwrap_or(entry.path()));

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Whether `dir` is missing or has no entries.
pub fn is_empty_dir(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Remove empty directories from `start` upward, stopping at `root`.
pub fn prune_empty_dirs(root: &Path, start: &Path) -> Result<()> {
    let mut current = start.to_path_buf();
    while current != root && current.starts_with(root) {
        if !is_empty_dir(&current)? {
            break;
        }
        if current.exists() {
            fs::remove_dir(&current)?;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn snapshot_uses_forward_slash_paths() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/c.txt"), "deep").unwrap();
        fs::write(temp.path().join("top.txt"), "top").unwrap();

        let snap = snapshot(temp.path()).unwrap();
        let keys: Vec<&str> = snap.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a/b/c.txt", "top.txt"]);
        assert_eq!(snap["a/b/c.txt"], b"deep");
    }

    #[test]
    fn copy_tree_reproduces_snapshot() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("{{projectName}}")).unwrap();
        fs::write(src.path().join("{{projectName}}/App.swift"), "app").unwrap();
        fs::create_dir_all(src.path().join("empty")).unwrap();

        let copied = copy_tree(src.path(), &dst.path().join("out")).unwrap();
        assert_eq!(copied, 1);
        assert_eq!(
            snapshot(src.path()).unwrap(),
            snapshot(&dst.path().join("out")).unwrap()
        );
        assert!(dst.path().join("out/empty").is_dir());
    }

    #[test]
    fn native_path_joins_segments() {
        let path = native_path(Path::new("/root"), "a/b/c.txt");
        assert_eq!(path, Path::new("/root").join("a").join("b").join("c.txt"));
    }

    #[test]
    fn is_empty_dir_handles_missing_and_populated() {
        let temp = TempDir::new().unwrap();
        assert!(is_empty_dir(&temp.path().join("missing")).unwrap());
        assert!(is_empty_dir(temp.path()).unwrap());
        fs::write(temp.path().join("f"), "").unwrap();
        assert!(!is_empty_dir(temp.path()).unwrap());
    }

    #[test]
    fn prune_stops_at_root_and_non_empty_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("keep/gone/deeper")).unwrap();
        fs::write(temp.path().join("keep/file"), "x").unwrap();

        prune_empty_dirs(temp.path(), &temp.path().join("keep/gone/deeper")).unwrap();
        assert!(!temp.path().join("keep/gone").exists());
        assert!(temp.path().join("keep/file").exists());
        assert!(temp.path().exists());
    }
}
