//! Patch artifacts: the on-disk delta of a layered template.
//!
//! A patch is plain unified-diff text, one section per file, ordered by path:
//!
//! ```text
//! --- a/MyApp/App.swift
//! +++ b/MyApp/App.swift
//! @@ -1,3 +1,4 @@
//!  import SwiftUI
//! +import Login
//! ```
//!
//! Added files diff against `/dev/null` on the old side and removed files on
//! the new side. Application is strict: every hunk must match exactly.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::diff::{apply_hunks, diff_lines, join_lines, split_lines, Hunk, HunkLine, Line};
use super::tree::{native_path, prune_empty_dirs, TreeSnapshot};
use crate::error::{Result, StrataError};

const DEV_NULL: &str = "/dev/null";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

/// Change to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePatch {
    Added { path: String, lines: Vec<Line> },
    Removed { path: String, lines: Vec<Line> },
    Modified { path: String, hunks: Vec<Hunk> },
}

impl FilePatch {
    /// Relative `/`-separated path of the file.
    pub fn path(&self) -> &str {
        match self {
            FilePatch::Added { path, .. }
            | FilePatch::Removed { path, .. }
            | FilePatch::Modified { path, .. } => path,
        }
    }

    fn whole_file_hunk(lines: &[Line], added: bool) -> Hunk {
        let body = lines
            .iter()
            .cloned()
            .map(|l| {
                if added {
                    HunkLine::Added(l)
                } else {
                    HunkLine::Removed(l)
                }
            })
            .collect();
        let mut hunk = Hunk::from_lines(0, 0, body);
        if added {
            hunk.new_start = 1;
        } else {
            hunk.old_start = 1;
        }
        hunk
    }
}

impl fmt::Display for FilePatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilePatch::Added { path, lines } => {
                writeln!(f, "--- {}", DEV_NULL)?;
                writeln!(f, "+++ b/{}", path)?;
                if !lines.is_empty() {
                    write!(f, "{}", Self::whole_file_hunk(lines, true))?;
                }
            }
            FilePatch::Removed { path, lines } => {
                writeln!(f, "--- a/{}", path)?;
                writeln!(f, "+++ {}", DEV_NULL)?;
                if !lines.is_empty() {
                    write!(f, "{}", Self::whole_file_hunk(lines, false))?;
                }
            }
            FilePatch::Modified { path, hunks } => {
                writeln!(f, "--- a/{}", path)?;
                writeln!(f, "+++ b/{}", path)?;
                for hunk in hunks {
                    write!(f, "{}", hunk)?;
                }
            }
        }
        Ok(())
    }
}

/// Counts of changed files by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl PatchSummary {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Ordered set of file changes turning a parent tree into a child tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchArtifact {
    pub files: Vec<FilePatch>,
}

impl PatchArtifact {
    /// Diff two trees. Output is sorted by path and fully deterministic.
    ///
    /// Files whose bytes differ must both be valid UTF-8.
    pub fn between(parent: &TreeSnapshot, child: &TreeSnapshot) -> Result<Self> {
        let mut paths: Vec<&String> = parent.keys().chain(child.keys()).collect();
        paths.sort();
        paths.dedup();

        let mut files = Vec::new();
        for path in paths {
            let patch = match (parent.get(path), child.get(path)) {
                (Some(old), Some(new)) if old == new => continue,
                (Some(old), Some(new)) => FilePatch::Modified {
                    path: path.clone(),
                    hunks: diff_lines(
                        &split_lines(text(path, old)?),
                        &split_lines(text(path, new)?),
                    ),
                },
                (None, Some(new)) => FilePatch::Added {
                    path: path.clone(),
                    lines: split_lines(text(path, new)?),
                },
                (Some(old), None) => FilePatch::Removed {
                    path: path.clone(),
                    lines: split_lines(text(path, old)?),
                },
                (None, None) => continue,
            };
            files.push(patch);
        }

        Ok(Self { files })
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Count changed files by kind.
    pub fn summary(&self) -> PatchSummary {
        self.files
            .iter()
            .fold(PatchSummary::default(), |mut summary, file| {
                match file {
                    FilePatch::Added { .. } => summary.added += 1,
                    FilePatch::Removed { .. } => summary.removed += 1,
                    FilePatch::Modified { .. } => summary.modified += 1,
                }
                summary
            })
    }

    /// Read and parse a patch file.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(StrataError::PatchMissing {
                path: path.to_path_buf(),
            });
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Write the patch text.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Parse unified-diff text.
    ///
    /// Lines outside file sections (`diff --git`, `index`, mode lines) are
    /// ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut files = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let Some(old_header) = lines[i].strip_prefix("--- ") else {
                i += 1;
                continue;
            };
            let new_header = lines
                .get(i + 1)
                .and_then(|l| l.strip_prefix("+++ "))
                .ok_or_else(|| parse_error(i + 2, "expected '+++' after '---'"))?;
            let header_line = i + 1;
            i += 2;

            let mut hunks = Vec::new();
            while lines.get(i).is_some_and(|l| l.starts_with("@@ ")) {
                let (hunk, next) = parse_hunk(&lines, i)?;
                hunks.push(hunk);
                i = next;
            }

            let patch = match (header_path(old_header), header_path(new_header)) {
                (None, Some(path)) => FilePatch::Added {
                    path,
                    lines: hunks.iter().flat_map(|h| h.new_lines().cloned()).collect(),
                },
                (Some(path), None) => FilePatch::Removed {
                    path,
                    lines: hunks.iter().flat_map(|h| h.old_lines().cloned()).collect(),
                },
                (Some(_), Some(path)) if hunks.is_empty() => {
                    return Err(parse_error(
                        header_line,
                        &format!("no hunks for modified file '{}'", path),
                    ));
                }
                (Some(_), Some(path)) => FilePatch::Modified { path, hunks },
                (None, None) => {
                    return Err(parse_error(header_line, "both sides are /dev/null"));
                }
            };
            files.push(patch);
        }

        Ok(Self { files })
    }

    /// Apply every file change under `root`, stopping at the first failure.
    ///
    /// Removals run before additions and edits so a path can switch between
    /// file and directory within one patch.
    pub fn apply(&self, root: &Path) -> Result<()> {
        let (removals, rest): (Vec<&FilePatch>, Vec<&FilePatch>) = self
            .files
            .iter()
            .partition(|f| matches!(f, FilePatch::Removed { .. }));
        for file in removals.into_iter().chain(rest) {
            apply_file(root, file)?;
        }
        Ok(())
    }
}

impl fmt::Display for PatchArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(f, "{}", file)?;
        }
        Ok(())
    }
}

fn text<'a>(path: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|_| {
        StrataError::Other(anyhow::anyhow!(
            "{} is not UTF-8 text and cannot be stored in a layer patch",
            path
        ))
    })
}

fn parse_error(line: usize, message: &str) -> StrataError {
    StrataError::PatchParse {
        line,
        message: message.to_string(),
    }
}

fn apply_error(path: &str, message: impl Into<String>) -> StrataError {
    StrataError::PatchApply {
        file: path.to_string(),
        message: message.into(),
    }
}

/// Path from a `---`/`+++` header; `None` for `/dev/null`.
fn header_path(header: &str) -> Option<String> {
    let raw = header.split('\t').next().unwrap_or(header).trim_end();
    if raw == DEV_NULL {
        return None;
    }
    let path = raw
        .strip_prefix("a/")
        .or_else(|| raw.strip_prefix("b/"))
        .unwrap_or(raw);
    Some(path.to_string())
}

/// Parse the hunk starting at `lines[start]`, returning it and the index of
/// the line after it.
fn parse_hunk(lines: &[&str], start: usize) -> Result<(Hunk, usize)> {
    let caps = HUNK_HEADER
        .captures(lines[start])
        .ok_or_else(|| parse_error(start + 1, "malformed hunk header"))?;
    let number = |index: usize, default: usize| -> Result<usize> {
        match caps.get(index) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| parse_error(start + 1, "hunk range out of bounds")),
            None => Ok(default),
        }
    };
    let old_start = number(1, 0)?;
    let old_len = number(2, 1)?;
    let new_start = number(3, 0)?;
    let new_len = number(4, 1)?;

    let (mut old_left, mut new_left) = (old_len, new_len);
    let mut body: Vec<HunkLine> = Vec::new();
    let mut i = start + 1;

    while old_left > 0 || new_left > 0 {
        let Some(raw) = lines.get(i) else {
            return Err(parse_error(i + 1, "unexpected end of patch inside hunk"));
        };

        if let Some(marker) = raw.strip_prefix('\\') {
            mark_unterminated(&mut body, i, marker)?;
            i += 1;
            continue;
        }

        let (kind, text) = match raw.chars().next() {
            Some(c @ (' ' | '-' | '+')) => (c, &raw[1..]),
            // Some tools strip the space from empty context lines.
            None => (' ', ""),
            Some(_) => return Err(parse_error(i + 1, "unexpected line inside hunk")),
        };

        let line = Line::new(text);
        match kind {
            ' ' if old_left > 0 && new_left > 0 => {
                old_left -= 1;
                new_left -= 1;
                body.push(HunkLine::Context(line));
            }
            '-' if old_left > 0 => {
                old_left -= 1;
                body.push(HunkLine::Removed(line));
            }
            '+' if new_left > 0 => {
                new_left -= 1;
                body.push(HunkLine::Added(line));
            }
            _ => return Err(parse_error(i + 1, "hunk is longer than its header")),
        }
        i += 1;
    }

    while let Some(marker) = lines.get(i).and_then(|l| l.strip_prefix('\\')) {
        mark_unterminated(&mut body, i, marker)?;
        i += 1;
    }

    Ok((
        Hunk {
            old_start,
            old_len,
            new_start,
            new_len,
            lines: body,
        },
        i,
    ))
}

fn mark_unterminated(body: &mut [HunkLine], index: usize, _marker: &str) -> Result<()> {
    match body.last_mut() {
        Some(previous) => {
            previous.line_mut().newline = false;
            Ok(())
        }
        None => Err(parse_error(
            index + 1,
            "'\\ No newline' marker without a preceding line",
        )),
    }
}

fn apply_file(root: &Path, file: &FilePatch) -> Result<()> {
    let path = file.path();
    let target = native_path(root, path);

    match file {
        FilePatch::Added { lines, .. } => {
            if target.exists() {
                return Err(apply_error(path, "file to be added already exists"));
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, join_lines(lines))?;
            debug!("Added {}", path);
        }
        FilePatch::Removed { lines, .. } => {
            let current = read_existing(&target, path)?;
            if split_lines(&current) != *lines {
                return Err(apply_error(
                    path,
                    "file to be removed does not match the patch",
                ));
            }
            fs::remove_file(&target)?;
            if let Some(parent) = target.parent() {
                prune_empty_dirs(root, parent)?;
            }
            debug!("Removed {}", path);
        }
        FilePatch::Modified { hunks, .. } => {
            let current = read_existing(&target, path)?;
            let updated =
                apply_hunks(&split_lines(&current), hunks).map_err(|m| apply_error(path, m))?;
            fs::write(&target, join_lines(&updated))?;
            debug!("Patched {} ({} hunk(s))", path, hunks.len());
        }
    }

    Ok(())
}

fn read_existing(target: &Path, path: &str) -> Result<String> {
    if !target.is_file() {
        return Err(apply_error(path, "file does not exist"));
    }
    fs::read_to_string(target).map_err(|e| apply_error(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layering::tree::snapshot;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TreeSnapshot {
        files
            .iter()
            .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
            .collect()
    }

    fn write_tree(root: &Path, files: &[(&str, &str)]) {
        for (p, c) in files {
            let path = native_path(root, p);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, c).unwrap();
        }
    }

    #[test]
    fn identical_trees_produce_empty_patch() {
        let t = tree(&[("a.txt", "same\n")]);
        let patch = PatchArtifact::between(&t, &t).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.to_string(), "");
    }

    #[test]
    fn serializes_adds_removes_and_edits_in_path_order() {
        let parent = tree(&[("b.txt", "keep\nold\n"), ("gone.txt", "bye")]);
        let child = tree(&[("a.txt", "new\n"), ("b.txt", "keep\nnew\n")]);
        let patch = PatchArtifact::between(&parent, &child).unwrap();

        assert_eq!(
            patch.to_string(),
            "--- /dev/null\n+++ b/a.txt\n@@ -0,0 +1 @@\n+new\n\
             --- a/b.txt\n+++ b/b.txt\n@@ -1,2 +1,2 @@\n keep\n-old\n+new\n\
             --- a/gone.txt\n+++ /dev/null\n@@ -1 +0,0 @@\n-bye\n\\ No newline at end of file\n"
        );
        assert_eq!(
            patch.summary(),
            PatchSummary {
                added: 1,
                removed: 1,
                modified: 1
            }
        );
    }

    #[test]
    fn parse_inverts_display() {
        let parent = tree(&[("x/y.swift", "a\nb\nc"), ("del.md", "")]);
        let child = tree(&[("x/y.swift", "a\nB\nc\n"), ("empty.txt", "")]);
        let patch = PatchArtifact::between(&parent, &child).unwrap();
        assert_eq!(PatchArtifact::parse(&patch.to_string()).unwrap(), patch);
    }

    #[test]
    fn parse_ignores_git_headers() {
        let text = "diff --git a/f b/f\nindex 123..456 100644\n--- a/f\n+++ b/f\n@@ -1 +1 @@\n-x\n+y\n";
        let patch = PatchArtifact::parse(text).unwrap();
        assert_eq!(patch.files.len(), 1);
        assert_eq!(patch.files[0].path(), "f");
    }

    #[test]
    fn parse_rejects_truncated_hunk() {
        let err = PatchArtifact::parse("--- a/f\n+++ b/f\n@@ -1,3 +1,3 @@\n a\n").unwrap_err();
        assert!(matches!(err, StrataError::PatchParse { .. }));
    }

    #[test]
    fn parse_rejects_missing_new_header() {
        let err = PatchArtifact::parse("--- a/f\n@@ -1 +1 @@\n").unwrap_err();
        assert!(matches!(err, StrataError::PatchParse { line: 2, .. }));
    }

    #[test]
    fn apply_turns_parent_into_child() {
        let temp = TempDir::new().unwrap();
        let parent = [("src/App.swift", "import UI\nlet a = 1\n"), ("old/only.txt", "x\n")];
        let child = [("src/App.swift", "import UI\nimport Login\nlet a = 1\n"), ("README.md", "hi")];
        write_tree(temp.path(), &parent);

        let patch = PatchArtifact::between(&tree(&parent), &tree(&child)).unwrap();
        patch.apply(temp.path()).unwrap();

        assert_eq!(snapshot(temp.path()).unwrap(), tree(&child));
        assert!(!temp.path().join("old").exists());
    }

    #[test]
    fn directory_replaced_by_file_round_trips() {
        let temp = TempDir::new().unwrap();
        let parent = [("Config/a.txt", "a\n"), ("Config/b.txt", "b\n")];
        let child = [("Config", "flat config\n")];
        write_tree(temp.path(), &parent);

        let patch = PatchArtifact::between(&tree(&parent), &tree(&child)).unwrap();
        assert_eq!(patch.files[0].path(), "Config");
        patch.apply(temp.path()).unwrap();

        assert_eq!(snapshot(temp.path()).unwrap(), tree(&child));
    }

    #[test]
    fn file_replaced_by_directory_round_trips() {
        let temp = TempDir::new().unwrap();
        let parent = [("Config", "flat config\n")];
        let child = [("Config/a.txt", "a\n")];
        write_tree(temp.path(), &parent);

        let patch = PatchArtifact::between(&tree(&parent), &tree(&child)).unwrap();
        PatchArtifact::parse(&patch.to_string())
            .unwrap()
            .apply(temp.path())
            .unwrap();

        assert_eq!(snapshot(temp.path()).unwrap(), tree(&child));
    }

    #[test]
    fn apply_refuses_to_overwrite_on_add() {
        let temp = TempDir::new().unwrap();
        write_tree(temp.path(), &[("new.txt", "already here\n")]);
        let patch = PatchArtifact::between(&tree(&[]), &tree(&[("new.txt", "x\n")])).unwrap();

        let err = patch.apply(temp.path()).unwrap_err();
        assert!(matches!(err, StrataError::PatchApply { ref file, .. } if file == "new.txt"));
    }

    #[test]
    fn apply_refuses_stale_parent() {
        let temp = TempDir::new().unwrap();
        let parent = [("f.txt", "1\n2\n3\n")];
        let child = [("f.txt", "1\ntwo\n3\n")];
        let patch = PatchArtifact::between(&tree(&parent), &tree(&child)).unwrap();

        write_tree(temp.path(), &[("f.txt", "1\n2\nTHREE\n")]);
        let err = patch.apply(temp.path()).unwrap_err();
        assert!(err.to_string().contains("f.txt"));
        assert!(err.to_string().contains("hunk 1"));
    }

    #[test]
    fn read_reports_missing_patch() {
        let temp = TempDir::new().unwrap();
        let err = PatchArtifact::read(&temp.path().join("layer.patch")).unwrap_err();
        assert!(matches!(err, StrataError::PatchMissing { .. }));
    }

    #[test]
    fn binary_changes_are_rejected() {
        let parent: TreeSnapshot = [("img.png".to_string(), vec![0xff, 0x00])].into();
        let child: TreeSnapshot = [("img.png".to_string(), vec![0xfe, 0x01])].into();
        assert!(PatchArtifact::between(&parent, &child).is_err());
    }
}
