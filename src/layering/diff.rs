//! Line-based diff in unified format.
//!
//! Lines carry their terminator, so a final line without `\n` differs from
//! the same text with one. That is what lets `\ No newline at end of file`
//! round-trip through a patch.

use std::fmt;

/// Lines of unchanged context around each change.
pub const CONTEXT_LINES: usize = 3;

/// One line of a text file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub text: String,
    /// Whether the line ends with `\n`
    pub newline: bool,
}

impl Line {
    /// A `\n`-terminated line.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            newline: true,
        }
    }

    /// A final line with no terminator.
    pub fn unterminated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            newline: false,
        }
    }
}

/// Split text into lines; `join_lines(&split_lines(s)) == s` for every `s`.
pub fn split_lines(content: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        match rest.find('\n') {
            Some(end) => {
                lines.push(Line::new(&rest[..end]));
                rest = &rest[end + 1..];
            }
            None => {
                lines.push(Line::unterminated(rest));
                break;
            }
        }
    }

    lines
}

/// Reassemble lines into text.
pub fn join_lines(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.text);
        if line.newline {
            out.push('\n');
        }
    }
    out
}

/// A line within a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(Line),
    Removed(Line),
    Added(Line),
}

impl HunkLine {
    pub fn line(&self) -> &Line {
        match self {
            HunkLine::Context(l) | HunkLine::Removed(l) | HunkLine::Added(l) => l,
        }
    }

    pub fn line_mut(&mut self) -> &mut Line {
        match self {
            HunkLine::Context(l) | HunkLine::Removed(l) | HunkLine::Added(l) => l,
        }
    }

    fn prefix(&self) -> char {
        match self {
            HunkLine::Context(_) => ' ',
            HunkLine::Removed(_) => '-',
            HunkLine::Added(_) => '+',
        }
    }
}

impl fmt::Display for HunkLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line();
        writeln!(f, "{}{}", self.prefix(), line.text)?;
        if !line.newline {
            writeln!(f, "\\ No newline at end of file")?;
        }
        Ok(())
    }
}

/// A contiguous region of change.
///
/// Starts are 1-based; a zero-length side uses the line before the region,
/// as in GNU diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// Build a hunk from its lines, computing lengths.
    pub fn from_lines(old_start: usize, new_start: usize, lines: Vec<HunkLine>) -> Self {
        let old_len = lines
            .iter()
            .filter(|l| !matches!(l, HunkLine::Added(_)))
            .count();
        let new_len = lines
            .iter()
            .filter(|l| !matches!(l, HunkLine::Removed(_)))
            .count();
        Self {
            old_start,
            old_len,
            new_start,
            new_len,
            lines,
        }
    }

    /// Lines the hunk expects to find (context and removals).
    pub fn old_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter_map(|l| match l {
            HunkLine::Context(x) | HunkLine::Removed(x) => Some(x),
            HunkLine::Added(_) => None,
        })
    }

    /// Lines the hunk leaves behind (context and additions).
    pub fn new_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter_map(|l| match l {
            HunkLine::Context(x) | HunkLine::Added(x) => Some(x),
            HunkLine::Removed(_) => None,
        })
    }

    /// `@@ -a,b +c,d @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            range(self.old_start, self.old_len),
            range(self.new_start, self.new_len)
        )
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for line in &self.lines {
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn range(start: usize, len: usize) -> String {
    if len == 1 {
        start.to_string()
    } else {
        format!("{},{}", start, len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal(usize),
    Delete(usize),
    Insert(usize),
}

/// Shortest edit script by longest common subsequence.
///
/// Common prefix and suffix are stripped before the quadratic table is built.
/// On ties deletions come before insertions.
fn edit_script(old: &[Line], new: &[Line]) -> Vec<Edit> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];
    let (n, m) = (a.len(), b.len());
    let width = m + 1;

    // lcs[i * width + j] is the LCS length of a[i..] and b[j..]
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut edits: Vec<Edit> = (0..prefix).map(Edit::Equal).collect();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            edits.push(Edit::Equal(prefix + i));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            edits.push(Edit::Delete(prefix + i));
            i += 1;
        } else {
            edits.push(Edit::Insert(prefix + j));
            j += 1;
        }
    }
    edits.extend((i..n).map(|k| Edit::Delete(prefix + k)));
    edits.extend((j..m).map(|k| Edit::Insert(prefix + k)));
    edits.extend((old.len() - suffix..old.len()).map(Edit::Equal));
    edits
}

/// Diff two line sequences into hunks with [`CONTEXT_LINES`] of context.
///
/// Changes separated by no more than twice the context share a hunk.
pub fn diff_lines(old: &[Line], new: &[Line]) -> Vec<Hunk> {
    let edits = edit_script(old, new);

    // Position in each file before every edit.
    let mut old_pos = Vec::with_capacity(edits.len() + 1);
    let mut new_pos = Vec::with_capacity(edits.len() + 1);
    let (mut o, mut n) = (0, 0);
    for edit in &edits {
        old_pos.push(o);
        new_pos.push(n);
        match edit {
            Edit::Equal(_) => {
                o += 1;
                n += 1;
            }
            Edit::Delete(_) => o += 1,
            Edit::Insert(_) => n += 1,
        }
    }

    let mut groups: Vec<(usize, usize)> = Vec::new();
    for (k, edit) in edits.iter().enumerate() {
        if matches!(edit, Edit::Equal(_)) {
            continue;
        }
        match groups.last_mut() {
            Some((_, last)) if k - *last <= 2 * CONTEXT_LINES + 1 => *last = k,
            _ => groups.push((k, k)),
        }
    }

    groups
        .into_iter()
        .map(|(first, last)| {
            let start = first.saturating_sub(CONTEXT_LINES);
            let end = (last + CONTEXT_LINES + 1).min(edits.len());

            let lines: Vec<HunkLine> = edits[start..end]
                .iter()
                .map(|edit| match *edit {
                    Edit::Equal(i) => HunkLine::Context(old[i].clone()),
                    Edit::Delete(i) => HunkLine::Removed(old[i].clone()),
                    Edit::Insert(j) => HunkLine::Added(new[j].clone()),
                })
                .collect();

            let mut hunk = Hunk::from_lines(0, 0, lines);
            hunk.old_start = old_pos[start] + usize::from(hunk.old_len > 0);
            hunk.new_start = new_pos[start] + usize::from(hunk.new_len > 0);
            hunk
        })
        .collect()
}

/// Replay hunks over `original`, requiring every hunk to match exactly.
///
/// Hunks must be in file order. Context and removed lines have to be present
/// at the stated position; no offset or fuzz is attempted.
pub fn apply_hunks(original: &[Line], hunks: &[Hunk]) -> Result<Vec<Line>, String> {
    let mut out = Vec::with_capacity(original.len());
    let mut cursor = 0;

    for (index, hunk) in hunks.iter().enumerate() {
        let start = if hunk.old_len == 0 {
            hunk.old_start
        } else {
            hunk.old_start.saturating_sub(1)
        };
        if start < cursor || start > original.len() {
            return Err(format!(
                "hunk {} ({}) is out of range for a {}-line file",
                index + 1,
                hunk.header(),
                original.len()
            ));
        }
        out.extend_from_slice(&original[cursor..start]);

        for (offset, expected) in hunk.old_lines().enumerate() {
            match original.get(start + offset) {
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return Err(format!(
                        "hunk {} ({}) does not match at line {}: expected {:?}, found {:?}",
                        index + 1,
                        hunk.header(),
                        start + offset + 1,
                        expected.text,
                        actual.text
                    ));
                }
                None => {
                    return Err(format!(
                        "hunk {} ({}) runs past the end of the file",
                        index + 1,
                        hunk.header()
                    ));
                }
            }
        }

        out.extend(hunk.new_lines().cloned());
        cursor = start + hunk.old_len;
    }

    out.extend_from_slice(&original[cursor..]);
    Ok(out)
}
