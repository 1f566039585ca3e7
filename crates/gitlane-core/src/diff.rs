//! Unified diff parsing (`git diff`, `git diff --cached`, `git diff --no-index`,
//! the patch section of `git show`).
//!
//! The parser works in two passes per file: header lines (`diff --git`,
//! `---`, `+++`, `Binary files`) fill in the file record, and every line from
//! the first `@@` on is collected and handed to [`parse_hunks`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::status::{GitStatus, StatusCode};
use crate::text::{raw_lines, unquote_path};

/// Path git prints for the missing side of an add or delete.
pub const DEV_NULL: &str = "/dev/null";

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$").expect("hunk header regex")
});

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Deleted,
    #[default]
    Modified,
    Renamed,
}

impl DiffStatus {
    /// Derive the status from which sides of the diff exist.
    pub fn from_paths(old_path: &str, new_path: &str) -> Self {
        if old_path.is_empty() && !new_path.is_empty() {
            Self::Added
        } else if new_path.is_empty() && !old_path.is_empty() {
            Self::Deleted
        } else {
            Self::Modified
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkLineKind {
    Context,
    Addition,
    Deletion,
}

impl HunkLineKind {
    pub fn marker(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Addition => '+',
            Self::Deletion => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkLine {
    #[serde(rename = "type")]
    pub kind: HunkLineKind,
    pub content: String,
    pub old_line_number: Option<u32>,
    pub new_line_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    /// Function-context hint after the closing `@@`.
    pub header: String,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    pub fn additions(&self) -> usize {
        self.count(HunkLineKind::Addition)
    }

    pub fn deletions(&self) -> usize {
        self.count(HunkLineKind::Deletion)
    }

    fn count(&self, kind: HunkLineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    /// Empty when the file did not exist before.
    pub old_path: String,
    /// Empty when the file no longer exists.
    pub new_path: String,
    pub status: DiffStatus,
    pub is_binary: bool,
    pub hunks: Vec<Hunk>,
    pub additions: usize,
    pub deletions: usize,
}

impl DiffFile {
    /// The path to show in lists: new path, or old path for deletions.
    pub fn display_path(&self) -> &str {
        if self.new_path.is_empty() {
            &self.old_path
        } else {
            &self.new_path
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File level
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FileBuilder<'a> {
    old_path: String,
    new_path: String,
    is_binary: bool,
    created: bool,
    deleted: bool,
    in_hunks: bool,
    raw: Vec<&'a str>,
}

impl<'a> FileBuilder<'a> {
    fn from_git_header(rest: &str) -> Self {
        let (old_path, new_path) = parse_git_header(rest);
        Self {
            old_path,
            new_path,
            ..Self::default()
        }
    }

    fn header(&mut self, line: &str) {
        if let Some(path) = line.strip_prefix("--- ") {
            self.old_path = clean_path(path, "a/");
        } else if let Some(path) = line.strip_prefix("+++ ") {
            self.new_path = clean_path(path, "b/");
        } else if let Some(rest) = line.strip_prefix("Binary files ") {
            self.is_binary = true;
            let rest = rest.trim_end().trim_end_matches(" differ");
            if let Some((old, new)) = rest.split_once(" and ") {
                self.old_path = clean_path(old, "a/");
                self.new_path = clean_path(new, "b/");
            }
        } else if line.starts_with("GIT binary patch") {
            self.is_binary = true;
        } else if line.starts_with("new file mode") {
            self.created = true;
        } else if line.starts_with("deleted file mode") {
            self.deleted = true;
        }
    }

    fn push(&mut self, line: &'a str) {
        if !self.in_hunks {
            if line.starts_with("@@") {
                self.in_hunks = true;
            } else {
                // index, mode, similarity and rename lines carry nothing we keep
                self.header(line);
                return;
            }
        }
        self.raw.push(line);
    }

    fn finish(mut self) -> DiffFile {
        if self.created {
            self.old_path.clear();
        }
        if self.deleted {
            self.new_path.clear();
        }

        let hunks = if self.is_binary {
            Vec::new()
        } else {
            parse_hunks(&self.raw)
        };
        let additions = hunks.iter().map(Hunk::additions).sum();
        let deletions = hunks.iter().map(Hunk::deletions).sum();

        DiffFile {
            status: DiffStatus::from_paths(&self.old_path, &self.new_path),
            old_path: self.old_path,
            new_path: self.new_path,
            is_binary: self.is_binary,
            hunks,
            additions,
            deletions,
        }
    }
}

/// Parse a complete unified diff into one record per file.
///
/// Output that does not start with `diff --git` (plain `diff -u`) opens its
/// first file at the `---` line. Anything before the first file is skipped.
pub fn parse_diff(output: &str) -> Vec<DiffFile> {
    let mut files = Vec::new();
    let mut current: Option<FileBuilder> = None;
    let mut skipped = 0usize;

    for line in raw_lines(output) {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                files.push(file.finish());
            }
            current = Some(FileBuilder::from_git_header(rest));
            continue;
        }

        match current.as_mut() {
            Some(file) => file.push(line),
            None if line.starts_with("--- ") => {
                let mut file = FileBuilder::default();
                file.header(line);
                current = Some(file);
            }
            None => {
                if !line.trim().is_empty() {
                    skipped += 1;
                }
            }
        }
    }
    if let Some(file) = current.take() {
        files.push(file.finish());
    }

    if skipped > 0 {
        warn!(skipped, "skipped diff lines outside any file");
    }
    debug!(
        files = files.len(),
        hunks = files.iter().map(|f| f.hunks.len()).sum::<usize>(),
        "parsed diff"
    );
    files
}

/// `a/src/x.rs b/src/x.rs` → (`src/x.rs`, `src/x.rs`). Quoted paths are
/// unquoted; for unquoted paths the split is at the first ` b/`.
fn parse_git_header(rest: &str) -> (String, String) {
    let rest = rest.trim();
    if rest.starts_with('"') {
        let end = quoted_token_end(rest);
        let (old, new) = rest.split_at(end);
        return (clean_path(old, "a/"), clean_path(new.trim_start(), "b/"));
    }
    match rest.split_once(" b/") {
        Some((old, new)) => (clean_path(old, "a/"), clean_path(new, "")),
        None => (String::new(), String::new()),
    }
}

/// Byte index just past the closing quote of a C-quoted token.
fn quoted_token_end(s: &str) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    s.len()
}

/// Normalize a header path: unquote, map `/dev/null` to empty and strip the
/// side prefix (`a/` or `b/`).
fn clean_path(raw: &str, prefix: &str) -> String {
    let raw = raw.trim();
    // git appends a tab after paths containing spaces; plain diff puts a timestamp there
    let raw = if raw.starts_with('"') {
        raw
    } else {
        raw.split('\t').next().unwrap_or_default()
    };
    let path = unquote_path(raw);
    if path == DEV_NULL {
        return String::new();
    }
    match path.strip_prefix(prefix) {
        Some(stripped) if !prefix.is_empty() => stripped.to_string(),
        _ => path,
    }
}

/// Mark files as renamed using the rename entries of a status parse.
///
/// The diff itself never reports renames. A status `R` entry turns the diff
/// record for its new path into a rename and drops the separate deletion
/// record of the old path, if the diff was produced without rename detection.
pub fn apply_status_renames(files: &mut Vec<DiffFile>, status: &GitStatus) {
    for change in &status.changed_files {
        let Some(old) = change.old_path.as_deref() else {
            continue;
        };
        if change.index_status != StatusCode::Renamed && change.worktree_status != StatusCode::Renamed {
            continue;
        }
        let Some(file) = files.iter_mut().find(|f| f.new_path == change.path) else {
            continue;
        };
        file.old_path = old.to_string();
        file.status = DiffStatus::Renamed;
        files.retain(|f| !(f.status == DiffStatus::Deleted && f.old_path == old));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hunk level
// ─────────────────────────────────────────────────────────────────────────────

struct HunkCursor {
    hunk: Hunk,
    old_line: u32,
    new_line: u32,
    old_remaining: u32,
    new_remaining: u32,
}

impl HunkCursor {
    fn open(header: &str) -> Option<Self> {
        let caps = HUNK_HEADER_RE.captures(header)?;
        let num = |i: usize, default: u32| {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(default)
        };
        let hunk = Hunk {
            old_start: num(1, 0),
            old_count: num(2, 1),
            new_start: num(3, 0),
            new_count: num(4, 1),
            header: caps.get(5).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            lines: Vec::new(),
        };
        Some(Self {
            old_line: hunk.old_start,
            new_line: hunk.new_start,
            old_remaining: hunk.old_count,
            new_remaining: hunk.new_count,
            hunk,
        })
    }

    fn is_complete(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }

    fn push(&mut self, line: &str) {
        if self.is_complete() || line.starts_with('\\') {
            return;
        }
        let (kind, content) = match line.chars().next() {
            Some('+') => (HunkLineKind::Addition, &line[1..]),
            Some('-') => (HunkLineKind::Deletion, &line[1..]),
            Some(' ') => (HunkLineKind::Context, &line[1..]),
            // context line whose single space was stripped by an editor
            None => (HunkLineKind::Context, ""),
            Some('\r') if line.len() == 1 => (HunkLineKind::Context, line),
            Some(_) => return,
        };

        let old_line_number = (kind != HunkLineKind::Addition).then(|| {
            let n = self.old_line;
            self.old_line = self.old_line.saturating_add(1);
            self.old_remaining = self.old_remaining.saturating_sub(1);
            n
        });
        let new_line_number = (kind != HunkLineKind::Deletion).then(|| {
            let n = self.new_line;
            self.new_line = self.new_line.saturating_add(1);
            self.new_remaining = self.new_remaining.saturating_sub(1);
            n
        });

        self.hunk.lines.push(HunkLine {
            kind,
            content: content.to_string(),
            old_line_number,
            new_line_number,
        });
    }
}

/// Parse the hunk section of one file.
///
/// Every `@@` line closes the open hunk; a header that does not match the
/// unified format leaves no hunk open until the next valid one. Lines past
/// the declared counts and `\ No newline at end of file` markers are skipped.
pub fn parse_hunks(lines: &[&str]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<HunkCursor> = None;

    for line in lines {
        if line.starts_with("@@") {
            if let Some(cursor) = current.take() {
                hunks.push(cursor.hunk);
            }
            current = HunkCursor::open(line);
            if current.is_none() {
                warn!(header = %line, "unrecognized hunk header");
            }
            continue;
        }
        if let Some(cursor) = current.as_mut() {
            cursor.push(line);
        }
    }
    if let Some(cursor) = current {
        hunks.push(cursor.hunk);
    }
    hunks
}
