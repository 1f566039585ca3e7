//! `git status --porcelain=v2 --branch` parser.
//!
//! Each line is interpreted on its own. Header lines (`# branch.*`) fill in
//! the branch fields, entry lines (`1`, `2`, `u`, `?`, `!`) become
//! [`ChangedFile`]s in output order, and anything else is ignored so newer
//! git versions can add line types without breaking the parser.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::{split_fields, unquote_path};

/// Value of `# branch.head` when HEAD is detached.
pub const DETACHED_HEAD: &str = "(detached)";

/// One status letter of an `XY` pair.
///
/// Git may print letters outside this alphabet (`T` for a type change);
/// those are folded into [`StatusCode::Modified`] so every record stays
/// inside the fixed alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    #[serde(rename = ".")]
    Unmodified,
    #[serde(rename = "M")]
    Modified,
    #[serde(rename = "A")]
    Added,
    #[serde(rename = "D")]
    Deleted,
    #[serde(rename = "R")]
    Renamed,
    #[serde(rename = "C")]
    Copied,
    #[serde(rename = "U")]
    Unmerged,
    #[serde(rename = "?")]
    Untracked,
    #[serde(rename = "!")]
    Ignored,
}

impl StatusCode {
    pub fn from_char(c: char) -> Self {
        match c {
            'M' | 'T' => Self::Modified,
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            'U' => Self::Unmerged,
            '?' => Self::Untracked,
            '!' => Self::Ignored,
            _ => Self::Unmodified,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Unmodified => '.',
            Self::Modified => 'M',
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::Unmerged => 'U',
            Self::Untracked => '?',
            Self::Ignored => '!',
        }
    }
}

/// A path reported by `git status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub path: String,
    /// Rename/copy source.
    pub old_path: Option<String>,
    pub index_status: StatusCode,
    pub worktree_status: StatusCode,
}

impl ChangedFile {
    pub fn new(
        path: impl Into<String>,
        old_path: Option<String>,
        index_status: StatusCode,
        worktree_status: StatusCode,
    ) -> Self {
        Self {
            path: path.into(),
            old_path,
            index_status,
            worktree_status,
        }
    }

    /// Has changes recorded in the index.
    pub fn is_staged(&self) -> bool {
        !matches!(
            self.index_status,
            StatusCode::Unmodified | StatusCode::Untracked | StatusCode::Ignored
        )
    }

    /// Has changes in the working tree that are not yet staged.
    pub fn is_unstaged(&self) -> bool {
        !matches!(
            self.worktree_status,
            StatusCode::Unmodified | StatusCode::Untracked
        )
    }

    pub fn is_untracked(&self) -> bool {
        self.index_status == StatusCode::Untracked && self.worktree_status == StatusCode::Untracked
    }

    pub fn is_unmerged(&self) -> bool {
        self.index_status == StatusCode::Unmerged || self.worktree_status == StatusCode::Unmerged
    }

    pub fn is_ignored(&self) -> bool {
        self.index_status == StatusCode::Ignored && self.worktree_status == StatusCode::Ignored
    }

    /// Human label for list views. The index letter wins unless it is `.`.
    pub fn status_label(&self) -> &'static str {
        if self.is_untracked() {
            return "untracked";
        }
        if self.is_unmerged() {
            return "unmerged";
        }
        let status = if self.index_status != StatusCode::Unmodified {
            self.index_status
        } else {
            self.worktree_status
        };
        match status {
            StatusCode::Modified => "modified",
            StatusCode::Added => "added",
            StatusCode::Deleted => "deleted",
            StatusCode::Renamed => "renamed",
            StatusCode::Copied => "copied",
            _ => "unknown",
        }
    }
}

/// Commits ahead of / behind the upstream branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

impl AheadBehind {
    pub fn new(ahead: u32, behind: u32) -> Self {
        Self { ahead, behind }
    }

    pub fn is_up_to_date(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }

    pub fn has_diverged(&self) -> bool {
        self.ahead > 0 && self.behind > 0
    }
}

/// Parsed `git status --porcelain=v2 --branch` output.
///
/// An empty `branch` means the header was missing: callers treat it as an
/// unknown branch rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitStatus {
    pub branch: String,
    pub upstream: Option<String>,
    pub ahead_behind: AheadBehind,
    pub changed_files: Vec<ChangedFile>,
}

impl GitStatus {
    pub fn is_detached(&self) -> bool {
        self.branch == DETACHED_HEAD
    }

    pub fn is_clean(&self) -> bool {
        self.changed_files.iter().all(ChangedFile::is_ignored)
    }

    pub fn staged(&self) -> impl Iterator<Item = &ChangedFile> {
        self.changed_files.iter().filter(|f| f.is_staged() && !f.is_unmerged())
    }

    pub fn unstaged(&self) -> impl Iterator<Item = &ChangedFile> {
        self.changed_files
            .iter()
            .filter(|f| f.is_unstaged() && !f.is_unmerged() && !f.is_ignored())
    }

    pub fn untracked(&self) -> impl Iterator<Item = &ChangedFile> {
        self.changed_files.iter().filter(|f| f.is_untracked())
    }

    pub fn conflicted(&self) -> impl Iterator<Item = &ChangedFile> {
        self.changed_files.iter().filter(|f| f.is_unmerged())
    }

    /// Look up the entry for `path`.
    pub fn file(&self, path: &str) -> Option<&ChangedFile> {
        self.changed_files.iter().find(|f| f.path == path)
    }
}

/// Parse the full stdout of `git status --porcelain=v2 --branch`.
pub fn parse_status(output: &str) -> GitStatus {
    let mut status = GitStatus::default();

    for line in output.lines() {
        if let Some(head) = line.strip_prefix("# branch.head ") {
            status.branch = head.trim().to_string();
        } else if let Some(upstream) = line.strip_prefix("# branch.upstream ") {
            status.upstream = Some(upstream.trim().to_string());
        } else if let Some(ab) = line.strip_prefix("# branch.ab ") {
            status.ahead_behind = parse_ahead_behind(ab);
        } else if let Some(file) = parse_entry(line) {
            status.changed_files.push(file);
        }
    }

    debug!(
        branch = %status.branch,
        files = status.changed_files.len(),
        "parsed status"
    );
    status
}

/// `+3 -2` → ahead 3, behind 2. Unparseable counts read as zero.
fn parse_ahead_behind(value: &str) -> AheadBehind {
    let mut parts = value.split_whitespace();
    let ahead = parts
        .next()
        .map(|p| p.trim_start_matches('+'))
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    let behind = parts
        .next()
        .map(|p| p.trim_start_matches('-'))
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    AheadBehind::new(ahead, behind)
}

/// Parse one change entry line; `None` for headers and unknown prefixes.
pub(crate) fn parse_entry(line: &str) -> Option<ChangedFile> {
    if line.starts_with("1 ") {
        // 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
        let parts = split_fields(line, 9);
        let (x, y) = xy(parts.get(1).copied(), StatusCode::Unmodified);
        Some(ChangedFile::new(unquote_path(field(&parts, 8)), None, x, y))
    } else if line.starts_with("2 ") {
        // 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path><TAB><origPath>
        let parts = split_fields(line, 10);
        let (x, y) = xy(parts.get(1).copied(), StatusCode::Unmodified);
        let paths = field(&parts, 9);
        let (path, old_path) = match paths.split_once('\t') {
            Some((path, orig)) => (unquote_path(path), Some(unquote_path(orig))),
            None => (unquote_path(paths), None),
        };
        Some(ChangedFile::new(path, old_path, x, y))
    } else if line.starts_with("u ") {
        // u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
        let parts = split_fields(line, 11);
        let (x, y) = xy(parts.get(1).copied(), StatusCode::Unmerged);
        Some(ChangedFile::new(unquote_path(field(&parts, 10)), None, x, y))
    } else if let Some(path) = line.strip_prefix("? ") {
        Some(ChangedFile::new(
            unquote_path(path.trim()),
            None,
            StatusCode::Untracked,
            StatusCode::Untracked,
        ))
    } else {
        line.strip_prefix("! ").map(|path| {
            ChangedFile::new(unquote_path(path.trim()), None, StatusCode::Ignored, StatusCode::Ignored)
        })
    }
}

fn field<'a>(parts: &[&'a str], index: usize) -> &'a str {
    parts.get(index).copied().unwrap_or_default()
}

fn xy(field: Option<&str>, default: StatusCode) -> (StatusCode, StatusCode) {
    let mut chars = field.unwrap_or_default().chars();
    let x = chars.next().map(StatusCode::from_char).unwrap_or(default);
    let y = chars.next().map(StatusCode::from_char).unwrap_or(default);
    (x, y)
}
