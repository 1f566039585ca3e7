//! `git log` / `git show` parsers.
//!
//! Three input shapes are supported, selected by the caller through
//! [`LogMode`]:
//!
//! - `log --oneline`: `<sha> <subject>` per line.
//! - `log --format='%H|||%an|||%ae|||%ar|||%s|||%D'`: `|||`-delimited fields.
//! - the default medium format of `git show` / `git log [-p]`: multi-line
//!   blocks opened by `commit <sha>`.
//!
//! All of them are best-effort: missing fields become empty strings or empty
//! lists and nothing here returns an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::text::{short_sha, split_refs};

/// Field separator of the custom `--format` strings.
pub const FIELD_DELIMITER: &str = "|||";

static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+<(.+?)>$").expect("author regex"));

/// A commit as shown in history views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    pub author: String,
    pub email: String,
    /// Free text exactly as git printed it (`2 days ago`, `Thu Feb 12 ...`).
    pub date: String,
    pub refs: Vec<String>,
}

impl Commit {
    fn with_sha(sha: impl Into<String>) -> Self {
        let sha = sha.into();
        Self {
            short_sha: short_sha(&sha),
            sha,
            ..Self::default()
        }
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Which `git log` output shape is being parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    Oneline,
    Detailed,
    Verbose,
}

/// Parse a whole log output in the given mode. Blank lines are skipped.
pub fn parse_log(output: &str, mode: LogMode) -> Vec<Commit> {
    let commits: Vec<Commit> = match mode {
        LogMode::Oneline => non_empty_lines(output).map(parse_oneline).collect(),
        LogMode::Detailed => non_empty_lines(output).map(parse_detailed_line).collect(),
        LogMode::Verbose => parse_verbose_log(output),
    };
    debug!(?mode, commits = commits.len(), "parsed log");
    commits
}

/// `a1b2c3d feat: add thing` → sha + message.
pub fn parse_oneline(line: &str) -> Commit {
    let line = line.trim_end();
    let (sha, message) = line.split_once(' ').unwrap_or((line, ""));
    Commit {
        message: message.to_string(),
        ..Commit::with_sha(sha)
    }
}

/// `%H|||%an|||%ae|||%ar|||%s|||%D` → commit with author, date and refs.
pub fn parse_detailed_line(line: &str) -> Commit {
    let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if parts.len() < 5 {
        warn!(fields = parts.len(), "detailed log line is missing fields");
    }
    let part = |i: usize| parts.get(i).copied().unwrap_or_default();

    Commit {
        author: part(1).to_string(),
        email: part(2).to_string(),
        date: part(3).to_string(),
        message: part(4).to_string(),
        refs: split_refs(part(5)),
        ..Commit::with_sha(part(0).trim())
    }
}

/// Parse a single `git show`-style block.
///
/// Parsing ends at the first unindented, non-header line once the sha is
/// known: that is where the diff (or the next commit) begins.
pub fn parse_verbose(output: &str) -> Commit {
    let mut commit = Commit::default();
    let mut message: Vec<&str> = Vec::new();

    for line in output.lines() {
        if commit.sha.is_empty() {
            if let Some(header) = line.strip_prefix("commit ") {
                let (sha, refs) = parse_commit_header(header);
                commit = Commit {
                    refs,
                    ..Commit::with_sha(sha)
                };
            }
            continue;
        }

        if let Some(author) = line.strip_prefix("Author:") {
            let author = author.trim();
            match AUTHOR_RE.captures(author) {
                Some(caps) => {
                    commit.author = caps[1].to_string();
                    commit.email = caps[2].to_string();
                }
                None => commit.author = author.to_string(),
            }
        } else if let Some(date) = line.strip_prefix("Date:") {
            commit.date = date.trim().to_string();
        } else if line.starts_with("Merge:") {
            // Parent abbreviations of a merge commit.
        } else if let Some(body) = line.strip_prefix("    ") {
            message.push(body.trim_end());
        } else if !line.trim().is_empty() {
            break;
        }
    }

    commit.message = message.join("\n").trim().to_string();
    commit
}

/// Split multi-commit `git log` output into one [`Commit`] per block.
pub fn parse_verbose_log(output: &str) -> Vec<Commit> {
    let mut commits = Vec::new();
    let mut block_start: Option<usize> = None;
    let mut offset = 0;

    for line in output.split_inclusive('\n') {
        if line.starts_with("commit ") {
            if let Some(start) = block_start {
                commits.push(parse_verbose(&output[start..offset]));
            }
            block_start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(start) = block_start {
        commits.push(parse_verbose(&output[start..]));
    }
    commits
}

/// `<sha> (HEAD -> main, origin/main)` → sha and ref list.
fn parse_commit_header(header: &str) -> (String, Vec<String>) {
    let header = header.trim();
    match header.split_once(' ') {
        Some((sha, rest)) => {
            let decoration = rest.trim().trim_start_matches('(').trim_end_matches(')');
            (sha.to_string(), split_refs(decoration))
        }
        None => (header.to_string(), Vec::new()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// One result of `git log --grep` / `git log -S`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub sha: String,
    pub short_sha: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

/// Parse `log --format="%H|%h|%an|%ar|%s"` output. The subject is the
/// remainder after the fourth `|`, so it may contain pipes itself.
pub fn parse_search_results(output: &str) -> Vec<SearchHit> {
    non_empty_lines(output)
        .map(|line| {
            let parts: Vec<&str> = line.splitn(5, '|').collect();
            let part = |i: usize| parts.get(i).copied().unwrap_or_default().to_string();
            SearchHit {
                sha: part(0),
                short_sha: part(1),
                author: part(2),
                date: part(3),
                message: part(4),
            }
        })
        .collect()
}

/// Parse `git ls-files` output: one path per non-empty line.
pub fn parse_file_list(output: &str) -> Vec<String> {
    non_empty_lines(output).map(|l| l.trim().to_string()).collect()
}

pub(crate) fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|l| !l.trim().is_empty())
}
