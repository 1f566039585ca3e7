//! Line parsers for `branch -a -vv`, `remote -v`, `tag -l --format=...` and
//! `stash list`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::log::{FIELD_DELIMITER, non_empty_lines};
use crate::status::AheadBehind;
use crate::text::split_fields;

/// Namespace prefix of remote-tracking branches in `branch -a` output.
pub const REMOTES_PREFIX: &str = "remotes/";

static TRACKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]:]+)(?::\s*([^\]]*))?\]").expect("tracking regex"));
static AHEAD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ahead (\d+)").expect("ahead regex"));
static BEHIND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"behind (\d+)").expect("behind regex"));

static STASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^stash@\{(\d+)\}:\s+(.+)$").expect("stash regex"));
static STASH_WITH_SHA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:WIP on|On)\s+(.+?):\s+([0-9a-f]{7,40})\s+(.+)$").expect("stash sha regex")
});
static STASH_PLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:WIP on|On)\s+(.+?):\s+(.+)$").expect("stash plain regex"));

// ─────────────────────────────────────────────────────────────────────────────
// Branches
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub is_remote: bool,
    pub is_current: bool,
    pub upstream: Option<String>,
    /// Present when the branch tracks an upstream that still exists.
    pub ahead_behind: Option<AheadBehind>,
    pub last_commit_sha: Option<String>,
}

impl Branch {
    /// `remotes/origin/main` → `origin/main`; local names are unchanged.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix(REMOTES_PREFIX).unwrap_or(&self.name)
    }
}

/// Parse one line of `git branch -a [-v[v]]`.
pub fn parse_branch_line(line: &str) -> Branch {
    let trimmed = line.trim_start();
    let is_current = trimmed.starts_with("* ");
    let rest = trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("+ "))
        .unwrap_or(trimmed)
        .trim();

    // `(HEAD detached at a1b2c3d)` contains spaces, so it is cut out first
    let (name, rest) = match rest.strip_prefix('(').and_then(|r| r.split_once(')')) {
        Some((inner, after)) => (format!("({inner})"), after),
        None => {
            let fields = split_fields(rest, 2);
            let name = fields.first().copied().unwrap_or_default().to_string();
            (name, fields.get(1).copied().unwrap_or_default())
        }
    };

    let fields = split_fields(rest, 2);
    let sha_field = fields.first().copied();
    let mut branch = Branch {
        is_remote: name.starts_with(REMOTES_PREFIX),
        is_current,
        name,
        ..Branch::default()
    };

    match sha_field {
        // `remotes/origin/HEAD -> origin/main`
        Some("->") | None => {}
        Some(sha) => {
            branch.last_commit_sha = Some(sha.to_string());
            if let Some((upstream, track)) = fields.get(1).copied().and_then(tracking) {
                branch.upstream = Some(upstream.to_string());
                if track != "gone" {
                    branch.ahead_behind = Some(AheadBehind::new(count(&AHEAD_RE, track), count(&BEHIND_RE, track)));
                }
            }
        }
    }
    branch
}

/// Upstream and tracking state from the `[...]` that opens a verbose branch
/// tail. A subject may start with brackets too, so a bare `[name]` only
/// counts as an upstream when it names a remote branch (`remote/branch`);
/// a local upstream is recognised only with ahead, behind or gone state.
fn tracking(tail: &str) -> Option<(&str, &str)> {
    let caps = TRACKING_RE.captures(tail)?;
    let upstream = caps.get(1)?.as_str();
    let track = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let has_state = track == "gone" || AHEAD_RE.is_match(track) || BEHIND_RE.is_match(track);
    (has_state || (track.is_empty() && upstream.contains('/'))).then_some((upstream, track))
}

fn count(re: &Regex, track: &str) -> u32 {
    re.captures(track)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

pub fn parse_branches(output: &str) -> Vec<Branch> {
    let branches: Vec<Branch> = non_empty_lines(output).map(parse_branch_line).collect();
    debug!(branches = branches.len(), "parsed branches");
    branches
}

// ─────────────────────────────────────────────────────────────────────────────
// Remotes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remote {
    pub name: String,
    pub fetch_url: String,
    pub push_url: String,
}

/// Parse `git remote -v`, merging the fetch and push rows of each remote.
/// Remotes keep the order in which they first appear.
pub fn parse_remotes(output: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();

    for line in non_empty_lines(output) {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let url = parts.next().unwrap_or_default();
        let kind = parts.next().unwrap_or_default().trim_matches(|c| c == '(' || c == ')');

        let index = match remotes.iter().position(|r| r.name == name) {
            Some(index) => index,
            None => {
                remotes.push(Remote {
                    name: name.to_string(),
                    ..Remote::default()
                });
                remotes.len() - 1
            }
        };
        let remote = &mut remotes[index];
        match kind {
            "fetch" => remote.fetch_url = url.to_string(),
            "push" => remote.push_url = url.to_string(),
            _ => {}
        }
    }
    remotes
}

// ─────────────────────────────────────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    pub sha: String,
    pub date: String,
    pub message: String,
}

/// `%(refname:short)|||%(objectname:short)|||%(creatordate:relative)|||%(contents:subject)`
pub fn parse_tags(output: &str) -> Vec<Tag> {
    non_empty_lines(output)
        .map(|line| {
            let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
            let part = |i: usize| parts.get(i).copied().unwrap_or_default().to_string();
            Tag {
                name: part(0),
                sha: part(1),
                date: part(2),
                message: part(3),
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Stashes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stash {
    /// Position in the stash stack, 0 = most recent.
    pub index: u32,
    pub message: String,
    pub branch: String,
    pub sha: Option<String>,
}

impl Stash {
    /// The ref git accepts for this entry, e.g. `stash@{2}`.
    pub fn reference(&self) -> String {
        format!("stash@{{{}}}", self.index)
    }
}

/// Parse one `git stash list` line.
///
/// Unlike the other parsers this one fails on input it does not recognize:
/// a line without the `stash@{n}:` prefix means git changed its format.
pub fn parse_stash_line(line: &str) -> ParseResult<Stash> {
    let caps = STASH_RE
        .captures(line.trim_end())
        .ok_or_else(|| ParseError::malformed("stash", line))?;
    let index = caps[1].parse().map_err(|_| ParseError::malformed("stash", line))?;
    let rest = &caps[2];

    let stash = if let Some(detail) = STASH_WITH_SHA_RE.captures(rest) {
        Stash {
            index,
            branch: detail[1].to_string(),
            sha: Some(detail[2].to_string()),
            message: detail[3].to_string(),
        }
    } else if let Some(detail) = STASH_PLAIN_RE.captures(rest) {
        Stash {
            index,
            branch: detail[1].to_string(),
            sha: None,
            message: detail[2].to_string(),
        }
    } else {
        Stash {
            index,
            message: rest.to_string(),
            ..Stash::default()
        }
    };
    Ok(stash)
}

/// Parse a whole `git stash list`; the first malformed line aborts.
pub fn parse_stashes(output: &str) -> ParseResult<Vec<Stash>> {
    non_empty_lines(output).map(parse_stash_line).collect()
}
