//! `git blame --porcelain` parsing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-f]{40}|[0-9a-f]{64}) (\d+) (\d+)(?: (\d+))?$").expect("blame header regex")
});

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const MONTH: i64 = 2_592_000;
const YEAR: i64 = 31_536_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    pub commit_sha: String,
    pub author: String,
    /// Relative author time, e.g. `3 days ago`.
    pub date: String,
    /// Line number in the final (current) file.
    pub line_number: u32,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlameOptions {
    /// Reference time for the relative dates; the current time when unset.
    pub now: Option<i64>,
}

#[derive(Default, Clone)]
struct CommitMeta {
    author: String,
    time: i64,
}

/// Parse porcelain blame output into one record per source line.
///
/// Git only prints the metadata block the first time a commit appears, so
/// metadata is remembered per sha and reused for its later groups.
pub fn parse_blame(output: &str, options: BlameOptions) -> Vec<BlameLine> {
    let now = options.now.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let mut metadata: HashMap<String, CommitMeta> = HashMap::new();
    let mut lines = Vec::new();

    let mut sha = String::new();
    let mut line_number = 0u32;

    for line in output.lines() {
        if let Some(content) = line.strip_prefix('\t') {
            let meta = metadata.get(&sha).cloned().unwrap_or_default();
            lines.push(BlameLine {
                commit_sha: sha.clone(),
                author: meta.author,
                date: relative_time(meta.time, now),
                line_number,
                content: content.to_string(),
            });
        } else if let Some(caps) = HEADER_RE.captures(line) {
            sha = caps[1].to_string();
            line_number = caps[3].parse().unwrap_or(0);
            metadata.entry(sha.clone()).or_default();
        } else if let Some(author) = line.strip_prefix("author ") {
            if let Some(meta) = metadata.get_mut(&sha) {
                meta.author = author.to_string();
            }
        } else if let Some(time) = line.strip_prefix("author-time ") {
            if let Some(meta) = metadata.get_mut(&sha) {
                meta.time = time.trim().parse().unwrap_or(0);
            }
        }
    }

    debug!(lines = lines.len(), commits = metadata.len(), "parsed blame");
    lines
}

/// Approximate relative time: months are 30 days and years 365.
pub fn relative_time(timestamp: i64, now: i64) -> String {
    let diff = now.saturating_sub(timestamp);
    let (value, unit) = match diff {
        d if d < MINUTE => return "just now".to_string(),
        d if d < HOUR => (d / MINUTE, "min"),
        d if d < DAY => (d / HOUR, "hour"),
        d if d < MONTH => (d / DAY, "day"),
        d if d < YEAR => (d / MONTH, "month"),
        d => (d / YEAR, "year"),
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}
