//! Helpers for the merge-conflict resolution view.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::log::non_empty_lines;
use crate::text::{split_fields, unquote_path};

/// Status reported when git gives none: both sides modified.
pub const DEFAULT_CONFLICT_STATUS: &str = "UU";

static MERGE_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Merge branch '([^']+)'").expect("merge branch regex"));

/// An unmerged path with its two-letter status (`UU`, `AA`, `DU`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    pub path: String,
    pub status: String,
}

/// A conflicted file with the content of each index stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictFile {
    pub path: String,
    pub status: String,
    /// Stage 1; empty when there is no common ancestor.
    pub base_content: String,
    /// Stage 2.
    pub ours_content: String,
    /// Stage 3.
    pub theirs_content: String,
    pub is_binary: bool,
}

impl ConflictFile {
    pub fn new(
        path: impl Into<String>,
        status: impl Into<String>,
        base: impl Into<String>,
        ours: impl Into<String>,
        theirs: impl Into<String>,
        is_binary: bool,
    ) -> Self {
        Self {
            path: path.into(),
            status: status.into(),
            base_content: base.into(),
            ours_content: ours.into(),
            theirs_content: theirs.into(),
            is_binary,
        }
    }
}

/// Unmerged entries (`u` lines) of `git status --porcelain=v2` output.
pub fn conflicted_entries(status_output: &str) -> Vec<ConflictEntry> {
    non_empty_lines(status_output)
        .filter(|line| line.starts_with("u "))
        .filter_map(|line| {
            let fields = split_fields(line, 11);
            let path = fields.get(10).copied().unwrap_or_default();
            if path.is_empty() {
                return None;
            }
            Some(ConflictEntry {
                path: unquote_path(path),
                status: fields.get(1).copied().unwrap_or(DEFAULT_CONFLICT_STATUS).to_string(),
            })
        })
        .collect()
}


/// Whether `git diff --numstat` output reports a binary file (`-` counts).
pub fn numstat_is_binary(output: &str) -> bool {
    let output = output.trim_start();
    output.starts_with("-\t-\t") || output.starts_with("- -")
}

/// Branch named in a `MERGE_MSG` such as `Merge branch 'feature/x'`.
pub fn merge_head_branch(merge_msg: &str) -> Option<String> {
    MERGE_BRANCH_RE.captures(merge_msg).map(|caps| caps[1].to_string())
}
