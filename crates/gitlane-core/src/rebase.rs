//! Interactive rebase plans.
//!
//! The plan starts as the `log --oneline <onto>..HEAD` list turned
//! oldest-first with every action set to `pick`; the edited plan is rendered
//! back into a todo list that `GIT_SEQUENCE_EDITOR` copies into place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::log::{non_empty_lines, parse_oneline};
use crate::text::short_sha;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebaseAction {
    #[default]
    Pick,
    Reword,
    Edit,
    Squash,
    Fixup,
    Drop,
}

impl RebaseAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pick => "pick",
            Self::Reword => "reword",
            Self::Edit => "edit",
            Self::Squash => "squash",
            Self::Fixup => "fixup",
            Self::Drop => "drop",
        }
    }
}

impl fmt::Display for RebaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebaseEntry {
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    #[serde(default)]
    pub action: RebaseAction,
}

/// Parse newest-first `--oneline` output into an oldest-first plan.
pub fn parse_rebase_commits(output: &str) -> Vec<RebaseEntry> {
    let mut entries: Vec<RebaseEntry> = non_empty_lines(output)
        .map(|line| {
            let commit = parse_oneline(line);
            RebaseEntry {
                short_sha: short_sha(&commit.sha),
                sha: commit.sha,
                message: commit.message,
                action: RebaseAction::Pick,
            }
        })
        .collect();
    entries.reverse();
    entries
}

/// Render a plan as todo lines, `<action> <sha>` each.
pub fn render_todo(entries: &[RebaseEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} {}\n", e.action, e.sha))
        .collect()
}
