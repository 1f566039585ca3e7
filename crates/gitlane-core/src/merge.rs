//! Outcome of merge, rebase, cherry-pick and revert runs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static CONFLICT_PATH_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // CONFLICT (content): Merge conflict in src/app.rs
        Regex::new(r"CONFLICT.*?Merge conflict in (.+)$").expect("content conflict regex"),
        // CONFLICT (modify/delete): src/app.rs deleted in HEAD and modified in feature.
        Regex::new(r"CONFLICT \([^)]*\): (.+?) deleted in ").expect("modify/delete conflict regex"),
        Regex::new(r"CONFLICT.*in (.+)$").expect("conflict regex"),
    ]
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    /// The command exited with status 0.
    pub success: bool,
    pub has_conflicts: bool,
    /// One entry per conflict line, in output order.
    pub conflict_files: Vec<String>,
    pub message: String,
}

/// Interpret combined stdout/stderr and exit code of a merge-like command.
///
/// Success and conflicts are judged independently: git can exit non-zero
/// without conflicts, and conflict text is reported whatever the code.
pub fn parse_merge_result(output: &str, exit_code: i32) -> MergeResult {
    let has_conflicts = output.contains("CONFLICT") || output.contains("Automatic merge failed");
    let conflict_files = if has_conflicts {
        output.lines().filter_map(conflict_path).collect()
    } else {
        Vec::new()
    };

    debug!(exit_code, has_conflicts, conflicts = conflict_files.len(), "interpreted merge output");
    MergeResult {
        success: exit_code == 0,
        has_conflicts,
        conflict_files,
        message: output.trim().to_string(),
    }
}

fn conflict_path(line: &str) -> Option<String> {
    CONFLICT_PATH_RES
        .iter()
        .find_map(|re| re.captures(line))
        .map(|caps| caps[1].trim().to_string())
}
