//! Patches for staging or unstaging a single hunk or a selection of lines.
//!
//! The output is fed to `git apply --cached` (hunks) or
//! `git apply --cached --unidiff-zero` (lines), with `--reverse` when
//! unstaging.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::diff::{DEV_NULL, DiffFile, Hunk, HunkLineKind};

/// Which way a line patch will be applied to the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchDirection {
    /// Applied forward to an index that holds the old side.
    #[default]
    Stage,
    /// Applied with `--reverse` to an index that holds the new side.
    Unstage,
}

fn file_header(file: &DiffFile) -> String {
    let path = file.display_path();
    let old = if file.old_path.is_empty() {
        DEV_NULL.to_string()
    } else {
        format!("a/{}", file.old_path)
    };
    let new = if file.new_path.is_empty() {
        DEV_NULL.to_string()
    } else {
        format!("b/{}", file.new_path)
    };
    let git_old = if file.old_path.is_empty() { path } else { &file.old_path };
    let git_new = if file.new_path.is_empty() { path } else { &file.new_path };
    format!("diff --git a/{git_old} b/{git_new}\n--- {old}\n+++ {new}\n")
}

fn hunk_header(out: &mut String, hunk: &Hunk, old_count: u32, new_count: u32) {
    let _ = write!(
        out,
        "@@ -{},{} +{},{} @@",
        hunk.old_start, old_count, hunk.new_start, new_count
    );
    if !hunk.header.is_empty() {
        out.push(' ');
        out.push_str(&hunk.header);
    }
    out.push('\n');
}

/// A patch holding exactly one hunk of `file`.
pub fn hunk_patch(file: &DiffFile, hunk: &Hunk) -> String {
    let mut out = file_header(file);
    hunk_header(&mut out, hunk, hunk.old_count, hunk.new_count);
    for line in &hunk.lines {
        out.push(line.kind.marker());
        out.push_str(&line.content);
        out.push('\n');
    }
    out
}

/// A patch applying only the lines of `hunk` whose indices are in `selected`.
///
/// Unselected changes are rewritten to match what the index already holds:
/// when staging, unselected deletions stay as context and unselected
/// additions are left out; when unstaging it is the other way round.
/// Counts in the hunk header are recomputed. Returns `None` if the selection
/// contains no addition or deletion.
pub fn line_patch(file: &DiffFile, hunk: &Hunk, selected: &[usize], direction: PatchDirection) -> Option<String> {
    let mut body = String::new();
    let mut old_count = 0u32;
    let mut new_count = 0u32;
    let mut changes = 0usize;

    for (index, line) in hunk.lines.iter().enumerate() {
        let kind = match (line.kind, selected.contains(&index), direction) {
            (HunkLineKind::Context, _, _) => Some(HunkLineKind::Context),
            (kind, true, _) => {
                changes += 1;
                Some(kind)
            }
            (HunkLineKind::Deletion, false, PatchDirection::Stage) => Some(HunkLineKind::Context),
            (HunkLineKind::Addition, false, PatchDirection::Unstage) => Some(HunkLineKind::Context),
            (_, false, _) => None,
        };
        let Some(kind) = kind else { continue };

        if kind != HunkLineKind::Addition {
            old_count += 1;
        }
        if kind != HunkLineKind::Deletion {
            new_count += 1;
        }
        body.push(kind.marker());
        body.push_str(&line.content);
        body.push('\n');
    }

    if changes == 0 {
        return None;
    }

    let mut out = file_header(file);
    hunk_header(&mut out, hunk, old_count, new_count);
    out.push_str(&body);
    Some(out)
}
