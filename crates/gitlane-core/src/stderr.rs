//! Translation of git error output into user-facing categories.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    NotARepository,
    PathspecNotFound,
    Conflict,
    PushRejected,
    AuthFailure,
    GitNotInstalled,
    CorruptedObject,
    DirtyTree,
    Other,
}

impl ErrorCategory {
    /// Message to show for this category. `Other` has none of its own.
    pub fn message(self) -> Option<&'static str> {
        Some(match self {
            Self::NotARepository => "This folder is not a git repository",
            Self::PathspecNotFound => "File not found in repository",
            Self::Conflict => "Merge conflict detected. Resolve conflicts in external editor.",
            Self::PushRejected => "Push rejected. Pull remote changes first.",
            Self::AuthFailure => "Authentication failed. Check your credentials.",
            Self::GitNotInstalled => "Git is not installed. Please install git.",
            Self::CorruptedObject => "Repository may be corrupted. Try running 'git fsck'.",
            Self::DirtyTree => "Local changes would be overwritten by checkout. Commit or stash them first.",
            Self::Other => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitError {
    pub category: ErrorCategory,
    /// User-facing text; the raw stderr for [`ErrorCategory::Other`].
    pub message: String,
    pub raw: String,
}

/// Classify git's stderr. Returns `None` for empty (or blank) output.
///
/// Patterns are checked in order and the first match wins.
pub fn classify_stderr(stderr: &str) -> Option<GitError> {
    let raw = stderr.trim();
    if raw.is_empty() {
        return None;
    }
    let has = |needle: &str| raw.contains(needle);

    let category = if has("fatal: not a git repository") {
        ErrorCategory::NotARepository
    } else if has("error: pathspec") && has("did not match") {
        ErrorCategory::PathspecNotFound
    } else if has("CONFLICT") {
        ErrorCategory::Conflict
    } else if has("rejected") {
        ErrorCategory::PushRejected
    } else if has("Authentication failed") || has("could not read Username") {
        ErrorCategory::AuthFailure
    } else if has("git: command not found") || has("git: No such file") {
        ErrorCategory::GitNotInstalled
    } else if has("fatal: bad object") || has("fatal: loose object") {
        ErrorCategory::CorruptedObject
    } else if has("would be overwritten by checkout") {
        ErrorCategory::DirtyTree
    } else {
        ErrorCategory::Other
    };

    Some(GitError {
        category,
        message: category.message().map_or_else(|| raw.to_string(), str::to_string),
        raw: raw.to_string(),
    })
}
