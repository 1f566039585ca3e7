//! Parse service: turns captured git output into typed records.
//!
//! Every method takes the `{ stdout, stderr?, exitCode? }` of one git
//! invocation plus method-specific options, and returns JSON records.
//! Parsing runs on the blocking pool; a large diff or blame is CPU-bound.

use gitlane_core::{
    BlameOptions, LogMode, ParseError, PatchDirection, RebaseEntry, apply_status_renames,
    build_file_tree, build_graph, classify_stderr, conflicted_entries, hunk_patch, line_patch,
    merge_head_branch, numstat_is_binary, parse_blame, parse_branches, parse_diff,
    parse_file_list, parse_git_version, parse_log, parse_merge_result, parse_rebase_commits,
    parse_remotes, parse_search_results, parse_stashes, parse_status, parse_tags, render_todo,
    version_supported,
};
use gitlane_protocol::{HandlerResult, Methods, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::Service;

/// Stateless service exposing every parser under `parse/*`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseService;

impl ParseService {
    pub fn new() -> Self {
        Self
    }
}

impl Service for ParseService {
    fn namespace(&self) -> &str {
        "parse"
    }

    async fn handle(&self, method: &str, params: Option<Value>) -> HandlerResult {
        debug!(method, "parse request");
        let method = method.to_string();
        tokio::task::spawn_blocking(move || dispatch(&method, params))
            .await
            .map_err(|e| RpcError::internal(format!("Parser task failed: {e}")))?
    }
}

fn dispatch(method: &str, params: Option<Value>) -> HandlerResult {
    match method {
        Methods::PARSE_STATUS => {
            let p: OutputParams = parse_params(params)?;
            to_json(parse_status(&p.stdout))
        }

        Methods::PARSE_CONFLICTS => {
            let p: ConflictParams = parse_params(params)?;
            let files = conflicted_entries(&p.stdout);
            let merge_branch = p.merge_msg.as_deref().and_then(merge_head_branch);
            let binary = p.numstat.as_deref().is_some_and(numstat_is_binary);
            Ok(json!({ "files": files, "mergeBranch": merge_branch, "isBinary": binary }))
        }

        Methods::PARSE_FILE_TREE => {
            let p: OutputParams = parse_params(params)?;
            let status = parse_status(&p.stdout);
            Ok(json!({ "tree": build_file_tree(&status.changed_files).to_entries() }))
        }

        Methods::PARSE_LOG => {
            let p: LogParams = parse_params(params)?;
            Ok(json!({ "commits": parse_log(&p.stdout, p.mode) }))
        }

        Methods::PARSE_GRAPH => {
            let p: OutputParams = parse_params(params)?;
            Ok(json!({ "nodes": build_graph(&p.stdout) }))
        }

        Methods::PARSE_SEARCH => {
            let p: SearchParams = parse_params(params)?;
            if p.files {
                Ok(json!({ "files": parse_file_list(&p.stdout) }))
            } else {
                Ok(json!({ "commits": parse_search_results(&p.stdout) }))
            }
        }

        Methods::PARSE_BLAME => {
            let p: BlameParams = parse_params(params)?;
            Ok(json!({ "lines": parse_blame(&p.stdout, BlameOptions { now: p.now }) }))
        }

        Methods::PARSE_REBASE_PLAN => {
            let p: OutputParams = parse_params(params)?;
            Ok(json!({ "entries": parse_rebase_commits(&p.stdout) }))
        }

        Methods::PARSE_REBASE_TODO => {
            let p: RebaseTodoParams = parse_params(params)?;
            Ok(json!({ "todo": render_todo(&p.entries) }))
        }

        Methods::PARSE_DIFF => {
            let p: DiffParams = parse_params(params)?;
            let mut files = parse_diff(&p.stdout);
            if let Some(status) = p.status.as_deref() {
                apply_status_renames(&mut files, &parse_status(status));
            }
            Ok(json!({ "files": files }))
        }

        Methods::PARSE_HUNK_PATCH => {
            let p: HunkPatchParams = parse_params(params)?;
            let files = parse_diff(&p.stdout);
            let file = files
                .get(p.file)
                .ok_or_else(|| RpcError::invalid_params(format!("No file at index {}", p.file)))?;
            let hunk = file
                .hunks
                .get(p.hunk)
                .ok_or_else(|| RpcError::invalid_params(format!("No hunk at index {}", p.hunk)))?;
            let patch = match p.lines {
                Some(lines) => line_patch(file, hunk, &lines, p.direction),
                None => Some(hunk_patch(file, hunk)),
            };
            Ok(json!({ "patch": patch }))
        }

        Methods::PARSE_BRANCHES => {
            let p: OutputParams = parse_params(params)?;
            Ok(json!({ "branches": parse_branches(&p.stdout) }))
        }

        Methods::PARSE_REMOTES => {
            let p: OutputParams = parse_params(params)?;
            Ok(json!({ "remotes": parse_remotes(&p.stdout) }))
        }

        Methods::PARSE_TAGS => {
            let p: OutputParams = parse_params(params)?;
            Ok(json!({ "tags": parse_tags(&p.stdout) }))
        }

        Methods::PARSE_STASHES => {
            let p: OutputParams = parse_params(params)?;
            let stashes = parse_stashes(&p.stdout).map_err(malformed_input)?;
            Ok(json!({ "stashes": stashes }))
        }

        Methods::PARSE_MERGE => {
            let p: OutputParams = parse_params(params)?;
            let output = match (p.stdout.trim().is_empty(), p.stderr.trim().is_empty()) {
                (_, true) => p.stdout,
                (true, false) => p.stderr,
                (false, false) => format!("{}\n{}", p.stdout.trim_end(), p.stderr),
            };
            to_json(parse_merge_result(&output, p.exit_code))
        }

        Methods::PARSE_ERROR => {
            let p: OutputParams = parse_params(params)?;
            let text = if p.stderr.trim().is_empty() { &p.stdout } else { &p.stderr };
            Ok(json!({ "error": classify_stderr(text) }))
        }

        Methods::PARSE_VERSION => {
            let p: OutputParams = parse_params(params)?;
            let version = parse_git_version(&p.stdout);
            Ok(json!({
                "version": version.map(|(major, minor, patch)| format!("{major}.{minor}.{patch}")),
                "supported": version.is_some_and(version_supported),
            }))
        }

        _ => Err(RpcError::method_not_found(method)),
    }
}

/// Stash-list failures carry the offending line for the caller.
fn malformed_input(err: ParseError) -> RpcError {
    RpcError::invalid_params(err.to_string()).with_data(json!({
        "kind": err.kind(),
        "line": err.line(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter types
// ─────────────────────────────────────────────────────────────────────────────

/// Captured output of one git invocation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputParams {
    stdout: String,
    #[serde(default)]
    stderr: String,
    #[serde(default)]
    exit_code: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogParams {
    stdout: String,
    #[serde(default)]
    mode: LogMode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    stdout: String,
    /// `ls-files` output rather than commit search.
    #[serde(default)]
    files: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlameParams {
    stdout: String,
    now: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffParams {
    stdout: String,
    /// Porcelain v2 status, for rename detection.
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HunkPatchParams {
    stdout: String,
    #[serde(default)]
    file: usize,
    hunk: usize,
    /// Indices into the hunk's lines; the whole hunk when absent.
    lines: Option<Vec<usize>>,
    #[serde(default)]
    direction: PatchDirection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictParams {
    stdout: String,
    merge_msg: Option<String>,
    numstat: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RebaseTodoParams {
    entries: Vec<RebaseEntry>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_params<T: for<'de> Deserialize<'de>>(params: Option<Value>) -> Result<T, RpcError> {
    match params {
        Some(v) => serde_json::from_value(v)
            .map_err(|e| RpcError::invalid_params(format!("Invalid parameters: {e}"))),
        None => Err(RpcError::invalid_params("Parameters required")),
    }
}

fn to_json<T: Serialize>(value: T) -> HandlerResult {
    serde_json::to_value(value).map_err(|e| RpcError::internal(format!("Failed to serialize result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitlane_protocol::RpcErrorCode;

    #[test]
    fn dispatch_unknown_method() {
        let err = dispatch("parse/nothing", None).unwrap_err();
        assert_eq!(err.error_code(), RpcErrorCode::MethodNotFound);
    }

    #[test]
    fn missing_params() {
        let err = dispatch(Methods::PARSE_STATUS, None).unwrap_err();
        assert_eq!(err.error_code(), RpcErrorCode::InvalidParams);
    }

    #[test]
    fn malformed_stash_carries_line() {
        let err = dispatch(Methods::PARSE_STASHES, Some(json!({ "stdout": "bogus" }))).unwrap_err();
        assert_eq!(err.error_code(), RpcErrorCode::InvalidParams);
        let data = err.data.unwrap();
        assert_eq!(data["kind"], "MalformedInput");
        assert_eq!(data["line"], "bogus");
    }

    #[test]
    fn owns_its_namespace() {
        let svc = ParseService::new();
        assert!(svc.owns("parse/status"));
        assert!(!svc.owns("git/status"));
        assert!(!svc.owns("parse"));
    }
}
