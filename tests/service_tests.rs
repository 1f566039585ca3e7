//! Service-level functional tests.
//!
//! Drives `ParseService` through `Service::handle` with the same JSON a
//! caller sends over JSON-RPC, and checks the JSON it gets back.

use gitlane_protocol::RpcErrorCode;
use gitlane_protocol::methods::ALL_METHODS;
use gitlane_services::{ParseService, Service};
use serde_json::{Value, json};

fn svc() -> ParseService {
    ParseService::new()
}

async fn call(method: &str, params: Value) -> Value {
    svc().handle(method, Some(params)).await.unwrap()
}

async fn call_err(method: &str, params: Option<Value>) -> RpcErrorCode {
    svc().handle(method, params).await.unwrap_err().error_code()
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

mod dispatch {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn every_listed_method_is_handled() {
        let params = json!({ "stdout": "", "hunk": 0, "entries": [] });
        for method in ALL_METHODS {
            let outcome = svc().handle(method, Some(params.clone())).await;
            if let Err(err) = outcome {
                assert_ne!(err.error_code(), RpcErrorCode::MethodNotFound, "{method}");
            }
        }
    }

    #[tokio::test]
    async fn unknown_method() {
        assert_eq!(call_err("parse/unknown", Some(json!({}))).await, RpcErrorCode::MethodNotFound);
    }

    #[tokio::test]
    async fn missing_params() {
        assert_eq!(call_err("parse/log", None).await, RpcErrorCode::InvalidParams);
    }

    #[tokio::test]
    async fn wrongly_typed_params() {
        assert_eq!(
            call_err("parse/status", Some(json!({ "stdout": 42 }))).await,
            RpcErrorCode::InvalidParams
        );
    }

    #[test]
    fn namespace() {
        assert_eq!(svc().namespace(), "parse");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Working tree
// ─────────────────────────────────────────────────────────────────────────────

mod working_tree {
    use super::*;
    use pretty_assertions::assert_eq;

    const STATUS: &str = "\
# branch.oid 1234567890abcdef1234567890abcdef12345678
# branch.head main
# branch.upstream origin/main
# branch.ab +3 -2
1 M. N... 100644 100644 100644 abc def README.md
1 .M N... 100644 100644 100644 abc def src/lib.rs
2 R. N... 100644 100644 100644 abc def R100 src/new.rs\tsrc/old.rs
u UU N... 100644 100644 100644 100644 a b c src/conflict.rs
? notes.txt
";

    #[tokio::test]
    async fn status() {
        let result = call("parse/status", json!({ "stdout": STATUS })).await;
        assert_eq!(result["branch"], "main");
        assert_eq!(result["upstream"], "origin/main");
        assert_eq!(result["aheadBehind"], json!({ "ahead": 3, "behind": 2 }));

        let files = result["changedFiles"].as_array().unwrap();
        assert_eq!(files.len(), 5);
        assert_eq!(files[0]["path"], "README.md");
        assert_eq!(files[0]["indexStatus"], "M");
        assert_eq!(files[0]["worktreeStatus"], ".");
        assert_eq!(files[2]["oldPath"], "src/old.rs");
        assert_eq!(files[4]["indexStatus"], "?");
    }

    #[tokio::test]
    async fn status_without_header() {
        let result = call("parse/status", json!({ "stdout": "" })).await;
        assert_eq!(result["branch"], "");
        assert_eq!(result["changedFiles"], json!([]));
    }

    #[tokio::test]
    async fn file_tree() {
        let result = call("parse/fileTree", json!({ "stdout": STATUS })).await;
        let tree = result["tree"].as_array().unwrap();
        let names: Vec<&str> = tree.iter().map(|e| e["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["src", "notes.txt", "README.md"]);
        assert_eq!(tree[0]["type"], "directory");
        assert_eq!(tree[0]["children"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn conflicts() {
        let result = call(
            "parse/conflicts",
            json!({
                "stdout": STATUS,
                "mergeMsg": "Merge branch 'feature/login'\n\n# Conflicts:\n",
                "numstat": "-\t-\tassets/logo.png\n",
            }),
        )
        .await;
        assert_eq!(result["files"], json!([{ "path": "src/conflict.rs", "status": "UU" }]));
        assert_eq!(result["mergeBranch"], "feature/login");
        assert_eq!(result["isBinary"], true);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

mod history {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn oneline_log_is_default() {
        let result = call("parse/log", json!({ "stdout": "a1b2c3d fix: parser\ne4f5a6b feat: lanes\n" })).await;
        let commits = result["commits"].as_array().unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0]["sha"], "a1b2c3d");
        assert_eq!(commits[0]["message"], "fix: parser");
    }

    #[tokio::test]
    async fn detailed_log() {
        let stdout = "0123456789abcdef0123456789abcdef01234567|||Jane|||jane@example.com|||2 hours ago|||feat: x|||HEAD -> main, origin/main\n";
        let result = call("parse/log", json!({ "stdout": stdout, "mode": "detailed" })).await;
        let commit = &result["commits"][0];
        assert_eq!(commit["shortSha"], "0123456");
        assert_eq!(commit["author"], "Jane");
        assert_eq!(commit["email"], "jane@example.com");
        assert_eq!(commit["refs"], json!(["HEAD -> main", "origin/main"]));
    }

    #[tokio::test]
    async fn graph() {
        let stdout = "\
m|||b f|||Dev|||now|||Merge branch 'feature'|||HEAD -> main
f|||a|||Dev|||1 hour ago|||feature work|||feature
b|||a|||Dev|||2 hours ago|||main work|||
a||||||Dev|||1 day ago|||root|||
";
        let result = call("parse/graph", json!({ "stdout": stdout })).await;
        let nodes = result["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0]["lane"], 0);
        assert_eq!(nodes[0]["parents"], json!(["b", "f"]));
        assert_eq!(nodes[1]["lane"], 1);
        assert_eq!(nodes[3]["parents"], json!([]));
    }

    #[tokio::test]
    async fn search_commits_and_files() {
        let result = call(
            "parse/search",
            json!({ "stdout": "abc123def|abc123d|Jane|3 days ago|fix: a|b\n" }),
        )
        .await;
        assert_eq!(result["commits"][0]["message"], "fix: a|b");

        let result = call("parse/search", json!({ "stdout": "src/a.rs\n\nsrc/b.rs\n", "files": true })).await;
        assert_eq!(result["files"], json!(["src/a.rs", "src/b.rs"]));
    }

    #[tokio::test]
    async fn blame_with_pinned_clock() {
        let sha = "c".repeat(40);
        let stdout = format!("{sha} 1 1 1\nauthor Ann\nauthor-time 1000\nfilename a.rs\n\tlet x = 1;\n");
        let result = call("parse/blame", json!({ "stdout": stdout, "now": 1000 + 7200 })).await;
        assert_eq!(
            result["lines"],
            json!([{
                "commitSha": sha,
                "author": "Ann",
                "date": "2 hours ago",
                "lineNumber": 1,
                "content": "let x = 1;",
            }])
        );
    }

    #[tokio::test]
    async fn rebase_plan_and_todo() {
        let plan = call("parse/rebasePlan", json!({ "stdout": "bbbbbbb second\naaaaaaa first\n" })).await;
        let mut entries = plan["entries"].clone();
        assert_eq!(entries[0]["sha"], "aaaaaaa");
        assert_eq!(entries[0]["action"], "pick");

        entries[1]["action"] = json!("fixup");
        let todo = call("parse/rebaseTodo", json!({ "entries": entries })).await;
        assert_eq!(todo["todo"], "pick aaaaaaa\nfixup bbbbbbb\n");
    }

    #[tokio::test]
    async fn rebase_todo_rejects_unknown_action() {
        let params = json!({ "entries": [{ "sha": "a", "shortSha": "a", "message": "m", "action": "squish" }] });
        assert_eq!(call_err("parse/rebaseTodo", Some(params)).await, RpcErrorCode::InvalidParams);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Diff
// ─────────────────────────────────────────────────────────────────────────────

mod diff {
    use super::*;
    use pretty_assertions::assert_eq;

    const DIFF: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
index 1111111..2222222 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@ mod parse;
 use std::io;
-use std::fs;
+use std::fs::File;
+use std::path::Path;
 fn main() {}
";

    #[tokio::test]
    async fn files_and_counts() {
        let result = call("parse/diff", json!({ "stdout": DIFF })).await;
        let file = &result["files"][0];
        assert_eq!(file["oldPath"], "src/lib.rs");
        assert_eq!(file["status"], "modified");
        assert_eq!(file["additions"], 2);
        assert_eq!(file["deletions"], 1);
        let hunk = &file["hunks"][0];
        assert_eq!(hunk["header"], "mod parse;");
        assert_eq!(hunk["lines"][1], json!({
            "type": "deletion",
            "content": "use std::fs;",
            "oldLineNumber": 2,
            "newLineNumber": null,
        }));
    }

    #[tokio::test]
    async fn renames_from_status() {
        let stdout = "\
diff --git a/old.rs b/old.rs
deleted file mode 100644
--- a/old.rs
+++ /dev/null
@@ -1 +0,0 @@
-x
diff --git a/new.rs b/new.rs
new file mode 100644
--- /dev/null
+++ b/new.rs
@@ -0,0 +1 @@
+x
";
        let status = "2 R. N... 100644 100644 100644 abc abc R100 new.rs\told.rs\n";
        let result = call("parse/diff", json!({ "stdout": stdout, "status": status })).await;
        let files = result["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["status"], "renamed");
        assert_eq!(files[0]["oldPath"], "old.rs");
        assert_eq!(files[0]["newPath"], "new.rs");
    }

    #[tokio::test]
    async fn whole_hunk_patch() {
        let result = call("parse/hunkPatch", json!({ "stdout": DIFF, "hunk": 0 })).await;
        let patch = result["patch"].as_str().unwrap();
        assert!(patch.starts_with("diff --git a/src/lib.rs b/src/lib.rs\n--- a/src/lib.rs\n+++ b/src/lib.rs\n"));
        assert!(patch.contains("@@ -1,3 +1,4 @@ mod parse;\n"));
        assert!(patch.ends_with(" fn main() {}\n"));
    }

    #[tokio::test]
    async fn selected_line_patch() {
        // stage only "+use std::path::Path;"
        let result = call("parse/hunkPatch", json!({ "stdout": DIFF, "hunk": 0, "lines": [3] })).await;
        let patch = result["patch"].as_str().unwrap();
        assert!(patch.contains("@@ -1,3 +1,4 @@ mod parse;\n use std::io;\n use std::fs;\n+use std::path::Path;\n fn main() {}\n"));
    }

    #[tokio::test]
    async fn selection_without_changes_is_null() {
        let result = call("parse/hunkPatch", json!({ "stdout": DIFF, "hunk": 0, "lines": [0] })).await;
        assert_eq!(result["patch"], Value::Null);
    }

    #[tokio::test]
    async fn out_of_range_hunk() {
        let params = json!({ "stdout": DIFF, "hunk": 5 });
        assert_eq!(call_err("parse/hunkPatch", Some(params)).await, RpcErrorCode::InvalidParams);
        let params = json!({ "stdout": DIFF, "file": 1, "hunk": 0 });
        assert_eq!(call_err("parse/hunkPatch", Some(params)).await, RpcErrorCode::InvalidParams);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Refs
// ─────────────────────────────────────────────────────────────────────────────

mod refs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn branches() {
        let stdout = "\
* main                a1b2c3d [origin/main: ahead 2] feat: x
  develop             d4e5f6a chore: bump version
  remotes/origin/HEAD -> origin/main
  remotes/origin/main a1b2c3d feat: x
";
        let result = call("parse/branches", json!({ "stdout": stdout })).await;
        let branches = result["branches"].as_array().unwrap();
        assert_eq!(branches[0]["name"], "main");
        assert_eq!(branches[0]["isCurrent"], true);
        assert_eq!(branches[0]["upstream"], "origin/main");
        assert_eq!(branches[0]["aheadBehind"], json!({ "ahead": 2, "behind": 0 }));
        assert_eq!(branches[1]["isCurrent"], false);
        assert!(branches.iter().skip(2).all(|b| b["isRemote"] == true));
    }

    #[tokio::test]
    async fn remotes() {
        let stdout = "origin\tgit@example.com:a/b.git (fetch)\norigin\tgit@example.com:a/b.git (push)\n";
        let result = call("parse/remotes", json!({ "stdout": stdout })).await;
        assert_eq!(
            result["remotes"],
            json!([{
                "name": "origin",
                "fetchUrl": "git@example.com:a/b.git",
                "pushUrl": "git@example.com:a/b.git",
            }])
        );
    }

    #[tokio::test]
    async fn tags() {
        let stdout = "v1.0.0|||a1b2c3d|||3 weeks ago|||Release 1.0\n";
        let result = call("parse/tags", json!({ "stdout": stdout })).await;
        assert_eq!(result["tags"][0]["name"], "v1.0.0");
        assert_eq!(result["tags"][0]["message"], "Release 1.0");
    }

    #[tokio::test]
    async fn stashes() {
        let stdout = "stash@{0}: WIP on main: a1b2c3d feat: add thing\nstash@{1}: On develop: experiment\n";
        let result = call("parse/stashes", json!({ "stdout": stdout })).await;
        let stashes = result["stashes"].as_array().unwrap();
        assert_eq!(stashes[0]["index"], 0);
        assert_eq!(stashes[0]["branch"], "main");
        assert_eq!(stashes[0]["sha"], "a1b2c3d");
        assert_eq!(stashes[1]["index"], 1);
        assert_eq!(stashes[1]["message"], "experiment");
    }

    #[tokio::test]
    async fn malformed_stash_line() {
        let err = svc()
            .handle("parse/stashes", Some(json!({ "stdout": "stash@{0}: ok: msg\ngarbage\n" })))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), RpcErrorCode::InvalidParams);
        assert_eq!(err.data, Some(json!({ "kind": "MalformedInput", "line": "garbage" })));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Results and errors
// ─────────────────────────────────────────────────────────────────────────────

mod results {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn merge_with_conflicts() {
        let result = call(
            "parse/merge",
            json!({
                "stdout": "Auto-merging src/a.rs\nCONFLICT (content): Merge conflict in src/a.rs\n",
                "stderr": "Automatic merge failed; fix conflicts and then commit the result.\n",
                "exitCode": 1,
            }),
        )
        .await;
        assert_eq!(result["success"], false);
        assert_eq!(result["hasConflicts"], true);
        assert_eq!(result["conflictFiles"], json!(["src/a.rs"]));
        assert!(result["message"].as_str().unwrap().ends_with("commit the result."));
    }

    #[tokio::test]
    async fn clean_merge() {
        let result = call("parse/merge", json!({ "stdout": "Already up to date.\n" })).await;
        assert_eq!(result["success"], true);
        assert_eq!(result["hasConflicts"], false);
        assert_eq!(result["message"], "Already up to date.");
    }

    #[tokio::test]
    async fn classified_error() {
        let result = call(
            "parse/error",
            json!({ "stdout": "", "stderr": "fatal: not a git repository (or any of the parent directories): .git\n" }),
        )
        .await;
        assert_eq!(result["error"]["category"], "not-a-repository");
        assert_eq!(result["error"]["message"], "This folder is not a git repository");
    }

    #[tokio::test]
    async fn no_error_text() {
        let result = call("parse/error", json!({ "stdout": "" })).await;
        assert_eq!(result["error"], Value::Null);
    }

    #[tokio::test]
    async fn version() {
        let result = call("parse/version", json!({ "stdout": "git version 2.43.0\n" })).await;
        assert_eq!(result, json!({ "version": "2.43.0", "supported": true }));

        let result = call("parse/version", json!({ "stdout": "git version 1.9.5\n" })).await;
        assert_eq!(result["supported"], false);

        let result = call("parse/version", json!({ "stdout": "nope" })).await;
        assert_eq!(result, json!({ "version": null, "supported": false }));
    }
}
