//! End-to-end tests of the `gitlane` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn gitlane() -> Command {
    Command::cargo_bin("gitlane").unwrap()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn status_from_stdin() {
    let output = gitlane()
        .arg("status")
        .write_stdin("# branch.head main\n# branch.ab +1 -0\n? todo.txt\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["branch"], "main");
    assert_eq!(result["aheadBehind"]["ahead"], 1);
    assert_eq!(result["changedFiles"][0]["path"], "todo.txt");
}

#[test]
fn qualified_method_name_and_input_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("diff.txt");
    fs::write(&input, "--- a/x\n+++ b/x\n@@ -1 +1,2 @@\n x\n+y\n").unwrap();

    let output = gitlane().arg("parse/diff").arg("--input").arg(&input).output().unwrap();
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["files"][0]["newPath"], "x");
    assert_eq!(result["files"][0]["additions"], 1);
}

#[test]
fn merge_reads_stderr_and_exit_code() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let err = dir.path().join("err.txt");
    fs::write(&out, "CONFLICT (content): Merge conflict in lib.rs\n").unwrap();
    fs::write(&err, "Automatic merge failed; fix conflicts and then commit the result.\n").unwrap();

    let output = gitlane()
        .args(["merge", "--exit-code", "1", "--input"])
        .arg(&out)
        .arg("--stderr")
        .arg(&err)
        .output()
        .unwrap();
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["success"], false);
    assert_eq!(result["conflictFiles"], json!(["lib.rs"]));
}

#[test]
fn blame_clock_can_be_pinned() {
    let porcelain = format!("{} 1 1 1\nauthor Ann\nauthor-time 0\n\tbody\n", "d".repeat(40));
    gitlane()
        .args(["blame", "--now", "90000"])
        .write_stdin(porcelain)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"date\":\"1 day ago\""));
}

#[test]
fn extra_params_are_merged() {
    gitlane()
        .args(["log", "--params", r#"{"mode":"detailed"}"#])
        .write_stdin("abc|||Ann|||ann@example.com|||now|||init|||\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"email\":\"ann@example.com\""));
}

#[test]
fn params_must_be_an_object() {
    gitlane()
        .args(["log", "--params", "[1,2]"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--params must be a JSON object"));
}

#[test]
fn pretty_output_is_indented() {
    gitlane()
        .args(["version", "--pretty"])
        .write_stdin("git version 2.43.0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("{\n  \""));
}

#[test]
fn malformed_stash_fails() {
    gitlane()
        .arg("stashes")
        .write_stdin("not a stash\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed stash line"));
}

#[test]
fn unknown_method_fails() {
    gitlane()
        .arg("frobnicate")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown method: parse/frobnicate"));
}

#[test]
fn list_prints_every_method() {
    gitlane()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse/status").and(predicate::str::contains("parse/rebaseTodo")));
}

#[test]
fn method_is_required() {
    gitlane().assert().failure();
}

#[test]
fn serve_answers_each_request() {
    let requests = [
        json!({ "jsonrpc": "2.0", "id": 1, "method": "parse/version", "params": { "stdout": "git version 2.39.1" } }),
        json!({ "jsonrpc": "2.0", "id": "two", "method": "git/status", "params": {} }),
    ];
    let mut input: String = requests.iter().map(|r| format!("{r}\n")).collect();
    input.push_str("{not json\n");

    let output = gitlane().arg("--serve").write_stdin(input).output().unwrap();
    assert!(output.status.success());

    let responses: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["version"], "2.39.1");
    assert_eq!(responses[1]["id"], "two");
    assert_eq!(responses[1]["error"]["code"], -32601);
    assert_eq!(responses[2]["id"], Value::Null);
    assert_eq!(responses[2]["error"]["code"], -32700);
}

#[test]
fn log_file_receives_logs() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("gitlane.log");

    gitlane()
        .args(["graph", "--verbose", "--log-file"])
        .arg(&log)
        .env_remove("RUST_LOG")
        .write_stdin("a||||||Dev|||now|||root|||\n")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("assigned graph lanes"));
}
