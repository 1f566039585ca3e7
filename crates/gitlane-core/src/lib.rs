//! gitlane core
//!
//! Pure parsers that turn captured git output into typed records, plus the
//! lane layout for the commit graph. Nothing here runs git or touches the
//! filesystem: callers hand in the stdout/stderr text and exit code of a
//! command they ran themselves.
//!
//! Every function is stateless and safe to call from any thread. All
//! parsers are best-effort except [`refs::parse_stash_line`], which rejects
//! lines it does not recognize with a [`ParseError`].

pub mod blame;
pub mod conflict;
pub mod diff;
pub mod error;
pub mod graph;
pub mod log;
pub mod merge;
pub mod patch;
pub mod rebase;
pub mod refs;
pub mod status;
pub mod stderr;
pub mod tree;
pub mod version;

mod text;

pub use blame::{BlameLine, BlameOptions, parse_blame, relative_time};
pub use conflict::{ConflictEntry, ConflictFile, conflicted_entries, merge_head_branch, numstat_is_binary};
pub use diff::{DiffFile, DiffStatus, Hunk, HunkLine, HunkLineKind, apply_status_renames, parse_diff, parse_hunks};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use graph::{GraphCommit, GraphNode, LaneAssigner, assign_lanes, branch_label, build_graph, parse_graph_log};
pub use log::{Commit, LogMode, SearchHit, parse_file_list, parse_log, parse_search_results, parse_verbose};
pub use merge::{MergeResult, parse_merge_result};
pub use patch::{PatchDirection, hunk_patch, line_patch};
pub use rebase::{RebaseAction, RebaseEntry, parse_rebase_commits, render_todo};
pub use refs::{Branch, Remote, Stash, Tag, parse_branches, parse_remotes, parse_stash_line, parse_stashes, parse_tags};
pub use status::{AheadBehind, ChangedFile, GitStatus, StatusCode, parse_status};
pub use stderr::{ErrorCategory, GitError, classify_stderr};
pub use tree::{FileTree, NodeKind, TreeEntry, build_file_tree};
pub use version::{GitVersion, parse_git_version, version_supported};
