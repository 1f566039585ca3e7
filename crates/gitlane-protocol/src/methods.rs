//! Method name constants: every JSON-RPC method of the `parse` namespace.
//!
//! Each constant is the exact string sent over the wire as the `method`
//! field of a JSON-RPC request. The comment beside each names the git
//! invocation whose captured output the method accepts.

/// All parse method names.
pub struct Methods;

impl Methods {
    // ── Working tree ────────────────────────────────────────────────────
    pub const PARSE_STATUS: &str = "parse/status"; // status --porcelain=v2 --branch
    pub const PARSE_CONFLICTS: &str = "parse/conflicts"; // status --porcelain=v2
    pub const PARSE_FILE_TREE: &str = "parse/fileTree"; // status --porcelain=v2 --branch

    // ── History ─────────────────────────────────────────────────────────
    pub const PARSE_LOG: &str = "parse/log"; // log --oneline | log --format=... | show
    pub const PARSE_GRAPH: &str = "parse/graph"; // log --all --format='%H|||%P|||...'
    pub const PARSE_SEARCH: &str = "parse/search"; // log --format="%H|%h|%an|%ar|%s" --grep
    pub const PARSE_BLAME: &str = "parse/blame"; // blame --porcelain
    pub const PARSE_REBASE_PLAN: &str = "parse/rebasePlan"; // log --oneline HEAD~n..HEAD
    pub const PARSE_REBASE_TODO: &str = "parse/rebaseTodo"; // edited plan → GIT_SEQUENCE_EDITOR input

    // ── Diff ────────────────────────────────────────────────────────────
    pub const PARSE_DIFF: &str = "parse/diff"; // diff | diff --cached | diff --no-index
    pub const PARSE_HUNK_PATCH: &str = "parse/hunkPatch";

    // ── Refs ────────────────────────────────────────────────────────────
    pub const PARSE_BRANCHES: &str = "parse/branches"; // branch -a -vv
    pub const PARSE_REMOTES: &str = "parse/remotes"; // remote -v
    pub const PARSE_TAGS: &str = "parse/tags"; // tag -l --format=...
    pub const PARSE_STASHES: &str = "parse/stashes"; // stash list

    // ── Outcomes ────────────────────────────────────────────────────────
    pub const PARSE_MERGE: &str = "parse/merge"; // merge | rebase | cherry-pick | revert
    pub const PARSE_ERROR: &str = "parse/error"; // stderr of any failed invocation
    pub const PARSE_VERSION: &str = "parse/version"; // git --version
}

/// Every method constant, in declaration order.
pub const ALL_METHODS: &[MethodName] = &[
    Methods::PARSE_STATUS,
    Methods::PARSE_CONFLICTS,
    Methods::PARSE_FILE_TREE,
    Methods::PARSE_LOG,
    Methods::PARSE_GRAPH,
    Methods::PARSE_SEARCH,
    Methods::PARSE_BLAME,
    Methods::PARSE_REBASE_PLAN,
    Methods::PARSE_REBASE_TODO,
    Methods::PARSE_DIFF,
    Methods::PARSE_HUNK_PATCH,
    Methods::PARSE_BRANCHES,
    Methods::PARSE_REMOTES,
    Methods::PARSE_TAGS,
    Methods::PARSE_STASHES,
    Methods::PARSE_MERGE,
    Methods::PARSE_ERROR,
    Methods::PARSE_VERSION,
];

/// Returns true if the given string is a known parse method.
pub fn is_known_method(method: &str) -> bool {
    ALL_METHODS.contains(&method)
}

/// The method name is always a `&str` at the protocol level.
pub type MethodName = &'static str;
