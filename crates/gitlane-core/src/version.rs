//! `git --version` parsing.

use std::sync::LazyLock;

use regex::Regex;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"git version (\d+)\.(\d+)\.(\d+)").expect("version regex"));

pub type GitVersion = (u32, u32, u32);

/// Oldest git whose output formats the parsers understand.
pub const MIN_GIT_VERSION: GitVersion = (2, 0, 0);

/// `git version 2.43.0` → `(2, 43, 0)`. Vendor suffixes such as
/// `(Apple Git-146)` or `.windows.1` are ignored.
pub fn parse_git_version(output: &str) -> Option<GitVersion> {
    let caps = VERSION_RE.captures(output)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?))
}

pub fn version_supported(version: GitVersion) -> bool {
    version >= MIN_GIT_VERSION
}
