//! Commit graph layout: assigns every commit a lane for DAG rendering.
//!
//! Input is `git log --all --format='%H|||%P|||%an|||%ar|||%s|||%D'`, newest
//! first. The assignment is a single greedy pass:
//!
//! 1. A commit that a child already placed keeps that lane.
//! 2. Otherwise it takes its first parent's lane if that parent is placed,
//!    else lane 0.
//! 3. A merge additionally gives each unplaced extra parent a fresh lane, so
//!    the parent finds itself placed (rule 1) when the walk reaches it.
//!
//! Lanes are never released once allocated. On very branchy histories the
//! lane count therefore grows with the number of merges in the window; the
//! `-n` limit of the query is what bounds it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::log::{FIELD_DELIMITER, non_empty_lines};
use crate::text::split_refs;

/// Lane of commits that nothing else placed.
pub const TRUNK_LANE: usize = 0;

/// One line of graph log output, before layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCommit {
    pub sha: String,
    pub parents: Vec<String>,
    pub author: String,
    pub date: String,
    pub message: String,
    pub refs: Vec<String>,
}

impl GraphCommit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub sha: String,
    pub parents: Vec<String>,
    pub branch: String,
    pub refs: Vec<String>,
    pub message: String,
    pub author: String,
    pub date: String,
    pub lane: usize,
}

pub fn parse_graph_line(line: &str) -> GraphCommit {
    let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let part = |i: usize| parts.get(i).copied().unwrap_or_default();

    GraphCommit {
        sha: part(0).trim().to_string(),
        parents: part(1).split_whitespace().map(str::to_string).collect(),
        author: part(2).to_string(),
        date: part(3).to_string(),
        message: part(4).to_string(),
        refs: split_refs(part(5)),
    }
}

pub fn parse_graph_log(output: &str) -> Vec<GraphCommit> {
    non_empty_lines(output).map(parse_graph_line).collect()
}

/// Parse graph log output and lay it out in one step.
pub fn build_graph(output: &str) -> Vec<GraphNode> {
    assign_lanes(parse_graph_log(output))
}

/// Branch name to show for a commit: the `HEAD -> name` target, else the
/// first local branch (no `/`, not a tag), else empty.
pub fn branch_label(refs: &[String]) -> String {
    if let Some(head) = refs.iter().find_map(|r| r.strip_prefix("HEAD -> ")) {
        return head.to_string();
    }
    refs.iter()
        .find(|r| !r.contains('/') && !r.starts_with("tag:"))
        .cloned()
        .unwrap_or_default()
}

/// Greedy lane state for one newest-first walk.
#[derive(Debug)]
pub struct LaneAssigner {
    lanes: HashMap<String, usize>,
    next_lane: usize,
}

impl Default for LaneAssigner {
    fn default() -> Self {
        Self {
            lanes: HashMap::new(),
            next_lane: TRUNK_LANE + 1,
        }
    }
}

impl LaneAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lane already recorded for `sha`, if any.
    pub fn lane_of(&self, sha: &str) -> Option<usize> {
        self.lanes.get(sha).copied()
    }

    /// Number of lanes handed out so far, trunk included.
    pub fn lane_count(&self) -> usize {
        self.next_lane
    }

    pub fn assign(&mut self, sha: &str, parents: &[String]) -> usize {
        if let Some(lane) = self.lane_of(sha) {
            return lane;
        }

        let lane = parents
            .first()
            .and_then(|first| self.lane_of(first))
            .unwrap_or(TRUNK_LANE);

        for parent in parents.iter().skip(1) {
            if !self.lanes.contains_key(parent) {
                self.lanes.insert(parent.clone(), self.next_lane);
                self.next_lane += 1;
            }
        }

        self.lanes.insert(sha.to_string(), lane);
        lane
    }
}

/// Lay out commits given newest first.
pub fn assign_lanes(commits: Vec<GraphCommit>) -> Vec<GraphNode> {
    let mut assigner = LaneAssigner::new();
    let nodes: Vec<GraphNode> = commits
        .into_iter()
        .map(|commit| {
            let lane = assigner.assign(&commit.sha, &commit.parents);
            GraphNode {
                branch: branch_label(&commit.refs),
                sha: commit.sha,
                parents: commit.parents,
                refs: commit.refs,
                message: commit.message,
                author: commit.author,
                date: commit.date,
                lane,
            }
        })
        .collect();

    debug!(commits = nodes.len(), lanes = assigner.lane_count(), "assigned graph lanes");
    nodes
}
