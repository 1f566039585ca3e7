//! Directory tree over a flat list of changed files, for tree-style staging
//! panels.
//!
//! Nodes live in an arena (`Vec<TreeNode>`) and refer to each other by
//! index. Directories come before files at every level; names sort
//! case-insensitively.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::status::{ChangedFile, StatusCode};

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Full path; directories end with `/`.
    pub path: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The change a file node stands for.
    pub file: Option<ChangedFile>,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl FileTree {
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Owned nested form, for serialization.
    pub fn to_entries(&self) -> Vec<TreeEntry> {
        self.roots.iter().map(|&id| self.entry(id)).collect()
    }

    fn entry(&self, id: NodeId) -> TreeEntry {
        let node = &self.nodes[id];
        let file = node.file.as_ref();
        TreeEntry {
            name: node.name.clone(),
            kind: node.kind,
            path: node.path.clone(),
            index_status: file.map(|f| f.index_status),
            worktree_status: file.map(|f| f.worktree_status),
            old_path: file.and_then(|f| f.old_path.clone()),
            children: node.children.iter().map(|&c| self.entry(c)).collect(),
        }
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = self.nodes.len();
        match node.parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    fn find_dir(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        let siblings = match parent {
            Some(p) => self.children(p),
            None => self.roots.as_slice(),
        };
        siblings
            .iter()
            .copied()
            .find(|&id| self.nodes[id].is_dir() && self.nodes[id].name == name)
    }

    fn order(&self, a: NodeId, b: NodeId) -> Ordering {
        let (a, b) = (&self.nodes[a], &self.nodes[b]);
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    }

    fn sort(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by(|&a, &b| self.order(a, b));
        self.roots = roots;

        for id in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[id].children);
            children.sort_by(|&a, &b| self.order(a, b));
            self.nodes[id].children = children;
        }
    }
}

/// Nested, serializable form of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_status: Option<StatusCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_status: Option<StatusCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

pub fn build_file_tree(files: &[ChangedFile]) -> FileTree {
    let mut tree = FileTree::default();

    for file in files {
        let segments: Vec<&str> = file.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((name, dirs)) = segments.split_last() else {
            continue;
        };

        let mut parent: Option<NodeId> = None;
        let mut dir_path = String::new();
        for dir in dirs {
            dir_path.push_str(dir);
            dir_path.push('/');
            parent = Some(match tree.find_dir(parent, dir) {
                Some(id) => id,
                None => tree.push(TreeNode {
                    name: dir.to_string(),
                    path: dir_path.clone(),
                    kind: NodeKind::Directory,
                    parent,
                    children: Vec::new(),
                    file: None,
                }),
            });
        }

        tree.push(TreeNode {
            name: name.to_string(),
            path: file.path.clone(),
            kind: NodeKind::File,
            parent,
            children: Vec::new(),
            file: Some(file.clone()),
        });
    }

    tree.sort();
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn changed(path: &str) -> ChangedFile {
        ChangedFile::new(path, None, StatusCode::Modified, StatusCode::Unmodified)
    }

    fn names(tree: &FileTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.nodes()[id].name.clone()).collect()
    }

    #[test]
    fn groups_by_directory() {
        let tree = build_file_tree(&[
            changed("README.md"),
            changed("src/main.rs"),
            changed("src/lib.rs"),
            changed("src/parser/diff.rs"),
            changed("Cargo.toml"),
            changed("assets/Logo.png"),
        ]);

        assert_eq!(names(&tree, tree.roots()), vec!["assets", "src", "Cargo.toml", "README.md"]);

        let src = tree.roots()[1];
        assert_eq!(tree.nodes()[src].path, "src/");
        assert_eq!(names(&tree, tree.children(src)), vec!["parser", "lib.rs", "main.rs"]);

        let parser = tree.children(src)[0];
        assert_eq!(tree.nodes()[parser].path, "src/parser/");
        assert_eq!(tree.nodes()[parser].parent, Some(src));
        let diff = tree.children(parser)[0];
        assert_eq!(tree.nodes()[diff].path, "src/parser/diff.rs");
        assert_eq!(tree.nodes()[diff].file.as_ref().map(|f| f.index_status), Some(StatusCode::Modified));
    }

    #[test]
    fn case_insensitive_order() {
        let tree = build_file_tree(&[changed("b.txt"), changed("A.txt"), changed("a.txt")]);
        assert_eq!(names(&tree, tree.roots()), vec!["A.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn nested_entries_serialize() {
        let tree = build_file_tree(&[changed("src/a.rs")]);
        let value = serde_json::to_value(tree.to_entries()).unwrap();
        assert_eq!(value[0]["type"], "directory");
        assert_eq!(value[0]["path"], "src/");
        assert_eq!(value[0]["children"][0]["type"], "file");
        assert_eq!(value[0]["children"][0]["indexStatus"], "M");
        assert!(value[0].get("indexStatus").is_none());
    }

    #[test]
    fn empty_input() {
        let tree = build_file_tree(&[]);
        assert!(tree.is_empty());
        assert!(tree.to_entries().is_empty());
        assert!(tree.children(42).is_empty());
    }
}
