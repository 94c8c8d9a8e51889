//! Path index
//!
//! Depth-first walk that gives every node below a root its path and
//! records it in a [`RefTable`]. Comments are turned into empty text
//! nodes on the way so that every indexed position is either an element
//! or text.

use std::collections::HashMap;

use dompath_dom::{DomTree, NodeData, NodeId};

use crate::path::child_path;

/// Path → node table, kept in document order
#[derive(Debug, Clone, Default)]
pub struct RefTable {
    order: Vec<String>,
    by_path: HashMap<String, NodeId>,
}

impl RefTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, path: String, node: NodeId) {
        if self.by_path.insert(path.clone(), node).is_none() {
            self.order.push(path);
        }
    }

    /// Node at a path
    pub fn get(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Paths in document order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (path, node) pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.order.iter().map(|p| (p.as_str(), self.by_path[p]))
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.by_path.clear();
    }
}

/// Builds reference tables
#[derive(Debug, Clone, Copy, Default)]
pub struct PathIndex;

impl PathIndex {
    /// Index every node below `root`
    pub fn build(tree: &mut DomTree, root: NodeId) -> RefTable {
        let mut table = RefTable::new();
        Self::visit(tree, root, "", &mut table);
        table
    }

    fn visit(tree: &mut DomTree, parent: NodeId, prefix: &str, table: &mut RefTable) {
        let children: Vec<NodeId> = tree.children(parent).map(|(id, _)| id).collect();

        for (idx, child) in children.into_iter().enumerate() {
            if let Some(node) = tree.get_mut(child) {
                if node.is_comment() {
                    node.data = NodeData::Text(String::new());
                }
            }

            let path = child_path(prefix, idx);
            let has_children = tree.get(child).is_some_and(|n| n.has_children());
            table.insert(path.clone(), child);

            if has_children {
                Self::visit(tree, child, &path, table);
            }
        }
    }

    /// Path of `node` relative to `root`, if it lies below it
    pub fn path_of(tree: &DomTree, root: NodeId, node: NodeId) -> Option<String> {
        let mut indices = Vec::new();
        let mut current = node;
        while current != root {
            indices.push(tree.index_in_parent(current)?);
            current = tree.get(current)?.parent;
        }
        if indices.is_empty() {
            return None;
        }
        Some(indices.iter().rev().fold(String::new(), |path, &idx| child_path(&path, idx)))
    }
}
