//! Tree containers
//!
//! One tree plus its path index and alias table. The engine keeps three of
//! them (template, working, live) that share path semantics.

use std::collections::BTreeMap;

use dompath_dom::{DomTree, NodeId};
use dompath_html::{inner_html, outer_html};

use crate::alias::{AliasResolver, Reference};
use crate::error::{Error, Result};
use crate::index::{PathIndex, RefTable};

/// Container lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Nothing indexed yet, or explicitly cleared
    Empty,
    /// Reference table reflects the tree
    Parsed,
}

/// A tree with its own index and aliases
#[derive(Debug, Clone)]
pub struct TreeContainer {
    tree: DomTree,
    refs: RefTable,
    aliases: AliasResolver,
    state: ContainerState,
}

impl TreeContainer {
    /// Empty container over a fragment-rooted tree
    pub fn new(alias_attrs: Vec<String>) -> Self {
        Self::from_tree(DomTree::new(), alias_attrs)
    }

    /// Wrap an existing tree without indexing it
    pub fn from_tree(tree: DomTree, alias_attrs: Vec<String>) -> Self {
        Self {
            tree,
            refs: RefTable::new(),
            aliases: AliasResolver::new(alias_attrs),
            state: ContainerState::Empty,
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Give the tree back, dropping the index
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn refs(&self) -> &RefTable {
        &self.refs
    }

    pub fn aliases(&self) -> &AliasResolver {
        &self.aliases
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn is_parsed(&self) -> bool {
        self.state == ContainerState::Parsed
    }

    pub(crate) fn set_alias_attrs(&mut self, attrs: Vec<String>) {
        self.aliases.set_alias_attrs(attrs);
    }

    /// Rebuild the index, pick up auto aliases and re-apply stored ones
    pub fn parse(&mut self) {
        let root = self.tree.root();
        self.refs = PathIndex::build(&mut self.tree, root);
        for (path, node) in self.refs.iter() {
            self.aliases.auto_register(&self.tree, node, path);
        }
        self.aliases.reapply(&self.refs);
        self.state = ContainerState::Parsed;
        tracing::debug!("Indexed {} path(s), {} alias(es)", self.refs.len(), self.aliases.len());
    }

    /// Deep copy of the tree, without event listeners
    pub fn clone_tree(&self) -> DomTree {
        self.tree.clone()
    }

    /// Take `tree` as this container's tree without copying it, and index it.
    /// Returns the previous tree.
    pub fn adopt(&mut self, tree: DomTree) -> DomTree {
        let previous = std::mem::replace(&mut self.tree, tree);
        self.parse();
        previous
    }

    /// Drop all content below the root and the index; aliases are kept
    pub fn clear(&mut self) -> Result<()> {
        let root = self.tree.root();
        self.tree.clear_children(root)?;
        self.refs.clear();
        self.aliases.reapply(&self.refs);
        self.state = ContainerState::Empty;
        Ok(())
    }

    /// Node at a literal path
    pub fn node(&self, path: &str) -> Result<NodeId> {
        self.refs.get(path).ok_or_else(|| Error::UnknownPath(path.to_string()))
    }

    /// Node for a path or alias (any attribute suffix is ignored)
    pub fn get(&self, reference: &str) -> Result<NodeId> {
        let resolved = self.resolve(reference, None)?;
        self.node(&resolved.path)
    }

    /// Register an alias for `target` (`path` or `path@attr`)
    pub fn register_alias(&mut self, name: &str, target: &str) -> Result<()> {
        self.aliases.register(name, target, &self.refs)
    }

    /// Resolve a reference, optionally relative to a container reference
    pub fn resolve(&self, reference: &str, container: Option<&str>) -> Result<Reference> {
        self.aliases.resolve(reference, container, &self.refs)
    }

    /// Resolved reference as a string (`path` or `path@attr`)
    pub fn dealias(&self, reference: &str, container: Option<&str>) -> Result<String> {
        Ok(self.resolve(reference, container)?.to_string())
    }

    /// Path of a node in this tree
    pub fn path_of(&self, node: NodeId) -> Option<String> {
        PathIndex::path_of(&self.tree, self.tree.root(), node)
    }

    /// Path → node map for the given nodes; nodes outside the tree are left out
    pub fn paths_of(&self, nodes: &[NodeId]) -> BTreeMap<String, NodeId> {
        nodes.iter()
            .filter_map(|&node| Some((self.path_of(node)?, node)))
            .collect()
    }

    /// Markup of everything below the root
    pub fn html(&self) -> String {
        inner_html(&self.tree, self.tree.root())
    }

    /// Inner markup of the node a reference points at
    pub fn inner_html(&self, reference: &str) -> Result<String> {
        Ok(inner_html(&self.tree, self.get(reference)?))
    }

    /// Outer markup of the node a reference points at
    pub fn outer_html(&self, reference: &str) -> Result<String> {
        Ok(outer_html(&self.tree, self.get(reference)?))
    }
}
