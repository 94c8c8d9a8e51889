//! Node tree (arena-based allocation)
//!
//! Slot 0 is always the root: an anonymous fragment for offscreen trees,
//! or an element when the tree backs an attached container. Removed
//! subtrees return their slots to a free list so repeated subtree
//! replacement does not grow the arena.

use std::collections::HashMap;
use std::fmt;

use crate::{DomError, DomResult, Listener, Node, NodeData, NodeId};

/// Arena-based node tree
pub struct DomTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    pub(crate) listeners: HashMap<NodeId, Vec<(String, Listener)>>,
}

impl DomTree {
    /// Create a tree whose root is an anonymous fragment
    pub fn new() -> Self {
        Self::with_root(Node::fragment())
    }

    /// Create a tree whose root is an element (an attachable container)
    pub fn with_root_element(tag: &str) -> Self {
        Self::with_root(Node::element(tag))
    }

    fn with_root(root: Node) -> Self {
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            listeners: HashMap::new(),
        }
    }

    /// Root node ID
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())?.as_ref()
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of live nodes in the tree (root included)
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Check if the root has no children
    pub fn is_empty(&self) -> bool {
        self.get(self.root()).is_none_or(|root| !root.has_children())
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Some(node));
                id
            }
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::comment(text))
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.get(current).map_or(NodeId::NONE, |n| n.parent);
        }
        false
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(parent)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(child));
        }
        self.detach(child)?;

        let last = self.node(parent)?.last_child;
        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = last;
        }
        if last.is_valid() {
            self.node_mut(last)?.next_sibling = child;
        }
        let parent_node = self.node_mut(parent)?;
        if !parent_node.first_child.is_valid() {
            parent_node.first_child = child;
        }
        parent_node.last_child = child;
        Ok(())
    }

    /// Unlink a node from its parent and siblings; its subtree stays intact
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let node = self.node_mut(id)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Put `new` in the position of `old`; `old` is detached but not freed
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(old)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Err(DomError::NotAChild { parent, child: old });
        }
        if self.is_inclusive_ancestor(new, parent) {
            return Err(DomError::HierarchyRequest(new));
        }
        if old == new {
            return Ok(());
        }
        self.detach(new)?;

        {
            let node = self.node_mut(new)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = new;
        } else {
            self.node_mut(parent)?.first_child = new;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = new;
        } else {
            self.node_mut(parent)?.last_child = new;
        }

        let node = self.node_mut(old)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Detach a node and free its whole subtree
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.root() {
            return Err(DomError::HierarchyRequest(id));
        }
        self.detach(id)?;

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current.index()).and_then(Option::take) else {
                continue;
            };
            let mut child = node.first_child;
            while child.is_valid() {
                stack.push(child);
                child = self.get(child).map_or(NodeId::NONE, |n| n.next_sibling);
            }
            self.listeners.remove(&current);
            self.free.push(current);
        }
        Ok(())
    }

    /// Remove and free all children of `parent`
    pub fn clear_children(&mut self, parent: NodeId) -> DomResult<()> {
        loop {
            let first = self.node(parent)?.first_child;
            if !first.is_valid() {
                return Ok(());
            }
            self.remove(first)?;
        }
    }

    /// Iterate over the children of a node
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(parent).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Child at a sibling index
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index).map(|(id, _)| id)
    }

    /// Sibling index of a node within its parent
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent;
        if !parent.is_valid() {
            return None;
        }
        self.children(parent).position(|(child, _)| child == id)
    }

    /// Deep-copy a subtree of `src` into this tree; the copy is detached.
    /// Event listeners are not copied.
    pub fn import_subtree(&mut self, src: &DomTree, src_id: NodeId) -> DomResult<NodeId> {
        let copy = src.node(src_id)?.detached_copy();
        let id = self.alloc(copy);
        for (child, _) in src.children(src_id) {
            let imported = self.import_subtree(src, child)?;
            self.append_child(id, imported)?;
        }
        Ok(id)
    }

    /// Text value of a text or comment node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Set the value of a text or comment node
    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> DomResult<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(t) | NodeData::Comment(t) => {
                *t = value.into();
                Ok(())
            }
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
        }
        for (child, _) in self.children(id) {
            self.collect_text(child, out);
        }
    }

    /// Get an attribute of an element
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute of an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> DomResult<()> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?
            .set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute of an element, returning its old value
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        Ok(self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?
            .remove_attr(name))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning copies the node structure only; listeners stay with the original.
impl Clone for DomTree {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            free: self.free.clone(),
            listeners: HashMap::new(),
        }
    }
}

impl fmt::Debug for DomTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomTree")
            .field("nodes", &self.len())
            .field("listeners", &self.listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
