//! dompath DOM - arena node tree
//!
//! Memory-efficient node tree used by the path index and render engine.
//! Nodes live in a single arena and link to each other through [`NodeId`]s.

mod node;
mod tree;
mod token_list;
mod events;
mod cleaner;

pub use node::{Node, NodeData, NodeType, ElementData, Attribute};
pub use tree::{DomTree, Children};
pub use token_list::TokenList;
pub use events::{Event, Listener};
pub use cleaner::{Cleaner, WhitespaceCleaner};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result type for tree operations
pub type DomResult<T> = Result<T, DomError>;

/// Tree operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Hierarchy request error: {0:?} cannot be inserted here")]
    HierarchyRequest(NodeId),
}
