//! Tree cleaning
//!
//! Normalizes a freshly built tree before it is indexed: drops
//! whitespace-only text nodes (indentation in source markup) and,
//! optionally, comments.

use crate::{DomResult, DomTree, NodeData, NodeId};

/// Pass run over a tree before it is indexed
pub trait Cleaner {
    /// Clean the subtree below `root` in place
    fn clean(&self, tree: &mut DomTree, root: NodeId, keep_comments: bool) -> DomResult<()>;
}

/// Default cleaner: strips whitespace-only text and (optionally) comments
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCleaner;

impl Cleaner for WhitespaceCleaner {
    fn clean(&self, tree: &mut DomTree, root: NodeId, keep_comments: bool) -> DomResult<()> {
        let mut doomed = Vec::new();
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            for (child, node) in tree.children(current) {
                let drop = match &node.data {
                    NodeData::Text(text) => text.trim().is_empty(),
                    NodeData::Comment(_) => !keep_comments,
                    _ => false,
                };
                if drop {
                    doomed.push(child);
                } else if node.has_children() {
                    stack.push(child);
                }
            }
        }

        if !doomed.is_empty() {
            tracing::trace!("Cleaner dropping {} node(s)", doomed.len());
        }
        for id in doomed {
            tree.remove(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> DomTree {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let ws = tree.create_text("\n   ");
        let text = tree.create_text("Some text");
        let comment = tree.create_comment(" HERE ");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, ws).unwrap();
        tree.append_child(div, text).unwrap();
        tree.append_child(div, comment).unwrap();
        tree
    }

    #[test]
    fn test_keeps_comments_when_asked() {
        let mut tree = build();
        let root = tree.root();
        WhitespaceCleaner.clean(&mut tree, root, true).unwrap();
        let div = tree.child_at(tree.root(), 0).unwrap();
        assert_eq!(tree.children(div).count(), 2);
        assert!(tree.get(tree.child_at(div, 1).unwrap()).unwrap().is_comment());
    }

    #[test]
    fn test_strips_comments() {
        let mut tree = build();
        let root = tree.root();
        WhitespaceCleaner.clean(&mut tree, root, false).unwrap();
        let div = tree.child_at(tree.root(), 0).unwrap();
        assert_eq!(tree.children(div).count(), 1);
        assert_eq!(tree.text_content(div), "Some text");
    }
}
