//! HTML5 fragment parser
//!
//! Uses html5ever's RcDom and converts the result into the arena tree.
//! Markup is parsed as the content of `<body>`, the same context an
//! element's inner markup is parsed in.

use dompath_dom::{DomResult, DomTree, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

const BODY_PREAMBLE: &str = "<!DOCTYPE html><html><head></head><body>";

/// HTML5 fragment parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse markup into a new fragment-rooted tree
    pub fn parse_fragment(&self, html: &str) -> DomResult<DomTree> {
        let mut tree = DomTree::new();
        let root = tree.root();
        self.parse_into(&mut tree, root, html)?;
        Ok(tree)
    }

    /// Parse markup and append the resulting nodes to `parent`.
    /// Returns the number of top-level nodes appended.
    pub fn parse_into(&self, tree: &mut DomTree, parent: NodeId, html: &str) -> DomResult<usize> {
        let wrapped = format!("{BODY_PREAMBLE}{html}");
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(wrapped);

        let Some(body) = find_child(&dom.document, "html").and_then(|html| find_child(&html, "body")) else {
            tracing::warn!("Parsed markup has no body element");
            return Ok(0);
        };

        let children = body.children.borrow();
        for child in children.iter() {
            self.convert_node(child, tree, parent)?;
        }
        tracing::debug!("Parsed fragment: {} top-level node(s), {} total", children.len(), tree.len());
        Ok(children.len())
    }

    /// Convert an RcDom node to our tree format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> DomResult<()> {
        match &handle.data {
            RcNodeData::Text { contents } => {
                let id = tree.create_text(&contents.borrow());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attr(id, &attr.name.local, attr.value.to_string())?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::Document
            | RcNodeData::Doctype { .. }
            | RcNodeData::ProcessingInstruction { .. } => {
                // Not part of body content
            }
        }
        Ok(())
    }
}

fn find_child(handle: &Handle, tag: &str) -> Option<Handle> {
    handle.children.borrow().iter()
        .find(|child| matches!(&child.data, RcNodeData::Element { name, .. } if &*name.local == tag))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_structure() {
        let tree = HtmlParser::new().parse_fragment(r#"<div id="idea"><h1 title="Heading"></h1></div>"#).unwrap();
        let div = tree.child_at(tree.root(), 0).unwrap();
        assert_eq!(tree.attr(div, "id"), Some("idea"));

        let h1 = tree.child_at(div, 0).unwrap();
        assert_eq!(tree.get(h1).unwrap().as_element().unwrap().tag, "h1");
        assert_eq!(tree.attr(h1, "title"), Some("Heading"));
    }

    #[test]
    fn test_parse_keeps_comments_and_text() {
        let tree = HtmlParser::new().parse_fragment("<div>Some text - <!-- HERE --></div>").unwrap();
        let div = tree.child_at(tree.root(), 0).unwrap();
        assert_eq!(tree.children(div).count(), 2);
        assert_eq!(tree.text(tree.child_at(div, 0).unwrap()), Some("Some text - "));
        assert!(tree.get(tree.child_at(div, 1).unwrap()).unwrap().is_comment());
    }

    #[test]
    fn test_parse_into_existing_parent() {
        let mut tree = DomTree::with_root_element("section");
        let root = tree.root();
        let added = HtmlParser::new().parse_into(&mut tree, root, "<b>x</b>y").unwrap();
        assert_eq!(added, 2);
        assert_eq!(tree.text_content(root), "xy");
    }
}
