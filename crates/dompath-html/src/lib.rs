//! dompath HTML
//!
//! Markup ingestion built on html5ever, plus serialization back to markup.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, inner_html, outer_html};
pub use dompath_dom::{DomResult, DomTree, NodeId};

/// Parse markup into a new fragment-rooted tree
pub fn parse_fragment(html: &str) -> DomResult<DomTree> {
    HtmlParser::new().parse_fragment(html)
}
