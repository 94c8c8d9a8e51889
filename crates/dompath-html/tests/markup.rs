//! Parse and serialize through the public API

use dompath_html::{inner_html, outer_html, parse_fragment, HtmlParser};
use dompath_dom::{DomError, DomTree, NodeId};

#[test]
fn test_markup_survives_parse_and_serialize() {
    let html = r#"<div id="idea"><h1 title="Heading" class="heading"></h1><h3 class="sub title">a &amp; b</h3></div>"#;
    let tree = parse_fragment(html).unwrap();
    assert_eq!(inner_html(&tree, tree.root()), html);
}

#[test]
fn test_parser_fixes_up_markup() {
    let tree = parse_fragment("<p>one<p>two<br>").unwrap();
    assert_eq!(inner_html(&tree, tree.root()), "<p>one</p><p>two<br></p>");
}

#[test]
fn test_boolean_attributes_get_values() {
    let tree = parse_fragment("<input disabled>").unwrap();
    let input = tree.child_at(tree.root(), 0).unwrap();
    assert_eq!(outer_html(&tree, input), r#"<input disabled="">"#);
}

#[test]
fn test_parse_into_element_container() {
    let mut tree = DomTree::with_root_element("main");
    let root = tree.root();
    let parser = HtmlParser::new();

    parser.parse_into(&mut tree, root, "<li>a</li>").unwrap();
    parser.parse_into(&mut tree, root, "text<!-- slot -->").unwrap();

    assert_eq!(tree.children(root).count(), 3);
    assert_eq!(outer_html(&tree, root), "<main><li>a</li>text<!-- slot --></main>");
}

#[test]
fn test_raw_text_is_not_escaped() {
    let tree = parse_fragment("<style>a > b { color: red }</style>").unwrap();
    assert_eq!(inner_html(&tree, tree.root()), "<style>a > b { color: red }</style>");
}

#[test]
fn test_parse_into_reports_bad_parent() {
    let mut tree = DomTree::new();
    let result = HtmlParser::new().parse_into(&mut tree, NodeId::NONE, "<p>lost</p>");
    assert!(matches!(result, Err(DomError::NotFound(_))));
}
