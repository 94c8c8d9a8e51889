//! Path and alias grammar
//!
//! Paths look like `:0:2:1` (sibling indices from the root down), aliases
//! like `heading` or `sub-title_2`. Either may carry an `@attr` suffix.

/// First character of every path
pub const PATH_SIGIL: char = ':';
/// Separates a reference from an attribute name
pub const ATTR_SEPARATOR: char = '@';

/// `^:\d+(:\d+)*$`
pub fn is_valid_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix(PATH_SIGIL) else {
        return false;
    };
    rest.split(PATH_SIGIL)
        .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
}

/// `^[A-Za-z][\w-]*$`
pub fn is_valid_alias(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Path of the `index`-th child of `parent` (empty `parent` is the root)
pub fn child_path(parent: &str, index: usize) -> String {
    format!("{parent}{PATH_SIGIL}{index}")
}

/// Whether `ancestor` is a strict ancestor of `path`
pub fn is_ancestor_path(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(PATH_SIGIL)
}

/// Split `ref@attr` into its reference and attribute parts
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once(ATTR_SEPARATOR) {
        Some((head, attr)) => (head, Some(attr)),
        None => (reference, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_grammar() {
        assert!(is_valid_path(":0"));
        assert!(is_valid_path(":0:12:3"));
        assert!(!is_valid_path(""));
        assert!(!is_valid_path(":"));
        assert!(!is_valid_path("0:1"));
        assert!(!is_valid_path(":0::1"));
        assert!(!is_valid_path(":0:a"));
    }

    #[test]
    fn test_alias_grammar() {
        assert!(is_valid_alias("idea"));
        assert!(is_valid_alias("new-id"));
        assert!(is_valid_alias("a_1"));
        assert!(!is_valid_alias("1abc"));
        assert!(!is_valid_alias("-x"));
        assert!(!is_valid_alias("has space"));
        assert!(!is_valid_alias(""));
    }

    #[test]
    fn test_ancestry() {
        assert!(is_ancestor_path(":0", ":0:1"));
        assert!(!is_ancestor_path(":0", ":0"));
        assert!(!is_ancestor_path(":0:1", ":0:10"));
        assert_eq!(child_path(":0", 3), ":0:3");
        assert_eq!(child_path("", 0), ":0");
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(split_reference(":0@title"), (":0", Some("title")));
        assert_eq!(split_reference("@title"), ("", Some("title")));
        assert_eq!(split_reference("heading"), ("heading", None));
    }
}
