//! Alias resolution
//!
//! Aliases are names for paths. They come from explicit registration or
//! from identifying attributes (`id`, `name` by default) found while
//! indexing. An alias outlives the tree it was registered against: after
//! every re-index it is looked up again, and if its path is gone it stays
//! known but points at nothing.

use std::collections::BTreeMap;
use std::fmt;

use dompath_dom::{DomTree, NodeId};

use crate::error::{Error, Result};
use crate::index::RefTable;
use crate::path::{is_valid_alias, is_valid_path, split_reference, ATTR_SEPARATOR, PATH_SIGIL};

/// A resolved reference: a path, optionally naming one attribute of the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub path: String,
    pub attr: Option<String>,
}

impl Reference {
    pub fn node(path: impl Into<String>) -> Self {
        Self { path: path.into(), attr: None }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attr {
            Some(attr) => write!(f, "{}{}{}", self.path, ATTR_SEPARATOR, attr),
            None => f.write_str(&self.path),
        }
    }
}

#[derive(Debug, Clone)]
struct AliasEntry {
    target: Reference,
    /// `None` when the target path is absent from the current index
    node: Option<NodeId>,
}

/// Alias table for one container
#[derive(Debug, Clone)]
pub struct AliasResolver {
    aliases: BTreeMap<String, AliasEntry>,
    alias_attrs: Vec<String>,
}

impl AliasResolver {
    /// Create a resolver that auto-aliases from the given attributes, in priority order
    pub fn new(alias_attrs: Vec<String>) -> Self {
        Self {
            aliases: BTreeMap::new(),
            alias_attrs,
        }
    }

    pub fn alias_attrs(&self) -> &[String] {
        &self.alias_attrs
    }

    pub fn set_alias_attrs(&mut self, attrs: Vec<String>) {
        self.alias_attrs = attrs;
    }

    /// Whether `name` is one of the identifying attributes
    pub fn is_alias_attr(&self, name: &str) -> bool {
        self.alias_attrs.iter().any(|a| a == name)
    }

    /// Register `name` for `target` (`path` or `path@attr`)
    pub fn register(&mut self, name: &str, target: &str, refs: &RefTable) -> Result<()> {
        if !is_valid_alias(name) {
            return Err(Error::InvalidAliasName(name.to_string()));
        }
        let (path, attr) = split_reference(target);
        let node = refs.get(path).ok_or_else(|| Error::UnknownPath(path.to_string()))?;

        self.aliases.insert(name.to_string(), AliasEntry {
            target: Reference { path: path.to_string(), attr: attr.map(str::to_string) },
            node: Some(node),
        });
        Ok(())
    }

    /// Alias `path` after the first identifying attribute `node` carries.
    /// Values that are not valid alias names are skipped.
    pub fn auto_register(&mut self, tree: &DomTree, node: NodeId, path: &str) {
        let Some(value) = self.alias_attrs.iter()
            .find_map(|attr| tree.attr(node, attr).filter(|v| !v.is_empty()))
        else {
            return;
        };

        if !is_valid_alias(value) {
            tracing::warn!("Skipping auto alias {:?} for {}: not a valid alias", value, path);
            return;
        }
        self.aliases.insert(value.to_string(), AliasEntry {
            target: Reference::node(path),
            node: Some(node),
        });
    }

    /// Look every alias up again after a re-index
    pub fn reapply(&mut self, refs: &RefTable) {
        let mut absent = 0;
        for entry in self.aliases.values_mut() {
            entry.node = refs.get(&entry.target.path);
            if entry.node.is_none() {
                absent += 1;
            }
        }
        if absent > 0 {
            tracing::debug!("{} alias(es) no longer present", absent);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Stored target of an alias
    pub fn target(&self, name: &str) -> Option<&Reference> {
        self.aliases.get(name).map(|e| &e.target)
    }

    /// Current node of an alias: `None` for unknown aliases,
    /// `Some(None)` for known aliases whose path is absent
    pub fn node(&self, name: &str) -> Option<Option<NodeId>> {
        self.aliases.get(name).map(|e| e.node)
    }

    /// Known alias names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Resolve `reference`, optionally relative to `container`.
    ///
    /// The container is resolved on its own, without a container of its own;
    /// nested relative references are not supported.
    pub fn resolve(&self, reference: &str, container: Option<&str>, refs: &RefTable) -> Result<Reference> {
        let prefix = match container {
            Some(container) => Some(self.resolve_in(container, None, refs)?.path),
            None => None,
        };
        self.resolve_in(reference, prefix.as_deref(), refs)
    }

    fn resolve_in(&self, reference: &str, prefix: Option<&str>, refs: &RefTable) -> Result<Reference> {
        let (head, attr) = split_reference(reference);
        let attr = attr.map(str::to_string);

        if head.is_empty() {
            // `@attr` on the container itself
            let path = prefix.ok_or_else(|| Error::UnknownPath(reference.to_string()))?;
            return Ok(Reference { path: path.to_string(), attr });
        }

        if head.starts_with(PATH_SIGIL) {
            let path = format!("{}{}", prefix.unwrap_or(""), head);
            if !is_valid_path(&path) || !refs.contains(&path) {
                return Err(Error::UnknownPath(path));
            }
            return Ok(Reference { path, attr });
        }

        let entry = self.aliases.get(head).ok_or_else(|| Error::UnknownAlias(head.to_string()))?;
        if entry.node.is_none() {
            return Err(Error::AliasNotPresent(head.to_string()));
        }
        Ok(Reference {
            path: entry.target.path.clone(),
            attr: attr.or_else(|| entry.target.attr.clone()),
        })
    }
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(vec!["id".to_string(), "name".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PathIndex;

    fn indexed() -> (DomTree, RefTable) {
        // <div id="idea"><h1 name="head"></h1><h3></h3></div>
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let h1 = tree.create_element("h1");
        let h3 = tree.create_element("h3");
        tree.set_attr(div, "id", "idea").unwrap();
        tree.set_attr(h1, "name", "head").unwrap();
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, h1).unwrap();
        tree.append_child(div, h3).unwrap();
        let refs = PathIndex::build(&mut tree, NodeId::ROOT);
        (tree, refs)
    }

    #[test]
    fn test_register_and_resolve() {
        let (_, refs) = indexed();
        let mut aliases = AliasResolver::default();
        aliases.register("subtitle", ":0:1", &refs).unwrap();

        let resolved = aliases.resolve("subtitle", None, &refs).unwrap();
        assert_eq!(resolved, Reference::node(":0:1"));
        assert_eq!(aliases.node("subtitle"), Some(refs.get(":0:1")));
    }

    #[test]
    fn test_register_rejects_bad_names_and_paths() {
        let (_, refs) = indexed();
        let mut aliases = AliasResolver::default();
        assert!(matches!(aliases.register("1st", ":0", &refs), Err(Error::InvalidAliasName(_))));
        assert!(matches!(aliases.register("gone", ":4", &refs), Err(Error::UnknownPath(_))));
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_auto_register_priority() {
        let (mut tree, refs) = indexed();
        let h1 = refs.get(":0:0").unwrap();
        tree.set_attr(h1, "id", "first").unwrap();

        let mut aliases = AliasResolver::default();
        for (path, node) in refs.iter() {
            aliases.auto_register(&tree, node, path);
        }
        assert_eq!(aliases.target("idea"), Some(&Reference::node(":0")));
        assert_eq!(aliases.target("first"), Some(&Reference::node(":0:0")));
        assert!(!aliases.contains("head"));
    }

    #[test]
    fn test_auto_register_skips_invalid_values() {
        let (mut tree, refs) = indexed();
        let h3 = refs.get(":0:1").unwrap();
        tree.set_attr(h3, "id", "42").unwrap();

        let mut aliases = AliasResolver::default();
        aliases.auto_register(&tree, h3, ":0:1");
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_relative_and_attribute_references() {
        let (_, refs) = indexed();
        let mut aliases = AliasResolver::default();
        aliases.register("idea", ":0", &refs).unwrap();

        let r = aliases.resolve("@title", Some(":0"), &refs).unwrap();
        assert_eq!(r.to_string(), ":0@title");
        let r = aliases.resolve("@title", Some("idea"), &refs).unwrap();
        assert_eq!(r.to_string(), ":0@title");
        let r = aliases.resolve(":1@class", Some("idea"), &refs).unwrap();
        assert_eq!(r.to_string(), ":0:1@class");
        assert!(matches!(aliases.resolve("@title", None, &refs), Err(Error::UnknownPath(_))));
    }

    #[test]
    fn test_alias_with_attribute_target() {
        let (_, refs) = indexed();
        let mut aliases = AliasResolver::default();
        aliases.register("headingTitle", ":0:0@title", &refs).unwrap();

        let r = aliases.resolve("headingTitle", None, &refs).unwrap();
        assert_eq!(r.attr.as_deref(), Some("title"));
        let r = aliases.resolve("headingTitle@class", None, &refs).unwrap();
        assert_eq!(r.attr.as_deref(), Some("class"));
    }

    #[test]
    fn test_absent_alias_is_distinct_from_unknown() {
        let (_, refs) = indexed();
        let mut aliases = AliasResolver::default();
        aliases.register("subtitle", ":0:1", &refs).unwrap();

        aliases.reapply(&RefTable::new());
        assert!(aliases.contains("subtitle"));
        assert_eq!(aliases.node("subtitle"), Some(None));
        assert!(matches!(aliases.resolve("subtitle", None, &refs), Err(Error::AliasNotPresent(_))));
        assert!(matches!(aliases.resolve("nope", None, &refs), Err(Error::UnknownAlias(_))));

        aliases.reapply(&refs);
        assert!(aliases.resolve("subtitle", None, &refs).is_ok());
    }
}
