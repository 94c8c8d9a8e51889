//! Attribute changesets
//!
//! A changeset is a list of `{op, path, name, val?}` descriptors. Attribute
//! values are treated as space-separated token lists: `add`/`change` append a
//! token, `remove` takes one out.

use dompath_dom::{DomTree, NodeId, TokenList};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Changeset operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Add,
    Change,
    Remove,
}

impl ChangeOp {
    /// Operation that undoes this one
    pub fn inverse(self) -> Self {
        match self {
            ChangeOp::Add | ChangeOp::Change => ChangeOp::Remove,
            ChangeOp::Remove => ChangeOp::Add,
        }
    }
}

/// One attribute change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub op: ChangeOp,
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

impl AttributeChange {
    pub fn new(op: ChangeOp, path: &str, name: &str, val: Option<&str>) -> Self {
        Self {
            op,
            path: path.to_string(),
            name: name.to_string(),
            val: val.map(str::to_string),
        }
    }

    pub fn add(path: &str, name: &str, val: &str) -> Self {
        Self::new(ChangeOp::Add, path, name, Some(val))
    }

    pub fn change(path: &str, name: &str, val: &str) -> Self {
        Self::new(ChangeOp::Change, path, name, Some(val))
    }

    pub fn remove(path: &str, name: &str, val: &str) -> Self {
        Self::new(ChangeOp::Remove, path, name, Some(val))
    }

    /// Same change with the operation inverted
    pub fn inverted(&self) -> Self {
        Self { op: self.op.inverse(), ..self.clone() }
    }

    /// Decode a JSON array of change descriptors
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode change descriptors as a JSON array
    pub fn list_to_json(changes: &[Self]) -> Result<String> {
        Ok(serde_json::to_string(changes)?)
    }

    /// Apply to an element
    pub(crate) fn apply(&self, tree: &mut DomTree, node: NodeId) -> Result<()> {
        match self.op {
            ChangeOp::Add | ChangeOp::Change => self.append_value(tree, node),
            ChangeOp::Remove => self.remove_value(tree, node),
        }
    }

    fn append_value(&self, tree: &mut DomTree, node: NodeId) -> Result<()> {
        let val = self.val.as_deref().unwrap_or("");
        let next = match tree.attr(node, &self.name) {
            Some(current) if !current.is_empty() && !val.is_empty() => format!("{current} {val}"),
            Some(current) if !current.is_empty() => current.to_string(),
            _ => val.to_string(),
        };
        tree.set_attr(node, &self.name, next)?;
        Ok(())
    }

    fn remove_value(&self, tree: &mut DomTree, node: NodeId) -> Result<()> {
        let val = self.val.as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingValue { path: self.path.clone(), name: self.name.clone() })?;

        let Some(current) = tree.attr(node, &self.name).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        let mut tokens = TokenList::from_string(current);
        if !tokens.remove_first(val) {
            return Err(Error::ValueNotFound {
                path: self.path.clone(),
                name: self.name.clone(),
                val: val.to_string(),
            });
        }

        if tokens.is_empty() {
            tree.remove_attr(node, &self.name)?;
        } else {
            tree.set_attr(node, &self.name, tokens.value())?;
        }
        Ok(())
    }
}

/// Changeset that undoes `changes`: each entry inverted, in reverse order
pub fn invert(changes: &[AttributeChange]) -> Vec<AttributeChange> {
    changes.iter().rev().map(AttributeChange::inverted).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(class: Option<&str>) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let h3 = tree.create_element("h3");
        if let Some(class) = class {
            tree.set_attr(h3, "class", class).unwrap();
        }
        tree.append_child(tree.root(), h3).unwrap();
        (tree, h3)
    }

    #[test]
    fn test_add_appends_token() {
        let (mut tree, h3) = element(Some("sub title"));
        AttributeChange::add(":0", "class", "test").apply(&mut tree, h3).unwrap();
        assert_eq!(tree.attr(h3, "class"), Some("sub title test"));
    }

    #[test]
    fn test_add_sets_absent_attribute() {
        let (mut tree, h3) = element(None);
        AttributeChange::change(":0", "class", "x").apply(&mut tree, h3).unwrap();
        assert_eq!(tree.attr(h3, "class"), Some("x"));
    }

    #[test]
    fn test_remove_token() {
        let (mut tree, h3) = element(Some("sub title"));
        AttributeChange::remove(":0", "class", "sub").apply(&mut tree, h3).unwrap();
        assert_eq!(tree.attr(h3, "class"), Some("title"));

        AttributeChange::remove(":0", "class", "title").apply(&mut tree, h3).unwrap();
        assert_eq!(tree.attr(h3, "class"), None);
    }

    #[test]
    fn test_remove_errors() {
        let (mut tree, h3) = element(Some("sub title"));
        let missing = AttributeChange::new(ChangeOp::Remove, ":0", "class", None);
        assert!(matches!(missing.apply(&mut tree, h3), Err(Error::MissingValue { .. })));

        let absent = AttributeChange::remove(":0", "class", "not-exist");
        assert!(matches!(absent.apply(&mut tree, h3), Err(Error::ValueNotFound { .. })));
        assert_eq!(tree.attr(h3, "class"), Some("sub title"));
    }

    #[test]
    fn test_remove_on_empty_is_noop() {
        let (mut tree, h3) = element(Some(""));
        AttributeChange::remove(":0", "class", "x").apply(&mut tree, h3).unwrap();
        assert_eq!(tree.attr(h3, "class"), Some(""));
    }

    #[test]
    fn test_invert_reverses_and_flips() {
        let changes = vec![
            AttributeChange::add(":0", "class", "a"),
            AttributeChange::remove(":1", "class", "b"),
        ];
        let inverted = invert(&changes);
        assert_eq!(inverted[0], AttributeChange::add(":1", "class", "b"));
        assert_eq!(inverted[1], AttributeChange::remove(":0", "class", "a"));
    }

    #[test]
    fn test_descriptor_format() {
        let json = r#"[{"op":"remove","path":":0:1","name":"class","val":"sub"},{"op":"add","path":":0","name":"hidden"}]"#;
        let changes = AttributeChange::list_from_json(json).unwrap();
        assert_eq!(changes[0], AttributeChange::remove(":0:1", "class", "sub"));
        assert_eq!(changes[1].val, None);
        assert_eq!(AttributeChange::list_to_json(&changes).unwrap(), json);

        assert!(matches!(
            AttributeChange::list_from_json(r#"[{"op":"toggle","path":":0","name":"x"}]"#),
            Err(Error::Descriptor(_))
        ));
    }
}
