//! Engine options

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Engine configuration
///
/// Missing keys take their defaults when decoded, so a partial document
/// like `{"comments": false}` only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Keep comments as addressable (empty) text nodes instead of dropping them
    pub comments: bool,
    /// Attributes whose values become aliases, in priority order
    pub alias_attrs: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            comments: true,
            alias_attrs: vec!["id".to_string(), "name".to_string()],
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_alias_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    /// Decode options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overwrite the keys `update` sets
    pub fn merge(&mut self, update: OptionsUpdate) {
        if let Some(comments) = update.comments {
            self.comments = comments;
        }
        if let Some(alias_attrs) = update.alias_attrs {
            self.alias_attrs = alias_attrs;
        }
    }
}

/// Partial options; unset keys leave the current value alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_attrs: Option<Vec<String>>,
}

impl OptionsUpdate {
    pub fn comments(comments: bool) -> Self {
        Self { comments: Some(comments), ..Self::default() }
    }

    pub fn alias_attrs<I, S>(attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alias_attrs: Some(attrs.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Decode an update from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert!(opts.comments);
        assert_eq!(opts.alias_attrs, vec!["id", "name"]);
    }

    #[test]
    fn test_partial_json() {
        let opts = Options::from_json(r#"{"comments": false}"#).unwrap();
        assert!(!opts.comments);
        assert_eq!(opts.alias_attrs, Options::default().alias_attrs);

        let opts = Options::from_json(r#"{"alias_attrs": ["data-ref"]}"#).unwrap();
        assert!(opts.comments);
        assert_eq!(opts.alias_attrs, vec!["data-ref"]);
    }

    #[test]
    fn test_merge_keeps_unset_keys() {
        let mut opts = Options::new().with_alias_attrs(["data-ref"]);
        opts.merge(OptionsUpdate::comments(false));
        assert!(!opts.comments);
        assert_eq!(opts.alias_attrs, vec!["data-ref"]);

        opts.merge(OptionsUpdate::from_json(r#"{"alias_attrs": ["id"]}"#).unwrap());
        assert!(!opts.comments);
        assert_eq!(opts.alias_attrs, vec!["id"]);

        opts.merge(OptionsUpdate::default());
        assert_eq!(opts, Options { comments: false, alias_attrs: vec!["id".to_string()] });
    }

    #[test]
    fn test_builders() {
        let opts = Options::new().with_comments(false).with_alias_attrs(["name"]);
        assert_eq!(opts, Options { comments: false, alias_attrs: vec!["name".to_string()] });
    }
}
