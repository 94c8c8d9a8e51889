//! Error types

use dompath_dom::DomError;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors
///
/// Every variant except [`Error::MissingLiveNode`] reports a bad reference or
/// an out-of-order call by the caller. `MissingLiveNode` means the live tree
/// and its index went out of sync.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid alias: {0}")]
    InvalidAliasName(String),

    #[error("Unknown alias {0}")]
    UnknownAlias(String),

    #[error("Alias {0} does not point at a node in the current tree")]
    AliasNotPresent(String),

    #[error("Unknown path: {0}")]
    UnknownPath(String),

    #[error("Removing from attribute {name} at {path} requires a value")]
    MissingValue { path: String, name: String },

    #[error("Value {val} not found in attribute {name} at {path}")]
    ValueNotFound { path: String, name: String, val: String },

    #[error("Handler already defined for {0}")]
    DuplicateHandler(String),

    #[error("No event handler installed for {0}")]
    HandlerNotFound(String),

    #[error("Container element not set, use set_element() first")]
    ContainerNotSet,

    #[error("Container root must be an element")]
    InvalidContainer,

    #[error("Node at {0} is not an element")]
    NotAnElement(String),

    #[error("Live tree has no node at {0}")]
    MissingLiveNode(String),

    #[error("Invalid descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] DomError),
}
