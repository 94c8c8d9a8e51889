//! dompath - path-indexed node trees with incremental rendering
//!
//! Every node below a container gets a positional path (`:0:1` is the
//! second child of the first child). Paths can be given readable aliases,
//! and any path or alias can carry an `@attr` suffix to address an
//! attribute instead of the node.
//!
//! [`RenderEngine`] keeps a template, a working copy and the live
//! container. Changes go into the working copy; [`RenderEngine::render`]
//! copies only the touched subtrees into the live container.
//!
//! ```ignore
//! use dompath::{DomTree, Options, RenderEngine};
//!
//! let mut engine = RenderEngine::from_html("<div><h1></h1></div>", Options::default())?;
//! engine.set_element(DomTree::with_root_element("main"))?;
//! engine.alias("title", ":0:0")?;
//! engine.data("title", "Hello", None, false)?;
//! engine.render()?;
//! ```

mod alias;
mod changeset;
mod container;
mod engine;
mod error;
mod handlers;
mod index;
mod options;
pub mod path;

pub use alias::{AliasResolver, Reference};
pub use changeset::{invert, AttributeChange, ChangeOp};
pub use container::{ContainerState, TreeContainer};
pub use engine::RenderEngine;
pub use error::{Error, Result};
pub use handlers::HandlerRegistry;
pub use index::{PathIndex, RefTable};
pub use options::{Options, OptionsUpdate};

pub use dompath_dom::{DomTree, Event, Listener, NodeId};
