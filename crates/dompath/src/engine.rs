//! Render engine
//!
//! Keeps three containers in step:
//!
//! - **template**: cleaned snapshot of the source markup or tree
//! - **working**: offscreen copy every mutation is applied to
//! - **live**: the attached container, patched from working on render
//!
//! Mutations record the path they touched in a dirty set. The first render
//! after attaching (or resetting) copies the whole working tree into the
//! live container; later renders only replace the dirty subtrees.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use dompath_dom::{Cleaner, DomTree, Event, NodeId, WhitespaceCleaner};
use dompath_html::{inner_html, HtmlParser};

use crate::changeset::{invert, AttributeChange};
use crate::container::TreeContainer;
use crate::error::{Error, Result};
use crate::handlers::HandlerRegistry;
use crate::options::{Options, OptionsUpdate};
use crate::path::{is_ancestor_path, is_valid_alias};

/// Path-indexed incremental renderer
pub struct RenderEngine {
    options: Options,
    cleaner: Box<dyn Cleaner>,
    parser: HtmlParser,
    template: TreeContainer,
    working: TreeContainer,
    live: Option<TreeContainer>,
    dirty: BTreeSet<String>,
    placed: bool,
    handlers: HandlerRegistry,
}

impl RenderEngine {
    /// Create an engine with an empty template
    pub fn new(options: Options) -> Self {
        let attrs = options.alias_attrs.clone();
        Self {
            options,
            cleaner: Box::new(WhitespaceCleaner),
            parser: HtmlParser::new(),
            template: TreeContainer::new(attrs.clone()),
            working: TreeContainer::new(attrs),
            live: None,
            dirty: BTreeSet::new(),
            placed: false,
            handlers: HandlerRegistry::new(),
        }
    }

    /// Replace the cleaning pass run on new source trees
    pub fn with_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaner = Box::new(cleaner);
        self
    }

    /// Build an engine from markup. Use [`set_element`](Self::set_element)
    /// to give it a container to render into.
    pub fn from_html(html: &str, options: Options) -> Result<Self> {
        let mut engine = Self::new(options);
        engine.set_html(html)?;
        engine.reset(false)?;
        Ok(engine)
    }

    /// Build an engine from an existing container tree. The tree is cleaned,
    /// its children become the template, and the tree itself becomes the
    /// live container.
    pub fn create(mut tree: DomTree, options: Options) -> Result<Self> {
        let mut engine = Self::new(options);
        let root = tree.root();
        engine.cleaner.clean(&mut tree, root, engine.options.comments)?;

        let mut snapshot = DomTree::new();
        let snapshot_root = snapshot.root();
        for (child, _) in tree.children(root) {
            let copy = snapshot.import_subtree(&tree, child)?;
            snapshot.append_child(snapshot_root, copy)?;
        }
        engine.template.adopt(snapshot);

        engine.set_element(tree)?;
        engine.reset(false)?;
        Ok(engine)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Merge option changes into the current options. Keys left unset keep
    /// their value. Alias attributes apply from the next index rebuild.
    pub fn set_options(&mut self, update: OptionsUpdate) {
        self.options.merge(update);
        for container in [&mut self.template, &mut self.working].into_iter().chain(self.live.as_mut()) {
            container.set_alias_attrs(self.options.alias_attrs.clone());
        }
    }

    /// Replace the template with cleaned, parsed markup.
    /// Takes effect in the working copy on the next [`reset`](Self::reset).
    pub fn set_html(&mut self, html: &str) -> Result<()> {
        let mut tree = self.parser.parse_fragment(html)?;
        let root = tree.root();
        self.cleaner.clean(&mut tree, root, self.options.comments)?;
        self.template.adopt(tree);
        Ok(())
    }

    /// Recreate the working copy from the template and drop pending changes.
    /// The next render does a full placement; with `remove` the live
    /// container is emptied right away.
    pub fn reset(&mut self, remove: bool) -> Result<()> {
        self.working.adopt(self.template.clone_tree());
        self.dirty.clear();
        self.placed = false;

        if remove {
            if let Some(live) = self.live.as_mut() {
                live.clear()?;
            }
        }
        tracing::debug!("Reset working copy ({} paths)", self.working.refs().len());
        Ok(())
    }

    /// Attach a new live container. Its root must be an element.
    /// Handlers move from the old container to the new one; the old
    /// container is handed back.
    pub fn set_element(&mut self, tree: DomTree) -> Result<Option<DomTree>> {
        if !tree.get(tree.root()).is_some_and(|root| root.is_element()) {
            return Err(Error::InvalidContainer);
        }

        let previous = self.live.take().map(|mut old| {
            self.handlers.uninstall_all(old.tree_mut());
            old.into_tree()
        });

        let mut live = TreeContainer::from_tree(tree, self.options.alias_attrs.clone());
        live.parse();
        self.handlers.install_all(live.tree_mut())?;
        self.live = Some(live);
        self.placed = false;
        Ok(previous)
    }

    /// The attached container tree
    pub fn element(&self) -> Option<&DomTree> {
        self.live.as_ref().map(TreeContainer::tree)
    }

    pub fn template(&self) -> &TreeContainer {
        &self.template
    }

    pub fn working(&self) -> &TreeContainer {
        &self.working
    }

    pub fn live(&self) -> Option<&TreeContainer> {
        self.live.as_ref()
    }

    /// Whether the live container holds a full placement of the working copy
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Alias a working-copy path (`path` or `path@attr`)
    pub fn alias(&mut self, name: &str, target: &str) -> Result<()> {
        self.working.register_alias(name, target)
    }

    /// Resolve a reference against the working copy to `path` or `path@attr`
    pub fn dealias(&self, reference: &str, container: Option<&str>) -> Result<String> {
        self.working.dealias(reference, container)
    }

    /// Working-copy node for a path or alias
    pub fn get(&self, reference: &str) -> Result<NodeId> {
        self.working.get(reference)
    }

    /// Path of a working-copy node
    pub fn path(&self, node: NodeId) -> Option<String> {
        self.working.path_of(node)
    }

    /// Path → node map for a set of working-copy nodes
    pub fn paths(&self, nodes: &[NodeId]) -> BTreeMap<String, NodeId> {
        self.working.paths_of(nodes)
    }

    /// Inner markup of a working-copy node
    pub fn inner_html(&self, reference: &str) -> Result<String> {
        self.working.inner_html(reference)
    }

    pub fn outer_html(&self, reference: &str) -> Result<String> {
        self.working.outer_html(reference)
    }

    /// Markup of the whole working copy
    pub fn html(&self) -> String {
        self.working.html()
    }

    /// Set (or append to) the content a reference points at.
    ///
    /// `ref@attr` targets an attribute; otherwise text nodes get their value
    /// replaced and elements their inner markup. `container` makes a path
    /// reference relative to another reference.
    pub fn data(&mut self, reference: &str, value: &str, container: Option<&str>, append: bool) -> Result<()> {
        let target = self.working.resolve(reference, container)?;
        let node = self.working.node(&target.path)?;

        match &target.attr {
            Some(attr) => {
                // HTML attribute names are case-insensitive
                let attr = attr.to_ascii_lowercase();
                let tree = self.working.tree_mut();
                let next = match tree.attr(node, &attr) {
                    Some(current) if append => format!("{current}{value}"),
                    _ => value.to_string(),
                };
                tree.set_attr(node, &attr, next.as_str())
                    .map_err(|_| Error::NotAnElement(target.path.clone()))?;

                if self.working.aliases().is_alias_attr(&attr) {
                    if is_valid_alias(&next) {
                        self.working.register_alias(&next, &target.path)?;
                    } else {
                        tracing::warn!("Attribute {} at {} is not a valid alias: {:?}", attr, target.path, next);
                    }
                }
            }
            None => {
                let tree = self.working.tree_mut();
                if let Some(current) = tree.text(node) {
                    let next = if append { format!("{current}{value}") } else { value.to_string() };
                    tree.set_text(node, next)?;
                } else {
                    let markup = if append { format!("{}{}", inner_html(tree, node), value) } else { value.to_string() };
                    tree.clear_children(node)?;
                    self.parser.parse_into(tree, node, &markup)?;
                    self.working.parse();
                }
            }
        }

        tracing::trace!("Marked {} dirty", target.path);
        self.dirty.insert(target.path);
        Ok(())
    }

    /// Apply an attribute changeset to the working copy, change by change.
    /// On error, earlier changes stay applied.
    pub fn set_attributes(&mut self, changes: &[AttributeChange]) -> Result<()> {
        for change in changes {
            let target = self.working.resolve(&change.path, None)?;
            let node = self.working.node(&target.path)?;
            if !self.working.tree().get(node).is_some_and(|n| n.is_element()) {
                return Err(Error::NotAnElement(target.path));
            }
            change.apply(self.working.tree_mut(), node)?;
            self.dirty.insert(target.path);
        }
        Ok(())
    }

    /// Apply the inverse of a changeset. Best effort: exact only when the
    /// forward changes did not hit edge cases (e.g. removing from an empty
    /// attribute).
    pub fn revert_attributes(&mut self, changes: &[AttributeChange]) -> Result<()> {
        self.set_attributes(&invert(changes))
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.contains(path)
    }

    /// Pending paths, sorted
    pub fn dirty_paths(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Bring the live container up to date with the working copy
    pub fn render(&mut self) -> Result<()> {
        let live = self.live.as_mut().ok_or(Error::ContainerNotSet)?;

        if !self.placed {
            live.clear()?;
            let live_root = live.root();
            let working = self.working.tree();
            for (child, _) in working.children(working.root()) {
                let copy = live.tree_mut().import_subtree(working, child)?;
                live.tree_mut().append_child(live_root, copy)?;
            }
            live.parse();
            self.placed = true;
            self.dirty.clear();
            tracing::debug!("Full placement: {} path(s)", live.refs().len());
            return Ok(());
        }

        if self.dirty.is_empty() {
            return Ok(());
        }

        // Sorted order puts ancestors before their descendants. Every target
        // is looked up before the live tree is touched.
        let mut plan: Vec<(&str, NodeId, NodeId)> = Vec::new();
        for path in &self.dirty {
            if plan.iter().any(|(done, ..)| is_ancestor_path(done, path)) {
                continue;
            }
            let Some(source) = self.working.refs().get(path) else {
                tracing::trace!("Skipping {}: gone from working copy", path);
                continue;
            };
            let Some(old) = live.refs().get(path) else {
                tracing::error!("Live tree out of sync: no node at {}", path);
                return Err(Error::MissingLiveNode(path.clone()));
            };
            plan.push((path.as_str(), source, old));
        }

        let applied = replace_subtrees(live.tree_mut(), self.working.tree(), &plan);
        live.parse();
        applied?;

        tracing::debug!("Rendered {} of {} dirty path(s)", plan.len(), self.dirty.len());
        self.dirty.clear();
        Ok(())
    }

    /// Register the handler for an event type on the live container
    pub fn on(&mut self, event_type: &str, handler: impl Fn(&Event) + 'static) -> Result<()> {
        let live = self.live.as_mut().map(TreeContainer::tree_mut);
        self.handlers.on(event_type, Rc::new(handler), live)
    }

    /// Remove the handler for one event type, or all handlers
    pub fn off(&mut self, event_type: Option<&str>) -> Result<()> {
        let live = self.live.as_mut().map(TreeContainer::tree_mut);
        self.handlers.off(event_type, live)
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Deliver an event in the live container at a reference (default: the
    /// container root). Returns the number of handlers invoked.
    pub fn dispatch(&self, reference: Option<&str>, event_type: &str) -> Result<usize> {
        let live = self.live.as_ref().ok_or(Error::ContainerNotSet)?;
        let target = match reference {
            Some(reference) => live.get(reference)?,
            None => live.root(),
        };
        Ok(live.tree().dispatch_event(target, event_type)?)
    }
}

/// Swap each planned live node for a copy of its working subtree
fn replace_subtrees(live: &mut DomTree, working: &DomTree, plan: &[(&str, NodeId, NodeId)]) -> Result<()> {
    for &(path, source, old) in plan {
        let copy = live.import_subtree(working, source)?;
        live.replace_child(old, copy)?;
        live.remove(old)?;
        tracing::trace!("Replaced {}", path);
    }
    Ok(())
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("options", &self.options)
            .field("template", &self.template)
            .field("working", &self.working)
            .field("live", &self.live)
            .field("dirty", &self.dirty)
            .field("placed", &self.placed)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}
