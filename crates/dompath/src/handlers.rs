//! Event handler registry
//!
//! At most one handler per event type, installed on the live container's
//! root. The registry outlives any single live tree: when the container is
//! swapped, handlers come off the old root and go onto the new one.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use dompath_dom::{DomTree, Listener};

use crate::error::{Error, Result};

/// Event type → handler bindings
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Listener>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handler and install it on `live` if a container is attached
    pub fn on(&mut self, event_type: &str, handler: Listener, live: Option<&mut DomTree>) -> Result<()> {
        if self.handlers.contains_key(event_type) {
            return Err(Error::DuplicateHandler(event_type.to_string()));
        }
        if let Some(tree) = live {
            let root = tree.root();
            tree.add_event_listener(root, event_type, Rc::clone(&handler))?;
        }
        self.handlers.insert(event_type.to_string(), handler);
        Ok(())
    }

    /// Remove the handler for one type, or every handler when `event_type` is `None`
    pub fn off(&mut self, event_type: Option<&str>, mut live: Option<&mut DomTree>) -> Result<()> {
        match event_type {
            Some(event_type) => {
                let handler = self.handlers
                    .remove(event_type)
                    .ok_or_else(|| Error::HandlerNotFound(event_type.to_string()))?;
                if let Some(tree) = live.as_deref_mut() {
                    let root = tree.root();
                    tree.remove_event_listener(root, event_type, &handler);
                }
            }
            None => {
                if let Some(tree) = live.as_deref_mut() {
                    self.uninstall_all(tree);
                }
                self.handlers.clear();
            }
        }
        Ok(())
    }

    /// Take every handler off the root of `tree`
    pub fn uninstall_all(&self, tree: &mut DomTree) {
        let root = tree.root();
        for (event_type, handler) in &self.handlers {
            tree.remove_event_listener(root, event_type, handler);
        }
    }

    /// Put every handler on the root of `tree`
    pub fn install_all(&self, tree: &mut DomTree) -> Result<()> {
        let root = tree.root();
        for (event_type, handler) in &self.handlers {
            tree.add_event_listener(root, event_type, Rc::clone(handler))?;
        }
        if !self.handlers.is_empty() {
            tracing::debug!("Installed {} handler(s) on new container", self.handlers.len());
        }
        Ok(())
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered event types, sorted
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dompath_dom::Event;
    use std::cell::Cell;

    fn counting() -> (Listener, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let listener: Listener = Rc::new(move |_: &Event| counter.set(counter.get() + 1));
        (listener, hits)
    }

    #[test]
    fn test_on_rejects_duplicates() {
        let mut registry = HandlerRegistry::new();
        let (a, _) = counting();
        let (b, _) = counting();
        registry.on("click", a, None).unwrap();
        assert!(matches!(registry.on("click", b, None), Err(Error::DuplicateHandler(_))));
    }

    #[test]
    fn test_off_unknown_type() {
        let mut registry = HandlerRegistry::new();
        assert!(matches!(registry.off(Some("click"), None), Err(Error::HandlerNotFound(_))));
        registry.off(None, None).unwrap();
    }

    #[test]
    fn test_swap_moves_handlers() {
        let mut registry = HandlerRegistry::new();
        let mut old = DomTree::with_root_element("div");
        let mut new = DomTree::with_root_element("div");
        let (handler, hits) = counting();
        registry.on("click", handler, Some(&mut old)).unwrap();

        registry.uninstall_all(&mut old);
        registry.install_all(&mut new).unwrap();

        assert_eq!(old.dispatch_event(old.root(), "click").unwrap(), 0);
        assert_eq!(new.dispatch_event(new.root(), "click").unwrap(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_off_all_uninstalls() {
        let mut registry = HandlerRegistry::new();
        let mut live = DomTree::with_root_element("div");
        let (a, _) = counting();
        let (b, _) = counting();
        registry.on("click", a, Some(&mut live)).unwrap();
        registry.on("mouseover", b, Some(&mut live)).unwrap();
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["click", "mouseover"]);

        registry.off(None, Some(&mut live)).unwrap();
        assert!(registry.is_empty());
        assert_eq!(live.listener_count(live.root()), 0);
    }
}
