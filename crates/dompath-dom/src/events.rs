//! Events
//!
//! Per-node listeners and bubbling dispatch (target → root).

use std::cell::Cell;
use std::rc::Rc;

use crate::{DomError, DomResult, DomTree, NodeId};

/// Event callback
pub type Listener = Rc<dyn Fn(&Event)>;

/// Event delivered to listeners
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub bubbles: bool,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create a bubbling event
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            bubbles: true,
            propagation_stopped: Cell::new(false),
        }
    }

    /// Stop propagation to further ancestors
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl DomTree {
    /// Install a listener on a node
    pub fn add_event_listener(&mut self, node: NodeId, event_type: &str, listener: Listener) -> DomResult<()> {
        self.get(node).ok_or(DomError::NotFound(node))?;
        self.listeners
            .entry(node)
            .or_default()
            .push((event_type.to_string(), listener));
        Ok(())
    }

    /// Remove a specific listener; returns false if it was not installed
    pub fn remove_event_listener(&mut self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        let Some(list) = self.listeners.get_mut(&node) else {
            return false;
        };
        let before = list.len();
        list.retain(|(ty, l)| !(ty == event_type && Rc::ptr_eq(l, listener)));
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&node);
        }
        removed
    }

    /// Number of listeners installed on a node
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }

    /// Dispatch an event at `target`, bubbling up to the root.
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, target: NodeId, event_type: &str) -> DomResult<usize> {
        self.get(target).ok_or(DomError::NotFound(target))?;
        let mut event = Event::new(event_type, target);
        let mut invoked = 0;
        let mut current = target;

        while current.is_valid() {
            event.current_target = current;
            let matching: Vec<Listener> = self.listeners
                .get(&current)
                .into_iter()
                .flatten()
                .filter(|(ty, _)| ty == event_type)
                .map(|(_, l)| Rc::clone(l))
                .collect();
            for listener in matching {
                listener(&event);
                invoked += 1;
            }
            if !event.bubbles || event.is_propagation_stopped() {
                break;
            }
            current = self.get(current).map_or(NodeId::NONE, |n| n.parent);
        }

        tracing::trace!("Dispatched {} to {:?}: {} listener(s)", event_type, target, invoked);
        Ok(invoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_bubbles_to_root() {
        let mut tree = DomTree::with_root_element("div");
        let p = tree.create_element("p");
        tree.append_child(tree.root(), p).unwrap();

        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let listener: Listener = Rc::new(move |_ev: &Event| counter.set(counter.get() + 1));
        tree.add_event_listener(tree.root(), "click", listener).unwrap();

        assert_eq!(tree.dispatch_event(p, "click").unwrap(), 1);
        assert_eq!(tree.dispatch_event(p, "mouseover").unwrap(), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_stop_propagation() {
        let mut tree = DomTree::with_root_element("div");
        let p = tree.create_element("p");
        tree.append_child(tree.root(), p).unwrap();

        let root_hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&root_hits);
        tree.add_event_listener(p, "click", Rc::new(|ev: &Event| ev.stop_propagation())).unwrap();
        tree.add_event_listener(tree.root(), "click", Rc::new(move |_: &Event| counter.set(counter.get() + 1))).unwrap();

        assert_eq!(tree.dispatch_event(p, "click").unwrap(), 1);
        assert_eq!(root_hits.get(), 0);
    }

    #[test]
    fn test_remove_listener_by_identity() {
        let mut tree = DomTree::with_root_element("div");
        let a: Listener = Rc::new(|_: &Event| {});
        let b: Listener = Rc::new(|_: &Event| {});
        tree.add_event_listener(tree.root(), "click", Rc::clone(&a)).unwrap();

        assert!(!tree.remove_event_listener(tree.root(), "click", &b));
        assert!(tree.remove_event_listener(tree.root(), "click", &a));
        assert_eq!(tree.listener_count(tree.root()), 0);
    }

    #[test]
    fn test_clone_drops_listeners() {
        let mut tree = DomTree::with_root_element("div");
        tree.add_event_listener(tree.root(), "click", Rc::new(|_: &Event| {})).unwrap();
        let copy = tree.clone();
        assert_eq!(copy.listener_count(copy.root()), 0);
    }
}
