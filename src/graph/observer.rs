//! Graph Observers
//!
//! Hooks invoked while the graph is built and walked. The default observer
//! forwards everything to `tracing` at debug level; the recording observer
//! keeps the events so callers can inspect what happened.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Edge;

/// Receives graph construction and traversal events
pub trait GraphObserver {
    /// A new edge was inserted
    fn edge_discovered(&self, _edge: &Edge) {}

    /// Traversal followed an edge from `from` towards `to`
    fn edge_walked(&self, _from: &str, _to: &str) {}

    /// Traversal reached `node` again and did not expand it
    fn cycle_broken(&self, _node: &str) {}
}

/// Logs events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GraphObserver for TracingObserver {
    fn edge_discovered(&self, edge: &Edge) {
        tracing::debug!(from = %edge.from, to = %edge.to, collection = edge.is_collection, "discovered edge");
    }

    fn edge_walked(&self, from: &str, to: &str) {
        tracing::debug!(from, to, "walking edge");
    }

    fn cycle_broken(&self, node: &str) {
        tracing::debug!(node, "breaking cycle; already visited");
    }
}

/// Ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GraphObserver for NoopObserver {}

/// A single recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    Discovered { from: String, to: String, is_collection: bool },
    Walked { from: String, to: String },
    CycleBroken { node: String },
}

impl fmt::Display for GraphEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered { from, to, .. } => write!(f, "discovered edge {} -> {}", from, to),
            Self::Walked { from, to } => write!(f, "walking edge {} -> {}", from, to),
            Self::CycleBroken { node } => write!(f, "breaking cycle; already visited {}", node),
        }
    }
}

/// Stores events in a buffer shared between clones
///
/// Keep one clone and hand the other to the graph.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far
    pub fn events(&self) -> Vec<GraphEvent> {
        self.events.borrow().clone()
    }

    /// Nodes at which traversal stopped expanding
    pub fn broken_cycles(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::CycleBroken { node } => Some(node.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, event: GraphEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl GraphObserver for RecordingObserver {
    fn edge_discovered(&self, edge: &Edge) {
        self.push(GraphEvent::Discovered {
            from: edge.from.clone(),
            to: edge.to.clone(),
            is_collection: edge.is_collection,
        });
    }

    fn edge_walked(&self, from: &str, to: &str) {
        self.push(GraphEvent::Walked {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    fn cycle_broken(&self, node: &str) {
        self.push(GraphEvent::CycleBroken { node: node.to_string() });
    }
}
