//! Schema Dependency Graph
//!
//! Edge store built from resolved type references. Every edge is indexed
//! twice: forward under its parent (what a type depends on) and backward
//! under its child (what depends on a type). Keys are always the
//! fully-qualified names; the configured namespace is only stripped when
//! names are handed out for display.
//!
//! Traversals keep their own visited set, so they terminate on cyclic
//! schemas while still reporting every edge they cross.

pub mod analysis;
pub mod loader;
pub mod observer;

pub use analysis::{cycles, search, SearchResult};
pub use loader::{discover, load_file, load_from_directory, load_into, strip_comments, LoadConfig};
pub use observer::{GraphEvent, GraphObserver, NoopObserver, RecordingObserver, TracingObserver};

pub use petgraph::Direction;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::resolve::type_refs;
use crate::schema::SchemaRecord;

/// A directed reference from one type to another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub is_collection: bool,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, is_collection: bool) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            is_collection,
        }
    }

    /// Far endpoint when walking in `direction`
    pub fn endpoint(&self, direction: Direction) -> &str {
        match direction {
            Direction::Outgoing => &self.to,
            Direction::Incoming => &self.from,
        }
    }
}

/// An edge with namespace-trimmed names, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayEdge {
    pub from: String,
    pub to: String,
    pub is_collection: bool,
}

/// The type dependency graph
pub struct DependencyGraph {
    /// Namespace stripped from names on display
    namespace: String,

    /// Forward index: parent -> outbound edges
    children: BTreeMap<String, Vec<Edge>>,

    /// Backward index: child -> inbound edges
    parents: BTreeMap<String, Vec<Edge>>,

    edge_count: usize,

    observer: Box<dyn GraphObserver>,
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("namespace", &self.namespace)
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count)
            .finish()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new("")
    }
}

impl DependencyGraph {
    /// Create an empty graph that logs through `tracing`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_observer(namespace, TracingObserver)
    }

    /// Create an empty graph reporting to a custom observer
    pub fn with_observer(namespace: impl Into<String>, observer: impl GraphObserver + 'static) -> Self {
        Self {
            namespace: namespace.into(),
            children: BTreeMap::new(),
            parents: BTreeMap::new(),
            edge_count: 0,
            observer: Box::new(observer),
        }
    }

    /// Display namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // ========== Construction ==========

    /// Record that `parent` references `child`
    ///
    /// Self-edges and duplicates are kept.
    pub fn add_edge(&mut self, parent: &str, child: &str, is_collection: bool) {
        let edge = Edge::new(parent, child, is_collection);
        self.observer.edge_discovered(&edge);

        self.parents
            .entry(child.to_string())
            .or_default()
            .push(edge.clone());
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(edge);
        self.edge_count += 1;
    }

    /// Insert one edge per reference made by `record`
    ///
    /// Returns the number of edges added.
    pub fn ingest(&mut self, record: &SchemaRecord) -> usize {
        let parent = record.full_name();
        let refs = type_refs(record);
        for type_ref in &refs {
            self.add_edge(&parent, &type_ref.name, type_ref.is_collection);
        }
        refs.len()
    }

    // ========== Naming ==========

    /// Strip the configured namespace from `name`
    pub fn display_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.namespace.as_str()).unwrap_or(name)
    }

    /// Display form of an edge
    pub fn display_edge(&self, edge: &Edge) -> DisplayEdge {
        DisplayEdge {
            from: self.display_name(&edge.from).to_string(),
            to: self.display_name(&edge.to).to_string(),
            is_collection: edge.is_collection,
        }
    }

    /// Map a user-supplied root to a stored name
    ///
    /// Accepts either the full name or its display form. Unknown names
    /// come back unchanged.
    pub fn resolve_root(&self, query: &str) -> String {
        if self.contains(query) {
            return query.to_string();
        }
        let qualified = format!("{}{}", self.namespace, query);
        if self.contains(&qualified) {
            return qualified;
        }
        query.to_string()
    }

    // ========== Queries ==========

    /// Whether `name` appears on either end of any edge
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name) || self.parents.contains_key(name)
    }

    /// All node names, sorted
    pub fn node_names(&self) -> BTreeSet<&str> {
        self.children
            .keys()
            .chain(self.parents.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.node_names().len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Outbound edges of `name`, in insertion order
    pub fn children_of(&self, name: &str) -> &[Edge] {
        self.children.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Inbound edges of `name`, in insertion order
    pub fn parents_of(&self, name: &str) -> &[Edge] {
        self.parents.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every edge, sorted by parent name then insertion order
    pub fn all_edges(&self) -> Vec<&Edge> {
        self.children.values().flatten().collect()
    }

    // ========== Traversal ==========

    /// Report every edge reachable forward from `root` (dependencies)
    pub fn walk_children(&self, root: &str, visit: impl FnMut(&Edge)) {
        self.walk(root, Direction::Outgoing, None, visit);
    }

    /// Report every edge reachable backward from `root` (usages)
    pub fn walk_parents(&self, root: &str, visit: impl FnMut(&Edge)) {
        self.walk(root, Direction::Incoming, None, visit);
    }

    /// Forward walk that follows at most `max_depth` edges from `root`
    pub fn walk_children_depth(&self, root: &str, max_depth: Option<usize>, visit: impl FnMut(&Edge)) {
        self.walk(root, Direction::Outgoing, max_depth, visit);
    }

    /// Backward walk that follows at most `max_depth` edges from `root`
    pub fn walk_parents_depth(&self, root: &str, max_depth: Option<usize>, visit: impl FnMut(&Edge)) {
        self.walk(root, Direction::Incoming, max_depth, visit);
    }

    /// Walk from `root` in `direction`
    ///
    /// Each edge out of an expanded node is reported once per occurrence.
    /// A node is expanded at most once; `root` counts as already expanded.
    /// `None` depth is unbounded.
    pub fn walk(&self, root: &str, direction: Direction, max_depth: Option<usize>, mut visit: impl FnMut(&Edge)) {
        let mut visited = HashSet::new();
        visited.insert(root);
        self.walk_edges(root, direction, max_depth, &mut visited, &mut visit);
    }

    fn walk_edges<'a>(
        &'a self,
        node: &'a str,
        direction: Direction,
        depth: Option<usize>,
        visited: &mut HashSet<&'a str>,
        visit: &mut dyn FnMut(&Edge),
    ) {
        if depth == Some(0) {
            return;
        }
        let index = match direction {
            Direction::Outgoing => &self.children,
            Direction::Incoming => &self.parents,
        };
        let Some(edges) = index.get(node) else {
            return;
        };

        for edge in edges {
            visit(edge);
            let next = edge.endpoint(direction);
            self.observer.edge_walked(node, next);
            if visited.insert(next) {
                self.walk_edges(next, direction, depth.map(|d| d - 1), visited, visit);
            } else {
                self.observer.cycle_broken(next);
            }
        }
    }

    // ========== Boundary helpers ==========

    /// Every edge in display form
    pub fn collect_all(&self) -> Vec<DisplayEdge> {
        self.all_edges()
            .into_iter()
            .map(|e| self.display_edge(e))
            .collect()
    }

    /// Display edges of everything that transitively uses `root`
    pub fn collect_usages(&self, root: &str, max_depth: Option<usize>) -> Vec<DisplayEdge> {
        let mut edges = Vec::new();
        self.walk_parents_depth(root, max_depth, |e| edges.push(self.display_edge(e)));
        edges
    }

    /// Display edges of everything `root` transitively depends on
    pub fn collect_dependencies(&self, root: &str, max_depth: Option<usize>) -> Vec<DisplayEdge> {
        let mut edges = Vec::new();
        self.walk_children_depth(root, max_depth, |e| edges.push(self.display_edge(e)));
        edges
    }
}
