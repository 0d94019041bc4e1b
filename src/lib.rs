//! PDSC Dependency Graphs
//!
//! Reads a tree of Pegasus Data Schema (PDSC) files, works out which record
//! types reference which, and answers two questions about the result:
//! what depends on a type (usages) and what a type depends on
//! (dependencies). The answer is rendered as GraphViz DOT.
//!
//! ## Pipeline
//!
//! ```text
//! *.pdsc ──► strip comments ──► SchemaRecord ──► resolve ──► TypeRef*
//!                                                              │
//!                           DOT ◄── render ◄── walk ◄── DependencyGraph
//! ```
//!
//! ## Example
//!
//! ```
//! use pdsc_graph::{DependencyGraph, SchemaRecord};
//!
//! let foo = SchemaRecord::from_json(r#"{
//!     "type": "record", "name": "Foo", "namespace": "com.example",
//!     "fields": [{ "name": "bars", "type": { "type": "array", "items": "Bar" } }]
//! }"#).unwrap();
//!
//! let mut graph = DependencyGraph::new("com.example.");
//! graph.ingest(&foo);
//!
//! let edges = graph.collect_dependencies("com.example.Foo", None);
//! assert_eq!(edges[0].to, "Bar");
//! assert!(edges[0].is_collection);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod render;
pub mod resolve;
pub mod schema;

pub use config::VizConfig;
pub use error::{Result, SchemaError};
pub use graph::{DependencyGraph, DisplayEdge, Edge, GraphObserver, LoadConfig};
pub use render::{render_dot, RenderOptions};
pub use resolve::{qualify, resolve, type_refs, TypeRef};
pub use schema::{Field, SchemaRecord, TypeDescriptor, WrapperKind};
