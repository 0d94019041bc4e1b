//! GraphViz DOT rendering
//!
//! Turns display edges into a `digraph`. Collection references are drawn in
//! red; everything else uses the default edge style.

use regex::Regex;

use crate::graph::DisplayEdge;

/// Colour used for edges reached through a map or array
pub const COLLECTION_COLOR: &str = "#ff0000";

/// Options for [`render_dot`]
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Extra graph attributes, emitted verbatim
    pub graph_attrs: Option<String>,
    /// Root node for radial layouts
    pub root: Option<String>,
    /// Drop edge statements matching this pattern
    pub exclude: Option<Regex>,
}

/// DOT statement for one edge
pub fn edge_statement(edge: &DisplayEdge) -> String {
    let mut attrs = Vec::new();
    if edge.is_collection {
        attrs.push(format!("color=\"{}\"", COLLECTION_COLOR));
    }
    format!("\"{}\"->\"{}\" [{}]", edge.from, edge.to, attrs.join(", "))
}

/// Render `edges` as a DOT document
pub fn render_dot(edges: &[DisplayEdge], options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("digraph G {\n");
    output.push_str("  node [shape=\"box\"];\n");
    output.push_str("  fontsize=11.0;\n");
    output.push_str("  overlap=prism;\n");
    if let Some(attrs) = options.graph_attrs.as_deref().filter(|a| !a.is_empty()) {
        output.push_str(&format!("  {};\n", attrs));
    }
    if let Some(root) = options.root.as_deref().filter(|r| !r.is_empty()) {
        output.push_str(&format!("  root=\"{}\";\n", root));
    }

    let mut excluded = 0usize;
    for edge in edges {
        let statement = edge_statement(edge);
        if options.exclude.as_ref().is_some_and(|re| re.is_match(&statement)) {
            excluded += 1;
            continue;
        }
        output.push_str(&format!("  {};\n", statement));
    }
    if excluded > 0 {
        tracing::debug!(excluded, "excluded edges");
    }

    output.push_str("}\n");
    output
}
