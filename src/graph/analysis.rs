//! Schema Graph Analysis
//!
//! Cycle groups (strongly connected components) and fuzzy name search over
//! a built [`DependencyGraph`].

use std::collections::HashMap;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::DependencyGraph;

/// Groups of types that reference each other, directly or transitively
///
/// A type that references itself forms a group of one. Names inside a
/// group are sorted, and groups are sorted by their first name.
pub fn cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let names = graph.node_names();
    let mut digraph: DiGraph<&str, ()> = DiGraph::with_capacity(names.len(), graph.edge_count());
    let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(names.len());

    for name in names {
        indices.insert(name, digraph.add_node(name));
    }
    for edge in graph.all_edges() {
        if let (Some(&from), Some(&to)) = (indices.get(edge.from.as_str()), indices.get(edge.to.as_str())) {
            digraph.update_edge(from, to, ());
        }
    }

    let mut groups: Vec<Vec<String>> = kosaraju_scc(&digraph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || digraph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut group: Vec<String> = scc
                .into_iter()
                .filter_map(|idx| digraph.node_weight(idx).map(|n| n.to_string()))
                .collect();
            group.sort();
            group
        })
        .collect();
    groups.sort();
    groups
}

/// Search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Stored, fully-qualified name
    pub name: String,
    pub score: i64,
}

/// Fuzzy-match `query` against node names, best first
///
/// Both the stored name and its display form are matched.
pub fn search(graph: &DependencyGraph, query: &str, limit: usize) -> Vec<SearchResult> {
    let matcher = SkimMatcherV2::default();
    let mut results: Vec<SearchResult> = graph
        .node_names()
        .into_iter()
        .filter_map(|name| {
            let score = matcher
                .fuzzy_match(graph.display_name(name), query)
                .max(matcher.fuzzy_match(name, query))?;
            Some(SearchResult {
                name: name.to_string(),
                score,
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles() {
        let mut graph = DependencyGraph::default();
        graph.add_edge("B", "A", false);
        graph.add_edge("A", "B", false);
        graph.add_edge("B", "C", false);
        graph.add_edge("Node", "Node", false);

        assert_eq!(
            cycles(&graph),
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["Node".to_string()],
            ]
        );
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let mut graph = DependencyGraph::default();
        graph.add_edge("A", "B", false);
        graph.add_edge("A", "B", true);
        assert!(cycles(&graph).is_empty());
    }

    #[test]
    fn test_search_prefers_close_names() {
        let mut graph = DependencyGraph::new("com.example.");
        graph.add_edge("com.example.Profile", "com.example.Address", false);
        graph.add_edge("com.example.Profile", "com.example.Photo", true);

        let results = search(&graph, "Adress", 2);
        assert!(!results.is_empty());
        assert_eq!(results[0].name, "com.example.Address");
        assert!(search(&graph, "zzzz", 5).is_empty());
    }
}
