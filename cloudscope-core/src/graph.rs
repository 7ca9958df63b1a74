//! Index graph over a [`ScanResult`].
//!
//! Node weights are positions in `ScanResult::nodes`, so graph indices and
//! simulation indices line up. Links are resolved by resource id; a link that
//! names an unknown id is dropped.

use crate::model::ScanResult;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{Span, debug};

#[derive(Debug, Clone)]
pub struct ScanGraph {
    graph: DiGraph<usize, Option<String>>,
}

impl ScanGraph {
    /// Unresolved links are logged under `span`.
    pub fn build(result: &ScanResult, span: &Span) -> Self {
        let mut graph = DiGraph::with_capacity(result.nodes.len(), result.links.len());
        let mut by_id: HashMap<&str, NodeIndex> = HashMap::with_capacity(result.nodes.len());

        for (i, resource) in result.nodes.iter().enumerate() {
            let idx = graph.add_node(i);
            // Duplicate ids across categories: links bind to the first one.
            by_id.entry(resource.id.as_str()).or_insert(idx);
        }

        for link in &result.links {
            match (by_id.get(link.source.as_str()), by_id.get(link.target.as_str())) {
                (Some(&a), Some(&b)) => {
                    graph.add_edge(a, b, link.kind.clone());
                }
                _ => debug!(
                    parent: span,
                    source = %link.source,
                    target = %link.target,
                    "Dropping unresolved link"
                ),
            }
        }

        Self { graph }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolved links as `(source, target)` node positions.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
            .collect()
    }
}
