use crate::graph::ir::DependencyGraph;
use petgraph::algo::tarjan_scc;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashSet;

/// A group of mutually importing resources.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportCycle {
    pub id: usize,
    pub size: usize,
    /// Sorted system ids.
    pub members: Vec<String>,
    pub internal_edges: usize,
}

/// All strongly connected components with more than one member, largest first.
///
/// Self references never become edges, so single-node components are always
/// trivial.
pub fn find_import_cycles(graph: &DependencyGraph) -> Vec<ImportCycle> {
    let inner = graph.graph();
    let mut cycles: Vec<ImportCycle> = tarjan_scc(inner)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let scc_set: HashSet<_> = scc.iter().copied().collect();
            let internal_edges = scc
                .iter()
                .flat_map(|&node| inner.edges_directed(node, petgraph::Direction::Outgoing))
                .filter(|e| scc_set.contains(&e.target()))
                .count();
            let mut members: Vec<String> = scc
                .iter()
                .map(|&idx| inner[idx].system_id().to_string())
                .collect();
            members.sort();
            ImportCycle {
                id: 0,
                size: members.len(),
                members,
                internal_edges,
            }
        })
        .collect();

    cycles.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.members.cmp(&b.members)));
    for (id, cycle) in cycles.iter_mut().enumerate() {
        cycle.id = id;
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceHolder, ResourceType};

    fn graph_of(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            for id in [*from, *to] {
                if !graph.contains(id) {
                    graph.insert(ResourceHolder::resolved(id, ResourceType::Schema, "", Vec::new()));
                }
            }
            graph.add_dependency(from, to).unwrap();
        }
        graph
    }

    #[test]
    fn acyclic_has_no_cycles() {
        let graph = graph_of(&[("a", "b"), ("b", "c")]);
        assert!(find_import_cycles(&graph).is_empty());
    }

    #[test]
    fn cycles_sorted_by_size() {
        let graph = graph_of(&[
            ("a", "b"),
            ("b", "a"),
            ("x", "y"),
            ("y", "z"),
            ("z", "x"),
            ("z", "a"),
        ]);
        let cycles = find_import_cycles(&graph);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].members, vec!["x", "y", "z"]);
        assert_eq!(cycles[0].internal_edges, 3);
        assert_eq!(cycles[1].id, 1);
        assert_eq!(cycles[1].members, vec!["a", "b"]);
    }
}
