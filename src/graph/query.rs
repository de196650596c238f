//! Scope-aware dependency and dependant queries.
//!
//! All three scopes share one breadth-first traversal over the same edge set:
//! DIRECT stops after one hop, ALL runs to exhaustion and TRANSITIVE keeps
//! only what ALL found beyond the first hop. A visited set makes every query
//! terminate on cyclic graphs.

use crate::errors::Result;
use crate::graph::ir::DependencyGraph;
use crate::resource::{DependencyScope, DependencySummary, Direction};
use petgraph::stable_graph::NodeIndex;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Nodes reachable from `system_id` along `direction`, excluding the node itself.
///
/// Unknown system ids are a caller error.
pub fn query(
    graph: &DependencyGraph,
    scope: DependencyScope,
    system_id: &str,
    direction: Direction,
) -> Result<BTreeSet<DependencySummary>> {
    let start = graph.require(system_id)?;
    let max_depth = match scope {
        DependencyScope::Direct => Some(1),
        DependencyScope::Transitive | DependencyScope::All => None,
    };

    let reached = traverse(graph, start, direction, max_depth);
    let summaries = reached
        .into_iter()
        .filter(|&(_, depth)| scope != DependencyScope::Transitive || depth > 1)
        .map(|(idx, depth)| DependencySummary::new(graph.graph()[idx].system_id(), depth > 1))
        .collect();
    Ok(summaries)
}

pub fn dependencies(
    graph: &DependencyGraph,
    scope: DependencyScope,
    system_id: &str,
) -> Result<BTreeSet<DependencySummary>> {
    query(graph, scope, system_id, Direction::Dependencies)
}

pub fn dependants(
    graph: &DependencyGraph,
    scope: DependencyScope,
    system_id: &str,
) -> Result<BTreeSet<DependencySummary>> {
    query(graph, scope, system_id, Direction::Dependants)
}

/// BFS returning each reached node with its shortest hop count.
fn traverse(
    graph: &DependencyGraph,
    start: NodeIndex,
    direction: Direction,
    max_depth: Option<usize>,
) -> Vec<(NodeIndex, usize)> {
    let inner = graph.graph();
    let direction = petgraph::Direction::from(direction);
    let mut reached = Vec::new();
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);

    while let Some((node, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for next in inner.neighbors_directed(node, direction) {
            if visited.insert(next) {
                reached.push((next, depth + 1));
                queue.push_back((next, depth + 1));
            }
        }
    }

    reached
}
