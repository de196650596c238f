use crate::errors::{GraphInvariantError, ResgraphError, Result};
use crate::resource::ResourceHolder;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Underlying storage: an edge `a -> b` means `a` references `b`.
///
/// Stable indices survive node removal, so the system id index never needs
/// rebuilding.
pub type ResourceGraph = StableDiGraph<ResourceHolder, ()>;

/// Directed dependency graph keyed by system id.
///
/// Outbound edges are the `dependencies` of a node and inbound edges its
/// `dependants`; both views come from the same edge set, so one is always
/// the transpose of the other.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: ResourceGraph,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, system_id: &str) -> bool {
        self.index.contains_key(system_id)
    }

    /// Exact, case-sensitive lookup by system id.
    pub fn find_by_uri(&self, system_id: &str) -> Option<&ResourceHolder> {
        self.index.get(system_id).map(|&idx| &self.graph[idx])
    }

    pub fn find_by_uri_mut(&mut self, system_id: &str) -> Option<&mut ResourceHolder> {
        self.index.get(system_id).map(|&idx| &mut self.graph[idx])
    }

    /// All holders in insertion order.
    pub fn holders(&self) -> impl Iterator<Item = &ResourceHolder> {
        self.graph.node_weights()
    }

    /// Holders the caller should save (resolved and marked add or update).
    pub fn persistable(&self) -> impl Iterator<Item = &ResourceHolder> {
        self.holders().filter(|h| h.is_persist())
    }

    /// Insert a holder, replacing any holder with the same system id.
    ///
    /// Replacement keeps the node's edges in both directions.
    pub fn insert(&mut self, holder: ResourceHolder) -> NodeIndex {
        if let Some(&idx) = self.index.get(holder.system_id()) {
            self.graph[idx] = holder;
            return idx;
        }
        let system_id = holder.system_id().to_string();
        let idx = self.graph.add_node(holder);
        self.index.insert(system_id, idx);
        idx
    }

    /// Record that `from` references `to`. Both must already be present.
    ///
    /// Returns false when the edge already existed or would be a self loop.
    /// Self loops are never stored, so a document that imports itself does
    /// not appear among its own direct dependencies; the builder records the
    /// self reference as a warning on the holder instead.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<bool> {
        let from_idx = self.require(from)?;
        let to_idx = self.require(to)?;
        if from_idx == to_idx || self.graph.find_edge(from_idx, to_idx).is_some() {
            return Ok(false);
        }
        tracing::trace!("edge {from} -> {to}");
        self.graph.add_edge(from_idx, to_idx, ());
        Ok(true)
    }

    /// Drop every outbound edge of `system_id`, leaving its dependants intact.
    pub fn clear_dependencies(&mut self, system_id: &str) -> Result<()> {
        let idx = self.require(system_id)?;
        let edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for edge in edges {
            self.graph.remove_edge(edge);
        }
        Ok(())
    }

    /// Remove a node together with every edge touching it.
    pub fn remove(&mut self, system_id: &str) -> Option<ResourceHolder> {
        let idx = self.index.remove(system_id)?;
        self.graph.remove_node(idx)
    }

    /// Direct outbound references of a node, empty if unknown.
    pub fn dependencies_of(&self, system_id: &str) -> BTreeSet<&str> {
        self.adjacent(system_id, Direction::Outgoing)
    }

    /// Direct inbound references of a node, empty if unknown.
    pub fn dependants_of(&self, system_id: &str) -> BTreeSet<&str> {
        self.adjacent(system_id, Direction::Incoming)
    }

    /// Every edge as `(from, to)`, sorted.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].system_id(),
                    self.graph[e.target()].system_id(),
                )
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub(crate) fn node_index(&self, system_id: &str) -> Option<NodeIndex> {
        self.index.get(system_id).copied()
    }

    pub(crate) fn require(&self, system_id: &str) -> Result<NodeIndex> {
        self.node_index(system_id)
            .ok_or_else(|| ResgraphError::UnknownResource {
                system_id: system_id.to_string(),
            })
    }

    fn adjacent(&self, system_id: &str, direction: Direction) -> BTreeSet<&str> {
        match self.node_index(system_id) {
            Some(idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].system_id())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Verify the system id index and the node set agree and edges are unique.
    pub fn check_invariants(&self) -> std::result::Result<(), GraphInvariantError> {
        for (system_id, &idx) in &self.index {
            match self.graph.node_weight(idx) {
                None => {
                    return Err(GraphInvariantError::StaleIndex {
                        system_id: system_id.clone(),
                    })
                }
                Some(holder) if holder.system_id() != system_id => {
                    return Err(GraphInvariantError::MismatchedIndex {
                        system_id: system_id.clone(),
                        found: holder.system_id().to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        for idx in self.graph.node_indices() {
            let system_id = self.graph[idx].system_id();
            if self.index.get(system_id) != Some(&idx) {
                return Err(GraphInvariantError::OrphanedNode {
                    system_id: system_id.to_string(),
                });
            }
        }
        let mut seen = HashSet::new();
        for edge in self.graph.edge_references() {
            if !seen.insert((edge.source(), edge.target())) {
                return Err(GraphInvariantError::DuplicateEdge {
                    from: self.graph[edge.source()].system_id().to_string(),
                    to: self.graph[edge.target()].system_id().to_string(),
                });
            }
        }
        Ok(())
    }
}
