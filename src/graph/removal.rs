use crate::errors::Result;
use crate::graph::ir::DependencyGraph;
use crate::graph::query;
use crate::resource::{DependencyScope, ResourceAction, ResourceHolder};
use serde::Serialize;
use std::collections::BTreeSet;

/// Resources to delete for a user selection.
///
/// `direct` is the selection itself; `collateral` is everything else that
/// transitively depends on it and would be left dangling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalPlan {
    direct: BTreeSet<String>,
    collateral: BTreeSet<String>,
}

/// Compute the removal plan for `selected`.
///
/// Every selected system id must be in the graph.
pub fn plan_removal<I, S>(graph: &DependencyGraph, selected: I) -> Result<RemovalPlan>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut direct = BTreeSet::new();
    for system_id in selected {
        let system_id = system_id.as_ref();
        graph.require(system_id)?;
        direct.insert(system_id.to_string());
    }

    let mut collateral = BTreeSet::new();
    for system_id in &direct {
        let dependants = query::dependants(graph, DependencyScope::All, system_id)?;
        collateral.extend(dependants.into_iter().map(|s| s.uri().to_string()));
    }
    collateral.retain(|id| !direct.contains(id));

    tracing::debug!(
        "removal plan: {} selected, {} collateral",
        direct.len(),
        collateral.len()
    );
    Ok(RemovalPlan { direct, collateral })
}

impl RemovalPlan {
    pub fn direct(&self) -> &BTreeSet<String> {
        &self.direct
    }

    pub fn collateral(&self) -> &BTreeSet<String> {
        &self.collateral
    }

    pub fn len(&self) -> usize {
        self.direct.len() + self.collateral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.collateral.is_empty()
    }

    pub fn contains(&self, system_id: &str) -> bool {
        self.direct.contains(system_id) || self.collateral.contains(system_id)
    }

    /// Every planned system id, selection first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.direct
            .iter()
            .chain(self.collateral.iter())
            .map(String::as_str)
    }

    pub fn direct_holders<'g>(&self, graph: &'g DependencyGraph) -> Vec<&'g ResourceHolder> {
        self.direct
            .iter()
            .filter_map(|id| graph.find_by_uri(id))
            .collect()
    }

    pub fn collateral_holders<'g>(&self, graph: &'g DependencyGraph) -> Vec<&'g ResourceHolder> {
        self.collateral
            .iter()
            .filter_map(|id| graph.find_by_uri(id))
            .collect()
    }

    /// Set the DELETE action on every planned holder still in the graph,
    /// without removing anything.
    pub fn mark(&self, graph: &mut DependencyGraph) {
        for id in self.iter() {
            if let Some(holder) = graph.find_by_uri_mut(id) {
                holder.set_action(ResourceAction::Delete);
            }
        }
    }

    /// Remove every planned node and its edges. Nodes already gone are
    /// skipped, so applying a plan twice is the same as applying it once.
    ///
    /// Returns the removed holders.
    pub fn apply(&self, graph: &mut DependencyGraph) -> Vec<ResourceHolder> {
        let removed: Vec<ResourceHolder> =
            self.iter().filter_map(|id| graph.remove(id)).collect();
        if !removed.is_empty() {
            tracing::info!("removed {} resources", removed.len());
        }
        debug_assert!(graph.check_invariants().is_ok());
        removed
    }
}
