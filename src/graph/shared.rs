use crate::errors::Result;
use crate::graph::ir::DependencyGraph;
use crate::graph::query;
use crate::graph::removal::{self, RemovalPlan};
use crate::resource::{DependencyScope, DependencySummary, Direction, ResourceHolder};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Handle to a resolved graph shared between threads.
///
/// Readers work on an immutable snapshot that stays valid after the handle is
/// updated. Writers either swap in a whole new graph or, for removal, copy the
/// current snapshot under the write lock and publish the result.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Arc<DependencyGraph>>>,
}

impl SharedGraph {
    pub fn new(graph: DependencyGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(graph))),
        }
    }

    pub fn snapshot(&self) -> Arc<DependencyGraph> {
        Arc::clone(&*self.inner.read())
    }

    /// Publish a freshly resolved graph, returning the previous one.
    pub fn replace(&self, graph: DependencyGraph) -> Arc<DependencyGraph> {
        std::mem::replace(&mut *self.inner.write(), Arc::new(graph))
    }

    pub fn query(
        &self,
        scope: DependencyScope,
        system_id: &str,
        direction: Direction,
    ) -> Result<BTreeSet<DependencySummary>> {
        query::query(&self.snapshot(), scope, system_id, direction)
    }

    pub fn plan_removal<I, S>(&self, selected: I) -> Result<RemovalPlan>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        removal::plan_removal(&self.snapshot(), selected)
    }

    pub fn mark_removal(&self, plan: &RemovalPlan) {
        let mut guard = self.inner.write();
        plan.mark(Arc::make_mut(&mut *guard));
    }

    /// Apply `plan` while holding the write lock.
    pub fn apply_removal(&self, plan: &RemovalPlan) -> Vec<ResourceHolder> {
        let mut guard = self.inner.write();
        plan.apply(Arc::make_mut(&mut *guard))
    }
}
