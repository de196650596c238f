use crate::errors::{ResgraphError, Result};
use crate::extract::xml::XSD_NS;
use crate::extract::{canonical_uri, ReferenceExtractor, XmlReferenceExtractor};
use crate::fetch::{FetchedResource, ResourceFetcher};
use crate::graph::ir::DependencyGraph;
use crate::graph::known::KnownResources;
use crate::graph::policy::{ConflictChoice, MissingChoice, ResolvePolicy};
use crate::graph::removal::plan_removal;
use crate::resource::{
    Checksum, FailureKind, ResourceAction, ResourceFailure, ResourceHolder, ResourceType,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// Namespaces every schema processor knows without a location.
const BUILTIN_NAMESPACES: [&str; 2] = [XSD_NS, "http://www.w3.org/XML/1998/namespace"];

/// Result of fetching and parsing one URI (collected from parallel workers).
struct Visit {
    holder: ResourceHolder,
    references: BTreeSet<String>,
    namespace_imports: BTreeSet<String>,
}

impl Visit {
    fn failed(uri: &str, resource_type: ResourceType, failure: ResourceFailure) -> Self {
        tracing::warn!("{uri}: {failure}");
        Self {
            holder: ResourceHolder::failed(uri, resource_type, failure),
            references: BTreeSet::new(),
            namespace_imports: BTreeSet::new(),
        }
    }
}

/// Content picked for a URI, with the action already decided by the store.
struct Located {
    fetched: FetchedResource,
    action: Option<ResourceAction>,
}

/// Grows a [`DependencyGraph`] from seed URIs.
///
/// Resolution is breadth-first: each level of the worklist is fetched and
/// parsed (concurrently when `parallel` is set), then folded into the graph
/// sequentially in worklist order, so the result does not depend on thread
/// scheduling. Fetch and parse failures stay on the failing holder.
///
/// Imports that name only a namespace are located once the worklist drains,
/// first among the resolved holders and then among the known resources.
pub struct GraphBuilder<'a> {
    fetcher: &'a dyn ResourceFetcher,
    extractor: &'a dyn ReferenceExtractor,
    store: Option<&'a dyn ResourceFetcher>,
    policy: ResolvePolicy,
    known: KnownResources,
    exclude: GlobSet,
    parallel: bool,
    progress: Option<ProgressBar>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(fetcher: &'a dyn ResourceFetcher, extractor: &'a dyn ReferenceExtractor) -> Self {
        Self {
            fetcher,
            extractor,
            store: None,
            policy: ResolvePolicy::default(),
            known: KnownResources::new(),
            exclude: GlobSet::empty(),
            parallel: false,
            progress: None,
        }
    }

    /// Resources already stored by the caller, used for initial actions.
    pub fn known(mut self, known: KnownResources) -> Self {
        self.known = known;
        self
    }

    /// Stored copies consulted before `fetcher`. A URI present in both is a
    /// conflict settled by [`ResolvePolicy::on_conflict`].
    pub fn store(mut self, store: &'a dyn ResourceFetcher) -> Self {
        self.store = Some(store);
        self
    }

    pub fn policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// URI globs that are never fetched. Matching seeds are skipped; matching
    /// references are dropped and the referencing holder gets a warning.
    pub fn exclude(mut self, patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        self.exclude = builder.build()?;
        Ok(self)
    }

    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve the full graph reachable from `seeds`.
    ///
    /// Seeds are canonicalized like references. Only a blank seed, or no seed
    /// left after exclusion, is an error.
    pub fn resolve<I, S>(&self, seeds: I) -> Result<DependencyGraph>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited = HashSet::new();
        let mut frontier = Vec::new();
        for seed in seeds {
            let seed = seed.as_ref();
            if seed.trim().is_empty() {
                return Err(ResgraphError::InvalidSeed {
                    seed: seed.to_string(),
                });
            }
            let seed = canonical_uri(seed);
            if self.exclude.is_match(&seed) {
                tracing::debug!("seed {seed} excluded by configuration");
                continue;
            }
            if visited.insert(seed.clone()) {
                frontier.push(seed);
            }
        }
        if frontier.is_empty() {
            return Err(ResgraphError::EmptySeeds);
        }

        tracing::debug!("resolving {} seed(s)", frontier.len());
        let mut graph = DependencyGraph::new();
        self.expand(&mut graph, frontier, &mut visited)?;

        let failed = graph.holders().filter(|h| h.is_error()).count();
        tracing::info!(
            "resolved {} resources ({} failed, {} dependencies)",
            graph.len(),
            failed,
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Re-fetch one resource and replace its holder in place.
    ///
    /// Outbound edges are rebuilt from the new content and any newly
    /// referenced resources are resolved. Inbound edges are kept.
    pub fn refresh(&self, graph: &mut DependencyGraph, system_id: &str) -> Result<()> {
        graph.require(system_id)?;
        tracing::debug!("refreshing {system_id}");
        graph.clear_dependencies(system_id)?;
        let mut visited: HashSet<String> =
            graph.holders().map(|h| h.system_id().to_string()).collect();
        let before = graph.len();
        self.expand(graph, vec![system_id.to_string()], &mut visited)?;
        tracing::info!(
            "refreshed {system_id} ({} new resources)",
            graph.len().saturating_sub(before)
        );
        Ok(())
    }

    /// Process the worklist level by level until it is empty, then locate
    /// namespace imports and repeat while that finds new resources.
    ///
    /// Every URI in `frontier` must already be in `visited`.
    fn expand(
        &self,
        graph: &mut DependencyGraph,
        mut frontier: Vec<String>,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        let mut edges = Vec::new();
        let mut pending: Vec<(String, String)> = Vec::new();

        loop {
            while !frontier.is_empty() {
                if let Some(pb) = &self.progress {
                    pb.inc_length(frontier.len() as u64);
                }
                let visits: Vec<Visit> = if self.parallel {
                    frontier.par_iter().map(|uri| self.visit(uri)).collect()
                } else {
                    frontier.iter().map(|uri| self.visit(uri)).collect()
                };

                let mut next = Vec::new();
                for Visit {
                    mut holder,
                    references,
                    namespace_imports,
                } in visits
                {
                    for reference in references {
                        if let Some(warning) = self.reference_warning(holder.system_id(), &reference)
                        {
                            holder.add_warning(warning);
                            continue;
                        }
                        if visited.insert(reference.clone()) {
                            next.push(reference.clone());
                        }
                        edges.push((holder.system_id().to_string(), reference));
                    }
                    pending.extend(
                        namespace_imports
                            .into_iter()
                            .map(|ns| (holder.system_id().to_string(), ns)),
                    );
                    graph.insert(holder);
                }
                frontier = next;
            }

            if pending.is_empty() {
                break;
            }
            for (from, namespace) in std::mem::take(&mut pending) {
                let warning = match self.locate_namespace(graph, &from, &namespace) {
                    None if BUILTIN_NAMESPACES.contains(&namespace.as_str()) => None,
                    None => Some(format!(
                        "import of namespace {namespace} has no location and no known resource"
                    )),
                    Some(target) => match self.reference_warning(&from, &target) {
                        Some(warning) => Some(warning),
                        None => {
                            tracing::debug!("{from}: namespace {namespace} located at {target}");
                            if visited.insert(target.clone()) {
                                frontier.push(target.clone());
                            }
                            edges.push((from.clone(), target));
                            None
                        }
                    },
                };
                if let (Some(warning), Some(holder)) = (warning, graph.find_by_uri_mut(&from)) {
                    holder.add_warning(warning);
                }
            }
        }

        // Edge targets may have been discovered in a later level than their
        // source, so wiring waits until every node exists.
        for (from, to) in &edges {
            graph.add_dependency(from, to)?;
        }
        apply_dependency_warnings(graph);
        if self.policy.on_missing == MissingChoice::Skip {
            skip_failed(graph)?;
        }
        debug_assert!(graph.check_invariants().is_ok());
        Ok(())
    }

    /// Warning to record instead of following `reference`, if it must not be.
    fn reference_warning(&self, from: &str, reference: &str) -> Option<String> {
        if reference == from {
            return Some("document references itself".to_string());
        }
        if self.exclude.is_match(reference) {
            tracing::debug!("excluded reference {reference}");
            return Some(format!("reference {reference} excluded by configuration"));
        }
        None
    }

    /// System id of the resource declaring `namespace`: the smallest resolved
    /// holder in the graph, else the known resource.
    fn locate_namespace(
        &self,
        graph: &DependencyGraph,
        from: &str,
        namespace: &str,
    ) -> Option<String> {
        graph
            .holders()
            .filter(|h| !h.is_error() && h.system_id() != from)
            .filter(|h| h.target_namespace() == Some(namespace))
            .map(|h| h.system_id())
            .min()
            .or_else(|| self.known.locate_namespace(namespace).filter(|id| *id != from))
            .map(String::from)
    }

    fn visit(&self, uri: &str) -> Visit {
        tracing::debug!("fetching {uri}");
        let visit = match self.locate(uri) {
            Err(failure) => {
                let resource_type = ResourceType::from_path(uri).unwrap_or_default();
                Visit::failed(uri, resource_type, failure)
            }
            Ok(Located { fetched, action }) => {
                match self
                    .extractor
                    .extract_references(uri, &fetched.content, fetched.resource_type)
                {
                    Err(e) => Visit::failed(uri, fetched.resource_type, ResourceFailure::from(&e)),
                    Ok(extraction) => {
                        let mut holder = ResourceHolder::resolved(
                            uri,
                            fetched.resource_type,
                            extraction.details,
                            fetched.content,
                        );
                        let action = action.unwrap_or_else(|| self.known.action_for(&holder));
                        holder.set_action(action);
                        Visit {
                            holder,
                            references: extraction.references,
                            namespace_imports: extraction.namespace_imports,
                        }
                    }
                }
            }
        };
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
        visit
    }

    /// Pick the content for `uri` from the store and the fetcher.
    ///
    /// A stored copy alone is used as is, and so is a fetched copy alone.
    /// When both exist the conflict choice decides.
    fn locate(&self, uri: &str) -> std::result::Result<Located, ResourceFailure> {
        let stored = match self.store.map(|store| store.fetch(uri)) {
            None => None,
            Some(Ok(stored)) => Some(stored),
            Some(Err(e)) if e.is_miss() => None,
            Some(Err(e)) => return Err(ResourceFailure::from(&e)),
        };
        let Some(stored) = stored else {
            return self
                .fetcher
                .fetch(uri)
                .map(|fetched| Located {
                    fetched,
                    action: None,
                })
                .map_err(|e| ResourceFailure::from(&e));
        };

        if self.policy.on_conflict == ConflictChoice::Existing {
            tracing::debug!("{uri}: using stored copy");
            return Ok(Located {
                fetched: stored,
                action: Some(ResourceAction::Ignore),
            });
        }
        match self.fetcher.fetch(uri) {
            Ok(_) if self.policy.on_conflict == ConflictChoice::Skip => Err(ResourceFailure {
                kind: FailureKind::Skipped,
                message: "conflicts with a stored resource".to_string(),
            }),
            Ok(fetched) => {
                let action = if Checksum::from_bytes(&stored.content).verify(&fetched.content) {
                    ResourceAction::Ignore
                } else {
                    ResourceAction::Update
                };
                Ok(Located {
                    fetched,
                    action: Some(action),
                })
            }
            Err(e) if e.is_miss() => Ok(Located {
                fetched: stored,
                action: Some(ResourceAction::Ignore),
            }),
            Err(e) => Err(ResourceFailure::from(&e)),
        }
    }
}

pub(crate) fn failed_dependency_warning(dependency: &str) -> String {
    format!("dependency {dependency} could not be resolved")
}

/// Sync each resolved holder's warnings with the state of its dependencies.
fn apply_dependency_warnings(graph: &mut DependencyGraph) {
    let updates: Vec<(String, String, bool)> = graph
        .edges()
        .into_iter()
        .map(|(from, to)| {
            let failed = graph.find_by_uri(to).is_some_and(|h| h.is_error());
            (from.to_string(), to.to_string(), failed)
        })
        .collect();
    for (from, to, failed) in updates {
        let Some(holder) = graph.find_by_uri_mut(&from) else {
            continue;
        };
        if holder.is_error() {
            continue;
        }
        let warning = failed_dependency_warning(&to);
        if failed {
            holder.add_warning(warning);
        } else {
            holder.remove_warning(&warning);
        }
    }
}

/// Remove every failed holder together with everything that depends on it.
fn skip_failed(graph: &mut DependencyGraph) -> Result<()> {
    let failed: Vec<String> = graph
        .holders()
        .filter(|h| h.is_error())
        .map(|h| h.system_id().to_string())
        .collect();
    if failed.is_empty() {
        return Ok(());
    }
    let plan = plan_removal(graph, &failed)?;
    plan.apply(graph);
    tracing::info!(
        "skipped {} unresolved resources and {} dependants",
        plan.direct().len(),
        plan.collateral().len()
    );
    Ok(())
}

/// Resolve `seeds` with the XML extractor, sequential fetching and no known
/// resources.
pub fn resolve<I, S>(seeds: I, fetcher: &dyn ResourceFetcher) -> Result<DependencyGraph>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extractor = XmlReferenceExtractor::new();
    GraphBuilder::new(fetcher, &extractor).resolve(seeds)
}
