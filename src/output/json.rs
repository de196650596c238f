use crate::errors::Result;
use crate::graph::cycles::ImportCycle;
use crate::graph::ir::DependencyGraph;
use crate::graph::removal::RemovalPlan;
use crate::resource::{
    DependencyScope, DependencySummary, Direction, ResourceAction, ResourceFailure,
    ResourceHolder, ResourceStatus, ResourceType,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub seeds: Vec<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub failed_count: usize,
    pub warning_count: usize,
    pub elapsed_ms: u64,
}

impl Metadata {
    pub fn from_graph(seeds: &[String], graph: &DependencyGraph, elapsed_ms: u64) -> Self {
        let count = |status: ResourceStatus| graph.holders().filter(|h| h.status() == status).count();
        Self {
            seeds: seeds.to_vec(),
            node_count: graph.len(),
            edge_count: graph.edge_count(),
            failed_count: count(ResourceStatus::Error),
            warning_count: count(ResourceStatus::Warning),
            elapsed_ms,
        }
    }
}

/// Serializable view of one holder with its direct edges.
#[derive(Debug, Serialize)]
pub struct ResourceEntry {
    pub system_id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub action: ResourceAction,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResourceFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub dependencies: Vec<String>,
    pub dependants: Vec<String>,
}

impl ResourceEntry {
    pub fn new(graph: &DependencyGraph, holder: &ResourceHolder) -> Self {
        let id = holder.system_id();
        let owned = |set: BTreeSet<&str>| set.into_iter().map(String::from).collect();
        Self {
            system_id: id.to_string(),
            resource_type: holder.resource_type(),
            status: holder.status(),
            action: holder.action(),
            details: holder.details().to_string(),
            target_namespace: holder.target_namespace().map(String::from),
            checksum: holder.checksum().map(|c| c.to_string()),
            error: holder.error().cloned(),
            warnings: holder.warnings().to_vec(),
            dependencies: owned(graph.dependencies_of(id)),
            dependants: owned(graph.dependants_of(id)),
        }
    }
}

/// Holders sorted by system id.
pub fn entries(graph: &DependencyGraph) -> Vec<ResourceEntry> {
    let mut entries: Vec<_> = graph
        .holders()
        .map(|h| ResourceEntry::new(graph, h))
        .collect();
    entries.sort_by(|a, b| a.system_id.cmp(&b.system_id));
    entries
}

#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub metadata: Metadata,
    pub resources: Vec<ResourceEntry>,
    pub cycles: Vec<ImportCycle>,
}

/// Write `resolve` output as JSON.
pub fn write_resolve_json<W: Write>(
    writer: &mut W,
    graph: &DependencyGraph,
    cycles: &[ImportCycle],
    metadata: Metadata,
) -> Result<()> {
    let output = ResolveOutput {
        metadata,
        resources: entries(graph),
        cycles: cycles.to_vec(),
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct QueryOutput<'a> {
    pub node: &'a str,
    pub scope: DependencyScope,
    pub direction: Direction,
    pub results: &'a BTreeSet<DependencySummary>,
}

/// Write `query` output as JSON.
pub fn write_query_json<W: Write>(writer: &mut W, output: &QueryOutput<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, output)?;
    writeln!(writer)?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RemovalOutput<'a> {
    pub applied: bool,
    #[serde(flatten)]
    pub plan: &'a RemovalPlan,
    pub remaining: Vec<ResourceEntry>,
}

/// Write `remove` output as JSON.
pub fn write_removal_json<W: Write>(
    writer: &mut W,
    plan: &RemovalPlan,
    applied: bool,
    graph: &DependencyGraph,
) -> Result<()> {
    let output = RemovalOutput {
        applied,
        plan,
        remaining: entries(graph),
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::InMemoryFetcher;
    use crate::graph::{find_import_cycles, resolve};

    fn sample() -> DependencyGraph {
        let fetcher = InMemoryFetcher::new()
            .with(
                "urn:order.xsd",
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:orders">
<xs:import schemaLocation="urn:address.xsd"/></xs:schema>"#,
            )
            .with_broken("urn:address.xsd", "unreachable");
        resolve(["urn:order.xsd"], &fetcher).unwrap()
    }

    #[test]
    fn resolve_json_shape() {
        let graph = sample();
        let seeds = vec!["urn:order.xsd".to_string()];
        let mut buf = Vec::new();
        write_resolve_json(
            &mut buf,
            &graph,
            &find_import_cycles(&graph),
            Metadata::from_graph(&seeds, &graph, 3),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["metadata"]["node_count"], 2);
        assert_eq!(value["metadata"]["failed_count"], 1);
        assert_eq!(value["metadata"]["warning_count"], 1);
        let resources = value["resources"].as_array().unwrap();
        assert_eq!(resources[0]["system_id"], "urn:address.xsd");
        assert_eq!(resources[0]["status"], "error");
        assert_eq!(resources[0]["action"], "ignore");
        assert_eq!(resources[0]["error"]["kind"], "fetch");
        assert_eq!(resources[1]["type"], "schema");
        assert_eq!(resources[1]["details"], "TNS: urn:orders");
        assert_eq!(resources[1]["target_namespace"], "urn:orders");
        assert!(resources[0].get("target_namespace").is_none());
        assert_eq!(resources[1]["dependencies"][0], "urn:address.xsd");
        assert!(resources[1]["checksum"].as_str().unwrap().len() == 64);
    }

    #[test]
    fn removal_json_flattens_plan() {
        let mut graph = sample();
        let plan = crate::graph::plan_removal(&graph, ["urn:address.xsd"]).unwrap();
        plan.apply(&mut graph);
        let mut buf = Vec::new();
        write_removal_json(&mut buf, &plan, true, &graph).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["applied"], true);
        assert_eq!(value["direct"][0], "urn:address.xsd");
        assert_eq!(value["collateral"][0], "urn:order.xsd");
        assert!(value["remaining"].as_array().unwrap().is_empty());
    }
}
