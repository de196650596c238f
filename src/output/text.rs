use crate::errors::Result;
use crate::graph::cycles::ImportCycle;
use crate::graph::ir::DependencyGraph;
use crate::graph::removal::RemovalPlan;
use crate::output::json::{entries, Metadata, QueryOutput};
use std::io::Write;

/// Write `resolve` output as a human-readable report.
pub fn write_resolve_text<W: Write>(
    writer: &mut W,
    graph: &DependencyGraph,
    cycles: &[ImportCycle],
    metadata: &Metadata,
) -> Result<()> {
    writeln!(writer, "Resource Dependency Report")?;
    writeln!(writer, "==========================")?;
    writeln!(writer)?;
    writeln!(writer, "Seeds:      {}", metadata.seeds.len())?;
    writeln!(writer, "Resources:  {}", metadata.node_count)?;
    writeln!(writer, "References: {}", metadata.edge_count)?;
    writeln!(writer, "Failed:     {}", metadata.failed_count)?;
    writeln!(writer, "Warnings:   {}", metadata.warning_count)?;
    writeln!(writer)?;

    writeln!(writer, "{:<8} {:<7} {:<7} System ID", "Status", "Type", "Action")?;
    writeln!(writer, "{:-<60}", "")?;
    for entry in entries(graph) {
        let holder = graph.find_by_uri(&entry.system_id);
        let status = holder.map(|h| h.status().to_string()).unwrap_or_default();
        let action = holder.map(|h| h.action().to_string()).unwrap_or_default();
        writeln!(
            writer,
            "{:<8} {:<7} {:<7} {}",
            status,
            entry.resource_type.to_string(),
            action,
            entry.system_id
        )?;
        if !entry.details.is_empty() {
            writeln!(writer, "    {}", entry.details)?;
        }
        if let Some(error) = &entry.error {
            writeln!(writer, "    error: {error}")?;
        }
        for warning in &entry.warnings {
            writeln!(writer, "    warning: {warning}")?;
        }
        for dependency in &entry.dependencies {
            writeln!(writer, "    -> {dependency}")?;
        }
    }

    if !cycles.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Import Cycles")?;
        writeln!(writer, "{:-<60}", "")?;
        for cycle in cycles {
            writeln!(
                writer,
                "  #{} ({} resources, {} references)",
                cycle.id, cycle.size, cycle.internal_edges
            )?;
            for member in &cycle.members {
                writeln!(writer, "    {member}")?;
            }
        }
    }

    Ok(())
}

/// Write `query` output, one system id per line.
pub fn write_query_text<W: Write>(writer: &mut W, output: &QueryOutput<'_>) -> Result<()> {
    writeln!(
        writer,
        "{:?} {:?} of {} ({}):",
        output.scope,
        output.direction,
        output.node,
        output.results.len()
    )?;
    for summary in output.results {
        let marker = if summary.is_transitive() { "  (transitive)" } else { "" };
        writeln!(writer, "  {summary}{marker}")?;
    }
    Ok(())
}

/// Write `remove` output.
pub fn write_removal_text<W: Write>(
    writer: &mut W,
    plan: &RemovalPlan,
    applied: bool,
    graph: &DependencyGraph,
) -> Result<()> {
    writeln!(
        writer,
        "Selected: {}  Collateral: {}",
        plan.direct().len(),
        plan.collateral().len()
    )?;
    for id in plan.direct() {
        writeln!(writer, "  - {id}")?;
    }
    for id in plan.collateral() {
        writeln!(writer, "  ~ {id}")?;
    }
    if applied {
        writeln!(writer, "Removed {} resources; {} remain", plan.len(), graph.len())?;
    } else {
        writeln!(writer, "Dry run; pass --apply to remove")?;
    }
    Ok(())
}
