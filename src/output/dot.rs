use crate::errors::Result;
use crate::graph::ir::DependencyGraph;
use crate::output::json::QueryOutput;
use crate::resource::{Direction, ResourceAction, ResourceStatus};
use std::io::Write;

fn quoted(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Write the dependency graph in Graphviz DOT format.
///
/// Nodes are colored by status; nodes marked for deletion are dashed.
pub fn write_dot<W: Write>(writer: &mut W, graph: &DependencyGraph) -> Result<()> {
    writeln!(writer, "digraph resources {{")?;
    writeln!(writer, "    rankdir=LR;")?;
    writeln!(writer, "    node [shape=box, style=filled];")?;
    writeln!(writer)?;

    let mut holders: Vec<_> = graph.holders().collect();
    holders.sort_by(|a, b| a.system_id().cmp(b.system_id()));
    for holder in holders {
        let fill = match holder.status() {
            ResourceStatus::Ok => "lightblue",
            ResourceStatus::Warning => "orange",
            ResourceStatus::Error => "lightcoral",
        };
        let style = if holder.action() == ResourceAction::Delete {
            ", style=\"filled,dashed\""
        } else {
            ""
        };
        writeln!(
            writer,
            "    {} [fillcolor={fill}{style}];",
            quoted(holder.system_id())
        )?;
    }
    writeln!(writer)?;

    for (from, to) in graph.edges() {
        writeln!(writer, "    {} -> {};", quoted(from), quoted(to))?;
    }

    writeln!(writer, "}}")?;
    Ok(())
}

/// Write a query result as a star around the queried node.
///
/// Edges keep the reference direction; transitive results are dashed.
pub fn write_query_dot<W: Write>(writer: &mut W, output: &QueryOutput<'_>) -> Result<()> {
    writeln!(writer, "digraph query {{")?;
    writeln!(writer, "    rankdir=LR;")?;
    writeln!(
        writer,
        "    {} [shape=box, style=filled, fillcolor=gold];",
        quoted(output.node)
    )?;
    for summary in output.results {
        let (from, to) = match output.direction {
            Direction::Dependencies => (output.node, summary.uri()),
            Direction::Dependants => (summary.uri(), output.node),
        };
        let style = if summary.is_transitive() {
            " [style=dashed]"
        } else {
            ""
        };
        writeln!(writer, "    {} -> {}{style};", quoted(from), quoted(to))?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}
