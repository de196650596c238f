use super::{Session, SourceArgs};
use clap::Args;
use resgraph::errors::{ResgraphError, Result};
use resgraph::graph::find_import_cycles;
use resgraph::output::json::{write_resolve_json, Metadata};
use resgraph::output::text::write_resolve_text;
use resgraph::output::{dot, OutputFormat};

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Exit with an error when any resource failed to resolve
    #[arg(long)]
    pub fail_on_error: bool,
}

pub fn run(args: &ResolveArgs) -> Result<()> {
    let session = Session::load(&args.source)?;
    let graph = &session.graph;
    let cycles = find_import_cycles(graph);
    let metadata = Metadata::from_graph(&session.seeds, graph, session.elapsed_ms);

    if !session.config.quiet {
        eprintln!(
            "Resolved {} resources ({} references, {} failed, {} import cycles) in {}ms",
            metadata.node_count,
            metadata.edge_count,
            metadata.failed_count,
            cycles.len(),
            metadata.elapsed_ms
        );
    }

    let failed = metadata.failed_count;
    let total = metadata.node_count;
    let mut stdout = std::io::stdout().lock();
    match session.config.format {
        OutputFormat::Json => write_resolve_json(&mut stdout, graph, &cycles, metadata)?,
        OutputFormat::Text => write_resolve_text(&mut stdout, graph, &cycles, &metadata)?,
        OutputFormat::Dot => dot::write_dot(&mut stdout, graph)?,
    }

    if args.fail_on_error && failed > 0 {
        return Err(ResgraphError::ResolutionFailed { failed, total });
    }
    Ok(())
}
