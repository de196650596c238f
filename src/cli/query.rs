use super::{resource_id, Session, SourceArgs};
use clap::Args;
use resgraph::errors::Result;
use resgraph::graph::query;
use resgraph::output::dot::write_query_dot;
use resgraph::output::json::{write_query_json, QueryOutput};
use resgraph::output::text::write_query_text;
use resgraph::output::OutputFormat;
use resgraph::resource::{DependencyScope, Direction};

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Resource to query (path or system id)
    #[arg(long)]
    pub node: String,

    /// How far to follow references
    #[arg(long, value_enum, default_value_t = DependencyScope::All)]
    pub scope: DependencyScope,

    /// Follow references outward (dependencies) or inward (dependants)
    #[arg(long, value_enum, default_value_t = Direction::Dependencies)]
    pub direction: Direction,
}

pub fn run(args: &QueryArgs) -> Result<()> {
    let session = Session::load(&args.source)?;
    let node = resource_id(&args.node)?;
    let results = query(&session.graph, args.scope, &node, args.direction)?;

    let output = QueryOutput {
        node: &node,
        scope: args.scope,
        direction: args.direction,
        results: &results,
    };
    let mut stdout = std::io::stdout().lock();
    match session.config.format {
        OutputFormat::Json => write_query_json(&mut stdout, &output)?,
        OutputFormat::Text => write_query_text(&mut stdout, &output)?,
        OutputFormat::Dot => write_query_dot(&mut stdout, &output)?,
    }
    Ok(())
}
