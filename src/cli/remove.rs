use super::{resource_id, Session, SourceArgs};
use clap::Args;
use resgraph::errors::Result;
use resgraph::graph::plan_removal;
use resgraph::output::json::write_removal_json;
use resgraph::output::text::write_removal_text;
use resgraph::output::{dot, OutputFormat};

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Resources selected for removal (paths or system ids)
    #[arg(long = "select", required = true)]
    pub selected: Vec<String>,

    /// Remove the planned resources instead of only marking them
    #[arg(long)]
    pub apply: bool,
}

pub fn run(args: &RemoveArgs) -> Result<()> {
    let mut session = Session::load(&args.source)?;
    let selected = args
        .selected
        .iter()
        .map(|s| resource_id(s))
        .collect::<Result<Vec<_>>>()?;

    let plan = plan_removal(&session.graph, &selected)?;
    plan.mark(&mut session.graph);
    if args.apply {
        let removed = plan.apply(&mut session.graph);
        tracing::info!(removed = removed.len(), "applied removal");
    }

    if !session.config.quiet {
        eprintln!(
            "{} selected, {} collateral{}",
            plan.direct().len(),
            plan.collateral().len(),
            if args.apply { ", removed" } else { "" }
        );
    }

    let mut stdout = std::io::stdout().lock();
    match session.config.format {
        OutputFormat::Json => write_removal_json(&mut stdout, &plan, args.apply, &session.graph)?,
        OutputFormat::Text => write_removal_text(&mut stdout, &plan, args.apply, &session.graph)?,
        OutputFormat::Dot => dot::write_dot(&mut stdout, &session.graph)?,
    }
    Ok(())
}
