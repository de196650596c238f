pub mod config;
pub mod query;
pub mod remove;
pub mod resolve;

use clap::{Args, Parser, Subcommand};
use resgraph::config::resolve::{resolve_config, CliOverrides};
use resgraph::config::ResolvedConfig;
use resgraph::errors::Result;
use resgraph::extract::{canonical_uri, XmlReferenceExtractor};
use resgraph::fetch::FileFetcher;
use resgraph::graph::{
    DependencyGraph, GraphBuilder, KnownResources, MissingChoice, ResolvePolicy,
};
use resgraph::output::OutputFormat;
use resgraph::walk;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(
    name = "resgraph",
    version,
    about = "Dependency resolver for XML Schema and WSDL resources"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the dependency graph reachable from the seeds
    Resolve(resolve::ResolveArgs),
    /// List dependencies or dependants of one resource
    Query(query::QueryArgs),
    /// Plan (and optionally apply) removal of resources with collateral
    Remove(remove::RemoveArgs),
    /// Inspect configuration
    Config(config::ConfigArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Resolve(args) => resolve::run(&args),
        Commands::Query(args) => query::run(&args),
        Commands::Remove(args) => remove::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}

/// Arguments shared by every command that resolves a graph.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Seed files, directories or absolute URIs
    #[arg(required = true)]
    pub seeds: Vec<String>,

    /// Previous JSON `resolve` report; unchanged resources are marked ignore
    #[arg(long)]
    pub known: Option<PathBuf>,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Fetch one resource at a time
    #[arg(long)]
    pub sequential: bool,

    /// Do not follow wsdl:import locations
    #[arg(long)]
    pub no_wsdl_imports: bool,

    /// Keep unresolved resources as failures (report) or drop them with their dependants (skip)
    #[arg(long, value_enum)]
    pub on_missing: Option<MissingChoice>,

    /// Include glob patterns for directory seeds
    #[arg(long)]
    pub include: Vec<String>,

    /// Exclude glob patterns (paths and URIs)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

impl SourceArgs {
    fn to_cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            format: self.format,
            quiet: self.quiet,
            sequential: self.sequential,
            no_wsdl_imports: self.no_wsdl_imports,
            on_missing: self.on_missing,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

/// A resolved graph with the settings that produced it.
pub struct Session {
    pub config: ResolvedConfig,
    pub seeds: Vec<String>,
    pub graph: DependencyGraph,
    pub elapsed_ms: u64,
}

impl Session {
    pub fn load(args: &SourceArgs) -> Result<Self> {
        let start = Instant::now();
        let working_dir = std::env::current_dir()?;
        let config = resolve_config(&working_dir, &args.to_cli_overrides())?;
        let exclude = config.exclude_patterns();

        let seeds = walk::discover_seeds(&args.seeds, &config.include, &exclude)?;
        let known = match &args.known {
            Some(path) => KnownResources::from_report_json(&std::fs::read_to_string(path)?)?,
            None => KnownResources::new(),
        };

        let fetcher = FileFetcher::new();
        let extractor =
            XmlReferenceExtractor::new().with_follow_wsdl_imports(config.follow_wsdl_imports);
        let mut builder = GraphBuilder::new(&fetcher, &extractor)
            .known(known)
            .policy(ResolvePolicy::default().on_missing(config.on_missing))
            .parallel(config.parallel_fetch)
            .exclude(&exclude)?;

        let progress = if config.quiet {
            None
        } else {
            let pb = indicatif::ProgressBar::new(0);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} resources ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            builder = builder.progress(pb.clone());
            Some(pb)
        };

        let graph = builder.resolve(&seeds)?;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(Self {
            config,
            seeds,
            graph,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// System id for a resource named on the command line.
pub fn resource_id(arg: &str) -> Result<String> {
    if Path::new(arg).exists() {
        walk::path_to_uri(Path::new(arg))
    } else {
        Ok(canonical_uri(arg))
    }
}
