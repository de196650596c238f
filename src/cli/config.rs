use clap::{Args, Subcommand};
use resgraph::config::resolve::{resolve_config, CliOverrides};
use resgraph::config::show::{render_explain, render_show};
use resgraph::errors::{ResgraphError, Result};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show resolved configuration with provenance
    Show {
        /// Working directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Explain where the settings of one section come from
    Explain {
        /// Config section (defaults, resolve, targeting)
        section: String,
        /// Working directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    let mut stdout = std::io::stdout();
    match &args.action {
        ConfigAction::Show { path } => {
            let config = resolve_config(&working_dir(path)?, &CliOverrides::default())?;
            render_show(&mut stdout, &config)?;
        }
        ConfigAction::Explain { section, path } => {
            let config = resolve_config(&working_dir(path)?, &CliOverrides::default())?;
            render_explain(&mut stdout, &config, section)?;
        }
    }
    Ok(())
}

fn working_dir(path: &Option<PathBuf>) -> Result<PathBuf> {
    let p = path.clone().unwrap_or_else(|| PathBuf::from("."));
    p.canonicalize()
        .map_err(|_| ResgraphError::Config(format!("Invalid path: {}", p.display())))
}
