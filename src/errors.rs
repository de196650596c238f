use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ResgraphError {
    #[error("No seed resources given")]
    #[diagnostic(
        code(resgraph::empty_seeds),
        help("seeds matching an exclude pattern are skipped")
    )]
    EmptySeeds,

    #[error("Invalid seed resource: {seed:?}")]
    #[diagnostic(code(resgraph::invalid_seed))]
    InvalidSeed { seed: String },

    #[error("Resource not present in the graph: {system_id}")]
    #[diagnostic(code(resgraph::unknown_resource))]
    UnknownResource { system_id: String },

    #[error("No resources found in {path}")]
    #[diagnostic(code(resgraph::no_files))]
    NoFiles { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(code(resgraph::invariant))]
    Invariant(#[from] GraphInvariantError),

    #[error("{failed} of {total} resources failed to resolve")]
    #[diagnostic(
        code(resgraph::resolution_failed),
        help("run without --fail-on-error to see the full report")
    )]
    ResolutionFailed { failed: usize, total: usize },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(resgraph::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(resgraph::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(resgraph::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(resgraph::glob))]
    Glob(#[from] globset::Error),
}

/// Internal consistency failure of a [`DependencyGraph`](crate::graph::ir::DependencyGraph).
///
/// Never caused by input data; seeing one means a mutation path is broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphInvariantError {
    #[error("index entry {system_id} points at a missing node")]
    StaleIndex { system_id: String },

    #[error("index entry {system_id} points at node holding {found}")]
    MismatchedIndex { system_id: String, found: String },

    #[error("node {system_id} is not indexed")]
    OrphanedNode { system_id: String },

    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, ResgraphError>;
