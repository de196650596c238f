pub mod ignore;
pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use crate::graph::policy::MissingChoice;
use crate::output::OutputFormat;
use provenance::ProvenanceMap;
use std::path::PathBuf;

/// Fully resolved configuration with every layer applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    // Operational
    pub format: OutputFormat,
    pub quiet: bool,

    // Resolution
    pub parallel_fetch: bool,
    pub follow_wsdl_imports: bool,
    pub on_missing: MissingChoice,

    // Targeting
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub ignore_patterns: Vec<String>,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            quiet: false,
            parallel_fetch: true,
            follow_wsdl_imports: true,
            on_missing: MissingChoice::Report,
            include: vec!["**/*.xsd".to_string(), "**/*.wsdl".to_string()],
            exclude: Vec::new(),
            ignore_patterns: Vec::new(),
            provenance: ProvenanceMap::new(),
            loaded_files: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    /// Exclude globs from config plus `.resgraphignore` lines.
    pub fn exclude_patterns(&self) -> Vec<String> {
        self.exclude
            .iter()
            .chain(self.ignore_patterns.iter())
            .cloned()
            .collect()
    }
}
