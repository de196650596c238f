use crate::config::provenance::{ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::ResolvedConfig;
use crate::errors::{ResgraphError, Result};
use crate::graph::policy::MissingChoice;
use crate::output::OutputFormat;
use clap::ValueEnum;
use std::path::{Path, PathBuf};

const PROJECT_CONFIG: &str = ".resgraph.toml";

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub format: Option<OutputFormat>,
    pub quiet: bool,
    pub sequential: bool,
    pub no_wsdl_imports: bool,
    pub on_missing: Option<MissingChoice>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/resgraph/config.toml)
/// 3. Project config (nearest .resgraph.toml walking up from working_dir)
/// 4. Environment variables
/// 5. CLI overrides
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    let mut prov = ProvenanceMap::new();
    let mut loaded_files = Vec::new();

    // 1. Built-in defaults
    let mut config = ResolvedConfig::default();
    set_all_default_provenance(&mut prov);

    // 2. User config
    if let Some(user_config_path) = find_user_config().filter(|p| p.exists()) {
        let file_config = load_file_config(&user_config_path, "user")?;
        apply_file_config(
            &mut config,
            &file_config,
            Source::UserConfig(user_config_path.clone()),
            &mut prov,
        )?;
        loaded_files.push(user_config_path);
    }

    // 3. Project config
    if let Some(project_config_path) = find_project_config(working_dir) {
        let file_config = load_file_config(&project_config_path, "project")?;
        apply_file_config(
            &mut config,
            &file_config,
            Source::ProjectConfig(project_config_path.clone()),
            &mut prov,
        )?;
        loaded_files.push(project_config_path);
    }

    // 4. Environment variables
    apply_env_vars(&mut config, &mut prov, |name| std::env::var(name).ok())?;

    // 5. CLI overrides
    apply_cli_overrides(&mut config, cli, &mut prov);

    config.ignore_patterns = crate::config::ignore::load_resgraphignore(working_dir);
    config.provenance = prov;
    config.loaded_files = loaded_files;

    tracing::debug!("loaded config files: {:?}", config.loaded_files);
    Ok(config)
}

fn load_file_config(path: &Path, layer: &str) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|_| {
        ResgraphError::Config(format!("Could not read {layer} config: {}", path.display()))
    })?;
    FileConfig::from_toml(&content)
        .map_err(|e| ResgraphError::Config(format!("Invalid {layer} config: {e}")))
}

fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("resgraph").join("config.toml"))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG))
        .find(|path| path.exists())
}

fn set_all_default_provenance(prov: &mut ProvenanceMap) {
    let defaults = [
        "defaults.format",
        "defaults.quiet",
        "resolve.parallel_fetch",
        "resolve.follow_wsdl_imports",
        "resolve.on_missing",
        "targeting.include",
        "targeting.exclude",
    ];
    for key in defaults {
        prov.set(key, Source::Default);
    }
}

fn parse_format(value: &str, origin: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(value, true)
        .map_err(|_| ResgraphError::Config(format!("{origin}: unknown output format '{value}'")))
}

fn parse_missing(value: &str, origin: &str) -> Result<MissingChoice> {
    MissingChoice::from_str(value, true).map_err(|_| {
        ResgraphError::Config(format!("{origin}: unknown on_missing choice '{value}'"))
    })
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn apply_file_config(
    config: &mut ResolvedConfig,
    file: &FileConfig,
    source: Source,
    prov: &mut ProvenanceMap,
) -> Result<()> {
    if let Some(ref format) = file.defaults.format {
        config.format = parse_format(format, &source.to_string())?;
        prov.set("defaults.format", source.clone());
    }
    if let Some(quiet) = file.defaults.quiet {
        config.quiet = quiet;
        prov.set("defaults.quiet", source.clone());
    }
    if let Some(parallel_fetch) = file.resolve.parallel_fetch {
        config.parallel_fetch = parallel_fetch;
        prov.set("resolve.parallel_fetch", source.clone());
    }
    if let Some(follow) = file.resolve.follow_wsdl_imports {
        config.follow_wsdl_imports = follow;
        prov.set("resolve.follow_wsdl_imports", source.clone());
    }
    if let Some(ref on_missing) = file.resolve.on_missing {
        config.on_missing = parse_missing(on_missing, &source.to_string())?;
        prov.set("resolve.on_missing", source.clone());
    }
    if let Some(ref include) = file.targeting.include {
        config.include = include.clone();
        prov.set("targeting.include", source.clone());
    }
    if let Some(ref exclude) = file.targeting.exclude {
        config.exclude = exclude.clone();
        prov.set("targeting.exclude", source);
    }
    Ok(())
}

fn apply_env_vars(
    config: &mut ResolvedConfig,
    prov: &mut ProvenanceMap,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = var("RESGRAPH_FORMAT") {
        config.format = parse_format(&val, "RESGRAPH_FORMAT")?;
        prov.set("defaults.format", Source::EnvVar("RESGRAPH_FORMAT".into()));
    }
    if let Some(val) = var("RESGRAPH_QUIET") {
        config.quiet = parse_bool(&val);
        prov.set("defaults.quiet", Source::EnvVar("RESGRAPH_QUIET".into()));
    }
    if let Some(val) = var("RESGRAPH_PARALLEL_FETCH") {
        config.parallel_fetch = parse_bool(&val);
        prov.set(
            "resolve.parallel_fetch",
            Source::EnvVar("RESGRAPH_PARALLEL_FETCH".into()),
        );
    }
    if let Some(val) = var("RESGRAPH_FOLLOW_WSDL_IMPORTS") {
        config.follow_wsdl_imports = parse_bool(&val);
        prov.set(
            "resolve.follow_wsdl_imports",
            Source::EnvVar("RESGRAPH_FOLLOW_WSDL_IMPORTS".into()),
        );
    }
    if let Some(val) = var("RESGRAPH_ON_MISSING") {
        config.on_missing = parse_missing(&val, "RESGRAPH_ON_MISSING")?;
        prov.set(
            "resolve.on_missing",
            Source::EnvVar("RESGRAPH_ON_MISSING".into()),
        );
    }
    if let Some(val) = var("RESGRAPH_INCLUDE") {
        config.include = parse_list(&val);
        prov.set("targeting.include", Source::EnvVar("RESGRAPH_INCLUDE".into()));
    }
    if let Some(val) = var("RESGRAPH_EXCLUDE") {
        config.exclude = parse_list(&val);
        prov.set("targeting.exclude", Source::EnvVar("RESGRAPH_EXCLUDE".into()));
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut ResolvedConfig, cli: &CliOverrides, prov: &mut ProvenanceMap) {
    if let Some(format) = cli.format {
        config.format = format;
        prov.set("defaults.format", Source::CliFlag("--format".into()));
    }
    if cli.quiet {
        config.quiet = true;
        prov.set("defaults.quiet", Source::CliFlag("--quiet".into()));
    }
    if cli.sequential {
        config.parallel_fetch = false;
        prov.set("resolve.parallel_fetch", Source::CliFlag("--sequential".into()));
    }
    if cli.no_wsdl_imports {
        config.follow_wsdl_imports = false;
        prov.set(
            "resolve.follow_wsdl_imports",
            Source::CliFlag("--no-wsdl-imports".into()),
        );
    }
    if let Some(on_missing) = cli.on_missing {
        config.on_missing = on_missing;
        prov.set("resolve.on_missing", Source::CliFlag("--on-missing".into()));
    }
    if !cli.include.is_empty() {
        config.include = cli.include.clone();
        prov.set("targeting.include", Source::CliFlag("--include".into()));
    }
    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude.clone();
        prov.set("targeting.exclude", Source::CliFlag("--exclude".into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_only() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = CliOverrides::default();
        let config = resolve_config(tmp.path(), &cli).unwrap();

        assert!(!config.quiet);
        assert!(config.parallel_fetch);
        assert!(config.follow_wsdl_imports);
        assert_eq!(config.on_missing, MissingChoice::Report);
        assert_eq!(config.include, vec!["**/*.xsd", "**/*.wsdl"]);
        assert!(config.exclude.is_empty());
        assert!(config.ignore_patterns.is_empty());
    }

    #[test]
    fn cli_override_takes_precedence() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = CliOverrides {
            format: Some(OutputFormat::Text),
            quiet: true,
            sequential: true,
            no_wsdl_imports: true,
            ..Default::default()
        };
        let config = resolve_config(tmp.path(), &cli).unwrap();

        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.quiet);
        assert!(!config.parallel_fetch);
        assert!(!config.follow_wsdl_imports);
        assert!(matches!(
            config.provenance.get("resolve.parallel_fetch"),
            Some(Source::CliFlag(_))
        ));
    }

    #[test]
    fn project_config_applied() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_CONFIG),
            r#"
[defaults]
format = "dot"

[resolve]
parallel_fetch = false

[targeting]
exclude = ["http://**"]
"#,
        )
        .unwrap();
        let nested = tmp.path().join("schemas").join("v2");
        std::fs::create_dir_all(&nested).unwrap();

        let config = resolve_config(&nested, &CliOverrides::default()).unwrap();

        assert_eq!(config.format, OutputFormat::Dot);
        assert!(!config.parallel_fetch);
        assert_eq!(config.exclude, vec!["http://**"]);
        assert!(config.loaded_files.iter().any(|p| p.ends_with(PROJECT_CONFIG)));
        assert!(matches!(
            config.provenance.get("targeting.exclude"),
            Some(Source::ProjectConfig(_))
        ));
    }

    #[test]
    fn cli_overrides_project_config() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_CONFIG),
            "[defaults]\nformat = \"text\"\n",
        )
        .unwrap();

        let cli = CliOverrides {
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        let config = resolve_config(tmp.path(), &cli).unwrap();

        assert_eq!(config.format, OutputFormat::Json);
        assert!(matches!(
            config.provenance.get("defaults.format"),
            Some(Source::CliFlag(_))
        ));
    }

    #[test]
    fn invalid_project_config_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_CONFIG),
            "[defaults]\nformat = \"sarif\"\n",
        )
        .unwrap();
        let err = resolve_config(tmp.path(), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ResgraphError::Config(_)));

        std::fs::write(
            tmp.path().join(PROJECT_CONFIG),
            "[resolve]\non_missing = \"ignore\"\n",
        )
        .unwrap();
        let err = resolve_config(tmp.path(), &CliOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("on_missing"));
    }

    #[test]
    fn env_vars_applied() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("RESGRAPH_QUIET", "1"),
            ("RESGRAPH_FOLLOW_WSDL_IMPORTS", "false"),
            ("RESGRAPH_ON_MISSING", "SKIP"),
            ("RESGRAPH_EXCLUDE", "http://**, ,urn:vendor:*"),
        ]);
        let mut config = ResolvedConfig::default();
        let mut prov = ProvenanceMap::new();
        apply_env_vars(&mut config, &mut prov, |name| {
            env.get(name).map(|v| v.to_string())
        })
        .unwrap();

        assert!(config.quiet);
        assert!(!config.follow_wsdl_imports);
        assert_eq!(config.on_missing, MissingChoice::Skip);
        assert_eq!(config.exclude, vec!["http://**", "urn:vendor:*"]);
        assert_eq!(
            prov.get("defaults.quiet"),
            Some(&Source::EnvVar("RESGRAPH_QUIET".into()))
        );
        assert!(prov.get("defaults.format").is_none());
    }
}
