use crate::config::ResolvedConfig;
use std::io::Write;

/// Render `config show` output.
pub fn render_show<W: Write>(w: &mut W, config: &ResolvedConfig) -> std::io::Result<()> {
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    let overridden = config.provenance.overridden().count();
    writeln!(w, "Resolved settings ({overridden} overridden):")?;
    for (key, source) in config.provenance.iter() {
        writeln!(w, "  {key}: {} <- {source}", value_for_key(config, key))?;
    }

    if !config.ignore_patterns.is_empty() {
        writeln!(w)?;
        writeln!(w, "Ignore file patterns:")?;
        for pattern in &config.ignore_patterns {
            writeln!(w, "  {pattern}")?;
        }
    }

    Ok(())
}

/// Render `config explain <section>` output.
pub fn render_explain<W: Write>(
    w: &mut W,
    config: &ResolvedConfig,
    section: &str,
) -> std::io::Result<()> {
    let entries: Vec<_> = config.provenance.section(section).collect();
    if entries.is_empty() {
        writeln!(w, "Unknown config section: {section}")?;
        writeln!(w, "Available sections: defaults, resolve, targeting")?;
        return Ok(());
    }

    writeln!(w, "[{section}]")?;
    for (key, source) in entries {
        writeln!(w, "  {key}: {} <- {source}", value_for_key(config, key))?;
    }
    Ok(())
}

fn value_for_key(config: &ResolvedConfig, key: &str) -> String {
    match key {
        "defaults.format" => config.format.to_string(),
        "defaults.quiet" => config.quiet.to_string(),
        "resolve.parallel_fetch" => config.parallel_fetch.to_string(),
        "resolve.follow_wsdl_imports" => config.follow_wsdl_imports.to_string(),
        "resolve.on_missing" => config.on_missing.to_string(),
        "targeting.include" => format!("{:?}", config.include),
        "targeting.exclude" => format!("{:?}", config.exclude),
        _ => "(unknown)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::provenance::Source;
    use std::path::PathBuf;

    fn make_test_config() -> ResolvedConfig {
        let mut config = ResolvedConfig::default();
        config.provenance.set("defaults.format", Source::Default);
        config.provenance.set(
            "resolve.parallel_fetch",
            Source::ProjectConfig(PathBuf::from("/project/.resgraph.toml")),
        );
        config.provenance.set("targeting.include", Source::Default);
        config.parallel_fetch = false;
        config.loaded_files = vec![PathBuf::from("/project/.resgraph.toml")];
        config
    }

    #[test]
    fn render_show_format() {
        let config = make_test_config();
        let mut buf = Vec::new();
        render_show(&mut buf, &config).unwrap();
        let output = String::from_utf8(buf).unwrap();

        assert!(output.contains("  1. /project/.resgraph.toml"));
        assert!(output.contains("defaults.format: json <- default"));
        assert!(output.contains(
            "resolve.parallel_fetch: false <- project config (/project/.resgraph.toml)"
        ));
        assert!(output.contains(r#"targeting.include: ["**/*.xsd", "**/*.wsdl"] <- default"#));
        assert!(output.contains("Resolved settings (1 overridden):"));
        assert!(!output.contains("Ignore file patterns"));
    }

    #[test]
    fn render_explain_section() {
        let config = make_test_config();
        let mut buf = Vec::new();
        render_explain(&mut buf, &config, "resolve").unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("[resolve]\n"));
        assert!(output.contains("resolve.parallel_fetch: false"));
        assert!(!output.contains("defaults.format"));

        let mut buf = Vec::new();
        render_explain(&mut buf, &config, "rules").unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("Unknown config section: rules"));
    }

    #[test]
    fn render_show_no_files_with_ignore() {
        let mut config = make_test_config();
        config.loaded_files.clear();
        config.ignore_patterns = vec!["http://**".to_string()];
        let mut buf = Vec::new();
        render_show(&mut buf, &config).unwrap();
        let output = String::from_utf8(buf).unwrap();

        assert!(output.contains("Loaded config files: (none)"));
        assert!(output.contains("Ignore file patterns:\n  http://**"));
    }
}
