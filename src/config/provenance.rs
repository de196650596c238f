use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration layer a value was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    UserConfig(PathBuf),
    ProjectConfig(PathBuf),
    EnvVar(String),
    CliFlag(String),
}

impl Source {
    pub fn is_default(&self) -> bool {
        matches!(self, Source::Default)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::UserConfig(path) => write!(f, "user config ({})", path.display()),
            Source::ProjectConfig(path) => write!(f, "project config ({})", path.display()),
            Source::EnvVar(name) => write!(f, "env var ({name})"),
            Source::CliFlag(name) => write!(f, "CLI flag ({name})"),
        }
    }
}

/// Source of every resolved setting, keyed by `section.key`.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceMap {
    entries: BTreeMap<String, Source>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source` for `key`; later layers overwrite earlier ones.
    pub fn set(&mut self, key: impl Into<String>, source: Source) {
        self.entries.insert(key.into(), source);
    }

    pub fn get(&self, key: &str) -> Option<&Source> {
        self.entries.get(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries under one config section, e.g. `resolve`.
    pub fn section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = (&'a str, &'a Source)> {
        self.iter().filter(move |(key, _)| {
            key.split_once('.')
                .is_some_and(|(prefix, _)| prefix == section)
        })
    }

    /// Keys whose value did not come from the built-in defaults.
    pub fn overridden(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, source)| !source.is_default())
            .map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_wins() {
        let mut map = ProvenanceMap::new();
        map.set("defaults.format", Source::Default);
        map.set(
            "defaults.format",
            Source::ProjectConfig(PathBuf::from("/project/.resgraph.toml")),
        );
        assert_eq!(
            map.get("defaults.format"),
            Some(&Source::ProjectConfig(PathBuf::from("/project/.resgraph.toml")))
        );
        assert_eq!(map.get("nonexistent"), None);
    }

    #[test]
    fn iter_in_key_order() {
        let mut map = ProvenanceMap::new();
        map.set("resolve.parallel_fetch", Source::Default);
        map.set("defaults.quiet", Source::Default);
        map.set("defaults.format", Source::Default);
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["defaults.format", "defaults.quiet", "resolve.parallel_fetch"]
        );
    }

    #[test]
    fn section_and_overridden() {
        let mut map = ProvenanceMap::new();
        map.set("resolve.parallel_fetch", Source::Default);
        map.set("resolve.follow_wsdl_imports", Source::CliFlag("--no-wsdl-imports".into()));
        map.set("resolved.bogus", Source::Default);
        map.set("defaults.format", Source::EnvVar("RESGRAPH_FORMAT".into()));

        assert_eq!(map.section("resolve").count(), 2);
        let overridden: Vec<&str> = map.overridden().collect();
        assert_eq!(overridden, vec!["defaults.format", "resolve.follow_wsdl_imports"]);
    }

    #[test]
    fn display_sources() {
        assert_eq!(Source::Default.to_string(), "default");
        assert_eq!(
            Source::EnvVar("RESGRAPH_FORMAT".to_string()).to_string(),
            "env var (RESGRAPH_FORMAT)"
        );
        assert_eq!(
            Source::CliFlag("--format".to_string()).to_string(),
            "CLI flag (--format)"
        );
    }
}
