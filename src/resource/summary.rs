use clap::ValueEnum;
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// How far a dependency query reaches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    /// One hop.
    Direct,
    /// Reachable in more than one hop but not in one.
    Transitive,
    /// Everything reachable.
    #[default]
    All,
}

/// Which edge map a query follows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// What the node references.
    #[default]
    Dependencies,
    /// What references the node.
    Dependants,
}

impl From<Direction> for petgraph::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Dependencies => petgraph::Direction::Outgoing,
            Direction::Dependants => petgraph::Direction::Incoming,
        }
    }
}

/// Lightweight projection of a graph node returned by scope queries.
///
/// Identity and ordering use the URI only; `transitive` records whether the
/// node was reachable in one hop from the query origin.
#[derive(Debug, Clone, Serialize)]
pub struct DependencySummary {
    uri: String,
    transitive: bool,
}

impl DependencySummary {
    pub fn new(uri: impl Into<String>, transitive: bool) -> Self {
        Self {
            uri: uri.into(),
            transitive,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_transitive(&self) -> bool {
        self.transitive
    }
}

impl PartialEq for DependencySummary {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for DependencySummary {}

impl Hash for DependencySummary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for DependencySummary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencySummary {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri.cmp(&other.uri)
    }
}

impl std::fmt::Display for DependencySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn identity_ignores_transitive_flag() {
        let direct = DependencySummary::new("urn:a.xsd", false);
        let transitive = DependencySummary::new("urn:a.xsd", true);
        assert_eq!(direct, transitive);

        let mut set = BTreeSet::new();
        assert!(set.insert(direct));
        assert!(!set.insert(transitive));
        assert!(!set.iter().next().unwrap().is_transitive());
    }

    #[test]
    fn ordered_by_uri() {
        let set: BTreeSet<_> = ["urn:c", "urn:a", "urn:b"]
            .into_iter()
            .map(|u| DependencySummary::new(u, false))
            .collect();
        let uris: Vec<&str> = set.iter().map(|s| s.uri()).collect();
        assert_eq!(uris, vec!["urn:a", "urn:b", "urn:c"]);
    }
}
