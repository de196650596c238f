//! Choices the resolver applies when a resource is already stored or cannot
//! be resolved at all.

use clap::ValueEnum;
use serde::Serialize;

/// What to do when a resource is found both in the store and at its location.
#[derive(Debug, Default, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictChoice {
    /// Use the stored copy without fetching the resource again.
    Existing,
    /// Fetch the resource; it is updated when its content changed.
    #[default]
    Update,
    /// Leave the resource out. Its holder fails and dependants are warned.
    Skip,
}

impl std::fmt::Display for ConflictChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictChoice::Existing => write!(f, "existing"),
            ConflictChoice::Update => write!(f, "update"),
            ConflictChoice::Skip => write!(f, "skip"),
        }
    }
}

/// What to do with a resource that could not be fetched or parsed.
#[derive(Debug, Default, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingChoice {
    /// Keep a failed holder and warn the resources that depend on it.
    #[default]
    Report,
    /// Drop the resource together with everything that depends on it.
    Skip,
}

impl std::fmt::Display for MissingChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingChoice::Report => write!(f, "report"),
            MissingChoice::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolvePolicy {
    pub on_conflict: ConflictChoice,
    pub on_missing: MissingChoice,
}

impl ResolvePolicy {
    pub fn on_conflict(mut self, choice: ConflictChoice) -> Self {
        self.on_conflict = choice;
        self
    }

    pub fn on_missing(mut self, choice: MissingChoice) -> Self {
        self.on_missing = choice;
        self
    }
}
