use crate::errors::Result;
use crate::resource::{Checksum, ResourceAction, ResourceHolder};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct Report {
    resources: Vec<ReportEntry>,
}

#[derive(Deserialize)]
struct ReportEntry {
    system_id: String,
    checksum: Option<Checksum>,
    target_namespace: Option<String>,
}

/// Resources the caller already has stored, keyed by system id.
///
/// Used to choose each resolved holder's initial action and to locate
/// imports that name only a target namespace.
#[derive(Debug, Clone, Default)]
pub struct KnownResources {
    checksums: HashMap<String, Checksum>,
    namespaces: HashMap<String, String>,
}

impl KnownResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known set built from previously resolved holders. Failed holders carry
    /// no content and are skipped.
    pub fn from_holders<'a>(holders: impl IntoIterator<Item = &'a ResourceHolder>) -> Self {
        let mut known = Self::new();
        for holder in holders {
            let Some(checksum) = holder.checksum() else {
                continue;
            };
            known
                .checksums
                .insert(holder.system_id().to_string(), checksum.clone());
            if let Some(namespace) = holder.target_namespace() {
                known.insert_namespace(holder.system_id(), namespace);
            }
        }
        known
    }

    /// Known set read from a previous JSON `resolve` report.
    pub fn from_report_json(content: &str) -> Result<Self> {
        let report: Report = serde_json::from_str(content)?;
        let mut known = Self::new();
        for entry in report.resources {
            let Some(checksum) = entry.checksum else {
                continue;
            };
            if let Some(namespace) = &entry.target_namespace {
                known.insert_namespace(&entry.system_id, namespace);
            }
            known.checksums.insert(entry.system_id, checksum);
        }
        Ok(known)
    }

    pub fn insert(&mut self, system_id: impl Into<String>, content: &[u8]) {
        self.checksums
            .insert(system_id.into(), Checksum::from_bytes(content));
    }

    pub fn with(mut self, system_id: impl Into<String>, content: &[u8]) -> Self {
        self.insert(system_id, content);
        self
    }

    /// Record that `system_id` declares `namespace` as its target namespace.
    /// When several resources share a namespace the smallest system id wins.
    pub fn insert_namespace(&mut self, system_id: &str, namespace: &str) {
        let entry = self
            .namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| system_id.to_string());
        if system_id < entry.as_str() {
            *entry = system_id.to_string();
        }
    }

    pub fn with_namespace(mut self, system_id: &str, namespace: &str) -> Self {
        self.insert_namespace(system_id, namespace);
        self
    }

    /// System id of the known resource declaring `namespace`.
    pub fn locate_namespace(&self, namespace: &str) -> Option<&str> {
        self.namespaces.get(namespace).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.checksums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }

    /// Identical content is ignored, absent is added, anything else updated.
    /// Failed holders are always ignored.
    pub fn action_for(&self, holder: &ResourceHolder) -> ResourceAction {
        let Some(checksum) = holder.checksum() else {
            return ResourceAction::Ignore;
        };
        match self.checksums.get(holder.system_id()) {
            None => ResourceAction::Add,
            Some(known) if known == checksum => ResourceAction::Ignore,
            Some(_) => ResourceAction::Update,
        }
    }
}
