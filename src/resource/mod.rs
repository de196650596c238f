pub mod checksum;
pub mod summary;

pub use checksum::Checksum;
pub use summary::{DependencyScope, DependencySummary, Direction};

use crate::extract::ParseError;
use crate::fetch::FetchError;
use serde::Serialize;
use std::sync::Arc;

/// Content classification of an importable resource.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Schema,
    Wsdl,
    #[default]
    Other,
}

impl ResourceType {
    /// Filename suffix conventionally used for this type.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            ResourceType::Schema => Some("xsd"),
            ResourceType::Wsdl => Some("wsdl"),
            ResourceType::Other => None,
        }
    }

    /// Classify from the path component of a URI or file name.
    pub fn from_path(path: &str) -> Option<Self> {
        let lower = path.to_ascii_lowercase();
        [ResourceType::Schema, ResourceType::Wsdl]
            .into_iter()
            .find(|t| t.suffix().is_some_and(|s| lower.ends_with(&format!(".{s}"))))
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Schema => write!(f, "schema"),
            ResourceType::Wsdl => write!(f, "wsdl"),
            ResourceType::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Ok,
    Error,
    Warning,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Ok => write!(f, "OK"),
            ResourceStatus::Error => write!(f, "Failed"),
            ResourceStatus::Warning => write!(f, "Warning"),
        }
    }
}

/// What the caller intends to do with a resource.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceAction {
    #[default]
    Add,
    Update,
    Ignore,
    Delete,
}

impl std::fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceAction::Add => write!(f, "Create"),
            ResourceAction::Update => write!(f, "Update"),
            ResourceAction::Ignore => write!(f, "Ignore"),
            ResourceAction::Delete => write!(f, "Delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Fetch,
    Parse,
    /// Left out by the resolve policy.
    Skipped,
}

/// Node-local failure kept on a holder instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&FetchError> for ResourceFailure {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: FailureKind::Fetch,
            message: err.to_string(),
        }
    }
}

impl From<&ParseError> for ResourceFailure {
    fn from(err: &ParseError) -> Self {
        Self {
            kind: FailureKind::Parse,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ResourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::Fetch => write!(f, "fetch failed: {}", self.message),
            FailureKind::Parse => write!(f, "parse failed: {}", self.message),
            FailureKind::Skipped => write!(f, "skipped: {}", self.message),
        }
    }
}

/// One node of the dependency graph.
#[derive(Debug, Clone)]
pub struct ResourceHolder {
    system_id: String,
    resource_type: ResourceType,
    details: String,
    content: Option<Arc<[u8]>>,
    checksum: Option<Checksum>,
    error: Option<ResourceFailure>,
    warnings: Vec<String>,
    action: ResourceAction,
}

impl ResourceHolder {
    /// Holder for a resource whose content was fetched and parsed.
    pub fn resolved(
        system_id: impl Into<String>,
        resource_type: ResourceType,
        details: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
    ) -> Self {
        let content = content.into();
        Self {
            system_id: system_id.into(),
            resource_type,
            details: details.into(),
            checksum: Some(Checksum::from_bytes(&content)),
            content: Some(content),
            error: None,
            warnings: Vec::new(),
            action: ResourceAction::Add,
        }
    }

    /// Holder for a resource that could not be fetched or parsed.
    pub fn failed(
        system_id: impl Into<String>,
        resource_type: ResourceType,
        failure: ResourceFailure,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            resource_type,
            details: String::new(),
            content: None,
            checksum: None,
            error: Some(failure),
            warnings: Vec::new(),
            action: ResourceAction::Ignore,
        }
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    pub fn error(&self) -> Option<&ResourceFailure> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn remove_warning(&mut self, warning: &str) {
        self.warnings.retain(|w| w != warning);
    }

    pub fn status(&self) -> ResourceStatus {
        if self.error.is_some() {
            ResourceStatus::Error
        } else if !self.warnings.is_empty() {
            ResourceStatus::Warning
        } else {
            ResourceStatus::Ok
        }
    }

    pub fn action(&self) -> ResourceAction {
        self.action
    }

    pub fn set_action(&mut self, action: ResourceAction) {
        self.action = action;
    }

    /// Target namespace for schemas and WSDLs, if one was declared.
    pub fn target_namespace(&self) -> Option<&str> {
        match self.resource_type {
            ResourceType::Schema | ResourceType::Wsdl => {
                self.details.strip_prefix("TNS: ").filter(|s| !s.is_empty())
            }
            ResourceType::Other => None,
        }
    }

    /// Should this resource be saved by the caller.
    pub fn is_persist(&self) -> bool {
        !self.is_error() && matches!(self.action, ResourceAction::Add | ResourceAction::Update)
    }
}
