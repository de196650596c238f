pub mod file;
pub mod layered;
pub mod memory;

pub use file::FileFetcher;
pub use layered::LayeredFetcher;
pub use memory::InMemoryFetcher;

use crate::extract::xml;
use crate::resource::ResourceType;
use thiserror::Error;

/// Raw content retrieved for a URI.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub content: Vec<u8>,
    pub resource_type: ResourceType,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("resource not found for URI '{uri}'")]
    NotFound { uri: String },

    #[error("unsupported URI '{uri}'")]
    Unsupported { uri: String },

    #[error("error reading '{uri}': {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// True when another fetcher may still know the URI.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound { .. } | FetchError::Unsupported { .. }
        )
    }
}

/// Source of resource content.
///
/// Must be idempotent and side-effect free from the resolver's point of view;
/// it may be called from several threads at once.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Box<T> {
    fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError> {
        (**self).fetch(uri)
    }
}

/// Classify content by URI suffix, falling back to the document element.
pub fn classify(uri: &str, content: &[u8]) -> ResourceType {
    let path = url::Url::parse(uri)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| uri.to_string());
    if let Some(t) = ResourceType::from_path(&path) {
        return t;
    }
    match xml::document_element(content) {
        Some(root) if root.is(xml::XSD_NS, "schema") => ResourceType::Schema,
        Some(root) if root.is(xml::WSDL_NS, "definitions") => ResourceType::Wsdl,
        _ => ResourceType::Other,
    }
}
