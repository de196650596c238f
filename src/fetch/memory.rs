use crate::fetch::{classify, FetchError, FetchedResource, ResourceFetcher};
use crate::resource::ResourceType;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Entry {
    Available(FetchedResource),
    Broken(String),
}

/// Fetcher over a fixed set of documents held in memory.
///
/// Serves the "already imported" store when layered in front of a remote
/// fetcher, and doubles as a fixture in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    entries: HashMap<String, Entry>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, classifying it from its URI and content.
    pub fn insert(&mut self, uri: impl Into<String>, content: impl Into<Vec<u8>>) {
        let uri = uri.into();
        let content = content.into();
        let resource_type = classify(&uri, &content);
        self.insert_typed(uri, resource_type, content);
    }

    pub fn insert_typed(
        &mut self,
        uri: impl Into<String>,
        resource_type: ResourceType,
        content: impl Into<Vec<u8>>,
    ) {
        self.entries.insert(
            uri.into(),
            Entry::Available(FetchedResource {
                content: content.into(),
                resource_type,
            }),
        );
    }

    /// Register a URI whose retrieval always fails with `message`.
    pub fn insert_broken(&mut self, uri: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(uri.into(), Entry::Broken(message.into()));
    }

    pub fn with(mut self, uri: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, content);
        self
    }

    pub fn with_broken(mut self, uri: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert_broken(uri, message);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceFetcher for InMemoryFetcher {
    fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError> {
        match self.entries.get(uri) {
            Some(Entry::Available(resource)) => Ok(resource.clone()),
            Some(Entry::Broken(message)) => Err(FetchError::Other(message.clone())),
            None => Err(FetchError::NotFound {
                uri: uri.to_string(),
            }),
        }
    }
}
