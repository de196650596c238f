use crate::fetch::{FetchError, FetchedResource, ResourceFetcher};

/// Tries each fetcher in order; the first one that knows the URI answers.
///
/// A hard failure from a fetcher (anything other than not-found or
/// unsupported) is returned immediately rather than masked by later layers.
#[derive(Default)]
pub struct LayeredFetcher {
    layers: Vec<Box<dyn ResourceFetcher>>,
}

impl LayeredFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, fetcher: impl ResourceFetcher + 'static) -> Self {
        self.layers.push(Box::new(fetcher));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ResourceFetcher for LayeredFetcher {
    fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError> {
        for layer in &self.layers {
            match layer.fetch(uri) {
                Ok(resource) => return Ok(resource),
                Err(e) if e.is_miss() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(FetchError::NotFound {
            uri: uri.to_string(),
        })
    }
}
