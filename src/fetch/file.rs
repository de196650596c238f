use crate::fetch::{classify, FetchError, FetchedResource, ResourceFetcher};
use url::Url;

/// Fetcher for `file:` URIs.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceFetcher for FileFetcher {
    fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError> {
        let unsupported = || FetchError::Unsupported {
            uri: uri.to_string(),
        };
        let url = Url::parse(uri).map_err(|_| unsupported())?;
        if url.scheme() != "file" {
            return Err(unsupported());
        }
        let path = url.to_file_path().map_err(|_| unsupported())?;

        let content = std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound {
                    uri: uri.to_string(),
                }
            } else {
                FetchError::Io {
                    uri: uri.to_string(),
                    source: e,
                }
            }
        })?;
        tracing::trace!("read {} bytes from {}", content.len(), path.display());

        let resource_type = classify(uri, &content);
        Ok(FetchedResource {
            content,
            resource_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    #[test]
    fn reads_file_uri() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("order.xsd");
        std::fs::write(&path, "<xs:schema/>").unwrap();
        let uri = Url::from_file_path(&path).unwrap();

        let fetched = FileFetcher::new().fetch(uri.as_str()).unwrap();
        assert_eq!(fetched.resource_type, ResourceType::Schema);
        assert_eq!(fetched.content, b"<xs:schema/>");
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let uri = Url::from_file_path(tmp.path().join("missing.xsd")).unwrap();
        let err = FileFetcher::new().fetch(uri.as_str()).unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[test]
    fn other_schemes_unsupported() {
        let err = FileFetcher::new().fetch("http://example.com/a.xsd").unwrap_err();
        assert!(matches!(err, FetchError::Unsupported { .. }));
        let err = FileFetcher::new().fetch("not a uri").unwrap_err();
        assert!(matches!(err, FetchError::Unsupported { .. }));
    }
}
