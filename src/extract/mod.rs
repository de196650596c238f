pub mod xml;

pub use xml::XmlReferenceExtractor;

use crate::resource::ResourceType;
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed document '{uri}': {message}")]
    Malformed { uri: String, message: String },

    #[error("cannot resolve reference '{reference}' against '{base}'")]
    BadReference { base: String, reference: String },
}

/// What a document says about itself and what it points at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Absolute URIs of the documents this one imports or includes.
    pub references: BTreeSet<String>,
    /// Namespaces of `xs:import` elements that carry no location. The
    /// resolver looks these up by target namespace.
    pub namespace_imports: BTreeSet<String>,
    /// Human readable summary, e.g. the target namespace.
    pub details: String,
}

/// Finds the outbound references of a fetched document.
///
/// Implementations resolve relative locations against `system_id` so the
/// graph only ever sees absolute URIs.
pub trait ReferenceExtractor: Send + Sync {
    fn extract_references(
        &self,
        system_id: &str,
        content: &[u8],
        resource_type: ResourceType,
    ) -> Result<Extraction, ParseError>;
}

/// Canonical spelling of an absolute URI.
///
/// Hierarchical URLs are normalized (scheme and host case, dot segments,
/// default ports) so that every spelling of one location maps to the same
/// system id. Opaque URIs such as `urn:` names and strings that do not parse
/// are returned verbatim.
pub fn canonical_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(url) if !url.cannot_be_a_base() => url.to_string(),
        _ => uri.to_string(),
    }
}

/// Resolve `reference` against the URI of the document that contains it.
///
/// The result is in [`canonical_uri`] form whether the reference was
/// absolute or relative.
pub fn resolve_reference(base: &str, reference: &str) -> Result<String, ParseError> {
    let bad = || ParseError::BadReference {
        base: base.to_string(),
        reference: reference.to_string(),
    };
    if Url::parse(reference).is_ok() {
        return Ok(canonical_uri(reference));
    }
    let base_url = Url::parse(base).map_err(|_| bad())?;
    base_url
        .join(reference)
        .map(|u| u.to_string())
        .map_err(|_| bad())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_reference_canonicalized() {
        assert_eq!(
            resolve_reference("urn:order.xsd", "urn:address.xsd").unwrap(),
            "urn:address.xsd"
        );
        assert_eq!(
            resolve_reference("file:///a/b.xsd", "HTTP://Example.com/X.xsd").unwrap(),
            "http://example.com/X.xsd"
        );
    }

    #[test]
    fn spellings_of_one_location_agree() {
        let base = "http://example.com/s/a.xsd";
        let relative = resolve_reference(base, "common/c.xsd").unwrap();
        for spelling in [
            "http://example.com/s/./common/c.xsd",
            "http://EXAMPLE.com:80/s/x/../common/c.xsd",
        ] {
            assert_eq!(resolve_reference(base, spelling).unwrap(), relative);
        }
        assert_eq!(canonical_uri("urn:Vendor:X.xsd"), "urn:Vendor:X.xsd");
        assert_eq!(canonical_uri("not a uri"), "not a uri");
    }

    #[test]
    fn relative_reference_joined() {
        assert_eq!(
            resolve_reference("http://example.com/schemas/order.xsd", "common/address.xsd")
                .unwrap(),
            "http://example.com/schemas/common/address.xsd"
        );
        assert_eq!(
            resolve_reference("file:///svc/wsdl/svc.wsdl", "../xsd/types.xsd").unwrap(),
            "file:///svc/xsd/types.xsd"
        );
    }

    #[test]
    fn relative_against_opaque_base_fails() {
        let err = resolve_reference("urn:order.xsd", "address.xsd").unwrap_err();
        assert!(matches!(err, ParseError::BadReference { .. }));
    }
}
