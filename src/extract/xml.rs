//! Reference extraction for XML Schema and WSDL 1.1 documents.
//!
//! Only the reference-bearing elements are inspected; grammar correctness of
//! the documents is not checked.

use crate::extract::{resolve_reference, Extraction, ParseError, ReferenceExtractor};
use crate::resource::ResourceType;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";

/// Namespace-qualified element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementName {
    pub namespace: Option<String>,
    pub local: String,
}

impl ElementName {
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

/// Name of the document element, or None if the content is not XML.
pub fn document_element(content: &[u8]) -> Option<ElementName> {
    let mut reader = NsReader::from_reader(content);
    let mut buf = Vec::new();
    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) | Ok((ns, Event::Empty(e))) => {
                return Some(element_name(&ns, &e));
            }
            Ok((_, Event::Eof)) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn element_name(ns: &ResolveResult, e: &BytesStart) -> ElementName {
    let namespace = match ns {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    };
    ElementName {
        namespace,
        local: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
    }
}

fn attribute(e: &BytesStart, name: &str) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Extracts `xsd:import`, `xsd:include`, `xsd:redefine`, `xsd:override` and
/// (optionally) `wsdl:import` locations.
#[derive(Debug, Clone)]
pub struct XmlReferenceExtractor {
    follow_wsdl_imports: bool,
}

impl XmlReferenceExtractor {
    pub fn new() -> Self {
        Self {
            follow_wsdl_imports: true,
        }
    }

    pub fn with_follow_wsdl_imports(mut self, follow: bool) -> Self {
        self.follow_wsdl_imports = follow;
        self
    }

    /// Location attribute of a reference element, if the element is one.
    fn reference_location(
        &self,
        name: &ElementName,
        e: &BytesStart,
    ) -> Result<Option<String>, quick_xml::Error> {
        if name.namespace.as_deref() == Some(XSD_NS)
            && matches!(
                name.local.as_str(),
                "import" | "include" | "redefine" | "override"
            )
        {
            return attribute(e, "schemaLocation");
        }
        if self.follow_wsdl_imports && name.is(WSDL_NS, "import") {
            return attribute(e, "location");
        }
        Ok(None)
    }

    /// Record what one element contributes to the extraction.
    fn element(
        &self,
        system_id: &str,
        name: &ElementName,
        e: &BytesStart,
        is_root: bool,
        extraction: &mut Extraction,
    ) -> Result<(), ParseError> {
        let xml_err = |err: quick_xml::Error| malformed(system_id, err.to_string());

        if is_root && (name.is(XSD_NS, "schema") || name.is(WSDL_NS, "definitions")) {
            let tns = attribute(e, "targetNamespace").map_err(xml_err)?;
            if let Some(tns) = tns.filter(|t| !t.is_empty()) {
                extraction.details = format!("TNS: {tns}");
            }
        }

        let location = self.reference_location(name, e).map_err(xml_err)?;
        match location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => {
                let absolute = resolve_reference(system_id, location)?;
                extraction.references.insert(absolute);
            }
            _ if name.is(XSD_NS, "import") => {
                let namespace = attribute(e, "namespace").map_err(xml_err)?;
                if let Some(namespace) = namespace.filter(|n| !n.trim().is_empty()) {
                    extraction.namespace_imports.insert(namespace.trim().to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn scan(&self, system_id: &str, content: &[u8]) -> Result<Extraction, ParseError> {
        let mut reader = NsReader::from_reader(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut extraction = Extraction::default();
        let mut seen_root = false;
        let mut depth = 0usize;

        loop {
            let event = match reader.read_resolved_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(malformed(
                        system_id,
                        format!("XML parse error at position {}: {e}", reader.error_position()),
                    ));
                }
            };
            match event {
                (ns, Event::Start(e)) => {
                    let name = element_name(&ns, &e);
                    self.element(system_id, &name, &e, !seen_root, &mut extraction)?;
                    seen_root = true;
                    depth += 1;
                }
                (ns, Event::Empty(e)) => {
                    let name = element_name(&ns, &e);
                    self.element(system_id, &name, &e, !seen_root, &mut extraction)?;
                    seen_root = true;
                }
                (_, Event::End(_)) => depth = depth.saturating_sub(1),
                (_, Event::Eof) => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(malformed(system_id, "no document element".to_string()));
        }
        // Truncated content parses cleanly up to the cut, so an unclosed
        // element is the only sign of it.
        if depth != 0 {
            return Err(malformed(
                system_id,
                format!("document ends inside {depth} open element(s)"),
            ));
        }
        Ok(extraction)
    }
}

fn malformed(system_id: &str, message: String) -> ParseError {
    ParseError::Malformed {
        uri: system_id.to_string(),
        message,
    }
}

impl Default for XmlReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceExtractor for XmlReferenceExtractor {
    fn extract_references(
        &self,
        system_id: &str,
        content: &[u8],
        resource_type: ResourceType,
    ) -> Result<Extraction, ParseError> {
        match resource_type {
            ResourceType::Schema | ResourceType::Wsdl => self.scan(system_id, content),
            ResourceType::Other => Ok(Extraction::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn refs(extraction: &Extraction) -> Vec<&str> {
        extraction.references.iter().map(String::as_str).collect()
    }

    #[test]
    fn schema_imports_and_includes() {
        let xsd = br#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:orders">
  <xs:import namespace="urn:address" schemaLocation="address.xsd"/>
  <xs:include schemaLocation="common/types.xsd"></xs:include>
  <xs:import namespace="urn:builtin"/>
  <xs:element name="order" type="xs:string"/>
</xs:schema>"#;
        let extraction = XmlReferenceExtractor::new()
            .extract_references("http://example.com/order.xsd", xsd, ResourceType::Schema)
            .unwrap();
        assert_eq!(extraction.details, "TNS: urn:orders");
        assert_eq!(
            refs(&extraction),
            vec![
                "http://example.com/address.xsd",
                "http://example.com/common/types.xsd"
            ]
        );
        assert_eq!(
            extraction.namespace_imports,
            BTreeSet::from(["urn:builtin".to_string()])
        );
    }

    #[test]
    fn wsdl_imports_and_embedded_schemas() {
        let wsdl = br#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:svc">
  <wsdl:import namespace="urn:base" location="base.wsdl"/>
  <wsdl:types>
    <xsd:schema targetNamespace="urn:inline">
      <xsd:import namespace="urn:orders" schemaLocation="urn:order.xsd"/>
    </xsd:schema>
  </wsdl:types>
</wsdl:definitions>"#;
        let extraction = XmlReferenceExtractor::new()
            .extract_references("file:///svc/svc.wsdl", wsdl, ResourceType::Wsdl)
            .unwrap();
        assert_eq!(extraction.details, "TNS: urn:svc");
        assert_eq!(
            refs(&extraction),
            vec!["file:///svc/base.wsdl", "urn:order.xsd"]
        );

        let without_wsdl = XmlReferenceExtractor::new()
            .with_follow_wsdl_imports(false)
            .extract_references("file:///svc/svc.wsdl", wsdl, ResourceType::Wsdl)
            .unwrap();
        assert_eq!(refs(&without_wsdl), vec!["urn:order.xsd"]);
    }

    #[test]
    fn elements_outside_the_schema_namespace_ignored() {
        let xsd = br#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
  <annotation><appinfo><import xmlns="urn:other" schemaLocation="nope.xsd"/></appinfo></annotation>
</schema>"#;
        let extraction = XmlReferenceExtractor::new()
            .extract_references("urn:a.xsd", xsd, ResourceType::Schema)
            .unwrap();
        assert_eq!(extraction.references, BTreeSet::new());
        assert_eq!(extraction.details, "");
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = XmlReferenceExtractor::new()
            .extract_references("urn:a.xsd", b"<xs:schema><oops></xs:schema>", ResourceType::Schema)
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));

        let err = XmlReferenceExtractor::new()
            .extract_references("urn:a.xsd", b"", ResourceType::Schema)
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn truncated_document_is_parse_error() {
        let xsd = br#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t"><xs:import schemaLocation="urn:b.xsd"/><xs:element name="x">"#;
        let err = XmlReferenceExtractor::new()
            .extract_references("urn:a.xsd", xsd, ResourceType::Schema)
            .unwrap_err();
        assert!(
            matches!(&err, ParseError::Malformed { message, .. } if message.contains("2 open element")),
            "{err}"
        );
    }

    #[test]
    fn import_without_location_recorded_by_namespace() {
        let xsd = br#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:import namespace="urn:address"/>
  <xs:import namespace="urn:orders" schemaLocation="orders.xsd"/>
  <xs:import/>
  <xs:include schemaLocation=""/>
</xs:schema>"#;
        let extraction = XmlReferenceExtractor::new()
            .extract_references("http://example.com/a.xsd", xsd, ResourceType::Schema)
            .unwrap();
        assert_eq!(refs(&extraction), vec!["http://example.com/orders.xsd"]);
        assert_eq!(
            extraction.namespace_imports,
            BTreeSet::from(["urn:address".to_string()])
        );
    }

    #[test]
    fn other_content_has_no_references() {
        let extraction = XmlReferenceExtractor::new()
            .extract_references("urn:x.dtd", b"<!ELEMENT a EMPTY>", ResourceType::Other)
            .unwrap();
        assert!(extraction.references.is_empty());
    }

    #[test]
    fn document_element_detection() {
        let root = document_element(br#"<?xml version="1.0"?><!-- c --><xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#)
            .unwrap();
        assert!(root.is(XSD_NS, "schema"));
        assert!(document_element(b"plain text").is_none());
    }
}
