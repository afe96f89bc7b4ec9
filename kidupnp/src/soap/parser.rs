//! SOAP response parsing

use std::io::BufReader;

use xmltree::{Element, XMLNode};

use crate::errors::ControlPointError;

/// A parsed response envelope. A control point only reads the Body; any
/// SOAP Header is skipped.
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    pub body: SoapBody,
}

/// Body element, holding the `<Action>Response` or a `Fault`.
#[derive(Debug, Clone)]
pub struct SoapBody {
    pub content: Element,
}

impl SoapEnvelope {
    pub fn new(body: SoapBody) -> Self {
        Self { body }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parses a complete SOAP envelope.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    let body_elem = root
        .children
        .iter()
        .find_map(|n| n.as_element().filter(|e| e.name.ends_with("Body")))
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope::new(SoapBody {
        content: body_elem.clone(),
    }))
}

pub fn find_child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if elem.name.ends_with(suffix) => Some(elem),
        _ => None,
    })
}

/// Trimmed text of a mandatory child element.
pub fn extract_child_text(parent: &Element, suffix: &str) -> Result<String, ControlPointError> {
    let child = find_child_with_suffix(parent, suffix)
        .ok_or_else(|| ControlPointError::upnp_missing_return_value(suffix))?;

    child
        .get_text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ControlPointError::upnp_bad_return_value(suffix, ""))
}

/// Trimmed text of an optional child element; absent or empty gives `None`.
pub fn extract_optional_child_text(parent: &Element, suffix: &str) -> Option<String> {
    find_child_with_suffix(parent, suffix)
        .and_then(|child| child.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSPORT_INFO: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:GetTransportInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
      <CurrentTransportState>PLAYING</CurrentTransportState>
      <CurrentTransportStatus>OK</CurrentTransportStatus>
      <CurrentSpeed>1</CurrentSpeed>
      <NextURI></NextURI>
    </u:GetTransportInfoResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_parse_envelope_and_children() {
        let envelope = parse_soap_envelope(TRANSPORT_INFO.as_bytes()).unwrap();

        let response =
            find_child_with_suffix(&envelope.body.content, "GetTransportInfoResponse").unwrap();
        assert_eq!(
            extract_child_text(response, "CurrentTransportState").unwrap(),
            "PLAYING"
        );
        assert_eq!(extract_optional_child_text(response, "NextURI"), None);
        assert!(extract_child_text(response, "Missing").is_err());
    }

    #[test]
    fn test_header_is_skipped() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header><t:Session xmlns:t="urn:x">42</t:Session></s:Header><s:Body><u:StopResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"/></s:Body></s:Envelope>"#;
        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        assert_eq!(envelope.body.content.name, "Body");
        assert!(find_child_with_suffix(&envelope.body.content, "StopResponse").is_some());
    }

    #[test]
    fn test_parse_rejects_non_envelope() {
        let err = parse_soap_envelope(b"<root><Body/></root>").unwrap_err();
        assert!(matches!(err, SoapParseError::MissingEnvelope));

        let err = parse_soap_envelope(b"<s:Envelope xmlns:s=\"x\"></s:Envelope>").unwrap_err();
        assert!(matches!(err, SoapParseError::MissingBody));

        assert!(parse_soap_envelope(b"not xml").is_err());
    }
}
