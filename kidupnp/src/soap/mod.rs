//! # SOAP support for the control point
//!
//! Client-side half of UPnP SOAP: building action requests, parsing the
//! answers and extracting UPnP faults.
//!
//! - [`build_soap_request`] : action envelope sent to a control URL
//! - [`parse_soap_envelope`] : envelope returned by the renderer
//! - [`parse_upnp_error`] : `UPnPError` carried by a SOAP Fault
//!
//! ## Example
//!
//! ```
//! use kidupnp::soap::{build_soap_request, parse_soap_envelope};
//!
//! let xml = build_soap_request(
//!     "urn:schemas-upnp-org:service:AVTransport:1",
//!     "Play",
//!     &[("InstanceID", "0"), ("Speed", "1")],
//! )
//! .unwrap();
//! assert!(xml.contains("<InstanceID>0</InstanceID>"));
//!
//! let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
//! assert!(envelope.body.content.children.len() > 0);
//! ```

mod builder;
mod fault;
mod parser;

pub use builder::build_soap_request;
pub use fault::{UpnpError, describe_error_code, parse_upnp_error};
pub use parser::{
    SoapBody, SoapEnvelope, SoapParseError, extract_child_text, extract_optional_child_text,
    find_child_with_suffix, parse_soap_envelope,
};

/// Standard UPnP control error codes, plus the AVTransport ones a player runs into.
pub mod error_codes {
    pub const INVALID_ACTION: u32 = 401;
    pub const INVALID_ARGS: u32 = 402;
    pub const ACTION_FAILED: u32 = 501;
    pub const ARGUMENT_VALUE_INVALID: u32 = 600;
    pub const ARGUMENT_VALUE_OUT_OF_RANGE: u32 = 601;
    pub const OPTIONAL_ACTION_NOT_IMPLEMENTED: u32 = 602;

    // AVTransport:1
    pub const TRANSITION_NOT_AVAILABLE: u32 = 701;
    pub const NO_CONTENTS: u32 = 702;
    pub const SEEK_MODE_NOT_SUPPORTED: u32 = 710;
    pub const ILLEGAL_SEEK_TARGET: u32 = 711;
    pub const ILLEGAL_MIME_TYPE: u32 = 714;
    pub const INVALID_INSTANCE_ID: u32 = 718;
}
