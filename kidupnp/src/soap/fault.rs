//! UPnP errors carried in SOAP Faults

use super::SoapEnvelope;
use super::error_codes::*;
use super::parser::find_child_with_suffix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpnpError {
    pub error_code: u32,
    pub error_description: String,
}

/// Extracts `Fault/detail/UPnPError` from a response envelope.
pub fn parse_upnp_error(envelope: &SoapEnvelope) -> Option<UpnpError> {
    let fault = find_child_with_suffix(&envelope.body.content, "Fault")?;
    let detail = find_child_with_suffix(fault, "detail")?;
    let upnp_error = find_child_with_suffix(detail, "UPnPError")?;

    let error_code = find_child_with_suffix(upnp_error, "errorCode")?
        .get_text()?
        .trim()
        .parse::<u32>()
        .ok()?;

    let error_description = find_child_with_suffix(upnp_error, "errorDescription")
        .and_then(|elem| elem.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| describe_error_code(error_code).to_string());

    Some(UpnpError {
        error_code,
        error_description,
    })
}

/// Fallback description for renderers that send a bare error code.
pub fn describe_error_code(code: u32) -> &'static str {
    match code {
        INVALID_ACTION => "Invalid Action",
        INVALID_ARGS => "Invalid Args",
        ACTION_FAILED => "Action Failed",
        ARGUMENT_VALUE_INVALID => "Argument Value Invalid",
        ARGUMENT_VALUE_OUT_OF_RANGE => "Argument Value Out of Range",
        OPTIONAL_ACTION_NOT_IMPLEMENTED => "Optional Action Not Implemented",
        TRANSITION_NOT_AVAILABLE => "Transition not available",
        NO_CONTENTS => "No contents",
        SEEK_MODE_NOT_SUPPORTED => "Seek mode not supported",
        ILLEGAL_SEEK_TARGET => "Illegal seek target",
        ILLEGAL_MIME_TYPE => "Illegal MIME-type",
        INVALID_INSTANCE_ID => "Invalid InstanceID",
        _ => "Unknown error",
    }
}
