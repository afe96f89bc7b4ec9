use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};
use ureq::Agent;

use crate::errors::ControlPointError;
use crate::soap::{SoapEnvelope, build_soap_request, parse_soap_envelope, parse_upnp_error};

/// Result of a SOAP call:
/// - HTTP status code
/// - raw XML body (always)
/// - parsed SOAP envelope if parsing succeeded
#[derive(Debug, Clone)]
pub struct SoapCallResult {
    pub status: u16,
    pub raw_body: String,
    pub envelope: Option<SoapEnvelope>,
}

impl SoapCallResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP side of the SOAP control protocol.
///
/// The agent keeps 4xx/5xx answers as regular responses so that SOAP Faults
/// (sent with HTTP 500) can be read and reported with their UPnP error code.
#[derive(Clone)]
pub struct SoapClient {
    agent: Agent,
    timeout: Duration,
}

impl fmt::Debug for SoapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapClient")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SoapClient {
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke a UPnP SOAP action on a control URL.
    ///
    /// - `control_url`: full HTTP URL of the service control endpoint
    /// - `service_type`: service URN, e.g. "urn:schemas-upnp-org:service:AVTransport:1"
    /// - `action`: action name, e.g. "GetTransportInfo"
    /// - `args`: list of (name, value) pairs, e.g. &[("InstanceID", "0")]
    pub fn invoke(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(&str, &str)],
    ) -> Result<SoapCallResult, ControlPointError> {
        let body_xml = build_soap_request(service_type, action, args)
            .map_err(|e| ControlPointError::SoapBuild(action.to_string(), e.to_string()))?;

        let soap_action_header = format!(r#""{}#{}""#, service_type, action);
        debug!(action, control_url, "Sending SOAP action");
        trace!(action, body = %body_xml, "SOAP request body");

        let mut response = self
            .agent
            .post(control_url)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .header("SOAPAction", &soap_action_header)
            .send(body_xml)
            .map_err(|e| ControlPointError::SoapTransport(action.to_string(), e.to_string()))?;

        let status = response.status().as_u16();

        let raw_body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ControlPointError::SoapTransport(action.to_string(), e.to_string()))?;

        trace!(action, status, body = %raw_body, "SOAP response body");

        // A body that is not valid SOAP still yields status + raw body.
        let envelope = if raw_body.trim().is_empty() {
            None
        } else {
            parse_soap_envelope(raw_body.as_bytes()).ok()
        };

        Ok(SoapCallResult {
            status,
            raw_body,
            envelope,
        })
    }
}

pub fn ensure_success(action: &str, call_result: &SoapCallResult) -> Result<(), ControlPointError> {
    if call_result.is_success() {
        return Ok(());
    }

    if let Some(env) = &call_result.envelope {
        if let Some(err) = parse_upnp_error(env) {
            return Err(ControlPointError::SoapUpnpFault(
                action.to_string(),
                err.error_code,
                err.error_description,
                call_result.status,
            ));
        }
    }

    Err(ControlPointError::SoapActionWrongBody(
        action.to_string(),
        call_result.status,
        call_result.raw_body.clone(),
    ))
}

/// Checks the outcome of an action with no return values.
pub fn handle_action_response(
    action: &str,
    call_result: &SoapCallResult,
) -> Result<(), ControlPointError> {
    ensure_success(action, call_result)?;

    if let Some(env) = &call_result.envelope {
        if let Some(err) = parse_upnp_error(env) {
            return Err(ControlPointError::SoapUpnpFault(
                action.to_string(),
                err.error_code,
                err.error_description,
                call_result.status,
            ));
        }
    }

    Ok(())
}

/// Checks the outcome of an action with return values and hands back its envelope.
pub fn response_envelope<'a>(
    action: &str,
    call_result: &'a SoapCallResult,
) -> Result<&'a SoapEnvelope, ControlPointError> {
    handle_action_response(action, call_result)?;

    call_result
        .envelope
        .as_ref()
        .ok_or_else(|| ControlPointError::SoapNoEnvelope(action.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_result(status: u16, body: &str) -> SoapCallResult {
        SoapCallResult {
            status,
            raw_body: body.to_string(),
            envelope: parse_soap_envelope(body.as_bytes()).ok(),
        }
    }

    const FAULT: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>701</errorCode><errorDescription>Transition not available</errorDescription></UPnPError></detail></s:Fault></s:Body></s:Envelope>"#;

    #[test]
    fn test_fault_is_reported_with_code() {
        let result = call_result(500, FAULT);
        match ensure_success("Pause", &result) {
            Err(ControlPointError::SoapUpnpFault(action, code, description, status)) => {
                assert_eq!(action, "Pause");
                assert_eq!(code, 701);
                assert_eq!(description, "Transition not available");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_http_error_without_fault_keeps_body() {
        let result = call_result(404, "Not Found");
        assert!(matches!(
            ensure_success("Play", &result),
            Err(ControlPointError::SoapActionWrongBody(_, 404, body)) if body == "Not Found"
        ));
    }

    #[test]
    fn test_fault_with_success_status_is_rejected() {
        let result = call_result(200, FAULT);
        assert!(ensure_success("Stop", &result).is_ok());
        assert!(handle_action_response("Stop", &result).is_err());
    }

    #[test]
    fn test_empty_success_body_is_accepted_for_commands() {
        let result = SoapCallResult {
            status: 200,
            raw_body: String::new(),
            envelope: None,
        };
        assert!(handle_action_response("Play", &result).is_ok());
        assert!(matches!(
            response_envelope("GetMediaInfo", &result),
            Err(ControlPointError::SoapNoEnvelope(_))
        ));
    }
}
