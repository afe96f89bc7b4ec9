use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlPointError {
    #[error("RendererPlayer operation '{0}' is not supported by renderer '{1}'")]
    UpnpOperationNotSupported(String, String),
    #[error("Missing {0} element in SOAP body")]
    UpnpMissingReturnValue(String),
    #[error("Invalid {0} value: {1}")]
    UpnpBadReturnValue(String, String),
    #[error("Soap Error: cannot build request for action {0}: {1}")]
    SoapBuild(String, String),
    #[error("Soap Error: HTTP transport failed for action {0}: {1}")]
    SoapTransport(String, String),
    #[error("{0} returned UPnP error {1}: {2} (HTTP status {3})")]
    SoapUpnpFault(String, u32, String, u16),
    #[error("{0} failed with HTTP status {1} and body: {2}")]
    SoapActionWrongBody(String, u16, String),
    #[error("Soap Error: No envelope for action {0}")]
    SoapNoEnvelope(String),
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("Description Error: {0}")]
    Description(String),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Action executor for renderer '{0}' is closed")]
    ExecutorClosed(String),
    #[error("Cannot spawn thread {0}: {1}")]
    ThreadSpawn(String, String),
}

impl ControlPointError {
    pub fn upnp_operation_not_supported(operation: &str, renderer: &str) -> Self {
        ControlPointError::UpnpOperationNotSupported(operation.to_string(), renderer.to_string())
    }

    pub fn upnp_missing_return_value(value: &str) -> Self {
        ControlPointError::UpnpMissingReturnValue(value.to_string())
    }

    pub fn upnp_bad_return_value(name: &str, value: &str) -> Self {
        ControlPointError::UpnpBadReturnValue(name.to_string(), value.to_string())
    }
}
