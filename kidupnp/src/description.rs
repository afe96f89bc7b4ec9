//! Renderer endpoints read from a UPnP device description document.

use std::io::BufReader;
use std::time::Duration;

use tracing::{debug, warn};
use ureq::Agent;
use xmltree::Element;

use crate::errors::ControlPointError;
use crate::soap::{extract_optional_child_text, find_child_with_suffix};
use crate::upnp_clients::resolve_control_url;

const AVTRANSPORT_MARKER: &str = ":service:avtransport:";
const RENDERING_CONTROL_MARKER: &str = ":service:renderingcontrol:";

/// Service type plus absolute control URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub service_type: String,
    pub control_url: String,
}

#[derive(Clone, Debug)]
pub struct RendererInfo {
    pub udn: String,
    pub friendly_name: String,
    pub manufacturer: String,
    pub model_name: String,
    pub location: String,
    pub avtransport: Option<ServiceEndpoint>,
    pub rendering_control: Option<ServiceEndpoint>,
}

/// Fetch and parse the description.xml published by a renderer.
pub fn fetch_renderer_info(
    location: &str,
    timeout: Duration,
) -> Result<RendererInfo, ControlPointError> {
    debug!(location, "Fetching renderer description");

    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: Agent = config.into();

    let mut response = agent.get(location).call().map_err(|e| {
        ControlPointError::Description(format!("HTTP request to {} failed: {}", location, e))
    })?;

    let body = response.body_mut().read_to_string().map_err(|e| {
        ControlPointError::Description(format!("Failed to read {}: {}", location, e))
    })?;

    parse_description(body.as_bytes(), location)
}

/// Parse a device description. `location` is the URL it was fetched from,
/// used to resolve relative control URLs when no `URLBase` is given.
pub fn parse_description(xml: &[u8], location: &str) -> Result<RendererInfo, ControlPointError> {
    let root = Element::parse(BufReader::new(xml))
        .map_err(|e| ControlPointError::Description(format!("XML parsing error: {}", e)))?;

    let base_url = extract_optional_child_text(&root, "URLBase")
        .unwrap_or_else(|| location.to_string());

    let device = find_child_with_suffix(&root, "device").ok_or_else(|| {
        ControlPointError::Description("Missing required device element: device".to_string())
    })?;

    let udn = extract_optional_child_text(device, "UDN").ok_or_else(|| {
        ControlPointError::Description("Missing required device element: UDN".to_string())
    })?;
    let friendly_name = extract_optional_child_text(device, "friendlyName").ok_or_else(|| {
        ControlPointError::Description("Missing required device element: friendlyName".to_string())
    })?;

    let mut info = RendererInfo {
        udn,
        friendly_name,
        manufacturer: extract_optional_child_text(device, "manufacturer").unwrap_or_default(),
        model_name: extract_optional_child_text(device, "modelName").unwrap_or_default(),
        location: location.to_string(),
        avtransport: None,
        rendering_control: None,
    };

    collect_services(device, &base_url, &mut info);

    if info.avtransport.is_none() {
        warn!(
            renderer = info.friendly_name.as_str(),
            "Description exposes no AVTransport service"
        );
    }

    Ok(info)
}

/// Walks a device and its embedded devices, keeping the first match per service.
fn collect_services(device: &Element, base_url: &str, info: &mut RendererInfo) {
    if let Some(service_list) = find_child_with_suffix(device, "serviceList") {
        for service in service_list
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .filter(|e| e.name.ends_with("service"))
        {
            let (Some(service_type), Some(control_url)) = (
                extract_optional_child_text(service, "serviceType"),
                extract_optional_child_text(service, "controlURL"),
            ) else {
                continue;
            };

            let lower = service_type.to_ascii_lowercase();
            let slot = if lower.contains(AVTRANSPORT_MARKER) {
                &mut info.avtransport
            } else if lower.contains(RENDERING_CONTROL_MARKER) {
                &mut info.rendering_control
            } else {
                continue;
            };

            if slot.is_none() {
                let control_url = resolve_control_url(base_url, &control_url);
                debug!(
                    renderer = info.friendly_name.as_str(),
                    service_type = service_type.as_str(),
                    control_url = control_url.as_str(),
                    "Found renderer service"
                );
                *slot = Some(ServiceEndpoint {
                    service_type,
                    control_url,
                });
            }
        }
    }

    if let Some(device_list) = find_child_with_suffix(device, "deviceList") {
        for embedded in device_list
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .filter(|e| e.name.ends_with("device"))
        {
            collect_services(embedded, base_url, info);
        }
    }
}
