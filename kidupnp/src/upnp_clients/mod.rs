mod avtransport_client;
mod rendering_control_client;

pub use crate::upnp_clients::avtransport_client::AvTransportClient;
pub use crate::upnp_clients::rendering_control_client::RenderingControlClient;

/// Resolve a possibly relative controlURL against a base URL.
///
/// - If `control_url` is already absolute (starts with http:// or https://), it is returned as-is.
/// - Otherwise, it is resolved against the scheme://host:port of `base_url`.
pub fn resolve_control_url(base_url: &str, control_url: &str) -> String {
    let control_url = control_url.trim();
    if control_url.starts_with("http://") || control_url.starts_with("https://") {
        return control_url.to_string();
    }

    if let Some((scheme, rest)) = base_url.trim().split_once("://") {
        let authority = rest.split('/').next().unwrap_or(rest);
        if !authority.is_empty() {
            let base = format!("{}://{}", scheme, authority);
            if control_url.starts_with('/') {
                return format!("{}{}", base, control_url);
            }
            return format!("{}/{}", base, control_url);
        }
    }

    control_url.to_string()
}
