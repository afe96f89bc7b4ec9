/// Default protocolInfo when the caller does not know the stream type.
pub const DEFAULT_PROTOCOL_INFO: &str = "http-get:*:*:*";

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// UPnP class guessed from the MIME part of a protocolInfo
/// (`http-get:*:audio/mpeg:*`).
fn upnp_class(protocol_info: &str) -> &'static str {
    let mime = protocol_info.split(':').nth(2).unwrap_or("");
    if mime.starts_with("audio/") {
        "object.item.audioItem.musicTrack"
    } else if mime.starts_with("video/") {
        "object.item.videoItem"
    } else if mime.starts_with("image/") {
        "object.item.imageItem.photo"
    } else {
        "object.item"
    }
}

/// Builds a single-item DIDL-Lite document for SetAVTransportURI.
///
/// The result is plain XML; the SOAP emitter escapes it once more when it is
/// placed in `CurrentURIMetaData`.
pub fn minimal_metadata(uri: &str, title: &str, protocol_info: Option<&str>) -> String {
    let protocol_info = protocol_info.unwrap_or(DEFAULT_PROTOCOL_INFO);
    format!(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="0" parentID="-1" restricted="1"><dc:title>{}</dc:title><upnp:class>{}</upnp:class><res protocolInfo="{}">{}</res></item></DIDL-Lite>"#,
        xml_escape(title),
        upnp_class(protocol_info),
        xml_escape(protocol_info),
        xml_escape(uri)
    )
}
