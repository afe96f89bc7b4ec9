use tracing::debug;

use crate::errors::ControlPointError;
use crate::model::{MediaInfo, PositionInfo, TransportInfo, TransportState, TransportStatus};
use crate::soap::{
    SoapEnvelope, extract_child_text, extract_optional_child_text, find_child_with_suffix,
};
use crate::soap_client::{SoapCallResult, SoapClient, handle_action_response, response_envelope};

#[derive(Debug, Clone)]
pub struct AvTransportClient {
    pub control_url: String,
    pub service_type: String,
    soap: SoapClient,
}

impl AvTransportClient {
    pub fn new(control_url: String, service_type: String, soap: SoapClient) -> Self {
        Self {
            control_url,
            service_type,
            soap,
        }
    }

    /// AVTransport:1: SetAVTransportURI
    pub fn set_av_transport_uri(
        &self,
        instance_id: u32,
        uri: &str,
        metadata: &str,
    ) -> Result<(), ControlPointError> {
        debug!(instance_id, uri, "SetAVTransportURI");
        let instance_id_str = instance_id.to_string();
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("CurrentURI", uri),
            ("CurrentURIMetaData", metadata),
        ];

        let call_result = self.soap.invoke(
            &self.control_url,
            &self.service_type,
            "SetAVTransportURI",
            &args,
        )?;

        handle_action_response("SetAVTransportURI", &call_result)
    }

    /// AVTransport:1: Play
    pub fn play(&self, instance_id: u32, speed: &str) -> Result<(), ControlPointError> {
        let instance_id_str = instance_id.to_string();
        let args = [("InstanceID", instance_id_str.as_str()), ("Speed", speed)];

        let call_result = self
            .soap
            .invoke(&self.control_url, &self.service_type, "Play", &args)?;

        handle_action_response("Play", &call_result)
    }

    /// AVTransport:1: Pause
    pub fn pause(&self, instance_id: u32) -> Result<(), ControlPointError> {
        self.simple_action("Pause", instance_id)
    }

    /// AVTransport:1: Stop
    pub fn stop(&self, instance_id: u32) -> Result<(), ControlPointError> {
        self.simple_action("Stop", instance_id)
    }

    /// AVTransport:1: Seek
    pub fn seek(&self, instance_id: u32, unit: &str, target: &str) -> Result<(), ControlPointError> {
        debug!(instance_id, unit, target, "Seek");
        let instance_id_str = instance_id.to_string();
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("Unit", unit),
            ("Target", target),
        ];

        let call_result = self
            .soap
            .invoke(&self.control_url, &self.service_type, "Seek", &args)?;

        handle_action_response("Seek", &call_result)
    }

    /// AVTransport:1: GetTransportInfo
    pub fn get_transport_info(&self, instance_id: u32) -> Result<TransportInfo, ControlPointError> {
        let call_result = self.query("GetTransportInfo", instance_id)?;
        let envelope = response_envelope("GetTransportInfo", &call_result)?;
        parse_transport_info(envelope)
    }

    /// AVTransport:1: GetPositionInfo
    pub fn get_position_info(&self, instance_id: u32) -> Result<PositionInfo, ControlPointError> {
        let call_result = self.query("GetPositionInfo", instance_id)?;
        let envelope = response_envelope("GetPositionInfo", &call_result)?;
        parse_position_info(envelope)
    }

    /// AVTransport:1: GetMediaInfo
    pub fn get_media_info(&self, instance_id: u32) -> Result<MediaInfo, ControlPointError> {
        let call_result = self.query("GetMediaInfo", instance_id)?;
        let envelope = response_envelope("GetMediaInfo", &call_result)?;
        parse_media_info(envelope)
    }

    fn simple_action(&self, action: &str, instance_id: u32) -> Result<(), ControlPointError> {
        let call_result = self.query(action, instance_id)?;
        handle_action_response(action, &call_result)
    }

    fn query(
        &self,
        action: &str,
        instance_id: u32,
    ) -> Result<SoapCallResult, ControlPointError> {
        let instance_id_str = instance_id.to_string();
        let args = [("InstanceID", instance_id_str.as_str())];
        self.soap
            .invoke(&self.control_url, &self.service_type, action, &args)
    }
}

fn parse_transport_info(envelope: &SoapEnvelope) -> Result<TransportInfo, ControlPointError> {
    let response = find_child_with_suffix(&envelope.body.content, "GetTransportInfoResponse")
        .ok_or_else(|| ControlPointError::upnp_missing_return_value("GetTransportInfoResponse"))?;

    let state = extract_child_text(response, "CurrentTransportState")?;
    let status = extract_optional_child_text(response, "CurrentTransportStatus")
        .unwrap_or_else(|| "OK".to_string());
    let speed =
        extract_optional_child_text(response, "CurrentSpeed").unwrap_or_else(|| "1".to_string());

    Ok(TransportInfo {
        current_transport_state: TransportState::from_upnp_state(&state),
        current_transport_status: TransportStatus::from_upnp_status(&status),
        current_speed: speed,
    })
}

fn parse_position_info(envelope: &SoapEnvelope) -> Result<PositionInfo, ControlPointError> {
    let response = find_child_with_suffix(&envelope.body.content, "GetPositionInfoResponse")
        .ok_or_else(|| ControlPointError::upnp_missing_return_value("GetPositionInfoResponse"))?;

    let track = match extract_optional_child_text(response, "Track") {
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| ControlPointError::upnp_bad_return_value("Track", &text))?,
        None => 0,
    };

    Ok(PositionInfo {
        track,
        track_duration: extract_optional_child_text(response, "TrackDuration"),
        track_metadata: extract_optional_child_text(response, "TrackMetaData"),
        track_uri: extract_optional_child_text(response, "TrackURI"),
        rel_time: extract_optional_child_text(response, "RelTime"),
        abs_time: extract_optional_child_text(response, "AbsTime"),
        rel_count: extract_optional_child_text(response, "RelCount")
            .and_then(|c| c.parse::<i64>().ok()),
        abs_count: extract_optional_child_text(response, "AbsCount")
            .and_then(|c| c.parse::<i64>().ok()),
    })
}

fn parse_media_info(envelope: &SoapEnvelope) -> Result<MediaInfo, ControlPointError> {
    let response = find_child_with_suffix(&envelope.body.content, "GetMediaInfoResponse")
        .ok_or_else(|| ControlPointError::upnp_missing_return_value("GetMediaInfoResponse"))?;

    let number_of_tracks = match extract_optional_child_text(response, "NrTracks") {
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| ControlPointError::upnp_bad_return_value("NrTracks", &text))?,
        None => 0,
    };

    Ok(MediaInfo {
        number_of_tracks,
        media_duration: extract_optional_child_text(response, "MediaDuration"),
        current_uri: extract_optional_child_text(response, "CurrentURI"),
        current_uri_metadata: extract_optional_child_text(response, "CurrentURIMetaData"),
        next_uri: extract_optional_child_text(response, "NextURI"),
        next_uri_metadata: extract_optional_child_text(response, "NextURIMetaData"),
        play_medium: extract_optional_child_text(response, "PlayMedium"),
        record_medium: extract_optional_child_text(response, "RecordMedium"),
        write_status: extract_optional_child_text(response, "WriteStatus"),
    })
}
