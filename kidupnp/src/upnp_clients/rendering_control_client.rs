use crate::errors::ControlPointError;
use crate::soap::{extract_child_text, find_child_with_suffix};
use crate::soap_client::{SoapClient, handle_action_response, response_envelope};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RenderingControlClient {
    pub control_url: String,
    pub service_type: String,
    soap: SoapClient,
}

impl RenderingControlClient {
    pub fn new(control_url: String, service_type: String, soap: SoapClient) -> Self {
        Self {
            control_url,
            service_type,
            soap,
        }
    }

    /// RenderingControl:1: GetVolume
    pub fn get_volume(&self, instance_id: u32, channel: &str) -> Result<u16, ControlPointError> {
        let instance_id_str = instance_id.to_string();
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("Channel", channel),
        ];

        let call_result =
            self.soap
                .invoke(&self.control_url, &self.service_type, "GetVolume", &args)?;
        let envelope = response_envelope("GetVolume", &call_result)?;

        let response = find_child_with_suffix(&envelope.body.content, "GetVolumeResponse")
            .ok_or_else(|| ControlPointError::upnp_missing_return_value("GetVolumeResponse"))?;

        let text = extract_child_text(response, "CurrentVolume")?;
        text.parse::<u16>()
            .map_err(|_| ControlPointError::upnp_bad_return_value("CurrentVolume", &text))
    }

    /// RenderingControl:1: SetVolume
    pub fn set_volume(
        &self,
        instance_id: u32,
        channel: &str,
        volume: u16,
    ) -> Result<(), ControlPointError> {
        debug!(instance_id, channel, volume, "SetVolume");
        let instance_id_str = instance_id.to_string();
        let volume_str = volume.to_string();
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("Channel", channel),
            ("DesiredVolume", volume_str.as_str()),
        ];

        let call_result =
            self.soap
                .invoke(&self.control_url, &self.service_type, "SetVolume", &args)?;

        handle_action_response("SetVolume", &call_result)
    }

    /// RenderingControl:1: GetMute
    pub fn get_mute(&self, instance_id: u32, channel: &str) -> Result<bool, ControlPointError> {
        let instance_id_str = instance_id.to_string();
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("Channel", channel),
        ];

        let call_result =
            self.soap
                .invoke(&self.control_url, &self.service_type, "GetMute", &args)?;
        let envelope = response_envelope("GetMute", &call_result)?;

        let response = find_child_with_suffix(&envelope.body.content, "GetMuteResponse")
            .ok_or_else(|| ControlPointError::upnp_missing_return_value("GetMuteResponse"))?;

        let text = extract_child_text(response, "CurrentMute")?;
        parse_mute(&text)
    }

    /// RenderingControl:1: SetMute
    pub fn set_mute(
        &self,
        instance_id: u32,
        channel: &str,
        mute: bool,
    ) -> Result<(), ControlPointError> {
        debug!(instance_id, channel, mute, "SetMute");
        let instance_id_str = instance_id.to_string();
        let mute_str = if mute { "1" } else { "0" };
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("Channel", channel),
            ("DesiredMute", mute_str),
        ];

        let call_result =
            self.soap
                .invoke(&self.control_url, &self.service_type, "SetMute", &args)?;

        handle_action_response("SetMute", &call_result)
    }
}

fn parse_mute(text: &str) -> Result<bool, ControlPointError> {
    match text.to_ascii_lowercase().as_str() {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(ControlPointError::upnp_bad_return_value("CurrentMute", text)),
    }
}
