use crate::time_utils::parse_optional_hhmmss;

/// AVTransport `TransportState` as reported by the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Transitioning,
    PausedPlayback,
    PausedRecording,
    Recording,
    NoMediaPresent,
    /// Vendor-specific state string.
    Custom(String),
}

impl TransportState {
    /// Map a raw UPnP AVTransport CurrentTransportState string.
    pub fn from_upnp_state(raw: &str) -> Self {
        let s = raw.trim().to_ascii_uppercase();
        match s.as_str() {
            "STOPPED" => TransportState::Stopped,
            "PLAYING" => TransportState::Playing,
            "TRANSITIONING" => TransportState::Transitioning,
            "PAUSED_PLAYBACK" => TransportState::PausedPlayback,
            "PAUSED_RECORDING" => TransportState::PausedRecording,
            "RECORDING" => TransportState::Recording,
            "NO_MEDIA_PRESENT" => TransportState::NoMediaPresent,
            _ => TransportState::Custom(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransportState::Stopped => "STOPPED",
            TransportState::Playing => "PLAYING",
            TransportState::Transitioning => "TRANSITIONING",
            TransportState::PausedPlayback => "PAUSED_PLAYBACK",
            TransportState::PausedRecording => "PAUSED_RECORDING",
            TransportState::Recording => "RECORDING",
            TransportState::NoMediaPresent => "NO_MEDIA_PRESENT",
            TransportState::Custom(s) => s.as_str(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportStatus {
    Ok,
    ErrorOccurred,
    Custom(String),
}

impl TransportStatus {
    pub fn from_upnp_status(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OK" => TransportStatus::Ok,
            "ERROR_OCCURRED" => TransportStatus::ErrorOccurred,
            _ => TransportStatus::Custom(raw.trim().to_string()),
        }
    }
}

/// Result of AVTransport::GetTransportInfo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportInfo {
    pub current_transport_state: TransportState,
    pub current_transport_status: TransportStatus,
    pub current_speed: String,
}

/// Result of AVTransport::GetPositionInfo.
///
/// Times are kept as the renderer sent them (`H+:MM:SS`); use the helpers
/// to get seconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionInfo {
    pub track: u32,
    pub track_duration: Option<String>,
    pub track_metadata: Option<String>,
    pub track_uri: Option<String>,
    pub rel_time: Option<String>,
    pub abs_time: Option<String>,
    pub rel_count: Option<i64>,
    pub abs_count: Option<i64>,
}

impl PositionInfo {
    pub fn rel_seconds(&self) -> Option<u64> {
        parse_optional_hhmmss(self.rel_time.as_deref())
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        parse_optional_hhmmss(self.track_duration.as_deref())
    }

    /// Elapsed share of the track, 0..=100. `None` while the duration is unknown.
    pub fn progress_percent(&self) -> Option<u8> {
        let duration = self.duration_seconds().filter(|d| *d > 0)?;
        let elapsed = self.rel_seconds()?.min(duration);
        Some((u128::from(elapsed) * 100 / u128::from(duration)) as u8)
    }
}

/// Result of AVTransport::GetMediaInfo.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub number_of_tracks: u32,
    pub media_duration: Option<String>,
    pub current_uri: Option<String>,
    pub current_uri_metadata: Option<String>,
    pub next_uri: Option<String>,
    pub next_uri_metadata: Option<String>,
    pub play_medium: Option<String>,
    pub record_medium: Option<String>,
    pub write_status: Option<String>,
}
