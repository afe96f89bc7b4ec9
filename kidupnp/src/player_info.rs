use crate::model::{MediaInfo, PositionInfo, TransportInfo, TransportState};

/// Last known state of a renderer, as seen through the player's actions
/// and polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerInfo {
    state: TransportState,
    mute: bool,
    volume: Option<u16>,
    transport_info: Option<TransportInfo>,
    media_info: Option<MediaInfo>,
    position_info: Option<PositionInfo>,
    seek_target: Option<String>,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            state: TransportState::NoMediaPresent,
            mute: false,
            volume: None,
            transport_info: None,
            media_info: None,
            position_info: None,
            seek_target: None,
        }
    }
}

impl PlayerInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, state: TransportState) {
        self.state = state;
    }

    /// Records a successful seek. The cached relative time jumps to the
    /// target so progress displays do not wait for the next poll.
    pub fn seek(&mut self, target: &str) {
        self.seek_target = Some(target.to_string());
        if let Some(position) = self.position_info.as_mut() {
            position.rel_time = Some(target.to_string());
        }
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub fn set_volume(&mut self, volume: u16) {
        self.volume = Some(volume);
    }

    pub fn set_transport_info(&mut self, info: TransportInfo) {
        self.transport_info = Some(info);
    }

    pub fn set_media_info(&mut self, info: MediaInfo) {
        self.media_info = Some(info);
    }

    pub fn set_position_info(&mut self, info: PositionInfo) {
        self.position_info = Some(info);
    }

    pub fn state(&self) -> &TransportState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_paused(&self) -> bool {
        matches!(
            self.state,
            TransportState::PausedPlayback | TransportState::PausedRecording
        )
    }

    pub fn is_stopped(&self) -> bool {
        self.state == TransportState::Stopped
    }

    pub fn is_mute(&self) -> bool {
        self.mute
    }

    pub fn volume(&self) -> Option<u16> {
        self.volume
    }

    pub fn transport_info(&self) -> Option<&TransportInfo> {
        self.transport_info.as_ref()
    }

    pub fn media_info(&self) -> Option<&MediaInfo> {
        self.media_info.as_ref()
    }

    pub fn position_info(&self) -> Option<&PositionInfo> {
        self.position_info.as_ref()
    }

    pub fn seek_target(&self) -> Option<&str> {
        self.seek_target.as_deref()
    }
}
