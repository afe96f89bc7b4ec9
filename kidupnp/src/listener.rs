//! Callbacks through which [`RendererPlayer`](crate::RendererPlayer) relays results.
//!
//! All callbacks run on the renderer's action thread, never on the caller's.

use crate::model::{MediaInfo, PositionInfo};

/// Remote playback notifications. Every method defaults to a no-op, so an
/// implementation only overrides what it cares about.
pub trait RendererListener: Send + Sync {
    fn on_remote_prepare(&self) {}
    fn on_remote_playing(&self) {}
    fn on_remote_paused(&self) {}
    fn on_remote_stopped(&self) {}
    fn on_remote_seeking(&self) {}
    fn on_remote_no_media_present(&self) {}
    fn on_remote_mute_changed(&self, _mute: bool) {}
    fn on_remote_volume_changed(&self, _volume: u16) {}
    fn on_remote_progress_changed(&self, _position: &PositionInfo) {}
}

/// Listener installed when the caller registered none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRendererListener;

impl RendererListener for NoopRendererListener {}

/// Send lifecycle of a user command.
///
/// Registered with [`RendererPlayer::add_callback`](crate::RendererPlayer::add_callback),
/// it is dropped after its first `on_send_finish`.
pub trait ActionListener: Send + Sync {
    fn on_send(&self) {}
    fn on_send_finish(&self, success: bool);
}

pub trait MediaInfoListener: Send + Sync {
    fn on_media_info(&self, media_info: &MediaInfo);
}

impl<F> MediaInfoListener for F
where
    F: Fn(&MediaInfo) + Send + Sync,
{
    fn on_media_info(&self, media_info: &MediaInfo) {
        self(media_info)
    }
}
