//! # RendererPlayer
//!
//! Relay between an application and a remote media renderer. Commands are
//! queued on the renderer's action thread and return immediately; their
//! outcome is reported through the registered listeners:
//!
//! - [`RendererListener`] receives remote state changes (playing, paused,
//!   progress, mute...),
//! - a one-shot [`ActionListener`] follows the send lifecycle of the next
//!   command,
//! - a [`MediaInfoListener`] receives the media info refreshed by polling.
//!
//! [`RendererPlayer::start_track`] starts a background tracker that keeps
//! the cached [`PlayerInfo`] in sync with the device.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, info, trace, warn};

use crate::config::PlayerConfig;
use crate::didl::minimal_metadata;
use crate::errors::ControlPointError;
use crate::listener::{ActionListener, MediaInfoListener, NoopRendererListener, RendererListener};
use crate::model::TransportState;
use crate::player_info::PlayerInfo;
use crate::renderer::Renderer;
use crate::time_utils::parse_hhmmss;
use crate::tracker::{TickOutcome, Tracker};
use crate::upnp_clients::AvTransportClient;

const SEEK_UNIT_REL_TIME: &str = "REL_TIME";

struct PlayerInner {
    renderer: Renderer,
    config: PlayerConfig,
    renderer_listener: RwLock<Arc<dyn RendererListener>>,
    action_listener: Mutex<Option<Arc<dyn ActionListener>>>,
    media_info_listener: RwLock<Option<Arc<dyn MediaInfoListener>>>,
    tracker: Mutex<Option<Tracker>>,
    pending_queries: Arc<AtomicUsize>,
}

/// Counts a polling query from submission until its job has run.
struct PendingQuery {
    counter: Arc<AtomicUsize>,
}

impl PendingQuery {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for PendingQuery {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct RendererPlayer {
    inner: Arc<PlayerInner>,
}

impl std::fmt::Debug for RendererPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererPlayer")
            .field("renderer", &self.inner.renderer)
            .field("tracking", &self.is_tracking())
            .finish()
    }
}

impl RendererPlayer {
    /// Fails with [`ControlPointError::Config`] when `config` does not validate.
    pub fn new(renderer: Renderer, config: PlayerConfig) -> Result<Self, ControlPointError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(PlayerInner {
                renderer,
                config,
                renderer_listener: RwLock::new(Arc::new(NoopRendererListener)),
                action_listener: Mutex::new(None),
                media_info_listener: RwLock::new(None),
                tracker: Mutex::new(None),
                pending_queries: Arc::new(AtomicUsize::new(0)),
            }),
        })
    }

    pub fn renderer(&self) -> &Renderer {
        &self.inner.renderer
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }

    /// Snapshot of the cached renderer state.
    pub fn player_info(&self) -> PlayerInfo {
        self.inner.renderer.player_info()
    }

    pub fn is_sending(&self) -> bool {
        self.inner.renderer.is_sending()
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Registers a one-shot listener for the next command's send lifecycle.
    pub fn add_callback<L>(&self, listener: L)
    where
        L: ActionListener + 'static,
    {
        *self
            .inner
            .action_listener
            .lock()
            .expect("ActionListener mutex poisoned") = Some(Arc::new(listener));
    }

    pub fn add_on_renderer_listener<L>(&self, listener: L)
    where
        L: RendererListener + 'static,
    {
        *self
            .inner
            .renderer_listener
            .write()
            .expect("RendererListener lock poisoned") = Arc::new(listener);
    }

    /// Listener for the media info fetched by the tracker.
    pub fn add_on_got_media_info_callback<L>(&self, listener: L)
    where
        L: MediaInfoListener + 'static,
    {
        *self
            .inner
            .media_info_listener
            .write()
            .expect("MediaInfoListener lock poisoned") = Some(Arc::new(listener));
    }

    fn renderer_listener(&self) -> Arc<dyn RendererListener> {
        Arc::clone(
            &self
                .inner
                .renderer_listener
                .read()
                .expect("RendererListener lock poisoned"),
        )
    }

    fn media_info_listener(&self) -> Option<Arc<dyn MediaInfoListener>> {
        self.inner
            .media_info_listener
            .read()
            .expect("MediaInfoListener lock poisoned")
            .clone()
    }

    fn on_send(&self) {
        self.inner.renderer.set_sending(true);
        let listener = self
            .inner
            .action_listener
            .lock()
            .expect("ActionListener mutex poisoned")
            .clone();
        if let Some(listener) = listener {
            listener.on_send();
        }
    }

    fn on_send_finish(&self, success: bool) {
        self.inner.renderer.set_sending(false);
        let listener = self
            .inner
            .action_listener
            .lock()
            .expect("ActionListener mutex poisoned")
            .take();
        if let Some(listener) = listener {
            listener.on_send_finish(success);
        }
    }

    fn command_failed(&self, action: &str, err: ControlPointError) {
        warn!(
            renderer = self.inner.renderer.friendly_name(),
            action,
            error = %err,
            "Renderer command failed"
        );
        self.on_send_finish(false);
    }

    /// Runs `job` on the action thread inside the send lifecycle.
    fn command<F>(&self, action: &str, job: F) -> Result<(), ControlPointError>
    where
        F: FnOnce(&RendererPlayer) + Send + 'static,
    {
        debug!(
            renderer = self.inner.renderer.friendly_name(),
            action, "Queueing command"
        );
        self.on_send();
        let player = self.clone();
        let queued = self.inner.renderer.execute(move || job(&player));
        if queued.is_err() {
            self.on_send_finish(false);
        }
        queued
    }

    /// Runs `job` on the action thread, outside the send lifecycle.
    fn query<F>(&self, pending: Option<PendingQuery>, job: F) -> Result<(), ControlPointError>
    where
        F: FnOnce(&RendererPlayer) + Send + 'static,
    {
        let player = self.clone();
        self.inner.renderer.execute(move || {
            job(&player);
            drop(pending);
        })
    }

    fn query_failed(&self, action: &str, err: ControlPointError) {
        warn!(
            renderer = self.inner.renderer.friendly_name(),
            action,
            error = %err,
            "Renderer query failed"
        );
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Loads `uri` with its DIDL-Lite `metadata`, then starts playback.
    pub fn start(&self, uri: &str, metadata: &str) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;
        let speed = self.inner.config.upnp.play_speed.clone();
        let uri = uri.to_string();
        let metadata = metadata.to_string();
        info!(
            renderer = self.inner.renderer.friendly_name(),
            uri = uri.as_str(),
            "Starting remote playback"
        );

        self.command("SetAVTransportURI", move |player| {
            match avt.set_av_transport_uri(instance_id, &uri, &metadata) {
                Ok(()) => {
                    // Same job: no other command runs between the two.
                    player.on_send();
                    player.run_play(&avt, instance_id, &speed);
                }
                Err(err) => player.command_failed("SetAVTransportURI", err),
            }
        })
    }

    /// [`start`](Self::start) with a minimal DIDL-Lite description.
    pub fn start_uri(
        &self,
        uri: &str,
        title: &str,
        protocol_info: Option<&str>,
    ) -> Result<(), ControlPointError> {
        self.start(uri, &minimal_metadata(uri, title, protocol_info))
    }

    /// Marks the renderer as preparing media.
    pub fn prepare(&self) {
        self.inner
            .renderer
            .with_player_info(|info| info.update(TransportState::Recording));
    }

    pub fn play(&self) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;
        let speed = self.inner.config.upnp.play_speed.clone();

        self.command("Play", move |player| {
            player.run_play(&avt, instance_id, &speed)
        })
    }

    fn run_play(&self, avt: &AvTransportClient, instance_id: u32, speed: &str) {
        match avt.play(instance_id, speed) {
            Ok(()) => {
                self.renderer_listener().on_remote_playing();
                self.inner
                    .renderer
                    .with_player_info(|info| info.update(TransportState::Playing));
                self.on_send_finish(true);
            }
            Err(err) => self.command_failed("Play", err),
        }
    }

    pub fn pause(&self) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;

        self.command("Pause", move |player| match avt.pause(instance_id) {
            Ok(()) => {
                player.renderer_listener().on_remote_paused();
                player
                    .inner
                    .renderer
                    .with_player_info(|info| info.update(TransportState::PausedPlayback));
                player.on_send_finish(true);
            }
            Err(err) => player.command_failed("Pause", err),
        })
    }

    pub fn stop(&self) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;

        self.command("Stop", move |player| match avt.stop(instance_id) {
            Ok(()) => {
                player.renderer_listener().on_remote_stopped();
                player
                    .inner
                    .renderer
                    .with_player_info(|info| info.update(TransportState::Stopped));
                player.on_send_finish(true);
            }
            Err(err) => player.command_failed("Stop", err),
        })
    }

    /// Seeks to a relative track time, `H:MM:SS`.
    pub fn seek(&self, target: &str) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        parse_hhmmss(target)?;
        let instance_id = self.inner.config.upnp.instance_id;
        let target = target.trim().to_string();

        self.command("Seek", move |player| {
            match avt.seek(instance_id, SEEK_UNIT_REL_TIME, &target) {
                Ok(()) => {
                    player
                        .inner
                        .renderer
                        .with_player_info(|info| info.seek(&target));
                    player.on_send_finish(true);
                }
                Err(err) => player.command_failed("Seek", err),
            }
        })
    }

    pub fn set_mute(&self, mute: bool) -> Result<(), ControlPointError> {
        let rc = self.inner.renderer.rendering_control()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;
        let channel = self.inner.config.upnp.channel.clone();

        self.command("SetMute", move |player| {
            match rc.set_mute(instance_id, &channel, mute) {
                Ok(()) => {
                    player.renderer_listener().on_remote_mute_changed(mute);
                    player
                        .inner
                        .renderer
                        .with_player_info(|info| info.set_mute(mute));
                    player.on_send_finish(true);
                }
                Err(err) => player.command_failed("SetMute", err),
            }
        })
    }

    /// Sets the renderer volume (RenderingControl scale, usually 0..=100).
    pub fn volume(&self, volume: u16) -> Result<(), ControlPointError> {
        let rc = self.inner.renderer.rendering_control()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;
        let channel = self.inner.config.upnp.channel.clone();

        self.command("SetVolume", move |player| {
            match rc.set_volume(instance_id, &channel, volume) {
                Ok(()) => {
                    player.renderer_listener().on_remote_volume_changed(volume);
                    player
                        .inner
                        .renderer
                        .with_player_info(|info| info.set_volume(volume));
                    player.on_send_finish(true);
                }
                Err(err) => player.command_failed("SetVolume", err),
            }
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_position_info(&self) -> Result<(), ControlPointError> {
        self.position_query(None)
    }

    pub fn get_media_info<L>(&self, listener: L) -> Result<(), ControlPointError>
    where
        L: MediaInfoListener + 'static,
    {
        self.media_query(Some(Arc::new(listener)), None)
    }

    pub fn get_transport_info(&self) -> Result<(), ControlPointError> {
        self.transport_query(None)
    }

    fn position_query(&self, pending: Option<PendingQuery>) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;

        self.query(pending, move |player| {
            match avt.get_position_info(instance_id) {
                Ok(position) => {
                    trace!(rel_time = ?position.rel_time, "Position refreshed");
                    player
                        .renderer_listener()
                        .on_remote_progress_changed(&position);
                    player
                        .inner
                        .renderer
                        .with_player_info(|info| info.set_position_info(position));
                }
                Err(err) => player.query_failed("GetPositionInfo", err),
            }
        })
    }

    fn media_query(
        &self,
        listener: Option<Arc<dyn MediaInfoListener>>,
        pending: Option<PendingQuery>,
    ) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;

        self.query(pending, move |player| {
            match avt.get_media_info(instance_id) {
                Ok(media_info) => {
                    if let Some(listener) = listener {
                        listener.on_media_info(&media_info);
                    }
                    player
                        .inner
                        .renderer
                        .with_player_info(|info| info.set_media_info(media_info));
                }
                Err(err) => player.query_failed("GetMediaInfo", err),
            }
        })
    }

    fn transport_query(&self, pending: Option<PendingQuery>) -> Result<(), ControlPointError> {
        let avt = self.inner.renderer.avtransport()?.clone();
        let instance_id = self.inner.config.upnp.instance_id;

        self.query(pending, move |player| {
            match avt.get_transport_info(instance_id) {
                Ok(transport_info) => {
                    let state = transport_info.current_transport_state.clone();
                    dispatch_state(player.renderer_listener().as_ref(), &state);
                    player.inner.renderer.with_player_info(|info| {
                        info.update(state);
                        info.set_transport_info(transport_info);
                    });
                }
                Err(err) => player.query_failed("GetTransportInfo", err),
            }
        })
    }

    // ------------------------------------------------------------------
    // Tracking
    // ------------------------------------------------------------------

    /// Starts the background state tracker, replacing a running one.
    pub fn start_track(&self) -> Result<(), ControlPointError> {
        let mut tracker = self
            .inner
            .tracker
            .lock()
            .expect("Tracker mutex poisoned");
        if let Some(mut previous) = tracker.take() {
            previous.stop();
        }

        let weak: Weak<PlayerInner> = Arc::downgrade(&self.inner);
        let mut count: u32 = 0;
        let spawned = Tracker::spawn(
            self.inner.renderer.friendly_name(),
            self.inner.config.poll_interval(),
            move || match weak.upgrade() {
                Some(inner) => {
                    RendererPlayer { inner }.poll_once(&mut count);
                    TickOutcome::Continue
                }
                None => TickOutcome::Exit,
            },
        )?;

        *tracker = Some(spawned);
        info!(
            renderer = self.inner.renderer.friendly_name(),
            interval_ms = self.inner.config.polling.interval_ms,
            "State tracker started"
        );
        Ok(())
    }

    /// Stops the background state tracker. No-op when it is not running.
    pub fn stop_track(&self) {
        let previous = self
            .inner
            .tracker
            .lock()
            .expect("Tracker mutex poisoned")
            .take();

        if let Some(mut tracker) = previous {
            tracker.stop();
            let state = if self.player_info().is_paused() {
                "pause"
            } else {
                "start"
            };
            info!(
                renderer = self.inner.renderer.friendly_name(),
                state, "State tracker stopped"
            );
        }
    }

    /// True while a started tracker thread is still alive.
    pub fn is_tracking(&self) -> bool {
        self.inner
            .tracker
            .lock()
            .expect("Tracker mutex poisoned")
            .as_ref()
            .is_some_and(Tracker::is_running)
    }

    /// One tracker tick. Skipped while the previous tick's queries are
    /// still queued or running.
    fn poll_once(&self, count: &mut u32) {
        if self.inner.pending_queries.load(Ordering::SeqCst) > 0 {
            trace!(
                renderer = self.inner.renderer.friendly_name(),
                "Previous poll still pending, skipping tick"
            );
            return;
        }

        *count += 1;
        let counter = &self.inner.pending_queries;

        if self.player_info().is_playing() {
            if let Err(err) = self.position_query(Some(PendingQuery::new(counter))) {
                self.query_failed("GetPositionInfo", err);
            }
        }

        if let Err(err) = self.transport_query(Some(PendingQuery::new(counter))) {
            self.query_failed("GetTransportInfo", err);
        }

        if *count % self.inner.config.polling.media_info_every == 0 {
            *count = 0;
            let listener = self.media_info_listener();
            if let Err(err) = self.media_query(listener, Some(PendingQuery::new(counter))) {
                self.query_failed("GetMediaInfo", err);
            }
        }
    }
}

/// Relays a polled transport state to the renderer listener.
fn dispatch_state(listener: &dyn RendererListener, state: &TransportState) {
    trace!(state = state.as_str(), "Dispatching transport state");
    match state {
        TransportState::NoMediaPresent => listener.on_remote_no_media_present(),
        TransportState::Recording => listener.on_remote_prepare(),
        TransportState::Playing => listener.on_remote_playing(),
        TransportState::PausedPlayback => listener.on_remote_paused(),
        TransportState::Stopped => listener.on_remote_stopped(),
        TransportState::Transitioning => listener.on_remote_seeking(),
        TransportState::PausedRecording | TransportState::Custom(_) => {}
    }
}
