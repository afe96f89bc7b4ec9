//! Plays a URI on a UPnP renderer and follows its state for a while.
//!
//! Usage:
//!   cargo run --example renderer_player -- <description.xml URL> [URI] [seconds]
//!
//! Logging is controlled with RUST_LOG, e.g. `RUST_LOG=kidupnp=debug`.

use std::env;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use kidupnp::{
    ActionListener, MediaInfo, PlayerConfig, PositionInfo, Renderer, RendererListener,
    RendererPlayer,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_URI: &str = "https://audio-fb.radioparadise.com/chan/1/x/1117/4/g/1117-3.flac";

struct ConsoleListener;

impl RendererListener for ConsoleListener {
    fn on_remote_prepare(&self) {
        println!("[remote] preparing");
    }
    fn on_remote_playing(&self) {
        println!("[remote] playing");
    }
    fn on_remote_paused(&self) {
        println!("[remote] paused");
    }
    fn on_remote_stopped(&self) {
        println!("[remote] stopped");
    }
    fn on_remote_seeking(&self) {
        println!("[remote] transitioning");
    }
    fn on_remote_no_media_present(&self) {
        println!("[remote] no media");
    }
    fn on_remote_mute_changed(&self, mute: bool) {
        println!("[remote] mute={}", mute);
    }
    fn on_remote_volume_changed(&self, volume: u16) {
        println!("[remote] volume={}", volume);
    }
    fn on_remote_progress_changed(&self, position: &PositionInfo) {
        println!(
            "[remote] {} / {} ({}%)",
            position.rel_time.as_deref().unwrap_or("?"),
            position.track_duration.as_deref().unwrap_or("?"),
            position.progress_percent().unwrap_or(0)
        );
    }
}

struct StartListener;

impl ActionListener for StartListener {
    fn on_send(&self) {
        println!("[start] sending...");
    }

    fn on_send_finish(&self, success: bool) {
        println!("[start] finished, success={}", success);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let location = args
        .get(1)
        .ok_or_else(|| anyhow!("usage: renderer_player <description.xml URL> [URI] [seconds]"))?;
    let uri = args.get(2).map(String::as_str).unwrap_or(DEFAULT_URI);
    let seconds: u64 = match args.get(3) {
        Some(s) => s.parse().context("seconds must be an integer")?,
        None => 30,
    };

    let config = PlayerConfig::load(None)?;
    let renderer = Renderer::from_description(location, &config)
        .with_context(|| format!("cannot reach renderer at {}", location))?;
    println!(
        "Renderer: {} ({} {}) AVTransport={} RenderingControl={}",
        renderer.friendly_name(),
        renderer.info().manufacturer,
        renderer.info().model_name,
        renderer.is_av_transport(),
        renderer.is_rendering_control()
    );

    let player = RendererPlayer::new(renderer, config)?;
    player.add_on_renderer_listener(ConsoleListener);
    player.add_on_got_media_info_callback(|media: &MediaInfo| {
        println!(
            "[media] uri={} duration={}",
            media.current_uri.as_deref().unwrap_or("-"),
            media.media_duration.as_deref().unwrap_or("-")
        );
    });

    player.add_callback(StartListener);
    player.start_uri(uri, "kidupnp demo", None)?;
    player.start_track()?;

    thread::sleep(Duration::from_secs(seconds));

    player.stop()?;
    thread::sleep(Duration::from_millis(500));
    player.stop_track();

    println!("Final state: {:?}", player.player_info().state());
    Ok(())
}
