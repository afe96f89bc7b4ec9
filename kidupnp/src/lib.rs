//! # kidupnp
//!
//! Remote control of UPnP/DLNA media renderers: AVTransport and
//! RenderingControl actions sent over SOAP, results relayed to listener
//! callbacks, and a background tracker refreshing transport, position and
//! media state.
//!
//! ```no_run
//! use kidupnp::{PlayerConfig, Renderer, RendererPlayer};
//!
//! let config = PlayerConfig::load(None)?;
//! let renderer = Renderer::from_description("http://192.168.1.20:49152/description.xml", &config)?;
//! let player = RendererPlayer::new(renderer, config)?;
//!
//! player.start_uri("http://192.168.1.2:8080/song.mp3", "Song", Some("http-get:*:audio/mpeg:*"))?;
//! player.start_track()?;
//! # Ok::<(), kidupnp::ControlPointError>(())
//! ```

pub mod config;
pub mod description;
pub mod didl;
pub mod errors;
pub mod listener;
pub mod model;
pub mod player;
pub mod player_info;
pub mod renderer;
pub mod soap;
pub mod soap_client;
pub mod time_utils;
mod tracker;
pub mod upnp_clients;

pub use config::PlayerConfig;
pub use description::{RendererInfo, ServiceEndpoint, fetch_renderer_info, parse_description};
pub use errors::ControlPointError;
pub use listener::{ActionListener, MediaInfoListener, NoopRendererListener, RendererListener};
pub use model::{MediaInfo, PositionInfo, TransportInfo, TransportState, TransportStatus};
pub use player::RendererPlayer;
pub use player_info::PlayerInfo;
pub use renderer::Renderer;
pub use soap_client::SoapClient;
pub use upnp_clients::{AvTransportClient, RenderingControlClient, resolve_control_url};
