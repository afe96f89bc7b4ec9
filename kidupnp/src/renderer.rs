use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Sender, unbounded};
use tracing::{debug, warn};

use crate::config::PlayerConfig;
use crate::description::{RendererInfo, fetch_renderer_info};
use crate::errors::ControlPointError;
use crate::player_info::PlayerInfo;
use crate::soap_client::SoapClient;
use crate::upnp_clients::{AvTransportClient, RenderingControlClient};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Single worker thread running a renderer's actions in submission order.
///
/// The thread exits once every sender is gone and the queue is drained.
struct ActionExecutor {
    sender: Sender<Job>,
}

impl ActionExecutor {
    fn spawn(renderer_name: &str) -> Result<Self, ControlPointError> {
        let (sender, receiver) = unbounded::<Job>();
        let thread_name = format!("renderer-{}", renderer_name);
        let name = renderer_name.to_string();

        thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                for job in receiver.iter() {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        warn!(renderer = name.as_str(), "Renderer action panicked");
                    }
                }
                debug!(renderer = name.as_str(), "Action executor exiting");
            })
            .map_err(|e| ControlPointError::ThreadSpawn(thread_name, e.to_string()))?;

        Ok(Self { sender })
    }
}

struct RendererInner {
    info: RendererInfo,
    avtransport: Option<AvTransportClient>,
    rendering_control: Option<RenderingControlClient>,
    player_info: Mutex<PlayerInfo>,
    sending: AtomicBool,
    executor: ActionExecutor,
}

/// Handle on a media renderer: its service clients, cached state and
/// action thread. Clones share everything.
#[derive(Clone)]
pub struct Renderer {
    inner: Arc<RendererInner>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("info", &self.inner.info)
            .field("sending", &self.is_sending())
            .finish()
    }
}

impl Renderer {
    pub fn new(info: RendererInfo, soap: SoapClient) -> Result<Self, ControlPointError> {
        let avtransport = info.avtransport.as_ref().map(|s| {
            AvTransportClient::new(s.control_url.clone(), s.service_type.clone(), soap.clone())
        });
        let rendering_control = info.rendering_control.as_ref().map(|s| {
            RenderingControlClient::new(s.control_url.clone(), s.service_type.clone(), soap.clone())
        });

        let executor = ActionExecutor::spawn(&info.friendly_name)?;

        Ok(Self {
            inner: Arc::new(RendererInner {
                info,
                avtransport,
                rendering_control,
                player_info: Mutex::new(PlayerInfo::new()),
                sending: AtomicBool::new(false),
                executor,
            }),
        })
    }

    /// Builds a renderer from its description.xml URL.
    pub fn from_description(
        location: &str,
        config: &PlayerConfig,
    ) -> Result<Self, ControlPointError> {
        let info = fetch_renderer_info(location, config.http_timeout())?;
        Self::new(info, SoapClient::new(config.http_timeout()))
    }

    pub fn info(&self) -> &RendererInfo {
        &self.inner.info
    }

    pub fn friendly_name(&self) -> &str {
        &self.inner.info.friendly_name
    }

    /// Returns true if the renderer has an AVTransport service.
    pub fn is_av_transport(&self) -> bool {
        self.inner.avtransport.is_some()
    }

    /// Returns true if the renderer has a RenderingControl service.
    pub fn is_rendering_control(&self) -> bool {
        self.inner.rendering_control.is_some()
    }

    pub fn avtransport(&self) -> Result<&AvTransportClient, ControlPointError> {
        self.inner.avtransport.as_ref().ok_or_else(|| {
            ControlPointError::upnp_operation_not_supported("AVTransport", self.friendly_name())
        })
    }

    pub fn rendering_control(&self) -> Result<&RenderingControlClient, ControlPointError> {
        self.inner.rendering_control.as_ref().ok_or_else(|| {
            ControlPointError::upnp_operation_not_supported(
                "RenderingControl",
                self.friendly_name(),
            )
        })
    }

    /// Snapshot of the cached renderer state.
    pub fn player_info(&self) -> PlayerInfo {
        self.inner
            .player_info
            .lock()
            .expect("PlayerInfo mutex poisoned")
            .clone()
    }

    pub(crate) fn with_player_info<R>(&self, f: impl FnOnce(&mut PlayerInfo) -> R) -> R {
        let mut guard = self
            .inner
            .player_info
            .lock()
            .expect("PlayerInfo mutex poisoned");
        f(&mut guard)
    }

    pub fn set_sending(&self, sending: bool) {
        self.inner.sending.store(sending, Ordering::SeqCst);
    }

    /// True between a command being queued and its outcome being relayed.
    pub fn is_sending(&self) -> bool {
        self.inner.sending.load(Ordering::SeqCst)
    }

    /// Queues `job` on the renderer's action thread.
    pub fn execute<F>(&self, job: F) -> Result<(), ControlPointError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .executor
            .sender
            .send(Box::new(job))
            .map_err(|_| ControlPointError::ExecutorClosed(self.friendly_name().to_string()))
    }
}
