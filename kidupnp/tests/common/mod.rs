//! Fake media renderer answering UPnP SOAP requests, served by mockito.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use kidupnp::{ActionListener, MediaInfo, MediaInfoListener, PositionInfo, RendererListener};
use mockito::{Mock, Request, Server, ServerGuard};

const AVT_URN: &str = "urn:schemas-upnp-org:service:AVTransport:1";
const RC_URN: &str = "urn:schemas-upnp-org:service:RenderingControl:1";

const AVT_CONTROL: &str = "/avt/control";
const RC_CONTROL: &str = "/rc/control";

#[derive(Default)]
pub struct FakeState {
    pub transport_state: String,
    pub current_uri: String,
    pub rel_time: String,
    pub duration: String,
    pub mute: bool,
    pub volume: u16,
    /// (action, request body) in arrival order.
    pub actions: Vec<(String, String)>,
    /// Actions answered with a UPnP fault (code, description).
    pub faults: HashMap<String, (u32, String)>,
    /// Time taken to answer each SOAP request.
    pub delay: Duration,
}

type SharedState = Arc<Mutex<FakeState>>;

pub struct FakeRenderer {
    server: ServerGuard,
    _mocks: Vec<Mock>,
    pub state: SharedState,
}

impl FakeRenderer {
    pub fn start() -> Self {
        let mut server = Server::new();
        let state: SharedState = Arc::new(Mutex::new(FakeState {
            transport_state: "NO_MEDIA_PRESENT".to_string(),
            rel_time: "0:00:00".to_string(),
            duration: "0:04:00".to_string(),
            ..Default::default()
        }));

        let base_url = server.url();
        let mut mocks = vec![
            server
                .mock("GET", "/description.xml")
                .with_status(200)
                .with_header("content-type", "text/xml")
                .with_body(description(&base_url))
                .create(),
        ];
        for (control, urn) in [(AVT_CONTROL, AVT_URN), (RC_CONTROL, RC_URN)] {
            mocks.push(soap_mock(&mut server, &state, control, urn, false));
            mocks.push(soap_mock(&mut server, &state, control, urn, true));
        }

        Self {
            server,
            _mocks: mocks,
            state,
        }
    }

    pub fn description_url(&self) -> String {
        format!("{}/description.xml", self.server.url())
    }

    pub fn set_transport_state(&self, state: &str) {
        self.state.lock().unwrap().transport_state = state.to_string();
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = delay;
    }

    pub fn fail_action(&self, action: &str, code: u32, description: &str) {
        self.state
            .lock()
            .unwrap()
            .faults
            .insert(action.to_string(), (code, description.to_string()));
    }

    pub fn action_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .actions
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn count(&self, action: &str) -> usize {
        self.action_names().iter().filter(|n| *n == action).count()
    }

    pub fn last_body(&self, action: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .actions
            .iter()
            .rev()
            .find(|(name, _)| name == action)
            .map(|(_, body)| body.clone())
    }
}

/// One mock per control URL and outcome: faulted actions get HTTP 500,
/// everything else HTTP 200. The matchers are disjoint.
fn soap_mock(
    server: &mut ServerGuard,
    state: &SharedState,
    control: &'static str,
    urn: &'static str,
    faulted: bool,
) -> Mock {
    let matcher_state = Arc::clone(state);
    let body_state = Arc::clone(state);

    server
        .mock("POST", control)
        .match_request(move |request| is_faulted(&matcher_state, request) == faulted)
        .with_status(if faulted { 500 } else { 200 })
        .with_header("content-type", r#"text/xml; charset="utf-8""#)
        .with_body_from_request(move |request| respond(&body_state, urn, request).into_bytes())
        .create()
}

fn soap_action(request: &Request) -> String {
    request
        .header("soapaction")
        .first()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_matches('"').split('#').nth(1))
        .unwrap_or("")
        .to_string()
}

fn is_faulted(state: &SharedState, request: &Request) -> bool {
    state
        .lock()
        .unwrap()
        .faults
        .contains_key(&soap_action(request))
}

fn respond(state: &SharedState, urn: &str, request: &Request) -> String {
    let delay = state.lock().unwrap().delay;
    if !delay.is_zero() {
        thread::sleep(delay);
    }

    let action = soap_action(request);
    let body = request
        .body()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default();
    answer(state, urn, &action, &body)
}

fn envelope(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body>{}</s:Body></s:Envelope>"#,
        inner
    )
}

fn response(action: &str, urn: &str, fields: &[(&str, String)]) -> String {
    let children: String = fields
        .iter()
        .map(|(name, value)| format!("<{name}>{value}</{name}>"))
        .collect();
    envelope(&format!(
        r#"<u:{action}Response xmlns:u="{urn}">{children}</u:{action}Response>"#
    ))
}

fn fault(code: u32, description: &str) -> String {
    envelope(&format!(
        r#"<s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>{code}</errorCode><errorDescription>{description}</errorDescription></UPnPError></detail></s:Fault>"#
    ))
}

fn arg(body: &str, name: &str) -> String {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    body.find(&open)
        .and_then(|start| {
            let from = start + open.len();
            body[from..].find(&close).map(|end| body[from..from + end].to_string())
        })
        .unwrap_or_default()
}

fn answer(state: &SharedState, urn: &str, action: &str, body: &str) -> String {
    let mut state = state.lock().unwrap();
    state.actions.push((action.to_string(), body.to_string()));

    if let Some((code, description)) = state.faults.get(action) {
        return fault(*code, description);
    }

    let fields = match action {
        "SetAVTransportURI" => {
            state.current_uri = arg(body, "CurrentURI");
            state.transport_state = "STOPPED".to_string();
            vec![]
        }
        "Play" => {
            state.transport_state = "PLAYING".to_string();
            vec![]
        }
        "Pause" => {
            state.transport_state = "PAUSED_PLAYBACK".to_string();
            vec![]
        }
        "Stop" => {
            state.transport_state = "STOPPED".to_string();
            vec![]
        }
        "Seek" => {
            state.rel_time = arg(body, "Target");
            vec![]
        }
        "SetMute" => {
            state.mute = arg(body, "DesiredMute") == "1";
            vec![]
        }
        "SetVolume" => {
            state.volume = arg(body, "DesiredVolume").parse().unwrap_or(0);
            vec![]
        }
        "GetVolume" => vec![("CurrentVolume", state.volume.to_string())],
        "GetMute" => vec![("CurrentMute", if state.mute { "1" } else { "0" }.to_string())],
        "GetTransportInfo" => vec![
            ("CurrentTransportState", state.transport_state.clone()),
            ("CurrentTransportStatus", "OK".to_string()),
            ("CurrentSpeed", "1".to_string()),
        ],
        "GetPositionInfo" => vec![
            ("Track", "1".to_string()),
            ("TrackDuration", state.duration.clone()),
            ("TrackMetaData", String::new()),
            ("TrackURI", state.current_uri.clone()),
            ("RelTime", state.rel_time.clone()),
            ("AbsTime", "NOT_IMPLEMENTED".to_string()),
            ("RelCount", "2147483647".to_string()),
            ("AbsCount", "2147483647".to_string()),
        ],
        "GetMediaInfo" => vec![
            ("NrTracks", "1".to_string()),
            ("MediaDuration", state.duration.clone()),
            ("CurrentURI", state.current_uri.clone()),
            ("CurrentURIMetaData", String::new()),
            ("NextURI", String::new()),
            ("NextURIMetaData", String::new()),
            ("PlayMedium", "NETWORK".to_string()),
            ("RecordMedium", "NOT_IMPLEMENTED".to_string()),
            ("WriteStatus", "NOT_IMPLEMENTED".to_string()),
        ],
        _ => return fault(401, "Invalid Action"),
    };

    response(action, urn, &fields)
}

fn description(base_url: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <URLBase>{base_url}/</URLBase>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Fake Renderer</friendlyName>
    <manufacturer>kidupnp</manufacturer>
    <modelName>fake</modelName>
    <UDN>uuid:fake-renderer</UDN>
    <serviceList>
      <service>
        <serviceType>{AVT_URN}</serviceType>
        <controlURL>{AVT_CONTROL}</controlURL>
      </service>
      <service>
        <serviceType>{RC_URN}</serviceType>
        <controlURL>{RC_CONTROL}</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#
    )
}

/// Everything the player reports, flattened into one stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Prepare,
    Playing,
    Paused,
    Stopped,
    Seeking,
    NoMedia,
    Mute(bool),
    Volume(u16),
    Progress(PositionInfo),
    MediaInfo(MediaInfo),
    Send,
    SendFinish(bool),
}

#[derive(Clone)]
pub struct ChannelListener {
    tx: Sender<Event>,
}

pub fn channel_listener() -> (ChannelListener, Receiver<Event>) {
    let (tx, rx) = unbounded();
    (ChannelListener { tx }, rx)
}

impl RendererListener for ChannelListener {
    fn on_remote_prepare(&self) {
        let _ = self.tx.send(Event::Prepare);
    }
    fn on_remote_playing(&self) {
        let _ = self.tx.send(Event::Playing);
    }
    fn on_remote_paused(&self) {
        let _ = self.tx.send(Event::Paused);
    }
    fn on_remote_stopped(&self) {
        let _ = self.tx.send(Event::Stopped);
    }
    fn on_remote_seeking(&self) {
        let _ = self.tx.send(Event::Seeking);
    }
    fn on_remote_no_media_present(&self) {
        let _ = self.tx.send(Event::NoMedia);
    }
    fn on_remote_mute_changed(&self, mute: bool) {
        let _ = self.tx.send(Event::Mute(mute));
    }
    fn on_remote_volume_changed(&self, volume: u16) {
        let _ = self.tx.send(Event::Volume(volume));
    }
    fn on_remote_progress_changed(&self, position: &PositionInfo) {
        let _ = self.tx.send(Event::Progress(position.clone()));
    }
}

impl ActionListener for ChannelListener {
    fn on_send(&self) {
        let _ = self.tx.send(Event::Send);
    }
    fn on_send_finish(&self, success: bool) {
        let _ = self.tx.send(Event::SendFinish(success));
    }
}

impl MediaInfoListener for ChannelListener {
    fn on_media_info(&self, media_info: &MediaInfo) {
        let _ = self.tx.send(Event::MediaInfo(media_info.clone()));
    }
}

/// Waits for the first event matching `pred`, returning it.
pub fn wait_for<F>(rx: &Receiver<Event>, timeout: Duration, pred: F) -> Option<Event>
where
    F: Fn(&Event) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        match rx.recv_timeout(remaining) {
            Ok(event) if pred(&event) => return Some(event),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

/// Collects events until `last` matches, or the timeout expires.
pub fn collect_until<F>(rx: &Receiver<Event>, timeout: Duration, last: F) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match rx.recv_timeout(remaining) {
            Ok(event) => {
                let done = last(&event);
                events.push(event);
                if done {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    events
}
