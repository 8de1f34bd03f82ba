//! Persistent WebSocket channel to the chat backend.
//!
//! [`ChatClient::connect`] opens the socket and spawns a background task
//! that owns it. The app talks to the task through a clonable
//! [`ChannelHandle`] and receives [`TransportEvent`]s on an mpsc receiver.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        ChatClient                          │
//! │                                                            │
//! │  ┌──────────────┐        ┌──────────────────────────────┐  │
//! │  │ ChannelHandle│        │   Background Task            │  │
//! │  │              │        │                              │  │
//! │  │  send()  ────┼──cmd──▶│  WebSocket read/write loop   │  │
//! │  │              │  chan  │  get_chats on every connect  │  │
//! │  │  events  ◀───┼──evt──◀│  parse → TransportEvent      │  │
//! │  │              │  chan  │  reconnect with backoff      │  │
//! │  └──────────────┘        └──────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sending never blocks and never reports per-call failures. A request
//! that cannot be written shows up as a missing reply and, if the socket
//! is gone, as a `Reconnecting`/`Disconnected` status event.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use parley_core::prelude::*;

use crate::protocol::{parse_server_frame, ClientAction, ClientRequest, InboundFrame, ParsedFrame};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Initial reconnection backoff duration.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum reconnection backoff duration (cap).
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Consecutive reconnection attempts before giving up, unless configured.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Capacity of the command channel (bounded, to apply backpressure).
const CMD_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the event channel. Chat snapshots arrive in bursts on connect.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Current connection state of a [`ChatClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected and not attempting to connect.
    Disconnected,
    /// Initial connection attempt in progress.
    Connecting,
    /// Connected and ready to exchange frames.
    Connected,
    /// Connection lost; background task is retrying.
    Reconnecting {
        /// The current reconnection attempt number (1-indexed).
        attempt: u32,
    },
}

/// Options for [`ChatClient::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// `0` disables reconnection: a dropped socket ends the session.
    pub max_reconnect_attempts: u32,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Everything the background task reports to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A connection (initial or re-established) is up and `get_chats` was sent.
    Connected,
    /// A recognized inbound event.
    Frame(InboundFrame),
    /// An inbound frame that could not be parsed. Later frames still flow.
    Malformed(String),
    /// The socket dropped and the task is about to retry.
    Reconnecting { attempt: u32, max_attempts: u32 },
    /// The task has stopped. `reason` is `None` after a requested close.
    Disconnected { reason: Option<String> },
}

// ---------------------------------------------------------------------------
// Internal command type
// ---------------------------------------------------------------------------

/// Internal messages sent from [`ChannelHandle`] to the background task.
pub(crate) enum ClientCommand {
    /// Serialize and write one request.
    Send(ClientRequest),
    /// Gracefully close the WebSocket connection and stop the background task.
    Disconnect,
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type SharedState = Arc<std::sync::RwLock<ConnectionState>>;

// ---------------------------------------------------------------------------
// ChannelHandle
// ---------------------------------------------------------------------------

/// Clonable, non-blocking sender for [`ClientRequest`]s.
///
/// The handle becomes inert once the background task exits; further sends
/// are dropped with a warning.
#[derive(Clone)]
pub struct ChannelHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    state: SharedState,
}

impl std::fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("connection_state", &self.connection_state())
            .finish()
    }
}

impl ChannelHandle {
    /// A handle with no connection behind it.
    ///
    /// Used when the initial connect fails so the rest of the app can keep
    /// a single code path; every send is dropped.
    pub fn disconnected() -> Self {
        let (cmd_tx, _cmd_rx) = mpsc::channel(1);
        Self {
            cmd_tx,
            state: Arc::new(std::sync::RwLock::new(ConnectionState::Disconnected)),
        }
    }

    /// Queue a request for transmission without waiting.
    ///
    /// Returns `false` if the request was dropped (task gone or queue full).
    /// Callers are not expected to act on this: the reply simply never comes.
    pub fn send(&self, request: ClientRequest) -> bool {
        let action = request.action.name();
        match self.cmd_tx.try_send(ClientCommand::Send(request)) {
            Ok(()) => {
                trace!("Chat channel: queued '{}'", action);
                true
            }
            Err(err) => {
                warn!("Chat channel: dropping '{}' request: {}", action, err);
                false
            }
        }
    }

    /// Ask the background task to send a Close frame and stop.
    pub fn close(&self) {
        if self.cmd_tx.try_send(ClientCommand::Disconnect).is_err() {
            debug!("Chat channel: close requested but task already stopped");
        }
    }

    /// Return the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Return `true` if the socket is currently up.
    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    /// Create a handle whose outgoing requests are captured for inspection.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn new_for_test() -> (Self, SentRequests) {
        let (cmd_tx, cmd_rx) = mpsc::channel(CMD_CHANNEL_CAPACITY);
        let handle = Self {
            cmd_tx,
            state: Arc::new(std::sync::RwLock::new(ConnectionState::Connected)),
        };
        (handle, SentRequests { cmd_rx })
    }
}

/// Receiving end of a [`ChannelHandle::new_for_test`] handle.
#[cfg(any(test, feature = "test-helpers"))]
pub struct SentRequests {
    cmd_rx: mpsc::Receiver<ClientCommand>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl SentRequests {
    /// Next queued request, skipping close commands.
    pub fn try_next(&mut self) -> Option<ClientRequest> {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            if let ClientCommand::Send(request) = cmd {
                return Some(request);
            }
        }
        None
    }

    /// All queued requests, in send order.
    pub fn drain(&mut self) -> Vec<ClientRequest> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next request (async tests where sends happen on a task).
    pub async fn next(&mut self) -> Option<ClientRequest> {
        while let Some(cmd) = self.cmd_rx.recv().await {
            if let ClientCommand::Send(request) = cmd {
                return Some(request);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Owner of one backend connection.
///
/// Create with [`ChatClient::connect`], then [`split`](ChatClient::split)
/// into a sender handle and the event receiver.
pub struct ChatClient {
    handle: ChannelHandle,
    event_rx: mpsc::Receiver<TransportEvent>,
}

impl ChatClient {
    /// Connect to the backend at `url` and spawn the background task.
    ///
    /// The first connection attempt is made before returning so callers
    /// know whether the backend is reachable. The first event delivered is
    /// always [`TransportEvent::Connected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportUnavailable`] if the socket cannot be opened.
    pub async fn connect(url: &str, options: ConnectOptions) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>(CMD_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(EVENT_CHANNEL_CAPACITY);
        let state = Arc::new(std::sync::RwLock::new(ConnectionState::Connecting));

        info!("Connecting to chat backend at {}", url);
        let ws_stream = connect_ws(url).await?;
        set_state(&state, ConnectionState::Connected);

        tokio::spawn(run_client_task(
            url.to_string(),
            ws_stream,
            options,
            cmd_rx,
            event_tx,
            Arc::clone(&state),
        ));

        Ok(Self {
            handle: ChannelHandle { cmd_tx, state },
            event_rx,
        })
    }

    /// A clonable sender sharing this client's connection.
    pub fn handle(&self) -> ChannelHandle {
        self.handle.clone()
    }

    /// Return a mutable reference to the event receiver.
    pub fn event_receiver(&mut self) -> &mut mpsc::Receiver<TransportEvent> {
        &mut self.event_rx
    }

    /// Split into the sender handle and the owned event receiver.
    pub fn split(self) -> (ChannelHandle, mpsc::Receiver<TransportEvent>) {
        (self.handle, self.event_rx)
    }

    pub fn send(&self, request: ClientRequest) -> bool {
        self.handle.send(request)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.handle.connection_state()
    }

    /// Send a Close frame and stop the background task.
    pub fn disconnect(&self) {
        self.handle.close();
    }
}

// ---------------------------------------------------------------------------
// Background task
// ---------------------------------------------------------------------------

/// How one connection's I/O loop ended.
enum LoopExit {
    /// Disconnect command, or every sender was dropped.
    Closed,
    /// The socket failed or the peer closed it.
    Lost(String),
}

async fn run_client_task(
    url: String,
    ws_stream: WsStream,
    options: ConnectOptions,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
    event_tx: mpsc::Sender<TransportEvent>,
    state: SharedState,
) {
    let max_attempts = options.max_reconnect_attempts;

    let mut exit = run_io_loop(ws_stream, &mut cmd_rx, &event_tx, Vec::new()).await;

    // Requests sent while the socket is down, written after the next connect.
    let mut backlog: Vec<ClientRequest> = Vec::new();
    let mut attempt: u32 = 1;
    let reason = loop {
        let lost_reason = match exit {
            LoopExit::Closed => break None,
            LoopExit::Lost(reason) => reason,
        };

        if attempt > max_attempts {
            if max_attempts > 0 {
                warn!(
                    "Chat channel: exceeded {} reconnection attempts, giving up",
                    max_attempts
                );
            }
            break Some(lost_reason);
        }

        set_state(&state, ConnectionState::Reconnecting { attempt });
        emit(
            &event_tx,
            TransportEvent::Reconnecting {
                attempt,
                max_attempts,
            },
        )
        .await;

        let backoff = compute_backoff(attempt);
        warn!(
            "Chat channel: connection lost ({}), retrying in {:?} (attempt {}/{})",
            lost_reason, backoff, attempt, max_attempts
        );
        if !wait_backoff(backoff, &mut cmd_rx, &mut backlog).await {
            break None;
        }

        match connect_ws(&url).await {
            Ok(ws_stream) => {
                info!("Chat channel: reconnected (attempt {})", attempt);
                set_state(&state, ConnectionState::Connected);
                attempt = 1;
                let queued = std::mem::take(&mut backlog);
                exit = run_io_loop(ws_stream, &mut cmd_rx, &event_tx, queued).await;
            }
            Err(err) => {
                warn!("Chat channel: reconnection attempt {} failed: {}", attempt, err);
                attempt += 1;
                exit = LoopExit::Lost(err.to_string());
            }
        }
    };

    set_state(&state, ConnectionState::Disconnected);
    emit(&event_tx, TransportEvent::Disconnected { reason }).await;
    debug!("Chat channel background task exiting");
}

/// Sleep out a reconnect backoff while still serving the command channel.
///
/// Sends are queued on `backlog`. Returns `false` when the client was
/// closed during the wait.
async fn wait_backoff(
    backoff: Duration,
    cmd_rx: &mut mpsc::Receiver<ClientCommand>,
    backlog: &mut Vec<ClientRequest>,
) -> bool {
    let sleep = tokio::time::sleep(backoff);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            cmd = cmd_rx.recv() => match cmd {
                Some(ClientCommand::Send(request)) => {
                    debug!("Chat channel: queued '{}' until reconnected", request.action.name());
                    backlog.push(request);
                }
                Some(ClientCommand::Disconnect) | None => {
                    debug!("Chat channel: closed during reconnect backoff");
                    return false;
                }
            },
        }
    }
}

/// Run one connection's read/write select loop.
///
/// `backlog` is written right after the initial `get_chats`.
async fn run_io_loop(
    ws_stream: WsStream,
    cmd_rx: &mut mpsc::Receiver<ClientCommand>,
    event_tx: &mpsc::Sender<TransportEvent>,
    backlog: Vec<ClientRequest>,
) -> LoopExit {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    // A fresh connection always starts by asking for the conversation list.
    if let Err(err) = write_request(&mut ws_sink, &ClientRequest::new(ClientAction::GetChats)).await
    {
        return LoopExit::Lost(err.to_string());
    }
    emit(event_tx, TransportEvent::Connected).await;

    for request in &backlog {
        if let Err(err) = write_request(&mut ws_sink, request).await {
            return LoopExit::Lost(err.to_string());
        }
    }

    loop {
        tokio::select! {
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_ws_text(text.as_str(), event_tx).await;
                    }
                    Some(Ok(WsMessage::Close(close))) => {
                        debug!("Chat channel: received Close frame");
                        let reason = close
                            .map(|c| c.reason.as_str().to_string())
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| "closed by server".to_string());
                        return LoopExit::Lost(reason);
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong/Binary
                    }
                    Some(Err(err)) => {
                        warn!("Chat channel: WebSocket read error: {}", err);
                        return LoopExit::Lost(err.to_string());
                    }
                    None => {
                        debug!("Chat channel: WebSocket stream ended");
                        return LoopExit::Lost("connection closed".to_string());
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Send(request)) => {
                        if let Err(err) = write_request(&mut ws_sink, &request).await {
                            warn!(
                                "Chat channel: failed to send '{}': {}",
                                request.action.name(),
                                err
                            );
                            return LoopExit::Lost(err.to_string());
                        }
                    }
                    Some(ClientCommand::Disconnect) => {
                        send_close(&mut ws_sink).await;
                        return LoopExit::Closed;
                    }
                    None => {
                        debug!("Chat channel: command channel closed, shutting down");
                        send_close(&mut ws_sink).await;
                        return LoopExit::Closed;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn connect_ws(url: &str) -> Result<WsStream> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|err| Error::transport_unavailable(url, err.to_string()))?;
    Ok(ws_stream)
}

/// Compute exponential backoff duration for reconnection attempt `n`.
///
/// The formula is `INITIAL_BACKOFF * 2^(n-1)`, capped at `MAX_BACKOFF`.
fn compute_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let multiplier: u64 = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let secs = INITIAL_BACKOFF.as_secs().saturating_mul(multiplier);
    Duration::from_secs(secs.min(MAX_BACKOFF.as_secs()))
}

fn set_state(state: &SharedState, next: ConnectionState) {
    let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
    *guard = next;
}

/// Deliver an event to the app. A closed receiver means nobody is listening.
async fn emit(event_tx: &mpsc::Sender<TransportEvent>, event: TransportEvent) {
    if event_tx.send(event).await.is_err() {
        trace!("Chat channel: event receiver dropped");
    }
}

async fn write_request(ws_sink: &mut WsSink, request: &ClientRequest) -> Result<()> {
    let json = request.to_json()?;
    debug!("Chat channel: -> {}", request.action.name());
    ws_sink
        .send(WsMessage::Text(json.into()))
        .await
        .map_err(|err| Error::channel_send(err.to_string()))
}

/// Route an incoming text frame to the event channel.
async fn handle_ws_text(text: &str, event_tx: &mpsc::Sender<TransportEvent>) {
    match parse_server_frame(text) {
        ParsedFrame::Event(frame) => {
            debug!("Chat channel: <- {}", frame.event.kind());
            emit(event_tx, TransportEvent::Frame(frame)).await;
        }
        ParsedFrame::Unknown(kind) => {
            debug!("Chat channel: ignoring frame of unknown type '{}'", kind);
        }
        ParsedFrame::Malformed(reason) => {
            warn!(
                "Chat channel: malformed frame ({}): {}",
                reason,
                text.chars().take(120).collect::<String>()
            );
            emit(event_tx, TransportEvent::Malformed(reason)).await;
        }
    }
}

/// Send a WebSocket Close frame, ignoring any write errors.
async fn send_close(ws_sink: &mut WsSink) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.close().await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- compute_backoff -----------------------------------------------------

    #[test]
    fn test_reconnection_backoff_doubles() {
        assert_eq!(compute_backoff(1), Duration::from_secs(1));
        assert_eq!(compute_backoff(2), Duration::from_secs(2));
        assert_eq!(compute_backoff(3), Duration::from_secs(4));
        assert_eq!(compute_backoff(4), Duration::from_secs(8));
        assert_eq!(compute_backoff(5), Duration::from_secs(16));
    }

    #[test]
    fn test_reconnection_backoff_capped_at_max() {
        assert_eq!(compute_backoff(6), MAX_BACKOFF);
        assert_eq!(compute_backoff(10), MAX_BACKOFF);
    }

    #[test]
    fn test_reconnection_backoff_large_attempt_does_not_overflow() {
        assert_eq!(compute_backoff(u32::MAX), MAX_BACKOFF);
    }

    // -- ConnectOptions ------------------------------------------------------

    #[test]
    fn test_connect_options_default() {
        assert_eq!(
            ConnectOptions::default().max_reconnect_attempts,
            DEFAULT_MAX_RECONNECT_ATTEMPTS
        );
    }

    // -- ChannelHandle -------------------------------------------------------

    #[test]
    fn test_handle_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<ChannelHandle>();
    }

    #[test]
    fn test_disconnected_handle_drops_sends() {
        let handle = ChannelHandle::disconnected();
        assert!(!handle.send(ClientRequest::new(ClientAction::GetChats)));
        assert_eq!(handle.connection_state(), ConnectionState::Disconnected);
        assert!(!handle.is_connected());
    }

    #[test]
    fn test_send_is_captured_in_order() {
        let (handle, mut sent) = ChannelHandle::new_for_test();
        assert!(handle.send(ClientRequest::with_id(
            ClientAction::SendMessage {
                text: "سلام".to_string()
            },
            1
        )));
        assert!(handle.send(ClientRequest::new(ClientAction::GetChats)));
        handle.close();

        let requests = sent.drain();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].request_id, Some(1));
        assert_eq!(requests[1].action, ClientAction::GetChats);
    }

    #[test]
    fn test_clones_share_connection_state() {
        let (handle, _sent) = ChannelHandle::new_for_test();
        let clone = handle.clone();
        set_state(&handle.state, ConnectionState::Reconnecting { attempt: 2 });
        assert_eq!(
            clone.connection_state(),
            ConnectionState::Reconnecting { attempt: 2 }
        );
    }

    #[test]
    fn test_handle_debug_shows_state() {
        let (handle, _sent) = ChannelHandle::new_for_test();
        let debug = format!("{:?}", handle);
        assert!(debug.contains("Connected"));
    }

    // -- handle_ws_text ------------------------------------------------------

    #[tokio::test]
    async fn test_text_frame_routes_event() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_ws_text(r#"{"type":"new_message","role":"bot","content":"hi"}"#, &tx).await;
        match rx.try_recv() {
            Ok(TransportEvent::Frame(frame)) => assert_eq!(frame.event.kind(), "new_message"),
            other => panic!("Expected Frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_frame_is_dropped() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_ws_text(r#"{"type":"typing"}"#, &tx).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_frame_reported_and_later_frames_flow() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_ws_text("{oops", &tx).await;
        handle_ws_text(r#"{"type":"chats","data":[]}"#, &tx).await;

        assert!(matches!(rx.try_recv(), Ok(TransportEvent::Malformed(_))));
        assert!(matches!(rx.try_recv(), Ok(TransportEvent::Frame(_))));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_transport_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = ChatClient::connect(&format!("ws://{addr}/ws"), ConnectOptions::default()).await;
        assert!(matches!(result, Err(Error::TransportUnavailable { .. })));
    }
}
