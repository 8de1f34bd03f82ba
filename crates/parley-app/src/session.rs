//! ChatSession - shared orchestration for the TUI and headless runners
//!
//! Owns the TEA state, the unified message channel and the outbound
//! transport. Frontends feed it messages and render `state`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actions::ActionContext;
use crate::config::Settings;
use crate::message::Message;
use crate::process;
use crate::state::AppState;
use parley_core::prelude::*;
use parley_transport::{ChannelHandle, ChatClient, ConnectOptions, PromptClient, TransportEvent};

/// Capacity of the unified message channel.
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// How long `shutdown` waits for the transport to report its close.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// One chat session against a WebSocket or HTTP backend.
pub struct ChatSession {
    /// TEA application state (the Model)
    pub state: AppState,

    msg_tx: mpsc::Sender<Message>,
    msg_rx: mpsc::Receiver<Message>,

    actions: ActionContext,

    /// Forwards transport events into the message channel
    forwarder: Option<JoinHandle<()>>,
}

impl ChatSession {
    /// Open a session with the backend described by `settings`.
    ///
    /// Never fails: an unreachable WebSocket backend leaves the session
    /// disconnected with a notice in the log, and the first message
    /// received is the corresponding [`TransportEvent::Disconnected`].
    pub async fn open(settings: Settings) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        spawn_signal_handler(msg_tx.clone());

        if settings.is_http() {
            info!(
                "Using HTTP backend at {} (field: {})",
                settings.server.http_endpoint,
                settings.server.http_field.as_str()
            );
            let backend =
                PromptClient::new(&settings.server.http_endpoint, settings.server.http_field);
            return Self::from_parts(settings, msg_tx, msg_rx, ActionContext::http(backend), None);
        }

        let options = ConnectOptions {
            max_reconnect_attempts: settings.server.max_reconnect_attempts,
        };

        match ChatClient::connect(&settings.server.url, options).await {
            Ok(client) => {
                let (channel, events) = client.split();
                let forwarder = spawn_event_forwarder(events, msg_tx.clone());
                Self::from_parts(
                    settings,
                    msg_tx,
                    msg_rx,
                    ActionContext::websocket(channel),
                    Some(forwarder),
                )
            }
            Err(e) => {
                error!("Could not connect to chat backend: {}", e);
                let _ = msg_tx.try_send(Message::Transport(TransportEvent::Disconnected {
                    reason: Some(e.to_string()),
                }));
                Self::from_parts(
                    settings,
                    msg_tx,
                    msg_rx,
                    ActionContext::websocket(ChannelHandle::disconnected()),
                    None,
                )
            }
        }
    }

    /// Build a session around an existing outbound context.
    ///
    /// No transport events are delivered; callers inject them with
    /// [`process_message`](Self::process_message).
    pub fn with_context(settings: Settings, actions: ActionContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        Self::from_parts(settings, msg_tx, msg_rx, actions, None)
    }

    fn from_parts(
        settings: Settings,
        msg_tx: mpsc::Sender<Message>,
        msg_rx: mpsc::Receiver<Message>,
        actions: ActionContext,
        forwarder: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            state: AppState::new(settings),
            msg_tx,
            msg_rx,
            actions,
            forwarder,
        }
    }

    /// Process a single message through the TEA update cycle.
    pub fn process_message(&mut self, msg: Message) {
        process::process_message(&mut self.state, msg, &self.msg_tx, &self.actions);
    }

    /// Drain and process everything already queued.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Wait for the next queued message without processing it.
    pub async fn recv(&mut self) -> Option<Message> {
        self.msg_rx.recv().await
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn channel(&self) -> &ChannelHandle {
        &self.actions.channel
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit
    }

    /// Close the channel and wait briefly for the transport to wind down.
    pub async fn shutdown(&mut self) {
        self.actions.channel.close();

        if let Some(mut forwarder) = self.forwarder.take() {
            // The forwarder may be blocked on a full channel nobody drains.
            let msg_rx = &mut self.msg_rx;
            let drain = async {
                loop {
                    tokio::select! {
                        result = &mut forwarder => return result,
                        Some(_) = msg_rx.recv() => {}
                    }
                }
            };

            match tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await {
                Ok(Ok(())) => debug!("Transport closed"),
                Ok(Err(e)) => warn!("Transport forwarder panicked: {}", e),
                Err(_) => warn!("Transport close timed out"),
            }
        }
    }
}

/// Forward transport events into the unified message channel until either
/// side goes away.
pub(crate) fn spawn_event_forwarder(
    mut events: mpsc::Receiver<TransportEvent>,
    msg_tx: mpsc::Sender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if msg_tx.send(Message::Transport(event)).await.is_err() {
                break;
            }
        }
        debug!("Transport event stream ended");
    })
}

/// Send [`Message::Quit`] on SIGINT/SIGTERM.
///
/// In raw mode the terminal reports Ctrl+C as a key; this covers headless
/// runs and signals from other processes.
fn spawn_signal_handler(tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!("Received {}, quitting", name);
                let _ = tx.send(Message::Quit).await;
            }
            Err(e) => error!("Signal handler error: {}", e),
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| Error::terminal(format!("Failed to create SIGTERM handler: {e}")))?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| Error::terminal(format!("Failed to listen for SIGINT: {e}")))?;
            Ok("SIGINT")
        }
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| Error::terminal(format!("Failed to listen for Ctrl+C: {e}")))?;
    Ok("Ctrl+C")
}
