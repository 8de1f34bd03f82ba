//! Action handlers: UpdateAction dispatch and background task spawning

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::attachment::{encode_attachment, AttachmentFile};
use crate::message::Message;
use crate::UpdateAction;
use parley_core::prelude::*;
use parley_transport::{ChannelHandle, PromptClient, ReplyBackend};

/// Outbound handles the action layer dispatches through.
///
/// A WebSocket session has a live `channel` and no `backend`; an HTTP
/// session has an inert channel and a [`ReplyBackend`].
pub struct ActionContext<B = PromptClient> {
    pub channel: ChannelHandle,
    pub backend: Option<Arc<B>>,
}

impl<B> ActionContext<B> {
    pub fn websocket(channel: ChannelHandle) -> Self {
        Self {
            channel,
            backend: None,
        }
    }

    pub fn http(backend: B) -> Self {
        Self {
            channel: ChannelHandle::disconnected(),
            backend: Some(Arc::new(backend)),
        }
    }
}

impl<B> Clone for ActionContext<B> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            backend: self.backend.clone(),
        }
    }
}

/// Execute an action, spawning background work where it would block the loop
pub fn handle_action<B>(action: UpdateAction, msg_tx: mpsc::Sender<Message>, ctx: &ActionContext<B>)
where
    B: ReplyBackend + Send + Sync + 'static,
{
    match action {
        UpdateAction::Send(request) => {
            let name = request.action.name();
            if !ctx.channel.send(request) {
                debug!("Request {} was not queued", name);
            }
        }

        UpdateAction::LoadAttachment { path, max_bytes } => {
            tokio::spawn(async move {
                let result =
                    tokio::task::spawn_blocking(move || AttachmentFile::from_path(&path, max_bytes))
                        .await;

                let msg = match result {
                    Ok(Ok(file)) => Message::AttachmentLoaded { file },
                    Ok(Err(e)) => Message::AttachmentLoadFailed {
                        error: e.to_string(),
                    },
                    Err(e) => Message::AttachmentLoadFailed {
                        error: format!("File read task failed: {e}"),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::EncodeAndSendFile {
            request_id,
            file,
            text,
        } => {
            tokio::spawn(async move {
                let result =
                    tokio::task::spawn_blocking(move || encode_file_message(request_id, file, text))
                        .await;

                let msg = result.unwrap_or_else(|e| Message::AttachmentEncodeFailed {
                    request_id,
                    error: e.to_string(),
                });
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::AskHttp { request_id, text } => {
            let Some(backend) = ctx.backend.clone() else {
                error!("AskHttp dispatched without an HTTP backend");
                let _ = msg_tx.try_send(Message::HttpReplyFailed {
                    request_id,
                    error: "No HTTP backend configured".to_string(),
                });
                return;
            };

            tokio::spawn(async move {
                let msg = match ReplyBackend::ask(backend.as_ref(), &text).await {
                    Ok(reply) => Message::HttpReplyReceived { request_id, reply },
                    Err(e) => Message::HttpReplyFailed {
                        request_id,
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }
    }
}

/// Base64-encode a submitted file into the message that sends it.
pub fn encode_file_message(request_id: u64, file: AttachmentFile, text: String) -> Message {
    Message::AttachmentEncoded {
        request_id,
        data: encode_attachment(&file.bytes),
        filename: file.filename,
        mime_type: file.mime_type,
        text,
    }
}
