//! The dispatch loop: reads framed commands, writes exactly one reply each.
//!
//! Every inbound frame spawns its own handler task, so multiple requests
//! interleave freely and replies need not preserve request order. All
//! replies funnel through a single writer task, which keeps concurrent
//! handlers from interleaving partial frames on the channel. Handler
//! failures of any kind are recovered here and converted to error
//! envelopes; nothing a command does can terminate the channel.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use walletkit_rpc::{
    command, Frame, ProtocolInfo, ReplyEnvelope, RpcCodec, StartRequest, SupplyOptions,
    DEFAULT_MAX_PAYLOAD,
};

use crate::error::{Result, WorkletError};
use crate::handlers;
use crate::registry::ModuleRegistry;
use crate::session::SessionManager;

/// Replies buffered between handler tasks and the writer task.
const REPLY_QUEUE_DEPTH: usize = 64;

/// Serves the worklet command protocol over one host channel.
pub struct Dispatcher {
    sessions: Arc<SessionManager>,
    max_payload: usize,
}

impl Dispatcher {
    /// Create a dispatcher over a static module registry.
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(registry)),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Override the per-frame payload cap.
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// The session manager backing this dispatcher.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Run the dispatch loop until the host closes the channel.
    ///
    /// Returns `Ok(())` on clean EOF. Frame-level decode errors (bad
    /// magic, oversized payload) are unrecoverable stream desyncs and are
    /// returned; handler failures never are.
    pub async fn serve<S>(&self, io: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(io);
        let mut requests = FramedRead::new(read_half, RpcCodec::new(self.max_payload));
        let mut replies_out = FramedWrite::new(write_half, RpcCodec::new(self.max_payload));

        let (reply_tx, mut reply_rx) = mpsc::channel::<Frame>(REPLY_QUEUE_DEPTH);

        let writer = tokio::spawn(async move {
            while let Some(frame) = reply_rx.recv().await {
                if let Err(err) = replies_out.send(frame).await {
                    tracing::error!(error = %err, "failed to write reply frame");
                    break;
                }
            }
        });

        tracing::info!("dispatch loop started");

        let result = loop {
            match requests.next().await {
                Some(Ok(request)) => {
                    tracing::debug!(
                        request = request.request_id,
                        command = command::command_name(request.command),
                        "request received"
                    );
                    let sessions = Arc::clone(&self.sessions);
                    let reply_tx = reply_tx.clone();
                    tokio::spawn(async move {
                        let reply = handle_request(&sessions, &request).await;
                        if reply_tx.send(reply).await.is_err() {
                            tracing::warn!(
                                request = request.request_id,
                                "reply channel closed before reply could be written"
                            );
                        }
                    });
                }
                Some(Err(err)) => {
                    tracing::error!(error = %err, "unrecoverable frame error on host channel");
                    break Err(err.into());
                }
                None => {
                    tracing::info!("host channel closed");
                    break Ok(());
                }
            }
        };

        // Let in-flight handlers drain their replies before shutting the
        // writer down.
        drop(reply_tx);
        let _ = writer.await;

        result
    }
}

/// Handle one request, producing exactly one reply frame.
///
/// This is the single failure boundary: every handler error, including
/// malformed payloads and unknown command codes, becomes an error
/// envelope on the reply.
async fn handle_request(sessions: &SessionManager, request: &Frame) -> Frame {
    let payload = match run_command(sessions, request).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(
                request = request.request_id,
                command = command::command_name(request.command),
                error = %err,
                "command failed"
            );
            encode_envelope(&ReplyEnvelope::error(
                err.to_string(),
                Some(request.command),
            ))
        }
    };

    Frame::new(request.request_id, request.command, payload)
}

async fn run_command(sessions: &SessionManager, request: &Frame) -> Result<Bytes> {
    match request.command {
        // PING replies with the bare greeting, not JSON.
        command::PING => Ok(Bytes::from_static(handlers::ping().as_bytes())),

        command::START => {
            let init: StartRequest = serde_json::from_slice(&request.payload)?;
            let envelope = handlers::start(sessions, init).await?;
            Ok(encode_envelope(&envelope))
        }

        command::GET_ADDRESS => {
            let chains: Vec<String> = serde_json::from_slice(&request.payload)?;
            let envelope = handlers::get_address(sessions, chains).await?;
            Ok(encode_envelope(&envelope))
        }

        command::QUOTE_LENDING_SUPPLY => {
            let (info, options): (ProtocolInfo, SupplyOptions) =
                serde_json::from_slice(&request.payload)?;
            let envelope = handlers::quote_lending_supply(sessions, info, options).await?;
            Ok(encode_envelope(&envelope))
        }

        other => Err(WorkletError::UnknownCommand(other)),
    }
}

fn encode_envelope(envelope: &ReplyEnvelope) -> Bytes {
    match serde_json::to_vec(envelope) {
        Ok(bytes) => Bytes::from(bytes),
        Err(err) => {
            // Envelopes are plain data and should always serialize; if one
            // doesn't, the request still gets its reply.
            tracing::error!(error = %err, "failed to encode reply envelope");
            Bytes::from_static(br#"{"status":"error","message":"reply encoding failed"}"#)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn empty_sessions() -> SessionManager {
        SessionManager::new(ModuleRegistry::builder().build())
    }

    #[tokio::test]
    async fn ping_reply_is_a_bare_string() {
        let sessions = empty_sessions();
        let reply = handle_request(&sessions, &Frame::new(1, command::PING, Bytes::new())).await;

        assert_eq!(reply.request_id, 1);
        assert_eq!(reply.command, command::PING);
        assert_eq!(reply.payload.as_ref(), b"hello from the other side");
    }

    #[tokio::test]
    async fn unknown_command_gets_an_error_envelope() {
        let sessions = empty_sessions();
        let reply = handle_request(&sessions, &Frame::new(9, 42, Bytes::new())).await;

        assert_eq!(reply.request_id, 9);
        let envelope: ReplyEnvelope = serde_json::from_slice(&reply.payload).unwrap();
        assert!(matches!(
            envelope,
            ReplyEnvelope::Error { message, command } if message.contains("unknown command")
                && command == Some(42)
        ));
    }

    #[tokio::test]
    async fn malformed_payload_gets_an_error_envelope() {
        let sessions = empty_sessions();
        let request = Frame::new(3, command::START, Bytes::from_static(b"{not-json"));
        let reply = handle_request(&sessions, &request).await;

        let envelope: ReplyEnvelope = serde_json::from_slice(&reply.payload).unwrap();
        assert!(matches!(
            envelope,
            ReplyEnvelope::Error { message, .. } if message.contains("malformed payload")
        ));
    }

    #[tokio::test]
    async fn get_address_without_session_is_failed() {
        let sessions = empty_sessions();
        let request = Frame::new(
            4,
            command::GET_ADDRESS,
            Bytes::from(serde_json::to_vec(&json!(["btc"])).unwrap()),
        );
        let reply = handle_request(&sessions, &request).await;

        let envelope: serde_json::Value = serde_json::from_slice(&reply.payload).unwrap();
        assert_eq!(envelope, json!({"status": "failed", "data": {}}));
    }
}
