//! WebSocket gateway transport.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, trace, warn};

use veld_core::error::{TransportError, TransportResult};
use veld_core::transport::{ConnectionHandle, Connector, EventSink, Frame};

/// The production gateway transport: one WebSocket connection, one JSON
/// [`Frame`] per text message.
///
/// The read/write loop runs in a spawned task until the peer closes, the
/// stream errors, or the handle's shutdown signal fires. There is no
/// reconnection: connection loss signals the closed watch and notifies the
/// sink once.
#[derive(Debug, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Creates a new connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        url: &str,
        sink: Arc<dyn EventSink>,
    ) -> TransportResult<ConnectionHandle> {
        let (ws_stream, _response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::ConnectionFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        info!(url, "gateway connection established");

        let (frame_tx, mut frame_rx) = mpsc::channel::<Frame>(256);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (closed_tx, closed_rx) = watch::channel(false);
        let handle = ConnectionHandle::new(frame_tx, shutdown_tx, closed_rx);

        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        // The synthetic connect event fires before the caller sees the
        // handle, so a login-on-connect listener runs first in all cases.
        sink.on_connect(handle.clone()).await;

        tokio::spawn(async move {
            let reason = loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            let _ = ws_tx.close().await;
                            break "client shutdown".to_string();
                        }
                    }

                    outbound = frame_rx.recv() => match outbound {
                        Some(frame) => match frame.encode() {
                            Ok(text) => {
                                trace!(event = %frame.event, "sending frame");
                                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                                    warn!(error = %e, "failed to send frame");
                                }
                            }
                            Err(e) => warn!(error = %e, "failed to encode frame"),
                        },
                        None => break "all connection handles dropped".to_string(),
                    },

                    inbound = ws_rx.next() => match inbound {
                        Some(Ok(Message::Text(text))) => forward_frame(&sink, text.as_str()).await,
                        Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                            Ok(text) => forward_frame(&sink, text).await,
                            Err(e) => warn!(error = %e, "dropping non-UTF-8 binary frame"),
                        },
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_tx.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                        Some(Ok(Message::Close(_))) => break "server closed connection".to_string(),
                        Some(Err(e)) => break format!("websocket error: {e}"),
                        None => break "stream ended".to_string(),
                    }
                }
            };

            info!(reason = %reason, "gateway connection closed");
            let _ = closed_tx.send(true);
            sink.on_disconnect(&reason).await;
        });

        Ok(handle)
    }
}

/// Decodes one wire frame and forwards it to the sink.
///
/// Undecodable frames are dropped with a warning; one malformed message
/// must not end the read loop.
async fn forward_frame(sink: &Arc<dyn EventSink>, text: &str) {
    match Frame::decode(text) {
        Ok(frame) => {
            trace!(event = %frame.event, "received frame");
            sink.on_event(&frame.event, frame.data).await;
        }
        Err(e) => warn!(error = %e, "dropping undecodable frame"),
    }
}
