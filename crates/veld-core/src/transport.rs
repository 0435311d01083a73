//! Transport boundary types.
//!
//! The persistent connection is an external collaborator; this module pins
//! down its interface: a [`Connector`] opens a connection and drives an
//! [`EventSink`] with named payloads, and the returned [`ConnectionHandle`]
//! carries the emit/close/wait primitives. Implementations live in
//! `veld-transport`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::error::{TransportError, TransportResult};

/// One named payload on the wire: a single JSON text message of the shape
/// `{"event": <name>, "data": <payload?>}`. The `data` key is omitted
/// entirely for payload-less events.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Wire-string event name.
    pub event: String,
    /// Event payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Frame {
    /// Creates a frame.
    pub fn new(event: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Serializes the frame to its wire text.
    pub fn encode(&self) -> TransportResult<String> {
        serde_json::to_string(self).map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Parses a frame from wire text.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Receives connection lifecycle notifications and inbound events.
///
/// The session client implements this; the transport's read loop drives it.
/// Calls arrive from a single task per connection, in wire order.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// The connection is established. The handle is delivered here so the
    /// sink can emit (e.g. a login handshake) before `connect()` returns to
    /// its caller.
    async fn on_connect(&self, connection: ConnectionHandle);

    /// A named payload arrived.
    async fn on_event(&self, name: &str, data: Option<Value>);

    /// The connection ended and will receive no further events.
    async fn on_disconnect(&self, reason: &str);
}

/// Opens gateway connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to `url` and wires inbound traffic into `sink`.
    async fn connect(
        &self,
        url: &str,
        sink: Arc<dyn EventSink>,
    ) -> TransportResult<ConnectionHandle>;
}

/// Handle to an open gateway connection.
///
/// Cloneable; all clones refer to the same connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Outbound frame channel into the connection's write loop.
    frame_tx: mpsc::Sender<Frame>,
    /// Shutdown signal sender.
    shutdown_tx: Arc<watch::Sender<bool>>,
    /// Closed notification, flipped by the connection loop on exit.
    closed_rx: watch::Receiver<bool>,
}

impl ConnectionHandle {
    /// Creates a new connection handle.
    pub fn new(
        frame_tx: mpsc::Sender<Frame>,
        shutdown_tx: watch::Sender<bool>,
        closed_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            frame_tx,
            shutdown_tx: Arc::new(shutdown_tx),
            closed_rx,
        }
    }

    /// Emits a named payload to the gateway.
    ///
    /// Fails with [`TransportError::SendFailed`] once the connection loop
    /// has ended.
    pub async fn emit(&self, event: &str, data: Option<Value>) -> TransportResult<()> {
        self.frame_tx
            .send(Frame::new(event, data))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Requests connection shutdown. Idempotent.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Returns whether the connection loop has ended.
    pub fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }

    /// Waits until the connection loop ends (the `wait()` primitive).
    pub async fn closed(&self) {
        let mut closed_rx = self.closed_rx.clone();
        while !*closed_rx.borrow() {
            if closed_rx.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frame_round_trips() {
        let frame = Frame::new("usr-msg", Some(json!({"content": "hi"})));
        let decoded = Frame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn payloadless_frame_omits_data_key() {
        let text = Frame::new("sys-commands", None).encode().unwrap();
        assert_eq!(text, r#"{"event":"sys-commands"}"#);
        assert_eq!(Frame::decode(&text).unwrap().data, None);
    }

    #[test]
    fn garbage_frame_fails_decode() {
        assert!(Frame::decode("not json").is_err());
        assert!(Frame::decode(r#"{"data": {}}"#).is_err());
    }

    #[tokio::test]
    async fn emit_after_loop_exit_fails() {
        let (frame_tx, frame_rx) = mpsc::channel(4);
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        let (_closed_tx, closed_rx) = watch::channel(false);
        let handle = ConnectionHandle::new(frame_tx, shutdown_tx, closed_rx);

        drop(frame_rx);
        let result = handle.emit("usr-msg", None).await;
        assert!(matches!(result, Err(TransportError::SendFailed(_))));
    }

    #[tokio::test]
    async fn closed_resolves_after_signal() {
        let (frame_tx, _frame_rx) = mpsc::channel(4);
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        let (closed_tx, closed_rx) = watch::channel(false);
        let handle = ConnectionHandle::new(frame_tx, shutdown_tx, closed_rx);

        assert!(!handle.is_closed());
        closed_tx.send(true).unwrap();
        handle.closed().await;
        assert!(handle.is_closed());
    }
}
