//! In-process gateway transport for tests and offline demos.
//!
//! [`MemoryConnector::pair`] yields a connector for the client side and a
//! [`MemoryRemote`] standing in for the gateway: the remote pushes named
//! events into the sink and observes the frames the client emits. The
//! handle/sink contract is identical to the WebSocket transport.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use veld_core::error::{TransportError, TransportResult};
use veld_core::transport::{ConnectionHandle, Connector, EventSink, Frame};

struct Shared {
    sink: Mutex<Option<Arc<dyn EventSink>>>,
    closed_tx: watch::Sender<bool>,
}

impl Shared {
    fn sink(&self) -> Option<Arc<dyn EventSink>> {
        self.sink.lock().clone()
    }
}

/// Client-side half: a [`Connector`] that supports a single connection.
pub struct MemoryConnector {
    shared: Arc<Shared>,
    // Taken by the first (only) connect call.
    connection: Mutex<Option<(ConnectionHandle, watch::Receiver<bool>)>>,
}

/// Gateway-side half: pushes events, observes emitted frames, closes.
pub struct MemoryRemote {
    shared: Arc<Shared>,
    frames: tokio::sync::Mutex<mpsc::Receiver<Frame>>,
}

impl MemoryConnector {
    /// Creates a connected connector/remote pair.
    pub fn pair() -> (Self, MemoryRemote) {
        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (closed_tx, closed_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            sink: Mutex::new(None),
            closed_tx,
        });
        let handle = ConnectionHandle::new(frame_tx, shutdown_tx, closed_rx);

        let connector = Self {
            shared: Arc::clone(&shared),
            connection: Mutex::new(Some((handle, shutdown_rx))),
        };
        let remote = MemoryRemote {
            shared,
            frames: tokio::sync::Mutex::new(frame_rx),
        };
        (connector, remote)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        url: &str,
        sink: Arc<dyn EventSink>,
    ) -> TransportResult<ConnectionHandle> {
        let (handle, mut shutdown_rx) = match self.connection.lock().take() {
            Some(pair) => pair,
            None => {
                return Err(TransportError::ConnectionFailed {
                    url: url.to_string(),
                    reason: "memory connector supports a single connection".to_string(),
                });
            }
        };

        debug!(url, "memory gateway connection established");
        *self.shared.sink.lock() = Some(Arc::clone(&sink));

        // Client-initiated shutdown: flip the closed watch and notify the
        // sink, mirroring the WebSocket loop's exit path.
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            while shutdown_rx.changed().await.is_ok() {
                if *shutdown_rx.borrow() {
                    let _ = shared.closed_tx.send(true);
                    if let Some(sink) = shared.sink() {
                        sink.on_disconnect("client shutdown").await;
                    }
                    break;
                }
            }
        });

        sink.on_connect(handle.clone()).await;
        Ok(handle)
    }
}

impl MemoryRemote {
    /// Pushes a named event into the client's sink, as the gateway would.
    pub async fn push_event(&self, name: &str, data: Option<Value>) {
        if let Some(sink) = self.shared.sink() {
            sink.on_event(name, data).await;
        }
    }

    /// Receives the next frame the client emitted.
    pub async fn next_frame(&self) -> Option<Frame> {
        self.frames.lock().await.recv().await
    }

    /// Closes the connection from the gateway side.
    pub async fn close(&self, reason: &str) {
        let _ = self.shared.closed_tx.send(true);
        if let Some(sink) = self.shared.sink() {
            sink.on_disconnect(reason).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(String, Option<Value>)>>,
        disconnects: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn on_connect(&self, _connection: ConnectionHandle) {
            self.events.lock().push(("connect".to_string(), None));
        }

        async fn on_event(&self, name: &str, data: Option<Value>) {
            self.events.lock().push((name.to_string(), data));
        }

        async fn on_disconnect(&self, reason: &str) {
            self.disconnects.lock().push(reason.to_string());
        }
    }

    #[tokio::test]
    async fn events_flow_to_the_sink_in_order() {
        let (connector, remote) = MemoryConnector::pair();
        let sink = Arc::new(RecordingSink::default());
        connector
            .connect("memory://test", Arc::clone(&sink) as Arc<dyn EventSink>)
            .await
            .unwrap();

        remote.push_event("ready", Some(json!({"token": "t"}))).await;
        remote.push_event("usr-typ", None).await;

        let events = sink.events.lock();
        assert_eq!(events[0].0, "connect");
        assert_eq!(events[1], ("ready".to_string(), Some(json!({"token": "t"}))));
        assert_eq!(events[2], ("usr-typ".to_string(), None));
    }

    #[tokio::test]
    async fn emitted_frames_reach_the_remote() {
        let (connector, remote) = MemoryConnector::pair();
        let sink = Arc::new(RecordingSink::default());
        let handle = connector
            .connect("memory://test", sink as Arc<dyn EventSink>)
            .await
            .unwrap();

        handle
            .emit("usr-msg", Some(json!({"content": "hi"})))
            .await
            .unwrap();

        let frame = remote.next_frame().await.unwrap();
        assert_eq!(frame, Frame::new("usr-msg", Some(json!({"content": "hi"}))));
    }

    #[tokio::test]
    async fn remote_close_signals_the_handle() {
        let (connector, remote) = MemoryConnector::pair();
        let sink = Arc::new(RecordingSink::default());
        let handle = connector
            .connect("memory://test", Arc::clone(&sink) as Arc<dyn EventSink>)
            .await
            .unwrap();

        remote.close("server going away").await;
        handle.closed().await;
        assert!(handle.is_closed());
        assert_eq!(sink.disconnects.lock().as_slice(), ["server going away"]);
    }

    #[tokio::test]
    async fn second_connect_is_rejected() {
        let (connector, _remote) = MemoryConnector::pair();
        let sink = Arc::new(RecordingSink::default());
        connector
            .connect("memory://test", Arc::clone(&sink) as Arc<dyn EventSink>)
            .await
            .unwrap();

        let result = connector
            .connect("memory://test", sink as Arc<dyn EventSink>)
            .await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionFailed { .. })
        ));
    }
}
