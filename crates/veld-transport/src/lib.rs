//! # Veld Transport
//!
//! Implementations of the persistent-connection collaborator defined at the
//! [`veld_core::transport`] boundary:
//!
//! - [`ws::WsConnector`] — the production WebSocket transport
//!   (tokio-tungstenite, one JSON [`Frame`](veld_core::Frame) per text
//!   message).
//! - [`memory::MemoryConnector`] — an in-process channel-backed transport
//!   for tests and offline demos, exercising the same handle/sink contract.
//!
//! Neither implementation reconnects: connection loss ends the read loop,
//! signals the closed watch, and notifies the sink exactly once.

pub mod memory;
pub mod ws;

pub use memory::{MemoryConnector, MemoryRemote};
pub use ws::WsConnector;
