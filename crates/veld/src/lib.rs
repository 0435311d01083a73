//! # Veld
//!
//! Client library for the Veld chat gateway.
//!
//! ## Overview
//!
//! Veld connects to the gateway over a persistent WebSocket, performs the
//! login handshake, and turns the gateway's named JSON events into typed
//! listener callbacks while mirroring session state (current user, known
//! users) locally.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  frames   ┌────────────┐  typed events  ┌───────────────┐
//! │ Transport  │──────────▶│ Dispatcher │───────────────▶│ Listeners     │
//! │ (WebSocket)│◀──────────│ + mirror   │                │ (user code)   │
//! └────────────┘   emit    └────────────┘                └───────────────┘
//! ```
//!
//! - **veld-core**: event catalog, typed models, dispatcher and the
//!   transport boundary traits
//! - **veld-transport**: WebSocket connector plus an in-memory connector
//!   for tests
//! - **veld-client**: the session [`Client`](veld_client::Client),
//!   configuration, logging setup and the REST surface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use veld::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     LoggingBuilder::new().init();
//!     let client = Client::new(ClientConfig::from_env()?);
//!     client.on_message(|message| async move {
//!         println!("{}: {:?}", message.user.name, message.content);
//!         Ok(())
//!     });
//!     client.run(std::env::var("VELD_TOKEN").ok().as_deref()).await?;
//!     Ok(())
//! }
//! ```

pub use veld_client as client;
pub use veld_core as core;
pub use veld_transport as transport;

/// Prelude module for convenient imports.
pub mod prelude {
    // Session client - main entry point
    pub use veld_client::{Client, ClientConfig, LoggingBuilder, RestClient};

    // Event catalog and listener plumbing
    pub use veld_core::dispatch::{EventPayload, listener};
    pub use veld_core::event::GatewayEvent;

    // Typed models
    pub use veld_core::model::{
        Channel, Embed, EmbedAuthor, Mention, Message, ReadyPayload, Status, User, UserStatus,
    };

    // Errors surfaced to applications
    pub use veld_client::{HttpError, ValidationError};
    pub use veld_core::error::{DecodeError, TransportError};
}
