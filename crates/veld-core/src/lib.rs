//! # Veld Core
//!
//! Core engine of the Veld chat gateway client: typed wire models, the
//! closed event catalog, and the dispatch/session-state core.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   (name, payload)   ┌────────────┐   typed payload   ┌──────────┐
//! │ Transport │────────────────────▶│ Dispatcher │──────────────────▶│ Listener │
//! │ (ws/mem)  │                     │  + mirror  │──────────────────▶│ Listener │
//! └───────────┘                     └────────────┘                   └──────────┘
//! ```
//!
//! - [`model`]: value records for wire payloads, serde-backed, tolerant of
//!   missing optionals and legacy key casing.
//! - [`event`]: the closed [`GatewayEvent`] catalog.
//! - [`dispatch`]: ordered listener registries, the per-event decoder
//!   table, and the session mirror (current user, known-users roster).
//! - [`transport`]: the boundary to the persistent-connection collaborator.
//!
//! ## Example
//!
//! ```rust,ignore
//! use veld_core::{Dispatcher, GatewayEvent, listener};
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.add_listener(
//!     GatewayEvent::UsrMsg,
//!     listener(|payload| async move {
//!         if let Some(message) = payload.as_message() {
//!             println!("<{}> {:?}", message.user.name, message.content);
//!         }
//!         Ok(())
//!     }),
//! );
//! ```

pub mod dispatch;
pub mod error;
pub mod event;
pub mod model;
pub mod transport;

pub use dispatch::{Dispatcher, EventPayload, Listener, SessionState, listener};
pub use error::{DecodeError, DecodeResult, TransportError, TransportResult};
pub use event::{GatewayEvent, LOGIN_WIRE_NAME};
pub use model::{
    Channel, Embed, EmbedAuthor, MemberEvent, Mention, Message, ReadyPayload, Status, User,
    UserStatus,
};
pub use transport::{ConnectionHandle, Connector, EventSink, Frame};
