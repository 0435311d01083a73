//! Session client for the Veld chat gateway.
//!
//! [`Client`] ties the pieces together: it opens a gateway connection
//! through a [`Connector`](veld_core::transport::Connector), performs the
//! login handshake, routes inbound events through the dispatch core and
//! exposes typed listener registration plus the small REST surface.
//!
//! ```no_run
//! use veld_client::{Client, ClientConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = Client::new(ClientConfig::from_env()?);
//! client.on_message(|message| async move {
//!     println!("{}: {:?}", message.user.name, message.content);
//!     Ok(())
//! });
//! client.run(Some("my-token")).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod rest;

pub use client::Client;
pub use config::{ClientConfig, ConfigError};
pub use error::{HttpError, HttpResult, ValidationError};
pub use logging::LoggingBuilder;
pub use rest::RestClient;
