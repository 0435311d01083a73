//! Echo Bot Demo
//!
//! A small demonstration of the Veld client: connects to the gateway,
//! logs every message, and answers a couple of slash commands.
//!
//! # Usage
//!
//! ```bash
//! VELD_TOKEN=<your-token> cargo run --package echo-bot
//! ```

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use veld::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    LoggingBuilder::new().directive("echo_bot=debug").init();

    let config = ClientConfig::from_env()?;
    let client = Arc::new(Client::new(config));

    client.on_ready(|ready| async move {
        info!(
            user = %ready.user.name,
            members = ready.members.len(),
            "session ready"
        );
        Ok(())
    });

    {
        let greeter = Arc::clone(&client);
        client.on_member_join(move |user| {
            let client = Arc::clone(&greeter);
            async move {
                // The gateway also announces our own join; skip that one.
                if client.current_user().is_some_and(|me| me == user) {
                    return Ok(());
                }
                client.send_message(&format!("Welcome, {}!", user.name)).await?;
                Ok(())
            }
        });
    }

    {
        let responder = Arc::clone(&client);
        client.on_message(move |message| {
            let client = Arc::clone(&responder);
            async move {
                let Some(content) = message.content.as_deref() else {
                    return Ok(());
                };
                info!(from = %message.user.name, content, "message received");

                if client.current_user().is_some_and(|me| me == message.user) {
                    return Ok(());
                }

                if content.trim() == "/ping" {
                    client.send_message("Pong!").await?;
                } else if let Some(text) = content.strip_prefix("/echo ") {
                    client.send_message(text).await?;
                }
                Ok(())
            }
        });
    }

    let token = std::env::var("VELD_TOKEN").ok();
    if token.is_none() {
        warn!("VELD_TOKEN is not set, connecting anonymously");
    }

    client.run(token.as_deref()).await?;
    Ok(())
}
