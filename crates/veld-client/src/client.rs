//! The session client: connection lifecycle, listener registration and
//! convenience operations over the dispatch core.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tracing::{info, warn};

use veld_core::dispatch::{Dispatcher, EventPayload, Listener, ListenerFuture, listener};
use veld_core::error::{TransportError, TransportResult};
use veld_core::event::{GatewayEvent, LOGIN_WIRE_NAME};
use veld_core::model::{Message, ReadyPayload, User};
use veld_core::transport::{ConnectionHandle, Connector, EventSink};
use veld_transport::WsConnector;

use crate::config::ClientConfig;
use crate::rest::RestClient;

#[derive(Debug, Clone, Default)]
struct Credentials {
    token: Option<String>,
    bot: bool,
}

struct ClientInner {
    dispatcher: Dispatcher,
    rest: RestClient,
    connection: RwLock<Option<ConnectionHandle>>,
    credentials: RwLock<Credentials>,
}

impl ClientInner {
    /// Performs the login handshake over the open connection.
    async fn login(&self) -> TransportResult<()> {
        let credentials = self.credentials.read().clone();
        if let Some(token) = &credentials.token {
            self.rest.set_token(token);
        }
        let connection = self
            .connection
            .read()
            .clone()
            .ok_or(TransportError::NotConnected)?;
        info!(
            bot = credentials.bot,
            has_token = credentials.token.is_some(),
            "logging in to gateway"
        );
        connection
            .emit(
                LOGIN_WIRE_NAME,
                Some(json!({"token": credentials.token, "bot": credentials.bot})),
            )
            .await
    }
}

/// Translates transport callbacks into dispatch calls.
///
/// One sink instance serves the whole connection; the catalog lookup is the
/// closed-set routing step, so an unknown wire name is dropped here with a
/// warning and never reaches the dispatcher.
struct ClientSink {
    inner: Arc<ClientInner>,
}

#[async_trait]
impl EventSink for ClientSink {
    async fn on_connect(&self, connection: ConnectionHandle) {
        *self.inner.connection.write() = Some(connection);
        self.inner
            .dispatcher
            .dispatch(GatewayEvent::Connect, None)
            .await;
    }

    async fn on_event(&self, name: &str, data: Option<Value>) {
        match GatewayEvent::from_wire_name(name) {
            Some(event) => self.inner.dispatcher.dispatch(event, data.as_ref()).await,
            None => warn!(event = %name, "dropping unknown gateway event"),
        }
    }

    async fn on_disconnect(&self, reason: &str) {
        info!(reason, "gateway session ended");
        *self.inner.connection.write() = None;
    }
}

/// A Veld gateway client.
///
/// Owns the dispatcher, the transport connector and the REST surface.
/// Cheap to clone; clones share all session state.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    connector: Arc<dyn Connector>,
    config: ClientConfig,
}

impl Client {
    /// Creates a client over the WebSocket transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector::new()))
    }

    /// Creates a client over a custom transport.
    pub fn with_connector(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let rest = RestClient::new(config.api_url.clone());
        let inner = Arc::new(ClientInner {
            dispatcher: Dispatcher::new(),
            rest,
            connection: RwLock::new(None),
            credentials: RwLock::new(Credentials::default()),
        });

        // Login-on-connect, installed ahead of any user connect listener.
        let login_inner = Arc::clone(&inner);
        inner.dispatcher.add_listener(
            GatewayEvent::Connect,
            listener(move |_| {
                let inner = Arc::clone(&login_inner);
                async move { inner.login().await.map_err(anyhow::Error::from) }
            }),
        );

        Self {
            inner,
            connector,
            config,
        }
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the REST surface sharing this session's token.
    pub fn rest(&self) -> &RestClient {
        &self.inner.rest
    }

    /// Returns the session owner, once `ready` has been received.
    pub fn current_user(&self) -> Option<User> {
        self.inner.dispatcher.current_user()
    }

    /// Returns the roster of known users.
    pub fn known_users(&self) -> Vec<User> {
        self.inner.dispatcher.known_users()
    }

    /// Registers a listener for `event`.
    ///
    /// Listeners run in registration order, after the built-in
    /// mirror-maintaining handlers.
    pub fn on(&self, event: GatewayEvent, callback: Listener) {
        self.inner.dispatcher.add_listener(event, callback);
    }

    /// Registers a typed listener for the `ready` event.
    pub fn on_ready<F, Fut>(&self, callback: F)
    where
        F: Fn(ReadyPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(
            GatewayEvent::Ready,
            Arc::new(move |payload: EventPayload| -> ListenerFuture {
                match payload {
                    EventPayload::Ready(ready) => Box::pin(callback(ready)),
                    _ => Box::pin(async { Ok(()) }),
                }
            }),
        );
    }

    /// Registers a typed listener for inbound messages.
    pub fn on_message<F, Fut>(&self, callback: F)
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(
            GatewayEvent::UsrMsg,
            Arc::new(move |payload: EventPayload| -> ListenerFuture {
                match payload {
                    EventPayload::Message(message) => Box::pin(callback(message)),
                    _ => Box::pin(async { Ok(()) }),
                }
            }),
        );
    }

    /// Registers a typed listener for join notifications.
    ///
    /// Whether to surface the session user's own join is this listener's
    /// decision; compare against [`Client::current_user`] to suppress it.
    pub fn on_member_join<F, Fut>(&self, callback: F)
    where
        F: Fn(User) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::user_listener(self, GatewayEvent::SysJoin, callback);
    }

    /// Registers a typed listener for leave notifications.
    pub fn on_member_leave<F, Fut>(&self, callback: F)
    where
        F: Fn(User) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::user_listener(self, GatewayEvent::SysLeave, callback);
    }

    /// Registers a typed listener for typing notifications.
    pub fn on_typing<F, Fut>(&self, callback: F)
    where
        F: Fn(User) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::user_listener(self, GatewayEvent::UsrTyp, callback);
    }

    fn user_listener<F, Fut>(&self, event: GatewayEvent, callback: F)
    where
        F: Fn(User) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(
            event,
            Arc::new(move |payload: EventPayload| -> ListenerFuture {
                match payload {
                    EventPayload::User(user) => Box::pin(callback(user)),
                    _ => Box::pin(async { Ok(()) }),
                }
            }),
        );
    }

    /// Connects, logs in and blocks until the connection ends.
    ///
    /// The login handshake (carrying `token` and the configured bot flag)
    /// is emitted once the synthetic `connect` event fires. On any exit
    /// path the connection is closed and the handle slot cleared.
    pub async fn start(&self, token: Option<&str>) -> TransportResult<()> {
        *self.inner.credentials.write() = Credentials {
            token: token.map(str::to_string),
            bot: self.config.bot,
        };

        let sink: Arc<dyn EventSink> = Arc::new(ClientSink {
            inner: Arc::clone(&self.inner),
        });
        let handle = self.connector.connect(&self.config.gateway_url, sink).await?;

        handle.closed().await;
        self.disconnect();
        Ok(())
    }

    /// Runs the client until the connection ends or the process is
    /// interrupted, disconnecting on every exit path.
    pub async fn run(&self, token: Option<&str>) -> TransportResult<()> {
        let result = tokio::select! {
            result = self.start(token) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                Ok(())
            }
        };
        self.disconnect();
        result
    }

    /// Closes the current connection, if any. Idempotent.
    pub fn disconnect(&self) {
        if let Some(connection) = self.inner.connection.write().take() {
            connection.close();
        }
    }

    /// Sends a chat message over the gateway connection.
    ///
    /// The outbound text field is `content` (protocol v1). Fails with
    /// [`TransportError::NotConnected`] when no connection is open.
    pub async fn send_message(&self, content: &str) -> TransportResult<()> {
        let connection = self
            .inner
            .connection
            .read()
            .clone()
            .ok_or(TransportError::NotConnected)?;
        connection
            .emit(
                GatewayEvent::UsrMsg.wire_name(),
                Some(json!({"content": content})),
            )
            .await
    }

    /// Sets the session nickname via the gateway's `/nick` command text.
    pub async fn set_nickname(&self, name: &str) -> TransportResult<()> {
        self.send_message(&format!("/nick {name}")).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("connected", &self.inner.connection.read().is_some())
            .finish()
    }
}
