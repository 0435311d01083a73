//! Event dispatch and session-state core.
//!
//! The [`Dispatcher`] receives raw `(event, payload)` pairs from the
//! transport sink, decodes the payload through a fixed per-event decoder
//! table, keeps the session mirror (current user, known-users roster)
//! consistent with the stream, and invokes registered listeners.
//!
//! # Invocation contract
//!
//! Listener invocation is **synchronous sequential**: for one dispatch,
//! listeners run in registration order and each is awaited before the next
//! starts. This preserves strict cross-listener ordering and keeps mirror
//! updates serialized, at the cost of one slow listener delaying the rest
//! of the dispatch and the next inbound event. A listener returning `Err`
//! is logged and does not stop the remaining listeners, and never
//! surfaces to the dispatch caller.
//!
//! # Mirror maintenance
//!
//! The mirror-maintaining handlers for `ready`, `sys-join` and `sys-leave`
//! are installed by [`Dispatcher::new`] from an explicit table, ahead of
//! any user listener, so they are guaranteed to run first and the
//! empty-listener fast path never skips a mirror update.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{Instrument, Level, debug, span, warn};

use crate::error::{DecodeError, DecodeResult};
use crate::event::GatewayEvent;
use crate::model::{Message, ReadyPayload, User};

/// The decoded argument delivered to listeners.
///
/// `None` is the synthetic zero-argument invocation (events dispatched
/// without a payload, such as `connect`); `Raw` is the unchanged payload of
/// an event with no registered decoder.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// No payload was present.
    None,
    /// Payload passed through undecoded (no decoder for this event).
    Raw(Value),
    /// A decoded user (`sys-join`, `sys-leave`, `usr-typ`).
    User(User),
    /// A decoded message (`usr-msg`).
    Message(Message),
    /// The decoded `ready` payload.
    Ready(ReadyPayload),
}

impl EventPayload {
    /// Returns the decoded user, if this payload carries one.
    pub fn as_user(&self) -> Option<&User> {
        match self {
            EventPayload::User(user) => Some(user),
            _ => None,
        }
    }

    /// Returns the decoded message, if this payload carries one.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            EventPayload::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Returns the decoded ready payload, if this payload carries one.
    pub fn as_ready(&self) -> Option<&ReadyPayload> {
        match self {
            EventPayload::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    /// Returns the raw value, if this payload passed through undecoded.
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            EventPayload::Raw(raw) => Some(raw),
            _ => None,
        }
    }
}

/// Future returned by a listener invocation.
pub type ListenerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// An event listener callable.
pub type Listener = Arc<dyn Fn(EventPayload) -> ListenerFuture + Send + Sync>;

/// Wraps an async closure into a [`Listener`].
pub fn listener<F, Fut>(f: F) -> Listener
where
    F: Fn(EventPayload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |payload| Box::pin(f(payload)))
}

/// The client-local mirror of session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The user owning this session, set by `ready`.
    pub current_user: Option<User>,
    /// Roster of known users, maintained by `ready`/`sys-join`/`sys-leave`.
    pub known_users: Vec<User>,
}

type Decoder = fn(&Value) -> DecodeResult<EventPayload>;

fn decode_user(raw: &Value) -> DecodeResult<EventPayload> {
    User::decode(raw).map(EventPayload::User)
}

fn decode_message(raw: &Value) -> DecodeResult<EventPayload> {
    Message::decode(raw).map(EventPayload::Message)
}

fn decode_ready(raw: &Value) -> DecodeResult<EventPayload> {
    ReadyPayload::decode(raw).map(EventPayload::Ready)
}

/// The central event dispatcher and session-state owner.
///
/// `Dispatcher` is `Send + Sync`; `dispatch` takes `&self`. Mirror
/// mutation is serialized because one connection drives one dispatch loop
/// (single-writer discipline) and the mirror sits behind its own lock for
/// concurrent readers.
pub struct Dispatcher {
    /// Ordered listener registry per event.
    listeners: RwLock<HashMap<GatewayEvent, Vec<Listener>>>,
    /// Fixed decode table. Events absent here pass their payload through raw.
    decoders: HashMap<GatewayEvent, Decoder>,
    /// Session mirror, shared with the built-in handlers.
    state: Arc<RwLock<SessionState>>,
}

impl Dispatcher {
    /// Creates a dispatcher with the decoder table and built-in
    /// mirror-maintaining handlers installed.
    pub fn new() -> Self {
        let mut decoders: HashMap<GatewayEvent, Decoder> = HashMap::new();
        decoders.insert(GatewayEvent::UsrMsg, decode_message);
        decoders.insert(GatewayEvent::SysJoin, decode_user);
        decoders.insert(GatewayEvent::SysLeave, decode_user);
        decoders.insert(GatewayEvent::UsrTyp, decode_user);
        decoders.insert(GatewayEvent::Ready, decode_ready);

        let mut listeners = HashMap::with_capacity(GatewayEvent::ALL.len());
        for event in GatewayEvent::ALL {
            listeners.insert(event, Vec::new());
        }

        let dispatcher = Self {
            listeners: RwLock::new(listeners),
            decoders,
            state: Arc::new(RwLock::new(SessionState::default())),
        };
        dispatcher.install_mirror_handlers();
        dispatcher
    }

    /// Installs the built-in session-mirror handlers.
    ///
    /// Runs inside `new`, so these are always first in registration order
    /// for their events.
    fn install_mirror_handlers(&self) {
        let state = Arc::clone(&self.state);
        self.add_listener(
            GatewayEvent::Ready,
            listener(move |payload| {
                let state = Arc::clone(&state);
                async move {
                    if let EventPayload::Ready(ready) = payload {
                        let mut mirror = state.write();
                        mirror.current_user = Some(ready.user);
                        mirror.known_users = ready.members;
                    }
                    Ok(())
                }
            }),
        );

        let state = Arc::clone(&self.state);
        self.add_listener(
            GatewayEvent::SysJoin,
            listener(move |payload| {
                let state = Arc::clone(&state);
                async move {
                    if let EventPayload::User(user) = payload {
                        let mut mirror = state.write();
                        if !mirror.known_users.iter().any(|known| known.id == user.id) {
                            mirror.known_users.push(user);
                        }
                    }
                    Ok(())
                }
            }),
        );

        let state = Arc::clone(&self.state);
        self.add_listener(
            GatewayEvent::SysLeave,
            listener(move |payload| {
                let state = Arc::clone(&state);
                async move {
                    if let EventPayload::User(user) = payload {
                        // No-op when the id is not present.
                        state.write().known_users.retain(|known| known.id != user.id);
                    }
                    Ok(())
                }
            }),
        );
    }

    /// Appends a listener for `event`.
    ///
    /// Listeners are never reordered or deduplicated: registering the same
    /// callable twice invokes it twice per dispatch.
    pub fn add_listener(&self, event: GatewayEvent, callback: Listener) {
        self.listeners.write().entry(event).or_default().push(callback);
    }

    /// Returns how many listeners (built-in included) are registered for `event`.
    pub fn listener_count(&self, event: GatewayEvent) -> usize {
        self.listeners.read().get(&event).map_or(0, Vec::len)
    }

    /// Dispatches a raw gateway event: decode, mirror update, listeners.
    ///
    /// With no listeners registered for `event` this returns before any
    /// decode work. A decode failure is logged and dropped without invoking
    /// anyone. Listener failures are logged and isolated; this method never
    /// propagates them.
    pub async fn dispatch(&self, event: GatewayEvent, data: Option<&Value>) {
        let span = span!(Level::DEBUG, "dispatch", event = %event);
        self.dispatch_inner(event, data).instrument(span).await
    }

    async fn dispatch_inner(&self, event: GatewayEvent, data: Option<&Value>) {
        let callbacks: Vec<Listener> = self
            .listeners
            .read()
            .get(&event)
            .cloned()
            .unwrap_or_default();
        if callbacks.is_empty() {
            debug!("no listeners registered, skipping");
            return;
        }

        let payload = match data {
            None => EventPayload::None,
            Some(raw) => match self.decoders.get(&event) {
                Some(decode) => match decode(raw) {
                    Ok(payload) => payload,
                    Err(DecodeError::Malformed { kind, reason }) => {
                        warn!(kind, reason = %reason, "dropping malformed payload");
                        return;
                    }
                },
                None => {
                    warn!("no decoder registered, passing raw payload through");
                    EventPayload::Raw(raw.clone())
                }
            },
        };

        for callback in &callbacks {
            if let Err(error) = callback(payload.clone()).await {
                warn!(error = %error, "listener failed");
            }
        }
    }

    /// Returns a snapshot of the session owner, if `ready` has been seen.
    pub fn current_user(&self) -> Option<User> {
        self.state.read().current_user.clone()
    }

    /// Returns a snapshot of the known-users roster.
    pub fn known_users(&self) -> Vec<User> {
        self.state.read().known_users.clone()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("decoders", &self.decoders.len())
            .field("state", &*self.state.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user_json(id: i64, name: &str) -> Value {
        json!({"id": id, "name": name, "bot": false})
    }

    fn ready_json() -> Value {
        json!({
            "user": {"id": 1, "name": "A", "bot": false, "status": {"value": "online"}},
            "members": [
                {"id": 1, "name": "A", "bot": false, "status": {"value": "online"}},
                {"id": 2, "name": "B", "bot": false, "status": {"value": "away"}},
            ],
            "token": "t",
        })
    }

    fn counting_listener(counter: &Arc<AtomicUsize>) -> Listener {
        let counter = Arc::clone(counter);
        listener(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn ready_populates_mirror() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(GatewayEvent::Ready, Some(&ready_json())).await;

        assert_eq!(dispatcher.current_user().unwrap().id, 1);
        let mut ids: Vec<_> = dispatcher.known_users().iter().map(|u| u.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn join_dedupes_by_id() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(GatewayEvent::Ready, Some(&ready_json())).await;

        // Same id, different name: still the same logical user.
        dispatcher
            .dispatch(GatewayEvent::SysJoin, Some(&user_json(2, "renamed")))
            .await;
        assert_eq!(dispatcher.known_users().len(), 2);

        dispatcher
            .dispatch(GatewayEvent::SysJoin, Some(&user_json(3, "C")))
            .await;
        assert_eq!(dispatcher.known_users().len(), 3);
    }

    #[tokio::test]
    async fn leave_removes_by_id_and_ignores_unknown() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(GatewayEvent::Ready, Some(&ready_json())).await;

        dispatcher
            .dispatch(GatewayEvent::SysLeave, Some(&user_json(2, "B")))
            .await;
        assert_eq!(dispatcher.known_users().len(), 1);

        // Unknown id: no-op, not an error.
        dispatcher
            .dispatch(GatewayEvent::SysLeave, Some(&user_json(99, "ghost")))
            .await;
        assert_eq!(dispatcher.known_users().len(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_invokes_no_listener() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        dispatcher.add_listener(GatewayEvent::UsrMsg, counting_listener(&counter));

        // Missing required `user` field.
        dispatcher
            .dispatch(GatewayEvent::UsrMsg, Some(&json!({"id": 1, "channel": 2})))
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_listeners_means_no_decode_and_no_panic() {
        let dispatcher = Dispatcher::new();
        // usr-msg has no built-in listener; a payload this malformed would
        // log a decode failure if decoding were attempted.
        dispatcher
            .dispatch(GatewayEvent::UsrMsg, Some(&json!("not an object")))
            .await;
        dispatcher.dispatch(GatewayEvent::SysCommands, None).await;
    }

    #[tokio::test]
    async fn listeners_run_in_registration_order() {
        let dispatcher = Dispatcher::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            dispatcher.add_listener(
                GatewayEvent::UsrMsg,
                listener(move |payload| {
                    let order = Arc::clone(&order);
                    async move {
                        let id = payload.as_message().map(|m| m.id).unwrap_or_default();
                        order.lock().push((tag, id));
                        Ok(())
                    }
                }),
            );
        }

        for id in [10, 11] {
            dispatcher
                .dispatch(
                    GatewayEvent::UsrMsg,
                    Some(&json!({"id": id, "user": user_json(1, "A"), "channel": 1, "content": "x"})),
                )
                .await;
        }

        assert_eq!(
            *order.lock(),
            vec![("first", 10), ("second", 10), ("first", 11), ("second", 11)]
        );
    }

    #[tokio::test]
    async fn duplicate_registration_invokes_twice() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let callback = counting_listener(&counter);
        dispatcher.add_listener(GatewayEvent::UsrTyp, Arc::clone(&callback));
        dispatcher.add_listener(GatewayEvent::UsrTyp, callback);

        dispatcher
            .dispatch(GatewayEvent::UsrTyp, Some(&user_json(1, "A")))
            .await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn listener_failure_does_not_stop_later_listeners() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.add_listener(
            GatewayEvent::UsrTyp,
            listener(|_| async { anyhow::bail!("boom") }),
        );
        dispatcher.add_listener(GatewayEvent::UsrTyp, counting_listener(&counter));

        dispatcher
            .dispatch(GatewayEvent::UsrTyp, Some(&user_json(1, "A")))
            .await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecoded_events_pass_raw_payload_through() {
        let dispatcher = Dispatcher::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        dispatcher.add_listener(
            GatewayEvent::SysError,
            listener(move |payload| {
                let seen = Arc::clone(&seen_clone);
                async move {
                    *seen.lock() = payload.as_raw().cloned();
                    Ok(())
                }
            }),
        );

        let raw = json!({"code": 42, "message": "nope"});
        dispatcher.dispatch(GatewayEvent::SysError, Some(&raw)).await;
        assert_eq!(seen.lock().clone(), Some(raw));
    }

    #[tokio::test]
    async fn payloadless_dispatch_delivers_none() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        dispatcher.add_listener(
            GatewayEvent::Connect,
            listener(move |payload| {
                let counter = Arc::clone(&counter_clone);
                async move {
                    assert!(matches!(payload, EventPayload::None));
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        dispatcher.dispatch(GatewayEvent::Connect, None).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recorded_message_order_matches_dispatch_order() {
        let dispatcher = Dispatcher::new();
        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        dispatcher.add_listener(
            GatewayEvent::UsrMsg,
            listener(move |payload| {
                let received = Arc::clone(&received_clone);
                async move {
                    if let Some(message) = payload.as_message() {
                        received.lock().push(message.clone());
                    }
                    Ok(())
                }
            }),
        );

        for id in [1, 2] {
            dispatcher
                .dispatch(
                    GatewayEvent::UsrMsg,
                    Some(&json!({
                        "id": id,
                        "user": user_json(5, "E"),
                        "channel": 1,
                        "content": format!("m{id}"),
                    })),
                )
                .await;
        }

        let received = received.lock();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].id, 1);
        assert_eq!(received[1].id, 2);
    }
}
