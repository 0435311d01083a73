//! The gateway event catalog.
//!
//! The set of events the gateway pushes over the persistent connection is
//! closed: every inbound frame names exactly one [`GatewayEvent`] or is
//! dropped with a warning at the sink. There is no runtime registration of
//! new event kinds.

use std::fmt;

/// Wire name of the outbound login handshake.
///
/// Login is emitted by the client once the synthetic `connect` event fires;
/// it is never received, so it is not part of the catalog.
pub const LOGIN_WIRE_NAME: &str = "login";

/// A gateway event kind, including the synthetic local `connect` event
/// raised when the persistent connection is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEvent {
    /// Transport-level connection established (no wire payload).
    Connect,
    /// A user message was posted.
    UsrMsg,
    /// A user joined the channel.
    SysJoin,
    /// A user left the channel.
    SysLeave,
    /// The gateway reported an error condition.
    SysError,
    /// A user started typing.
    UsrTyp,
    /// Session accepted: carries the session user, roster and token.
    Ready,
    /// The gateway published its command list.
    SysCommands,
}

impl GatewayEvent {
    /// Every catalog entry, in wire-protocol declaration order.
    pub const ALL: [GatewayEvent; 8] = [
        GatewayEvent::Connect,
        GatewayEvent::UsrMsg,
        GatewayEvent::SysJoin,
        GatewayEvent::SysLeave,
        GatewayEvent::SysError,
        GatewayEvent::UsrTyp,
        GatewayEvent::Ready,
        GatewayEvent::SysCommands,
    ];

    /// Returns the wire-string identifier for this event.
    pub fn wire_name(self) -> &'static str {
        match self {
            GatewayEvent::Connect => "connect",
            GatewayEvent::UsrMsg => "usr-msg",
            GatewayEvent::SysJoin => "sys-join",
            GatewayEvent::SysLeave => "sys-leave",
            GatewayEvent::SysError => "sys-error",
            GatewayEvent::UsrTyp => "usr-typ",
            GatewayEvent::Ready => "ready",
            GatewayEvent::SysCommands => "sys-commands",
        }
    }

    /// Looks up a catalog entry by its wire-string identifier.
    ///
    /// Returns `None` for anything outside the closed set; there are no
    /// partial matches.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "connect" => Some(GatewayEvent::Connect),
            "usr-msg" => Some(GatewayEvent::UsrMsg),
            "sys-join" => Some(GatewayEvent::SysJoin),
            "sys-leave" => Some(GatewayEvent::SysLeave),
            "sys-error" => Some(GatewayEvent::SysError),
            "usr-typ" => Some(GatewayEvent::UsrTyp),
            "ready" => Some(GatewayEvent::Ready),
            "sys-commands" => Some(GatewayEvent::SysCommands),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for event in GatewayEvent::ALL {
            assert_eq!(GatewayEvent::from_wire_name(event.wire_name()), Some(event));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(GatewayEvent::from_wire_name("usr"), None);
        assert_eq!(GatewayEvent::from_wire_name("usr-msg-v2"), None);
        assert_eq!(GatewayEvent::from_wire_name(""), None);
    }

    #[test]
    fn catalog_entries_are_distinct() {
        let mut names: Vec<_> = GatewayEvent::ALL.iter().map(|e| e.wire_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GatewayEvent::ALL.len());
    }

    #[test]
    fn display_prints_wire_name() {
        assert_eq!(GatewayEvent::UsrMsg.to_string(), "usr-msg");
    }
}
