//! Channel, session-ready and membership models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeResult;
use crate::model::User;

/// A chat channel and its current membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Channel id.
    pub id: i64,
    /// Channel name.
    pub name: String,
    /// Current members, in wire order.
    #[serde(default)]
    pub members: Vec<User>,
}

impl Channel {
    /// Decodes a channel from its raw wire representation.
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        super::decode_value("Channel", raw)
    }
}

/// Payload of the `ready` event: the session owner, the initial roster and
/// the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    /// The user who owns this session.
    pub user: User,
    /// Initial roster. Earlier gateway revisions named this `users`.
    #[serde(default, alias = "users")]
    pub members: Vec<User>,
    /// Session token for the REST surface.
    pub token: String,
}

impl ReadyPayload {
    /// Decodes a ready payload from its raw wire representation.
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        super::decode_value("ReadyPayload", raw)
    }
}

/// Channel-scoped join/leave notification of newer gateway revisions.
///
/// The live catalog still decodes `sys-join`/`sys-leave` to a bare [`User`];
/// this pairing is used by channel-aware surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEvent {
    /// The channel the membership change applies to.
    pub channel: Channel,
    /// The user who joined or left.
    pub user: User,
}

impl MemberEvent {
    /// Decodes a member event from its raw wire representation.
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        super::decode_value("MemberEvent", raw)
    }
}
