//! Chat message model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeResult;
use crate::model::{Embed, User};

/// A mention entry inside a message.
///
/// Older gateway revisions sent bare user ids, newer ones embed the full
/// user record; both decode. Untagged: numbers become `Id`, objects `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mention {
    /// Bare user id.
    Id(i64),
    /// Embedded user record.
    User(User),
}

impl Mention {
    /// Returns the mentioned user's id regardless of schema revision.
    pub fn user_id(&self) -> i64 {
        match self {
            Mention::Id(id) => *id,
            Mention::User(user) => user.id,
        }
    }
}

/// A message pushed over the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message id.
    pub id: i64,
    /// The author.
    pub user: User,
    /// Id of the channel the message was posted to.
    #[serde(alias = "channelId", alias = "channel_id")]
    pub channel: i64,
    /// Mentioned users, in wire order.
    #[serde(default)]
    pub mentions: Vec<Mention>,
    /// Plain-text body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Rich embed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl Message {
    /// Decodes a message from its raw wire representation.
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        super::decode_value("Message", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author() -> Value {
        json!({"id": 1, "name": "A", "bot": false})
    }

    #[test]
    fn decodes_plain_message() {
        let message = Message::decode(&json!({
            "id": 10,
            "user": author(),
            "channel": 3,
            "content": "hi",
        }))
        .unwrap();

        assert_eq!(message.id, 10);
        assert_eq!(message.user.id, 1);
        assert_eq!(message.channel, 3);
        assert_eq!(message.content.as_deref(), Some("hi"));
        assert!(message.mentions.is_empty());
        assert!(message.embed.is_none());
    }

    #[test]
    fn missing_user_fails_decode() {
        assert!(Message::decode(&json!({"id": 10, "channel": 3, "content": "hi"})).is_err());
    }

    #[test]
    fn mentions_decode_ids_and_users() {
        let message = Message::decode(&json!({
            "id": 10,
            "user": author(),
            "channel": 3,
            "content": "yo",
            "mentions": [42, {"id": 7, "name": "B", "bot": true}],
        }))
        .unwrap();

        assert_eq!(
            message.mentions.iter().map(Mention::user_id).collect::<Vec<_>>(),
            vec![42, 7]
        );
    }

    #[test]
    fn channel_id_alias_is_accepted() {
        let message = Message::decode(&json!({
            "id": 10,
            "user": author(),
            "channelId": 9,
            "content": "hi",
        }))
        .unwrap();
        assert_eq!(message.channel, 9);
    }

    #[test]
    fn embedded_message_decodes_recursively() {
        let message = Message::decode(&json!({
            "id": 11,
            "user": author(),
            "channel": 3,
            "embed": {"title": "t"},
        }))
        .unwrap();
        assert_eq!(message.embed.unwrap().title.as_deref(), Some("t"));
        assert!(message.content.is_none());
    }
}
