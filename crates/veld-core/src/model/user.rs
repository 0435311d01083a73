//! User identity and presence models.

use std::hash::{Hash, Hasher};

use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeResult;

/// Presence state of a user.
///
/// Decodes case-insensitively from the wire string and fails on anything
/// outside the known set — no silent default. Serializes lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Online,
    Offline,
    Dnd,
    Away,
}

impl Status {
    const VARIANTS: &'static [&'static str] = &["online", "offline", "dnd", "away"];

    /// Returns the canonical lowercase wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Online => "online",
            Status::Offline => "offline",
            Status::Dnd => "dnd",
            Status::Away => "away",
        }
    }

    /// Parses a wire string, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "online" => Some(Status::Online),
            "offline" => Some(Status::Offline),
            "dnd" => Some(Status::Dnd),
            "away" => Some(Status::Away),
            _ => None,
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Status::parse(&raw).ok_or_else(|| D::Error::unknown_variant(&raw, Self::VARIANTS))
    }
}

/// A user's presence value plus optional free-text status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    /// Presence state.
    pub value: Status,
    /// Free-text status line, if set.
    #[serde(default, alias = "status_text", skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
}

/// A gateway user.
///
/// Identity is the numeric `id` alone: equality and hashing ignore every
/// other field, so a roster update with changed name or presence still
/// matches the existing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Immutable primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether this account is a bot.
    pub bot: bool,
    /// Avatar image URL, if set.
    #[serde(default, alias = "avatar_url", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Presence, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl User {
    /// Decodes a user from its raw wire representation.
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        super::decode_value("User", raw)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
