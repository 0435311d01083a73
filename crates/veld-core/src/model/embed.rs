//! Rich-embed display metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeResult;

/// Embed author line. Only `value` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedAuthor {
    /// Author display text.
    pub value: String,
    /// Author icon URL, if set.
    #[serde(default, alias = "icon_url", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Optional display metadata attached to a message.
///
/// Every field is optional; absent fields round-trip as absent wire keys,
/// not as empty strings or nulls. This is the one inbound model that is
/// also encoded outbound (REST message sending).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, alias = "image_url", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, alias = "thumbnail_url", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Embed {
    /// Decodes an embed from its raw wire representation.
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        super::decode_value("Embed", raw)
    }

    /// Serializes the embed to its wire representation.
    pub fn encode(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
