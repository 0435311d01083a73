//! Typed representations of the gateway wire payloads.
//!
//! Wire keys are camelCase (protocol v1); snake_case spellings seen in
//! earlier gateway revisions are accepted on decode via serde aliases but
//! are never produced on encode. Optional fields decode to `None` when the
//! key is absent and fail decode when present but malformed. Models are
//! value records: constructed once per decoded payload and replaced, never
//! mutated in place.

mod channel;
mod embed;
mod message;
mod user;

pub use channel::{Channel, MemberEvent, ReadyPayload};
pub use embed::{Embed, EmbedAuthor};
pub use message::{Mention, Message};
pub use user::{Status, User, UserStatus};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};

/// Decodes a raw JSON value into `T`, tagging failures with the model name.
pub(crate) fn decode_value<T: DeserializeOwned>(kind: &'static str, raw: &Value) -> DecodeResult<T> {
    serde_json::from_value(raw.clone()).map_err(|e| DecodeError::malformed(kind, e.to_string()))
}
