//! Inbound message decoding.
//!
//! DESIGN
//! ======
//! Every text message from the bot passes through `decode` exactly once.
//! The `action` field is the tag; known actions are deserialized into typed
//! bodies, anything else becomes `Inbound::Unknown` so the caller can log it
//! and move on. Nothing downstream touches raw JSON.
//!
//! Field names drifted between bot releases (`index` vs `chunk_index`,
//! `name` vs `key`, ...), so the chunk body accepts the older spellings as
//! aliases.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::frame::ErrorCode;

pub const ACTION_CHUNK: &str = "chunk";
pub const ACTION_ANNOUNCE: &str = "announce";
pub const ACTION_CHARACTER_LIST: &str = "character_list_response";
pub const ACTION_CHARACTER_DETAILS: &str = "character_details_response";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("invalid '{action}' body: {reason}")]
    InvalidBody { action: String, reason: String },
}

impl ErrorCode for DecodeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "E_MALFORMED_MESSAGE",
            Self::InvalidBody { .. } => "E_INVALID_MESSAGE_BODY",
        }
    }
}

// =============================================================================
// BODIES
// =============================================================================

/// One indexed fragment of a larger record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkMessage {
    #[serde(alias = "name")]
    pub key: String,
    #[serde(alias = "index", alias = "part")]
    pub chunk_index: usize,
    #[serde(alias = "total", alias = "total_parts")]
    pub total_chunks: usize,
    #[serde(alias = "description")]
    pub fragment: String,
    #[serde(alias = "greeting", default)]
    pub side: Option<Value>,
}

/// Announces how many chunks are coming for `key`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnounceMessage {
    #[serde(alias = "name")]
    pub key: String,
    #[serde(alias = "total", alias = "total_parts")]
    pub total_chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CharacterName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CharacterList {
    #[serde(default)]
    pub character_names: Vec<CharacterName>,
}

/// Unchunked character record, sent when it fits in one message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CharacterDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub greeting: Option<String>,
}

/// `{ "action": ..., "data": { ... } }` wrapper used by the response actions.
#[derive(Deserialize)]
struct Wrapped<T> {
    data: T,
}

// =============================================================================
// DECODE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Chunk(ChunkMessage),
    Announce(AnnounceMessage),
    CharacterList(CharacterList),
    CharacterDetails(CharacterDetails),
    Unknown { action: String },
}

impl Inbound {
    /// Tag this message was decoded from.
    #[must_use]
    pub fn action(&self) -> &str {
        match self {
            Self::Chunk(_) => ACTION_CHUNK,
            Self::Announce(_) => ACTION_ANNOUNCE,
            Self::CharacterList(_) => ACTION_CHARACTER_LIST,
            Self::CharacterDetails(_) => ACTION_CHARACTER_DETAILS,
            Self::Unknown { action } => action,
        }
    }
}

/// Decode one raw inbound text message.
///
/// # Errors
///
/// `Malformed` when the text is not a JSON object with a string `action`;
/// `InvalidBody` when a known action carries fields of the wrong shape.
pub fn decode(text: &str) -> Result<Inbound, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let Some(action) = value.get("action").and_then(Value::as_str) else {
        return Err(DecodeError::Malformed("missing string field 'action'".into()));
    };
    let action = action.to_owned();

    match action.as_str() {
        ACTION_CHUNK => body(&action, value).map(Inbound::Chunk),
        ACTION_ANNOUNCE => body(&action, value).map(Inbound::Announce),
        ACTION_CHARACTER_LIST => body::<Wrapped<CharacterList>>(&action, value).map(|w| Inbound::CharacterList(w.data)),
        ACTION_CHARACTER_DETAILS => {
            body::<Wrapped<CharacterDetails>>(&action, value).map(|w| Inbound::CharacterDetails(w.data))
        }
        _ => Ok(Inbound::Unknown { action }),
    }
}

fn body<T: DeserializeOwned>(action: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value)
        .map_err(|e| DecodeError::InvalidBody { action: action.to_owned(), reason: e.to_string() })
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
