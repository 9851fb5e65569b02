//! Per-connection assembly session.
//!
//! ARCHITECTURE
//! ============
//! Each bridge socket owns one `AssemblySession`. The connection loop hands
//! it raw inbound text and sends back whatever frames it returns; the
//! session never touches the socket itself.
//!
//! Chunked records are reported as a stream: the first chunk (or announce)
//! for a key opens a stream, every accepted chunk yields an `item` frame
//! with progress, and completion yields a `done` frame with the assembled
//! character. All frames of one stream share a `parent_id`.
//!
//! STALLS
//! ======
//! The reassembler has no clock. The session records the last activity per
//! key and `sweep_stalled` abandons keys idle longer than the stall timeout,
//! ending their stream with an `E_ASSEMBLY_STALLED` error frame.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BridgeConfig;
use crate::frame::{Data, ErrorCode, Frame, gateway_error};
use crate::message::{self, AnnounceMessage, CharacterDetails, CharacterList, ChunkMessage, Inbound};
use crate::reassembly::{AssemblyOutcome, ChunkError, Reassembler};

pub const ACTION_CHUNK_STREAM: &str = "assembly:chunk";
pub const ACTION_CHARACTER_LIST: &str = "character:list";
pub const ACTION_CHARACTER_DETAILS: &str = "character:details";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("assembly for '{key}' stalled at {received}/{total} after {idle_secs}s idle")]
    Stalled { key: String, received: usize, total: usize, idle_secs: u64 },
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "E_UNKNOWN_ACTION",
            Self::Stalled { .. } => "E_ASSEMBLY_STALLED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Stalled { .. })
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Open stream for one key: the frame every reply correlates to.
struct Stream {
    envelope: Frame,
    last_activity: Instant,
}

pub struct AssemblySession {
    session_id: Uuid,
    reassembler: Reassembler,
    streams: HashMap<String, Stream>,
    stall_timeout: Duration,
}

impl AssemblySession {
    #[must_use]
    pub fn new(session_id: Uuid, config: &BridgeConfig) -> Self {
        Self {
            session_id,
            reassembler: Reassembler::new(config.max_total_chunks),
            streams: HashMap::new(),
            stall_timeout: config.stall_timeout,
        }
    }

    /// Number of keys still accumulating.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.reassembler.len()
    }

    /// Decode and apply one inbound message. Returns frames for the client.
    /// Invalid input yields a single error frame and leaves state untouched.
    pub fn ingest(&mut self, text: &str, now: Instant) -> Vec<Frame> {
        let inbound = match message::decode(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "assembly: rejected inbound message");
                return vec![gateway_error(&e).with_session_id(self.session_id)];
            }
        };

        debug!(session_id = %self.session_id, action = inbound.action(), "assembly: inbound");
        match inbound {
            Inbound::Chunk(chunk) => vec![self.apply_chunk(chunk, now)],
            Inbound::Announce(announce) => vec![self.apply_announce(announce, now)],
            Inbound::CharacterList(list) => vec![self.character_list(list)],
            Inbound::CharacterDetails(details) => vec![self.character_details(details)],
            Inbound::Unknown { action } => {
                let err = SessionError::UnknownAction(action);
                warn!(session_id = %self.session_id, error = %err, "assembly: ignoring message");
                vec![gateway_error(&err).with_session_id(self.session_id)]
            }
        }
    }

    /// Abandon every assembly idle for at least the stall timeout. Returns
    /// one terminal error frame per abandoned key.
    pub fn sweep_stalled(&mut self, now: Instant) -> Vec<Frame> {
        let stalled: Vec<(String, Duration)> = self
            .reassembler
            .pending_keys()
            .filter_map(|key| {
                let idle = self
                    .streams
                    .get(key)
                    .map_or(self.stall_timeout, |s| now.saturating_duration_since(s.last_activity));
                (idle >= self.stall_timeout).then(|| (key.to_owned(), idle))
            })
            .collect();

        let mut frames = Vec::with_capacity(stalled.len());
        for (key, idle) in stalled {
            let (received, total) = self.reassembler.progress(&key).unwrap_or_default();
            self.reassembler.abandon(&key);
            let envelope = self.close_stream(&key);
            let err = SessionError::Stalled { key, received, total, idle_secs: idle.as_secs() };
            warn!(session_id = %self.session_id, error = %err, "assembly: abandoning stalled record");
            frames.push(envelope.error_from(&err));
        }
        frames
    }

    /// Drop the in-flight assembly for `key`, if any.
    pub fn abandon(&mut self, key: &str) -> bool {
        self.streams.remove(key);
        self.reassembler.abandon(key)
    }

    /// Drop everything. Called when the connection closes.
    pub fn teardown(&mut self) -> usize {
        self.streams.clear();
        let dropped = self.reassembler.clear();
        if dropped > 0 {
            info!(session_id = %self.session_id, dropped, "assembly: dropped incomplete records on teardown");
        }
        dropped
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    fn apply_chunk(&mut self, chunk: ChunkMessage, now: Instant) -> Frame {
        let ChunkMessage { key, chunk_index, total_chunks, fragment, side } = chunk;
        let result = self
            .reassembler
            .begin_or_continue(&key, chunk_index, total_chunks, fragment, side);

        match result {
            Ok(AssemblyOutcome::InProgress { received, total }) => {
                let envelope = self.touch_stream(&key, now);
                envelope.item(progress_data(&key, received, total))
            }
            Ok(AssemblyOutcome::Complete { payload, side }) => {
                let envelope = self.close_stream(&key);
                info!(session_id = %self.session_id, %key, bytes = payload.len(), "assembly: record complete");
                let greeting = side.as_ref().and_then(greeting_from_side);
                let mut data = character_data(&key, &payload, greeting);
                data.insert("side".into(), side.unwrap_or(Value::Null));
                envelope.done_with(data)
            }
            Err(e @ ChunkError::MissingFragment { .. }) => {
                // The reassembler already dropped the assembly; end its stream too.
                warn!(session_id = %self.session_id, %key, error = %e, "assembly: record completed with a gap");
                self.close_stream(&key).error_from(&e)
            }
            Err(e) => {
                warn!(session_id = %self.session_id, %key, chunk_index, error = %e, "assembly: dropped chunk");
                gateway_error(&e)
                    .with_session_id(self.session_id)
                    .with_data("key", key)
            }
        }
    }

    fn apply_announce(&mut self, announce: AnnounceMessage, now: Instant) -> Frame {
        let AnnounceMessage { key, total_chunks } = announce;
        match self.reassembler.announce(&key, total_chunks) {
            Ok(()) => {
                let (received, total) = self.reassembler.progress(&key).unwrap_or((0, total_chunks));
                let envelope = self.touch_stream(&key, now);
                envelope.item(progress_data(&key, received, total))
            }
            Err(e) => {
                warn!(session_id = %self.session_id, %key, error = %e, "assembly: rejected announce");
                gateway_error(&e)
                    .with_session_id(self.session_id)
                    .with_data("key", key)
            }
        }
    }

    fn character_list(&self, list: CharacterList) -> Frame {
        let names: Vec<Value> = list
            .character_names
            .into_iter()
            .map(|c| json!({ "name": c.name }))
            .collect();
        let mut data = Data::new();
        data.insert("character_names".into(), Value::Array(names));
        self.envelope(ACTION_CHARACTER_LIST).done_with(data)
    }

    fn character_details(&self, details: CharacterDetails) -> Frame {
        let data = character_data(&details.name, &details.description, details.greeting.as_deref());
        self.envelope(ACTION_CHARACTER_DETAILS).done_with(data)
    }

    // -------------------------------------------------------------------------
    // Streams
    // -------------------------------------------------------------------------

    fn envelope(&self, action: &str) -> Frame {
        Frame::request(action, Data::new()).with_session_id(self.session_id)
    }

    /// Open the stream for `key` if needed and record activity.
    fn touch_stream(&mut self, key: &str, now: Instant) -> &Frame {
        let session_id = self.session_id;
        let stream = self.streams.entry(key.to_owned()).or_insert_with(|| Stream {
            envelope: Frame::request(ACTION_CHUNK_STREAM, Data::new()).with_session_id(session_id),
            last_activity: now,
        });
        stream.last_activity = now;
        &stream.envelope
    }

    /// Remove the stream for `key`, returning its envelope. A record that
    /// completes on its first chunk never had a stream, so one is minted.
    fn close_stream(&mut self, key: &str) -> Frame {
        match self.streams.remove(key) {
            Some(stream) => stream.envelope,
            None => self.envelope(ACTION_CHUNK_STREAM),
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn progress_data(key: &str, received: usize, total: usize) -> Data {
    let mut data = Data::new();
    data.insert("key".into(), json!(key));
    data.insert("received".into(), json!(received));
    data.insert("total".into(), json!(total));
    data
}

fn character_data(name: &str, description: &str, greeting: Option<&str>) -> Data {
    let mut data = Data::new();
    data.insert("name".into(), json!(name));
    data.insert("description".into(), json!(description));
    data.insert("greeting".into(), json!(greeting));
    data
}

/// The side payload is either the greeting itself or an object carrying it.
fn greeting_from_side(side: &Value) -> Option<&str> {
    match side {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("greeting").and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
#[path = "assembly_test.rs"]
mod tests;
