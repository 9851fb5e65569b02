//! Chunk reassembly for payloads the bot splits across several messages.
//!
//! DESIGN
//! ======
//! The bot cannot push a long character description in one message, so it
//! sends `total_chunks` indexed fragments keyed by the record name. The
//! reassembler buffers fragments per key and emits the concatenation (in
//! index order, not arrival order) once every index has been seen.
//!
//! Per key: `Absent -> Accumulating -> Complete`. Completion removes the
//! entry, so a late chunk for the same key starts a fresh assembly.
//!
//! Duplicate indices overwrite the stored fragment (last write wins) but are
//! only counted once. Invalid chunks are rejected before any state is
//! touched, so one bad message never disturbs another key's assembly.
//!
//! The reassembler has no clock. Stall detection lives in the owning
//! session, which calls `abandon` for keys it gives up on.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::frame::ErrorCode;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("invalid chunk for '{key}': {reason}")]
    InvalidChunk { key: String, reason: String },
    #[error("inconsistent chunk metadata for '{key}': expected {expected} chunks, got {got}")]
    InconsistentMetadata { key: String, expected: usize, got: usize },
    #[error("assembly for '{key}' completed with chunk {index} missing")]
    MissingFragment { key: String, index: usize },
}

impl ErrorCode for ChunkError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidChunk { .. } => "E_INVALID_CHUNK",
            Self::InconsistentMetadata { .. } => "E_INCONSISTENT_CHUNK_METADATA",
            Self::MissingFragment { .. } => "E_MISSING_FRAGMENT",
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// Result of feeding one chunk into the reassembler.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyOutcome {
    InProgress { received: usize, total: usize },
    Complete { payload: String, side: Option<serde_json::Value> },
}

/// One in-flight record.
#[derive(Debug)]
struct PendingAssembly {
    parts: Vec<Option<String>>,
    received: usize,
    /// Side-channel data (e.g. the greeting) carried by any one chunk.
    side: Option<serde_json::Value>,
}

impl PendingAssembly {
    fn new(total: usize) -> Self {
        Self { parts: vec![None; total], received: 0, side: None }
    }

    fn total(&self) -> usize {
        self.parts.len()
    }

    fn is_complete(&self) -> bool {
        self.received == self.parts.len()
    }
}

// =============================================================================
// REASSEMBLER
// =============================================================================

#[derive(Debug)]
pub struct Reassembler {
    pending: HashMap<String, PendingAssembly>,
    max_total: usize,
}

impl Reassembler {
    /// Create a reassembler that rejects announcements above `max_total` chunks.
    #[must_use]
    pub fn new(max_total: usize) -> Self {
        Self { pending: HashMap::new(), max_total }
    }

    /// Feed one chunk. Creates the assembly on first sight of `key`.
    ///
    /// # Errors
    ///
    /// `InvalidChunk` for an empty key, a zero or oversized total, or an
    /// index outside `0..total`. `InconsistentMetadata` when `total`
    /// disagrees with the open assembly for `key`. Neither mutates state.
    pub fn begin_or_continue(
        &mut self,
        key: &str,
        chunk_index: usize,
        total_chunks: usize,
        fragment: impl Into<String>,
        side: Option<serde_json::Value>,
    ) -> Result<AssemblyOutcome, ChunkError> {
        self.validate(key, total_chunks)?;
        if chunk_index >= total_chunks {
            return Err(ChunkError::InvalidChunk {
                key: key.to_owned(),
                reason: format!("chunk index {chunk_index} out of range 0..{total_chunks}"),
            });
        }

        let mut entry = match self.pending.entry(key.to_owned()) {
            Entry::Occupied(occupied) => occupied,
            Entry::Vacant(vacant) => vacant.insert_entry(PendingAssembly::new(total_chunks)),
        };
        let assembly = entry.get_mut();

        let slot = &mut assembly.parts[chunk_index];
        if slot.is_none() {
            assembly.received += 1;
        } else {
            debug!(%key, chunk_index, "reassembly: duplicate chunk overwrites stored fragment");
        }
        *slot = Some(fragment.into());

        if let Some(value) = side.filter(|v| !v.is_null()) {
            assembly.side = Some(value);
        }

        if !assembly.is_complete() {
            return Ok(AssemblyOutcome::InProgress { received: assembly.received, total: assembly.total() });
        }

        let done = entry.remove();
        let mut payload = String::new();
        for (index, part) in done.parts.into_iter().enumerate() {
            let Some(part) = part else {
                return Err(ChunkError::MissingFragment { key: key.to_owned(), index });
            };
            payload.push_str(&part);
        }
        Ok(AssemblyOutcome::Complete { payload, side: done.side })
    }

    /// Open an empty assembly ahead of its chunks. Re-announcing with the
    /// same total is a no-op.
    ///
    /// # Errors
    ///
    /// Same validation as `begin_or_continue`, minus the index check.
    pub fn announce(&mut self, key: &str, total_chunks: usize) -> Result<(), ChunkError> {
        self.validate(key, total_chunks)?;
        self.pending
            .entry(key.to_owned())
            .or_insert_with(|| PendingAssembly::new(total_chunks));
        Ok(())
    }

    /// Drop the in-flight assembly for `key`. Returns whether one existed.
    pub fn abandon(&mut self, key: &str) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Drop every in-flight assembly. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// `(received, total)` for an open assembly.
    #[must_use]
    pub fn progress(&self, key: &str) -> Option<(usize, usize)> {
        self.pending.get(key).map(|a| (a.received, a.total()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_keys(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    fn validate(&self, key: &str, total_chunks: usize) -> Result<(), ChunkError> {
        if key.is_empty() {
            return Err(ChunkError::InvalidChunk { key: String::new(), reason: "empty key".into() });
        }
        if total_chunks == 0 || total_chunks > self.max_total {
            return Err(ChunkError::InvalidChunk {
                key: key.to_owned(),
                reason: format!("total chunks {total_chunks} outside 1..={}", self.max_total),
            });
        }
        if let Some(open) = self.pending.get(key) {
            if open.total() != total_chunks {
                return Err(ChunkError::InconsistentMetadata {
                    key: key.to_owned(),
                    expected: open.total(),
                    got: total_chunks,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "reassembly_test.rs"]
mod tests;
