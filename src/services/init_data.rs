//! Short-lived init-data sessions.
//!
//! The bot posts the initial editor state (current character, settings,
//! character list) before opening the mini app, receives a session id, and
//! passes that id in the launch parameter. The mini app then fetches the
//! state by id. Sessions expire after the configured TTL; expired entries
//! are purged on every create and on any read that finds them stale.

use std::collections::HashMap;

use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InitDataError {
    #[error("session not found")]
    NotFound,
    #[error("session expired")]
    Expired,
}

#[derive(Debug)]
struct InitSession {
    data: Value,
    expires_at: i64,
}

#[derive(Debug)]
pub struct InitDataStore {
    sessions: HashMap<Uuid, InitSession>,
    ttl_secs: i64,
}

impl InitDataStore {
    #[must_use]
    pub fn new(ttl_secs: i64) -> Self {
        Self { sessions: HashMap::new(), ttl_secs }
    }

    /// Store `data` and return its session id. Object bodies are stamped with
    /// `created_at` / `expires_at`; other values are wrapped under `data`.
    pub fn create(&mut self, data: Value, now_secs: i64) -> Uuid {
        self.cleanup(now_secs);

        let expires_at = now_secs.saturating_add(self.ttl_secs);
        let mut data = if data.is_object() { data } else { json!({ "data": data }) };
        if let Some(obj) = data.as_object_mut() {
            obj.insert("created_at".into(), json!(now_secs));
            obj.insert("expires_at".into(), json!(expires_at));
        }

        let id = Uuid::new_v4();
        self.sessions.insert(id, InitSession { data, expires_at });
        id
    }

    /// Fetch a session's data. An expired session is removed.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Expired` once past `expires_at`.
    pub fn get(&mut self, id: Uuid, now_secs: i64) -> Result<Value, InitDataError> {
        let Some(session) = self.sessions.get(&id) else {
            return Err(InitDataError::NotFound);
        };
        if now_secs > session.expires_at {
            self.sessions.remove(&id);
            return Err(InitDataError::Expired);
        }
        Ok(session.data.clone())
    }

    /// Drop every expired session. Returns how many were dropped.
    pub fn cleanup(&mut self, now_secs: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now_secs <= s.expires_at);
        before - self.sessions.len()
    }
}

#[cfg(test)]
#[path = "init_data_test.rs"]
mod tests;
