//! Raw character data the bot pushes ahead of opening the editor.
//!
//! The bot owns the real character files and cannot be queried from the
//! mini app, so it posts a snapshot keyed by name and the editor reads it
//! back. Stored as-is; validation belongs to the catalogue on save.

use std::collections::HashMap;

use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Character name not provided")]
    MissingName,
    #[error("Character '{0}' data not found")]
    NotFound(String),
}

#[derive(Debug, Default)]
pub struct CharacterCache {
    by_name: HashMap<String, Value>,
}

impl CharacterCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under its `name` field, replacing any earlier snapshot.
    ///
    /// # Errors
    ///
    /// `MissingName` when `data` has no non-empty string `name`.
    pub fn put(&mut self, data: Value) -> Result<String, CacheError> {
        let name = data
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(CacheError::MissingName)?
            .to_owned();
        self.by_name.insert(name.clone(), data);
        Ok(name)
    }

    /// # Errors
    ///
    /// `MissingName` for a blank name, `NotFound` when nothing was stored.
    pub fn get(&self, name: &str) -> Result<Value, CacheError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CacheError::MissingName);
        }
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(name.to_owned()))
    }
}
