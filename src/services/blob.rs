//! Opaque JSON blobs handed between the bot and the mini app by id.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: HashMap<Uuid, Value>,
}

impl BlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, value: Value) -> Uuid {
        let id = Uuid::new_v4();
        self.blobs.insert(id, value);
        id
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Value> {
        self.blobs.get(&id).cloned()
    }
}
