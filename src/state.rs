//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the HTTP-side stores shared across requests. Assembly state is
//! deliberately absent: each bridge socket owns its own `AssemblySession`,
//! so chunk buffers never outlive or leak across connections.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::BridgeConfig;
use crate::services::blob::BlobStore;
use crate::services::character::CharacterStore;
use crate::services::character_cache::CharacterCache;
use crate::services::init_data::InitDataStore;
use crate::services::settings::SettingsStore;

/// Clone is required by Axum; all inner stores are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: BridgeConfig,
    pub settings: Arc<RwLock<SettingsStore>>,
    pub characters: Arc<RwLock<CharacterStore>>,
    pub character_cache: Arc<RwLock<CharacterCache>>,
    pub init_data: Arc<RwLock<InitDataStore>>,
    pub blobs: Arc<RwLock<BlobStore>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            settings: Arc::new(RwLock::new(SettingsStore::new())),
            characters: Arc::new(RwLock::new(CharacterStore::new())),
            character_cache: Arc::new(RwLock::new(CharacterCache::new())),
            init_data: Arc::new(RwLock::new(InitDataStore::new(config.init_data_ttl_secs))),
            blobs: Arc::new(RwLock::new(BlobStore::new())),
        }
    }
}

/// Current time as whole seconds since Unix epoch.
#[must_use]
pub fn now_secs() -> i64 {
    crate::frame::now_ms() / 1000
}

// =============================================================================
// TEST HELPERS
// =============================================================================
