//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the bridge's state machines and stores so route
//! handlers stay focused on protocol translation. Nothing here knows about
//! axum or sockets.

pub mod assembly;
pub mod blob;
pub mod character;
pub mod character_cache;
pub mod init_data;
pub mod settings;
