//! Mini app bridge: reassembles chunked character records sent by the chat
//! bot and serves the settings/character editor's REST API.

pub mod config;
pub mod frame;
pub mod message;
pub mod reassembly;
pub mod routes;
pub mod services;
pub mod state;
