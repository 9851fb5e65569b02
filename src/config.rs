//! Bridge configuration parsed from environment variables.
//!
//! Every knob has a default; malformed values fall back to the default
//! rather than aborting startup.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_INIT_DATA_TTL_SECS: i64 = 3600;
pub const MAX_INIT_DATA_TTL_SECS: i64 = 30 * 24 * 3600;
pub const DEFAULT_MAX_TOTAL_CHUNKS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    pub port: u16,
    /// Idle time after which an incomplete assembly is abandoned.
    pub stall_timeout: Duration,
    /// How often each connection checks for stalled assemblies.
    pub sweep_interval: Duration,
    /// Lifetime of an init-data session, in seconds.
    pub init_data_ttl_secs: i64,
    /// Largest `total_chunks` a single record may announce.
    pub max_total_chunks: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            stall_timeout: Duration::from_secs(DEFAULT_STALL_TIMEOUT_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            init_data_ttl_secs: DEFAULT_INIT_DATA_TTL_SECS,
            max_total_chunks: DEFAULT_MAX_TOTAL_CHUNKS,
        }
    }
}

impl BridgeConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `ASSEMBLY_STALL_TIMEOUT_SECS`: default 30
    /// - `ASSEMBLY_SWEEP_INTERVAL_SECS`: default 5 (minimum 1)
    /// - `INIT_DATA_TTL_SECS`: default 3600 (clamped to 1..=30 days)
    /// - `MAX_TOTAL_CHUNKS`: default 1024 (minimum 1)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or(lookup("PORT"), DEFAULT_PORT),
            stall_timeout: Duration::from_secs(parse_or(lookup("ASSEMBLY_STALL_TIMEOUT_SECS"), DEFAULT_STALL_TIMEOUT_SECS)),
            sweep_interval: Duration::from_secs(
                parse_or(lookup("ASSEMBLY_SWEEP_INTERVAL_SECS"), DEFAULT_SWEEP_INTERVAL_SECS).max(1),
            ),
            init_data_ttl_secs: parse_or(lookup("INIT_DATA_TTL_SECS"), DEFAULT_INIT_DATA_TTL_SECS)
                .clamp(1, MAX_INIT_DATA_TTL_SECS),
            max_total_chunks: parse_or(lookup("MAX_TOTAL_CHUNKS"), DEFAULT_MAX_TOTAL_CHUNKS).max(1),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
