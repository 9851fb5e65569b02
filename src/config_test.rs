use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> BridgeConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    BridgeConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_yields_defaults() {
    assert_eq!(config_from(&[]), BridgeConfig::default());
}

#[test]
fn overrides_are_parsed() {
    let cfg = config_from(&[
        ("PORT", "8080"),
        ("ASSEMBLY_STALL_TIMEOUT_SECS", "90"),
        ("ASSEMBLY_SWEEP_INTERVAL_SECS", "2"),
        ("INIT_DATA_TTL_SECS", "60"),
        ("MAX_TOTAL_CHUNKS", " 16 "),
    ]);
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.stall_timeout, Duration::from_secs(90));
    assert_eq!(cfg.sweep_interval, Duration::from_secs(2));
    assert_eq!(cfg.init_data_ttl_secs, 60);
    assert_eq!(cfg.max_total_chunks, 16);
}

#[test]
fn malformed_values_fall_back_to_defaults() {
    let cfg = config_from(&[("PORT", "eighty"), ("MAX_TOTAL_CHUNKS", "-3")]);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.max_total_chunks, DEFAULT_MAX_TOTAL_CHUNKS);
}

#[test]
fn zero_interval_and_cap_are_clamped() {
    let cfg = config_from(&[
        ("ASSEMBLY_SWEEP_INTERVAL_SECS", "0"),
        ("MAX_TOTAL_CHUNKS", "0"),
        ("INIT_DATA_TTL_SECS", "-5"),
    ]);
    assert_eq!(cfg.sweep_interval, Duration::from_secs(1));
    assert_eq!(cfg.max_total_chunks, 1);
    assert_eq!(cfg.init_data_ttl_secs, 1);
}

#[test]
fn huge_init_ttl_is_capped() {
    let cfg = config_from(&[("INIT_DATA_TTL_SECS", "9223372036854775807")]);
    assert_eq!(cfg.init_data_ttl_secs, MAX_INIT_DATA_TTL_SECS);
}
