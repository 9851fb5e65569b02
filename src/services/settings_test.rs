use super::*;
use serde_json::json;

fn base() -> Value {
    json!({
        "model_name": "gemini-2.0-flash",
        "temperature": 0.5,
        "top_p": 0.9,
        "top_k": 3
    })
}

#[test]
fn defaults_match_editor_initial_values() {
    let s = Settings::default();
    assert_eq!(s.model_name, "gemini-2.0-flash");
    assert!((s.temperature - 0.85).abs() < f64::EPSILON);
    assert!((s.top_p - 0.95).abs() < f64::EPSILON);
    assert_eq!(s.top_k, 1);
    assert!(s.streaming_mode);
    assert!((s.streaming_edit_interval - 2.0).abs() < f64::EPSILON);
}

#[test]
fn normalize_fills_optional_fields_from_defaults() {
    let s = normalize(&base()).unwrap();
    assert!((s.temperature - 0.5).abs() < f64::EPSILON);
    assert_eq!(s.top_k, 3);
    assert!(s.enable_image_generation);
    assert!(s.updated_at.is_none());
}

#[test]
fn normalize_coerces_numeric_strings() {
    let mut raw = base();
    raw["temperature"] = json!("0.7");
    raw["top_k"] = json!(" 40 ");
    raw["streaming_edit_interval"] = json!("1.5");

    let s = normalize(&raw).unwrap();
    assert!((s.temperature - 0.7).abs() < f64::EPSILON);
    assert_eq!(s.top_k, 40);
    assert!((s.streaming_edit_interval - 1.5).abs() < f64::EPSILON);
}

#[test]
fn normalize_coerces_string_bools() {
    let mut raw = base();
    raw["streaming_mode"] = json!("YES");
    raw["streaming_edit_mode"] = json!("false");
    raw["enable_message_buttons"] = json!("1");
    raw["enable_image_generation"] = json!("nope");

    let s = normalize(&raw).unwrap();
    assert!(s.streaming_mode);
    assert!(!s.streaming_edit_mode);
    assert!(s.enable_message_buttons);
    assert!(!s.enable_image_generation);
}

#[test]
fn normalize_requires_model_fields() {
    for field in REQUIRED_FIELDS {
        let mut raw = base();
        raw.as_object_mut().unwrap().remove(field);
        assert_eq!(normalize(&raw), Err(SettingsError::MissingField(field)));
    }
}

#[test]
fn normalize_rejects_uncoercible_values() {
    let mut raw = base();
    raw["top_p"] = json!("high");
    assert_eq!(normalize(&raw), Err(SettingsError::InvalidField("top_p")));

    let mut raw = base();
    raw["top_k"] = json!(2.5);
    assert_eq!(normalize(&raw), Err(SettingsError::InvalidField("top_k")));

    assert_eq!(normalize(&json!([1, 2])), Err(SettingsError::NotAnObject));
}

#[test]
fn store_returns_defaults_until_saved() {
    let mut store = SettingsStore::new();
    assert_eq!(store.get("u1"), Settings::default());

    let saved = store.save("u1", &base(), 1_700_000_000).unwrap();
    assert_eq!(saved.updated_at, Some(1_700_000_000));
    assert_eq!(saved.user_id.as_deref(), Some("u1"));
    assert_eq!(store.get("u1"), saved);
    assert_eq!(store.get("u2"), Settings::default());
}

#[test]
fn failed_save_keeps_previous_settings() {
    let mut store = SettingsStore::new();
    let saved = store.save("u1", &base(), 1).unwrap();
    assert!(store.save("u1", &json!({"model_name": "x"}), 2).is_err());
    assert_eq!(store.get("u1"), saved);
}
