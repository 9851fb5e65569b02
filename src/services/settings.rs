//! Per-user model settings.
//!
//! DESIGN
//! ======
//! The editor posts whatever its form controls produce, so numbers may
//! arrive as strings and checkboxes as `"true"`/`"1"`. `normalize` is the one
//! place that coerces a raw JSON body into typed `Settings`; the four model
//! fields are required, everything else falls back to the defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const REQUIRED_FIELDS: [&str; 4] = ["model_name", "temperature", "top_p", "top_k"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings body must be a JSON object")]
    NotAnObject,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {0}")]
    InvalidField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub model_name: String,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: i64,
    pub streaming_mode: bool,
    pub streaming_edit_mode: bool,
    pub streaming_edit_interval: f64,
    pub enable_message_buttons: bool,
    pub enable_image_generation: bool,
    /// Unix seconds of the last save. Absent on defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_name: "gemini-2.0-flash".into(),
            temperature: 0.85,
            top_p: 0.95,
            top_k: 1,
            streaming_mode: true,
            streaming_edit_mode: true,
            streaming_edit_interval: 2.0,
            enable_message_buttons: true,
            enable_image_generation: true,
            updated_at: None,
            user_id: None,
        }
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Coerce a raw settings body into typed `Settings`.
///
/// # Errors
///
/// `MissingField` for an absent required field, `InvalidField` for a value
/// that cannot be coerced to the field's type.
pub fn normalize(raw: &Value) -> Result<Settings, SettingsError> {
    let Some(obj) = raw.as_object() else {
        return Err(SettingsError::NotAnObject);
    };
    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(SettingsError::MissingField(field));
        }
    }

    let defaults = Settings::default();
    let model_name = match obj.get("model_name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_owned(),
        _ => return Err(SettingsError::InvalidField("model_name")),
    };

    Ok(Settings {
        model_name,
        temperature: float_field(obj, "temperature", defaults.temperature)?,
        top_p: float_field(obj, "top_p", defaults.top_p)?,
        top_k: int_field(obj, "top_k", defaults.top_k)?,
        streaming_mode: bool_field(obj, "streaming_mode", defaults.streaming_mode),
        streaming_edit_mode: bool_field(obj, "streaming_edit_mode", defaults.streaming_edit_mode),
        streaming_edit_interval: float_field(obj, "streaming_edit_interval", defaults.streaming_edit_interval)?,
        enable_message_buttons: bool_field(obj, "enable_message_buttons", defaults.enable_message_buttons),
        enable_image_generation: bool_field(obj, "enable_image_generation", defaults.enable_image_generation),
        updated_at: None,
        user_id: None,
    })
}

fn float_field(obj: &Map<String, Value>, key: &'static str, default: f64) -> Result<f64, SettingsError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or(SettingsError::InvalidField(key)),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| SettingsError::InvalidField(key)),
        Some(_) => Err(SettingsError::InvalidField(key)),
    }
}

fn int_field(obj: &Map<String, Value>, key: &'static str, default: i64) -> Result<i64, SettingsError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_i64().ok_or(SettingsError::InvalidField(key)),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| SettingsError::InvalidField(key)),
        Some(_) => Err(SettingsError::InvalidField(key)),
    }
}

/// Strings count as true only for `true`/`yes`/`1`.
fn bool_field(obj: &Map<String, Value>, key: &str, default: bool) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => default,
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct SettingsStore {
    by_user: HashMap<String, Settings>,
}

impl SettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored settings for `user_id`, or the defaults.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Settings {
        self.by_user.get(user_id).cloned().unwrap_or_default()
    }

    /// Normalize and store, stamping `updated_at` and `user_id`.
    ///
    /// # Errors
    ///
    /// Any error from [`normalize`]; nothing is stored on failure.
    pub fn save(&mut self, user_id: &str, raw: &Value, now_secs: i64) -> Result<Settings, SettingsError> {
        let mut settings = normalize(raw)?;
        settings.updated_at = Some(now_secs);
        settings.user_id = Some(user_id.to_owned());
        self.by_user.insert(user_id.to_owned(), settings.clone());
        Ok(settings)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
