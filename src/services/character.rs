//! Character catalogue: built-in characters plus per-user creations.
//!
//! DESIGN
//! ======
//! Built-in characters are static and visible to every user. User-created
//! characters live in memory keyed by `user_id`; a user record with the same
//! name as a built-in shadows it for that user only.
//!
//! Length limits are counted in characters, not bytes, since most names and
//! greetings are Cyrillic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const NAME_LIMIT: usize = 50;
pub const DESCRIPTION_LIMIT: usize = 1000;
pub const GREETING_LIMIT: usize = 500;
pub const DEFAULT_GREETING: &str = "Привет!";

/// (name, description, greeting)
const BUILT_IN: [(&str, &str, &str); 5] = [
    ("AI_Assistant", "Полезный AI ассистент", "Привет! Я AI ассистент."),
    ("Capitano", "Капитан корабля", "Приветствую на борту!"),
    ("Дотторе", "Умный доктор", "Здравствуйте, чем могу помочь?"),
    ("Роберт", "Дружелюбный собеседник", "Привет, я Роберт!"),
    ("Цзин Юань", "Мудрый советник", "Приветствую, путник."),
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CharacterError {
    #[error("character name is required")]
    MissingName,
    #[error("character name longer than {limit} characters", limit = NAME_LIMIT)]
    NameTooLong,
    #[error("character description longer than {limit} characters", limit = DESCRIPTION_LIMIT)]
    DescriptionTooLong,
    #[error("character greeting longer than {limit} characters", limit = GREETING_LIMIT)]
    GreetingTooLong,
    #[error("character {0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,
    pub greeting: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Unvalidated character as submitted by the editor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub greeting: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterName {
    pub name: String,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim, enforce limits, and fill in the default greeting.
///
/// # Errors
///
/// Returns the first limit the draft violates.
pub fn validate(draft: CharacterDraft, user_id: &str) -> Result<Character, CharacterError> {
    let name = draft.name.trim();
    let description = draft.description.trim();
    let greeting = draft.greeting.trim();

    if name.is_empty() {
        return Err(CharacterError::MissingName);
    }
    if name.chars().count() > NAME_LIMIT {
        return Err(CharacterError::NameTooLong);
    }
    if description.chars().count() > DESCRIPTION_LIMIT {
        return Err(CharacterError::DescriptionTooLong);
    }
    if greeting.chars().count() > GREETING_LIMIT {
        return Err(CharacterError::GreetingTooLong);
    }

    Ok(Character {
        name: name.to_owned(),
        description: description.to_owned(),
        greeting: if greeting.is_empty() { DEFAULT_GREETING.to_owned() } else { greeting.to_owned() },
        user_id: Some(user_id.to_owned()),
    })
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct CharacterStore {
    /// `user_id` -> characters in creation order.
    by_user: HashMap<String, Vec<Character>>,
}

impl CharacterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in names first, then the user's own in creation order.
    #[must_use]
    pub fn list(&self, user_id: &str) -> Vec<CharacterName> {
        let mut names: Vec<CharacterName> = BUILT_IN
            .iter()
            .map(|(name, _, _)| CharacterName { name: (*name).to_owned() })
            .collect();
        for character in self.by_user.get(user_id).into_iter().flatten() {
            if !names.iter().any(|n| n.name == character.name) {
                names.push(CharacterName { name: character.name.clone() });
            }
        }
        names
    }

    /// The user's own record first, then the built-ins.
    ///
    /// # Errors
    ///
    /// `NotFound` when neither has `name`.
    pub fn get(&self, name: &str, user_id: &str) -> Result<Character, CharacterError> {
        if let Some(own) = self
            .by_user
            .get(user_id)
            .and_then(|list| list.iter().find(|c| c.name == name))
        {
            return Ok(own.clone());
        }
        BUILT_IN
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(n, description, greeting)| Character {
                name: (*n).to_owned(),
                description: (*description).to_owned(),
                greeting: (*greeting).to_owned(),
                user_id: None,
            })
            .ok_or_else(|| CharacterError::NotFound(name.to_owned()))
    }

    /// Validate and upsert a user's character.
    ///
    /// # Errors
    ///
    /// Any validation failure from [`validate`].
    pub fn save(&mut self, user_id: &str, draft: CharacterDraft) -> Result<Character, CharacterError> {
        let character = validate(draft, user_id)?;
        let list = self.by_user.entry(user_id.to_owned()).or_default();
        match list.iter_mut().find(|c| c.name == character.name) {
            Some(existing) => *existing = character.clone(),
            None => list.push(character.clone()),
        }
        Ok(character)
    }
}

#[cfg(test)]
#[path = "character_test.rs"]
mod tests;
