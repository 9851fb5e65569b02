use super::*;

fn draft(name: &str, description: &str, greeting: &str) -> CharacterDraft {
    CharacterDraft { name: name.into(), description: description.into(), greeting: greeting.into() }
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_trims_and_defaults_greeting() {
    let c = validate(draft("  Nova  ", " pilot ", "   "), "u1").unwrap();
    assert_eq!(c.name, "Nova");
    assert_eq!(c.description, "pilot");
    assert_eq!(c.greeting, DEFAULT_GREETING);
    assert_eq!(c.user_id.as_deref(), Some("u1"));
}

#[test]
fn validate_rejects_blank_name() {
    assert_eq!(validate(draft("   ", "", ""), "u1"), Err(CharacterError::MissingName));
}

#[test]
fn limits_count_chars_not_bytes() {
    // 50 Cyrillic letters are 100 bytes but still within the name limit.
    let name = "я".repeat(NAME_LIMIT);
    assert!(validate(draft(&name, "", ""), "u1").is_ok());

    let name = "я".repeat(NAME_LIMIT + 1);
    assert_eq!(validate(draft(&name, "", ""), "u1"), Err(CharacterError::NameTooLong));
}

#[test]
fn description_and_greeting_limits() {
    let long_description = "d".repeat(DESCRIPTION_LIMIT + 1);
    assert_eq!(
        validate(draft("n", &long_description, ""), "u1"),
        Err(CharacterError::DescriptionTooLong)
    );

    let long_greeting = "g".repeat(GREETING_LIMIT + 1);
    assert_eq!(validate(draft("n", "", &long_greeting), "u1"), Err(CharacterError::GreetingTooLong));

    let at_limit = "g".repeat(GREETING_LIMIT);
    assert!(validate(draft("n", "", &at_limit), "u1").is_ok());
}

// =============================================================================
// store
// =============================================================================

#[test]
fn list_starts_with_built_ins() {
    let store = CharacterStore::new();
    let names: Vec<String> = store.list("u1").into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["AI_Assistant", "Capitano", "Дотторе", "Роберт", "Цзин Юань"]);
}

#[test]
fn list_appends_user_characters_without_duplicates() {
    let mut store = CharacterStore::new();
    store.save("u1", draft("Nova", "", "")).unwrap();
    store.save("u1", draft("Capitano", "my own captain", "")).unwrap();
    store.save("u2", draft("Other", "", "")).unwrap();

    let names: Vec<String> = store.list("u1").into_iter().map(|n| n.name).collect();
    assert_eq!(names.len(), 6);
    assert_eq!(names.last().map(String::as_str), Some("Nova"));
    assert!(!names.contains(&"Other".to_owned()));
}

#[test]
fn get_prefers_user_record_over_built_in() {
    let mut store = CharacterStore::new();
    store.save("u1", draft("Capitano", "my own captain", "Yo")).unwrap();

    let own = store.get("Capitano", "u1").unwrap();
    assert_eq!(own.description, "my own captain");

    let built_in = store.get("Capitano", "u2").unwrap();
    assert_eq!(built_in.description, "Капитан корабля");
    assert!(built_in.user_id.is_none());
}

#[test]
fn get_unknown_is_not_found() {
    let store = CharacterStore::new();
    assert_eq!(store.get("Ghost", "u1"), Err(CharacterError::NotFound("Ghost".into())));
}

#[test]
fn save_upserts_by_name() {
    let mut store = CharacterStore::new();
    store.save("u1", draft("Nova", "v1", "")).unwrap();
    store.save("u1", draft("Nova", "v2", "hi")).unwrap();

    let c = store.get("Nova", "u1").unwrap();
    assert_eq!(c.description, "v2");
    assert_eq!(c.greeting, "hi");
    assert_eq!(store.list("u1").len(), 6);
}

#[test]
fn save_rejects_invalid_draft_without_storing() {
    let mut store = CharacterStore::new();
    assert!(store.save("u1", draft("", "x", "")).is_err());
    assert_eq!(store.list("u1").len(), 5);
}
