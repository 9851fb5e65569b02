use super::*;
use serde_json::json;

#[test]
fn decodes_chunk_with_side_payload() {
    let text = r#"{
        "action": "chunk",
        "key": "Capitano",
        "chunk_index": 0,
        "total_chunks": 3,
        "fragment": "Captain of the ",
        "side": {"greeting": "Welcome aboard!"}
    }"#;

    let Inbound::Chunk(chunk) = decode(text).unwrap() else {
        panic!("expected chunk");
    };
    assert_eq!(chunk.key, "Capitano");
    assert_eq!(chunk.chunk_index, 0);
    assert_eq!(chunk.total_chunks, 3);
    assert_eq!(chunk.fragment, "Captain of the ");
    assert_eq!(chunk.side, Some(json!({"greeting": "Welcome aboard!"})));
}

#[test]
fn chunk_side_is_optional() {
    let text = r#"{"action":"chunk","key":"k","chunk_index":1,"total_chunks":2,"fragment":"x"}"#;
    let Inbound::Chunk(chunk) = decode(text).unwrap() else {
        panic!("expected chunk");
    };
    assert!(chunk.side.is_none());

    let text = r#"{"action":"chunk","key":"k","chunk_index":1,"total_chunks":2,"fragment":"x","side":null}"#;
    let Inbound::Chunk(chunk) = decode(text).unwrap() else {
        panic!("expected chunk");
    };
    assert!(chunk.side.is_none());
}

#[test]
fn chunk_accepts_legacy_field_names() {
    let text = r#"{
        "action": "chunk",
        "name": "Роберт",
        "part": 2,
        "total_parts": 4,
        "description": "дружелюбный",
        "greeting": "Привет, я Роберт!"
    }"#;

    let Inbound::Chunk(chunk) = decode(text).unwrap() else {
        panic!("expected chunk");
    };
    assert_eq!(chunk.key, "Роберт");
    assert_eq!(chunk.chunk_index, 2);
    assert_eq!(chunk.total_chunks, 4);
    assert_eq!(chunk.fragment, "дружелюбный");
    assert_eq!(chunk.side, Some(json!("Привет, я Роберт!")));
}

#[test]
fn negative_index_is_invalid_body() {
    let text = r#"{"action":"chunk","key":"k","chunk_index":-1,"total_chunks":2,"fragment":"x"}"#;
    let err = decode(text).unwrap_err();
    assert!(matches!(&err, DecodeError::InvalidBody { action, .. } if action == "chunk"));
    assert_eq!(err.error_code(), "E_INVALID_MESSAGE_BODY");
}

#[test]
fn missing_key_is_invalid_body() {
    let text = r#"{"action":"chunk","chunk_index":0,"total_chunks":2,"fragment":"x"}"#;
    assert!(matches!(decode(text), Err(DecodeError::InvalidBody { .. })));
}

#[test]
fn decodes_announce() {
    let text = r#"{"action":"announce","key":"Дотторе","total_chunks":5}"#;
    assert_eq!(
        decode(text).unwrap(),
        Inbound::Announce(AnnounceMessage { key: "Дотторе".into(), total_chunks: 5 })
    );
}

#[test]
fn decodes_character_list_response() {
    let text = r#"{"action":"character_list_response","data":{"character_names":[{"name":"A"},{"name":"B"}]}}"#;
    let Inbound::CharacterList(list) = decode(text).unwrap() else {
        panic!("expected character list");
    };
    let names: Vec<&str> = list.character_names.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn character_list_without_names_is_empty() {
    let text = r#"{"action":"character_list_response","data":{}}"#;
    assert_eq!(decode(text).unwrap(), Inbound::CharacterList(CharacterList { character_names: vec![] }));
}

#[test]
fn decodes_character_details_response() {
    let text = r#"{"action":"character_details_response","data":{"name":"Capitano","greeting":"Ahoy"}}"#;
    assert_eq!(
        decode(text).unwrap(),
        Inbound::CharacterDetails(CharacterDetails {
            name: "Capitano".into(),
            description: String::new(),
            greeting: Some("Ahoy".into()),
        })
    );
}

#[test]
fn character_details_without_data_is_invalid_body() {
    let text = r#"{"action":"character_details_response"}"#;
    assert!(matches!(decode(text), Err(DecodeError::InvalidBody { .. })));
}

#[test]
fn unknown_action_is_not_an_error() {
    let inbound = decode(r#"{"action":"save_settings","temperature":0.5}"#).unwrap();
    assert_eq!(inbound.action(), "save_settings");
    assert_eq!(inbound, Inbound::Unknown { action: "save_settings".into() });
}

#[test]
fn malformed_inputs() {
    for text in ["not json", "[1,2,3]", r#"{"key":"k"}"#, r#"{"action":42}"#, ""] {
        let err = decode(text).unwrap_err();
        assert_eq!(err.error_code(), "E_MALFORMED_MESSAGE", "input {text:?}");
    }
}

#[test]
fn action_tags_round_trip() {
    let chunk = decode(r#"{"action":"chunk","key":"k","chunk_index":0,"total_chunks":1,"fragment":""}"#).unwrap();
    assert_eq!(chunk.action(), ACTION_CHUNK);
    let announce = decode(r#"{"action":"announce","key":"k","total_chunks":1}"#).unwrap();
    assert_eq!(announce.action(), ACTION_ANNOUNCE);
}
