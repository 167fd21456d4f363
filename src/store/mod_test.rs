use super::*;
use serde_json::json;

#[test]
fn decode_absent_is_empty() {
    assert!(decode_cards(None).is_empty());
}

#[test]
fn decode_blank_is_empty() {
    assert!(decode_cards(Some("")).is_empty());
    assert!(decode_cards(Some("   ")).is_empty());
}

#[test]
fn decode_null_is_empty() {
    assert!(decode_cards(Some("null")).is_empty());
}

#[test]
fn decode_malformed_is_empty() {
    assert!(decode_cards(Some("[{\"a\":")).is_empty());
}

#[test]
fn decode_non_array_is_empty() {
    assert!(decode_cards(Some(r#"{"a":1}"#)).is_empty());
    assert!(decode_cards(Some("42")).is_empty());
}

#[test]
fn cards_survive_encode_then_decode() {
    let cards = vec![json!({"a": 1}), json!({"b": 2})];
    let text = encode_cards(&cards).unwrap();
    assert_eq!(decode_cards(Some(&text)), cards);
}

#[test]
fn nested_cards_keep_order_and_structure() {
    let cards = vec![
        json!({"title": "first", "tags": ["x", "y"], "meta": {"done": false}}),
        json!("plain string card"),
        json!(3.5),
        json!(null),
    ];
    let text = encode_cards(&cards).unwrap();
    let decoded = decode_cards(Some(&text));
    assert_eq!(decoded, cards);
    assert_eq!(decoded[1], json!("plain string card"));
}

#[test]
fn patch_ignores_unknown_fields() {
    let patch: BoardPatch =
        serde_json::from_value(json!({"id": 3, "cards": [1, 2], "showInputField": true, "created_at": "x"})).unwrap();
    assert_eq!(patch, BoardPatch { id: 3, name: None, cards: Some(vec![json!(1), json!(2)]) });
}

#[test]
fn patch_requires_id() {
    let result = serde_json::from_value::<BoardPatch>(json!({"name": "no id"}));
    assert!(result.is_err());
}

#[test]
fn board_without_cards_deserializes_empty() {
    let board: Board = serde_json::from_value(json!({"id": 1, "name": "Backlog"})).unwrap();
    assert!(board.cards.is_empty());
}
