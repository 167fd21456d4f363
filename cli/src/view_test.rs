use super::*;
use serde_json::json;

fn board(id: i64, name: &str, cards: Value) -> Board {
    serde_json::from_value(json!({"id": id, "name": name, "cards": cards})).unwrap()
}

fn note(event: &str, data: Value) -> Notification {
    Notification {
        channel: BOARDS_CHANNEL.to_owned(),
        event: event.to_owned(),
        data,
        ts: 0,
    }
}

fn loaded() -> BoardsView {
    let mut view = BoardsView::new();
    view.load(vec![board(1, "Todo", json!([])), board(2, "Done", json!(["a"]))]);
    view
}

#[test]
fn fresh_load_is_clean() {
    let view = loaded();
    assert_eq!(view.boards().len(), 2);
    assert!(view.dirty().is_empty());
}

#[test]
fn push_card_marks_only_cards_dirty() {
    let mut view = loaded();
    assert!(view.push_card(2, json!("b")));

    let dirty = view.dirty();
    assert_eq!(
        dirty,
        vec![BoardPatch { id: 2, name: None, cards: Some(vec![json!("a"), json!("b")]) }]
    );
    assert_eq!(
        serde_json::to_value(&dirty[0]).unwrap(),
        json!({"id": 2, "cards": ["a", "b"]})
    );
}

#[test]
fn rename_marks_only_name_dirty() {
    let mut view = loaded();
    assert!(view.set_name(1, "Doing"));
    assert_eq!(
        view.dirty(),
        vec![BoardPatch { id: 1, name: Some("Doing".to_owned()), cards: None }]
    );
}

#[test]
fn edit_then_revert_is_clean() {
    let mut view = loaded();
    view.set_cards(2, vec![]);
    view.set_cards(2, vec![json!("a")]);
    assert!(view.dirty().is_empty());
}

#[test]
fn unknown_board_edits_are_rejected() {
    let mut view = loaded();
    assert!(!view.set_name(9, "x"));
    assert!(!view.set_cards(9, vec![]));
    assert!(!view.push_card(9, json!(1)));
    assert!(view.dirty().is_empty());
}

#[test]
fn mark_synced_clears_dirty() {
    let mut view = loaded();
    view.push_card(1, json!({"title": "t"}));
    view.mark_synced();
    assert!(view.dirty().is_empty());
}

#[test]
fn board_created_appends() {
    let mut view = loaded();
    let change = view
        .apply(&note("board.created", json!({"board": {"id": 3, "name": "New", "cards": []}})))
        .unwrap();
    assert_eq!(change, Change::Created(3));
    assert_eq!(view.boards().len(), 3);
    assert_eq!(view.boards()[2].name, "New");
    assert!(view.dirty().is_empty());
}

#[test]
fn card_created_replaces_cards_of_matching_board() {
    let mut view = loaded();
    let change = view
        .apply(&note("card.created", json!({"board": {"id": 1, "name": "Todo", "cards": [1, 2]}})))
        .unwrap();
    assert_eq!(change, Change::CardsReplaced(1));
    assert_eq!(view.boards()[0].cards, vec![json!(1), json!(2)]);
    assert!(view.dirty().is_empty());
}

#[test]
fn updated_replaces_whole_list() {
    let mut view = loaded();
    view.set_name(1, "local edit");
    let change = view
        .apply(&note("updated", json!({"boards": [{"id": 5, "name": "Only", "cards": []}]})))
        .unwrap();
    assert_eq!(change, Change::Replaced(1));
    assert_eq!(view.boards(), &[board(5, "Only", json!([]))]);
    assert!(view.dirty().is_empty());
}

#[test]
fn unknown_event_and_channel_are_ignored() {
    let mut view = loaded();
    assert_eq!(view.apply(&note("board.deleted", json!({}))).unwrap(), Change::Ignored);

    let mut other = note("updated", json!({"boards": []}));
    other.channel = "cards".to_owned();
    assert_eq!(view.apply(&other).unwrap(), Change::Ignored);
    assert_eq!(view.boards().len(), 2);
}

#[test]
fn missing_payload_field_is_error() {
    let mut view = loaded();
    let err = view.apply(&note("board.created", json!({}))).unwrap_err();
    assert!(matches!(err, ViewError::MissingField { field: "board", .. }));
    assert_eq!(view.boards().len(), 2);
}

#[test]
fn malformed_payload_is_error() {
    let mut view = loaded();
    let err = view.apply(&note("updated", json!({"boards": "nope"}))).unwrap_err();
    assert!(matches!(err, ViewError::Payload(_)));
}

#[test]
fn notification_envelope_deserializes() {
    let n: Notification = serde_json::from_str(
        r#"{"channel":"boards","event":"updated","data":{"boards":[]},"ts":1700000000000}"#,
    )
    .unwrap();
    assert_eq!(n.event, "updated");
    assert_eq!(n.ts, 1_700_000_000_000);
}
