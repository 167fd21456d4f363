use super::*;
use serde_json::json;

#[tokio::test]
async fn list_all_on_fresh_store_is_empty() {
    let store = MemoryBoardStore::new();
    let boards = store.list_all().await.unwrap();
    assert!(boards.is_empty());
}

#[tokio::test]
async fn create_assigns_increasing_ids() {
    let store = MemoryBoardStore::new();
    let a = store.create("Todo", &[]).await.unwrap();
    let b = store.create("Doing", &[]).await.unwrap();
    let c = store.create("Done", &[]).await.unwrap();
    assert!(a.id < b.id && b.id < c.id);

    let names = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|board| board.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Todo", "Doing", "Done"]);
}

#[tokio::test]
async fn find_by_id_missing_is_not_found() {
    let store = MemoryBoardStore::new();
    let err = store.find_by_id(99).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(99)));
}

#[tokio::test]
async fn cards_round_trip_through_storage() {
    let store = MemoryBoardStore::new();
    let cards = vec![json!({"a": 1}), json!({"b": 2})];
    let board = store.create("Todo", &cards).await.unwrap();

    let loaded = store.find_by_id(board.id).await.unwrap();
    assert_eq!(loaded.cards, cards);
}

#[tokio::test]
async fn update_merges_only_provided_fields() {
    let store = MemoryBoardStore::new();
    let board = store.create("Todo", &[json!("keep me")]).await.unwrap();

    let renamed = store
        .update(&BoardPatch { id: board.id, name: Some("Later".into()), cards: None })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Later");
    assert_eq!(renamed.cards, vec![json!("keep me")]);

    let recarded = store
        .update(&BoardPatch { id: board.id, name: None, cards: Some(vec![json!(1), json!(2)]) })
        .await
        .unwrap();
    assert_eq!(recarded.name, "Later");
    assert_eq!(recarded.cards, vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
    let store = MemoryBoardStore::new();
    let err = store
        .update(&BoardPatch { id: 5, name: Some("x".into()), cards: None })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(5)));
}

#[tokio::test]
async fn update_batch_applies_all_patches() {
    let store = MemoryBoardStore::new();
    let a = store.create("A", &[]).await.unwrap();
    let b = store.create("B", &[]).await.unwrap();

    let updated = store
        .update_batch(&[
            BoardPatch { id: a.id, name: Some("A2".into()), cards: None },
            BoardPatch { id: b.id, name: None, cards: Some(vec![json!(1)]) },
        ])
        .await
        .unwrap();

    assert_eq!(updated.len(), 2);
    assert_eq!(store.find_by_id(a.id).await.unwrap().name, "A2");
    assert_eq!(store.find_by_id(b.id).await.unwrap().cards, vec![json!(1)]);
}

#[tokio::test]
async fn update_batch_with_missing_id_changes_nothing() {
    let store = MemoryBoardStore::new();
    let a = store.create("A", &[]).await.unwrap();

    let err = store
        .update_batch(&[
            BoardPatch { id: a.id, name: Some("A2".into()), cards: None },
            BoardPatch { id: 404, name: Some("ghost".into()), cards: None },
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound(404)));
    assert_eq!(store.find_by_id(a.id).await.unwrap().name, "A");
}
