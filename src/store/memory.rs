//! In-memory board store.
//!
//! Rows keep `cards` as serialized text so this backend honors the same
//! storage codec as Postgres. Used when no `DATABASE_URL` is configured and
//! by service tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Board, BoardId, BoardPatch, BoardStore, StoreError, decode_cards, encode_cards};

struct StoredBoard {
    name: String,
    cards: Option<String>,
}

struct Inner {
    next_id: BoardId,
    rows: BTreeMap<BoardId, StoredBoard>,
}

pub struct MemoryBoardStore {
    inner: RwLock<Inner>,
}

impl MemoryBoardStore {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner { next_id: 1, rows: BTreeMap::new() }) }
    }
}

impl Default for MemoryBoardStore {
    fn default() -> Self {
        Self::new()
    }
}

fn materialize(id: BoardId, row: &StoredBoard) -> Board {
    Board { id, name: row.name.clone(), cards: decode_cards(row.cards.as_deref()) }
}

fn apply_patch(row: &mut StoredBoard, patch: &BoardPatch) -> Result<(), StoreError> {
    if let Some(name) = &patch.name {
        row.name.clone_from(name);
    }
    if let Some(cards) = &patch.cards {
        row.cards = Some(encode_cards(cards)?);
    }
    Ok(())
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn list_all(&self) -> Result<Vec<Board>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().map(|(id, row)| materialize(*id, row)).collect())
    }

    async fn find_by_id(&self, id: BoardId) -> Result<Board, StoreError> {
        let inner = self.inner.read().await;
        inner
            .rows
            .get(&id)
            .map(|row| materialize(id, row))
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, name: &str, cards: &[Value]) -> Result<Board, StoreError> {
        let encoded = encode_cards(cards)?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let row = StoredBoard { name: name.to_owned(), cards: Some(encoded) };
        let board = materialize(id, &row);
        inner.rows.insert(id, row);
        Ok(board)
    }

    async fn update(&self, patch: &BoardPatch) -> Result<Board, StoreError> {
        let mut inner = self.inner.write().await;
        let row = inner.rows.get_mut(&patch.id).ok_or(StoreError::NotFound(patch.id))?;
        apply_patch(row, patch)?;
        Ok(materialize(patch.id, row))
    }

    async fn update_batch(&self, patches: &[BoardPatch]) -> Result<Vec<Board>, StoreError> {
        let mut inner = self.inner.write().await;

        // Check ids and encode everything before touching any row.
        if let Some(missing) = patches.iter().find(|p| !inner.rows.contains_key(&p.id)) {
            return Err(StoreError::NotFound(missing.id));
        }
        let staged = patches
            .iter()
            .map(|patch| {
                let cards = patch.cards.as_deref().map(encode_cards).transpose()?;
                Ok((patch, cards))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let mut updated = Vec::with_capacity(staged.len());
        for (patch, cards) in staged {
            let Some(row) = inner.rows.get_mut(&patch.id) else {
                return Err(StoreError::NotFound(patch.id));
            };
            if let Some(name) = &patch.name {
                row.name.clone_from(name);
            }
            if let Some(cards) = cards {
                row.cards = Some(cards);
            }
            updated.push(materialize(patch.id, row));
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
