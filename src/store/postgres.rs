//! Postgres board store.
//!
//! One row per board in the `boards` table. Partial updates are a single
//! `UPDATE ... COALESCE` statement so absent fields keep their stored value
//! without a read-modify-write round trip.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use super::{Board, BoardId, BoardPatch, BoardStore, StoreError, decode_cards, encode_cards};

type BoardTuple = (BoardId, String, Option<String>);

pub struct PgBoardStore {
    pool: PgPool,
}

impl PgBoardStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_board((id, name, cards): BoardTuple) -> Board {
    Board { id, name, cards: decode_cards(cards.as_deref()) }
}

/// Apply one patch on an open connection. `Ok(None)` means no such board.
async fn update_row(conn: &mut PgConnection, patch: &BoardPatch) -> Result<Option<Board>, StoreError> {
    let cards = patch.cards.as_deref().map(encode_cards).transpose()?;

    let row = sqlx::query_as::<_, BoardTuple>(
        "UPDATE boards
         SET name = COALESCE($2, name),
             cards = COALESCE($3, cards),
             updated_at = now()
         WHERE id = $1
         RETURNING id, name, cards",
    )
    .bind(patch.id)
    .bind(patch.name.as_deref())
    .bind(cards)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(row_to_board))
}

#[async_trait]
impl BoardStore for PgBoardStore {
    async fn list_all(&self) -> Result<Vec<Board>, StoreError> {
        let rows = sqlx::query_as::<_, BoardTuple>("SELECT id, name, cards FROM boards ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(row_to_board).collect())
    }

    async fn find_by_id(&self, id: BoardId) -> Result<Board, StoreError> {
        let row = sqlx::query_as::<_, BoardTuple>("SELECT id, name, cards FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_board).ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, name: &str, cards: &[Value]) -> Result<Board, StoreError> {
        let encoded = encode_cards(cards)?;
        let row = sqlx::query_as::<_, BoardTuple>(
            "INSERT INTO boards (name, cards) VALUES ($1, $2) RETURNING id, name, cards",
        )
        .bind(name)
        .bind(encoded)
        .fetch_one(&self.pool)
        .await?;
        Ok(row_to_board(row))
    }

    async fn update(&self, patch: &BoardPatch) -> Result<Board, StoreError> {
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, patch)
            .await?
            .ok_or(StoreError::NotFound(patch.id))
    }

    async fn update_batch(&self, patches: &[BoardPatch]) -> Result<Vec<Board>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut updated = Vec::with_capacity(patches.len());
        for patch in patches {
            // Returning early drops `tx`, which rolls the batch back.
            let Some(board) = update_row(&mut tx, patch).await? else {
                return Err(StoreError::NotFound(patch.id));
            };
            updated.push(board);
        }
        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
