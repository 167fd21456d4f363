//! Board store: persisted board records and the `cards` text codec.
//!
//! DESIGN
//! ======
//! `BoardStore` is the seam between the board service and persistence. Two
//! backends implement it: Postgres for deployments and an ordered in-memory
//! map for local runs and tests. `cards` is a `Vec<Value>` everywhere except
//! the storage column, where it is a serialized JSON text blob.
//!
//! ERROR HANDLING
//! ==============
//! Decoding stored cards never fails. Empty, absent, `null`, malformed, or
//! non-array blobs all materialize as an empty sequence; the last two are
//! logged since they mean something wrote the column behind our back.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub use memory::MemoryBoardStore;
pub use postgres::PgBoardStore;

// =============================================================================
// TYPES
// =============================================================================

/// Server-assigned board identifier. Monotonically increasing.
pub type BoardId = i64;

/// A named container owning an ordered sequence of opaque cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Value>,
}

/// Partial update for one board. Absent fields are left unchanged.
///
/// Deserializes from bulk-update entries; fields other than `id`, `name`, and
/// `cards` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardPatch {
    pub id: BoardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Value>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("board not found: {0}")]
    NotFound(BoardId),
    #[error("cards encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// STORE CONTRACT
// =============================================================================

#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Every board in ascending id order.
    async fn list_all(&self) -> Result<Vec<Board>, StoreError>;

    /// Fetch one board, `NotFound` if absent.
    async fn find_by_id(&self, id: BoardId) -> Result<Board, StoreError>;

    /// Persist a new board under a fresh id.
    async fn create(&self, name: &str, cards: &[Value]) -> Result<Board, StoreError>;

    /// Merge `patch` into the stored board and return the result.
    async fn update(&self, patch: &BoardPatch) -> Result<Board, StoreError>;

    /// Apply every patch or none of them. Fails with `NotFound` for the first
    /// missing id.
    async fn update_batch(&self, patches: &[BoardPatch]) -> Result<Vec<Board>, StoreError>;
}

// =============================================================================
// CARDS CODEC
// =============================================================================

/// Serialize cards for the text column.
///
/// # Errors
///
/// Returns an error if a card cannot be represented as JSON text.
pub fn encode_cards(cards: &[Value]) -> Result<String, serde_json::Error> {
    serde_json::to_string(cards)
}

/// Materialize a stored cards blob. Never fails; see module docs.
#[must_use]
pub fn decode_cards(raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(cards)) => cards,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => {
            warn!(kind = json_kind(&other), "stored cards blob is not an array; reading as empty");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "stored cards blob is not valid JSON; reading as empty");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
