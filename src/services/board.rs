//! Board service: validation, store writes, and board events.
//!
//! DESIGN
//! ======
//! Every mutation is validate → write → publish, and publishes exactly one
//! event on success. The service holds no state between calls; everything it
//! touches comes in through `AppState`.
//!
//! ERROR HANDLING
//! ==============
//! Validation runs over the whole request before the first write, so a
//! validation error never leaves a partial mutation behind. `NotFound` during
//! a sequential bulk update is different: entries applied before the missing
//! id stay committed and no event is published for them. Configure
//! `BulkUpdateMode::Atomic` to make the batch all-or-nothing.

use serde_json::{Value, json};
use tracing::info;

use crate::config::BulkUpdateMode;
use crate::notify::{BOARDS_CHANNEL, EVENT_BOARD_CREATED, EVENT_BOARDS_UPDATED, EVENT_CARD_CREATED};
use crate::state::AppState;
use crate::store::{Board, BoardId, BoardPatch, StoreError};

/// Upper bound on board name length, in characters.
pub const MAX_NAME_CHARS: usize = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("board not found: {0}")]
    NotFound(BoardId),
    #[error("database error: {0}")]
    Database(#[source] StoreError),
}

impl BoardError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    /// Grepable error code for response bodies and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "E_VALIDATION",
            Self::NotFound(_) => "E_BOARD_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Database(other),
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// List every board. Read-only, publishes nothing.
///
/// # Errors
///
/// Returns a database error if the store read fails.
pub async fn list_boards(state: &AppState) -> Result<Vec<Board>, BoardError> {
    Ok(state.store.list_all().await?)
}

/// Create a board with an empty card list and publish `board.created`.
///
/// # Errors
///
/// Returns a validation error if `name` is missing or not 1–50 characters.
pub async fn create_board(state: &AppState, name: Option<&str>) -> Result<Board, BoardError> {
    let name = validate_name(name)?;
    let board = state.store.create(&name, &[]).await?;

    info!(board_id = board.id, "board created");
    state
        .publisher
        .publish(BOARDS_CHANNEL, EVENT_BOARD_CREATED, json!({ "board": board }));
    Ok(board)
}

/// Replace a board's cards wholesale and publish `card.created`.
///
/// Callers send the complete card list; this is not an append. An empty list
/// is accepted and clears the board.
///
/// # Errors
///
/// Returns a validation error if `cards` is missing, or `NotFound` if the
/// board does not exist.
pub async fn add_cards(state: &AppState, board_id: BoardId, cards: Option<Vec<Value>>) -> Result<(), BoardError> {
    let Some(cards) = cards else {
        return Err(BoardError::validation("cards", "the cards field is required"));
    };

    let board = state.store.find_by_id(board_id).await?;
    let patch = BoardPatch { id: board.id, name: None, cards: Some(cards) };
    let board = state.store.update(&patch).await?;

    info!(board_id, cards = board.cards.len(), "board cards replaced");
    state
        .publisher
        .publish(BOARDS_CHANNEL, EVENT_CARD_CREATED, json!({ "board": board }));
    Ok(())
}

/// Apply partial updates to several boards, then publish the full board list
/// once as `updated`.
///
/// # Errors
///
/// Returns a validation error if `boards` is missing or any entry carries an
/// invalid name, or `NotFound` for the first missing id.
pub async fn bulk_update_boards(state: &AppState, boards: Option<Vec<BoardPatch>>) -> Result<(), BoardError> {
    let Some(mut patches) = boards else {
        return Err(BoardError::validation("boards", "the boards field is required"));
    };
    for patch in &mut patches {
        if let Some(name) = patch.name.as_deref() {
            patch.name = Some(validate_name(Some(name))?);
        }
    }

    match state.bulk_update_mode {
        BulkUpdateMode::Sequential => {
            for patch in &patches {
                state.store.update(patch).await?;
            }
        }
        BulkUpdateMode::Atomic => {
            state.store.update_batch(&patches).await?;
        }
    }

    let all = state.store.list_all().await?;
    info!(
        updated = patches.len(),
        total = all.len(),
        mode = state.bulk_update_mode.as_str(),
        "boards bulk-updated"
    );
    state
        .publisher
        .publish(BOARDS_CHANNEL, EVENT_BOARDS_UPDATED, json!({ "boards": all }));
    Ok(())
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim and length-check a board name. Length is counted in characters.
fn validate_name(raw: Option<&str>) -> Result<String, BoardError> {
    let name = raw.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(BoardError::validation("name", "the name field is required"));
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(BoardError::validation(
            "name",
            format!("the name must be between 1 and {MAX_NAME_CHARS} characters (got {chars})"),
        ));
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
