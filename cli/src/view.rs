//! Local board list kept in sync with the `boards` notification channel.
//!
//! DESIGN
//! ======
//! `boards` is what the user sees and edits. `shadow` is the last state the
//! server confirmed, keyed by id. Local edits only touch `boards`; `dirty`
//! diffs the two so a push sends just the boards and fields that changed.
//! Every applied notification is server truth and re-clones the shadow.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BOARDS_CHANNEL: &str = "boards";
pub const EVENT_BOARD_CREATED: &str = "board.created";
pub const EVENT_CARD_CREATED: &str = "card.created";
pub const EVENT_BOARDS_UPDATED: &str = "updated";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Value>,
}

/// One entry of a bulk update body. Only changed fields are serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardPatch {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Value>>,
}

/// Envelope received from `/api/ws`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Notification {
    pub channel: String,
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub ts: i64,
}

/// What an applied notification did to the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Created(i64),
    CardsReplaced(i64),
    Replaced(usize),
    Ignored,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("notification `{event}` is missing `{field}`")]
    MissingField { event: String, field: &'static str },
    #[error("notification payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default)]
pub struct BoardsView {
    boards: Vec<Board>,
    shadow: BTreeMap<i64, Board>,
}

// =============================================================================
// VIEW
// =============================================================================

impl BoardsView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh server snapshot.
    pub fn load(&mut self, boards: Vec<Board>) {
        self.boards = boards;
        self.mark_synced();
    }

    #[must_use]
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Fold one server notification into the view.
    ///
    /// # Errors
    ///
    /// Returns an error when a known event carries a payload that does not
    /// decode. Unknown events and other channels are ignored.
    pub fn apply(&mut self, notification: &Notification) -> Result<Change, ViewError> {
        if notification.channel != BOARDS_CHANNEL {
            return Ok(Change::Ignored);
        }
        let change = match notification.event.as_str() {
            EVENT_BOARD_CREATED => {
                let board: Board = payload_field(notification, "board")?;
                let id = board.id;
                match self.boards.iter_mut().find(|b| b.id == id) {
                    Some(existing) => *existing = board,
                    None => self.boards.push(board),
                }
                Change::Created(id)
            }
            EVENT_CARD_CREATED => {
                let board: Board = payload_field(notification, "board")?;
                let id = board.id;
                match self.boards.iter_mut().find(|b| b.id == id) {
                    Some(existing) => existing.cards = board.cards,
                    None => self.boards.push(board),
                }
                Change::CardsReplaced(id)
            }
            EVENT_BOARDS_UPDATED => {
                let boards: Vec<Board> = payload_field(notification, "boards")?;
                let count = boards.len();
                self.boards = boards;
                Change::Replaced(count)
            }
            _ => return Ok(Change::Ignored),
        };

        self.mark_synced();
        Ok(change)
    }

    /// Rename locally. Returns false if the board is not in the view.
    pub fn set_name(&mut self, id: i64, name: impl Into<String>) -> bool {
        let Some(board) = self.board_mut(id) else {
            return false;
        };
        board.name = name.into();
        true
    }

    /// Replace the card list locally. Returns false if the board is not in the view.
    pub fn set_cards(&mut self, id: i64, cards: Vec<Value>) -> bool {
        let Some(board) = self.board_mut(id) else {
            return false;
        };
        board.cards = cards;
        true
    }

    pub fn push_card(&mut self, id: i64, card: Value) -> bool {
        let Some(board) = self.board_mut(id) else {
            return false;
        };
        board.cards.push(card);
        true
    }

    /// Boards edited since the last sync, carrying only the changed fields.
    #[must_use]
    pub fn dirty(&self) -> Vec<BoardPatch> {
        self.boards
            .iter()
            .filter_map(|board| {
                let Some(shadow) = self.shadow.get(&board.id) else {
                    return Some(BoardPatch {
                        id: board.id,
                        name: Some(board.name.clone()),
                        cards: Some(board.cards.clone()),
                    });
                };
                let name = (board.name != shadow.name).then(|| board.name.clone());
                let cards = (board.cards != shadow.cards).then(|| board.cards.clone());
                if name.is_none() && cards.is_none() {
                    return None;
                }
                Some(BoardPatch { id: board.id, name, cards })
            })
            .collect()
    }

    /// Accept the current list as server state.
    pub fn mark_synced(&mut self) {
        self.shadow = self.boards.iter().map(|b| (b.id, b.clone())).collect();
    }

    fn board_mut(&mut self, id: i64) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == id)
    }
}

fn payload_field<T: serde::de::DeserializeOwned>(
    notification: &Notification,
    field: &'static str,
) -> Result<T, ViewError> {
    let value = notification
        .data
        .get(field)
        .cloned()
        .ok_or_else(|| ViewError::MissingField {
            event: notification.event.clone(),
            field,
        })?;
    Ok(serde_json::from_value(value)?)
}
