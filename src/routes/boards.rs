//! Board routes: thin adapters from HTTP to the board service.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::services::board::{self, BoardError};
use crate::state::AppState;
use crate::store::{Board, BoardId, BoardPatch};

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

#[derive(Deserialize)]
pub struct CreateBoardBody {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct AddCardsBody {
    #[serde(default)]
    pub cards: Option<Vec<Value>>,
}

#[derive(Deserialize)]
pub struct UpdateBoardsBody {
    #[serde(default)]
    pub boards: Option<Vec<BoardPatch>>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct CreateBoardResponse {
    pub status: &'static str,
    pub board: Board,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

pub(crate) fn board_error_to_status(err: &BoardError) -> StatusCode {
    match err {
        BoardError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = board_error_to_status(&self);
        if status.is_server_error() {
            error!(error = %self, "board request failed");
        }
        let (message, field) = match &self {
            BoardError::Validation { field, message } => (message.clone(), Some(*field)),
            other => (other.to_string(), None),
        };
        let body = ErrorResponse { status: STATUS_ERROR, code: self.error_code(), message, field };
        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, reporting extractor failures as a validation error
/// on `field` so clients always get the error envelope.
fn json_body<T>(body: Result<Json<T>, JsonRejection>, field: &'static str) -> Result<T, BoardError> {
    body.map(|Json(value)| value).map_err(|rejection| BoardError::Validation {
        field,
        message: rejection.body_text(),
    })
}

/// A board id that does not parse names no board.
fn unknown_board_path(rejection: &PathRejection) -> Response {
    let body = ErrorResponse {
        status: STATUS_ERROR,
        code: "E_BOARD_NOT_FOUND",
        message: rejection.body_text(),
        field: None,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// `GET /api/boards`: every board.
pub async fn list_boards(State(state): State<AppState>) -> Result<Json<Vec<Board>>, BoardError> {
    Ok(Json(board::list_boards(&state).await?))
}

/// `POST /api/boards`: create a board.
pub async fn create_board(
    State(state): State<AppState>,
    body: Result<Json<CreateBoardBody>, JsonRejection>,
) -> Result<Json<CreateBoardResponse>, BoardError> {
    let body = json_body(body, "name")?;
    let board = board::create_board(&state, body.name.as_deref()).await?;
    Ok(Json(CreateBoardResponse { status: STATUS_SUCCESS, board }))
}

/// `PUT /api/boards`: bulk partial update.
pub async fn update_boards(
    State(state): State<AppState>,
    body: Result<Json<UpdateBoardsBody>, JsonRejection>,
) -> Result<Json<StatusResponse>, BoardError> {
    let body = json_body(body, "boards")?;
    board::bulk_update_boards(&state, body.boards).await?;
    Ok(Json(StatusResponse { status: STATUS_SUCCESS }))
}

/// `POST /api/boards/:id/cards`: replace a board's cards.
pub async fn add_cards(
    State(state): State<AppState>,
    board_id: Result<Path<BoardId>, PathRejection>,
    body: Result<Json<AddCardsBody>, JsonRejection>,
) -> Result<Json<StatusResponse>, Response> {
    let Path(board_id) = board_id.map_err(|rejection| unknown_board_path(&rejection))?;
    let body = json_body(body, "cards").map_err(IntoResponse::into_response)?;
    board::add_cards(&state, board_id, body.cards)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(StatusResponse { status: STATUS_SUCCESS }))
}

#[cfg(test)]
#[path = "boards_test.rs"]
mod tests;
