//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the four board endpoints, the websocket subscription endpoint, and
//! a health probe under a single Axum router.

pub mod boards;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/boards",
            get(boards::list_boards)
                .post(boards::create_board)
                .put(boards::update_boards),
        )
        .route("/api/boards/{id}/cards", post(boards::add_cards))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
