mod config;
mod db;
mod notify;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use store::{BoardStore, MemoryBoardStore, PgBoardStore};

#[tokio::main]
async fn main() {
    // A missing .env is the normal case outside local development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let store: Arc<dyn BoardStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::init_pool(database_url, config.db_max_connections)
                .await
                .expect("database init failed");
            tracing::info!(max_connections = config.db_max_connections, "board store: postgres");
            Arc::new(PgBoardStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory board store (boards are lost on restart)");
            Arc::new(MemoryBoardStore::new())
        }
    };

    let hub = notify::BroadcastHub::new(config.notify_channel_capacity);
    let state = state::AppState::new(store, hub, config.bulk_update_mode);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(
        %port,
        bulk_update_mode = config.bulk_update_mode.as_str(),
        notify_channel_capacity = config.notify_channel_capacity,
        "kanboard listening"
    );
    axum::serve(listener, app).await.expect("server failed");
}
