//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the board store, the publisher the board service emits events
//! through, and the hub websocket subscribers attach to. Nothing here is
//! request-scoped; the board service itself keeps no state.

use std::sync::Arc;

use crate::config::BulkUpdateMode;
use crate::notify::{BroadcastHub, Publisher};
use crate::store::BoardStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BoardStore>,
    /// Where board events go. Normally the same hub as `hub`.
    pub publisher: Arc<dyn Publisher>,
    /// Subscription side of the notification channel.
    pub hub: BroadcastHub,
    pub bulk_update_mode: BulkUpdateMode,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn BoardStore>, hub: BroadcastHub, bulk_update_mode: BulkUpdateMode) -> Self {
        Self { store, publisher: Arc::new(hub.clone()), hub, bulk_update_mode }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::BOARDS_CHANNEL;

    #[tokio::test]
    async fn new_state_publishes_through_its_hub() {
        let state = test_helpers::test_app_state();
        let mut rx = state.hub.subscribe();

        state.publisher.publish(BOARDS_CHANNEL, "ping", serde_json::json!({}));

        let received = rx.try_recv().expect("hub should receive publisher output");
        assert_eq!(received.event, "ping");
    }

    #[tokio::test]
    async fn recording_state_keeps_hub_quiet() {
        let (state, recorder) = test_helpers::test_app_state_recording(BulkUpdateMode::Atomic);
        let mut rx = state.hub.subscribe();

        state.publisher.publish(BOARDS_CHANNEL, "ping", serde_json::json!({}));

        assert_eq!(recorder.events().len(), 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(state.bulk_update_mode, BulkUpdateMode::Atomic);
    }
}
