//! Notification publisher: named events fanned out on a shared channel.
//!
//! ARCHITECTURE
//! ============
//! The board service depends only on [`Publisher`]. [`BroadcastHub`] is the
//! in-process implementation: a bounded tokio `broadcast` channel that every
//! websocket subscriber holds a receiver for.
//!
//! DELIVERY
//! ========
//! Publishing never blocks and never fails the caller. With no subscribers
//! the notification is dropped; subscribers that fall more than the channel
//! capacity behind lose the oldest notifications.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

// =============================================================================
// CHANNEL + EVENT NAMES
// =============================================================================

/// The single shared topic board events are published on.
pub const BOARDS_CHANNEL: &str = "boards";

/// A board was created. Payload `{board}`.
pub const EVENT_BOARD_CREATED: &str = "board.created";

/// A board's cards were replaced. Payload `{board}`.
pub const EVENT_CARD_CREATED: &str = "card.created";

/// Boards were bulk-updated. Payload `{boards}`, the full current list.
/// Subscribers see the literal name `updated`.
pub const EVENT_BOARDS_UPDATED: &str = "updated";

// =============================================================================
// TYPES
// =============================================================================

/// Wire envelope delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: String,
    pub event: String,
    pub data: Value,
    /// Milliseconds since Unix epoch at publish time.
    pub ts: i64,
}

impl Notification {
    pub fn new(channel: impl Into<String>, event: impl Into<String>, data: Value) -> Self {
        Self { channel: channel.into(), event: event.into(), data, ts: now_ms() }
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Fire-and-forget event sink.
pub trait Publisher: Send + Sync {
    fn publish(&self, channel: &str, event: &str, payload: Value);
}

// =============================================================================
// BROADCAST HUB
// =============================================================================

/// In-process pub/sub relay backed by a tokio broadcast channel.
#[derive(Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastHub {
    /// `capacity` is clamped to at least 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Receive every notification published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Publisher for BroadcastHub {
    fn publish(&self, channel: &str, event: &str, payload: Value) {
        match self.tx.send(Notification::new(channel, event, payload)) {
            Ok(receivers) => debug!(channel, event, receivers, "notification published"),
            Err(_) => debug!(channel, event, "no subscribers; notification dropped"),
        }
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
