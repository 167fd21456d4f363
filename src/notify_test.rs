use super::*;
use serde_json::json;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::time::{Duration, timeout};

async fn recv(rx: &mut broadcast::Receiver<Notification>) -> Notification {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("notification receive timed out")
        .expect("hub closed")
}

#[tokio::test]
async fn publish_reaches_every_subscriber() {
    let hub = BroadcastHub::new(8);
    let mut rx_a = hub.subscribe();
    let mut rx_b = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);

    hub.publish(BOARDS_CHANNEL, EVENT_BOARD_CREATED, json!({"board": {"id": 1}}));

    let a = recv(&mut rx_a).await;
    let b = recv(&mut rx_b).await;
    assert_eq!(a.channel, "boards");
    assert_eq!(a.event, "board.created");
    assert_eq!(a.data, json!({"board": {"id": 1}}));
    assert_eq!(a, b);
}

#[test]
fn publish_without_subscribers_is_noop() {
    let hub = BroadcastHub::new(8);
    hub.publish(BOARDS_CHANNEL, EVENT_BOARDS_UPDATED, json!({"boards": []}));
    assert_eq!(hub.subscriber_count(), 0);
}

#[test]
fn late_subscriber_misses_earlier_notifications() {
    let hub = BroadcastHub::new(8);
    hub.publish(BOARDS_CHANNEL, EVENT_CARD_CREATED, json!({}));
    let mut rx = hub.subscribe();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn slow_subscriber_lags_instead_of_blocking_publisher() {
    let hub = BroadcastHub::new(2);
    let mut rx = hub.subscribe();

    for n in 0..5 {
        hub.publish(BOARDS_CHANNEL, EVENT_CARD_CREATED, json!({"n": n}));
    }

    assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
    assert_eq!(recv(&mut rx).await.data, json!({"n": 3}));
    assert_eq!(recv(&mut rx).await.data, json!({"n": 4}));
}

#[test]
fn zero_capacity_is_clamped() {
    let hub = BroadcastHub::new(0);
    let mut rx = hub.subscribe();
    hub.publish(BOARDS_CHANNEL, EVENT_CARD_CREATED, json!({}));
    assert!(rx.try_recv().is_ok());
}

#[test]
fn envelope_serializes_with_channel_event_data_ts() {
    let notification = Notification::new(BOARDS_CHANNEL, EVENT_BOARDS_UPDATED, json!({"boards": []}));
    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value["channel"], "boards");
    assert_eq!(value["event"], "updated");
    assert_eq!(value["data"], json!({"boards": []}));
    assert!(value["ts"].as_i64().unwrap() > 0);
}
