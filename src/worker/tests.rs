//! Lifecycle tests for the worker registry.
//!
//! These drive workers through the registry with a paused clock and observe
//! them only through the mock transport: sensor reads and sent messages.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::test_utils::MockTransport;
use crate::transport::TransportError;
use crate::types::ChatId;

use super::registry::WorkerRegistry;
use super::schedule::WatchConfig;

// ─── Test Helpers ───

const CHAT: ChatId = ChatId(7);
const OTHER_CHAT: ChatId = ChatId(8);

fn registry(transport: &Arc<MockTransport>) -> WorkerRegistry<MockTransport> {
    WorkerRegistry::new(Arc::clone(transport), WatchConfig::new())
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

// ─── Start ───

#[tokio::test(start_paused = true)]
async fn start_registers_worker() {
    let transport = Arc::new(MockTransport::new());
    let registry = registry(&transport);

    assert_eq!(registry.worker_count().await, 0);

    registry.start(CHAT, 800).await;

    assert_eq!(registry.worker_count().await, 1);
    assert!(registry.has_worker(CHAT).await);
    assert_eq!(registry.threshold(CHAT).await, Some(800));
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_worker_with_new_threshold() {
    let transport = Arc::new(MockTransport::new());
    transport.set_fallback_co2(600);
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    registry.start(CHAT, 500).await;

    assert_eq!(registry.worker_count().await, 1);
    assert_eq!(registry.threshold(CHAT).await, Some(500));

    // Two live workers would read the sensor twice. The survivor uses the
    // second threshold, so 600 raises exactly one alert.
    advance(61).await;
    assert_eq!(transport.sensor_reads(), 1);
    assert_eq!(transport.sent_to(CHAT), vec!["Achtung! CO2 is 600!".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn repeated_restarts_leave_one_worker() {
    let transport = Arc::new(MockTransport::new());
    let registry = registry(&transport);

    for threshold in 1..=10 {
        registry.start(CHAT, threshold * 100).await;
    }

    assert_eq!(registry.worker_count().await, 1);

    advance(61).await;
    assert_eq!(transport.sensor_reads(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_starts_for_same_chat_leave_one_worker() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(registry(&transport));

    let handles: Vec<_> = (1..=5)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.start(CHAT, i * 100).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.worker_count().await, 1);

    advance(61).await;
    assert_eq!(transport.sensor_reads(), 1);
}

#[tokio::test(start_paused = true)]
async fn workers_for_different_chats_are_independent() {
    let transport = Arc::new(MockTransport::new());
    transport.set_fallback_co2(900);
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    registry.start(OTHER_CHAT, 1000).await;

    advance(61).await;

    assert_eq!(transport.sensor_reads(), 2);
    assert_eq!(transport.sent_to(CHAT).len(), 1);
    assert!(transport.sent_to(OTHER_CHAT).is_empty());
    assert_eq!(
        registry.monitored().await,
        vec![(CHAT, 800), (OTHER_CHAT, 1000)]
    );
}

// ─── Stop ───

#[tokio::test(start_paused = true)]
async fn stop_removes_worker_immediately() {
    let transport = Arc::new(MockTransport::new());
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    assert!(registry.stop(CHAT).await);

    assert!(!registry.has_worker(CHAT).await);

    // Stopping again is a no-op.
    assert!(!registry.stop(CHAT).await);

    advance(120).await;
    assert_eq!(transport.sensor_reads(), 0);
}

#[tokio::test(start_paused = true)]
async fn forward_after_stop_has_no_effect() {
    let transport = Arc::new(MockTransport::new());
    transport.set_fallback_co2(5000);
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    registry.stop(CHAT).await;

    assert!(!registry.forward(CHAT, "/co2").await);

    advance(600).await;
    assert_eq!(transport.sensor_reads(), 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_does_not_touch_other_chats() {
    let transport = Arc::new(MockTransport::new());
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    registry.start(OTHER_CHAT, 800).await;
    registry.stop(CHAT).await;

    advance(61).await;

    assert!(registry.has_worker(OTHER_CHAT).await);
    assert_eq!(transport.sensor_reads(), 1);
}

// ─── Forward ───

#[tokio::test(start_paused = true)]
async fn forward_without_worker_is_dropped() {
    let transport = Arc::new(MockTransport::new());
    let registry = registry(&transport);

    assert!(!registry.forward(CHAT, "/sleep 15 min").await);
    assert_eq!(registry.worker_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn forwarded_sleep_delays_next_check() {
    let transport = Arc::new(MockTransport::new());
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    assert!(registry.forward(CHAT, "/sleep 30 min").await);

    advance(1799).await;
    assert_eq!(transport.sensor_reads(), 0);

    advance(2).await;
    assert_eq!(transport.sensor_reads(), 1);
}

#[tokio::test(start_paused = true)]
async fn forward_to_dead_worker_unregisters_it() {
    let transport = Arc::new(MockTransport::new());
    transport.push_sensor_error(TransportError::rejected("sensor offline"));
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;

    // The first check fails and ends the worker task.
    advance(61).await;
    assert!(!registry.has_worker(CHAT).await);

    assert!(!registry.forward(CHAT, "/sleep 15 min").await);
    assert!(!registry.has_worker(CHAT).await);
}

#[tokio::test(start_paused = true)]
async fn dead_worker_is_not_reported_as_monitored() {
    let transport = Arc::new(MockTransport::new());
    transport.push_sensor_error(TransportError::rejected("sensor offline"));
    let registry = registry(&transport);

    registry.start(CHAT, 800).await;
    advance(1).await;
    registry.start(OTHER_CHAT, 900).await;

    // CHAT's worker reads first and dies; OTHER_CHAT gets the fallback value.
    advance(61).await;

    assert_eq!(registry.worker_count().await, 1);
    assert_eq!(registry.threshold(CHAT).await, None);
    assert_eq!(registry.monitored().await, vec![(OTHER_CHAT, 900)]);

    // Restarting a dead conversation works as usual.
    registry.start(CHAT, 700).await;
    assert_eq!(registry.monitored().await, vec![(CHAT, 700), (OTHER_CHAT, 900)]);
}

#[tokio::test(start_paused = true)]
async fn full_inbox_does_not_block_other_conversations() {
    let transport = Arc::new(MockTransport::new());
    transport.set_sensor_latency(Duration::from_secs(100_000));
    let registry = Arc::new(registry(&transport));

    registry.start(CHAT, 800).await;
    registry.start(OTHER_CHAT, 800).await;

    // Both workers are now stuck in a sensor read and stop draining.
    advance(61).await;

    for _ in 0..100 {
        assert!(registry.forward(CHAT, "hello").await);
    }

    let blocked = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.forward(CHAT, "hello").await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!blocked.is_finished());

    let stopped = tokio::time::timeout(Duration::from_secs(1), registry.stop(OTHER_CHAT)).await;
    assert_eq!(stopped.ok(), Some(true));

    // Replacing the stuck worker releases the waiting forward without
    // unregistering its replacement.
    registry.start(CHAT, 900).await;
    let forwarded = tokio::time::timeout(Duration::from_secs(1), blocked)
        .await
        .expect("forward should finish once the old worker is gone")
        .unwrap();

    assert!(!forwarded);
    assert!(registry.has_worker(CHAT).await);
    assert_eq!(registry.threshold(CHAT).await, Some(900));
}

// ─── Shutdown ───

#[tokio::test(start_paused = true)]
async fn shutdown_all_stops_every_worker() {
    let transport = Arc::new(MockTransport::new());
    let shutdown = CancellationToken::new();
    let registry =
        WorkerRegistry::new_with_shutdown(Arc::clone(&transport), WatchConfig::new(), shutdown.clone());

    registry.start(CHAT, 800).await;
    registry.start(OTHER_CHAT, 800).await;

    registry.shutdown_all().await;

    assert!(shutdown.is_cancelled());
    assert_eq!(registry.worker_count().await, 0);

    advance(120).await;
    assert_eq!(transport.sensor_reads(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_shutdown_token_stops_workers() {
    let transport = Arc::new(MockTransport::new());
    let shutdown = CancellationToken::new();
    let registry =
        WorkerRegistry::new_with_shutdown(Arc::clone(&transport), WatchConfig::new(), shutdown.clone());

    registry.start(CHAT, 800).await;
    shutdown.cancel();

    advance(1).await;
    assert!(!registry.has_worker(CHAT).await);

    advance(120).await;
    assert_eq!(transport.sensor_reads(), 0);
}
