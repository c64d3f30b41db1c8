// End-to-end flow through a real socket: server snapshots drive the item
// collection, notifications pass the dedup window, and user deletes round-
// trip back to the server.

mod support;

use debrid_dash::models::{NotificationKind, NotificationPayload};
use debrid_dash::sync::{start_sync, SyncOptions};
use debrid_dash::test_support::MockServer;
use debrid_dash::transport::{start_transport, ConnectionState, TransportOptions};
use std::time::Duration;

struct Harness {
    server: MockServer,
    transport: debrid_dash::TransportHandle,
    sync: debrid_dash::SyncHandle,
}

async fn start_harness() -> Harness {
    support::tracing_init();
    let server = MockServer::start().await;

    let mut transport_options = TransportOptions::new(server.url());
    transport_options.ping_interval = Duration::from_secs(30);
    transport_options.reconnect_delay = Duration::from_millis(50);
    let (transport, inbound) = start_transport(transport_options);

    let sync_options = SyncOptions {
        removal_grace: Duration::from_millis(200),
        notification_cooldown: Duration::from_secs(5),
    };
    let sync = start_sync(sync_options, transport.clone(), inbound);

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            transport.state() == ConnectionState::Connected
        })
        .await
    );

    Harness {
        server,
        transport,
        sync,
    }
}

#[tokio::test]
async fn snapshots_update_the_item_collection() {
    let h = start_harness().await;

    h.server.push_status(&[support::downloading_item("a", 10)]);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || h.sync.items().len() == 1).await
    );

    // Progress advances; the item record is replaced.
    h.server.push_status(&[support::downloading_item("a", 55)]);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.sync.items().first().map(|i| i.progress) == Some(55)
        })
        .await
    );

    // A snapshot omitting "a" keeps it; new ids are appended.
    h.server.push_status(&[support::downloading_item("b", 5)]);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || h.sync.items().len() == 2).await
    );
    assert!(h.sync.items().iter().any(|i| i.id == "a"));

    h.transport.shutdown().await;
}

#[tokio::test]
async fn delete_round_trips_to_the_server() {
    let h = start_harness().await;

    h.server
        .push_status(&[support::downloading_item("a", 10), support::downloading_item("b", 20)]);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || h.sync.items().len() == 2).await
    );

    h.sync.delete_item("a");

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.sync.items().len() == 1 && h.sync.items()[0].id == "b"
        })
        .await
    );
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.server
                .received()
                .iter()
                .any(|t| t.contains("delete_item") && t.contains("\"a\""))
        })
        .await
    );

    h.transport.shutdown().await;
}

#[tokio::test]
async fn repeated_notification_is_suppressed_inside_the_window() {
    let h = start_harness().await;

    let payload = NotificationPayload {
        kind: NotificationKind::Error,
        title: "Import failed".into(),
        message: "disk full".into(),
    };
    h.server.push_notification(&payload);
    h.server.push_notification(&payload);

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            !h.sync.notifications().is_empty()
        })
        .await
    );
    // Give the duplicate time to arrive, then confirm it never surfaced.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.sync.notifications().len(), 1);

    // A different message is independent.
    h.server.push_notification(&NotificationPayload {
        kind: NotificationKind::Info,
        title: "Mounted".into(),
        message: "ready".into(),
    });
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.sync.notifications().len() == 2
        })
        .await
    );

    h.transport.shutdown().await;
}

#[tokio::test]
async fn dismiss_and_clear_notifications() {
    let h = start_harness().await;

    h.server.push_notification(&NotificationPayload {
        kind: NotificationKind::Warning,
        title: "Slow mirror".into(),
        message: "retrying".into(),
    });
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            !h.sync.notifications().is_empty()
        })
        .await
    );

    let timestamp = h.sync.notifications()[0].timestamp;
    h.sync.dismiss_notification(timestamp);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.sync.notifications().is_empty()
        })
        .await
    );

    h.transport.shutdown().await;
}

#[tokio::test]
async fn state_survives_a_reconnect() {
    let h = start_harness().await;

    h.server.push_status(&[support::downloading_item("a", 10)]);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || h.sync.items().len() == 1).await
    );

    h.server.drop_connections();
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.server.total_connections() == 2
                && h.transport.state() == ConnectionState::Connected
        })
        .await
    );

    // The collection is untouched by the gap; the next snapshot merges in.
    assert_eq!(h.sync.items().len(), 1);
    h.server.push_status(&[support::downloading_item("a", 80)]);
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            h.sync.items().first().map(|i| i.progress) == Some(80)
        })
        .await
    );

    h.transport.shutdown().await;
}
