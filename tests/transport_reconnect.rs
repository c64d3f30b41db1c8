// Transport behavior against a real (in-process) WebSocket server:
// connection lifecycle, keep-alive pings, reconnect after a dropped
// socket, and clean shutdown.

mod support;

use debrid_dash::protocol::ClientMessage;
use debrid_dash::test_support::MockServer;
use debrid_dash::transport::{start_transport, ConnectionState, TransportOptions};
use std::time::Duration;

fn fast_options(url: String) -> TransportOptions {
    let mut options = TransportOptions::new(url);
    options.ping_interval = Duration::from_millis(100);
    options.reconnect_delay = Duration::from_millis(50);
    options
}

#[tokio::test]
async fn connects_and_reports_connected_state() {
    support::tracing_init();
    let server = MockServer::start().await;
    let (transport, _inbound) = start_transport(fast_options(server.url()));

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            transport.state() == ConnectionState::Connected
        })
        .await
    );
    assert_eq!(server.active_connections(), 1);

    transport.shutdown().await;
}

#[tokio::test]
async fn reconnects_after_server_drops_the_socket() {
    support::tracing_init();
    let server = MockServer::start().await;
    let (transport, _inbound) = start_transport(fast_options(server.url()));

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            transport.state() == ConnectionState::Connected
        })
        .await
    );

    server.drop_connections();

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            server.total_connections() == 2 && transport.state() == ConnectionState::Connected
        })
        .await
    );
    // One logical connection at a time, even across reconnects.
    assert_eq!(server.active_connections(), 1);

    transport.shutdown().await;
}

#[tokio::test]
async fn sends_periodic_pings_on_a_single_timer() {
    support::tracing_init();
    let server = MockServer::start().await;
    let (transport, _inbound) = start_transport(fast_options(server.url()));

    let ping_count =
        || server.received().iter().filter(|t| t.contains("ping")).count();

    assert!(MockServer::wait_until(Duration::from_secs(2), || ping_count() >= 2).await);

    // Force a reconnect, then let a few more ping periods pass. A leaked
    // second timer would roughly double the rate.
    server.drop_connections();
    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            server.total_connections() == 2 && transport.state() == ConnectionState::Connected
        })
        .await
    );

    let before = ping_count();
    tokio::time::sleep(Duration::from_millis(350)).await;
    let after = ping_count();
    assert!(after > before, "pings stopped after reconnect");
    assert!(
        after - before <= 5,
        "too many pings after reconnect: {}",
        after - before
    );

    transport.shutdown().await;
}

#[tokio::test]
async fn outbound_messages_reach_the_server() {
    support::tracing_init();
    let server = MockServer::start().await;
    let (transport, _inbound) = start_transport(fast_options(server.url()));

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            transport.state() == ConnectionState::Connected
        })
        .await
    );

    transport.send(ClientMessage::DeleteItem {
        item_id: "job-1".into(),
    });

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            server
                .received()
                .iter()
                .any(|t| t.contains("delete_item") && t.contains("job-1"))
        })
        .await
    );

    transport.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_the_socket_and_silences_inbound() {
    support::tracing_init();
    let server = MockServer::start().await;
    let (transport, mut inbound) = start_transport(fast_options(server.url()));

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            transport.state() == ConnectionState::Connected
        })
        .await
    );

    transport.shutdown().await;
    assert_eq!(transport.state(), ConnectionState::Closed);

    assert!(
        MockServer::wait_until(Duration::from_secs(2), || {
            server.active_connections() == 0
        })
        .await
    );

    // Frames pushed after shutdown must never surface.
    server.push_status(&[support::downloading_item("late", 10)]);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(inbound.try_recv().is_err());

    // Sends after shutdown are silent no-ops.
    transport.send(ClientMessage::Ping);
}

#[tokio::test]
async fn send_without_a_connection_is_a_noop() {
    support::tracing_init();
    // Nothing is listening on this port.
    let (transport, _inbound) =
        start_transport(fast_options("ws://127.0.0.1:9/ws".to_string()));

    transport.send(ClientMessage::Ping);
    assert_ne!(transport.state(), ConnectionState::Connected);

    transport.shutdown().await;
    assert_eq!(transport.state(), ConnectionState::Closed);
}
