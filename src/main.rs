use debrid_dash::mediainfo::RuleSet;
use debrid_dash::sync::{start_sync, SyncOptions};
use debrid_dash::transport::{start_transport, TransportOptions};
use debrid_dash::Config;
use tracing::info;

#[tokio::main]
async fn main() {
    // Use RUST_LOG env var if set, otherwise default to info level
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let config = Config::load();
    info!("Connecting to {}", config.server_host);

    let mut transport_options = TransportOptions::new(config.ws_url("/ws"));
    transport_options.ping_interval = config.ping_interval;
    transport_options.reconnect_delay = config.reconnect_delay;

    let (transport, inbound_rx) = start_transport(transport_options);

    let sync_options = SyncOptions {
        removal_grace: config.removal_grace,
        notification_cooldown: config.notification_cooldown,
    };
    let sync = start_sync(sync_options, transport.clone(), inbound_rx);

    let rules = RuleSet::standard();
    let mut state_rx = transport.state_stream();
    let mut items_rx = sync.items_stream();
    let mut notifications_rx = sync.notifications_stream();

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                info!("Connection state: {:?}", *state_rx.borrow());
            }
            changed = items_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let items = items_rx.borrow().clone();
                info!("Tracking {} items", items.len());
                for item in &items {
                    let tags = rules.classify(&item.file_info.name);
                    info!(
                        "  {} [{}%] {} {:?}",
                        item.display_title(),
                        item.progress,
                        item.status.status,
                        tags.combined_format
                    );
                }
            }
            changed = notifications_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(latest) = notifications_rx.borrow().last() {
                    info!("[{}] {}: {}", latest.kind.as_str(), latest.title, latest.message);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                transport.shutdown().await;
                break;
            }
        }
    }
}
