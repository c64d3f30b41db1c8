// Library exports for integration tests and reusable components

pub mod config;
pub mod enrich;
pub mod mediainfo;
pub mod models;
pub mod notify;
pub mod protocol;
pub mod sync;
pub mod transport;
pub mod upload;

// Test support (only available with test-utils feature)
#[cfg(feature = "test-utils")]
pub mod test_support;

pub use config::Config;
pub use sync::{start_sync, SyncHandle, SyncOptions};
pub use transport::{start_transport, ConnectionState, TransportHandle, TransportOptions};
