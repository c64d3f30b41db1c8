use std::time::Duration;

/// Application configuration
/// In debug builds: loads from .env file first
/// In release builds: reads the process environment only
#[derive(Clone, Debug)]
pub struct Config {
    /// Server authority, e.g. "dash.example.org" or "0.0.0.0:8000"
    pub server_host: String,
    /// Whether to use https/wss when talking to the server
    pub secure: bool,
    /// Liveness ping interval for the WebSocket connection
    pub ping_interval: Duration,
    /// Fixed delay before a reconnect attempt
    pub reconnect_delay: Duration,
    /// Grace period a fully completed item stays visible before removal
    pub removal_grace: Duration,
    /// Cooldown window for suppressing repeated notifications
    pub notification_cooldown: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0:8000".to_string(),
            secure: false,
            ping_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(1),
            removal_grace: Duration::from_secs(10),
            notification_cooldown: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration based on build mode
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                tracing::info!("Config: Dev mode activated - loaded .env file");
            }
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("DASH_SERVER_HOST") {
            config.server_host = host;
        }
        if let Ok(secure) = std::env::var("DASH_SECURE") {
            config.secure = secure.to_lowercase() == "true";
        }

        config
    }

    /// HTTP base URL for REST collaborator calls
    pub fn api_url(&self, path: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.server_host, path)
    }

    /// WebSocket URL for the status channel
    pub fn ws_url(&self, path: &str) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}{}", scheme, self.server_host, path)
    }
}
