//! Configuration types for transport clients.

use std::time::Duration;

/// Configuration for WebSocket client connections.
#[derive(Debug, Clone)]
pub struct WsClientConfig {
    /// Connection name, used in logs.
    pub name: String,
    /// WebSocket server URL.
    pub url: String,
    /// Extra request headers sent with every (re)connect handshake.
    pub headers: Vec<(String, String)>,
    /// Whether to automatically reconnect on disconnect.
    pub auto_reconnect: bool,
    /// Maximum number of consecutive reconnection attempts (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay between reconnection attempts.
    pub initial_delay: Duration,
    /// Maximum delay between reconnection attempts.
    pub max_delay: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// Heartbeat (ping) interval for WebSocket keep-alive.
    pub heartbeat_interval: Option<Duration>,
}

impl Default for WsClientConfig {
    fn default() -> Self {
        Self {
            name: "ws-client".to_string(),
            url: String::new(),
            headers: Vec::new(),
            auto_reconnect: true,
            max_retries: None, // Infinite retries
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            heartbeat_interval: Some(Duration::from_secs(30)),
        }
    }
}

impl WsClientConfig {
    /// Creates a new WebSocket client config with the given name and URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Adds a handshake header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a bearer token in the `Authorization` header.
    pub fn with_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.with_header("Authorization", value)
    }

    /// Enables or disables automatic reconnection.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = Some(max);
        self
    }

    /// Sets the heartbeat interval (None disables pings).
    pub fn with_heartbeat(mut self, interval: Option<Duration>) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Returns the delay that follows `current` in the backoff sequence.
    pub fn next_delay(&self, current: Duration) -> Duration {
        std::cmp::min(
            Duration::from_secs_f64(current.as_secs_f64() * self.backoff_multiplier),
            self.max_delay,
        )
    }
}
