//! Configuration of the retweet source.
//!
//! ```toml
//! [retweet]
//! name = "retweet"
//! version = "1.0.0"
//! url = "wss://push.example.com/ws"
//! secret = "shared-secret"
//! module = "weibo"
//! image_root = "https://img.example.com/"
//!
//! [[retweet.broadcast]]
//! account = "1001"
//! accounts = ["1002"]
//! group_nums = [10, 20]
//! ```

use serde::{Deserialize, Serialize};

use relay_core::WsClientConfig;

use crate::routing::BroadcastRule;

/// Handshake header carrying the shared secret.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Retweet source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetweetConfig {
    /// Plugin name, used in log records.
    pub name: String,
    /// Plugin version, used in log records.
    pub version: String,
    /// WebSocket URL of the event stream.
    pub url: String,
    /// Shared secret sent in the handshake.
    pub secret: String,
    /// Module tag of the envelopes this relay consumes.
    pub module: String,
    /// Prefix joined with every image and avatar reference.
    pub image_root: String,
    /// Whether to reconnect after the stream drops.
    pub auto_reconnect: bool,
    /// Heartbeat interval in seconds (0 to disable).
    pub heartbeat_interval_secs: u64,
    /// Broadcast rules, in declaration order.
    pub broadcast: Vec<BroadcastRule>,
}

impl Default for RetweetConfig {
    fn default() -> Self {
        Self {
            name: "retweet".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            url: String::new(),
            secret: String::new(),
            module: String::new(),
            image_root: String::new(),
            auto_reconnect: true,
            heartbeat_interval_secs: 30,
            broadcast: Vec::new(),
        }
    }
}

impl RetweetConfig {
    /// Returns the `name@version` tag attached to relay logs.
    pub fn plugin_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Builds the transport configuration for the event stream.
    pub fn ws_config(&self) -> WsClientConfig {
        let heartbeat = (self.heartbeat_interval_secs > 0)
            .then(|| std::time::Duration::from_secs(self.heartbeat_interval_secs));
        WsClientConfig::new("retweet", &self.url)
            .with_header(ACCESS_TOKEN_HEADER, &self.secret)
            .with_auto_reconnect(self.auto_reconnect)
            .with_heartbeat(heartbeat)
    }
}
