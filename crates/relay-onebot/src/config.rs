//! Configuration for the OneBot API connection.
//!
//! # Example Configuration
//!
//! ```toml
//! [onebot]
//! url = "ws://127.0.0.1:6700/api"
//! access_token = "${ONEBOT_TOKEN}"
//! api_timeout_secs = 30
//! heartbeat_interval_secs = 30
//! auto_reconnect = true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use relay_core::WsClientConfig;

/// OneBot adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OneBotConfig {
    /// WebSocket API URL of the OneBot implementation.
    pub url: String,

    /// Access token, sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Whether to reconnect after the connection drops.
    pub auto_reconnect: bool,

    /// Consecutive reconnect attempts before giving up (unset = unlimited).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Seconds to wait for an API response.
    pub api_timeout_secs: u64,

    /// Heartbeat interval in seconds (0 to disable).
    pub heartbeat_interval_secs: u64,
}

impl Default for OneBotConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:6700/api".to_string(),
            access_token: None,
            auto_reconnect: true,
            max_retries: None,
            api_timeout_secs: 30,
            heartbeat_interval_secs: 30,
        }
    }
}

impl OneBotConfig {
    /// Returns the API timeout as a duration.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// Builds the transport configuration for the API connection.
    pub fn ws_config(&self) -> WsClientConfig {
        let heartbeat =
            (self.heartbeat_interval_secs > 0).then(|| Duration::from_secs(self.heartbeat_interval_secs));
        let mut config = WsClientConfig::new("onebot", &self.url)
            .with_auto_reconnect(self.auto_reconnect)
            .with_heartbeat(heartbeat);
        if let Some(max) = self.max_retries {
            config = config.with_max_retries(max);
        }

        match self.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => config.with_token(token),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let raw = r#"
url = "ws://localhost:6700/api"
access_token = "secret"
heartbeat_interval_secs = 0
"#;

        let config: OneBotConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.url, "ws://localhost:6700/api");
        assert_eq!(config.api_timeout(), Duration::from_secs(30));
        assert!(config.auto_reconnect);
        assert_eq!(config.max_retries, None);

        let ws = config.ws_config();
        assert_eq!(ws.name, "onebot");
        assert_eq!(ws.heartbeat_interval, None);
        assert_eq!(
            ws.headers,
            vec![("Authorization".to_string(), "Bearer secret".to_string())]
        );
    }

    #[test]
    fn test_empty_token_sends_no_header() {
        let config = OneBotConfig {
            access_token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.ws_config().headers.is_empty());
    }
}
