//! Connection handler for the OneBot API link.
//!
//! The adapter wires transport callbacks to a [`OneBotBot`]: a connect
//! attaches the connection (the bot becomes ready), a disconnect detaches it,
//! and incoming frames carrying an `echo` are routed to pending API calls.
//! Events pushed by the OneBot implementation are not used by the relay and
//! are only traced.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::bot::OneBotBot;
use relay_core::{ConnectionHandle, ConnectionHandler, ConnectionInfo, TransportError};

/// Transport callbacks for the OneBot API connection.
pub struct OneBotAdapter {
    bot: Arc<OneBotBot>,
}

impl OneBotAdapter {
    /// Creates an adapter driving the given bot.
    pub fn new(bot: Arc<OneBotBot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ConnectionHandler for OneBotAdapter {
    async fn on_connect(&self, info: ConnectionInfo, handle: ConnectionHandle) {
        debug!(conn = %info.name, protocol = %info.protocol, "OneBot connection established");
        self.bot.attach(handle);
    }

    async fn on_message(&self, data: &[u8]) {
        let value: Value = match serde_json::from_slice(data) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Discarding malformed OneBot frame");
                return;
            }
        };

        if value.get("echo").is_some() {
            self.bot.handle_response(&value);
            return;
        }

        match value.get("post_type").and_then(Value::as_str) {
            Some("meta_event") => trace!("OneBot meta event"),
            Some(post_type) => trace!(post_type = %post_type, "Ignoring OneBot event"),
            None => debug!("Ignoring OneBot frame without post_type"),
        }
    }

    async fn on_disconnect(&self) {
        warn!("OneBot connection lost");
        self.bot.detach();
    }

    async fn on_error(&self, error: &TransportError) {
        error!(error = %error, "OneBot connection error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::Messenger;
    use std::time::Duration;
    use tokio::sync::{mpsc, watch};

    #[tokio::test]
    async fn test_readiness_follows_connection() {
        let bot = Arc::new(OneBotBot::new(Duration::from_secs(1)));
        let adapter = OneBotAdapter::new(bot.clone());
        assert!(!bot.is_ready());

        let (tx, _rx) = mpsc::channel(1);
        let (shutdown_tx, _) = watch::channel(false);
        adapter
            .on_connect(
                ConnectionInfo::new("onebot", "websocket"),
                ConnectionHandle::new("onebot", tx, shutdown_tx),
            )
            .await;
        assert!(bot.is_ready());

        adapter.on_disconnect().await;
        assert!(!bot.is_ready());
    }

    #[tokio::test]
    async fn test_events_and_garbage_are_ignored() {
        let bot = Arc::new(OneBotBot::new(Duration::from_secs(1)));
        let adapter = OneBotAdapter::new(bot.clone());

        adapter.on_message(b"not json").await;
        adapter
            .on_message(br#"{"post_type":"meta_event","meta_event_type":"heartbeat"}"#)
            .await;
        adapter.on_message(br#"{"echo":1,"retcode":0}"#).await;

        assert!(!bot.is_ready());
    }
}
