//! OneBot v11 Bot implementation.
//!
//! [`OneBotBot`] is the relay's outbound messaging client. It owns the API
//! caller of the current WebSocket connection (if any) and implements
//! [`Messenger`]: it is ready exactly while an API connection is attached.
//!
//! # Usage
//!
//! ```rust,ignore
//! use relay_onebot::{OneBotBot, OneBotMessage};
//!
//! let bot = OneBotBot::new(Duration::from_secs(30));
//! // ... after the adapter attached a connection:
//! let message = OneBotMessage::new().text("Hello!");
//! bot.send_group_msg(12345678, &message.to_cq_string()).await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tracing::{debug, info, trace};

use crate::api_caller::WsApiCaller;
use relay_core::{ApiError, ApiResult, ConnectionHandle, Messenger};

/// A OneBot v11 Bot.
pub struct OneBotBot {
    /// API caller of the live connection, None while disconnected.
    api: RwLock<Option<Arc<WsApiCaller>>>,
    /// Mirrors `api.is_some()` for lock-free readiness checks.
    connected: AtomicBool,
    /// API call timeout duration.
    api_timeout: Duration,
}

impl OneBotBot {
    /// Creates a disconnected bot.
    pub fn new(api_timeout: Duration) -> Self {
        Self {
            api: RwLock::new(None),
            connected: AtomicBool::new(false),
            api_timeout,
        }
    }

    /// Binds the bot to a freshly established connection.
    pub fn attach(&self, connection: ConnectionHandle) {
        info!(conn = %connection.name, "OneBot API connection attached");
        let caller = Arc::new(WsApiCaller::new(connection, self.api_timeout));
        let previous = self.api.write().replace(caller);
        self.connected.store(true, Ordering::Release);
        if let Some(previous) = previous {
            previous.on_disconnect();
        }
    }

    /// Unbinds the current connection and fails its pending calls.
    pub fn detach(&self) {
        let caller = self.api.write().take();
        self.connected.store(false, Ordering::Release);
        if let Some(caller) = caller {
            caller.on_disconnect();
            info!("OneBot API connection detached");
        }
    }

    /// Routes an incoming API response to the waiting call.
    pub fn handle_response(&self, response: &Value) -> bool {
        let caller = self.api.read().clone();
        caller.is_some_and(|caller| caller.on_incoming_response(response))
    }

    /// Calls an API action and returns its `data` field.
    pub async fn call_api(&self, action: &str, params: Value) -> ApiResult<Value> {
        let caller = self.api.read().clone().ok_or(ApiError::NotConnected)?;

        let response = caller.call(action, params).await?;
        trace!(response = %response, "API response");

        if let Some(retcode) = response.get("retcode").and_then(Value::as_i64)
            && retcode != 0
        {
            let message = response
                .get("message")
                .or_else(|| response.get("wording"))
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            return Err(ApiError::ApiError { retcode, message });
        }

        Ok(response.get("data").cloned().unwrap_or(response))
    }

    /// Sends a CQ-coded message to a group.
    ///
    /// `auto_escape` is always false so the CQ codes are interpreted.
    pub async fn send_group_msg(&self, group_id: i64, message: &str) -> ApiResult<i64> {
        debug!(group_id = group_id, "Sending group message");
        let data = self
            .call_api(
                "send_group_msg",
                json!({
                    "group_id": group_id,
                    "message": message,
                    "auto_escape": false,
                }),
            )
            .await?;

        data.get("message_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ApiError::SerializationError("Missing message_id".to_string()))
    }
}

#[async_trait]
impl Messenger for OneBotBot {
    fn is_ready(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn send_group_msg(&self, group_id: i64, message: &str) -> ApiResult<i64> {
        OneBotBot::send_group_msg(self, group_id, message).await
    }
}
