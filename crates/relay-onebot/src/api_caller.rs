//! Echo-matched API calls over a OneBot WebSocket connection.
//!
//! Each [`call`](WsApiCaller::call):
//! 1. Generates a unique numeric echo ID.
//! 2. Registers a one-shot channel keyed on that ID in the pending map.
//! 3. Queues the JSON request (with the `echo` field) on the connection.
//! 4. Awaits the one-shot receiver, which is resolved by
//!    [`on_incoming_response`](WsApiCaller::on_incoming_response) when the
//!    matching response arrives from the peer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, warn};

use relay_core::{ApiError, ApiResult, ConnectionHandle};

/// API caller bound to one live WebSocket connection.
pub struct WsApiCaller {
    /// Connection whose outgoing queue carries the requests.
    connection: ConnectionHandle,
    /// Pending call map: echo_id → sender half of the response channel.
    pending_calls: Mutex<HashMap<u64, oneshot::Sender<Value>>>,
    /// Monotonically increasing echo counter.
    echo_counter: AtomicU64,
    /// How long to wait for a response before giving up.
    api_timeout: Duration,
}

impl WsApiCaller {
    /// Creates a caller for the given connection.
    pub fn new(connection: ConnectionHandle, api_timeout: Duration) -> Self {
        Self {
            connection,
            pending_calls: Mutex::new(HashMap::new()),
            echo_counter: AtomicU64::new(1),
            api_timeout,
        }
    }

    /// Makes an API call and returns the raw response envelope.
    pub async fn call(&self, action: &str, params: Value) -> ApiResult<Value> {
        let echo = self.echo_counter.fetch_add(1, Ordering::SeqCst);

        // Register before sending so a fast response is never missed.
        let (tx, rx) = oneshot::channel();
        self.pending_calls.lock().insert(echo, tx);

        let request = json!({
            "action": action,
            "params": params,
            "echo": echo
        });

        debug!(action = %action, echo = %echo, "Calling OneBot API via WebSocket");

        if let Err(e) = self.connection.send_json(&request).await {
            self.pending_calls.lock().remove(&echo);
            return Err(e.into());
        }

        match timeout(self.api_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            // Sender dropped: the connection went away.
            Ok(Err(_)) => Err(ApiError::NotConnected),
            Err(_) => {
                self.pending_calls.lock().remove(&echo);
                Err(ApiError::Timeout)
            }
        }
    }

    /// Routes an incoming message carrying an `echo` field to its waiter.
    ///
    /// Returns `true` if the message was consumed as an API response.
    pub fn on_incoming_response(&self, data: &Value) -> bool {
        let Some(echo) = data.get("echo").and_then(Value::as_u64) else {
            return false;
        };
        if let Some(tx) = self.pending_calls.lock().remove(&echo) {
            let _ = tx.send(data.clone());
            true
        } else {
            warn!(echo = %echo, "Received WS API response for unknown echo (timed out?)");
            false
        }
    }

    /// Fails every pending call with [`ApiError::NotConnected`].
    pub fn on_disconnect(&self) {
        let mut pending = self.pending_calls.lock();
        let count = pending.len();
        if count > 0 {
            debug!(count = count, "Clearing pending WS API calls due to disconnect");
            pending.clear();
        }
    }

    /// Returns the number of calls awaiting a response.
    pub fn pending_call_count(&self) -> usize {
        self.pending_calls.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::{mpsc, watch};

    fn caller(api_timeout: Duration) -> (Arc<WsApiCaller>, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(8);
        let (shutdown_tx, _) = watch::channel(false);
        let handle = ConnectionHandle::new("api", tx, shutdown_tx);
        (Arc::new(WsApiCaller::new(handle, api_timeout)), rx)
    }

    #[tokio::test]
    async fn test_call_resolves_on_matching_echo() {
        let (caller, mut rx) = caller(Duration::from_secs(5));

        let responder = {
            let caller = caller.clone();
            tokio::spawn(async move {
                let request: Value = serde_json::from_slice(&rx.recv().await.unwrap()).unwrap();
                assert_eq!(request["action"], "send_group_msg");
                let echo = request["echo"].clone();
                assert!(caller.on_incoming_response(&json!({
                    "status": "ok", "retcode": 0, "data": {"message_id": 7}, "echo": echo
                })));
            })
        };

        let response = caller
            .call("send_group_msg", json!({"group_id": 1}))
            .await
            .unwrap();
        responder.await.unwrap();

        assert_eq!(response["data"]["message_id"], 7);
        assert_eq!(caller.pending_call_count(), 0);
    }

    #[tokio::test]
    async fn test_call_times_out_and_cleans_up() {
        let (caller, _rx) = caller(Duration::from_millis(20));

        let err = caller.call("get_status", json!({})).await.unwrap_err();

        assert!(matches!(err, ApiError::Timeout));
        assert_eq!(caller.pending_call_count(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_fails_pending_calls() {
        let (caller, mut rx) = caller(Duration::from_secs(5));

        let pending = {
            let caller = caller.clone();
            tokio::spawn(async move { caller.call("get_status", json!({})).await })
        };
        rx.recv().await.unwrap();
        caller.on_disconnect();

        assert!(matches!(
            pending.await.unwrap(),
            Err(ApiError::NotConnected)
        ));
    }

    #[test]
    fn test_unknown_echo_is_not_consumed() {
        let (caller, _rx) = caller(Duration::from_secs(1));
        assert!(!caller.on_incoming_response(&json!({"echo": 99})));
        assert!(!caller.on_incoming_response(&json!({"post_type": "meta_event"})));
    }
}
