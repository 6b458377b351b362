//! Connection handling and lifecycle types.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{TransportError, TransportResult};

// =============================================================================
// Connection Handler
// =============================================================================

/// Callbacks for a persistent connection.
///
/// The transport invokes `on_message` for one frame at a time and waits for
/// it to finish before reading the next frame, so implementations observe
/// frames in arrival order.
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    /// Called every time a connection is (re-)established.
    async fn on_connect(&self, info: ConnectionInfo, handle: ConnectionHandle);

    /// Called when a data frame is received.
    async fn on_message(&self, data: &[u8]);

    /// Called when the connection is lost or closed.
    async fn on_disconnect(&self) {}

    /// Called when the transport reports an error.
    async fn on_error(&self, error: &TransportError);
}

/// Information about a connection.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Name of the connection, used in logs.
    pub name: String,
    /// Connection protocol (ws, http, etc.).
    pub protocol: String,
    /// Additional metadata.
    pub metadata: HashMap<String, String>,
}

impl ConnectionInfo {
    /// Creates new connection info.
    pub fn new(name: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protocol: protocol.into(),
            metadata: HashMap::new(),
        }
    }

    /// Adds metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Handle to a client connection.
///
/// Cloning is cheap; all clones feed the same outgoing queue. The queue
/// survives reconnects.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Connection name.
    pub name: String,
    /// Sender for outgoing messages.
    message_tx: tokio::sync::mpsc::Sender<Vec<u8>>,
    /// Shutdown signal sender.
    shutdown_tx: Arc<tokio::sync::watch::Sender<bool>>,
}

impl ConnectionHandle {
    /// Creates a new connection handle.
    pub fn new(
        name: impl Into<String>,
        message_tx: tokio::sync::mpsc::Sender<Vec<u8>>,
        shutdown_tx: tokio::sync::watch::Sender<bool>,
    ) -> Self {
        Self {
            name: name.into(),
            message_tx,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Queues a message for sending through this connection.
    pub async fn send(&self, data: Vec<u8>) -> TransportResult<()> {
        self.message_tx
            .send(data)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Queues a JSON message.
    pub async fn send_json(&self, value: &Value) -> TransportResult<()> {
        let data = serde_json::to_vec(value)
            .map_err(|e| TransportError::SendFailed(format!("JSON serialization failed: {e}")))?;
        self.send(data).await
    }

    /// Closes this connection.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Returns whether [`close`](Self::close) has been requested.
    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}
