//! WebSocket client implementation.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, interval_at};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue, Request};
use tokio_tungstenite::tungstenite::{Error, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{error, info, trace, warn};

use relay_core::{
    ConnectionHandle, ConnectionHandler, ConnectionInfo, TransportError, TransportResult,
    WsClientConfig,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Interval used when heartbeats are disabled; the tick branch is never polled.
const IDLE_HEARTBEAT: Duration = Duration::from_secs(3600);

/// Builds the handshake request, attaching the configured headers.
fn build_request(config: &WsClientConfig) -> TransportResult<Request<()>> {
    let mut request = config.url.as_str().into_client_request().map_err(|e| {
        TransportError::InvalidConfig(format!("invalid WebSocket URL '{}': {e}", config.url))
    })?;

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidConfig(format!("invalid header '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::InvalidConfig(format!("invalid value for header '{name}': {e}"))
        })?;
        request.headers_mut().insert(header_name, header_value);
    }

    Ok(request)
}

/// Performs one handshake attempt.
async fn open(config: &WsClientConfig) -> TransportResult<WsStream> {
    let request = build_request(config)?;
    let (ws_stream, _response) = connect_async(request)
        .await
        .map_err(|e| TransportError::connection_failed(&config.url, e.to_string()))?;
    Ok(ws_stream)
}

fn connection_info(config: &WsClientConfig) -> ConnectionInfo {
    ConnectionInfo::new(&config.name, "websocket").with_metadata("url", &config.url)
}

/// State for managing WebSocket client loop interactions.
struct ClientLoopState {
    handler: Arc<dyn ConnectionHandler>,
    handle: ConnectionHandle,
    config: WsClientConfig,
    retry_count: u32,
    current_delay: Duration,
    ws_tx: WsSink,
    ws_rx: WsSource,
    shutdown_rx: watch::Receiver<bool>,
}

impl ClientLoopState {
    fn new(
        handler: Arc<dyn ConnectionHandler>,
        handle: ConnectionHandle,
        config: WsClientConfig,
        ws_stream: WsStream,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let initial_delay = config.initial_delay;
        let (ws_tx, ws_rx) = ws_stream.split();

        Self {
            handler,
            handle,
            config,
            retry_count: 0,
            current_delay: initial_delay,
            ws_tx,
            ws_rx,
            shutdown_rx,
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    /// Hands a data frame to the handler and resets the backoff.
    async fn handle_message_received(&mut self, message_type: &str, data: &[u8]) {
        trace!(conn = %self.name(), len = data.len(), message_type = message_type, "Received");
        self.handler.on_message(data).await;
        self.retry_count = 0;
        self.current_delay = self.config.initial_delay;
    }

    /// Reports the lost connection and reconnects with exponential backoff.
    ///
    /// Returns true if the loop should continue on a fresh stream, false if
    /// it should stop (reconnect disabled, retries exhausted, or shutdown).
    async fn handle_reconnect(&mut self) -> bool {
        self.handler.on_disconnect().await;

        if !self.config.auto_reconnect {
            return false;
        }

        loop {
            if let Some(max) = self.config.max_retries
                && self.retry_count >= max
            {
                error!(conn = %self.name(), retries = self.retry_count, "Max retries reached, giving up");
                return false;
            }

            warn!(conn = %self.name(), delay = ?self.current_delay, "Reconnecting...");
            tokio::select! {
                _ = tokio::time::sleep(self.current_delay) => {}
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!(conn = %self.name(), "Shutdown requested while reconnecting");
                        return false;
                    }
                }
            }

            match open(&self.config).await {
                Ok(stream) => {
                    let (new_tx, new_rx) = stream.split();
                    info!(conn = %self.name(), "Reconnected successfully");
                    self.retry_count = 0;
                    self.current_delay = self.config.initial_delay;
                    self.ws_tx = new_tx;
                    self.ws_rx = new_rx;
                    self.handler
                        .on_connect(connection_info(&self.config), self.handle.clone())
                        .await;
                    return true;
                }
                Err(e) => {
                    warn!(conn = %self.name(), error = %e, "Reconnection failed");
                    self.handler.on_error(&e).await;
                    self.retry_count += 1;
                    self.current_delay = self.config.next_delay(self.current_delay);
                }
            }
        }
    }

    /// Handles one item from the WebSocket stream.
    /// Returns true if the loop should continue, false if it should break.
    async fn handle_message(&mut self, msg: Option<Result<Message, Error>>) -> bool {
        match msg {
            Some(Ok(Message::Text(text))) => {
                self.handle_message_received("text", text.as_bytes()).await;
                true
            }
            Some(Ok(Message::Binary(data))) => {
                self.handle_message_received("binary", &data).await;
                true
            }
            Some(Ok(Message::Ping(data))) => {
                trace!(conn = %self.name(), "Received ping, sending pong");
                let _ = self.ws_tx.send(Message::Pong(data)).await;
                true
            }
            Some(Ok(Message::Pong(_))) => {
                trace!(conn = %self.name(), "Received pong");
                true
            }
            Some(Ok(Message::Close(_))) | Some(Ok(Message::Frame(_))) => {
                info!(conn = %self.name(), "Server closed connection");
                self.handle_reconnect().await
            }
            Some(Err(e)) => {
                warn!(conn = %self.name(), error = %e, "WebSocket error");
                self.handler
                    .on_error(&TransportError::Protocol(e.to_string()))
                    .await;
                self.handle_reconnect().await
            }
            None => {
                info!(conn = %self.name(), "WebSocket stream ended");
                self.handle_reconnect().await
            }
        }
    }

    async fn send_heartbeat(&mut self) {
        trace!(conn = %self.name(), "Sending heartbeat ping");
        if let Err(e) = self.ws_tx.send(Message::Ping(Vec::new().into())).await {
            warn!(conn = %self.name(), error = %e, "Failed to send heartbeat");
        }
    }
}

/// Connects to a WebSocket server.
///
/// Performs the initial handshake (an error here is returned to the caller),
/// notifies `handler.on_connect`, then spawns a background loop that
/// forwards frames to the handler one at a time, drains the outgoing queue,
/// sends heartbeats and reconnects according to `config`.
pub async fn ws_connect(
    config: WsClientConfig,
    handler: Arc<dyn ConnectionHandler>,
) -> TransportResult<ConnectionHandle> {
    let (message_tx, mut message_rx) = mpsc::channel::<Vec<u8>>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(conn = %config.name, url = %config.url, "Connecting to WebSocket server");

    let ws_stream = open(&config).await?;

    info!(conn = %config.name, url = %config.url, "WebSocket client connected");

    let handle = ConnectionHandle::new(&config.name, message_tx, shutdown_tx);
    handler
        .on_connect(connection_info(&config), handle.clone())
        .await;

    let heartbeat_enabled = config.heartbeat_interval.is_some();
    let period = config.heartbeat_interval.unwrap_or(IDLE_HEARTBEAT);
    let mut state = ClientLoopState::new(handler, handle.clone(), config, ws_stream, shutdown_rx);

    tokio::spawn(async move {
        let mut heartbeat = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = state.shutdown_rx.changed() => {
                    if *state.shutdown_rx.borrow() {
                        info!(conn = %state.name(), "WebSocket client shutting down");
                        let _ = state.ws_tx.close().await;
                        state.handler.on_disconnect().await;
                        break;
                    }
                }

                Some(data) = message_rx.recv() => {
                    let msg = Message::Text(String::from_utf8_lossy(&data).into_owned().into());
                    if let Err(e) = state.ws_tx.send(msg).await {
                        warn!(conn = %state.name(), error = %e, "Failed to send message");
                    }
                }

                _ = heartbeat.tick(), if heartbeat_enabled => {
                    state.send_heartbeat().await;
                }

                msg = state.ws_rx.next() => {
                    if !state.handle_message(msg).await {
                        break;
                    }
                }
            }
        }
    });

    Ok(handle)
}
