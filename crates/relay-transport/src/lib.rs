//! # Relay Transport
//!
//! Network transport implementations for the retweet relay.
//!
//! ## Features
//!
//! - `ws-client` (default): persistent WebSocket client with handshake
//!   headers, heartbeat and reconnect-with-backoff
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Relay / OneBot     │  (ConnectionHandler impls)
//! ├─────────────────────┤
//! │  relay-core         │  (handler trait, config, handle)
//! ├─────────────────────┤
//! │  relay-transport    │  <- This crate
//! ├─────────────────────┤
//! │  Network (TCP/TLS)  │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_core::WsClientConfig;
//! use relay_transport::ws_connect;
//!
//! let config = WsClientConfig::new("source", "wss://example.com/ws")
//!     .with_header("x-access-token", secret);
//! let handle = ws_connect(config, handler).await?;
//! ```

#[cfg(feature = "ws-client")]
pub mod websocket;

#[cfg(feature = "ws-client")]
pub use websocket::ws_connect;
