//! WebSocket transport.

mod client;

pub use client::ws_connect;
