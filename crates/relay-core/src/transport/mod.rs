//! Transport abstractions.
//!
//! This module holds the types shared between transport implementations
//! (`relay-transport`) and the components that consume connections.

pub mod config;
pub mod connection;

pub use config::WsClientConfig;
pub use connection::{ConnectionHandle, ConnectionHandler, ConnectionInfo};
