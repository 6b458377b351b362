//! # Relay Core
//!
//! Shared building blocks for the retweet relay:
//!
//! - **Errors**: [`TransportError`] and [`ApiError`]
//! - **Dedup**: the order-preserving [`dedup`] helper used by routing
//! - **Transport**: connection callbacks ([`ConnectionHandler`]), handles and
//!   client configuration
//! - **Messaging**: the [`Messenger`] trait implemented by chat backends
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌─────────────┐
//! │  Transport   │────▶│   Relay    │────▶│  Messenger  │
//! │ (ws client)  │     │ (dispatch) │     │  (OneBot)   │
//! └──────────────┘     └────────────┘     └─────────────┘
//! ```

pub mod dedup;
pub mod error;
pub mod messenger;
pub mod transport;

pub use dedup::dedup;
pub use error::{ApiError, ApiResult, TransportError, TransportResult};
pub use messenger::Messenger;
pub use transport::{ConnectionHandle, ConnectionHandler, ConnectionInfo, WsClientConfig};
