//! # Retweet relay core
//!
//! Consumes a module-scoped event stream and fans updates out to QQ groups:
//!
//! - [`routing`]: broadcast rules and the account → channels [`RoutingTable`]
//! - [`wire`]: protobuf envelopes and JSON update payloads
//! - [`dispatcher`]: readiness gate, rendering and per-channel sends
//! - [`RetweetRelay`]: the stream's [`ConnectionHandler`](relay_core::ConnectionHandler)

pub mod config;
pub mod dispatcher;
pub mod relay;
pub mod routing;
pub mod wire;

#[cfg(test)]
mod testing;

pub use config::RetweetConfig;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use relay::RetweetRelay;
pub use routing::{BroadcastRule, RoutingTable};
pub use wire::{CommandKind, DecodeError, Envelope, Frame, ProtoType, UpdateMessage, decode_frame};
