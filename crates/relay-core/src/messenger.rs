//! Outbound messaging abstraction.
//!
//! The relay only ever needs two things from a chat backend: whether it is
//! currently able to deliver, and a way to post an already-serialized
//! message to a group. Concrete backends (the OneBot bot in `relay-onebot`)
//! implement [`Messenger`]; tests substitute recording fakes.

use async_trait::async_trait;

use crate::error::ApiResult;

/// A chat backend that can deliver messages to group channels.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Returns whether outbound delivery is currently possible.
    ///
    /// This is polled, not locked: the answer may be stale by the time a
    /// send is issued.
    fn is_ready(&self) -> bool;

    /// Sends a serialized message to a group and returns the message ID.
    async fn send_group_msg(&self, group_id: i64, message: &str) -> ApiResult<i64>;
}
