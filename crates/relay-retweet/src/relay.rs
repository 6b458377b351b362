//! Connection handler for the event stream.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use relay_core::{ConnectionHandle, ConnectionHandler, ConnectionInfo, TransportError};

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::wire::{DecodeError, Frame, decode_frame};

/// Decodes stream frames and hands updates to the [`Dispatcher`].
pub struct RetweetRelay {
    plugin: String,
    module: String,
    dispatcher: Dispatcher,
}

impl RetweetRelay {
    pub fn new(plugin: impl Into<String>, module: impl Into<String>, dispatcher: Dispatcher) -> Self {
        Self {
            plugin: plugin.into(),
            module: module.into(),
            dispatcher,
        }
    }

    /// Processes one raw frame.
    ///
    /// Decode failures are returned; everything else is reported through the
    /// returned outcome (`None` when the frame carried no update).
    pub async fn handle_frame(&self, raw: &[u8]) -> Result<Option<DispatchOutcome>, DecodeError> {
        match decode_frame(raw, &self.module)? {
            Frame::System(status) => {
                info!(plugin = %self.plugin, status = %status, "Stream status");
                Ok(None)
            }
            Frame::Foreign => Ok(None),
            Frame::Ignored(proto_type) => {
                debug!(plugin = %self.plugin, proto_type = proto_type, "Ignoring unknown envelope type");
                Ok(None)
            }
            Frame::Update(update) => Ok(Some(self.dispatcher.dispatch(update).await)),
        }
    }
}

#[async_trait]
impl ConnectionHandler for RetweetRelay {
    async fn on_connect(&self, info: ConnectionInfo, _handle: ConnectionHandle) {
        info!(
            plugin = %self.plugin,
            conn = %info.name,
            url = info.metadata.get("url").map(String::as_str).unwrap_or_default(),
            "Connected to event stream"
        );
    }

    async fn on_message(&self, data: &[u8]) {
        if let Err(e) = self.handle_frame(data).await {
            error!(plugin = %self.plugin, error = %e, "Failed to decode frame");
        }
    }

    async fn on_disconnect(&self) {
        warn!(plugin = %self.plugin, "Event stream disconnected");
    }

    async fn on_error(&self, error: &TransportError) {
        error!(plugin = %self.plugin, error = %error, "Event stream error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{BroadcastRule, RoutingTable};
    use crate::testing::EventLog;
    use crate::wire::{Envelope, ProtoType};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use prost::Message as ProstMessage;
    use relay_core::{ApiResult, Messenger};
    use std::sync::Arc;
    use tracing::Level;

    #[derive(Default)]
    struct CountingMessenger {
        sends: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl Messenger for CountingMessenger {
        fn is_ready(&self) -> bool {
            true
        }

        async fn send_group_msg(&self, group_id: i64, _message: &str) -> ApiResult<i64> {
            self.sends.lock().push(group_id);
            Ok(1)
        }
    }

    fn relay(messenger: Arc<CountingMessenger>) -> RetweetRelay {
        let routes = RoutingTable::build(&[BroadcastRule {
            account: "1001".to_string(),
            accounts: vec!["1002".to_string()],
            group_nums: vec![10],
        }]);
        let dispatcher = Dispatcher::new("retweet@test", "", Arc::new(routes), messenger);
        RetweetRelay::new("retweet@test", "weibo", dispatcher)
    }

    fn frame(proto_type: ProtoType, module: &str, payload: &str) -> Vec<u8> {
        Envelope {
            proto_type: proto_type as i32,
            proto_module: module.to_string(),
            proto_payload: payload.as_bytes().to_vec(),
        }
        .encode_to_vec()
    }

    #[tokio::test]
    async fn test_update_frame_is_dispatched() {
        let messenger = Arc::new(CountingMessenger::default());
        let relay = relay(messenger.clone());

        let raw = frame(
            ProtoType::NonSystem,
            "weibo",
            r#"{"cmd":"1","from_id":"1002","from_name":"Bob","text":"hi"}"#,
        );
        let outcome = relay.handle_frame(&raw).await.unwrap();

        assert!(matches!(
            outcome,
            Some(DispatchOutcome::Delivered { sent: 1, .. })
        ));
        assert_eq!(*messenger.sends.lock(), vec![10]);
    }

    #[tokio::test]
    async fn test_non_update_frames_do_not_dispatch() {
        let messenger = Arc::new(CountingMessenger::default());
        let relay = relay(messenger.clone());

        let system = frame(ProtoType::System, "", "welcome");
        assert!(relay.handle_frame(&system).await.unwrap().is_none());

        let foreign = frame(ProtoType::NonSystem, "twitter", r#"{"cmd":"1","from_id":"1001"}"#);
        assert!(relay.handle_frame(&foreign).await.unwrap().is_none());

        assert!(relay.handle_frame(b"\xff\xff\xff").await.is_err());

        relay.on_message(b"\xff\xff\xff").await;
        assert!(messenger.sends.lock().is_empty());
    }

    #[test]
    fn test_frame_log_records() {
        let messenger = Arc::new(CountingMessenger::default());
        let relay = relay(messenger.clone());
        let log = EventLog::default();

        log.capture(|| tokio_test::block_on(relay.on_message(b"\xff\xff\xff")));
        assert_eq!(log.levels(), vec![Level::ERROR]);
        log.clear();

        let foreign = frame(ProtoType::NonSystem, "twitter", r#"{"cmd":"1","from_id":"1001"}"#);
        log.capture(|| tokio_test::block_on(relay.on_message(&foreign)));
        assert!(log.levels().is_empty());

        let system = frame(ProtoType::System, "", "welcome");
        log.capture(|| tokio_test::block_on(relay.on_message(&system)));
        assert_eq!(log.levels(), vec![Level::INFO]);

        assert!(messenger.sends.lock().is_empty());
    }
}
