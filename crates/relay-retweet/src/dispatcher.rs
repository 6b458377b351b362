//! Update dispatch.
//!
//! [`Dispatcher::dispatch`] turns one decoded [`UpdateMessage`] into group
//! messages:
//!
//! 1. If the messenger is not ready, recognized updates are dropped with a
//!    warning. Nothing is queued.
//! 2. Updates from unrouted accounts are dropped silently.
//! 3. `Content` updates render text plus images and go to every channel. An
//!    attached avatar is announced from a separately spawned task.
//! 4. `Avatar` updates are announced inline.
//!
//! Each message is rendered once and sent to the channels in routing order.
//! A failed send is logged and the loop moves on to the next channel.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use relay_core::Messenger;
use relay_onebot::OneBotMessage;

use crate::routing::RoutingTable;
use crate::wire::{CommandKind, UpdateMessage};

/// What a single dispatch did.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The messenger was not ready; a warning was logged.
    NotReady,
    /// The account has no destination channels.
    Unrouted,
    /// The command is not one the relay handles.
    Ignored,
    /// Messages were sent.
    Delivered {
        /// Successful sends of the main message.
        sent: usize,
        /// Avatar announcement spawned by a content update.
        avatar_task: Option<JoinHandle<usize>>,
    },
}

/// Renders updates and fans them out to their routed channels.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    plugin: String,
    image_root: String,
    routes: Arc<RoutingTable>,
    messenger: Arc<dyn Messenger>,
}

impl Dispatcher {
    pub fn new(
        plugin: impl Into<String>,
        image_root: impl Into<String>,
        routes: Arc<RoutingTable>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                plugin: plugin.into(),
                image_root: image_root.into(),
                routes,
                messenger,
            }),
        }
    }

    /// Dispatches one update.
    pub async fn dispatch(&self, update: UpdateMessage) -> DispatchOutcome {
        let inner = &self.inner;

        if !inner.messenger.is_ready() {
            if update.kind != CommandKind::Unknown {
                warn!(
                    plugin = %inner.plugin,
                    from_id = %update.from_id,
                    from_name = %update.from_name,
                    "Messenger not ready, dropping update"
                );
            }
            return DispatchOutcome::NotReady;
        }

        if inner.routes.channels(&update.from_id).is_empty() {
            return DispatchOutcome::Unrouted;
        }

        match update.kind {
            CommandKind::Content => {
                let avatar_task = update.avatar().is_some().then(|| {
                    let inner = Arc::clone(inner);
                    let update = update.clone();
                    tokio::spawn(async move { inner.send_avatar(&update).await })
                });

                let sent = inner.send_content(&update).await;
                DispatchOutcome::Delivered { sent, avatar_task }
            }
            CommandKind::Avatar => {
                let sent = inner.send_avatar(&update).await;
                DispatchOutcome::Delivered {
                    sent,
                    avatar_task: None,
                }
            }
            CommandKind::Unknown => DispatchOutcome::Ignored,
        }
    }
}

impl Inner {
    fn image_url(&self, reference: &str) -> String {
        let url = format!("{}{}", self.image_root, reference);
        debug!(plugin = %self.plugin, url = %url, "Image included");
        url
    }

    async fn send_content(&self, update: &UpdateMessage) -> usize {
        let message = update
            .imgs
            .iter()
            .fold(OneBotMessage::new().text(&update.text), |message, img| {
                message.image(self.image_url(img))
            });

        let sent = self.broadcast(&update.from_id, &message).await;
        info!(
            plugin = %self.plugin,
            from_name = %update.from_name,
            from_id = %update.from_id,
            sent = sent,
            "Relayed new post"
        );
        sent
    }

    async fn send_avatar(&self, update: &UpdateMessage) -> usize {
        let avatar = self.image_url(&update.avatar);
        let message = OneBotMessage::new()
            .text(format!("{} updated their avatar", update.from_name))
            .image(avatar);

        let sent = self.broadcast(&update.from_id, &message).await;
        info!(
            plugin = %self.plugin,
            from_name = %update.from_name,
            from_id = %update.from_id,
            sent = sent,
            "Relayed avatar update"
        );
        sent
    }

    /// Sends `message` to every channel of `account`; returns the success count.
    async fn broadcast(&self, account: &str, message: &OneBotMessage) -> usize {
        let payload = message.to_cq_string();
        debug!(plugin = %self.plugin, payload = %payload, "Outbound message");

        let mut sent = 0;
        for &group_id in self.routes.channels(account) {
            match self.messenger.send_group_msg(group_id, &payload).await {
                Ok(_) => sent += 1,
                Err(e) => warn!(
                    plugin = %self.plugin,
                    group_id = group_id,
                    error = %e,
                    "Failed to send group message"
                ),
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::BroadcastRule;
    use crate::testing::EventLog;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use relay_core::{ApiError, ApiResult};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tracing::Level;

    /// Records every send; fails sends to `failing_group`.
    #[derive(Default)]
    struct RecordingMessenger {
        ready: AtomicBool,
        failing_group: Option<i64>,
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingMessenger {
        fn ready() -> Arc<Self> {
            Arc::new(Self {
                ready: AtomicBool::new(true),
                ..Default::default()
            })
        }

        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        async fn send_group_msg(&self, group_id: i64, message: &str) -> ApiResult<i64> {
            if self.failing_group == Some(group_id) {
                return Err(ApiError::Timeout);
            }
            let mut sent = self.sent.lock();
            sent.push((group_id, message.to_string()));
            Ok(sent.len() as i64)
        }
    }

    fn dispatcher(messenger: Arc<RecordingMessenger>) -> Dispatcher {
        let routes = RoutingTable::build(&[BroadcastRule {
            account: "1001".to_string(),
            accounts: vec![],
            group_nums: vec![10, 20, 10],
        }]);
        Dispatcher::new(
            "retweet@1.0.0",
            "https://img.example.com/",
            Arc::new(routes),
            messenger,
        )
    }

    fn update(kind: CommandKind) -> UpdateMessage {
        UpdateMessage {
            kind,
            from_id: "1001".to_string(),
            from_name: "Alice".to_string(),
            text: "hello".to_string(),
            imgs: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            avatar: String::new(),
        }
    }

    #[tokio::test]
    async fn test_content_is_sent_once_per_channel() {
        let messenger = RecordingMessenger::ready();
        let outcome = dispatcher(messenger.clone())
            .dispatch(update(CommandKind::Content))
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Delivered {
                sent: 2,
                avatar_task: None
            }
        ));

        let expected = "hello[CQ:image,file=https://img.example.com/a.jpg]\
                        [CQ:image,file=https://img.example.com/b.jpg]";
        assert_eq!(
            messenger.sent(),
            vec![(10, expected.to_string()), (20, expected.to_string())]
        );
    }

    #[tokio::test]
    async fn test_content_with_avatar_spawns_announcement() {
        let messenger = RecordingMessenger::ready();
        let mut content = update(CommandKind::Content);
        content.avatar = "face.png".to_string();

        let DispatchOutcome::Delivered {
            sent,
            avatar_task: Some(task),
        } = dispatcher(messenger.clone()).dispatch(content).await
        else {
            panic!("expected delivery with an avatar task");
        };
        assert_eq!(sent, 2);
        assert_eq!(task.await.unwrap(), 2);

        let avatar = "Alice updated their avatar[CQ:image,file=https://img.example.com/face.png]";
        let sent = messenger.sent();
        assert_eq!(sent.len(), 4);
        let avatar_groups: Vec<i64> = sent
            .iter()
            .filter(|(_, msg)| msg == avatar)
            .map(|(group, _)| *group)
            .collect();
        assert_eq!(avatar_groups, vec![10, 20]);
    }

    #[tokio::test]
    async fn test_avatar_update_is_sent_inline() {
        let messenger = RecordingMessenger::ready();
        let mut avatar = update(CommandKind::Avatar);
        avatar.avatar = "face.png".to_string();

        let outcome = dispatcher(messenger.clone()).dispatch(avatar).await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Delivered {
                sent: 2,
                avatar_task: None
            }
        ));
        assert_eq!(messenger.sent().len(), 2);
    }

    #[test]
    fn test_not_ready_drops_everything() {
        let messenger = Arc::new(RecordingMessenger::default());
        let dispatcher = dispatcher(messenger.clone());
        let log = EventLog::default();

        for (kind, expected) in [
            (CommandKind::Content, vec![Level::WARN]),
            (CommandKind::Avatar, vec![Level::WARN]),
            (CommandKind::Unknown, vec![]),
        ] {
            let mut pending = update(kind.clone());
            pending.avatar = "face.png".to_string();

            let outcome = log.capture(|| tokio_test::block_on(dispatcher.dispatch(pending)));
            assert!(matches!(outcome, DispatchOutcome::NotReady));
            assert_eq!(log.levels(), expected, "{kind:?}");
            log.clear();
        }
        assert!(messenger.sent().is_empty());
    }

    #[test]
    fn test_unrouted_and_unknown_updates() {
        let messenger = RecordingMessenger::ready();
        let dispatcher = dispatcher(messenger.clone());
        let log = EventLog::default();

        let mut stranger = update(CommandKind::Avatar);
        stranger.from_id = "9999".to_string();
        stranger.avatar = "face.png".to_string();
        let outcome = log.capture(|| tokio_test::block_on(dispatcher.dispatch(stranger)));
        assert!(matches!(outcome, DispatchOutcome::Unrouted));

        let outcome =
            log.capture(|| tokio_test::block_on(dispatcher.dispatch(update(CommandKind::Unknown))));
        assert!(matches!(outcome, DispatchOutcome::Ignored));

        assert!(log.levels().is_empty());
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_avatar_update_without_reference_is_sent() {
        let messenger = RecordingMessenger::ready();
        let outcome = dispatcher(messenger.clone())
            .dispatch(update(CommandKind::Avatar))
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Delivered {
                sent: 2,
                avatar_task: None
            }
        ));
        let expected = "Alice updated their avatar[CQ:image,file=https://img.example.com/]";
        assert_eq!(
            messenger.sent(),
            vec![(10, expected.to_string()), (20, expected.to_string())]
        );
    }

    #[tokio::test]
    async fn test_send_failure_does_not_abort_loop() {
        let messenger = Arc::new(RecordingMessenger {
            ready: AtomicBool::new(true),
            failing_group: Some(10),
            ..Default::default()
        });

        let outcome = dispatcher(messenger.clone())
            .dispatch(update(CommandKind::Content))
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Delivered { sent: 1, .. }
        ));
        let groups: Vec<i64> = messenger.sent().into_iter().map(|(g, _)| g).collect();
        assert_eq!(groups, vec![20]);
    }
}
