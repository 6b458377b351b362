//! Test helpers shared by the dispatcher and relay tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Records the level of every event emitted while installed.
#[derive(Clone, Default)]
pub(crate) struct EventLog {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl EventLog {
    /// Runs `f` with this log as the thread's default subscriber.
    pub(crate) fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Every recorded level, in emission order.
    pub(crate) fn levels(&self) -> Vec<Level> {
        self.levels.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.levels.lock().clear();
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.levels.lock().push(*event.metadata().level());
    }
}
