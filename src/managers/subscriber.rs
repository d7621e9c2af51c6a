//! Change Feed Subscriber.
//!
//! Keeps one live attachment to the change feed, applies decoded events to
//! the local store, and replaces the attachment with backoff whenever it
//! drops. The lifecycle rules live in [`SubscriptionMachine`]; this module
//! only does the waiting and the I/O.
//!
//! Teardown is synchronous: once [`ChangeFeedSubscriber::detach`] returns,
//! no event or timer from any earlier attachment can touch the store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::bookmark_store::LocalBookmarkStore;
use super::subscription::{
    BackoffPolicy, Directive, HandleSequence, SubscriptionMachine, SubscriptionPhase,
    SubscriptionStatus,
};
use crate::services::change_feed::{ChangeFeed, FeedSubscription};
use crate::services::change_payload::decode_change;
use crate::types::change::{ChangeEvent, ChannelStatus, FeedMessage, FeedTopic, HandleId};

/// What happened to one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Duplicate,
    Removed,
    AlreadyAbsent,
    /// Update events are decoded but not applied.
    UpdateIgnored,
    /// The payload came from a superseded or torn-down attachment.
    Stale,
    Malformed(String),
}

struct Shared {
    machine: Mutex<SubscriptionMachine>,
    store: Arc<Mutex<LocalBookmarkStore>>,
}

impl Shared {
    fn machine(&self) -> MutexGuard<'_, SubscriptionMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_status(&self, handle: HandleId, status: ChannelStatus) -> Directive {
        let directive = self.machine().on_status(handle, status);
        debug!(%handle, ?status, ?directive, "subscription status");
        directive
    }

    fn is_terminated(&self) -> bool {
        self.machine().phase() == SubscriptionPhase::Terminated
    }

    /// The machine lock is held while the store is written, so a concurrent
    /// `detach` either happens entirely before or entirely after.
    fn apply(&self, handle: HandleId, payload: &Value) -> ApplyOutcome {
        let machine = self.machine();
        if !machine.accepts(handle) {
            debug!(%handle, "dropping payload from stale attachment");
            return ApplyOutcome::Stale;
        }

        let event = match decode_change(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(%handle, error = %e, "skipping malformed change payload");
                return ApplyOutcome::Malformed(e.to_string());
            }
        };
        debug!(%handle, kind = event.kind(), "change payload received");

        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            ChangeEvent::Created(record) => {
                if store.insert_if_absent(record) {
                    ApplyOutcome::Inserted
                } else {
                    ApplyOutcome::Duplicate
                }
            }
            ChangeEvent::Deleted { id } => match store.remove(&id) {
                Some(_) => ApplyOutcome::Removed,
                None => ApplyOutcome::AlreadyAbsent,
            },
            ChangeEvent::Updated(record) => {
                debug!(%handle, id = %record.id, "update event not applied");
                ApplyOutcome::UpdateIgnored
            }
        }
    }
}

/// Owner of the live change-feed attachment for one session.
pub struct ChangeFeedSubscriber {
    shared: Arc<Shared>,
    feed: Arc<dyn ChangeFeed>,
    task: Option<JoinHandle<()>>,
}

impl ChangeFeedSubscriber {
    /// Attaches to `topic` and starts applying events to `store`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn attach(
        feed: Arc<dyn ChangeFeed>,
        topic: FeedTopic,
        store: Arc<Mutex<LocalBookmarkStore>>,
        policy: BackoffPolicy,
        handles: HandleSequence,
    ) -> Self {
        let mut machine = SubscriptionMachine::new(policy, handles);
        let first = machine.attach();
        let shared = Arc::new(Shared {
            machine: Mutex::new(machine),
            store,
        });

        let task = first.map(|handle| {
            let subscription = feed.subscribe(handle, &topic);
            info!(%handle, channel = subscription.channel(), "attached to change feed");
            tokio::spawn(run(feed.clone(), topic, shared.clone(), subscription))
        });

        Self { shared, feed, task }
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.shared.machine().status()
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.is_terminated()
    }

    /// Applies `payload` as if it had arrived on attachment `handle`.
    pub fn apply_payload(&self, handle: HandleId, payload: &Value) -> ApplyOutcome {
        self.shared.apply(handle, payload)
    }

    /// Tears the subscription down: no further transitions, pending
    /// reconnect timer cancelled, live attachment released.
    pub fn detach(&mut self) {
        let released = self.shared.machine().detach();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(handle) = released {
            self.feed.unsubscribe(handle);
            info!(%handle, "change feed subscription torn down");
        }
    }
}

impl Drop for ChangeFeedSubscriber {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn run(
    feed: Arc<dyn ChangeFeed>,
    topic: FeedTopic,
    shared: Arc<Shared>,
    mut subscription: FeedSubscription,
) {
    loop {
        let handle = subscription.handle();
        let Some(delay) = listen(&shared, &mut subscription).await else {
            return;
        };
        warn!(
            %handle,
            delay_ms = delay.as_millis() as u64,
            retry_count = shared.machine().retry_count(),
            "change feed connection lost, retrying"
        );
        tokio::time::sleep(delay).await;
        feed.unsubscribe(handle);

        let next = {
            let mut machine = shared.machine();
            if !machine.reconnect_due(handle) {
                debug!(%handle, "reconnect timer superseded");
                return;
            }
            machine.attach()
        };
        let Some(next) = next else {
            return;
        };
        subscription = feed.subscribe(next, &topic);
        info!(handle = %next, channel = subscription.channel(), "re-attached to change feed");
    }
}

/// Reads one attachment until it drops. Returns the reconnect delay, or
/// `None` when the subscriber has been torn down.
async fn listen(shared: &Shared, subscription: &mut FeedSubscription) -> Option<Duration> {
    let handle = subscription.handle();
    loop {
        let status = match subscription.next().await {
            Some(FeedMessage::Payload(payload)) => {
                shared.apply(handle, &payload);
                continue;
            }
            Some(FeedMessage::Status(status)) => status,
            None => ChannelStatus::Closed,
        };
        match shared.on_status(handle, status) {
            Directive::Reconnect { delay } => return Some(delay),
            _ if status.is_drop() || shared.is_terminated() => return None,
            _ => {}
        }
    }
}
