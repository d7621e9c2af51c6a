//! In-process change feed.
//!
//! Fans change payloads out to every live attachment whose topic matches the
//! table and viewer, the way a row-level-secured realtime channel would.
//! It can also refuse new connections and drop live ones, which is how the
//! reconnect path gets exercised without a network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::change_feed::{ChangeFeed, FeedSubscription};
use crate::types::change::{ChannelStatus, FeedMessage, FeedTopic, HandleId, HandleSequence};

struct LiveChannel {
    topic: FeedTopic,
    sender: mpsc::UnboundedSender<FeedMessage>,
}

#[derive(Default)]
struct FeedState {
    channels: HashMap<HandleId, LiveChannel>,
    refuse_connections: bool,
}

/// Cloneable handle to a shared in-process feed.
#[derive(Clone, Default)]
pub struct LocalChangeFeed {
    state: Arc<Mutex<FeedState>>,
    handles: HandleSequence,
}

impl LocalChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// While set, new attachments report `TimedOut` instead of `Subscribed`.
    pub fn set_refuse_connections(&self, refuse: bool) {
        self.lock().refuse_connections = refuse;
    }

    /// Delivers `payload` to every attachment watching `table` as `viewer`.
    /// Returns how many attachments received it.
    pub fn publish(&self, table: &str, viewer: &str, payload: Value) -> usize {
        let mut state = self.lock();
        let mut delivered = 0;
        state.channels.retain(|_, ch| {
            if ch.topic.table != table || ch.topic.viewer != viewer {
                return true;
            }
            let alive = ch.sender.send(FeedMessage::Payload(payload.clone())).is_ok();
            if alive {
                delivered += 1;
            }
            alive
        });
        delivered
    }

    /// Sends `Closed` to every live attachment and forgets them.
    pub fn drop_connections(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.channels.len();
        for (_, ch) in state.channels.drain() {
            let _ = ch.sender.send(FeedMessage::Status(ChannelStatus::Closed));
        }
        debug!(dropped, "local feed dropped all connections");
        dropped
    }

    /// Pushes an arbitrary message onto one attachment.
    pub fn inject(&self, handle: HandleId, message: FeedMessage) -> bool {
        self.lock()
            .channels
            .get(&handle)
            .map(|ch| ch.sender.send(message).is_ok())
            .unwrap_or(false)
    }

    /// Handles of attachments that are currently registered.
    pub fn live_handles(&self) -> Vec<HandleId> {
        let mut handles: Vec<HandleId> = self.lock().channels.keys().copied().collect();
        handles.sort();
        handles
    }
}

impl ChangeFeed for LocalChangeFeed {
    fn subscribe(&self, handle: HandleId, topic: &FeedTopic) -> FeedSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let channel = topic.channel_name(handle);
        let _ = sender.send(FeedMessage::Status(ChannelStatus::Connecting));

        let mut state = self.lock();
        if state.refuse_connections {
            let _ = sender.send(FeedMessage::Status(ChannelStatus::TimedOut));
            debug!(%handle, channel = %channel, "local feed refused connection");
        } else {
            let _ = sender.send(FeedMessage::Status(ChannelStatus::Subscribed));
            state.channels.insert(
                handle,
                LiveChannel {
                    topic: topic.clone(),
                    sender,
                },
            );
        }
        FeedSubscription::new(handle, channel, receiver)
    }

    fn unsubscribe(&self, handle: HandleId) {
        if self.lock().channels.remove(&handle).is_some() {
            debug!(%handle, "local feed released attachment");
        }
    }

    fn handle_sequence(&self) -> HandleSequence {
        self.handles.clone()
    }
}
