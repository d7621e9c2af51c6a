//! Change feed collaborator.
//!
//! A feed hands out [`FeedSubscription`]s: ordered streams of connection
//! status reports and raw change payloads for one attachment. The transport
//! behind it is the implementor's business.

use tokio::sync::mpsc;

use crate::types::change::{FeedMessage, FeedTopic, HandleId, HandleSequence};

/// Push-based change notifications for a watched table.
pub trait ChangeFeed: Send + Sync + 'static {
    /// Opens an attachment identified by `handle`. Never fails directly:
    /// connection problems arrive as status messages on the subscription.
    fn subscribe(&self, handle: HandleId, topic: &FeedTopic) -> FeedSubscription;
    /// Releases the attachment `handle`. Unknown or already-closed handles
    /// are ignored.
    fn unsubscribe(&self, handle: HandleId);
    /// Id source for attachments to this feed. Every session on the feed
    /// draws from it, so no two live attachments share a handle.
    fn handle_sequence(&self) -> HandleSequence;
}

/// Receiving end of one attachment.
///
/// The end of the stream means the same as a `Closed` status.
#[derive(Debug)]
pub struct FeedSubscription {
    handle: HandleId,
    channel: String,
    receiver: mpsc::UnboundedReceiver<FeedMessage>,
}

impl FeedSubscription {
    pub fn new(
        handle: HandleId,
        channel: String,
        receiver: mpsc::UnboundedReceiver<FeedMessage>,
    ) -> Self {
        Self {
            handle,
            channel,
            receiver,
        }
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next message in delivery order, or `None` once the feed side is gone.
    pub async fn next(&mut self) -> Option<FeedMessage> {
        self.receiver.recv().await
    }
}
