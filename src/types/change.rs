use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::bookmark::BookmarkRecord;

/// Identifies one attachment to the change feed.
///
/// Ids grow monotonically within a session, so a late callback carrying an
/// older id can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of handle ids.
///
/// A change feed owns one, so attachments from every session on that feed
/// get distinct ids.
#[derive(Debug, Clone, Default)]
pub struct HandleSequence(Arc<AtomicU64>);

impl HandleSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> HandleId {
        HandleId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Connection state reported by the change feed for one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelStatus {
    Connecting,
    Subscribed,
    TimedOut,
    Closed,
    ChannelError,
}

impl ChannelStatus {
    /// Whether this status means the attachment is gone and must be replaced.
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            ChannelStatus::TimedOut | ChannelStatus::Closed | ChannelStatus::ChannelError
        )
    }
}

/// One message delivered on a feed subscription, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Status(ChannelStatus),
    Payload(serde_json::Value),
}

/// What a subscription watches: a table, as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTopic {
    pub table: String,
    pub viewer: String,
}

impl FeedTopic {
    pub fn new(table: &str, viewer: &str) -> Self {
        Self {
            table: table.to_string(),
            viewer: viewer.to_string(),
        }
    }

    /// Channel name for an attachment. Unique per handle.
    pub fn channel_name(&self, handle: HandleId) -> String {
        format!("realtime-{}-{}", self.table, handle.0)
    }
}

/// A validated change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created(BookmarkRecord),
    Updated(BookmarkRecord),
    Deleted { id: String },
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Created(_) => "created",
            ChangeEvent::Updated(_) => "updated",
            ChangeEvent::Deleted { .. } => "deleted",
        }
    }
}
