//! Bookmark Session.
//!
//! Wires the local store to its collaborators for one signed-in user:
//! snapshot at start, live updates through the subscriber, and user-issued
//! mutations. Deletes are optimistic; adds are not, and reach the local
//! store through the feed's created event.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{error, info, warn};

use super::bookmark_filter::BookmarkFilter;
use super::bookmark_store::LocalBookmarkStore;
use super::subscriber::ChangeFeedSubscriber;
use super::subscription::{BackoffPolicy, HandleSequence, SubscriptionStatus};
use crate::services::authoritative_store::AuthoritativeStore;
use crate::services::change_feed::ChangeFeed;
use crate::services::identity::IdentityProvider;
use crate::types::bookmark::{BookmarkRecord, NewBookmark};
use crate::types::change::FeedTopic;
use crate::types::errors::{BookmarkError, SessionError};
use crate::types::identity::UserIdentity;
use crate::types::settings::RealtimeSettings;

/// Snapshot of a session for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub started: bool,
    pub user: Option<String>,
    pub bookmarks: usize,
    pub revision: u64,
    pub subscription: Option<SubscriptionStatus>,
}

/// One user's live view of their bookmarks.
pub struct BookmarkSession<S, I> {
    store: Arc<S>,
    feed: Arc<dyn ChangeFeed>,
    identity: Arc<I>,
    local: Arc<Mutex<LocalBookmarkStore>>,
    subscriber: Option<ChangeFeedSubscriber>,
    settings: RealtimeSettings,
    handles: HandleSequence,
}

impl<S, I> BookmarkSession<S, I> {
    fn local(&self) -> MutexGuard<'_, LocalBookmarkStore> {
        self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_started(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Shared handle to the local store, for renderers that observe it.
    pub fn local_store(&self) -> Arc<Mutex<LocalBookmarkStore>> {
        self.local.clone()
    }

    pub fn subscriber(&self) -> Option<&ChangeFeedSubscriber> {
        self.subscriber.as_ref()
    }

    pub fn settings(&self) -> &RealtimeSettings {
        &self.settings
    }

    /// New realtime settings. Backoff and table changes apply from the next
    /// `start`; delete rollback applies immediately.
    pub fn set_settings(&mut self, settings: RealtimeSettings) {
        self.settings = settings;
    }

    /// The full local list, in store order.
    pub fn bookmarks(&self) -> Vec<BookmarkRecord> {
        self.local().current_view().to_vec()
    }

    /// The local list narrowed by `filter`. Never mutates the store.
    pub fn view(&self, filter: &BookmarkFilter) -> Vec<BookmarkRecord> {
        filter.apply(self.local().current_view())
    }

    /// Detaches from the change feed. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut subscriber) = self.subscriber.take() {
            subscriber.detach();
            info!("bookmark session stopped");
        }
    }
}

impl<S: AuthoritativeStore, I: IdentityProvider> BookmarkSession<S, I> {
    pub fn new(
        store: Arc<S>,
        feed: Arc<dyn ChangeFeed>,
        identity: Arc<I>,
        settings: RealtimeSettings,
    ) -> Self {
        let handles = feed.handle_sequence();
        Self {
            store,
            feed,
            identity,
            local: Arc::new(Mutex::new(LocalBookmarkStore::new())),
            subscriber: None,
            settings,
            handles,
        }
    }

    fn require_user(&self) -> Result<UserIdentity, BookmarkError> {
        self.identity.current_user().ok_or(BookmarkError::Unauthorized)
    }

    pub fn status(&self) -> SessionStatus {
        let (bookmarks, revision) = {
            let local = self.local();
            (local.len(), local.revision())
        };
        SessionStatus {
            started: self.is_started(),
            user: self.identity.current_user().map(|u| u.id),
            bookmarks,
            revision,
            subscription: self.subscriber.as_ref().map(ChangeFeedSubscriber::status),
        }
    }

    /// Loads the snapshot and attaches to the change feed.
    ///
    /// Starting an already started session re-derives the snapshot and
    /// replaces the subscriber.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        let user = self.require_user()?;
        self.stop();

        let snapshot = self.store.fetch_snapshot(&user).await?;
        let count = snapshot.len();
        self.local().initialize(snapshot);

        let topic = FeedTopic::new(&self.settings.table, &user.id);
        self.subscriber = Some(ChangeFeedSubscriber::attach(
            self.feed.clone(),
            topic,
            self.local.clone(),
            BackoffPolicy::from_settings(&self.settings),
            self.handles.clone(),
        ));
        info!(user = %user.id, bookmarks = count, "bookmark session started");
        Ok(())
    }

    /// Replaces the local list with a fresh snapshot.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        if !self.is_started() {
            return Err(SessionError::NotStarted);
        }
        let user = self.require_user()?;
        let snapshot = self.store.fetch_snapshot(&user).await?;
        self.local().initialize(snapshot);
        Ok(())
    }

    /// Creates a bookmark in the authoritative store.
    ///
    /// The local list is left alone; the record shows up when the feed
    /// delivers its created event.
    pub async fn add_bookmark(&self, bookmark: NewBookmark) -> Result<BookmarkRecord, BookmarkError> {
        let user = self.require_user()?;
        if bookmark.title.trim().is_empty() {
            return Err(BookmarkError::InvalidInput("title must not be empty".to_string()));
        }
        if bookmark.url.trim().is_empty() {
            return Err(BookmarkError::InvalidInput("url must not be empty".to_string()));
        }

        match self.store.create_record(&bookmark, &user).await {
            Ok(record) => {
                info!(id = %record.id, category = %record.category, "bookmark created");
                Ok(record)
            }
            Err(e) => {
                error!(error = %e, "error adding bookmark");
                Err(e)
            }
        }
    }

    /// Removes a bookmark locally right away, then deletes it upstream.
    ///
    /// A refused delete is returned to the caller. The local removal stays
    /// unless `rollback_failed_deletes` is set. Even then the record is not
    /// restored if a delete event for it arrived while the call was in
    /// flight, since the row is already gone upstream.
    pub async fn delete_bookmark(&self, id: &str) -> Result<(), BookmarkError> {
        let user = self.require_user()?;
        self.local().park(id);

        let result = self.store.delete_record(id, &user).await;
        let mut local = self.local();
        match result {
            Ok(()) => {
                local.discard_parked(id);
                Ok(())
            }
            Err(e) => {
                error!(id, error = %e, "error deleting bookmark");
                if self.settings.rollback_failed_deletes {
                    if local.unpark(id) {
                        warn!(id, "restored bookmark after failed delete");
                    }
                } else {
                    local.discard_parked(id);
                }
                Err(e)
            }
        }
    }
}

impl<S, I> Drop for BookmarkSession<S, I> {
    fn drop(&mut self) {
        self.stop();
    }
}
