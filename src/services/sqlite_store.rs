//! SQLite-backed authoritative store.
//!
//! Rows are scoped by `user_id`: a viewer only ever sees or deletes its own
//! bookmarks. Every successful create/delete is announced on an optional
//! [`LocalChangeFeed`], so other sessions sharing the feed catch up live.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;
use tracing::debug;
use uuid::Uuid;

use super::authoritative_store::AuthoritativeStore;
use super::change_payload::{delete_payload, insert_payload};
use super::local_feed::LocalChangeFeed;
use crate::database::connection::Database;
use crate::types::bookmark::{BookmarkRecord, Category, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::identity::UserIdentity;

struct Notifier {
    feed: LocalChangeFeed,
    table: Mutex<String>,
}

impl Notifier {
    fn table(&self) -> String {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, owner: &UserIdentity, payload: impl FnOnce(&str) -> serde_json::Value) {
        let table = self.table();
        self.feed.publish(&table, &owner.id, payload(&table));
    }
}

/// Authoritative store over a shared SQLite database.
#[derive(Clone)]
pub struct SqliteBookmarkStore {
    db: Arc<Mutex<Database>>,
    notifier: Option<Arc<Notifier>>,
}

impl SqliteBookmarkStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            notifier: None,
        }
    }

    /// Announces row changes on `feed` under `table`.
    pub fn with_feed(mut self, feed: LocalChangeFeed, table: &str) -> Self {
        self.notifier = Some(Arc::new(Notifier {
            feed,
            table: Mutex::new(table.to_string()),
        }));
        self
    }

    /// Moves change announcements to `table`. Sessions watching the old
    /// table stop hearing about changes until they re-attach.
    pub fn set_feed_table(&self, table: &str) {
        if let Some(n) = &self.notifier {
            *n.table.lock().unwrap_or_else(PoisonError::into_inner) = table.to_string();
        }
    }

    /// Table that changes are announced under, if a feed is attached.
    pub fn feed_table(&self) -> Option<String> {
        self.notifier.as_ref().map(|n| n.table())
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<BookmarkRecord> {
        let category: String = row.get(3)?;
        let category = category.parse::<Category>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
        })?;
        Ok(BookmarkRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            category,
            owner: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn create_error(err: rusqlite::Error) -> BookmarkError {
        let code = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => failure.extended_code.to_string(),
            _ => "unknown".to_string(),
        };
        BookmarkError::Create {
            message: err.to_string(),
            code,
        }
    }

    fn snapshot_for(&self, viewer: &UserIdentity) -> Result<Vec<BookmarkRecord>, BookmarkError> {
        let db = self.lock();
        let mut stmt = db
            .connection()
            .prepare(
                "SELECT id, title, url, category, user_id, created_at \
                 FROM bookmarks WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC",
            )
            .map_err(|e| BookmarkError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![viewer.id], Self::row_to_record)
            .map_err(|e| BookmarkError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn insert(&self, bookmark: &NewBookmark, owner: &UserIdentity) -> Result<BookmarkRecord, BookmarkError> {
        let record = BookmarkRecord {
            id: Uuid::new_v4().to_string(),
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            category: bookmark.category,
            owner: Some(owner.id.clone()),
            created_at: Some(Self::now()),
        };

        self.lock()
            .connection()
            .execute(
                "INSERT INTO bookmarks (id, title, url, category, user_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.title,
                    record.url,
                    record.category.as_str(),
                    owner.id,
                    record.created_at
                ],
            )
            .map_err(Self::create_error)?;

        if let Some(n) = &self.notifier {
            n.publish(owner, |table| insert_payload(table, &record));
        }
        Ok(record)
    }

    fn delete(&self, id: &str, owner: &UserIdentity) -> Result<(), BookmarkError> {
        let affected = self
            .lock()
            .connection()
            .execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, owner.id],
            )
            .map_err(|e| BookmarkError::Delete {
                message: e.to_string(),
            })?;

        if affected == 0 {
            debug!(id, owner = %owner.id, "delete matched no rows");
            return Ok(());
        }
        if let Some(n) = &self.notifier {
            n.publish(owner, |table| delete_payload(table, id));
        }
        Ok(())
    }

    /// Number of rows owned by `owner`.
    pub fn count_for(&self, owner: &UserIdentity) -> Result<i64, BookmarkError> {
        self.lock()
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM bookmarks WHERE user_id = ?1",
                params![owner.id],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::Database(e.to_string()))
    }
}

impl AuthoritativeStore for SqliteBookmarkStore {
    async fn fetch_snapshot(&self, viewer: &UserIdentity) -> Result<Vec<BookmarkRecord>, BookmarkError> {
        self.snapshot_for(viewer)
    }

    async fn create_record(
        &self,
        bookmark: &NewBookmark,
        owner: &UserIdentity,
    ) -> Result<BookmarkRecord, BookmarkError> {
        self.insert(bookmark, owner)
    }

    async fn delete_record(&self, id: &str, owner: &UserIdentity) -> Result<(), BookmarkError> {
        self.delete(id, owner)
    }
}
