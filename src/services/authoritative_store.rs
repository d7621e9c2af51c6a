//! Authoritative store collaborator.
//!
//! The store owns the real bookmark rows. It scopes reads and deletes to the
//! viewer (row-level security) and assigns ids on create.

use std::future::Future;

use crate::types::bookmark::{BookmarkRecord, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::identity::UserIdentity;

pub trait AuthoritativeStore: Send + Sync + 'static {
    /// All rows visible to `viewer`, oldest first.
    fn fetch_snapshot(
        &self,
        viewer: &UserIdentity,
    ) -> impl Future<Output = Result<Vec<BookmarkRecord>, BookmarkError>> + Send;

    /// Creates a row owned by `owner` and returns it with its assigned id.
    fn create_record(
        &self,
        bookmark: &NewBookmark,
        owner: &UserIdentity,
    ) -> impl Future<Output = Result<BookmarkRecord, BookmarkError>> + Send;

    /// Deletes the row matching both `id` and `owner`. Matching nothing is
    /// not an error.
    fn delete_record(
        &self,
        id: &str,
        owner: &UserIdentity,
    ) -> impl Future<Output = Result<(), BookmarkError>> + Send;
}
