// Smart Bookmarks state managers
// Managers hold session state: the local bookmark list, its filtered view,
// the change-feed subscription and the session that ties them together.

pub mod bookmark_filter;
pub mod bookmark_session;
pub mod bookmark_store;
pub mod subscriber;
pub mod subscription;
