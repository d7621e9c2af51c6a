// Smart Bookmarks services
// Collaborators behind traits (identity, authoritative store, change feed),
// their local implementations, the change payload codec, and settings.

pub mod authoritative_store;
pub mod change_feed;
pub mod change_payload;
pub mod identity;
pub mod local_feed;
pub mod settings_engine;
pub mod sqlite_store;
