//! Database layer for the local authoritative store.
//!
//! ```no_run
//! use smart_bookmarks::database::Database;
//!
//! let db = Database::open("bookmarks.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
