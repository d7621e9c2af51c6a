//! Smart Bookmarks: personal bookmarks with a live-synced local view.
//!
//! The library keeps an in-session list of bookmarks consistent with an
//! authoritative store by combining a startup snapshot, a change-feed
//! subscriber that reconnects with backoff, and optimistic deletes.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod tracing_setup;
pub mod types;
