//! App Core for Smart Bookmarks.
//!
//! Holds the settings, the local authoritative store, the change feed, the
//! identity, and the signed-in user's bookmark session.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::database::connection::Database;
use crate::managers::bookmark_session::{BookmarkSession, SessionStatus};
use crate::platform;
use crate::services::identity::StaticIdentity;
use crate::services::local_feed::LocalChangeFeed;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::sqlite_store::SqliteBookmarkStore;
use crate::types::errors::SessionError;
use crate::types::identity::UserIdentity;
use crate::types::settings::AppSettings;

/// Session over the SQLite store with an in-memory identity.
pub type LocalSession = BookmarkSession<SqliteBookmarkStore, StaticIdentity>;

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub feed: LocalChangeFeed,
    pub identity: Arc<StaticIdentity>,
    pub store: Arc<SqliteBookmarkStore>,
    pub session: LocalSession,
}

impl App {
    /// Opens the database at `db_path` and wires everything around it.
    ///
    /// Realtime settings are taken from `settings_engine` as it is now.
    pub fn new(db_path: &str, settings_engine: SettingsEngine) -> Result<Self, rusqlite::Error> {
        let db = Database::open(db_path)?;
        let settings = settings_engine.get_settings().realtime.clone();

        let feed = LocalChangeFeed::new();
        let store = Arc::new(SqliteBookmarkStore::new(db).with_feed(feed.clone(), &settings.table));
        let identity = Arc::new(StaticIdentity::new());
        let session = BookmarkSession::new(
            store.clone(),
            Arc::new(feed.clone()),
            identity.clone(),
            settings,
        );

        Ok(Self {
            settings_engine,
            feed,
            identity,
            store,
            session,
        })
    }

    /// Loads settings from the platform config directory and opens the
    /// configured database, creating its directory if needed.
    pub fn open_default() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(None);
        let settings = settings_engine.load()?;
        let db_path = Self::database_path(&settings);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %db_path.display(), "opening bookmarks database");
        Ok(Self::new(&db_path.to_string_lossy(), settings_engine)?)
    }

    /// `storage.database_path`, or `<data dir>/bookmarks.db`.
    pub fn database_path(settings: &AppSettings) -> PathBuf {
        match &settings.storage.database_path {
            Some(path) => PathBuf::from(path),
            None => platform::get_data_dir().join("bookmarks.db"),
        }
    }

    /// Signs `user` in and starts their session.
    pub async fn sign_in(&mut self, user: UserIdentity) -> Result<SessionStatus, SessionError> {
        self.identity.sign_in(user);
        self.session.start().await?;
        Ok(self.session.status())
    }

    /// Tears the session down, then signs out.
    pub fn sign_out(&mut self) -> Option<UserIdentity> {
        self.session.stop();
        self.identity.sign_out()
    }

    /// Pushes the engine's current realtime settings into the store and the
    /// session.
    ///
    /// A new watched table moves the store's announcements with it, and a
    /// running session is restarted so its subscriber listens there too.
    pub async fn apply_settings(&mut self) -> Result<(), SessionError> {
        let realtime = self.settings_engine.get_settings().realtime.clone();
        let table_changed = self.session.settings().table != realtime.table;
        self.store.set_feed_table(&realtime.table);
        self.session.set_settings(realtime);

        if table_changed && self.session.is_started() {
            info!(table = %self.session.settings().table, "watched table changed, restarting session");
            self.session.start().await?;
        }
        Ok(())
    }
}
