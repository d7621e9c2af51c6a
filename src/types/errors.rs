use thiserror::Error;

// === BookmarkError ===

/// Errors returned by bookmark mutations and snapshot fetches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookmarkError {
    /// No user is signed in.
    #[error("Unauthorized")]
    Unauthorized,
    /// The request was rejected before reaching the store.
    #[error("Invalid bookmark: {0}")]
    InvalidInput(String),
    /// The authoritative store refused to create the record.
    #[error("Database error: {message} ({code})")]
    Create { message: String, code: String },
    /// The authoritative store refused to delete the record.
    #[error("Failed to delete bookmark")]
    Delete { message: String },
    /// Reading from the authoritative store failed.
    #[error("Bookmark database error: {0}")]
    Database(String),
}

// === DecodeError ===

/// A change-feed payload that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// `eventType` is missing or not a string.
    #[error("Missing event type")]
    MissingEventType,
    /// `eventType` names an event this client does not know.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
    /// The `new` or `old` row is missing or not an object.
    #[error("Missing row '{0}' in payload")]
    MissingRow(&'static str),
    /// A required field is absent, empty, or has the wrong type.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

// === SessionError ===

/// Errors from session-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session has not been started, or has been stopped.
    #[error("Session not started")]
    NotStarted,
    #[error(transparent)]
    Bookmark(#[from] BookmarkError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
