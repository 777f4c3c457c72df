use thiserror::Error;

/// Persistence-layer error taxonomy.
///
/// Every storage failure is converted to one of these variants so callers can
/// tell a missing credential apart from an unreachable server or a failed
/// write. None of them is allowed to cross the recorder boundary into the
/// message-dispatch path; the recorder turns them into an outcome plus a log
/// line (see `storage::recorder`).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required credential or setting absent. No network attempt was made.
    ///
    /// Fatal only for the bot token (checked in `main`); for store
    /// credentials it merely disables persistence.
    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),

    /// Store unreachable after the bounded connect retries.
    #[error("store unreachable after {attempts} attempt(s): {source}")]
    ConnectionUnavailable {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    /// Schema could not be created or its presence could not be verified.
    #[error("schema initialization failed: {0}")]
    SchemaInitFailed(String),

    /// Insert/update/append did not complete. Rolled back where the store is
    /// transactional; logged with the user identity for manual
    /// reconciliation.
    #[error("write failed for user {user_id}: {reason}")]
    WriteFailed { user_id: i64, reason: String },

    /// Existing file store unreadable. Recovery recreates an empty store,
    /// which drops all prior records for that file.
    #[error("store corrupt: {0}")]
    StoreCorrupt(String),

    /// Database-level errors outside the taxonomy above.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Sheet (CSV) parsing/serialization errors.
    #[error("sheet error: {0}")]
    Sheet(#[from] csv::Error),

    /// IO errors from the file-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Wraps any store error as a `WriteFailed` for the given user, keeping
    /// the original failure text for the reconciliation log line.
    pub fn into_write_failed(self, user_id: i64) -> Self {
        match self {
            StoreError::WriteFailed { .. } => self,
            other => StoreError::WriteFailed {
                user_id,
                reason: other.to_string(),
            },
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
