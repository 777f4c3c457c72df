//! Interaction persistence: store backends, domain records, and the
//! best-effort recorder boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config;
use crate::core::error::StoreResult;

pub mod db;
pub mod record;
pub mod recorder;
pub mod sheet;

// Re-exports for convenience
pub use db::{MysqlConfig, MysqlStore};
pub use record::{FieldUpdate, InteractionEvent, InteractionField, ProfileSnapshot, UserStats};
pub use recorder::{RecordOutcome, Recorder};
pub use sheet::CsvStore;

/// A durable destination for interaction records.
///
/// Implementations own their connection lifecycle: every call acquires
/// whatever handle it needs and releases it before returning. The trait is
/// object-safe so handlers can be wired against a test double.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Short backend description for startup logs.
    fn describe(&self) -> String;

    /// Idempotently ensures the destination schema exists.
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Persists one interaction: upsert keyed by user in table-backed
    /// stores, one appended row in sheet-backed stores.
    async fn store_interaction(
        &self,
        snapshot: &ProfileSnapshot,
        update: Option<&FieldUpdate>,
    ) -> StoreResult<()>;

    /// Appends one row to the detailed event log.
    async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()>;

    /// Per-user readback, where the backend keeps an aggregate.
    async fn user_stats(&self, user_id: i64) -> StoreResult<Option<UserStats>>;

    /// Total recorded interactions.
    async fn total_interactions(&self) -> StoreResult<i64>;
}

#[async_trait]
impl InteractionStore for MysqlStore {
    fn describe(&self) -> String {
        "MySQL (telegram_users + telegram_interaction_logs)".to_string()
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        MysqlStore::ensure_schema(self).await
    }

    async fn store_interaction(
        &self,
        snapshot: &ProfileSnapshot,
        update: Option<&FieldUpdate>,
    ) -> StoreResult<()> {
        MysqlStore::store_interaction(self, snapshot, update).await
    }

    async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()> {
        MysqlStore::log_interaction(self, event).await
    }

    async fn user_stats(&self, user_id: i64) -> StoreResult<Option<UserStats>> {
        MysqlStore::user_stats(self, user_id).await
    }

    async fn total_interactions(&self) -> StoreResult<i64> {
        MysqlStore::total_interactions(self).await
    }
}

#[async_trait]
impl InteractionStore for CsvStore {
    fn describe(&self) -> String {
        format!("CSV sheet ({})", self.path().display())
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        CsvStore::ensure_schema(self)
    }

    async fn store_interaction(
        &self,
        snapshot: &ProfileSnapshot,
        update: Option<&FieldUpdate>,
    ) -> StoreResult<()> {
        self.append_interaction(snapshot, update)
    }

    async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()> {
        // The sheet keeps one row per event already; a second log row would
        // double-count the interaction.
        log::debug!(
            "Sheet store has no separate event log (user_id={}, type={})",
            event.user_id,
            event.interaction_type
        );
        Ok(())
    }

    async fn user_stats(&self, _user_id: i64) -> StoreResult<Option<UserStats>> {
        Ok(None)
    }

    async fn total_interactions(&self) -> StoreResult<i64> {
        self.total_rows()
    }
}

/// Picks the store backend from the environment: MySQL when the full
/// credential set is present, the CSV sheet when only a file path is
/// configured, otherwise none (persistence disabled, bot keeps serving
/// replies).
pub fn store_from_env() -> Option<Arc<dyn InteractionStore>> {
    match MysqlConfig::from_env() {
        Ok(cfg) => Some(Arc::new(MysqlStore::new(cfg))),
        Err(e) => {
            log::warn!("MySQL store not configured: {}", e);
            match config::USER_DATA_FILE.as_ref() {
                Some(path) => {
                    log::info!("Using CSV sheet store at {}", path);
                    Some(Arc::new(CsvStore::new(path)))
                }
                None => {
                    log::warn!(
                        "No store configured (set MYSQL* variables or USER_DATA_FILE); interactions will not be recorded"
                    );
                    None
                }
            }
        }
    }
}
