//! The recorder boundary: best-effort persistence that never blocks or fails
//! the reply path.
//!
//! Handlers hand every interaction to [`Recorder::record`]; whether the
//! store accepts it, times out, or is not configured at all, the dispatcher
//! continues and the user gets their reply. Failures become an outcome value
//! plus a log line carrying the user identity for manual reconciliation.

use std::sync::Arc;

use crate::storage::record::{FieldUpdate, InteractionEvent, ProfileSnapshot, UserStats};
use crate::storage::InteractionStore;

/// What happened to one recording attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The store accepted the write.
    Recorded,
    /// No store is configured; the interaction was dropped by design.
    Disabled,
    /// The store rejected or could not complete the write; logged.
    Failed,
}

impl RecordOutcome {
    pub fn is_recorded(self) -> bool {
        matches!(self, RecordOutcome::Recorded)
    }
}

/// Best-effort interaction recorder over an optional store backend.
#[derive(Clone)]
pub struct Recorder {
    store: Option<Arc<dyn InteractionStore>>,
}

impl Recorder {
    pub fn new(store: Option<Arc<dyn InteractionStore>>) -> Self {
        Self { store }
    }

    /// A recorder with no backend; every call returns
    /// [`RecordOutcome::Disabled`].
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Records one interaction (profile snapshot plus at most one field
    /// update). Never panics and never returns an error.
    pub async fn record(
        &self,
        snapshot: &ProfileSnapshot,
        update: Option<FieldUpdate>,
    ) -> RecordOutcome {
        let Some(store) = &self.store else {
            log::debug!(
                "Persistence disabled, dropping interaction for user_id={}",
                snapshot.user_id
            );
            return RecordOutcome::Disabled;
        };

        match store.store_interaction(snapshot, update.as_ref()).await {
            Ok(()) => RecordOutcome::Recorded,
            Err(e) => {
                log::error!(
                    "Failed to record interaction for user_id={}: {}",
                    snapshot.user_id,
                    e
                );
                RecordOutcome::Failed
            }
        }
    }

    /// Appends one row to the detailed event log (no-op for single-sheet
    /// backends).
    pub async fn log_event(&self, event: &InteractionEvent) -> RecordOutcome {
        let Some(store) = &self.store else {
            return RecordOutcome::Disabled;
        };

        match store.log_interaction(event).await {
            Ok(()) => RecordOutcome::Recorded,
            Err(e) => {
                log::error!("Failed to log event for user_id={}: {}", event.user_id, e);
                RecordOutcome::Failed
            }
        }
    }

    /// Readback for the admin stats command. Errors are logged and collapse
    /// to `None` so the command degrades instead of failing.
    pub async fn user_stats(&self, user_id: i64) -> Option<UserStats> {
        let store = self.store.as_ref()?;
        match store.user_stats(user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Failed to read stats for user_id={}: {}", user_id, e);
                None
            }
        }
    }

    /// Total recorded interactions, when the backend can answer.
    pub async fn total_interactions(&self) -> Option<i64> {
        let store = self.store.as_ref()?;
        match store.total_interactions().await {
            Ok(total) => Some(total),
            Err(e) => {
                log::error!("Failed to read total interaction count: {}", e);
                None
            }
        }
    }
}
