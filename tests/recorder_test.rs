//! Integration tests for the recorder boundary: best-effort persistence that
//! never interferes with the reply path.

use std::sync::Arc;

use careerbot::storage::record::{FieldUpdate, InteractionEvent, ProfileSnapshot};
use careerbot::storage::{CsvStore, InteractionStore, RecordOutcome, Recorder};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sheet_recorder(dir: &TempDir) -> (Recorder, Arc<CsvStore>) {
    let store = Arc::new(CsvStore::new(dir.path().join("users.csv")));
    let recorder = Recorder::new(Some(store.clone() as Arc<dyn InteractionStore>));
    (recorder, store)
}

/// Stand-in for the dispatcher's reply step: recording first, then the
/// "send", which must succeed regardless of the recording outcome.
async fn record_then_reply(recorder: &Recorder, snapshot: &ProfileSnapshot) -> Result<RecordOutcome, String> {
    let outcome = recorder.record(snapshot, None).await;
    // The reply itself.
    Ok(outcome)
}

#[tokio::test]
async fn recording_twice_keeps_both_events() {
    let dir = TempDir::new().unwrap();
    let (recorder, store) = sheet_recorder(&dir);
    let snapshot = ProfileSnapshot::new(12345, Some("Asha"), Some("K"), Some("asha_k"));

    assert_eq!(recorder.record(&snapshot, None).await, RecordOutcome::Recorded);
    assert_eq!(
        recorder
            .record(&snapshot, Some(FieldUpdate::clicked_button("Get free PDF")))
            .await,
        RecordOutcome::Recorded
    );

    assert_eq!(store.rows_for(12345).unwrap().len(), 2);
    assert_eq!(recorder.total_interactions().await, Some(2));
}

#[tokio::test]
async fn disabled_recorder_never_blocks_the_reply() {
    let recorder = Recorder::disabled();
    let snapshot = ProfileSnapshot::new(12345, Some("Asha"), Some("K"), None);

    let result = record_then_reply(&recorder, &snapshot).await;
    assert_eq!(result, Ok(RecordOutcome::Disabled));
}

#[tokio::test]
async fn failed_write_is_swallowed_and_the_reply_proceeds() {
    // Point the store at a path whose parent is a *file*, so every write
    // fails while the recorder is still "enabled".
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs_err::write(&blocker, "not a directory").unwrap();

    let store = Arc::new(CsvStore::new(blocker.join("users.csv")));
    let recorder = Recorder::new(Some(store as Arc<dyn InteractionStore>));
    let snapshot = ProfileSnapshot::new(12345, Some("Asha"), Some("K"), None);

    let result = record_then_reply(&recorder, &snapshot).await;
    assert_eq!(result, Ok(RecordOutcome::Failed));
}

#[tokio::test]
async fn sheet_backend_ignores_the_separate_event_log() {
    let dir = TempDir::new().unwrap();
    let (recorder, store) = sheet_recorder(&dir);

    let outcome = recorder
        .log_event(&InteractionEvent {
            user_id: 12345,
            message_text: "/start".to_string(),
            bot_response: "main menu".to_string(),
            interaction_type: "command".to_string(),
        })
        .await;

    // Accepted as a no-op; the sheet itself is the event history.
    assert_eq!(outcome, RecordOutcome::Recorded);
    assert_eq!(store.total_rows().unwrap(), 0);
}
