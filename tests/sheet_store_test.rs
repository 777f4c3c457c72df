//! Integration tests for the CSV sheet store: schema creation, header
//! migration, destructive recovery, and append semantics.

use careerbot::storage::record::{FieldUpdate, ProfileSnapshot, BASELINE_HEADER, FIELD_DEFAULT};
use careerbot::storage::CsvStore;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> CsvStore {
    CsvStore::new(dir.path().join("telegram_user_data_all.csv"))
}

fn asha() -> ProfileSnapshot {
    ProfileSnapshot::new(12345, Some("Asha"), Some("K"), Some("asha_k"))
}

#[test]
fn ensure_schema_creates_file_with_baseline_header() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.ensure_schema().unwrap();

    let header = store.header().unwrap();
    assert_eq!(header, BASELINE_HEADER.map(String::from).to_vec());
    assert_eq!(store.total_rows().unwrap(), 0);
}

#[test]
fn ensure_schema_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path().join("nested/data/users.csv"));

    store.ensure_schema().unwrap();
    assert!(store.path().exists());
}

#[test]
fn ensure_schema_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();

    let header = store.header().unwrap();
    assert_eq!(header.len(), BASELINE_HEADER.len());
    let mut deduped = header.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), header.len(), "no duplicate columns");
}

#[test]
fn ensure_schema_appends_missing_columns_and_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    // Older deployment: only the first four columns existed.
    fs_err::write(
        store.path(),
        "User ID,Name,Username,Timestamp\n111,Old User,old_user,2024-12-01 10:00:00\n",
    )
    .unwrap();

    store.ensure_schema().unwrap();

    let header = store.header().unwrap();
    assert_eq!(header.len(), BASELINE_HEADER.len());
    assert_eq!(&header[..4], &["User ID", "Name", "Username", "Timestamp"]);
    assert!(header.iter().any(|h| h == "Referral Source"));

    let rows = store.rows_for(111).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "Old User");
}

#[test]
fn ensure_schema_recovers_corrupt_file_destructively() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    // Invalid UTF-8 in the header line makes the file unreadable as CSV.
    fs_err::write(store.path(), b"\xff\xfeUser ID,Name\n12345,Asha\n".as_slice()).unwrap();

    store.ensure_schema().unwrap();

    let header = store.header().unwrap();
    assert_eq!(header, BASELINE_HEADER.map(String::from).to_vec());
    assert_eq!(store.total_rows().unwrap(), 0, "prior rows are dropped");
}

#[test]
fn append_n_times_yields_n_rows_for_that_user() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    for _ in 0..3 {
        store.append_interaction(&asha(), None).unwrap();
    }
    let other = ProfileSnapshot::new(999, Some("Ravi"), None, None);
    store.append_interaction(&other, None).unwrap();

    assert_eq!(store.rows_for(12345).unwrap().len(), 3);
    assert_eq!(store.rows_for(999).unwrap().len(), 1);
    assert_eq!(store.total_rows().unwrap(), 4);
}

#[test]
fn field_update_lands_in_its_column_only() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .append_interaction(&asha(), Some(&FieldUpdate::clicked_button("Get free PDF")))
        .unwrap();

    let rows = store.rows_for(12345).unwrap();
    let header = store.header().unwrap();
    let row = &rows[0];

    let clicked = header.iter().position(|h| h == "Clicked Button").unwrap();
    let challenge = header.iter().position(|h| h == "Challenge Response").unwrap();
    assert_eq!(row[clicked], "Get free PDF");
    assert_eq!(row[challenge], FIELD_DEFAULT);
}

#[test]
fn start_then_pdf_scenario() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let header_idx = |header: &[String], name: &str| {
        header.iter().position(|h| h == name).unwrap()
    };

    // /start carries no field update, then the user taps "Get free PDF".
    store.append_interaction(&asha(), None).unwrap();
    store
        .append_interaction(&asha(), Some(&FieldUpdate::clicked_button("Get free PDF")))
        .unwrap();

    let header = store.header().unwrap();
    let rows = store.rows_for(12345).unwrap();
    assert_eq!(rows.len(), 2);

    let clicked = header_idx(&header, "Clicked Button");
    assert_eq!(rows[0][clicked], FIELD_DEFAULT);
    assert_eq!(rows[1][clicked], "Get free PDF");
    assert_eq!(rows[1][header_idx(&header, "Name")], "Asha K");
}

#[test]
fn append_after_migration_lines_up_with_the_extended_header() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    // Older deployment layout, then a write against the migrated header.
    fs_err::write(
        store.path(),
        "User ID,Name,Username,Timestamp\n111,Old User,old_user,2024-12-01 10:00:00\n",
    )
    .unwrap();

    store
        .append_interaction(&asha(), Some(&FieldUpdate::challenge_response("🔹 Other")))
        .unwrap();

    let header = store.header().unwrap();
    let rows = store.rows_for(12345).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), header.len());

    let challenge = header.iter().position(|h| h == "Challenge Response").unwrap();
    assert_eq!(rows[0][challenge], "🔹 Other");
}
