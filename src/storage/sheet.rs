//! File-backed interaction store: one CSV file with a header row, one row
//! appended per recorded event (the sheet variant keeps no per-user
//! aggregate, trading the upsert for a complete event history).
//!
//! Schema handling follows the spreadsheet deployments: an absent file is
//! created with the baseline header; an existing file gets any missing
//! baseline column appended to its header (existing columns are never
//! removed or reordered); an unreadable file is discarded and recreated.
//! That last path is destructive and is logged loudly, since it drops every
//! prior row in that file.

use std::path::{Path, PathBuf};

use crate::core::error::{StoreError, StoreResult};
use crate::storage::record::{
    ist_timestamp, FieldUpdate, ProfileSnapshot, BASELINE_HEADER, FIELD_DEFAULT,
};

/// CSV-backed store.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates, migrates, or (as a last resort) recreates the file so that
    /// its header is a superset of the baseline. Idempotent.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs_err::create_dir_all(parent)?;
            }
        }

        if !self.path.exists() {
            log::info!("User data file {} not found, creating", self.path.display());
            return self.write_all(&baseline_header(), &[]);
        }

        let (header, records) = match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                // Destructive recovery: the old contents are unreadable and
                // will be dropped. There is nothing to salvage, but make the
                // loss impossible to miss in the logs.
                log::error!(
                    "User data file {} is unreadable ({}); recreating with baseline header. ALL PRIOR ROWS IN THIS FILE ARE LOST",
                    self.path.display(),
                    StoreError::StoreCorrupt(e.to_string())
                );
                return self.write_all(&baseline_header(), &[]);
            }
        };

        let migrated = migrate_header(&header);
        if migrated.len() != header.len() {
            for added in &migrated[header.len()..] {
                log::info!("Adding missing column to {}: {}", self.path.display(), added);
            }
            return self.write_all(&migrated, &records);
        }

        Ok(())
    }

    /// Appends one event row. The header is (re)checked first, the way the
    /// spreadsheet variant reloads the workbook on every write.
    pub fn append_interaction(
        &self,
        snapshot: &ProfileSnapshot,
        update: Option<&FieldUpdate>,
    ) -> StoreResult<()> {
        self.ensure_schema()?;
        let (header, _) = self.load()?;
        let row = build_row(&header, snapshot, update, &ist_timestamp());

        let file = fs_err::OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;
        log::info!("Appended interaction row for user_id={}", snapshot.user_id);
        Ok(())
    }

    /// All data rows for one user, as (header-name → value) is not needed by
    /// callers; raw cells in header order are enough for counting and tests.
    pub fn rows_for(&self, user_id: i64) -> StoreResult<Vec<Vec<String>>> {
        let (header, records) = self.load()?;
        let id_column = header.iter().position(|h| h == "User ID").unwrap_or(0);
        let wanted = user_id.to_string();
        Ok(records
            .into_iter()
            .filter(|row| row.get(id_column).is_some_and(|cell| *cell == wanted))
            .collect())
    }

    /// Number of data rows in the file (every row is one recorded event).
    pub fn total_rows(&self) -> StoreResult<i64> {
        let (_, records) = self.load()?;
        Ok(records.len() as i64)
    }

    /// Current header row.
    pub fn header(&self) -> StoreResult<Vec<String>> {
        Ok(self.load()?.0)
    }

    fn load(&self) -> StoreResult<(Vec<String>, Vec<Vec<String>>)> {
        let file = fs_err::File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok((header, records))
    }

    fn write_all(&self, header: &[String], records: &[Vec<String>]) -> StoreResult<()> {
        let file = fs_err::File::create(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(header)?;
        for record in records {
            // Existing rows may be narrower than a freshly migrated header.
            let mut padded = record.clone();
            padded.resize(header.len(), String::new());
            writer.write_record(&padded)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn baseline_header() -> Vec<String> {
    BASELINE_HEADER.iter().map(|s| s.to_string()).collect()
}

/// Appends any baseline column missing from an existing header. Existing
/// columns keep their positions; nothing is ever dropped.
fn migrate_header(existing: &[String]) -> Vec<String> {
    let mut header = existing.to_vec();
    for column in BASELINE_HEADER {
        if !header.iter().any(|h| h == column) {
            header.push(column.to_string());
        }
    }
    header
}

/// Builds one event row against the current header. Cells are located by
/// header name; a field whose column is somehow absent after migration is
/// logged and skipped rather than failing the write.
fn build_row(
    header: &[String],
    snapshot: &ProfileSnapshot,
    update: Option<&FieldUpdate>,
    timestamp: &str,
) -> Vec<String> {
    let mut row = vec![FIELD_DEFAULT.to_string(); header.len()];
    set_cell(header, &mut row, "User ID", snapshot.user_id.to_string());
    set_cell(header, &mut row, "Name", snapshot.name.clone());
    set_cell(header, &mut row, "Username", snapshot.username.clone());
    set_cell(header, &mut row, "Timestamp", timestamp.to_string());
    if let Some(update) = update {
        set_cell(header, &mut row, update.field.header(), update.value.clone());
    }
    row
}

fn set_cell(header: &[String], row: &mut [String], column: &str, value: String) {
    match header.iter().position(|h| h == column) {
        Some(index) => row[index] = value,
        None => log::warn!("Column '{}' not found in header, value dropped", column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::InteractionField;
    use pretty_assertions::assert_eq;

    #[test]
    fn migrate_header_appends_missing_columns_only() {
        let existing: Vec<String> = ["User ID", "Name", "Username", "Timestamp"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let migrated = migrate_header(&existing);

        assert_eq!(&migrated[..4], &existing[..]);
        assert_eq!(migrated.len(), BASELINE_HEADER.len());
        assert!(migrated.iter().any(|h| h == "Referral Source"));
    }

    #[test]
    fn migrate_header_keeps_extra_columns() {
        let mut existing = super::baseline_header();
        existing.push("Campaign".to_string());
        let migrated = migrate_header(&existing);
        assert_eq!(migrated, existing);
    }

    #[test]
    fn migrate_header_is_idempotent() {
        let once = migrate_header(&["Name".to_string()]);
        let twice = migrate_header(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn build_row_places_update_in_its_column() {
        let header = super::baseline_header();
        let snapshot = ProfileSnapshot::new(12345, Some("Asha"), Some("K"), Some("asha_k"));
        let update = FieldUpdate::new(InteractionField::ClickedButton, "Get free PDF");
        let row = build_row(&header, &snapshot, Some(&update), "2025-01-15 17:30:00");

        assert_eq!(row[0], "12345");
        assert_eq!(row[1], "Asha K");
        assert_eq!(row[2], "asha_k");
        assert_eq!(row[3], "2025-01-15 17:30:00");
        assert_eq!(row[7], "Get free PDF");
        // Everything else keeps the default
        assert_eq!(row[6], FIELD_DEFAULT);
        assert_eq!(row[11], FIELD_DEFAULT);
    }

    #[test]
    fn build_row_without_update_is_all_defaults_past_profile() {
        let header = super::baseline_header();
        let snapshot = ProfileSnapshot::new(7, None, None, None);
        let row = build_row(&header, &snapshot, None, "2025-01-15 17:30:00");
        assert!(row[4..].iter().all(|cell| cell == FIELD_DEFAULT));
    }
}
