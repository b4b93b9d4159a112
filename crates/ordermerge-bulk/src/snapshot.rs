//! Decoding of the variant snapshot artifact into a [`SnapshotTable`].
//!
//! The artifact is JSONL: one `{"id": "gid://shopify/ProductVariant/…", "sku": "…"}`
//! object per line. Lines are read and inserted one at a time so memory is
//! bounded by the table, not the file. A line that is not valid JSON is a
//! hard error; the file comes from the platform and a bad line means the
//! download is corrupt. Variants without a SKU are skipped because no order
//! line can reference them.
//!
//! The `sku,id` CSV written by [`export_snapshot_csv`] is an inspection aid
//! and can be fed back through [`load_snapshot_csv`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ordermerge_core::{SnapshotEntry, SnapshotTable};
use serde::Deserialize;

use crate::client::part_path;
use crate::error::BulkError;

/// One raw JSONL record. `sku` is nullable on the platform side.
#[derive(Debug, Deserialize)]
struct VariantLine {
    id: String,
    #[serde(default)]
    sku: Option<String>,
}

/// Reads a JSONL artifact into a SKU lookup table. Later duplicates win.
///
/// # Errors
///
/// - [`BulkError::Io`] if the file cannot be opened or read.
/// - [`BulkError::MalformedSnapshotLine`] on the first line that is not a
///   `{"id", "sku"}` record.
pub fn decode_snapshot(path: &Path) -> Result<SnapshotTable, BulkError> {
    let mut table = SnapshotTable::new();
    let mut duplicates = 0usize;

    let lines = visit_entries(path, |entry| {
        if let Some(previous) = table.insert(entry) {
            duplicates += 1;
            tracing::debug!(replaced = %previous, "duplicate SKU in snapshot; keeping later id");
        }
        Ok(())
    })?;

    if duplicates > 0 {
        tracing::warn!(duplicates, "snapshot contains duplicate SKUs; last id wins");
    }
    tracing::info!(path = %path.display(), lines, skus = table.len(), "decoded variant snapshot");
    Ok(table)
}

/// Converts a JSONL artifact to a `sku,id` CSV at `csv_path`. Returns the
/// number of rows written.
///
/// The CSV is written next to its final name and renamed into place.
///
/// # Errors
///
/// - [`BulkError::Io`] / [`BulkError::MalformedSnapshotLine`] as for [`decode_snapshot`].
/// - [`BulkError::Csv`] if a row cannot be written.
pub fn export_snapshot_csv(jsonl_path: &Path, csv_path: &Path) -> Result<usize, BulkError> {
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BulkError::io(parent, e))?;
    }

    let tmp_path = part_path(csv_path);
    let csv_err = |source: csv::Error| BulkError::Csv {
        path: csv_path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(&tmp_path).map_err(csv_err)?;
    let mut rows = 0usize;
    let result = visit_entries(jsonl_path, |entry| {
        writer.serialize(&entry).map_err(csv_err)?;
        rows += 1;
        Ok(())
    })
    .and_then(|_| writer.flush().map_err(|e| BulkError::io(&tmp_path, e)));
    drop(writer);

    if let Err(err) = result {
        if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
            tracing::debug!(path = %tmp_path.display(), error = %cleanup, "no partial CSV to remove");
        }
        return Err(err);
    }

    std::fs::rename(&tmp_path, csv_path).map_err(|e| BulkError::io(csv_path, e))?;
    tracing::info!(path = %csv_path.display(), rows, "wrote snapshot CSV");
    Ok(rows)
}

/// Reads a `sku,id` CSV produced by [`export_snapshot_csv`].
///
/// # Errors
///
/// Returns [`BulkError::Csv`] if the file cannot be opened or a row lacks
/// either column.
pub fn load_snapshot_csv(csv_path: &Path) -> Result<SnapshotTable, BulkError> {
    let csv_err = |source: csv::Error| BulkError::Csv {
        path: csv_path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(csv_path).map_err(csv_err)?;
    let mut table = SnapshotTable::new();
    for row in reader.deserialize::<SnapshotEntry>() {
        let entry = row.map_err(csv_err)?;
        if entry.sku.is_empty() {
            continue;
        }
        table.insert(entry);
    }

    tracing::info!(path = %csv_path.display(), skus = table.len(), "loaded snapshot CSV");
    Ok(table)
}

/// Loads a snapshot from either format, chosen by file extension
/// (`.csv` → [`load_snapshot_csv`], anything else → [`decode_snapshot`]).
///
/// # Errors
///
/// Propagates the error of the selected loader.
pub fn load_snapshot(path: &Path) -> Result<SnapshotTable, BulkError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_snapshot_csv(path)
    } else {
        decode_snapshot(path)
    }
}

/// Calls `visit` for every SKU-bearing record in the JSONL file at `path`.
/// Returns the number of non-blank lines read.
fn visit_entries<F>(path: &Path, mut visit: F) -> Result<usize, BulkError>
where
    F: FnMut(SnapshotEntry) -> Result<(), BulkError>,
{
    let file = File::open(path).map_err(|e| BulkError::io(path, e))?;
    let reader = BufReader::new(file);
    let mut records = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| BulkError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        records += 1;

        let record: VariantLine =
            serde_json::from_str(trimmed).map_err(|e| BulkError::MalformedSnapshotLine {
                path: path.to_path_buf(),
                line: idx + 1,
                source: e,
            })?;

        let sku = record.sku.as_deref().map(str::trim).unwrap_or_default();
        if sku.is_empty() {
            tracing::debug!(id = %record.id, "variant has no SKU; not indexed");
            continue;
        }

        visit(SnapshotEntry {
            sku: sku.to_string(),
            id: record.id,
        })?;
    }

    Ok(records)
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
