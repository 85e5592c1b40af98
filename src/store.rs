// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Append-only CSV log of snapshots.
//!
//! The header is `fecha, <label> Compra, <label> Venta, ...`. Rows are only
//! ever appended; a row written before a column existed stays short.

use crate::models::Snapshot;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const TIMESTAMP_COLUMN: &str = "fecha";
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M";
pub const BUY_SUFFIX: &str = "Compra";
pub const SELL_SUFFIX: &str = "Venta";
pub const MISSING_VALUE: &str = "0";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("store CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("replace store header: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// What to do with the header when a snapshot carries labels it lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Header is written once and never rewritten; new columns trail the
    /// row without a name.
    #[default]
    Frozen,
    /// Header line is extended in place; existing rows are left as-is.
    Grow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub header_written: bool,
    pub new_columns: Vec<String>,
}

/// The whole store as string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StoreTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

pub fn buy_column(label: &str) -> String {
    format!("{} {}", label, BUY_SUFFIX)
}

pub fn sell_column(label: &str) -> String {
    format!("{} {}", label, SELL_SUFFIX)
}

/// Header a fresh store gets for this snapshot.
pub fn header_for(snapshot: &Snapshot) -> Vec<String> {
    let mut header = vec![TIMESTAMP_COLUMN.to_string()];
    for label in snapshot.labels() {
        header.push(buy_column(label));
        header.push(sell_column(label));
    }
    header
}

// At most two decimals, so `985.125` can never be read back as a
// thousands-grouped `985125`.
fn snapshot_cells(snapshot: &Snapshot) -> Vec<(String, String)> {
    let cell = |v: Option<rust_decimal::Decimal>| {
        v.map(|d| d.round_dp(2).to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string())
    };
    snapshot
        .quotes
        .iter()
        .flat_map(|q| {
            [
                (buy_column(&q.label), cell(q.buy)),
                (sell_column(&q.label), cell(q.sell)),
            ]
        })
        .collect()
}

/// Lay out one row against `header`. Returns the row and the names of the
/// columns that were appended past the header's end.
pub fn row_for(header: &[String], snapshot: &Snapshot) -> (Vec<String>, Vec<String>) {
    let cells = snapshot_cells(snapshot);
    let by_column: HashMap<&str, &str> = cells
        .iter()
        .map(|(c, v)| (c.as_str(), v.as_str()))
        .collect();

    let mut row: Vec<String> = header
        .iter()
        .map(|col| {
            if col == TIMESTAMP_COLUMN {
                snapshot.captured_at.format(TIMESTAMP_FORMAT).to_string()
            } else {
                by_column
                    .get(col.as_str())
                    .copied()
                    .unwrap_or(MISSING_VALUE)
                    .to_string()
            }
        })
        .collect();

    let mut extra = Vec::new();
    for (col, value) in &cells {
        if !header.iter().any(|h| h == col) {
            extra.push(col.clone());
            row.push(value.clone());
        }
    }
    (row, extra)
}

/// First record of the store, or `None` when the file is absent or empty.
pub fn read_header(path: &Path) -> Result<Option<Vec<String>>, StoreError> {
    if !path.exists() || fs::metadata(path)?.len() == 0 {
        return Ok(None);
    }
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let header = rdr.headers()?.iter().map(str::to_string).collect();
    Ok(Some(header))
}

pub fn read_table(path: &Path) -> Result<StoreTable, StoreError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(StoreTable { headers, rows })
}

fn encode_record(record: &[String]) -> Result<Vec<u8>, StoreError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());
    wtr.write_record(record)?;
    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))
}

/// Append one snapshot as a single row, writing the header first when the
/// store does not exist yet.
pub fn append_snapshot(
    path: &Path,
    snapshot: &Snapshot,
    policy: HeaderPolicy,
) -> Result<AppendOutcome, StoreError> {
    let Some(header) = read_header(path)? else {
        let header = header_for(snapshot);
        let (row, _) = row_for(&header, snapshot);
        let mut buf = encode_record(&header)?;
        buf.extend(encode_record(&row)?);
        write_appending(path, &buf)?;
        debug!(path = %path.display(), columns = header.len(), "created store");
        return Ok(AppendOutcome {
            header_written: true,
            new_columns: Vec::new(),
        });
    };

    let (row, new_columns) = row_for(&header, snapshot);
    let line = encode_record(&row)?;

    if new_columns.is_empty() {
        write_appending(path, &line)?;
        return Ok(AppendOutcome::default());
    }

    match policy {
        HeaderPolicy::Frozen => {
            warn!(
                columns = ?new_columns,
                "store header is frozen; new columns are written without a name"
            );
            write_appending(path, &line)?;
            Ok(AppendOutcome {
                header_written: false,
                new_columns,
            })
        }
        HeaderPolicy::Grow => {
            let mut grown = header.clone();
            grown.extend(new_columns.iter().cloned());
            replace_header(path, &grown, &line)?;
            warn!(columns = ?new_columns, "extended store header");
            Ok(AppendOutcome {
                header_written: true,
                new_columns,
            })
        }
    }
}

fn write_appending(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    f.write_all(bytes)?;
    f.flush()?;
    Ok(())
}

// Swaps the first line for `header` and appends `row`, via a temp file in
// the same directory so the store is never seen half-written.
fn replace_header(path: &Path, header: &[String], row: &[u8]) -> Result<(), StoreError> {
    let existing = fs::read(path)?;
    let body = match existing.iter().position(|b| *b == b'\n') {
        Some(i) => &existing[i + 1..],
        None => &[][..],
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&encode_record(header)?)?;
    tmp.write_all(body)?;
    tmp.write_all(row)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
