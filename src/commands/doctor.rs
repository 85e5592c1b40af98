// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::report::is_boilerplate;
use crate::store::{read_table, StoreTable, TIMESTAMP_COLUMN, TIMESTAMP_FORMAT};
use crate::utils::{pretty_table, try_parse_currency};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;

/// (issue, detail) pairs; line numbers count the header as line 1.
pub fn find_issues(table: &StoreTable) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let ts_idx = table.column_index(TIMESTAMP_COLUMN);
    if ts_idx.is_none() {
        rows.push(vec!["missing_timestamp_column".into(), TIMESTAMP_COLUMN.into()]);
    }
    let width = table.headers.len();

    for (i, r) in table.rows.iter().enumerate() {
        let line = i + 2;
        if r.len() < width {
            rows.push(vec![
                "short_row".into(),
                format!("line {}: {} of {} columns", line, r.len(), width),
            ]);
        } else if r.len() > width {
            rows.push(vec![
                "untracked_columns".into(),
                format!("line {}: {} cells beyond the header", line, r.len() - width),
            ]);
        }
        for (j, cell) in r.iter().enumerate() {
            if Some(j) == ts_idx {
                if is_boilerplate(cell) {
                    rows.push(vec!["boilerplate_timestamp".into(), format!("line {}: {}", line, cell)]);
                } else if NaiveDateTime::parse_from_str(cell.trim(), TIMESTAMP_FORMAT).is_err() {
                    rows.push(vec!["bad_timestamp".into(), format!("line {}: {}", line, cell)]);
                }
            } else if j < width && try_parse_currency(cell).is_none() {
                rows.push(vec![
                    "bad_value".into(),
                    format!("line {} '{}': {}", line, table.headers[j], cell),
                ]);
            }
        }
    }
    rows
}

pub fn handle(settings: &Settings) -> Result<()> {
    let table = read_table(&settings.store_path)
        .with_context(|| format!("Read store {}", settings.store_path.display()))?;
    let rows = find_issues(&table);
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
