// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly report: store -> cleaned rows -> month window -> PDF with a
//! table page and a chart page.

pub mod chart;
pub mod pdf;

use crate::store::{self, StoreError, StoreTable, TIMESTAMP_COLUMN, TIMESTAMP_FORMAT};
use crate::utils::{fmt_money, try_parse_currency};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use chart::ChartSpec;

/// Text that leaks into the date cell when the page layout shifts.
pub const BOILERPLATE_MARKERS: &[&str] = &["actualizado", "última vez", "last updated"];

pub const PLACEHOLDER: &str = "-";

/// Quote types the table lists for every row: (name, buy column, sell column).
pub const QUOTE_TYPES: &[(&str, &str, &str)] = &[
    ("Dólar blue", "Dólar blue Compra", "Dólar blue Venta"),
    ("Dólar Oficial", "Dólar Oficial Compra", "Dólar Oficial Venta"),
    ("Dólar MEP/Bolsa", "Dólar MEP/Bolsa Compra", "Dólar MEP/Bolsa Venta"),
    ("Contado con liqui", "Contado con liqui Compra", "Contado con liqui Venta"),
    ("Dólar cripto", "Dólar cripto Compra", "Dólar cripto Venta"),
    ("Dólar Tarjeta", "Dólar Tarjeta Compra", "Dólar Tarjeta Venta"),
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no data for period {month}")]
    NoData { month: String },
    #[error("store has no '{}' column", TIMESTAMP_COLUMN)]
    MissingTimestampColumn,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("chart: {0}")]
    Chart(String),
    #[error("pdf: {0}")]
    Pdf(String),
    #[error("report I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub timestamp: NaiveDateTime,
    /// One entry per `ReportData::columns`; `None` when the row ends
    /// before that column.
    pub cells: Vec<Option<Decimal>>,
}

/// Store rows with parsed timestamps and numeric cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportData {
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

pub fn is_boilerplate(cell: &str) -> bool {
    let lower = cell.to_lowercase();
    BOILERPLATE_MARKERS.iter().any(|m| lower.contains(m))
}

impl ReportData {
    pub fn from_table(table: &StoreTable) -> Result<Self, ReportError> {
        let ts_idx = table
            .column_index(TIMESTAMP_COLUMN)
            .ok_or(ReportError::MissingTimestampColumn)?;
        let value_idx: Vec<usize> = (0..table.headers.len()).filter(|i| *i != ts_idx).collect();
        let columns = value_idx.iter().map(|i| table.headers[*i].clone()).collect();

        let mut rows = Vec::new();
        for (line, raw) in table.rows.iter().enumerate() {
            let Some(cell) = raw.get(ts_idx) else {
                debug!(line, "row has no timestamp cell");
                continue;
            };
            if is_boilerplate(cell) {
                debug!(line, cell = cell.as_str(), "skipping boilerplate timestamp");
                continue;
            }
            let timestamp = match NaiveDateTime::parse_from_str(cell.trim(), TIMESTAMP_FORMAT) {
                Ok(t) => t,
                Err(_) => {
                    debug!(line, cell = cell.as_str(), "dropping row with unparsable timestamp");
                    continue;
                }
            };
            let cells = value_idx
                .iter()
                .map(|i| {
                    raw.get(*i).map(|v| {
                        try_parse_currency(v).unwrap_or_else(|| {
                            warn!(
                                column = table.headers[*i].as_str(),
                                value = v.as_str(),
                                "unparsable value, using 0"
                            );
                            Decimal::ZERO
                        })
                    })
                })
                .collect();
            rows.push(ReportRow { timestamp, cells });
        }
        Ok(Self { columns, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by column name; `None` for unknown columns too.
    pub fn value(&self, row: &ReportRow, column: &str) -> Option<Decimal> {
        self.column_index(column)
            .and_then(|i| row.cells.get(i).copied().flatten())
    }

    /// Rows with `start <= timestamp <= end`, in store order.
    pub fn within(&self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.timestamp >= start && r.timestamp <= end)
                .cloned()
                .collect(),
        }
    }
}

/// From the first instant of the reference month to the last instant of
/// the reference day.
pub fn month_window(reference: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let day = reference.date();
    let first = NaiveDate::from_ymd_opt(day.year(), day.month(), 1).unwrap_or(day);
    let midnight = NaiveTime::default();
    let end = day
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| day.and_time(midnight));
    (first.and_time(midnight), end)
}

#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub data: ReportData,
}

impl MonthlyReport {
    pub fn build(table: &StoreTable, reference: NaiveDateTime) -> Result<Self, ReportError> {
        let all = ReportData::from_table(table)?;
        let (start, end) = month_window(reference);
        let data = all.within(start, end);
        if data.rows.is_empty() {
            return Err(ReportError::NoData {
                month: start.format("%Y-%m").to_string(),
            });
        }
        Ok(Self { start, end, data })
    }

    pub fn title(&self) -> String {
        format!("Informe Mensual del Dólar - {}", self.start.format("%B %Y"))
    }

    /// One row per (date, quote type); absent columns render as a dash.
    pub fn table_rows(&self) -> Vec<[String; 4]> {
        let cell = |row: &ReportRow, col: &str| {
            self.data
                .value(row, col)
                .map(|d| fmt_money(&d))
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        };
        let mut out = Vec::new();
        for row in &self.data.rows {
            let date = row.timestamp.format("%Y-%m-%d").to_string();
            for (name, buy, sell) in QUOTE_TYPES {
                out.push([date.clone(), name.to_string(), cell(row, buy), cell(row, sell)]);
            }
        }
        out
    }

    pub fn chart(&self) -> ChartSpec {
        ChartSpec::from_data(&self.data, self.start)
    }
}

fn scratch_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn render(store_path: &Path, output: &Path, reference: NaiveDateTime) -> Result<MonthlyReport, ReportError> {
    let table = store::read_table(store_path)?;
    let report = MonthlyReport::build(&table, reference)?;
    let chart = report.chart();

    // Removed when dropped, whichever way this function returns.
    let chart_file = tempfile::Builder::new()
        .prefix(".ratewatch-chart-")
        .suffix(".png")
        .tempfile_in(scratch_dir(output))?;
    chart.render_png(chart_file.path(), pdf::CHART_PIXELS)?;
    pdf::write_report(&report, &chart, chart_file.path(), output)?;
    Ok(report)
}

/// Build the monthly PDF for the month containing `reference` (default:
/// now). Failures are logged before being returned.
pub fn generate_monthly_report(
    store_path: &Path,
    output: &Path,
    reference: Option<NaiveDateTime>,
) -> Result<MonthlyReport, ReportError> {
    let reference = reference.unwrap_or_else(|| Local::now().naive_local());
    match render(store_path, output, reference) {
        Ok(report) => {
            info!(
                output = %output.display(),
                rows = report.data.rows.len(),
                "monthly report written"
            );
            Ok(report)
        }
        Err(e) => {
            error!(store = %store_path.display(), output = %output.display(), "report failed: {e}");
            Err(e)
        }
    }
}
