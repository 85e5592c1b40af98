// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use ratewatch::models::{QuoteRecord, Snapshot};
use ratewatch::store::{append_snapshot, read_header, read_table, HeaderPolicy};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn snapshot(when: NaiveDateTime, labels: &[&str], base: i64) -> Snapshot {
    Snapshot {
        captured_at: when,
        quotes: labels
            .iter()
            .enumerate()
            .map(|(i, l)| QuoteRecord {
                label: l.to_string(),
                buy: Some(Decimal::new(base + i as i64, 0)),
                sell: Some(Decimal::new(base + i as i64 + 10, 0)),
            })
            .collect(),
    }
}

#[test]
fn appends_keep_one_header_and_insertion_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.csv");
    for day in 1..=5 {
        let out = append_snapshot(&path, &snapshot(at(day, 10), &["A", "B"], 100 * day as i64), HeaderPolicy::Frozen)
            .unwrap();
        assert_eq!(out.header_written, day == 1);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert_eq!(text.lines().next().unwrap(), "fecha,A Compra,A Venta,B Compra,B Venta");

    let table = read_table(&path).unwrap();
    let stamps: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        stamps,
        ["01/05/24 10:00", "02/05/24 10:00", "03/05/24 10:00", "04/05/24 10:00", "05/05/24 10:00"]
    );
    assert_eq!(table.rows[2], ["03/05/24 10:00", "300", "310", "301", "311"]);
}

#[test]
fn empty_file_gets_a_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.csv");
    std::fs::write(&path, "").unwrap();
    assert_eq!(read_header(&path).unwrap(), None);

    let out = append_snapshot(&path, &snapshot(at(1, 9), &["A"], 1), HeaderPolicy::Frozen).unwrap();
    assert!(out.header_written);
    assert_eq!(read_header(&path).unwrap().unwrap(), ["fecha", "A Compra", "A Venta"]);
}

#[test]
fn label_missing_from_a_later_run_is_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.csv");
    append_snapshot(&path, &snapshot(at(1, 9), &["A", "B"], 1), HeaderPolicy::Frozen).unwrap();
    append_snapshot(&path, &snapshot(at(2, 9), &["B"], 5), HeaderPolicy::Frozen).unwrap();

    let table = read_table(&path).unwrap();
    assert_eq!(table.rows[1], ["02/05/24 09:00", "0", "0", "5", "15"]);
}

#[test]
fn absent_values_are_written_as_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.csv");
    let mut snap = snapshot(at(1, 9), &["A"], 1);
    snap.quotes[0].buy = None;
    append_snapshot(&path, &snap, HeaderPolicy::Frozen).unwrap();

    let table = read_table(&path).unwrap();
    assert_eq!(table.rows[0], ["01/05/24 09:00", "0", "11"]);
}

#[test]
fn frozen_header_leaves_new_columns_unnamed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.csv");
    append_snapshot(&path, &snapshot(at(1, 9), &["A", "B"], 1), HeaderPolicy::Frozen).unwrap();
    let out = append_snapshot(&path, &snapshot(at(2, 9), &["A", "B", "C"], 1), HeaderPolicy::Frozen).unwrap();

    assert!(!out.header_written);
    assert_eq!(out.new_columns, ["C Compra", "C Venta"]);
    let table = read_table(&path).unwrap();
    assert_eq!(table.headers.len(), 5);
    assert_eq!(table.rows[0].len(), 5);
    assert_eq!(table.rows[1].len(), 7);
    assert_eq!(table.rows[1][5], "3");
}

#[test]
fn grow_header_names_new_columns_without_touching_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.csv");
    append_snapshot(&path, &snapshot(at(1, 9), &["A", "B"], 1), HeaderPolicy::Grow).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();
    let first_row = before.lines().nth(1).unwrap().to_string();

    let out = append_snapshot(&path, &snapshot(at(2, 9), &["A", "B", "C"], 1), HeaderPolicy::Grow).unwrap();
    assert!(out.header_written);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "fecha,A Compra,A Venta,B Compra,B Venta,C Compra,C Venta");
    assert_eq!(lines[1], first_row);

    let table = read_table(&path).unwrap();
    let c_sell = table.column_index("C Venta").unwrap();
    assert!(table.rows[0].get(c_sell).is_none());
    assert_eq!(table.rows[1][c_sell], "13");
}
