// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ratewatch::extractor::{
    self, ExtractError, PageSource, StaticPage, fetch_and_append, parse_snapshot,
};
use ratewatch::models::Snapshot;
use ratewatch::report::MonthlyReport;
use ratewatch::store::{HeaderPolicy, read_table};
use rust_decimal::Decimal;
use tempfile::tempdir;

const PAGE: &str = include_str!("fixtures/dolarhoy.html");

struct Unreachable;

impl PageSource for Unreachable {
    fn fetch(&self, _url: &str) -> Result<String, ExtractError> {
        Err(ExtractError::MissingElement("html"))
    }
}

#[test]
fn snapshot_from_fixture() {
    let snap = parse_snapshot(PAGE).unwrap();
    assert_eq!(
        snap.captured_at,
        NaiveDate::from_ymd_opt(2024, 10, 19)
            .unwrap()
            .and_hms_opt(17, 3, 0)
            .unwrap()
    );
    let labels: Vec<&str> = snap.labels().collect();
    assert_eq!(
        labels,
        [
            "Dólar Oficial",
            "Dólar MEP/Bolsa",
            "Contado con liqui",
            "Dólar cripto",
            "Dólar Tarjeta",
            "Dólar blue",
        ]
    );

    let oficial = snap.quote("Dólar Oficial").unwrap();
    assert_eq!(oficial.buy, Some(Decimal::new(94550, 2)));
    assert_eq!(oficial.sell, Some(Decimal::new(98550, 2)));

    let mep = snap.quote("Dólar MEP/Bolsa").unwrap();
    assert_eq!(mep.buy, Some(Decimal::new(118025, 2)));
    assert_eq!(mep.sell, Some(Decimal::new(118575, 2)));

    let blue = snap.quote("Dólar blue").unwrap();
    assert_eq!(blue.sell, Some(Decimal::new(1210, 0)));
}

#[test]
fn unknown_labels_are_dropped() {
    let snap = parse_snapshot(PAGE).unwrap();
    assert!(snap.quote("Dólar Mayorista").is_none());
    assert_eq!(snap.quotes.len(), 6);
}

#[test]
fn missing_values_stay_absent() {
    let snap = parse_snapshot(PAGE).unwrap();
    let tarjeta = snap.quote("Dólar Tarjeta").unwrap();
    assert_eq!(tarjeta.buy, None);
    assert_eq!(tarjeta.sell, Some(Decimal::new(157680, 2)));
}

#[test]
fn unparsable_value_is_absent_not_fatal() {
    let html = PAGE.replace("$1205.00", "$consultar");
    let snap = parse_snapshot(&html).unwrap();
    assert_eq!(snap.quote("Dólar cripto").unwrap().buy, None);
}

#[test]
fn blue_only_comes_from_its_own_region() {
    // A blue card on the main board is not a board quote.
    let html = PAGE.replace(r#""tile is-parent is-5""#, r#""tile is-parent is-7 is-vertical""#);
    let snap = parse_snapshot(&html).unwrap();
    assert!(snap.quote("Dólar blue").is_none());
    assert_eq!(snap.quotes.len(), 5);
}

#[test]
fn missing_update_tile_fails() {
    let html = PAGE.replace("tile update", "tile footer");
    let err = parse_snapshot(&html).unwrap_err();
    assert!(matches!(err, ExtractError::MissingElement(_)));
}

#[test]
fn malformed_update_text_fails() {
    let html = PAGE.replace("19/10/24 17:03 PM", "hace instantes");
    let err = parse_snapshot(&html).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedTimestamp(_)));
}

#[test]
fn fetch_and_append_writes_one_row() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("datos_dolar.csv");
    let page = StaticPage(PAGE.to_string());

    let snap = fetch_and_append(&page, "https://dolarhoy.com/", &store, HeaderPolicy::Frozen).unwrap();
    assert_eq!(snap.quotes.len(), 6);

    let table = read_table(&store).unwrap();
    assert_eq!(table.headers[0], "fecha");
    assert_eq!(table.headers[1], "Dólar Oficial Compra");
    assert_eq!(table.headers[2], "Dólar Oficial Venta");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][0], "19/10/24 17:03");
    assert_eq!(table.rows[0][1], "945.50");

    let tarjeta_buy = table.column_index("Dólar Tarjeta Compra").unwrap();
    assert_eq!(table.rows[0][tarjeta_buy], "0");
}

#[test]
fn failed_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("datos_dolar.csv");

    assert!(extractor::run(&Unreachable, "https://dolarhoy.com/", &store, HeaderPolicy::Frozen).is_none());
    assert!(!store.exists());

    let broken = StaticPage(PAGE.replace("tile update", "tile other"));
    assert!(extractor::run(&broken, "https://dolarhoy.com/", &store, HeaderPolicy::Frozen).is_none());
    assert!(!store.exists());
}

#[test]
fn page_without_quote_board_fails_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("datos_dolar.csv");
    let html = r#"<html><body>
        <div class="tile update"><span>Actualizado el</span> <span>19/10/24 17:03 PM</span></div>
    </body></html>"#;

    let err = parse_snapshot(html).unwrap_err();
    assert!(matches!(err, ExtractError::MissingElement(_)));

    let page = StaticPage(html.to_string());
    assert!(extractor::run(&page, "https://dolarhoy.com/", &store, HeaderPolicy::Frozen).is_none());
    assert!(!store.exists());
}

#[test]
fn board_without_known_labels_has_no_quotes() {
    let html = ["Oficial", "MEP/Bolsa", "Contado con liqui", "cripto", "Tarjeta", "blue"]
        .iter()
        .fold(PAGE.to_string(), |html, fragment| html.replace(fragment, "Euro"));
    let err = parse_snapshot(&html).unwrap_err();
    assert!(matches!(err, ExtractError::NoQuotes));
}

#[test]
fn three_decimal_value_survives_the_store() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("datos_dolar.csv");
    let page = StaticPage(PAGE.replace("$985.50", "$985,125"));

    let snap = fetch_and_append(&page, "https://dolarhoy.com/", &store, HeaderPolicy::Frozen).unwrap();
    assert_eq!(snap.quote("Dólar Oficial").unwrap().sell, Some(Decimal::new(985125, 3)));

    let table = read_table(&store).unwrap();
    let sell = table.column_index("Dólar Oficial Venta").unwrap();
    assert_eq!(table.rows[0][sell], "985.12");

    let reference = NaiveDate::from_ymd_opt(2024, 10, 19)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    let report = MonthlyReport::build(&table, reference).unwrap();
    let oficial = report
        .table_rows()
        .into_iter()
        .find(|r| r[1] == "Dólar Oficial")
        .unwrap();
    assert_eq!(oficial, ["2024-10-19", "Dólar Oficial", "$945.50", "$985.12"]);
}

#[test]
fn snapshot_serializes_for_json_output() {
    let snap = parse_snapshot(PAGE).unwrap();
    let val = serde_json::to_value(&snap).unwrap();
    assert_eq!(val["captured_at"], "2024-10-19T17:03:00");
    assert_eq!(val["quotes"][0]["label"], "Dólar Oficial");
    assert!(val["quotes"][4]["buy"].is_null());

    let back: Snapshot = serde_json::from_value(val).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn http_source_builds_without_deadline() {
    assert!(extractor::HttpPageSource::new().is_ok());
}
