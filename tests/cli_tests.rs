// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ratewatch::commands::doctor::find_issues;
use ratewatch::config::{header_policy, Settings, DEFAULT_URL};
use ratewatch::store::{HeaderPolicy, StoreTable};
use ratewatch::{cli, commands};
use std::path::PathBuf;
use tempfile::tempdir;

fn table(headers: &[&str], rows: &[&[&str]]) -> StoreTable {
    StoreTable {
        headers: headers.iter().map(|s| s.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    }
}

#[test]
fn fetch_defaults_and_flags() {
    let matches = cli::build_cli().get_matches_from([
        "ratewatch",
        "--no-log-file",
        "--store",
        " /tmp/x.csv ",
        "fetch",
        "--grow-header",
    ]);
    let settings = Settings::from_matches(&matches).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/x.csv"));
    assert!(settings.log_path.is_none());

    let Some(("fetch", sub)) = matches.subcommand() else {
        panic!("no fetch subcommand");
    };
    assert_eq!(sub.get_one::<String>("url").unwrap(), DEFAULT_URL);
    assert_eq!(header_policy(sub), HeaderPolicy::Grow);
    assert!(!sub.get_flag("json"));
}

#[test]
fn global_store_after_subcommand() {
    let matches = cli::build_cli().get_matches_from([
        "ratewatch",
        "report",
        "--store",
        "elsewhere.csv",
        "--log-file",
        "run.log",
        "--date",
        "2024-05-20",
    ]);
    let settings = Settings::from_matches(&matches).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("elsewhere.csv"));
    assert_eq!(settings.log_path, Some(PathBuf::from("run.log")));
}

#[test]
fn report_command_fails_without_data() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("datos_dolar.csv");
    std::fs::write(&store, "fecha,Dólar blue Compra,Dólar blue Venta\n").unwrap();
    let out = dir.path().join("out.pdf");
    let store_str = store.to_string_lossy().to_string();
    let out_str = out.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "ratewatch",
        "--no-log-file",
        "--store",
        &store_str,
        "report",
        "--out",
        &out_str,
        "--date",
        "2024-05-20",
    ]);
    let settings = Settings::from_matches(&matches).unwrap();
    if let Some(("report", sub)) = matches.subcommand() {
        assert!(commands::report::handle(&settings, sub).is_err());
    } else {
        panic!("no report subcommand");
    }
    assert!(!out.exists());
}

#[test]
fn doctor_flags_store_inconsistencies() {
    let t = table(
        &["fecha", "A Compra", "A Venta"],
        &[
            &["01/05/24 10:00", "1", "2"],
            &["Actualizado por última vez:", "1", "2"],
            &["02/05/24 10:00", "1"],
            &["03/05/24 10:00", "1", "x", "9"],
            &["soon", "1", "2"],
        ],
    );
    let issues = find_issues(&t);
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        kinds,
        ["boilerplate_timestamp", "short_row", "untracked_columns", "bad_value", "bad_timestamp"]
    );
    assert_eq!(issues[1][1], "line 4: 2 of 3 columns");
}

#[test]
fn doctor_clean_store() {
    let t = table(&["fecha", "A Compra", "A Venta"], &[&["01/05/24 10:00", "1", "2"]]);
    assert!(find_issues(&t).is_empty());
}
