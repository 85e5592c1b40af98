// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

use crate::config::{DEFAULT_STORE, DEFAULT_URL};

pub fn build_cli() -> Command {
    Command::new("ratewatch")
        .about("Scrape exchange-rate quotes into a CSV log and build monthly reports")
        .version(clap::crate_version!())
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .env("RATEWATCH_STORE")
                .help(format!("CSV store path (default: {})", DEFAULT_STORE)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .env("RATEWATCH_LOG_FILE")
                .help("Append log lines to this file (default: platform data dir)"),
        )
        .arg(
            Arg::new("no-log-file")
                .long("no-log-file")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("log-file")
                .help("Log to stderr only"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug-level logging"),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch the quote page once and append a row to the store")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .env("RATEWATCH_URL")
                        .default_value(DEFAULT_URL),
                )
                .arg(
                    Arg::new("grow-header")
                        .long("grow-header")
                        .action(ArgAction::SetTrue)
                        .help("Extend the store header when new quote labels appear"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the appended snapshot as JSON"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Render the monthly PDF report")
                .arg(
                    Arg::new("out")
                        .long("out")
                        .help("Output PDF (default: informe_dolar_YYYY_MM.pdf)"),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("Reference date YYYY-MM-DD (default: now)"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print the latest store rows")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("jsonl"),
                )
                .arg(Arg::new("jsonl").long("jsonl").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("doctor").about("Check the store for inconsistencies"))
}
