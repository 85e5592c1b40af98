// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{header_policy, Settings, DEFAULT_URL};
use crate::extractor::{self, HttpPageSource};
use crate::utils::maybe_print_json;
use anyhow::Result;
use tracing::error;

/// Extraction failures are logged, not returned; the process exits cleanly.
pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let url = m
        .get_one::<String>("url")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let source = match HttpPageSource::new() {
        Ok(s) => s,
        Err(e) => {
            error!("could not build HTTP client: {e:#}");
            return Ok(());
        }
    };
    if let Some(snapshot) = extractor::run(&source, &url, &settings.store_path, header_policy(m)) {
        if maybe_print_json(m.get_flag("json"), false, &snapshot)? {
            return Ok(());
        }
        println!(
            "Appended {} quotes captured at {} to {}",
            snapshot.quotes.len(),
            snapshot.captured_at.format("%d/%m/%y %H:%M"),
            settings.store_path.display()
        );
    }
    Ok(())
}
