// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::store::read_table;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let limit = *m.get_one::<usize>("limit").unwrap_or(&20);

    let table = read_table(&settings.store_path)
        .with_context(|| format!("Read store {}", settings.store_path.display()))?;
    let skip = table.rows.len().saturating_sub(limit);
    let width = table.headers.len();
    let data: Vec<Vec<String>> = table
        .rows
        .into_iter()
        .skip(skip)
        .map(|mut r| {
            r.resize(width.max(r.len()), String::new());
            r
        })
        .collect();

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
        println!("{}", pretty_table(&headers, data));
    }
    Ok(())
}
