// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{default_report_path, Settings};
use crate::report::generate_monthly_report;
use crate::utils::parse_date;
use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use std::path::PathBuf;

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let reference = match m.get_one::<String>("date") {
        Some(raw) => parse_date(raw.trim())?.and_time(NaiveTime::default()),
        None => Local::now().naive_local(),
    };
    let out = m
        .get_one::<String>("out")
        .map(|s| PathBuf::from(s.trim()))
        .unwrap_or_else(|| default_report_path(reference.date()));

    generate_monthly_report(&settings.store_path, &out, Some(reference))
        .with_context(|| format!("Generate report from {}", settings.store_path.display()))?;
    println!("Informe mensual generado: {}", out.display());
    Ok(())
}
