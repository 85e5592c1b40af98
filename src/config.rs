// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::PathBuf;

use crate::store::HeaderPolicy;

pub const DEFAULT_URL: &str = "https://dolarhoy.com/";
pub const DEFAULT_STORE: &str = "datos_dolar.csv";
pub const LOG_FILE_NAME: &str = "ratewatch.log";

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Ratewatch", "ratewatch"));

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.to_path_buf())
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE_NAME))
}

/// `informe_dolar_YYYY_MM.pdf` for the month containing `reference`.
pub fn default_report_path(reference: NaiveDate) -> PathBuf {
    PathBuf::from(format!("informe_dolar_{}.pdf", reference.format("%Y_%m")))
}

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub verbose: bool,
}

impl Settings {
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let store_path = m
            .get_one::<String>("store")
            .map(|s| PathBuf::from(s.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        let log_path = if m.get_flag("no-log-file") {
            None
        } else {
            match m.get_one::<String>("log-file") {
                Some(p) => Some(PathBuf::from(p.trim())),
                None => Some(default_log_path()?),
            }
        };
        Ok(Self {
            store_path,
            log_path,
            verbose: m.get_flag("verbose"),
        })
    }
}

pub fn header_policy(m: &clap::ArgMatches) -> HeaderPolicy {
    if m.get_flag("grow-header") {
        HeaderPolicy::Grow
    } else {
        HeaderPolicy::Frozen
    }
}
