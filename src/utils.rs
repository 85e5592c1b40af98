// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

const UA: &str = concat!(
    "ratewatch/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/ratewatch)"
);

static AMOUNT_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:[.,]\d+)*$").expect("amount pattern is valid"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    // The page is fetched once per run with no deadline.
    let c = reqwest::blocking::Client::builder()
        .user_agent(UA)
        .timeout(None)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parse a currency string such as `$1.234,56`, `$1234.56` or `$1234,56`.
///
/// Returns `None` when the text is not a recognisable amount.
pub fn try_parse_currency(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();
    if !AMOUNT_SHAPE.is_match(&cleaned) {
        return None;
    }
    let normalized = normalize_separators(&cleaned)?;
    Decimal::from_str(&normalized).ok()
}

/// Lenient variant of [`try_parse_currency`]: anything unparsable is zero.
pub fn parse_currency(raw: &str) -> Decimal {
    try_parse_currency(raw).unwrap_or(Decimal::ZERO)
}

fn normalize_separators(s: &str) -> Option<String> {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();
    match (dots, commas) {
        (0, 0) => Some(s.to_string()),
        (_, 0) => {
            if dots > 1 || is_grouped_thousands(s, '.') {
                Some(s.replace('.', ""))
            } else {
                Some(s.to_string())
            }
        }
        (0, _) => {
            if commas > 1 {
                Some(s.replace(',', ""))
            } else {
                Some(s.replace(',', "."))
            }
        }
        _ => {
            let last_dot = s.rfind('.')?;
            let last_comma = s.rfind(',')?;
            let (decimal, group, decimal_count) = if last_comma > last_dot {
                (',', '.', commas)
            } else {
                ('.', ',', dots)
            };
            if decimal_count > 1 {
                return None;
            }
            Some(s.replace(group, "").replace(decimal, "."))
        }
    }
}

// `1.234` reads as one thousand two hundred thirty-four, `1.23` as a decimal.
fn is_grouped_thousands(s: &str, sep: char) -> bool {
    let digits = s.trim_start_matches('-');
    match digits.split_once(sep) {
        Some((head, tail)) => (1..=3).contains(&head.len()) && tail.len() == 3,
        None => false,
    }
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("${:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
