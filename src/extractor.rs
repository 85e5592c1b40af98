// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Quote extraction from the dolarhoy.com landing page.
//!
//! The page has no API; quotes live in "tile" cards whose CSS classes are
//! the only contract. Each tracked quote is described by a [`QuoteRule`]
//! and the rules are applied in order against a parsed document.

use crate::models::{QuoteRecord, Snapshot};
use crate::store::{self, HeaderPolicy, StoreError, TIMESTAMP_FORMAT};
use crate::utils::{http_client, try_parse_currency};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info};

pub const UPDATE_SELECTOR: &str = "div.tile.update";
pub const BUY_SELECTOR: &str = "div.values div.compra";
pub const SELL_SELECTORS: &[&str] = &["div.values div.venta div.venta-wrapper", "div.values div.venta"];
pub const CURRENCY_SYMBOL: char = '$';

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("page has no element matching '{0}'")]
    MissingElement(&'static str),
    #[error("page has no recognised quote cards")]
    NoQuotes,
    #[error("malformed last-updated text '{0}'")]
    MalformedTimestamp(String),
    #[error("invalid selector '{0}'")]
    Selector(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Markup region a quote card is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The main board listing most quotes.
    Board,
    /// The highlighted tile that only carries the informal ("blue") rate.
    Mobile,
}

impl Region {
    pub fn card_selector(self) -> &'static str {
        match self {
            Region::Board => "div.tile.is-parent.is-7.is-vertical div.tile.is-child",
            Region::Mobile => "div.tile.is-parent.is-5 div.tile.is-child",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuoteRule {
    /// Substring the card label must contain.
    pub fragment: &'static str,
    pub region: Region,
}

pub const QUOTE_RULES: &[QuoteRule] = &[
    QuoteRule { fragment: "Oficial", region: Region::Board },
    QuoteRule { fragment: "MEP/Bolsa", region: Region::Board },
    QuoteRule { fragment: "Contado con liqui", region: Region::Board },
    QuoteRule { fragment: "cripto", region: Region::Board },
    QuoteRule { fragment: "Tarjeta", region: Region::Board },
    QuoteRule { fragment: "blue", region: Region::Mobile },
];

/// Where page markup comes from.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, ExtractError>;
}

/// Single blocking GET, no retries.
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
}

impl HttpPageSource {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let fetch_err = |source| ExtractError::Fetch {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        resp.text().map_err(fetch_err)
    }
}

/// Markup already in hand, e.g. a saved page.
pub struct StaticPage(pub String);

impl PageSource for StaticPage {
    fn fetch(&self, _url: &str) -> Result<String, ExtractError> {
        Ok(self.0.clone())
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Amount after the first currency symbol, `None` if absent or unparsable.
fn currency_value(text: &str) -> Option<Decimal> {
    let amount = text.split(CURRENCY_SYMBOL).nth(1)?;
    try_parse_currency(amount)
}

fn first_value(card: ElementRef<'_>, selectors: &[Selector]) -> Option<Decimal> {
    selectors
        .iter()
        .find_map(|sel| card.select(sel).next())
        .and_then(|el| currency_value(&element_text(el)))
}

fn card_label(card: ElementRef<'_>, anchor: &Selector) -> Option<String> {
    let a = card.select(anchor).next()?;
    let label = element_text(a).split_whitespace().collect::<Vec<_>>().join(" ");
    if label.is_empty() { None } else { Some(label) }
}

/// Parse the "last updated" tile. Its third and fourth words are the date
/// and the time.
pub fn parse_last_updated(doc: &Html) -> Result<NaiveDateTime, ExtractError> {
    let sel = selector(UPDATE_SELECTOR)?;
    let el = doc
        .select(&sel)
        .next()
        .ok_or(ExtractError::MissingElement(UPDATE_SELECTOR))?;
    let text = element_text(el);
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (Some(date), Some(time)) = (tokens.get(2), tokens.get(3)) else {
        return Err(ExtractError::MalformedTimestamp(text.trim().to_string()));
    };
    let stamp = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
        .map_err(|_| ExtractError::MalformedTimestamp(text.trim().to_string()))
}

/// Build a snapshot from page markup. Cards whose label matches no rule are
/// ignored; for each rule the first matching card in its region wins.
pub fn parse_snapshot(html: &str) -> Result<Snapshot, ExtractError> {
    let doc = Html::parse_document(html);
    let captured_at = parse_last_updated(&doc)?;

    let anchor = selector("a")?;
    let buy = [selector(BUY_SELECTOR)?];
    let sell = SELL_SELECTORS
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>, _>>()?;

    // The board carries every quote but blue; without it the layout moved.
    let board = Region::Board.card_selector();
    if doc.select(&selector(board)?).next().is_none() {
        return Err(ExtractError::MissingElement(board));
    }

    let mut quotes: Vec<QuoteRecord> = Vec::new();
    for rule in QUOTE_RULES {
        let cards = selector(rule.region.card_selector())?;
        let hit = doc.select(&cards).find_map(|card| {
            card_label(card, &anchor)
                .filter(|label| label.contains(rule.fragment))
                .map(|label| (card, label))
        });
        let Some((card, label)) = hit else {
            debug!(fragment = rule.fragment, "no card for rule");
            continue;
        };
        if quotes.iter().any(|q| q.label == label) {
            continue;
        }
        quotes.push(QuoteRecord {
            buy: first_value(card, &buy),
            sell: first_value(card, &sell),
            label,
        });
    }

    if quotes.is_empty() {
        return Err(ExtractError::NoQuotes);
    }

    Ok(Snapshot {
        captured_at,
        quotes,
    })
}

/// Fetch one page and append its snapshot to the store. The row is fully
/// assembled before anything is written.
pub fn fetch_and_append(
    source: &dyn PageSource,
    url: &str,
    store_path: &Path,
    policy: HeaderPolicy,
) -> Result<Snapshot, ExtractError> {
    let html = source.fetch(url)?;
    let snapshot = parse_snapshot(&html)?;
    let outcome = store::append_snapshot(store_path, &snapshot, policy)?;
    info!(
        url,
        store = %store_path.display(),
        captured_at = %snapshot.captured_at,
        quotes = snapshot.quotes.len(),
        header_written = outcome.header_written,
        "appended snapshot"
    );
    Ok(snapshot)
}

/// Top-level extractor run: failures are logged and swallowed.
pub fn run(
    source: &dyn PageSource,
    url: &str,
    store_path: &Path,
    policy: HeaderPolicy,
) -> Option<Snapshot> {
    match fetch_and_append(source, url, store_path, policy) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            error!(url, store = %store_path.display(), "extractor run failed: {e}");
            None
        }
    }
}
