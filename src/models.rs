// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One labelled buy/sell pair as read from a quote card.
///
/// `None` means the value was absent or unparsable on the page; the store
/// writes it as the missing marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub label: String,
    pub buy: Option<Decimal>,
    pub sell: Option<Decimal>,
}

/// A single page capture. Quotes keep the order the extraction rules
/// produced them in, which is also the column order of a fresh header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub captured_at: NaiveDateTime,
    pub quotes: Vec<QuoteRecord>,
}

impl Snapshot {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.quotes.iter().map(|q| q.label.as_str())
    }

    pub fn quote(&self, label: &str) -> Option<&QuoteRecord> {
        self.quotes.iter().find(|q| q.label == label)
    }
}
