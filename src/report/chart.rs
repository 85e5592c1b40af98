// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Sell-price chart. The raster holds only the plot area (grid and lines);
//! ticks, legend and captions are typeset by the PDF writer so the image
//! needs no font support.

use super::{ReportData, ReportError};
use crate::store::SELL_SUFFIX;
use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;

pub const Y_MARGIN: f64 = 0.05;
pub const Y_TICKS: usize = 6;
pub const X_TICKS: usize = 8;

/// Line colours, shared with the PDF legend.
pub const PALETTE: &[(u8, u8, u8)] = &[
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
];

pub fn series_color(idx: usize) -> (u8, u8, u8) {
    PALETTE[idx % PALETTE.len()]
}

/// `$1.2k`-style axis label.
pub fn thousands_label(v: f64) -> String {
    format!("${:.1}k", v / 1000.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    /// (days since `ChartSpec::origin`, value)
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub origin: NaiveDateTime,
    pub series: Vec<Series>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

fn days_between(origin: NaiveDateTime, t: NaiveDateTime) -> f64 {
    (t - origin).num_seconds() as f64 / 86_400.0
}

impl ChartSpec {
    /// One series per sell column; absent cells leave a gap in the data.
    /// X values are days since `origin`.
    pub fn from_data(data: &ReportData, origin: NaiveDateTime) -> Self {
        let suffix = format!(" {}", SELL_SUFFIX);
        let mut series = Vec::new();
        for (idx, column) in data.columns.iter().enumerate() {
            let Some(label) = column.strip_suffix(&suffix) else {
                continue;
            };
            let points = data
                .rows
                .iter()
                .filter_map(|r| {
                    let v = r.cells.get(idx).copied().flatten()?.to_f64()?;
                    Some((days_between(origin, r.timestamp), v))
                })
                .collect();
            series.push(Series {
                label: label.to_string(),
                points,
            });
        }

        let (x_min, x_max) = data
            .rows
            .iter()
            .map(|r| days_between(origin, r.timestamp))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let x_range = if !x_min.is_finite() {
            (0.0, 1.0)
        } else if x_max > x_min {
            (x_min, x_max)
        } else {
            (x_min - 0.5, x_max + 0.5)
        };

        let values = series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let y_range = if lo.is_finite() && hi.is_finite() && hi * (1.0 + Y_MARGIN) > lo * (1.0 - Y_MARGIN) {
            (lo * (1.0 - Y_MARGIN), hi * (1.0 + Y_MARGIN))
        } else {
            (0.0, 1.0)
        };

        Self {
            origin,
            series,
            x_range,
            y_range,
        }
    }

    /// Evenly spaced y ticks with thousands labels, bottom to top.
    pub fn y_ticks(&self) -> Vec<(f64, String)> {
        let (lo, hi) = self.y_range;
        let step = (hi - lo) / (Y_TICKS - 1) as f64;
        (0..Y_TICKS)
            .map(|i| {
                let v = lo + step * i as f64;
                (v, thousands_label(v))
            })
            .collect()
    }

    /// Evenly spaced x ticks labelled `dd/mm`.
    pub fn x_ticks(&self) -> Vec<(f64, String)> {
        let (lo, hi) = self.x_range;
        let count = if hi - lo < 1.0 { 1 } else { X_TICKS };
        let step = if count > 1 { (hi - lo) / (count - 1) as f64 } else { 0.0 };
        (0..count)
            .map(|i| {
                let x = if count > 1 { lo + step * i as f64 } else { (lo + hi) / 2.0 };
                let at = self.origin + Duration::seconds((x * 86_400.0).round() as i64);
                (x, at.format("%d/%m").to_string())
            })
            .collect()
    }

    /// Draw grid and series into a PNG covering exactly the plot area.
    pub fn render_png(&self, path: &Path, size: (u32, u32)) -> Result<(), ReportError> {
        let chart_err = |e: &dyn std::fmt::Display| ReportError::Chart(e.to_string());

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| chart_err(&e))?;

        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        let mut chart = ChartBuilder::on(&root)
            .margin(0)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(|e| chart_err(&e))?;

        let grid = RGBColor(200, 200, 200).stroke_width(1);
        for (y, _) in self.y_ticks() {
            chart
                .draw_series(LineSeries::new([(x0, y), (x1, y)], grid))
                .map_err(|e| chart_err(&e))?;
        }
        for (x, _) in self.x_ticks() {
            chart
                .draw_series(LineSeries::new([(x, y0), (x, y1)], grid))
                .map_err(|e| chart_err(&e))?;
        }

        for (idx, s) in self.series.iter().enumerate() {
            let (r, g, b) = series_color(idx);
            let style = RGBColor(r, g, b).stroke_width(4);
            chart
                .draw_series(LineSeries::new(s.points.iter().copied(), style))
                .map_err(|e| chart_err(&e))?;
        }

        root.present().map_err(|e| chart_err(&e))?;
        Ok(())
    }
}
