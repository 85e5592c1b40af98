// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Landscape US-Letter layout: title and quote table (paginated), then a
//! chart page.

use super::chart::{series_color, ChartSpec};
use super::{MonthlyReport, ReportError};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_W: f32 = 279.4;
const PAGE_H: f32 = 215.9;
const MARGIN: f32 = 18.0;
const PT_TO_MM: f32 = 0.3528;

const TABLE_HEADER: [&str; 4] = ["Fecha", "Tipo de Dólar", "Compra", "Venta"];
// 1.5in, 2in, 1.5in, 1.5in
const COL_WIDTHS: [f32; 4] = [38.1, 50.8, 38.1, 38.1];
const HEADER_ROW_H: f32 = 9.0;
const ROW_H: f32 = 5.5;

/// Plot area on the chart page, in mm; the PNG is scaled into it.
const PLOT_X: f32 = 40.0;
const PLOT_Y: f32 = 40.0;
const PLOT_W: f32 = 170.0;
const PLOT_H: f32 = 120.0;
/// Raster size with the same aspect ratio as the plot area.
pub const CHART_PIXELS: (u32, u32) = (1700, 1200);

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(e.to_string())
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

// Builtin fonts carry no metrics; half an em per glyph is close enough
// for centring.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn text_centered(layer: &PdfLayerReference, text: &str, size: f32, cx: f32, y: f32, font: &IndirectFontRef) {
    let x = cx - text_width(text, size) / 2.0;
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn line(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    });
}

fn filled_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: Color) {
    layer.set_fill_color(color);
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x), Mm(y + h)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

struct RowStyle<'a> {
    background: Color,
    text: Color,
    font: &'a IndirectFontRef,
    size: f32,
}

struct TableLayout {
    left: f32,
    total_w: f32,
}

impl TableLayout {
    fn new() -> Self {
        let total_w: f32 = COL_WIDTHS.iter().sum();
        Self {
            left: (PAGE_W - total_w) / 2.0,
            total_w,
        }
    }

    fn column_centers(&self) -> [f32; 4] {
        let mut centers = [0.0; 4];
        let mut x = self.left;
        for (i, w) in COL_WIDTHS.iter().enumerate() {
            centers[i] = x + w / 2.0;
            x += w;
        }
        centers
    }

    /// Row band from `top` down by `h`: background, grid and centred cells.
    fn draw_row(&self, layer: &PdfLayerReference, top: f32, h: f32, cells: &[&str; 4], style: &RowStyle<'_>) {
        let bottom = top - h;
        filled_rect(layer, self.left, bottom, self.total_w, h, style.background.clone());

        layer.set_outline_color(rgb(0, 0, 0));
        layer.set_outline_thickness(0.5);
        line(layer, (self.left, top), (self.left + self.total_w, top));
        line(layer, (self.left, bottom), (self.left + self.total_w, bottom));
        let mut x = self.left;
        line(layer, (x, top), (x, bottom));
        for w in COL_WIDTHS {
            x += w;
            line(layer, (x, top), (x, bottom));
        }

        layer.set_fill_color(style.text.clone());
        let baseline = bottom + (h - style.size * PT_TO_MM) / 2.0 + 0.6;
        for (cell, cx) in cells.iter().zip(self.column_centers()) {
            text_centered(layer, cell, style.size, cx, baseline, style.font);
        }
    }
}

fn new_page(doc: &PdfDocumentReference, name: &str) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), name);
    doc.get_page(page).get_layer(layer)
}

fn write_table(doc: &PdfDocumentReference, first: PdfLayerReference, report: &MonthlyReport, fonts: &Fonts) {
    let layout = TableLayout::new();
    let header = TABLE_HEADER;
    let header_style = RowStyle {
        background: rgb(128, 128, 128),
        text: rgb(245, 245, 245),
        font: &fonts.bold,
        size: 10.0,
    };
    let body_style = RowStyle {
        background: rgb(245, 245, 220),
        text: rgb(0, 0, 0),
        font: &fonts.regular,
        size: 8.0,
    };

    let mut layer = first;
    layer.set_fill_color(rgb(0, 0, 0));
    text_centered(&layer, &report.title(), 20.0, PAGE_W / 2.0, PAGE_H - MARGIN - 6.0, &fonts.bold);

    let mut top = PAGE_H - MARGIN - 16.0;
    layout.draw_row(&layer, top, HEADER_ROW_H, &header, &header_style);
    top -= HEADER_ROW_H;

    let mut page_no = 1;
    for row in report.table_rows() {
        if top - ROW_H < MARGIN {
            page_no += 1;
            layer = new_page(doc, &format!("Table {}", page_no));
            top = PAGE_H - MARGIN;
            layout.draw_row(&layer, top, HEADER_ROW_H, &header, &header_style);
            top -= HEADER_ROW_H;
        }
        let cells = [row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()];
        layout.draw_row(&layer, top, ROW_H, &cells, &body_style);
        top -= ROW_H;
    }
}

fn write_chart_page(
    layer: &PdfLayerReference,
    chart: &ChartSpec,
    chart_png: &Path,
    fonts: &Fonts,
) -> Result<(), ReportError> {
    layer.set_fill_color(rgb(0, 0, 0));
    layer.use_text("Gráfico de Evolución", 16.0, Mm(MARGIN), Mm(PAGE_H - MARGIN - 4.0), &fonts.bold);
    text_centered(
        layer,
        "Evolución del Dólar (Venta) en el Último Mes",
        13.0,
        PLOT_X + PLOT_W / 2.0,
        PLOT_Y + PLOT_H + 8.0,
        &fonts.regular,
    );

    let img = image::open(chart_png).map_err(pdf_err)?;
    let dpi = CHART_PIXELS.0 as f32 * 25.4 / PLOT_W;
    Image::from_dynamic_image(&img).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(PLOT_X)),
            translate_y: Some(Mm(PLOT_Y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    layer.set_outline_color(rgb(0, 0, 0));
    layer.set_outline_thickness(0.75);
    line(layer, (PLOT_X, PLOT_Y), (PLOT_X + PLOT_W, PLOT_Y));
    line(layer, (PLOT_X, PLOT_Y), (PLOT_X, PLOT_Y + PLOT_H));

    let (y0, y1) = chart.y_range;
    let (x0, x1) = chart.x_range;
    let tick_size = 8.0;
    for (v, label) in chart.y_ticks() {
        let y = PLOT_Y + ((v - y0) / (y1 - y0)) as f32 * PLOT_H;
        let x = PLOT_X - 2.0 - text_width(&label, tick_size);
        layer.use_text(label.as_str(), tick_size, Mm(x), Mm(y - 1.0), &fonts.regular);
    }
    for (v, label) in chart.x_ticks() {
        let x = PLOT_X + ((v - x0) / (x1 - x0)) as f32 * PLOT_W;
        text_centered(layer, &label, tick_size, x, PLOT_Y - 6.0, &fonts.regular);
    }
    text_centered(layer, "Fecha", 10.0, PLOT_X + PLOT_W / 2.0, PLOT_Y - 14.0, &fonts.regular);
    layer.use_text("Valor en Pesos", 10.0, Mm(MARGIN - 8.0), Mm(PLOT_Y + PLOT_H + 2.0), &fonts.regular);

    // Legend to the right of the plot, one swatch per series.
    let legend_x = PLOT_X + PLOT_W + 8.0;
    let mut legend_y = PLOT_Y + PLOT_H / 2.0 + chart.series.len() as f32 * 3.5;
    for (idx, s) in chart.series.iter().enumerate() {
        let (r, g, b) = series_color(idx);
        layer.set_outline_color(rgb(r, g, b));
        layer.set_outline_thickness(2.0);
        line(layer, (legend_x, legend_y + 1.2), (legend_x + 8.0, legend_y + 1.2));
        layer.set_fill_color(rgb(0, 0, 0));
        layer.use_text(s.label.as_str(), 9.0, Mm(legend_x + 10.0), Mm(legend_y), &fonts.regular);
        legend_y -= 7.0;
    }
    Ok(())
}

/// Write the full report to `output`. `chart_png` must have been rendered
/// at [`CHART_PIXELS`].
pub fn write_report(
    report: &MonthlyReport,
    chart: &ChartSpec,
    chart_png: &Path,
    output: &Path,
) -> Result<(), ReportError> {
    let (doc, page, layer) = PdfDocument::new(report.title(), Mm(PAGE_W), Mm(PAGE_H), "Table 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?,
    };

    let first = doc.get_page(page).get_layer(layer);
    write_table(&doc, first, report, &fonts);

    let chart_layer = new_page(&doc, "Chart");
    write_chart_page(&chart_layer, chart, chart_png, &fonts)?;

    let file = File::create(output)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_err)?;
    Ok(())
}
