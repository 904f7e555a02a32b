//! PDF export
//!
//! [`DocumentLayout::build`] turns a request into table rows and a balance
//! line; [`render`] paints them on US Letter pages with `printpdf` and the
//! built-in Helvetica fonts. Coordinates are in points with the origin at the
//! bottom-left corner of the page.

use crate::aggregate::Totals;
use crate::error::{CoreError, CoreResult};
use crate::models::{MovementKind, ReportRequest};
use crate::palette::{self, BLUE, GREEN, GRID_GREY, RED, SLATE, WHITE, WHITESMOKE};
use crate::time::short_date;
use finreport_utils::{format_amount, truncate_chars};
use std::ops::Range;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Pt, Rect, Rgb,
};

pub const HEADERS: [&str; 4] = ["Fecha", "Descripción", "Categoría", "Monto"];
pub const COLUMN_WIDTHS: [f32; 4] = [80.0, 200.0, 130.0, 90.0];
pub const DEFAULT_DESCRIPTION: &str = "Sin desc.";
pub const DEFAULT_CATEGORY: &str = "General";
pub const BALANCE_LABEL: &str = "SALDO NETO FINAL DEL CICLO: ";
const DESCRIPTION_LIMIT: usize = 25;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;

const TITLE_SIZE: f32 = 16.0;
const TITLE_LEADING: f32 = 22.0;
const TITLE_PADDING: f32 = 10.0;
const TITLE_SPACE_AFTER: f32 = 35.0;

const CELL_SIZE: f32 = 10.0;
const CELL_LEADING: f32 = 12.0;
const CELL_PADDING: f32 = 3.0;
const HEADER_BOTTOM_PADDING: f32 = 12.0;
const GRID_WIDTH: f32 = 0.5;

const BALANCE_GAP: f32 = 40.0;
const BALANCE_SIZE: f32 = 14.0;
const BALANCE_LEADING: f32 = 17.0;

/// Helvetica cap height as a fraction of the font size
const CAP_HEIGHT: f32 = 0.718;

/// One body row of the movements table
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub amount_color: u32,
}

impl DocumentRow {
    fn cells(&self) -> [&str; 4] {
        [
            self.date.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.amount.as_str(),
        ]
    }
}

/// Everything printed in the PDF
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub rows: Vec<DocumentRow>,
    pub totals: Totals,
}

impl DocumentLayout {
    pub fn build(request: &ReportRequest) -> CoreResult<Self> {
        let totals = Totals::from_movements(&request.movements)?;
        let rows = request
            .movements
            .iter()
            .map(|movement| DocumentRow {
                date: short_date(movement.created_at.as_deref()),
                description: truncate_chars(
                    movement.description_user.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
                    DESCRIPTION_LIMIT,
                ),
                category: movement
                    .category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                amount: dollars(movement.display_amount()),
                amount_color: row_color(movement.kind.as_ref()),
            })
            .collect();

        Ok(Self {
            title: request.title.clone(),
            rows,
            totals,
        })
    }

    /// Net balance as printed after the label, e.g. `$1,500`
    pub fn balance_amount(&self) -> String {
        dollars(self.totals.net_balance)
    }

    pub fn balance_color(&self) -> u32 {
        palette::balance_color(self.totals.is_balance_non_negative())
    }
}

fn dollars(amount: rust_decimal::Decimal) -> String {
    format!("${}", format_amount(amount))
}

/// Expenses red, savings blue, everything else green
fn row_color(kind: Option<&MovementKind>) -> u32 {
    match kind {
        Some(MovementKind::Expense) => RED,
        Some(MovementKind::Saving) => BLUE,
        _ => GREEN,
    }
}

/// Build and render in one step. Failures are logged before being returned.
pub fn build_document(request: &ReportRequest) -> CoreResult<Vec<u8>> {
    let layout = DocumentLayout::build(request)?;
    log::debug!(
        "Document layout: {} rows, net balance {}",
        layout.rows.len(),
        layout.totals.net_balance
    );
    render(&layout).map_err(|e| {
        log::error!("Error building PDF document: {}", e);
        e
    })
}

const TITLE_BAND_HEIGHT: f32 = TITLE_LEADING + 2.0 * TITLE_PADDING;
const HEADER_HEIGHT: f32 = CELL_LEADING + CELL_PADDING + HEADER_BOTTOM_PADDING;
const ROW_HEIGHT: f32 = CELL_LEADING + 2.0 * CELL_PADDING;

/// Top of the table on the first page, below the title band
const FIRST_TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN - TITLE_BAND_HEIGHT - TITLE_SPACE_AFTER;
/// Top of the table on every following page
const NEXT_TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN;

/// Body rows that fit under a header row starting at `top`
fn rows_fitting(top: f32) -> usize {
    ((top - HEADER_HEIGHT - MARGIN) / ROW_HEIGHT).floor().max(1.0) as usize
}

/// Row ranges drawn on each page. There is always at least one page.
pub fn plan_pages(row_count: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = rows_fitting(FIRST_TABLE_TOP);
    loop {
        let end = (start + capacity).min(row_count);
        pages.push(start..end);
        if end == row_count {
            return pages;
        }
        start = end;
        capacity = rows_fitting(NEXT_TABLE_TOP);
    }
}

/// Paint a layout to PDF bytes
pub fn render(layout: &DocumentLayout) -> CoreResult<Vec<u8>> {
    let mut painter = Painter::new(&layout.title)?;
    painter.title_band(&layout.title);

    let table_width: f32 = COLUMN_WIDTHS.iter().sum();
    let table_x = MARGIN + (PAGE_WIDTH - 2.0 * MARGIN - table_width) / 2.0;

    let mut y = FIRST_TABLE_TOP;
    for (page, range) in plan_pages(layout.rows.len()).into_iter().enumerate() {
        if page > 0 {
            painter.new_page();
            y = NEXT_TABLE_TOP;
        }
        let mut table = TableSection::start(&painter, table_x, y, HEADER_HEIGHT);
        y -= HEADER_HEIGHT;
        for row in &layout.rows[range] {
            painter.row_cells(table_x, y - ROW_HEIGHT, ROW_HEIGHT, row);
            table.boundaries.push(y - ROW_HEIGHT);
            y -= ROW_HEIGHT;
        }
        table.close(&painter, y);
    }

    y -= BALANCE_GAP;
    if y - BALANCE_LEADING < MARGIN {
        painter.new_page();
        y = NEXT_TABLE_TOP;
    }
    painter.balance_line(
        y - BALANCE_LEADING,
        &layout.balance_amount(),
        layout.balance_color(),
    );

    painter.finish()
}

/// Part of the table drawn on a single page
struct TableSection {
    x: f32,
    /// Horizontal rule positions, top first
    boundaries: Vec<f32>,
}

impl TableSection {
    fn start(painter: &Painter, x: f32, top: f32, header_height: f32) -> Self {
        painter.header_row(x, top - header_height, header_height);
        Self {
            x,
            boundaries: vec![top, top - header_height],
        }
    }

    fn close(&self, painter: &Painter, bottom: f32) {
        let top = self.boundaries[0];
        let right = self.x + COLUMN_WIDTHS.iter().sum::<f32>();
        for y in &self.boundaries {
            painter.rule(self.x, *y, right, *y);
        }
        let mut x = self.x;
        painter.rule(x, top, x, bottom);
        for width in COLUMN_WIDTHS {
            x += width;
            painter.rule(x, top, x, bottom);
        }
    }
}

struct Painter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Painter {
    fn new(title: &str) -> CoreResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self { doc, layer, regular, bold })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    /// Draws the title band at the top of the frame
    fn title_band(&self, title: &str) {
        let top = PAGE_HEIGHT - MARGIN;
        let height = TITLE_BAND_HEIGHT;
        let bottom = top - height;
        self.fill_rect(MARGIN, bottom, PAGE_WIDTH - 2.0 * MARGIN, height, SLATE);

        let width = text_width(title, true, TITLE_SIZE);
        let x = (PAGE_WIDTH - width) / 2.0;
        self.text(title, x, baseline(bottom, height, TITLE_SIZE), TITLE_SIZE, true, WHITE);
    }

    fn header_row(&self, x: f32, bottom: f32, height: f32) {
        let width: f32 = COLUMN_WIDTHS.iter().sum();
        self.fill_rect(x, bottom, width, height, SLATE);
        // text sits on the bottom padding like the body rows
        let text_bottom = bottom + HEADER_BOTTOM_PADDING - CELL_PADDING;
        let text_height = height - HEADER_BOTTOM_PADDING + CELL_PADDING;
        self.centered_cells(x, text_bottom, text_height, &HEADERS, true, |_| WHITESMOKE);
    }

    fn row_cells(&self, x: f32, bottom: f32, height: f32, row: &DocumentRow) {
        let cells = row.cells();
        let amount_column = cells.len() - 1;
        self.centered_cells(x, bottom, height, &cells, false, |idx| {
            if idx == amount_column { row.amount_color } else { 0x000000 }
        });
    }

    fn centered_cells(
        &self,
        x: f32,
        bottom: f32,
        height: f32,
        cells: &[&str],
        bold: bool,
        color: impl Fn(usize) -> u32,
    ) {
        let amount_column = cells.len() - 1;
        let mut left = x;
        for (idx, (cell, width)) in cells.iter().zip(COLUMN_WIDTHS).enumerate() {
            // Monto is always bold
            let bold = bold || idx == amount_column;
            let text_x = left + (width - text_width(cell, bold, CELL_SIZE)) / 2.0;
            self.text(cell, text_x, baseline(bottom, height, CELL_SIZE), CELL_SIZE, bold, color(idx));
            left += width;
        }
    }

    fn balance_line(&self, y: f32, amount: &str, amount_color: u32) {
        let label_width = text_width(BALANCE_LABEL, true, BALANCE_SIZE);
        let amount_width = text_width(amount, true, BALANCE_SIZE);
        let x = PAGE_WIDTH - MARGIN - label_width - amount_width;
        self.text(BALANCE_LABEL, x, y, BALANCE_SIZE, true, SLATE);
        self.text(amount, x + label_width, y, BALANCE_SIZE, true, amount_color);
    }

    fn text(&self, text: &str, x: f32, y: f32, size: f32, bold: bool, color: u32) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(text, size, mm(x), mm(y), font);
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: u32) {
        self.layer.set_fill_color(rgb(color));
        let rect = Rect::new(mm(x), mm(y), mm(x + width), mm(y + height)).with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    fn rule(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.layer.set_outline_color(rgb(GRID_GREY));
        self.layer.set_outline_thickness(GRID_WIDTH);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(mm(x1), mm(y1)), false),
                (Point::new(mm(x2), mm(y2)), false),
            ],
            is_closed: false,
        });
    }

    fn finish(self) -> CoreResult<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| CoreError::Document { message: e.to_string() })
    }
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn rgb(color: u32) -> Color {
    let (r, g, b) = palette::rgb_channels(color);
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Baseline that vertically centers capital letters in a box
fn baseline(bottom: f32, height: f32, size: f32) -> f32 {
    bottom + (height - CAP_HEIGHT * size) / 2.0
}

/// Advance widths of Helvetica for ASCII 32..=126, in 1/1000 em
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width of `text` in points; non-ASCII characters use the digit width
pub fn text_width(text: &str, bold: bool, size: f32) -> f32 {
    let table = if bold { &HELVETICA_BOLD_WIDTHS } else { &HELVETICA_WIDTHS };
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => table[(code - 32) as usize] as u32,
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0
}
