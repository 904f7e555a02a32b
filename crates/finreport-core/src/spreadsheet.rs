//! Spreadsheet export
//!
//! [`SheetLayout::build`] decides what goes in every cell; [`render`] writes
//! that layout to an XLSX workbook with `rust_xlsxwriter`.
//!
//! Sheet structure (1-based rows):
//! - row 1: title band merged over A:E
//! - row 3: column headers
//! - rows 4..: one row per movement
//! - two rows below the data: income/expense/saving totals in C:D
//! - one row below those: net balance merged over C:D

use crate::aggregate::Totals;
use crate::error::CoreResult;
use crate::models::{Movement, MovementKind, ReportRequest};
use crate::palette::{self, BLUE, GREEN, RED, SLATE, WHITE};
use crate::time::sheet_date;
use finreport_utils::format_amount;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

pub const SHEET_NAME: &str = "Reporte";
pub const EMPTY_PLACEHOLDER: &str = "Sin datos";
pub const AMOUNT_FORMAT: &str = "#,##0";

const TITLE_COLUMNS: u16 = 5;
const HEADER_ROW: u32 = 2;
const FIRST_DATA_ROW: u32 = 3;
const LABEL_COLUMN: u16 = 2;
const VALUE_COLUMN: u16 = 3;
const WIDTH_PADDING: usize = 4;

/// Ledger columns in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Description,
    Category,
    Amount,
    Kind,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Date,
        Column::Description,
        Column::Category,
        Column::Amount,
        Column::Kind,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Date => "Fecha",
            Column::Description => "Descripción",
            Column::Category => "Categoría",
            Column::Amount => "Monto",
            Column::Kind => "Tipo",
        }
    }

    /// Whether a movement sent this column's key, even as `null`
    fn present_in(&self, movement: &Movement) -> bool {
        match self {
            Column::Date => movement.sent.created_at,
            Column::Description => movement.sent.description_user,
            Column::Category => movement.sent.category,
            Column::Amount => true,
            Column::Kind => movement.sent.kind,
        }
    }
}

/// Value of a single ledger cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Amount(Decimal),
    Empty,
}

impl Cell {
    /// Text as it appears in the sheet, used for column widths
    fn shown(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Amount(amount) => format_amount(*amount),
            Cell::Empty => String::new(),
        }
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub cells: Vec<Cell>,
    pub kind: Option<MovementKind>,
}

/// A labeled footer total
#[derive(Debug, Clone, PartialEq)]
pub struct TotalLine {
    pub label: &'static str,
    pub value: Decimal,
    pub color: u32,
}

/// Content of the report sheet
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSheet {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<SheetRow>,
    /// Character widths, one per column
    pub widths: Vec<usize>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetLayout {
    /// No movements: a lone "Sin datos" cell
    Placeholder,
    Ledger(LedgerSheet),
}

impl SheetLayout {
    pub fn build(request: &ReportRequest) -> CoreResult<Self> {
        if request.movements.is_empty() {
            return Ok(SheetLayout::Placeholder);
        }

        let movements = &request.movements;
        let totals = Totals::from_movements(movements)?;
        let columns: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|column| movements.iter().any(|m| column.present_in(m)))
            .collect();

        let rows = movements
            .iter()
            .map(|movement| ledger_row(&columns, movement))
            .collect::<CoreResult<Vec<_>>>()?;

        let widths = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                rows.iter()
                    .map(|row| row.cells[idx].shown().chars().count())
                    .chain(std::iter::once(column.header().chars().count()))
                    .max()
                    .unwrap_or_default()
                    + WIDTH_PADDING
            })
            .collect();

        Ok(SheetLayout::Ledger(LedgerSheet {
            title: request.title.clone(),
            columns,
            rows,
            widths,
            totals,
        }))
    }

    /// Totals behind the footer; zero for the placeholder sheet
    pub fn totals(&self) -> Totals {
        match self {
            SheetLayout::Placeholder => Totals::default(),
            SheetLayout::Ledger(sheet) => sheet.totals,
        }
    }
}

fn ledger_row(columns: &[Column], movement: &Movement) -> CoreResult<SheetRow> {
    let mut cells = Vec::with_capacity(columns.len());
    for column in columns {
        let cell = match column {
            Column::Date => sheet_date(movement.created_at.as_deref())?
                .map(Cell::Text)
                .unwrap_or(Cell::Empty),
            Column::Description => text_cell(&movement.description_user),
            Column::Category => text_cell(&movement.category),
            Column::Amount => Cell::Amount(movement.display_amount()),
            Column::Kind => movement
                .kind
                .as_ref()
                .map(|kind| Cell::Text(kind.to_string()))
                .unwrap_or(Cell::Empty),
        };
        cells.push(cell);
    }
    Ok(SheetRow {
        cells,
        kind: movement.kind.clone(),
    })
}

fn text_cell(value: &Option<String>) -> Cell {
    value.clone().map(Cell::Text).unwrap_or(Cell::Empty)
}

impl LedgerSheet {
    /// Zero-based row of the first footer total, two rows below the data
    pub fn totals_row(&self) -> u32 {
        FIRST_DATA_ROW + self.rows.len() as u32 + 1
    }

    /// Zero-based row of the net balance cell
    pub fn balance_row(&self) -> u32 {
        self.totals_row() + self.total_lines().len() as u32 + 1
    }

    pub fn total_lines(&self) -> [TotalLine; 3] {
        [
            TotalLine {
                label: "TOTAL INGRESOS (+):",
                value: self.totals.income,
                color: GREEN,
            },
            TotalLine {
                label: "TOTAL GASTOS (-):",
                value: self.totals.signed_expense(),
                color: RED,
            },
            TotalLine {
                label: "TOTAL AHORRO (-):",
                value: self.totals.signed_saving(),
                color: BLUE,
            },
        ]
    }

    pub fn balance_text(&self) -> String {
        format!("SALDO NETO: {}", format_amount(self.totals.net_balance))
    }

    /// Fill behind the net balance: slate when non-negative, red otherwise
    pub fn balance_fill(&self) -> u32 {
        if self.totals.is_balance_non_negative() { SLATE } else { RED }
    }
}

/// Write a layout to XLSX bytes
pub fn render(layout: &SheetLayout) -> CoreResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    match layout {
        SheetLayout::Placeholder => {
            worksheet.write_string(0, 0, EMPTY_PLACEHOLDER)?;
        }
        SheetLayout::Ledger(sheet) => write_ledger(worksheet, sheet)?,
    }

    Ok(workbook.save_to_buffer()?)
}

/// Build and render in one step
pub fn build_spreadsheet(request: &ReportRequest) -> CoreResult<Vec<u8>> {
    let layout = SheetLayout::build(request)?;
    log::debug!(
        "Spreadsheet layout: {} movements, net balance {}",
        request.movements.len(),
        layout.totals().net_balance
    );
    render(&layout)
}

fn write_ledger(worksheet: &mut Worksheet, sheet: &LedgerSheet) -> CoreResult<()> {
    let title_format = Format::new()
        .set_bold()
        .set_font_size(16.0)
        .set_font_color(Color::RGB(WHITE))
        .set_background_color(Color::RGB(SLATE))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    worksheet.merge_range(0, 0, 0, TITLE_COLUMNS - 1, &sheet.title, &title_format)?;
    worksheet.set_row_height(0, 30.0)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(WHITE))
        .set_background_color(Color::RGB(SLATE))
        .set_align(FormatAlign::Center);
    for col in 0..TITLE_COLUMNS {
        match sheet.columns.get(col as usize) {
            Some(column) => {
                worksheet.write_string_with_format(HEADER_ROW, col, column.header(), &header_format)?;
            }
            None => {
                worksheet.write_blank(HEADER_ROW, col, &header_format)?;
            }
        }
    }

    for (col, width) in sheet.widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64)?;
    }

    let plain_amount = Format::new().set_num_format(AMOUNT_FORMAT);
    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_num = FIRST_DATA_ROW + idx as u32;
        let amount_format = match row.kind.as_ref().and_then(palette::kind_color) {
            Some(color) => colored_amount(color),
            None => plain_amount.clone(),
        };
        for (col, cell) in row.cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col, text.as_str())?;
                }
                Cell::Amount(amount) => {
                    worksheet.write_number_with_format(row_num, col, to_f64(*amount), &amount_format)?;
                }
                Cell::Empty => {}
            }
        }
    }

    let label_format = Format::new().set_align(FormatAlign::Right);
    let first_total = sheet.totals_row();
    for (offset, line) in sheet.total_lines().iter().enumerate() {
        let row_num = first_total + offset as u32;
        worksheet.write_string_with_format(row_num, LABEL_COLUMN, line.label, &label_format)?;
        worksheet.write_number_with_format(row_num, VALUE_COLUMN, to_f64(line.value), &colored_amount(line.color))?;
    }

    let balance_format = Format::new()
        .set_bold()
        .set_font_size(14.0)
        .set_font_color(Color::RGB(WHITE))
        .set_background_color(Color::RGB(sheet.balance_fill()))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let balance_row = sheet.balance_row();
    worksheet.merge_range(
        balance_row,
        LABEL_COLUMN,
        balance_row,
        VALUE_COLUMN,
        &sheet.balance_text(),
        &balance_format,
    )?;
    worksheet.set_row_height(balance_row, 25.0)?;

    Ok(())
}

fn colored_amount(color: u32) -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(color))
        .set_num_format(AMOUNT_FORMAT)
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::io::{Cursor, Read};

    fn xlsx_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut part).unwrap();
        part
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn example_request() -> ReportRequest {
        ReportRequest::new(
            "Ciclo Mayo",
            vec![
                Movement::new(MovementKind::Income, dec(1000)),
                Movement::new(MovementKind::Expense, dec(300)),
                Movement::new(MovementKind::Saving, dec(200)),
            ],
        )
    }

    fn ledger(layout: SheetLayout) -> LedgerSheet {
        match layout {
            SheetLayout::Ledger(sheet) => sheet,
            SheetLayout::Placeholder => panic!("expected a ledger sheet"),
        }
    }

    #[test]
    fn test_empty_request_is_placeholder() {
        let layout = SheetLayout::build(&ReportRequest::new("T", vec![])).unwrap();
        assert_eq!(layout, SheetLayout::Placeholder);
        assert_eq!(layout.totals(), Totals::default());
    }

    #[test]
    fn test_example_rows_and_footer() {
        let sheet = ledger(SheetLayout::build(&example_request()).unwrap());

        assert_eq!(sheet.title, "Ciclo Mayo");
        assert_eq!(sheet.columns, vec![Column::Amount, Column::Kind]);
        let amounts: Vec<Cell> = sheet.rows.iter().map(|r| r.cells[0].clone()).collect();
        assert_eq!(
            amounts,
            vec![Cell::Amount(dec(1000)), Cell::Amount(dec(-300)), Cell::Amount(dec(-200))]
        );
        assert_eq!(sheet.rows[1].cells[1], Cell::Text("gasto".to_string()));

        let lines = sheet.total_lines();
        assert_eq!(lines[0].value, dec(1000));
        assert_eq!(lines[1].value, dec(-300));
        assert_eq!(lines[2].value, dec(-200));
        assert_eq!(lines[1].label, "TOTAL GASTOS (-):");
        assert_eq!(sheet.balance_text(), "SALDO NETO: 500");
        assert_eq!(sheet.balance_fill(), SLATE);
    }

    #[test]
    fn test_footer_positions() {
        let sheet = ledger(SheetLayout::build(&example_request()).unwrap());
        // data occupies rows 4..=6 (1-based), totals start at row 8
        assert_eq!(sheet.totals_row(), 7);
        assert_eq!(sheet.balance_row(), 11);
    }

    #[test]
    fn test_negative_balance_fill() {
        let request = ReportRequest::new(
            "T",
            vec![Movement::new(MovementKind::Expense, dec(1200))],
        );
        let sheet = ledger(SheetLayout::build(&request).unwrap());
        assert_eq!(sheet.balance_text(), "SALDO NETO: -1,200");
        assert_eq!(sheet.balance_fill(), RED);
    }

    #[test]
    fn test_all_columns_and_widths() {
        let request = ReportRequest::new(
            "T",
            vec![
                Movement::new(MovementKind::Expense, dec(1500))
                    .with_created_at("2024-05-01T10:30:00Z")
                    .with_description("Supermercado")
                    .with_category("Comida"),
                Movement::new(MovementKind::Income, dec(20)),
            ],
        );
        let sheet = ledger(SheetLayout::build(&request).unwrap());

        assert_eq!(sheet.columns, Column::ALL.to_vec());
        assert_eq!(sheet.rows[0].cells[0], Cell::Text("01/05/2024 10:30".to_string()));
        assert_eq!(sheet.rows[1].cells[0], Cell::Empty);
        assert_eq!(sheet.rows[1].cells[2], Cell::Empty);
        // longest: "01/05/2024 10:30", "Supermercado", "Categoría", "-1,500", "ingreso"
        assert_eq!(sheet.widths, vec![20, 16, 13, 10, 11]);
    }

    #[test]
    fn test_unknown_type_is_listed_but_not_totaled() {
        let request = ReportRequest::new(
            "T",
            vec![
                Movement::new(MovementKind::Income, dec(100)),
                Movement::new(MovementKind::Other("transferencia".to_string()), dec(40)),
            ],
        );
        let sheet = ledger(SheetLayout::build(&request).unwrap());
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].cells[0], Cell::Amount(dec(40)));
        assert_eq!(sheet.totals.net_balance, dec(100));
    }

    #[test]
    fn test_malformed_date_fails() {
        let request = ReportRequest::new(
            "T",
            vec![Movement::new(MovementKind::Income, dec(1)).with_created_at("not a date")],
        );
        let error = SheetLayout::build(&request).unwrap_err();
        assert!(matches!(error, CoreError::InvalidDate { .. }));
        assert!(build_spreadsheet(&request).is_err());
    }

    #[test]
    fn test_render_writes_ledger_layout() {
        let bytes = build_spreadsheet(&example_request()).unwrap();

        let workbook = xlsx_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Reporte""#));

        let sheet = xlsx_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<mergeCell ref="A1:E1"/>"#));
        assert!(sheet.contains(r#"<mergeCell ref="C12:D12"/>"#));
        assert!(sheet.contains(r#"ht="30""#));
        assert!(sheet.contains(r#"ht="25""#));
        // only Monto and Tipo carry data; C3:E3 are blank header cells
        for cell in ["A3", "B3", "C3", "D3", "E3"] {
            assert!(sheet.contains(&format!(r#"r="{}""#, cell)), "missing header cell {}", cell);
        }
        assert!(sheet.contains("<v>-300</v>"));

        let strings = xlsx_part(&bytes, "xl/sharedStrings.xml");
        for text in [
            "Ciclo Mayo",
            "Monto",
            "Tipo",
            "TOTAL INGRESOS (+):",
            "TOTAL GASTOS (-):",
            "TOTAL AHORRO (-):",
            "SALDO NETO: 500",
        ] {
            assert!(strings.contains(text), "missing {}", text);
        }
    }

    #[test]
    fn test_render_writes_placeholder() {
        let bytes = build_spreadsheet(&ReportRequest::new("T", vec![])).unwrap();

        let workbook = xlsx_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Reporte""#));
        let strings = xlsx_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("Sin datos"));
        let sheet = xlsx_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(!sheet.contains("mergeCell"));
    }

    #[test]
    fn test_null_fields_keep_their_column() {
        let movements: Vec<Movement> = serde_json::from_str(
            r#"[{"type": "ingreso", "amount": 5, "category": null},
                {"type": "gasto", "amount": 2, "category": null}]"#,
        ).unwrap();
        let sheet = ledger(SheetLayout::build(&ReportRequest::new("T", movements)).unwrap());

        assert_eq!(sheet.columns, vec![Column::Category, Column::Amount, Column::Kind]);
        assert_eq!(sheet.rows[0].cells[0], Cell::Empty);
        assert_eq!(sheet.widths[0], "Categoría".chars().count() + 4);
    }

    #[test]
    fn test_overflowing_totals_fail_the_build() {
        let huge = "70000000000000000000000000000".parse::<Decimal>().unwrap();
        let request = ReportRequest::new(
            "T",
            vec![
                Movement::new(MovementKind::Expense, huge),
                Movement::new(MovementKind::Expense, huge),
            ],
        );
        let error = build_spreadsheet(&request).unwrap_err();
        assert!(matches!(error, CoreError::AmountOverflow { ref total } if total == "gasto"));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let first = SheetLayout::build(&example_request()).unwrap();
        let second = SheetLayout::build(&example_request()).unwrap();
        assert_eq!(first, second);
    }
}
