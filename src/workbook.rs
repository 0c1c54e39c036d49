//! Spreadsheet sources for the roster scanner.
//
// The scanner only needs sheet names, rows of cell text and the date style of a
// cell. `XlsxWorkbook` provides that from a real file via calamine,
// `MemoryWorkbook` from cell text already in memory.

use crate::roster::DateStyle;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::Timelike;
use log::{debug, warn};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// One row of cell text, column 0 first.
pub type Row = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkbookError {
    #[error("Failed to open workbook: {0}")]
    Open(String),
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
    #[error("Failed to read rows of sheet '{sheet}': {message}")]
    Rows { sheet: String, message: String },
}

/// A parsed workbook as seen by the roster scanner.
pub trait Workbook {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Rows of a sheet. Row and column indices are positions in this slice.
    fn rows(&self, sheet: &str) -> Result<&[Row], WorkbookError>;

    /// Stored date style of a cell, if it was authored as a date.
    fn date_style(&self, sheet: &str, row: usize, col: usize) -> Option<DateStyle>;
}

#[derive(Debug, Clone)]
struct SheetGrid {
    name: String,
    rows: Result<Vec<Row>, String>,
    styles: HashMap<(usize, usize), DateStyle>,
}

impl SheetGrid {
    fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self { name: name.into(), rows: Ok(rows), styles: HashMap::new() }
    }

    fn rows(&self) -> Result<&[Row], WorkbookError> {
        self.rows.as_deref().map_err(|message| WorkbookError::Rows {
            sheet: self.name.clone(),
            message: message.clone(),
        })
    }
}

fn find_sheet<'a>(sheets: &'a [SheetGrid], name: &str) -> Result<&'a SheetGrid, WorkbookError> {
    sheets
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| WorkbookError::SheetNotFound(name.to_string()))
}

/// Workbook assembled from cell text, e.g. rows already extracted by a caller.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetGrid>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet with the given rows.
    pub fn with_sheet<R, C>(mut self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows.into_iter().map(|row| row.into_iter().map(Into::into).collect()).collect();
        self.sheets.push(SheetGrid::new(name, rows));
        self
    }

    /// Append a sheet whose rows cannot be read.
    pub fn with_unreadable_sheet(mut self, name: &str, message: &str) -> Self {
        self.sheets.push(SheetGrid {
            name: name.to_string(),
            rows: Err(message.to_string()),
            styles: HashMap::new(),
        });
        self
    }

    /// Mark a cell of an existing sheet as authored with a date style.
    pub fn with_date_style(mut self, sheet: &str, row: usize, col: usize, style: DateStyle) -> Self {
        if let Some(grid) = self.sheets.iter_mut().find(|s| s.name == sheet) {
            grid.styles.insert((row, col), style);
        } else {
            warn!("Ignoring date style for unknown sheet '{}'", sheet);
        }
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn rows(&self, sheet: &str) -> Result<&[Row], WorkbookError> {
        find_sheet(&self.sheets, sheet)?.rows()
    }

    fn date_style(&self, sheet: &str, row: usize, col: usize) -> Option<DateStyle> {
        find_sheet(&self.sheets, sheet).ok()?.styles.get(&(row, col)).copied()
    }
}

/// Workbook read from an xlsx, xls or ods file.
///
/// Every sheet is materialised when the workbook is opened. Date-typed cells are
/// rendered as `mm-dd-yy` text and reported with that style; a sheet that cannot
/// be read keeps its error until its rows are requested.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    sheets: Vec<SheetGrid>,
}

impl XlsxWorkbook {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WorkbookError> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| WorkbookError::Open(e.to_string()))?;
        Ok(Self::load(workbook))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        let workbook = open_workbook_auto(path)
            .map_err(|e| WorkbookError::Open(format!("{}: {}", path.display(), e)))?;
        Ok(Self::load(workbook))
    }

    fn load<RS: Read + Seek>(mut workbook: Sheets<RS>) -> Self {
        let names = workbook.sheet_names().to_vec();
        let sheets = names
            .into_iter()
            .map(|name| match workbook.worksheet_range(&name) {
                Ok(range) => {
                    let grid = grid_from_range(&name, &range);
                    debug!("Loaded sheet '{}' with {} rows", name, grid.rows.as_ref().map_or(0, Vec::len));
                    grid
                }
                Err(e) => {
                    warn!("Sheet '{}' could not be read: {}", name, e);
                    SheetGrid { name, rows: Err(e.to_string()), styles: HashMap::new() }
                }
            })
            .collect();
        Self { sheets }
    }
}

impl Workbook for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn rows(&self, sheet: &str) -> Result<&[Row], WorkbookError> {
        find_sheet(&self.sheets, sheet)?.rows()
    }

    fn date_style(&self, sheet: &str, row: usize, col: usize) -> Option<DateStyle> {
        find_sheet(&self.sheets, sheet).ok()?.styles.get(&(row, col)).copied()
    }
}

fn grid_from_range(name: &str, range: &Range<Data>) -> SheetGrid {
    // Ranges start at their first used cell; pad so column 0 is column A
    let first_col = range.start().map_or(0, |(_, col)| col as usize);
    let mut grid = SheetGrid::new(name, Vec::new());
    let mut rows = Vec::with_capacity(range.height());

    for (row_idx, cells) in range.rows().enumerate() {
        let mut row: Row = vec![String::new(); first_col];
        for (offset, cell) in cells.iter().enumerate() {
            let (text, style) = cell_text(cell);
            if let Some(style) = style {
                grid.styles.insert((row_idx, first_col + offset), style);
            }
            row.push(text);
        }
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
        rows.push(row);
    }

    grid.rows = Ok(rows);
    grid
}

fn cell_text(cell: &Data) -> (String, Option<DateStyle>) {
    match cell {
        Data::Empty => (String::new(), None),
        Data::String(s) => (s.clone(), None),
        Data::Int(i) => (i.to_string(), None),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (format!("{}", *f as i64), None),
        Data::Float(f) => (f.to_string(), None),
        Data::Bool(b) => (b.to_string(), None),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if dt.is_datetime() => {
                let style = if value.time().num_seconds_from_midnight() == 0 {
                    DateStyle::MonthDayYear
                } else {
                    DateStyle::MonthDayYearTime
                };
                (style.render(value), Some(style))
            }
            _ => (dt.as_f64().to_string(), None),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => (s.clone(), None),
        Data::Error(e) => (format!("#ERR:{e:?}"), None),
    }
}
