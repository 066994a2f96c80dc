//! In-memory worksheet model.
//!
//! Workbooks are read with `calamine` and converted into a [`Sheet`] of
//! typed [`Cell`]s addressed by absolute zero-based row and column, so the
//! parsers can run against sheets built in tests.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use spia_model::{CellKind, SheetError};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    String(String),
    Number(f64),
    Bool(bool),
    DateTime(String),
    Error(String),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Empty => CellKind::Empty,
            Self::String(_) => CellKind::String,
            Self::Number(_) => CellKind::Number,
            Self::Bool(_) => CellKind::Bool,
            Self::DateTime(_) => CellKind::DateTime,
            Self::Error(_) => CellKind::Error,
        }
    }

    /// Empty cells and cells holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::String(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Self::Empty,
            Data::String(text) => Self::String(text.clone()),
            Data::Float(number) => Self::Number(*number),
            Data::Int(number) => Self::Number(*number as f64),
            Data::Bool(flag) => Self::Bool(*flag),
            Data::DateTime(datetime) => Self::DateTime(datetime.as_f64().to_string()),
            Data::DateTimeIso(text) | Data::DurationIso(text) => Self::DateTime(text.clone()),
            Data::Error(error) => Self::Error(error.to_string()),
        }
    }
}

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or_default()
    }

    /// Cell at (`row`, `column`); out-of-range positions read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }

    pub fn is_blank_row(&self, row: usize) -> bool {
        self.row(row).iter().all(Cell::is_blank)
    }
}

/// Reads the named worksheet from xlsx bytes.
///
/// # Errors
///
/// [`SheetError::Workbook`] if the bytes are not an OOXML workbook and
/// [`SheetError::SheetNotFound`] if the workbook has no such sheet.
pub fn load_sheet(bytes: &[u8], sheet_name: &str) -> Result<Sheet, SheetError> {
    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes)).map_err(|e| {
        SheetError::Workbook {
            message: e.to_string(),
        }
    })?;
    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(SheetError::SheetNotFound {
            sheet: sheet_name.to_string(),
        });
    }
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| SheetError::Workbook {
            message: e.to_string(),
        })?;

    let (start_row, start_column) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for source in range.rows() {
        let mut cells = vec![Cell::Empty; start_column as usize];
        cells.extend(source.iter().map(Cell::from));
        rows.push(cells);
    }
    tracing::debug!(sheet = sheet_name, rows = rows.len(), "loaded worksheet");
    Ok(Sheet::new(sheet_name, rows))
}
