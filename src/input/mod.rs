use std::fmt;

use thiserror::Error;

pub mod config;
pub mod plan;
pub mod workbook;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no data sheets")]
    NoSheets,
    #[error("data sheet \"{0}\" was not found in the workbook")]
    MissingSheet(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("run plan error: {0}")]
    Plan(String),
}

/// One cell of a worksheet after type reduction: empty, a number, or text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// An owned, 1-based rectangular view of one worksheet. The extraction
/// pipeline reads only this interface, never the workbook itself.
#[derive(Debug, Clone)]
pub struct SheetGrid {
    pub name: String,
    cells: Vec<Vec<CellValue>>,
    max_col: usize,
}

impl SheetGrid {
    pub fn from_rows(name: impl Into<String>, cells: Vec<Vec<CellValue>>) -> Self {
        let max_col = cells.iter().map(Vec::len).max().unwrap_or(0);
        SheetGrid {
            name: name.into(),
            cells,
            max_col,
        }
    }

    pub fn max_row(&self) -> usize {
        self.cells.len()
    }

    pub fn max_col(&self) -> usize {
        self.max_col
    }

    /// Cell at 1-based (row, col); out-of-range positions read as empty.
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        if row == 0 || col == 0 {
            return EMPTY;
        }
        self.cells
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(EMPTY)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
