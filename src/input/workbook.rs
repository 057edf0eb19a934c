use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::input::{CellValue, InputError, SheetGrid};

/// Opens an .xls or .xlsx workbook and returns the requested sheet (or the
/// first one) as an owned grid.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<SheetGrid, InputError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(requested) => names
            .iter()
            .find(|n| n.as_str() == requested)
            .cloned()
            .ok_or_else(|| InputError::MissingSheet(requested.to_string()))?,
        None => names.first().cloned().ok_or(InputError::NoSheets)?,
    };
    let range = workbook.worksheet_range(&name)?;
    Ok(grid_from_range(name, &range))
}

fn grid_from_range(name: String, range: &Range<Data>) -> SheetGrid {
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return SheetGrid::from_rows(name, Vec::new()),
    };
    // Pad so grid coordinates stay 1-based absolute sheet coordinates.
    let mut cells = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut out = vec![CellValue::Empty; start_col];
        out.extend(row.iter().map(reduce_cell));
        cells.push(out);
    }
    SheetGrid::from_rows(name, cells)
}

fn reduce_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
    }
}
