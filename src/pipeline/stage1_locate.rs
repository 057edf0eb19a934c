use crate::input::{CellValue, SheetGrid};
use crate::model::address::PlateLayout;
use crate::model::titration::VALUES_IN_A_SAMPLE;

/// How many leading columns are probed for an anchor when the plate or group
/// block is not pinned to column 1.
const ANCHOR_SEARCH_COLS: usize = 5;

/// Minimum fully numeric rows required before an unlabeled block is trusted
/// as a wellplate. Kept configurable; whether plates with fewer valid rows
/// should ever be accepted is an open point with the lab.
pub const DEFAULT_MIN_VALID_ROWS: usize = 4;

/// A labeled wellplate anchor: the empty corner cell above the 'A' row label
/// and left of the '1' column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateAnchor {
    pub row: usize,
    pub col: usize,
}

impl PlateAnchor {
    /// First sheet row past the plate block, where a follow-up scan resumes.
    pub fn next_row(&self, layout: &PlateLayout) -> usize {
        self.row + layout.rows as usize + 1
    }
}

/// Scans for a labeled wellplate from `start_row` downward. The anchor must
/// have the row label 'A' directly below it, the column label 1 directly to
/// its right, and must itself be empty.
pub fn find_plate_anchor(
    grid: &SheetGrid,
    layout: &PlateLayout,
    start_row: usize,
) -> Option<PlateAnchor> {
    const START_COL: usize = 1;
    for row in start_row.max(2)..=grid.max_row() {
        if !is_start_row_label(grid.value(row, START_COL)) {
            continue;
        }
        let anchor_row = row - 1;
        if !is_start_col_label(grid.value(anchor_row, START_COL + 1)) {
            continue;
        }
        if !grid.value(anchor_row, START_COL).is_empty() {
            continue;
        }
        return Some(PlateAnchor {
            row: anchor_row,
            col: START_COL,
        });
    }
    None
}

fn is_start_row_label(value: &CellValue) -> bool {
    match value.as_text() {
        Some(s) => {
            let mut chars = s.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&'A'))
        }
        None => false,
    }
}

fn is_start_col_label(value: &CellValue) -> bool {
    match value {
        CellValue::Number(v) => *v == 1.0,
        CellValue::Text(s) => s.trim().parse::<i64>() == Ok(1),
        CellValue::Empty => false,
    }
}

/// An unlabeled wellplate located by its dense numeric block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensePlate {
    pub start: (usize, usize),
    pub end: (usize, usize),
    pub next_row: usize,
}

/// Scans for an unlabeled wellplate from `start_row` downward: a cell holding
/// a numeric value that starts at least `min_valid_rows` rows of
/// `wells_in_parallel` consecutive numeric cells.
pub fn find_dense_plate(
    grid: &SheetGrid,
    layout: &PlateLayout,
    start_row: usize,
    min_valid_rows: usize,
) -> Option<DensePlate> {
    for row in start_row.max(1)..=grid.max_row() {
        for col in 1..=ANCHOR_SEARCH_COLS {
            if grid.value(row, col).as_number().is_none() {
                continue;
            }
            let mut valid_rows = 0;
            for check_row in row..row + layout.rows as usize {
                if row_is_numeric(grid, check_row, col, layout.wells_in_parallel as usize) {
                    valid_rows += 1;
                }
            }
            if valid_rows < min_valid_rows {
                continue;
            }
            return Some(DensePlate {
                start: (row, col),
                end: (row + valid_rows - 1, col + layout.cols as usize - 1),
                next_row: row + valid_rows,
            });
        }
    }
    None
}

fn row_is_numeric(grid: &SheetGrid, row: usize, first_col: usize, width: usize) -> bool {
    (first_col..first_col + width).all(|col| grid.value(row, col).as_number().is_some())
}

/// A titration group block header discovered on a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAnchor {
    pub title: String,
    pub cell: (usize, usize),
    pub next_row: usize,
}

/// Scans for a group block from `start_row` downward: a "Group..." title,
/// a "log dil" label below it, a numeric dilution below that, and a first
/// sample column of nine numeric values.
pub fn find_group_block(grid: &SheetGrid, start_row: usize) -> Option<GroupAnchor> {
    for row in start_row.max(1)..=grid.max_row() {
        for col in 1..=ANCHOR_SEARCH_COLS {
            let Some(title) = grid.value(row, col).as_text() else {
                continue;
            };
            if !title.to_lowercase().starts_with("group") {
                continue;
            }
            let Some(log_label) = grid.value(row + 1, col).as_text() else {
                continue;
            };
            if !log_label.to_lowercase().contains("log dil") {
                continue;
            }
            if grid.value(row + 2, col).as_number().is_none() {
                continue;
            }
            if !column_is_numeric(grid, row + 2, col + 1, VALUES_IN_A_SAMPLE) {
                continue;
            }
            return Some(GroupAnchor {
                title: title.to_string(),
                cell: (row, col),
                next_row: row + VALUES_IN_A_SAMPLE + 3,
            });
        }
    }
    None
}

pub(crate) fn column_is_numeric(
    grid: &SheetGrid,
    first_row: usize,
    col: usize,
    height: usize,
) -> bool {
    (first_row..first_row + height).all(|row| grid.value(row, col).as_number().is_some())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_locate.rs"]
mod tests;
