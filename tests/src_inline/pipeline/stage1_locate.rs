use super::*;

fn t(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn n(v: f64) -> CellValue {
    CellValue::Number(v)
}

fn e() -> CellValue {
    CellValue::Empty
}

fn grid(rows: Vec<Vec<CellValue>>) -> SheetGrid {
    SheetGrid::from_rows("Sheet1", rows)
}

#[test]
fn test_find_plate_anchor() {
    let grid = grid(vec![
        vec![e(), n(1.0), n(2.0)],
        vec![t("A"), n(0.5), n(0.6)],
    ]);
    let layout = PlateLayout::plate_384();
    let anchor = find_plate_anchor(&grid, &layout, 1).unwrap();
    assert_eq!((anchor.row, anchor.col), (1, 1));
    assert_eq!(anchor.next_row(&layout), 18);
}

#[test]
fn test_find_plate_anchor_accepts_lowercase_and_padded_labels() {
    let grid = grid(vec![
        vec![e(), e()],
        vec![e(), t("01")],
        vec![t("a"), n(0.5)],
    ]);
    let anchor = find_plate_anchor(&grid, &PlateLayout::plate_384(), 1).unwrap();
    assert_eq!((anchor.row, anchor.col), (2, 1));
}

#[test]
fn test_find_plate_anchor_rejects_occupied_corner() {
    let grid = grid(vec![
        vec![t("plate"), n(1.0)],
        vec![t("A"), n(0.5)],
    ]);
    assert!(find_plate_anchor(&grid, &PlateLayout::plate_384(), 1).is_none());
}

#[test]
fn test_find_plate_anchor_rejects_wrong_labels() {
    // Column label is 2, not 1.
    let grid = grid(vec![
        vec![e(), n(2.0)],
        vec![t("A"), n(0.5)],
    ]);
    assert!(find_plate_anchor(&grid, &PlateLayout::plate_384(), 1).is_none());
    // Row label is not the single letter A.
    let grid = SheetGrid::from_rows(
        "Sheet1",
        vec![vec![e(), n(1.0)], vec![t("AB"), n(0.5)]],
    );
    assert!(find_plate_anchor(&grid, &PlateLayout::plate_384(), 1).is_none());
}

#[test]
fn test_find_plate_anchor_resumes_past_first_plate() {
    let mut rows = vec![
        vec![e(), n(1.0)],
        vec![t("A"), n(0.5)],
    ];
    // Second labeled plate further down the sheet.
    while rows.len() < 20 {
        rows.push(vec![e()]);
    }
    rows.push(vec![e(), n(1.0)]);
    rows.push(vec![t("A"), n(0.7)]);
    let grid = grid(rows);
    let layout = PlateLayout::plate_384();

    let first = find_plate_anchor(&grid, &layout, 1).unwrap();
    assert_eq!(first.row, 1);
    let second = find_plate_anchor(&grid, &layout, first.next_row(&layout)).unwrap();
    assert_eq!(second.row, 21);
}

fn dense_rows(count: usize, width: usize, base: f64) -> Vec<Vec<CellValue>> {
    (0..count)
        .map(|i| (0..width).map(|j| n(base + (i * width + j) as f64)).collect())
        .collect()
}

#[test]
fn test_find_dense_plate() {
    let mut rows = vec![vec![t("experiment")], vec![e()]];
    rows.extend(dense_rows(8, 12, 0.1));
    let grid = grid(rows);
    let layout = PlateLayout::plate_96();
    let dense = find_dense_plate(&grid, &layout, 1, DEFAULT_MIN_VALID_ROWS).unwrap();
    assert_eq!(dense.start, (3, 1));
    assert_eq!(dense.end, (10, 12));
    assert_eq!(dense.next_row, 11);
}

#[test]
fn test_find_dense_plate_rejects_below_threshold() {
    let grid = grid(dense_rows(3, 12, 0.1));
    let layout = PlateLayout::plate_96();
    assert!(find_dense_plate(&grid, &layout, 1, 4).is_none());
    // The same block is accepted when the caller lowers the threshold.
    assert!(find_dense_plate(&grid, &layout, 1, 3).is_some());
}

#[test]
fn test_find_dense_plate_locates_stacked_plates() {
    let mut rows = dense_rows(8, 12, 0.1);
    rows.push(vec![e()]);
    rows.extend(dense_rows(8, 12, 100.0));
    let grid = grid(rows);
    let layout = PlateLayout::plate_96();

    let first = find_dense_plate(&grid, &layout, 1, DEFAULT_MIN_VALID_ROWS).unwrap();
    assert_eq!(first.start, (1, 1));
    assert_eq!(first.end, (8, 12));
    let second = find_dense_plate(&grid, &layout, first.next_row, DEFAULT_MIN_VALID_ROWS).unwrap();
    assert_eq!(second.start, (10, 1));
    assert_eq!(second.end, (17, 12));
}

#[test]
fn test_find_group_block() {
    let mut rows = vec![
        vec![t("Group 1"), e()],
        vec![t("Log Dil."), t("S1")],
    ];
    for i in 0..9 {
        rows.push(vec![n(i as f64), n(50.0 + i as f64)]);
    }
    let grid = grid(rows);
    let anchor = find_group_block(&grid, 1).unwrap();
    assert_eq!(anchor.title, "Group 1");
    assert_eq!(anchor.cell, (1, 1));
    assert_eq!(anchor.next_row, 13);
}

#[test]
fn test_find_group_block_requires_full_sample_column() {
    let mut rows = vec![
        vec![t("Group 1"), e()],
        vec![t("log dil"), t("S1")],
    ];
    // Only eight values in the first sample column.
    for i in 0..9 {
        let sample = if i < 8 { n(50.0) } else { e() };
        rows.push(vec![n(i as f64), sample]);
    }
    let grid = grid(rows);
    assert!(find_group_block(&grid, 1).is_none());
}
