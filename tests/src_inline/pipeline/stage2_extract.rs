use super::*;

fn t(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn n(v: f64) -> CellValue {
    CellValue::Number(v)
}

/// Builds a labeled 384-well sheet with the anchor at (1, 1) and the given
/// well values.
fn labeled_grid(values: &[(char, u8, CellValue)]) -> SheetGrid {
    let layout = PlateLayout::plate_384();
    let mut rows = Vec::new();
    let mut header = vec![CellValue::Empty];
    header.extend((1..=layout.cols).map(|c| n(c as f64)));
    rows.push(header);
    for r in 0..layout.rows {
        let row_char = (b'A' + r) as char;
        let mut row = vec![t(&row_char.to_string())];
        row.extend(std::iter::repeat_n(CellValue::Empty, layout.cols as usize));
        rows.push(row);
    }
    for (row_char, col, value) in values {
        let row_index = (*row_char as u8 - b'A') as usize + 1;
        rows[row_index][*col as usize] = value.clone();
    }
    SheetGrid::from_rows("Sheet1", rows)
}

fn first_parallel_values() -> Vec<(char, u8, CellValue)> {
    (1..=12).map(|c| ('A', c, n(c as f64))).collect()
}

#[test]
fn test_extract_plate_reads_values_and_empties() {
    let grid = labeled_grid(&first_parallel_values());
    let layout = PlateLayout::plate_384();
    let anchor = PlateAnchor { row: 1, col: 1 };
    let plate = extract_plate(&grid, &layout, anchor).unwrap();
    assert_eq!(plate.numeric_wells(), 12);
    assert_eq!(plate.get(WellAddress::new('A', 3)), Some(Some(3.0)));
    assert_eq!(plate.get(WellAddress::new('B', 1)), Some(None));
    assert_eq!(plate.iter().count(), layout.well_count());
}

#[test]
fn test_extract_plate_rejects_text_in_well() {
    let mut values = first_parallel_values();
    values.push(('C', 5, t("smudge")));
    let grid = labeled_grid(&values);
    let err = extract_plate(&grid, &PlateLayout::plate_384(), PlateAnchor { row: 1, col: 1 })
        .unwrap_err();
    match err {
        ExtractError::InvalidCell { address, value } => {
            assert_eq!(address.to_string(), "C05");
            assert_eq!(value, "smudge");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_extract_plate_rejects_bad_row_label() {
    let grid = labeled_grid(&first_parallel_values());
    let mut rows: Vec<Vec<CellValue>> = (1..=grid.max_row())
        .map(|r| (1..=grid.max_col()).map(|c| grid.value(r, c).clone()).collect())
        .collect();
    rows[5][0] = n(5.0);
    let grid = SheetGrid::from_rows("Sheet1", rows);
    let err = extract_plate(&grid, &PlateLayout::plate_384(), PlateAnchor { row: 1, col: 1 })
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidRowLabel { .. }));
}

#[test]
fn test_check_required_wells_mismatch_reports_both_counts() {
    let grid = labeled_grid(&first_parallel_values());
    let plate =
        extract_plate(&grid, &PlateLayout::plate_384(), PlateAnchor { row: 1, col: 1 }).unwrap();

    // Plan wants two parallels but the plate holds one.
    match check_required_wells(&plate, 24).unwrap_err() {
        ExtractError::CountMismatch {
            required,
            available,
        } => {
            assert_eq!(required, 24);
            assert_eq!(available, 12);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Plan wants nothing but the plate holds data.
    assert!(check_required_wells(&plate, 0).is_err());
    assert!(check_required_wells(&plate, 12).is_ok());
}

#[test]
fn test_required_well_totals() {
    let mut group = Group::new("DORA", 1, false);
    group.add_sample("S1", 2);
    group.add_sample("S2", 1);
    assert_eq!(required_wells_for_groups(&[group]), 36);

    let mut tissue = Tissue::new("VERO", 1, 10.0, 1.0, 1.0);
    tissue.add_sample("T1", 4);
    assert_eq!(required_wells_for_tissues(&[tissue]), 48);
}

#[test]
fn test_extract_dense_plate_maps_generated_addresses() {
    let rows: Vec<Vec<CellValue>> = (0..8)
        .map(|i| (0..12).map(|j| n((i * 12 + j) as f64)).collect())
        .collect();
    let grid = SheetGrid::from_rows("Sheet1", rows);
    let layout = PlateLayout::plate_96();
    let dense = DensePlate {
        start: (1, 1),
        end: (8, 12),
        next_row: 9,
    };
    let plate = extract_dense_plate(&grid, &layout, &dense);
    assert_eq!(plate.numeric_wells(), 96);
    assert_eq!(plate.get(WellAddress::new('A', 1)), Some(Some(0.0)));
    assert_eq!(plate.get(WellAddress::new('H', 12)), Some(Some(95.0)));
}

fn titration_grid() -> SheetGrid {
    let mut rows = vec![
        vec![t("Group 1"), CellValue::Empty, CellValue::Empty],
        vec![t("log dil"), t("S1"), CellValue::Empty],
    ];
    for i in 0..9 {
        rows.push(vec![
            n(i as f64 * 0.5),
            n(90.0 - i as f64 * 10.0),
            n(95.0 - i as f64 * 10.0),
        ]);
    }
    SheetGrid::from_rows("Sheet1", rows)
}

#[test]
fn test_extract_titration_group() {
    let grid = titration_grid();
    let anchor = GroupAnchor {
        title: "Group 1".to_string(),
        cell: (1, 1),
        next_row: 13,
    };
    let group = extract_titration_group(&grid, &anchor).unwrap();
    assert_eq!(group.dils.len(), 9);
    assert_eq!(group.dils[1], 0.5);
    assert_eq!(group.samples.len(), 2);
    assert_eq!(group.samples[0].label, "S1");
    // A sample column without a label gets a generated one.
    assert_eq!(group.samples[1].label, "Sample 2");
    assert_eq!(group.samples[0].values[0], 90.0);
    assert!(group.samples.iter().all(TitrationSample::is_filled));
}
