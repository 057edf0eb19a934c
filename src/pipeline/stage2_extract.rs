use crate::input::{CellValue, SheetGrid};
use crate::model::address::{PlateLayout, WellAddress};
use crate::model::group::{Group, Tissue, WELLS_IN_A_PARALLEL};
use crate::model::plate::PlateData;
use crate::model::titration::{TitrationGroup, TitrationSample, VALUES_IN_A_SAMPLE};
use crate::pipeline::ExtractError;
use crate::pipeline::stage1_locate::{DensePlate, GroupAnchor, PlateAnchor, column_is_numeric};

/// Reads the labeled plate block below and right of the anchor into a plate
/// map, validating every row label, column label and absorbance value.
pub fn extract_plate(
    grid: &SheetGrid,
    layout: &PlateLayout,
    anchor: PlateAnchor,
) -> Result<PlateData, ExtractError> {
    let mut plate = PlateData::new(*layout);
    for i in 1..=layout.rows as usize {
        let sheet_row = anchor.row + i;
        let row_char = parse_row_label(grid.value(sheet_row, anchor.col))?;
        for j in 1..=layout.cols as usize {
            let sheet_col = anchor.col + j;
            let col_num = parse_col_label(grid.value(anchor.row, sheet_col), layout.cols)?;
            let address = WellAddress::new(row_char, col_num);
            let value = parse_absorbance(grid.value(sheet_row, sheet_col), address)?;
            plate.insert(address, value);
        }
    }
    Ok(plate)
}

/// Reads an unlabeled dense block into a plate map with generated row letters
/// and column numbers. Non-numeric cells read as empty wells.
pub fn extract_dense_plate(grid: &SheetGrid, layout: &PlateLayout, dense: &DensePlate) -> PlateData {
    let (start_row, start_col) = dense.start;
    let mut plate = PlateData::new(*layout);
    for (i, sheet_row) in (start_row..=dense.end.0).enumerate() {
        let row_char = (b'A' + i as u8) as char;
        for j in 0..layout.cols as usize {
            let address = WellAddress::new(row_char, j as u8 + 1);
            let value = grid.value(sheet_row, start_col + j).as_number();
            plate.insert(address, value);
        }
    }
    plate
}

/// Total wells the configured groups will consume.
pub fn required_wells_for_groups(groups: &[Group]) -> usize {
    groups
        .iter()
        .flat_map(|g| &g.samples)
        .map(|s| s.parallels.len() * WELLS_IN_A_PARALLEL)
        .sum()
}

pub fn required_wells_for_tissues(tissues: &[Tissue]) -> usize {
    tissues
        .iter()
        .flat_map(|t| &t.samples)
        .map(|s| s.parallels.len() * WELLS_IN_A_PARALLEL)
        .sum()
}

/// The plate must hold exactly as many absorbance values as the plan
/// requires; a mismatch in either direction aborts the run.
pub fn check_required_wells(plate: &PlateData, required: usize) -> Result<(), ExtractError> {
    let available = plate.numeric_wells();
    if available != required {
        return Err(ExtractError::CountMismatch {
            required,
            available,
        });
    }
    Ok(())
}

/// Reads one titration group block: the dilution column and every sample
/// column to the right that still holds nine numeric values.
pub fn extract_titration_group(
    grid: &SheetGrid,
    anchor: &GroupAnchor,
) -> Result<TitrationGroup, ExtractError> {
    let (start_row, start_col) = anchor.cell;
    let mut end_col = start_col;
    while column_is_numeric(grid, start_row + 2, end_col + 1, VALUES_IN_A_SAMPLE) {
        end_col += 1;
    }

    let mut group = TitrationGroup::new(anchor.title.clone(), anchor.cell);
    for row in start_row + 2..start_row + 2 + VALUES_IN_A_SAMPLE {
        let value = grid.value(row, start_col);
        let dil = value
            .as_number()
            .ok_or_else(|| ExtractError::InvalidDilution {
                value: value.to_string(),
            })?;
        group.dils.push(dil);
    }

    for (i, col) in (start_col + 1..=end_col).enumerate() {
        let label = match grid.value(start_row + 1, col).as_text() {
            Some(s) => s.to_string(),
            None => format!("Sample {}", i + 1),
        };
        let mut sample = TitrationSample::new(label);
        for row in start_row + 2..start_row + 2 + VALUES_IN_A_SAMPLE {
            let value = grid.value(row, col);
            let absorbance =
                value
                    .as_number()
                    .ok_or_else(|| ExtractError::InvalidAbsorbance {
                        value: value.to_string(),
                    })?;
            sample.add_value(absorbance);
        }
        if !sample.is_filled() {
            return Err(ExtractError::IncompleteSample {
                group: group.title.clone(),
                sample: sample.label,
            });
        }
        group.samples.push(sample);
    }
    Ok(group)
}

fn parse_row_label(value: &CellValue) -> Result<char, ExtractError> {
    if let Some(s) = value.as_text() {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && c.is_ascii_alphabetic()
        {
            return Ok(c.to_ascii_uppercase());
        }
    }
    Err(ExtractError::InvalidRowLabel {
        label: value.to_string(),
    })
}

fn parse_col_label(value: &CellValue, max: u8) -> Result<u8, ExtractError> {
    let parsed = match value {
        CellValue::Number(v) if v.fract() == 0.0 => Some(*v as i64),
        CellValue::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if (1..=max as i64).contains(&n) => Ok(n as u8),
        _ => Err(ExtractError::InvalidColumnLabel {
            label: value.to_string(),
            max,
        }),
    }
}

fn parse_absorbance(
    value: &CellValue,
    address: WellAddress,
) -> Result<Option<f64>, ExtractError> {
    match value {
        CellValue::Empty => Ok(None),
        CellValue::Number(v) => Ok(Some(*v)),
        CellValue::Text(s) => Err(ExtractError::InvalidCell {
            address,
            value: s.clone(),
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_extract.rs"]
mod tests;
