use crate::model::address::WellAddress;
use crate::model::group::{Group, Parallel, Tissue, Well};
use crate::model::plate::PlateData;
use crate::pipeline::ExtractError;

/// Assigns plate values to every group's parallels in loading order.
pub fn integrate_groups(plate: &PlateData, groups: &mut [Group]) -> Result<(), ExtractError> {
    let mut cursor = Some(plate.first_numeric().ok_or(ExtractError::NoData)?);
    for group in groups.iter_mut() {
        let owner = group.label();
        for sample in &mut group.samples {
            for parallel in &mut sample.parallels {
                fill_parallel(plate, &mut cursor, parallel, &owner, &sample.label)?;
            }
            tracing::info!("integrated data for {owner}, sample \"{}\"", sample.label);
        }
        tracing::info!("{owner} integrated");
    }
    Ok(())
}

/// Assigns plate values to every tissue's parallels in loading order.
pub fn integrate_tissues(plate: &PlateData, tissues: &mut [Tissue]) -> Result<(), ExtractError> {
    let mut cursor = Some(plate.first_numeric().ok_or(ExtractError::NoData)?);
    for tissue in tissues.iter_mut() {
        let owner = tissue.label();
        for sample in &mut tissue.samples {
            for parallel in &mut sample.parallels {
                fill_parallel(plate, &mut cursor, parallel, &owner, &sample.label)?;
            }
            tracing::info!("integrated data for {owner}, sample \"{}\"", sample.label);
        }
        tracing::info!("{owner} integrated");
    }
    Ok(())
}

/// Pulls values along the traversal order until the parallel is filled.
/// Empty wells consume a step without being assigned to any slot; running
/// out of wells mid-parallel is fatal.
fn fill_parallel(
    plate: &PlateData,
    cursor: &mut Option<WellAddress>,
    parallel: &mut Parallel,
    owner: &str,
    sample: &str,
) -> Result<(), ExtractError> {
    while !parallel.is_filled() {
        let address = cursor.ok_or_else(|| ExtractError::IncompleteData {
            owner: owner.to_string(),
            sample: sample.to_string(),
        })?;
        let value = plate
            .get(address)
            .ok_or(ExtractError::MissingWell { address })?;
        if let Some(absorbance) = value {
            parallel.push_well(Well {
                value: absorbance,
                address,
            });
        }
        *cursor = plate.layout.next_address(address);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_integrate.rs"]
mod tests;
