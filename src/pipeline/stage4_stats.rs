use crate::model::address::WellAddress;
use crate::model::group::{Group, Sample, Tissue};
use crate::model::plate::PlateData;
use crate::pipeline::ExtractError;
use crate::report::{
    ControlStatistics, EndpointCalc, EndpointSampleResult, GroupStatistics, NormalizedGroup,
    NormalizedSample, PlateStatistics, WellReading,
};
use crate::stats::{mean, sample_stdev};

/// Conversion factor from TCID50 to plaque-forming units.
const PFU_PER_TCID: f64 = 0.69;

pub fn group_statistics(group: &Group) -> GroupStatistics {
    GroupStatistics {
        neg_ctrl_avg: group.neg_ctrl_avg(),
        neg_ctrl_avg_half: group.neg_ctrl_avg_half(),
        vir_ctrl_avg: group.vir_ctrl_avg(),
        neg_ctrl_stdev: group.neg_ctrl_stdev(),
        vir_ctrl_stdev: group.vir_ctrl_stdev(),
    }
}

/// Normalizes every sample of the group against the control averages:
/// topline is the negative-control average, baseline the viral-control
/// average, and measurement averages are rescaled to percent.
pub fn normalize_group(group: &Group) -> Result<NormalizedGroup, ExtractError> {
    let topline = group.neg_ctrl_avg();
    let baseline = group.vir_ctrl_avg();
    let (Some(topline), Some(baseline)) = (topline, baseline) else {
        return Err(ExtractError::Normalization {
            owner: group.label(),
            topline,
            baseline,
        });
    };
    if topline == baseline {
        return Err(ExtractError::Normalization {
            owner: group.label(),
            topline: Some(topline),
            baseline: Some(baseline),
        });
    }

    let samples = group
        .samples
        .iter()
        .map(|sample| NormalizedSample {
            label: sample.label.clone(),
            avgs: sample.measurement_col_avgs(),
            normalized_avgs: sample
                .normalized_col_avgs(baseline, topline)
                .into_iter()
                .map(|v| v * 100.0)
                .collect(),
        })
        .collect();

    Ok(NormalizedGroup {
        topline,
        baseline,
        ordinal: group.ordinal,
        analysis_type: group.analysis_type.clone(),
        dils: group.dil_series.clone(),
        log_dils: group.dil_series.iter().map(|d| d.log10()).collect(),
        samples,
    })
}

/// Control statistics for the full plate and each of its subplates: one
/// subplate per column segment and row parity, matching how four 96-well
/// loads interleave on a 384-well plate.
pub fn plate_statistics(plate: &PlateData) -> PlateStatistics {
    let layout = plate.layout;
    let mut subplates = Vec::new();
    let mut full_neg = Vec::new();
    let mut full_vir = Vec::new();

    for segment_start in layout.segment_starts() {
        let neg_cols = [segment_start, segment_start + 1];
        let vir_col = segment_start + layout.wells_in_parallel - 1;
        for parity in [0u8, 1u8] {
            let mut neg_values = Vec::new();
            let mut vir_values = Vec::new();
            for row_offset in (parity..layout.rows).step_by(2) {
                let row_char = (b'A' + row_offset) as char;
                for col in neg_cols {
                    if let Some(value) = plate.get(WellAddress::new(row_char, col)).flatten() {
                        neg_values.push(value);
                    }
                }
                if let Some(value) = plate.get(WellAddress::new(row_char, vir_col)).flatten() {
                    vir_values.push(value);
                }
            }
            subplates.push(control_statistics(&neg_values, &vir_values));
            full_neg.extend(neg_values);
            full_vir.extend(vir_values);
        }
    }

    PlateStatistics {
        full: control_statistics(&full_neg, &full_vir),
        subplates,
    }
}

fn control_statistics(neg_values: &[f64], vir_values: &[f64]) -> ControlStatistics {
    ControlStatistics {
        neg_ctrl_avg: mean(neg_values),
        neg_ctrl_avg_half: mean(neg_values).map(|avg| avg / 2.0),
        neg_ctrl_stdev: (neg_values.len() > 1).then(|| sample_stdev(neg_values)),
        vir_ctrl_avg: mean(vir_values),
        vir_ctrl_stdev: (vir_values.len() > 1).then(|| sample_stdev(vir_values)),
    }
}

/// Endpoint analysis for every sample of a tissue: infection shares per well
/// slot and the dilution chain down to TCID50 and PFU.
pub fn endpoint_results(tissue: &Tissue) -> Vec<EndpointSampleResult> {
    tissue
        .samples
        .iter()
        .map(|sample| endpoint_sample_result(sample, tissue))
        .collect()
}

fn endpoint_sample_result(sample: &Sample, tissue: &Tissue) -> EndpointSampleResult {
    let avg = sample.control_avg();
    let avg_50 = avg / 2.0;
    let calc = endpoint_calc(
        sample.infection_avgs_sum(),
        tissue.dil_rate,
        tissue.first_dil,
        tissue.working_vol,
    );
    let epd = (calc.tcid * 100.0).round() / 100.0;
    EndpointSampleResult {
        tube_label: sample.label.clone(),
        control_avg: avg,
        control_avg_half: avg_50,
        control_stdev: sample.control_stdev(),
        infection_avgs: sample.infection_avgs(),
        wells: sample
            .parallels
            .iter()
            .map(|parallel| {
                parallel
                    .wells_in_order()
                    .into_iter()
                    .map(|well| WellReading {
                        address: well.address.to_string(),
                        value: well.value,
                        infected: avg_50 < well.value,
                    })
                    .collect()
            })
            .collect(),
        calc,
        epd,
    }
}

fn endpoint_calc(sum: f64, dil_rate: f64, first_dil: f64, working_vol: f64) -> EndpointCalc {
    let sum_minus_half = if sum - 0.5 > 0.0 { sum - 0.5 } else { 0.0 };
    let degenerate = sum_minus_half == 0.0;
    let dil_rate_to_the_power_of = if degenerate {
        0.0
    } else {
        dil_rate.powf(sum_minus_half)
    };
    let first_dil_multiplied = first_dil * dil_rate;
    let dil_rate_x_first_dil_multiplied = if degenerate {
        0.0
    } else {
        dil_rate_to_the_power_of * first_dil_multiplied
    };
    let tcid = if degenerate {
        0.0
    } else {
        dil_rate_x_first_dil_multiplied * (1.0 / working_vol)
    };
    let pfu = if degenerate { 0.0 } else { tcid * PFU_PER_TCID };
    EndpointCalc {
        sum,
        sum_minus_half,
        dil_rate_to_the_power_of,
        first_dil_multiplied,
        dil_rate_x_first_dil_multiplied,
        tcid,
        pfu,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_stats.rs"]
mod tests;
