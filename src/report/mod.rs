use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::pipeline::stage5_fit::FitResult;
use crate::pipeline::stage6_compare::ComparisonReport;

pub mod json;
pub mod text;

pub const RESULTS_FILE: &str = "results.json";
pub const SUMMARY_FILE: &str = "summary.txt";

#[derive(Debug, Clone, Serialize)]
pub struct GroupStatistics {
    pub neg_ctrl_avg: Option<f64>,
    pub neg_ctrl_avg_half: Option<f64>,
    pub vir_ctrl_avg: Option<f64>,
    pub neg_ctrl_stdev: f64,
    pub vir_ctrl_stdev: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSample {
    pub label: String,
    pub avgs: Vec<f64>,
    pub normalized_avgs: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedGroup {
    pub topline: f64,
    pub baseline: f64,
    pub ordinal: usize,
    pub analysis_type: String,
    pub dils: Vec<f64>,
    pub log_dils: Vec<f64>,
    pub samples: Vec<NormalizedSample>,
}

/// Control statistics over a plate region; `None` where too few control
/// wells held values.
#[derive(Debug, Clone, Serialize)]
pub struct ControlStatistics {
    pub neg_ctrl_avg: Option<f64>,
    pub neg_ctrl_avg_half: Option<f64>,
    pub neg_ctrl_stdev: Option<f64>,
    pub vir_ctrl_avg: Option<f64>,
    pub vir_ctrl_stdev: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlateStatistics {
    pub full: ControlStatistics,
    pub subplates: Vec<ControlStatistics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WellReading {
    pub address: String,
    pub value: f64,
    pub infected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointCalc {
    pub sum: f64,
    pub sum_minus_half: f64,
    pub dil_rate_to_the_power_of: f64,
    pub first_dil_multiplied: f64,
    pub dil_rate_x_first_dil_multiplied: f64,
    pub tcid: f64,
    pub pfu: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointSampleResult {
    pub tube_label: String,
    pub control_avg: f64,
    pub control_avg_half: f64,
    pub control_stdev: f64,
    pub infection_avgs: Vec<f64>,
    pub wells: Vec<Vec<WellReading>>,
    pub calc: EndpointCalc,
    pub epd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub tool: String,
    pub version: String,
    pub input_file: String,
    pub sheet: String,
}

impl RunInfo {
    pub fn new(input_file: impl Into<String>, sheet: impl Into<String>) -> Self {
        RunInfo {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.into(),
            sheet: sheet.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoseGroupReport {
    pub ordinal: usize,
    pub analysis_type: String,
    pub is_filler: bool,
    pub statistics: Option<GroupStatistics>,
    pub normalized: Option<NormalizedGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoseResponseReport {
    pub run: RunInfo,
    pub plate: PlateStatistics,
    pub groups: Vec<DoseGroupReport>,
    pub comparisons: Option<ComparisonReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointTissueReport {
    pub title: String,
    pub ordinal: usize,
    pub dilution_rate: f64,
    pub first_dilution: f64,
    pub working_volume: f64,
    pub samples: Vec<EndpointSampleResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub run: RunInfo,
    pub tissues: Vec<EndpointTissueReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlateReport {
    pub ordinal: usize,
    pub start: (usize, usize),
    pub end: (usize, usize),
    /// Row letter to its values in column order.
    pub rows: Vec<(String, Vec<Option<f64>>)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub run: RunInfo,
    pub plates: Vec<PlateReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitSampleReport {
    pub label: String,
    pub fit: FitResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitGroupReport {
    pub title: String,
    pub samples: Vec<FitSampleReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub run: RunInfo,
    pub analysis_type: String,
    pub groups: Vec<FitGroupReport>,
}

/// Writes the JSON results and the text summary into the output directory.
pub fn write_reports<T: Serialize>(out_dir: &Path, report: &T, summary: &str) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;
    json::write_json(&out_dir.join(RESULTS_FILE), report)?;
    fs::write(out_dir.join(SUMMARY_FILE), summary)?;
    Ok(())
}

pub fn format_f64_6(v: f64) -> String {
    format!("{v:.6}")
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
