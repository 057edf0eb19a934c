use thiserror::Error;

use crate::model::address::WellAddress;

pub mod stage1_locate;
pub mod stage2_extract;
pub mod stage3_integrate;
pub mod stage4_stats;
pub mod stage5_fit;
pub mod stage6_compare;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not locate a wellplate in data sheet \"{sheet}\"")]
    PlateNotFound { sheet: String },
    #[error("could not locate any group blocks in data sheet \"{sheet}\"")]
    GroupBlockNotFound { sheet: String },
    #[error(
        "row label \"{label}\" was invalid. Expected a single character string like 'A' or 'a'"
    )]
    InvalidRowLabel { label: String },
    #[error("column label \"{label}\" was invalid. Expected a whole number between 1 and {max}")]
    InvalidColumnLabel { label: String, max: u8 },
    #[error(
        "absorbance value \"{value}\" of well {address} was invalid. Expected either a number or an empty value"
    )]
    InvalidCell { address: WellAddress, value: String },
    #[error("absorbance value \"{value}\" was not valid")]
    InvalidAbsorbance { value: String },
    #[error("dilution value \"{value}\" was not valid")]
    InvalidDilution { value: String },
    #[error(
        "the wellplate contains {available} absorbance values but the plan requires {required}. Ensure that all data points are correctly configured"
    )]
    CountMismatch { required: usize, available: usize },
    #[error("couldn't find any absorbance values in the wellplate")]
    NoData,
    #[error("couldn't find an absorbance value in well {address}")]
    MissingWell { address: WellAddress },
    #[error(
        "the wellplate did not contain enough absorbance data to integrate {owner}, sample \"{sample}\""
    )]
    IncompleteData { owner: String, sample: String },
    #[error("there weren't enough valid values to complement sample \"{sample}\" of {group}")]
    IncompleteSample { group: String, sample: String },
    #[error(
        "normalization failed for {owner}: topline ({topline:?}) or baseline ({baseline:?}) was unusable"
    )]
    Normalization {
        owner: String,
        topline: Option<f64>,
        baseline: Option<f64>,
    },
}
