use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::input::InputError;

/// Analysis type assigned to filler groups that consume plate area without
/// being analyzed.
pub const EXCLUDED_DATA_TYPE: &str = "EXCLUDE_DATA";

/// Configuration for the 4PL fit: analysis types mapped to the hill slope
/// standard used as the optimizer's initial slope guess.
#[derive(Debug, Clone, Deserialize)]
pub struct FitConfig {
    pub analysis_types: BTreeMap<String, f64>,
}

impl FitConfig {
    pub fn hill_slope_standard(&self, analysis_type: &str) -> Option<f64> {
        self.analysis_types.get(analysis_type).copied()
    }
}

/// Configuration for dose-response runs: the allowed analysis type names.
#[derive(Debug, Clone, Deserialize)]
pub struct DoseResponseConfig {
    pub analysis_types: Vec<String>,
}

impl DoseResponseConfig {
    pub fn allows(&self, analysis_type: &str) -> bool {
        analysis_type == EXCLUDED_DATA_TYPE
            || self.analysis_types.iter().any(|t| t == analysis_type)
    }
}

/// Configuration for endpoint-dilution runs: the usable tissue names.
#[derive(Debug, Clone, Deserialize)]
pub struct TissueConfig {
    pub tissues: Vec<String>,
}

impl TissueConfig {
    pub fn allows(&self, tissue: &str) -> bool {
        self.tissues.iter().any(|t| t == tissue)
    }
}

pub fn load_fit_config(path: &Path) -> Result<FitConfig, InputError> {
    let raw = fs::read_to_string(path)?;
    let config: FitConfig = serde_json::from_str(&raw)?;
    if config.analysis_types.is_empty() {
        return Err(InputError::Config(
            "configured parameter \"analysis_types\" was empty".to_string(),
        ));
    }
    Ok(config)
}

pub fn load_dose_config(path: &Path) -> Result<DoseResponseConfig, InputError> {
    let raw = fs::read_to_string(path)?;
    let config: DoseResponseConfig = serde_json::from_str(&raw)?;
    if config.analysis_types.is_empty() {
        return Err(InputError::Config(
            "configured parameter \"analysis_types\" was empty".to_string(),
        ));
    }
    Ok(config)
}

pub fn load_tissue_config(path: &Path) -> Result<TissueConfig, InputError> {
    let raw = fs::read_to_string(path)?;
    let config: TissueConfig = serde_json::from_str(&raw)?;
    if config.tissues.is_empty() {
        return Err(InputError::Config(
            "configured parameter \"tissues\" was empty".to_string(),
        ));
    }
    Ok(config)
}
