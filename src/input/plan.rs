use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::input::InputError;
use crate::input::config::{DoseResponseConfig, EXCLUDED_DATA_TYPE, TissueConfig};
use crate::model::address::PlateLayout;
use crate::model::group::{Group, Tissue};

/// Allowed parallels-per-sample for dose-response groups.
pub const DOSE_PARALLEL_CHOICES: [usize; 4] = [1, 2, 4, 8];
/// Allowed parallels-per-sample for endpoint-dilution tissues.
pub const ENDPOINT_PARALLEL_CHOICES: [usize; 2] = [4, 8];

/// Group definitions for a dose-response run. Replaces the original
/// interactive definition phase with a declarative file.
#[derive(Debug, Clone, Deserialize)]
pub struct DosePlan {
    pub groups: Vec<DoseGroupPlan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoseGroupPlan {
    pub analysis_type: String,
    #[serde(default)]
    pub is_filler: bool,
    pub initial_dilution: f64,
    pub dilution_factor: f64,
    pub samples: Vec<SamplePlan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplePlan {
    pub label: String,
    pub parallels: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointPlan {
    pub tissues: Vec<TissuePlan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TissuePlan {
    pub title: String,
    pub dilution_rate: f64,
    pub first_dilution: f64,
    pub working_volume: f64,
    pub samples: Vec<SamplePlan>,
}

pub fn load_dose_plan(
    path: &Path,
    config: &DoseResponseConfig,
    layout: &PlateLayout,
) -> Result<Vec<Group>, InputError> {
    let raw = fs::read_to_string(path)?;
    let plan: DosePlan = serde_json::from_str(&raw)?;
    if plan.groups.is_empty() {
        return Err(InputError::Plan("the plan defines no groups".to_string()));
    }

    let max_samples = layout.max_samples(DOSE_PARALLEL_CHOICES[0]);
    let mut groups = Vec::with_capacity(plan.groups.len());
    for (i, group_plan) in plan.groups.iter().enumerate() {
        let ordinal = i + 1;
        let analysis_type = if group_plan.is_filler {
            EXCLUDED_DATA_TYPE.to_string()
        } else {
            group_plan.analysis_type.clone()
        };
        if !config.allows(&analysis_type) {
            return Err(InputError::Plan(format!(
                "analysis type \"{analysis_type}\" of group {ordinal} was not found in the configuration"
            )));
        }
        check_samples(
            &group_plan.samples,
            &DOSE_PARALLEL_CHOICES,
            max_samples,
            &format!("group {ordinal}"),
        )?;
        if group_plan.dilution_factor == 0.0 {
            return Err(InputError::Plan(format!(
                "dilution factor of group {ordinal} must not be zero"
            )));
        }
        let mut group = Group::new(analysis_type, ordinal, group_plan.is_filler);
        group.set_dil_series(group_plan.initial_dilution, group_plan.dilution_factor);
        for sample in &group_plan.samples {
            group.add_sample(sample.label.clone(), sample.parallels);
        }
        groups.push(group);
    }
    Ok(groups)
}

pub fn load_endpoint_plan(
    path: &Path,
    config: &TissueConfig,
    layout: &PlateLayout,
) -> Result<Vec<Tissue>, InputError> {
    let raw = fs::read_to_string(path)?;
    let plan: EndpointPlan = serde_json::from_str(&raw)?;
    if plan.tissues.is_empty() {
        return Err(InputError::Plan("the plan defines no tissues".to_string()));
    }

    let max_samples = layout.max_samples(ENDPOINT_PARALLEL_CHOICES[0]);
    let mut tissues = Vec::with_capacity(plan.tissues.len());
    for (i, tissue_plan) in plan.tissues.iter().enumerate() {
        let ordinal = i + 1;
        if !config.allows(&tissue_plan.title) {
            return Err(InputError::Plan(format!(
                "tissue \"{}\" was not found in the configuration",
                tissue_plan.title
            )));
        }
        if tissue_plan.working_volume <= 0.0 {
            return Err(InputError::Plan(format!(
                "working volume of tissue \"{}\" must be positive",
                tissue_plan.title
            )));
        }
        check_samples(
            &tissue_plan.samples,
            &ENDPOINT_PARALLEL_CHOICES,
            max_samples,
            &format!("tissue \"{}\"", tissue_plan.title),
        )?;
        let mut tissue = Tissue::new(
            tissue_plan.title.clone(),
            ordinal,
            tissue_plan.dilution_rate,
            tissue_plan.first_dilution,
            tissue_plan.working_volume,
        );
        for sample in &tissue_plan.samples {
            tissue.add_sample(sample.label.clone(), sample.parallels);
        }
        tissues.push(tissue);
    }
    Ok(tissues)
}

fn check_samples(
    samples: &[SamplePlan],
    choices: &[usize],
    max_samples: usize,
    owner: &str,
) -> Result<(), InputError> {
    if samples.is_empty() {
        return Err(InputError::Plan(format!("{owner} defines no samples")));
    }
    if samples.len() > max_samples {
        return Err(InputError::Plan(format!(
            "{owner} defines {} samples but the plate holds at most {max_samples}",
            samples.len()
        )));
    }
    for sample in samples {
        if !choices.contains(&sample.parallels) {
            let allowed = choices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(InputError::Plan(format!(
                "sample \"{}\" of {owner} requests {} parallels. Choose either {allowed}",
                sample.label, sample.parallels
            )));
        }
    }
    Ok(())
}
