use super::*;

use std::fs;

use crate::input::config::{EXCLUDED_DATA_TYPE, load_dose_config, load_fit_config, load_tissue_config};
use crate::input::plan::{load_dose_plan, load_endpoint_plan};
use crate::model::address::PlateLayout;

#[test]
fn test_grid_reads_one_based_and_out_of_range_as_empty() {
    let grid = SheetGrid::from_rows(
        "Sheet1",
        vec![
            vec![CellValue::Number(1.5), CellValue::Text("x".to_string())],
            vec![CellValue::Empty],
        ],
    );
    assert_eq!(grid.max_row(), 2);
    assert_eq!(grid.max_col(), 2);
    assert_eq!(grid.value(1, 1).as_number(), Some(1.5));
    assert_eq!(grid.value(1, 2).as_text(), Some("x"));
    assert!(grid.value(2, 2).is_empty());
    assert!(grid.value(0, 1).is_empty());
    assert!(grid.value(99, 99).is_empty());
}

#[test]
fn test_cell_value_display() {
    assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
    assert_eq!(CellValue::Text("ab".to_string()).to_string(), "ab");
    assert_eq!(CellValue::Empty.to_string(), "");
}

#[test]
fn test_load_fit_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("4PL_config.json");
    fs::write(&path, r#"{"analysis_types": {"IC50": -1.0, "ND50": -1.5}}"#).unwrap();
    let config = load_fit_config(&path).unwrap();
    assert_eq!(config.hill_slope_standard("IC50"), Some(-1.0));
    assert_eq!(config.hill_slope_standard("missing"), None);
}

#[test]
fn test_load_fit_config_rejects_empty_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("4PL_config.json");
    fs::write(&path, r#"{"analysis_types": {}}"#).unwrap();
    assert!(matches!(
        load_fit_config(&path),
        Err(InputError::Config(_))
    ));
}

#[test]
fn test_load_dose_plan() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("DORA_config.json");
    fs::write(&config_path, r#"{"analysis_types": ["DORA"]}"#).unwrap();
    let config = load_dose_config(&config_path).unwrap();

    let plan_path = dir.path().join("plan.json");
    fs::write(
        &plan_path,
        r#"{
            "groups": [
                {
                    "analysis_type": "DORA",
                    "initial_dilution": 40.0,
                    "dilution_factor": 2.0,
                    "samples": [
                        {"label": "S1", "parallels": 4},
                        {"label": "S2", "parallels": 4}
                    ]
                },
                {
                    "analysis_type": "ignored",
                    "is_filler": true,
                    "initial_dilution": 1.0,
                    "dilution_factor": 2.0,
                    "samples": [{"label": "rest", "parallels": 8}]
                }
            ]
        }"#,
    )
    .unwrap();

    let groups = load_dose_plan(&plan_path, &config, &PlateLayout::plate_384()).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].ordinal, 1);
    assert_eq!(groups[0].dil_series.len(), 9);
    assert_eq!(groups[0].samples[0].parallels.len(), 4);
    // Filler groups take the excluded-data type regardless of the plan.
    assert!(groups[1].is_filler);
    assert_eq!(groups[1].analysis_type, EXCLUDED_DATA_TYPE);
}

#[test]
fn test_load_dose_plan_rejects_bad_parallel_count() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("DORA_config.json");
    fs::write(&config_path, r#"{"analysis_types": ["DORA"]}"#).unwrap();
    let config = load_dose_config(&config_path).unwrap();

    let plan_path = dir.path().join("plan.json");
    fs::write(
        &plan_path,
        r#"{"groups": [{"analysis_type": "DORA", "initial_dilution": 1.0, "dilution_factor": 2.0,
            "samples": [{"label": "S1", "parallels": 3}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_dose_plan(&plan_path, &config, &PlateLayout::plate_384()),
        Err(InputError::Plan(_))
    ));
}

#[test]
fn test_load_dose_plan_rejects_unknown_analysis_type() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("DORA_config.json");
    fs::write(&config_path, r#"{"analysis_types": ["DORA"]}"#).unwrap();
    let config = load_dose_config(&config_path).unwrap();

    let plan_path = dir.path().join("plan.json");
    fs::write(
        &plan_path,
        r#"{"groups": [{"analysis_type": "EPD", "initial_dilution": 1.0, "dilution_factor": 2.0,
            "samples": [{"label": "S1", "parallels": 4}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_dose_plan(&plan_path, &config, &PlateLayout::plate_384()),
        Err(InputError::Plan(_))
    ));
}

#[test]
fn test_load_endpoint_plan() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("EPD_config.json");
    fs::write(&config_path, r#"{"tissues": ["VERO"]}"#).unwrap();
    let config = load_tissue_config(&config_path).unwrap();

    let plan_path = dir.path().join("plan.json");
    fs::write(
        &plan_path,
        r#"{"tissues": [{"title": "VERO", "dilution_rate": 10.0, "first_dilution": 1.0,
            "working_volume": 2.0, "samples": [{"label": "T1", "parallels": 4}]}]}"#,
    )
    .unwrap();
    let tissues = load_endpoint_plan(&plan_path, &config, &PlateLayout::plate_384()).unwrap();
    assert_eq!(tissues.len(), 1);
    assert_eq!(tissues[0].title, "VERO");
    assert_eq!(tissues[0].samples[0].parallels.len(), 4);
}

#[test]
fn test_load_endpoint_plan_rejects_dose_parallel_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("EPD_config.json");
    fs::write(&config_path, r#"{"tissues": ["VERO"]}"#).unwrap();
    let config = load_tissue_config(&config_path).unwrap();

    let plan_path = dir.path().join("plan.json");
    // One parallel is allowed for dose-response runs but not here.
    fs::write(
        &plan_path,
        r#"{"tissues": [{"title": "VERO", "dilution_rate": 10.0, "first_dilution": 1.0,
            "working_volume": 2.0, "samples": [{"label": "T1", "parallels": 1}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_endpoint_plan(&plan_path, &config, &PlateLayout::plate_384()),
        Err(InputError::Plan(_))
    ));
}

#[test]
fn test_load_endpoint_plan_rejects_unknown_tissue() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("EPD_config.json");
    fs::write(&config_path, r#"{"tissues": ["VERO"]}"#).unwrap();
    let config = load_tissue_config(&config_path).unwrap();

    let plan_path = dir.path().join("plan.json");
    fs::write(
        &plan_path,
        r#"{"tissues": [{"title": "HELA", "dilution_rate": 10.0, "first_dilution": 1.0,
            "working_volume": 2.0, "samples": [{"label": "T1", "parallels": 4}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_endpoint_plan(&plan_path, &config, &PlateLayout::plate_384()),
        Err(InputError::Plan(_))
    ));
}
