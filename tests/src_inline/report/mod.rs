use super::*;

#[test]
fn test_write_reports_creates_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("results");
    let report = GroupStatistics {
        neg_ctrl_avg: Some(1.5),
        neg_ctrl_avg_half: Some(0.75),
        vir_ctrl_avg: None,
        neg_ctrl_stdev: 0.1,
        vir_ctrl_stdev: 0.0,
    };
    write_reports(&out_dir, &report, "summary line\n").unwrap();

    let raw = fs::read_to_string(out_dir.join(RESULTS_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["neg_ctrl_avg"], 1.5);
    // Undefined statistics serialize as null.
    assert!(value["vir_ctrl_avg"].is_null());
    assert_eq!(
        fs::read_to_string(out_dir.join(SUMMARY_FILE)).unwrap(),
        "summary line\n"
    );
}

#[test]
fn test_nan_confidence_bounds_serialize_as_null() {
    let fit = crate::pipeline::stage5_fit::FitResult {
        params: [0.5, -2.0],
        confidence_intervals: [(f64::NAN, f64::NAN), (-3.0, -1.0)],
        result: 10f64.powf(0.5),
        log_result: 0.5,
        hill_slope: -2.0,
        x_data: vec![0.0],
        y_data: vec![50.0],
        x_fit: vec![0.0],
        y_fit: vec![50.0],
    };
    let value = serde_json::to_value(&fit).unwrap();
    assert!(value["confidence_intervals"][0][0].is_null());
    assert_eq!(value["confidence_intervals"][1][1], -1.0);
}

#[test]
fn test_format_f64_6() {
    assert_eq!(format_f64_6(1.0), "1.000000");
    assert_eq!(format_f64_6(0.1234567), "0.123457");
}
