use crate::report::{
    DoseResponseReport, EndpointReport, ExtractReport, FitReport, format_f64_6,
};

fn opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format_f64_6(v),
        None => "None".to_string(),
    }
}

pub fn render_dose_response_text(report: &DoseResponseReport) -> String {
    let mut out = String::new();
    out.push_str("Dose-Response Extraction Report\n");
    out.push_str("===============================\n\n");
    out.push_str(&format!("Input: {}\n", report.run.input_file));
    out.push_str(&format!("Sheet: {}\n\n", report.run.sheet));

    out.push_str("Wellplate controls\n");
    out.push_str(&format!(
        "Negative control avg: {}\n",
        opt(report.plate.full.neg_ctrl_avg)
    ));
    out.push_str(&format!(
        "Viral control avg: {}\n\n",
        opt(report.plate.full.vir_ctrl_avg)
    ));

    for group in &report.groups {
        if group.is_filler {
            out.push_str(&format!("Excluded dataset {} (not analyzed)\n\n", group.ordinal));
            continue;
        }
        out.push_str(&format!(
            "Group {} ({})\n",
            group.ordinal, group.analysis_type
        ));
        if let Some(stats) = &group.statistics {
            out.push_str(&format!(
                "Negative control avg: {}, stdev: {}\n",
                opt(stats.neg_ctrl_avg),
                format_f64_6(stats.neg_ctrl_stdev)
            ));
            out.push_str(&format!(
                "Viral control avg: {}, stdev: {}\n",
                opt(stats.vir_ctrl_avg),
                format_f64_6(stats.vir_ctrl_stdev)
            ));
        }
        if let Some(normalized) = &group.normalized {
            for sample in &normalized.samples {
                out.push_str(&format!(
                    "Sample \"{}\" normalized averages: {}\n",
                    sample.label,
                    join_values(&sample.normalized_avgs)
                ));
            }
        }
        out.push('\n');
    }

    if let Some(comparisons) = &report.comparisons {
        out.push_str("Group comparisons\n");
        if let Some(p) = comparisons.kruskal_wallis_p {
            out.push_str(&format!("Kruskal-Wallis p: {}\n", format_f64_6(p)));
        }
        for pair in &comparisons.pairwise {
            out.push_str(&format!(
                "{} vs {}: p = {} ({})\n",
                pair.group_a,
                pair.group_b,
                format_f64_6(pair.p_value),
                pair.symbol
            ));
        }
    }
    out
}

pub fn render_endpoint_text(report: &EndpointReport) -> String {
    let mut out = String::new();
    out.push_str("Endpoint-Dilution Report\n");
    out.push_str("========================\n\n");
    out.push_str(&format!("Input: {}\n", report.run.input_file));
    out.push_str(&format!("Sheet: {}\n\n", report.run.sheet));

    for tissue in &report.tissues {
        out.push_str(&format!("Tissue \"{}{}\"\n", tissue.title, tissue.ordinal));
        for sample in &tissue.samples {
            out.push_str(&format!(
                "Tube \"{}\": control avg {}, TCID50 {}, PFU {}, EPD {}\n",
                sample.tube_label,
                format_f64_6(sample.control_avg),
                format_f64_6(sample.calc.tcid),
                format_f64_6(sample.calc.pfu),
                sample.epd
            ));
        }
        out.push('\n');
    }
    out
}

pub fn render_extract_text(report: &ExtractReport) -> String {
    let mut out = String::new();
    out.push_str("Wellplate Extraction Report\n");
    out.push_str("===========================\n\n");
    out.push_str(&format!("Input: {}\n", report.run.input_file));
    out.push_str(&format!("Sheet: {}\n\n", report.run.sheet));
    for plate in &report.plates {
        out.push_str(&format!(
            "Wellplate {} extracted from rows {}-{}, columns {}-{}\n",
            plate.ordinal, plate.start.0, plate.end.0, plate.start.1, plate.end.1
        ));
    }
    out
}

pub fn render_fit_text(report: &FitReport) -> String {
    let mut out = String::new();
    out.push_str("4PL Analysis Report\n");
    out.push_str("===================\n\n");
    out.push_str(&format!("Input: {}\n", report.run.input_file));
    out.push_str(&format!("Sheet: {}\n", report.run.sheet));
    out.push_str(&format!("Analysis type: {}\n\n", report.analysis_type));

    for group in &report.groups {
        out.push_str(&format!("{}\n", group.title));
        for sample in &group.samples {
            out.push_str(&format!(
                "Sample \"{}\": result {}, log result {}, hill slope {}\n",
                sample.label,
                format_f64_6(sample.fit.result),
                format_f64_6(sample.fit.log_result),
                format_f64_6(sample.fit.hill_slope)
            ));
        }
        out.push('\n');
    }
    out
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}
