mod input;
mod model;
mod pipeline;
mod report;
mod stats;
mod trace;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::input::{InputError, config, plan, workbook};
use crate::model::address::PlateLayout;
use crate::pipeline::ExtractError;
use crate::pipeline::stage1_locate::{self, DEFAULT_MIN_VALID_ROWS};
use crate::pipeline::{
    stage2_extract, stage3_integrate, stage4_stats, stage5_fit, stage6_compare,
};
use crate::report::{
    DoseGroupReport, DoseResponseReport, EndpointReport, EndpointTissueReport, ExtractReport,
    FitGroupReport, FitReport, FitSampleReport, PlateReport, RunInfo, text, write_reports,
};

#[derive(Debug, Parser)]
#[command(
    name = "titerplate",
    version,
    about = "Deterministic CLI for microtiter-plate absorbance extraction, endpoint-dilution analysis and 4PL dose-response fitting from spreadsheet data files."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract a 384-well dose-response plate and compute group statistics.
    Dora(DoraArgs),
    /// Extract a 384-well endpoint-dilution plate and compute TCID50/EPD.
    Epd(EpdArgs),
    /// Extract unlabeled 96-well plates from a sheet.
    Extract(ExtractArgs),
    /// Fit the 4PL model to group blocks found on a sheet.
    Fit(FitArgs),
}

#[derive(Debug, Args)]
struct SheetArgs {
    /// Path to the .xls or .xlsx data file.
    #[arg(long)]
    input: PathBuf,
    /// Data sheet name; the first sheet when omitted.
    #[arg(long)]
    sheet: Option<String>,
    /// Directory the reports are written into.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct DoraArgs {
    #[command(flatten)]
    sheet: SheetArgs,
    /// Group definitions (JSON).
    #[arg(long)]
    plan: PathBuf,
    /// Analysis type configuration (JSON).
    #[arg(long)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct EpdArgs {
    #[command(flatten)]
    sheet: SheetArgs,
    /// Tissue definitions (JSON).
    #[arg(long)]
    plan: PathBuf,
    /// Tissue configuration (JSON).
    #[arg(long)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    #[command(flatten)]
    sheet: SheetArgs,
    /// Minimum fully numeric rows required to accept a wellplate.
    #[arg(long, default_value_t = DEFAULT_MIN_VALID_ROWS)]
    min_rows: usize,
}

#[derive(Debug, Args)]
struct FitArgs {
    #[command(flatten)]
    sheet: SheetArgs,
    /// Analysis type to fit, as named in the configuration.
    #[arg(long = "type")]
    analysis_type: String,
    /// Analysis type configuration (JSON).
    #[arg(long)]
    config: PathBuf,
    /// Hill slope standard override for custom analysis types.
    #[arg(long, allow_hyphen_values = true)]
    hill_slope: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("failed to write reports: {0}")]
    Report(#[from] std::io::Error),
}

fn main() {
    trace::init();
    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    match Cli::parse().command {
        Command::Dora(args) => run_dora(&args),
        Command::Epd(args) => run_epd(&args),
        Command::Extract(args) => run_extract(&args),
        Command::Fit(args) => run_fit(&args),
    }
}

fn run_dora(args: &DoraArgs) -> Result<(), AppError> {
    let layout = PlateLayout::plate_384();
    let cfg = config::load_dose_config(&args.config)?;
    let mut groups = plan::load_dose_plan(&args.plan, &cfg, &layout)?;
    let grid = workbook::load_sheet(&args.sheet.input, args.sheet.sheet.as_deref())?;

    let anchor = stage1_locate::find_plate_anchor(&grid, &layout, 1).ok_or_else(|| {
        ExtractError::PlateNotFound {
            sheet: grid.name.clone(),
        }
    })?;
    info!("wellplate located at anchor ({}, {})", anchor.row, anchor.col);

    let plate = stage2_extract::extract_plate(&grid, &layout, anchor)?;
    stage2_extract::check_required_wells(&plate, stage2_extract::required_wells_for_groups(&groups))?;
    stage3_integrate::integrate_groups(&plate, &mut groups)?;

    let plate_stats = stage4_stats::plate_statistics(&plate);
    let mut group_reports = Vec::with_capacity(groups.len());
    let mut comparison_input = Vec::new();
    for group in &groups {
        if group.is_filler {
            group_reports.push(DoseGroupReport {
                ordinal: group.ordinal,
                analysis_type: group.analysis_type.clone(),
                is_filler: true,
                statistics: None,
                normalized: None,
            });
            continue;
        }
        let statistics = stage4_stats::group_statistics(group);
        let normalized = stage4_stats::normalize_group(group)?;
        let values: Vec<f64> = normalized
            .samples
            .iter()
            .flat_map(|s| s.normalized_avgs.iter().copied())
            .collect();
        comparison_input.push((format!("Group {}", group.ordinal), values));
        group_reports.push(DoseGroupReport {
            ordinal: group.ordinal,
            analysis_type: group.analysis_type.clone(),
            is_filler: false,
            statistics: Some(statistics),
            normalized: Some(normalized),
        });
    }
    let comparisons =
        (comparison_input.len() >= 2).then(|| stage6_compare::compare_groups(&comparison_input));

    let report = DoseResponseReport {
        run: run_info(&args.sheet.input, &grid.name),
        plate: plate_stats,
        groups: group_reports,
        comparisons,
    };
    let summary = text::render_dose_response_text(&report);
    write_reports(&args.sheet.out, &report, &summary)?;
    info!("reports written to {}", args.sheet.out.display());
    Ok(())
}

fn run_epd(args: &EpdArgs) -> Result<(), AppError> {
    let layout = PlateLayout::plate_384();
    let cfg = config::load_tissue_config(&args.config)?;
    let mut tissues = plan::load_endpoint_plan(&args.plan, &cfg, &layout)?;
    let grid = workbook::load_sheet(&args.sheet.input, args.sheet.sheet.as_deref())?;

    let anchor = stage1_locate::find_plate_anchor(&grid, &layout, 1).ok_or_else(|| {
        ExtractError::PlateNotFound {
            sheet: grid.name.clone(),
        }
    })?;
    info!("wellplate located at anchor ({}, {})", anchor.row, anchor.col);

    let plate = stage2_extract::extract_plate(&grid, &layout, anchor)?;
    stage2_extract::check_required_wells(
        &plate,
        stage2_extract::required_wells_for_tissues(&tissues),
    )?;
    stage3_integrate::integrate_tissues(&plate, &mut tissues)?;

    let tissue_reports = tissues
        .iter()
        .map(|tissue| EndpointTissueReport {
            title: tissue.title.clone(),
            ordinal: tissue.ordinal,
            dilution_rate: tissue.dil_rate,
            first_dilution: tissue.first_dil,
            working_volume: tissue.working_vol,
            samples: stage4_stats::endpoint_results(tissue),
        })
        .collect();

    let report = EndpointReport {
        run: run_info(&args.sheet.input, &grid.name),
        tissues: tissue_reports,
    };
    let summary = text::render_endpoint_text(&report);
    write_reports(&args.sheet.out, &report, &summary)?;
    info!("reports written to {}", args.sheet.out.display());
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<(), AppError> {
    let layout = PlateLayout::plate_96();
    let grid = workbook::load_sheet(&args.sheet.input, args.sheet.sheet.as_deref())?;

    let mut plates = Vec::new();
    let mut next_row = 1;
    while let Some(dense) = stage1_locate::find_dense_plate(&grid, &layout, next_row, args.min_rows)
    {
        let ordinal = plates.len() + 1;
        let plate = stage2_extract::extract_dense_plate(&grid, &layout, &dense);
        info!(
            "wellplate {ordinal} extracted from rows {}-{}",
            dense.start.0, dense.end.0
        );
        plates.push(plate_report(ordinal, &dense, &plate, &layout));
        next_row = dense.next_row;
    }
    if plates.is_empty() {
        return Err(ExtractError::PlateNotFound {
            sheet: grid.name.clone(),
        }
        .into());
    }

    let report = ExtractReport {
        run: run_info(&args.sheet.input, &grid.name),
        plates,
    };
    let summary = text::render_extract_text(&report);
    write_reports(&args.sheet.out, &report, &summary)?;
    info!("reports written to {}", args.sheet.out.display());
    Ok(())
}

fn run_fit(args: &FitArgs) -> Result<(), AppError> {
    let cfg = config::load_fit_config(&args.config)?;
    let hill_slope_standard = match args.hill_slope {
        Some(slope) => slope,
        None => cfg
            .hill_slope_standard(&args.analysis_type)
            .ok_or_else(|| {
                InputError::Config(format!(
                    "set analysis type \"{}\" was not found in the configuration",
                    args.analysis_type
                ))
            })?,
    };
    let settings = stage5_fit::FitSettings::new(hill_slope_standard);
    let grid = workbook::load_sheet(&args.sheet.input, args.sheet.sheet.as_deref())?;

    let mut groups = Vec::new();
    let mut next_row = 1;
    while let Some(anchor) = stage1_locate::find_group_block(&grid, next_row) {
        let group = stage2_extract::extract_titration_group(&grid, &anchor)?;
        info!(
            "{} extracted with {} samples",
            group.title,
            group.samples.len()
        );
        next_row = anchor.next_row;
        groups.push(group);
    }
    if groups.is_empty() {
        return Err(ExtractError::GroupBlockNotFound {
            sheet: grid.name.clone(),
        }
        .into());
    }

    let group_reports = groups
        .iter()
        .map(|group| FitGroupReport {
            title: group.title.clone(),
            samples: stage5_fit::fit_group(group, &settings)
                .into_iter()
                .map(|(label, fit)| FitSampleReport { label, fit })
                .collect(),
        })
        .collect();

    let report = FitReport {
        run: run_info(&args.sheet.input, &grid.name),
        analysis_type: args.analysis_type.clone(),
        groups: group_reports,
    };
    let summary = text::render_fit_text(&report);
    write_reports(&args.sheet.out, &report, &summary)?;
    info!("reports written to {}", args.sheet.out.display());
    Ok(())
}

fn run_info(input: &Path, sheet: &str) -> RunInfo {
    RunInfo::new(input.display().to_string(), sheet)
}

fn plate_report(
    ordinal: usize,
    dense: &stage1_locate::DensePlate,
    plate: &model::plate::PlateData,
    layout: &PlateLayout,
) -> PlateReport {
    let mut rows = Vec::new();
    let row_count = dense.end.0 - dense.start.0 + 1;
    for i in 0..row_count {
        let row_char = (b'A' + i as u8) as char;
        let values = (1..=layout.cols)
            .map(|col| {
                plate
                    .get(model::address::WellAddress::new(row_char, col))
                    .flatten()
            })
            .collect();
        rows.push((row_char.to_string(), values));
    }
    PlateReport {
        ordinal,
        start: dense.start,
        end: dense.end,
        rows,
    }
}
