use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::model::titration::TitrationGroup;
use crate::stats::median;

/// Two-sided confidence level complement for the parameter intervals.
pub const ALPHA: f64 = 0.05;
/// Iteration cap of the optimizer, generous enough for noisy low-replicate
/// data.
pub const MAX_ITERATIONS: usize = 10_000;
/// Points on the smooth fitted curve returned for plotting.
pub const FIT_CURVE_POINTS: usize = 100;

const LN_10: f64 = std::f64::consts::LN_10;

#[derive(Debug, Clone, Copy)]
pub struct FitSettings {
    pub hill_slope_standard: f64,
    pub alpha: f64,
    pub max_iterations: usize,
}

impl FitSettings {
    pub fn new(hill_slope_standard: f64) -> Self {
        FitSettings {
            hill_slope_standard,
            alpha: ALPHA,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

/// Outcome of fitting one sample. Degenerate fits keep their parameter
/// estimates; undefined confidence bounds and overflowed results surface as
/// NaN or infinity rather than errors.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    pub params: [f64; 2],
    pub confidence_intervals: [(f64, f64); 2],
    pub result: f64,
    pub log_result: f64,
    pub hill_slope: f64,
    pub x_data: Vec<f64>,
    pub y_data: Vec<f64>,
    pub x_fit: Vec<f64>,
    pub y_fit: Vec<f64>,
}

/// The variable-slope (4PL) dose-response model with fixed 0/100 asymptotes.
pub fn variable_slope_model(x: f64, log_result: f64, hill_slope: f64) -> f64 {
    100.0 / (1.0 + 10f64.powf((log_result - x) * hill_slope))
}

/// Fits every sample of the group against its log-dilution series.
pub fn fit_group(group: &TitrationGroup, settings: &FitSettings) -> Vec<(String, FitResult)> {
    group
        .samples
        .iter()
        .map(|sample| {
            let x = &group.dils[..sample.values.len().min(group.dils.len())];
            (
                sample.label.clone(),
                fit_sample(x, &sample.values, settings),
            )
        })
        .collect()
}

pub fn fit_sample(x: &[f64], y: &[f64], settings: &FitSettings) -> FitResult {
    let initial = [median(x), settings.hill_slope_standard];
    let (params, jtj, ssr) = levenberg_marquardt(x, y, initial, settings.max_iterations);

    let covariance = covariance(jtj, ssr, x.len());
    let errors = [covariance[0][0].sqrt(), covariance[1][1].sqrt()];
    let dof = x.len().saturating_sub(2);
    let tval = t_critical(settings.alpha, dof);
    let confidence_intervals = [
        (params[0] - errors[0] * tval, params[0] + errors[0] * tval),
        (params[1] - errors[1] * tval, params[1] + errors[1] * tval),
    ];

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &v in x {
        x_min = x_min.min(v);
        x_max = x_max.max(v);
    }
    let x_fit = linspace(x_min, x_max, FIT_CURVE_POINTS);
    let y_fit = x_fit
        .iter()
        .map(|&v| variable_slope_model(v, params[0], params[1]))
        .collect();

    FitResult {
        params,
        confidence_intervals,
        // 10^c overflows to infinity for extreme estimates instead of
        // failing the sample.
        result: 10f64.powf(params[0]),
        log_result: params[0],
        hill_slope: params[1],
        x_data: x.to_vec(),
        y_data: y.to_vec(),
        x_fit,
        y_fit,
    }
}

/// Damped least squares on the two model parameters. Returns the parameter
/// estimates, the Gauss-Newton approximation of the Hessian at the solution,
/// and the residual sum of squares.
fn levenberg_marquardt(
    x: &[f64],
    y: &[f64],
    initial: [f64; 2],
    max_iterations: usize,
) -> ([f64; 2], [[f64; 2]; 2], f64) {
    let mut params = initial;
    let mut ssr = residual_sum(x, y, params);
    let mut lambda = 1e-3;

    for _ in 0..max_iterations {
        let (jtj, jtr) = normal_equations(x, y, params);
        let damped = [
            [jtj[0][0] * (1.0 + lambda), jtj[0][1]],
            [jtj[1][0], jtj[1][1] * (1.0 + lambda)],
        ];
        let Some(step) = solve2(damped, jtr) else {
            lambda *= 10.0;
            if lambda > 1e12 {
                break;
            }
            continue;
        };
        let candidate = [params[0] + step[0], params[1] + step[1]];
        let candidate_ssr = residual_sum(x, y, candidate);
        if candidate_ssr.is_finite() && candidate_ssr < ssr {
            let improvement = ssr - candidate_ssr;
            params = candidate;
            ssr = candidate_ssr;
            lambda = (lambda * 0.1).max(1e-12);
            if improvement <= 1e-12 * (1.0 + ssr) && step[0].abs() + step[1].abs() < 1e-10 {
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > 1e12 {
                break;
            }
        }
    }

    let (jtj, _) = normal_equations(x, y, params);
    (params, jtj, ssr)
}

fn residual_sum(x: &[f64], y: &[f64], params: [f64; 2]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - variable_slope_model(xi, params[0], params[1]);
            r * r
        })
        .sum()
}

/// Builds JᵀJ and Jᵀr with the analytic Jacobian of the model.
fn normal_equations(x: &[f64], y: &[f64], params: [f64; 2]) -> ([[f64; 2]; 2], [f64; 2]) {
    let [c, b] = params;
    let mut jtj = [[0.0; 2]; 2];
    let mut jtr = [0.0; 2];
    for (&xi, &yi) in x.iter().zip(y) {
        let t = 10f64.powf((c - xi) * b);
        // t / (1 + t)^2 written to stay finite as t approaches 0 or
        // infinity.
        let weight = 1.0 / ((1.0 + t) * (1.0 + 1.0 / t));
        let common = -100.0 * LN_10 * weight;
        let dc = common * b;
        let db = common * (c - xi);
        let residual = yi - 100.0 / (1.0 + t);
        jtj[0][0] += dc * dc;
        jtj[0][1] += dc * db;
        jtj[1][0] += dc * db;
        jtj[1][1] += db * db;
        jtr[0] += dc * residual;
        jtr[1] += db * residual;
    }
    (jtj, jtr)
}

fn solve2(a: [[f64; 2]; 2], rhs: [f64; 2]) -> Option<[f64; 2]> {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    if !det.is_finite() || det.abs() < 1e-300 {
        return None;
    }
    Some([
        (rhs[0] * a[1][1] - rhs[1] * a[0][1]) / det,
        (rhs[1] * a[0][0] - rhs[0] * a[1][0]) / det,
    ])
}

/// Parameter covariance from the fitted normal equations; NaN entries when
/// the system is singular or there are no degrees of freedom left.
fn covariance(jtj: [[f64; 2]; 2], ssr: f64, n_points: usize) -> [[f64; 2]; 2] {
    let dof = n_points.saturating_sub(2);
    if dof == 0 {
        return [[f64::NAN; 2]; 2];
    }
    let det = jtj[0][0] * jtj[1][1] - jtj[0][1] * jtj[1][0];
    if !det.is_finite() || det.abs() < 1e-300 {
        return [[f64::NAN; 2]; 2];
    }
    let s2 = ssr / dof as f64;
    [
        [jtj[1][1] / det * s2, -jtj[0][1] / det * s2],
        [-jtj[1][0] / det * s2, jtj[0][0] / det * s2],
    ]
}

fn t_critical(alpha: f64, dof: usize) -> f64 {
    if dof == 0 {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, dof as f64) {
        Ok(dist) => dist.inverse_cdf(1.0 - alpha / 2.0),
        Err(_) => f64::NAN,
    }
}

pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    if points == 1 {
        return vec![start];
    }
    let step = (end - start) / (points - 1) as f64;
    (0..points).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_fit.rs"]
mod tests;
