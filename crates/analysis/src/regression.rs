//! Simple least-squares regression of one column on another.

use crate::error::{AnalysisError, Result};
use crate::numeric::{mean, numeric_column, sample_variance};
use cellgrid_sheet::Table;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashMap;

const MIN_POINTS: usize = 2;
// Keeps the t statistic finite when |r| == 1.
const TINY: f64 = 1.0e-20;

/// Summary of the fit residuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    pub mean: f64,
    pub std: f64,
}

/// Fitted line `y = slope * x + intercept` and its diagnostics.
///
/// `p_value` is two-sided for the null hypothesis of zero slope and
/// `std_err` is the standard error of the slope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub x_column: usize,
    pub y_column: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub std_err: f64,
    pub equation: String,
    pub n: usize,
    pub residuals: Residuals,
}

fn column_or_err(table: &Table, column: usize) -> Result<Vec<(usize, f64)>> {
    numeric_column(table, column).ok_or(AnalysisError::ColumnOutOfRange {
        column,
        columns: table.col_count(),
    })
}

/// Regress `y_column` on `x_column` over rows where both are numeric.
pub fn linear_regression(table: &Table, x_column: usize, y_column: usize) -> Result<RegressionResult> {
    let xs = column_or_err(table, x_column)?;
    let ys: HashMap<usize, f64> = column_or_err(table, y_column)?.into_iter().collect();

    let (x, y): (Vec<f64>, Vec<f64>) = xs
        .into_iter()
        .filter_map(|(row, xv)| ys.get(&row).map(|&yv| (xv, yv)))
        .unzip();

    if x.len() < MIN_POINTS {
        return Err(AnalysisError::InsufficientData {
            found: x.len(),
            required: MIN_POINTS,
        });
    }

    let n = x.len();
    let x_mean = mean(&x);
    let y_mean = mean(&y);

    // Population moments, matching the usual linregress formulation
    let (mut ssxm, mut ssym, mut ssxym) = (0.0, 0.0, 0.0);
    for (xv, yv) in x.iter().zip(&y) {
        let dx = xv - x_mean;
        let dy = yv - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }
    let count = n as f64;
    ssxm /= count;
    ssym /= count;
    ssxym /= count;

    if ssxm == 0.0 {
        return Err(AnalysisError::ConstantPredictor);
    }

    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;

    let (p_value, std_err) = if n == MIN_POINTS {
        // Two points always fit exactly
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0)
    } else {
        let df = (n - 2) as f64;
        let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
        let p = StudentsT::new(0.0, 1.0, df)
            .map(|dist| 2.0 * dist.sf(t.abs()))
            .unwrap_or(f64::NAN);
        let se = ((1.0 - r * r) * ssym / ssxm / df).sqrt();
        (p, se)
    };

    let residuals: Vec<f64> = x
        .iter()
        .zip(&y)
        .map(|(xv, yv)| yv - (slope * xv + intercept))
        .collect();

    tracing::debug!(x_column, y_column, n, slope, intercept, "Fitted regression");

    Ok(RegressionResult {
        x_column,
        y_column,
        slope,
        intercept,
        r_value: r,
        r_squared: r * r,
        p_value,
        std_err,
        equation: format!("y = {slope:.4}x + {intercept:.4}"),
        n,
        residuals: Residuals {
            mean: mean(&residuals),
            std: sample_variance(&residuals).map_or(0.0, f64::sqrt),
        },
    })
}
