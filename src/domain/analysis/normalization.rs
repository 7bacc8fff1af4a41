//! Column-wise normalization of decision values.
//!
//! All four schemes are pure functions over a row-major `m x n` table. They
//! never mutate the input and always return finite values of the same shape.
//! Degenerate columns (zero range, zero sum, zero norm) get a fixed fallback
//! instead of a division by zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{McdmError, OptimizationType};
use crate::domain::matrix::Criterion;

/// Supported normalization schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMethod {
    /// Linear rescale onto [0, 1].
    #[serde(alias = "minmax")]
    Minimax,
    /// Share of the column total.
    Sum,
    /// Ratio to the column maximum.
    Max,
    /// Division by the column's Euclidean norm.
    Vector,
}

impl NormalizationMethod {
    pub const ALL: [NormalizationMethod; 4] = [
        NormalizationMethod::Minimax,
        NormalizationMethod::Sum,
        NormalizationMethod::Max,
        NormalizationMethod::Vector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationMethod::Minimax => "minimax",
            NormalizationMethod::Sum => "sum",
            NormalizationMethod::Max => "max",
            NormalizationMethod::Vector => "vector",
        }
    }

    /// Parses a scheme key. `minmax` is accepted as a spelling of `minimax`.
    ///
    /// # Errors
    ///
    /// Returns `McdmError::Normalization` naming the valid keys.
    pub fn parse(key: &str) -> Result<Self, McdmError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "minimax" | "minmax" => Ok(NormalizationMethod::Minimax),
            "sum" => Ok(NormalizationMethod::Sum),
            "max" => Ok(NormalizationMethod::Max),
            "vector" => Ok(NormalizationMethod::Vector),
            _ => Err(McdmError::normalization(
                key,
                format!(
                    "Unsupported normalization method (expected one of: {})",
                    Self::valid_keys().join(", ")
                ),
            )),
        }
    }

    /// Keys accepted by `parse`, canonical spellings only.
    pub fn valid_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.as_str()).collect()
    }
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationMethod {
    type Err = McdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalizes every column according to its criterion's direction.
pub fn normalize(
    values: &[Vec<f64>],
    criteria: &[Criterion],
    method: NormalizationMethod,
) -> Vec<Vec<f64>> {
    let directions: Vec<OptimizationType> =
        criteria.iter().map(|c| c.optimization_type()).collect();
    normalize_with_directions(values, &directions, method)
}

/// Normalizes every column with an explicit direction per column.
///
/// Passing `Maximize` for every column gives a direction-neutral rescale.
/// Columns without a matching direction are treated as benefit.
pub fn normalize_with_directions(
    values: &[Vec<f64>],
    directions: &[OptimizationType],
    method: NormalizationMethod,
) -> Vec<Vec<f64>> {
    let mut out: Vec<Vec<f64>> = values.to_vec();
    let n = values.first().map_or(0, |row| row.len());

    for j in 0..n {
        let column: Vec<f64> = values.iter().map(|row| row[j]).collect();
        let direction = directions
            .get(j)
            .copied()
            .unwrap_or(OptimizationType::Maximize);

        let normalized = match method {
            NormalizationMethod::Minimax => minimax_column(&column, direction),
            NormalizationMethod::Sum => sum_column(&column, direction),
            NormalizationMethod::Max => max_column(&column, direction),
            NormalizationMethod::Vector => vector_column(&column, direction),
        };

        for (row, v) in out.iter_mut().zip(normalized) {
            row[j] = v;
        }
    }

    out
}

/// Values on which higher is better in every column.
///
/// With a method, columns are normalized by direction (every scheme orients
/// cost columns). Without one, raw cost columns are negated.
pub fn orient_values(
    values: &[Vec<f64>],
    criteria: &[Criterion],
    method: Option<NormalizationMethod>,
) -> Vec<Vec<f64>> {
    match method {
        Some(method) => normalize(values, criteria, method),
        None => values
            .iter()
            .map(|row| {
                row.iter()
                    .zip(criteria)
                    .map(|(v, c)| if c.is_cost() { -v } else { *v })
                    .collect()
            })
            .collect(),
    }
}

fn column_bounds(column: &[f64]) -> (f64, f64) {
    column.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
        (lo.min(x), hi.max(x))
    })
}

/// Largest magnitude in the column, or 1 for an all-zero column.
///
/// Dividing by it keeps ranges, totals and norms representable when the
/// values sit near the limits of `f64`.
fn column_scale(column: &[f64]) -> f64 {
    let scale = column.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        1.0
    }
}

fn minimax_column(column: &[f64], direction: OptimizationType) -> Vec<f64> {
    let (min, max) = column_bounds(column);

    if max - min == 0.0 {
        let fill = if direction.is_benefit() { 1.0 } else { 0.0 };
        return vec![fill; column.len()];
    }

    // max - min overflows for finite values of opposite sign near the limits.
    let scale = if (max - min).is_finite() { 1.0 } else { column_scale(column) };
    let (lo, hi) = (min / scale, max / scale);
    let range = hi - lo;

    column
        .iter()
        .map(|x| {
            let v = x / scale;
            match direction {
                OptimizationType::Maximize => (v - lo) / range,
                OptimizationType::Minimize => (hi - v) / range,
            }
        })
        .collect()
}

/// Each value as a share of the column total, `None` when the total is 0.
fn shares(values: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return None;
    }
    if total.is_finite() {
        return Some(values.iter().map(|x| x / total).collect());
    }

    let scale = column_scale(values);
    let scaled: Vec<f64> = values.iter().map(|x| x / scale).collect();
    let total: f64 = scaled.iter().sum();
    if total == 0.0 {
        None
    } else {
        Some(scaled.iter().map(|x| x / total).collect())
    }
}

fn sum_column(column: &[f64], direction: OptimizationType) -> Vec<f64> {
    match direction {
        OptimizationType::Maximize => shares(column).unwrap_or_else(|| {
            let m = column.len() as f64;
            vec![1.0 / m; column.len()]
        }),
        OptimizationType::Minimize => {
            let inverted: Vec<f64> = column
                .iter()
                .map(|&x| if x != 0.0 { 1.0 / x } else { 0.0 })
                .collect();
            shares(&inverted).unwrap_or_else(|| vec![0.0; column.len()])
        }
    }
}

fn max_column(column: &[f64], direction: OptimizationType) -> Vec<f64> {
    match direction {
        OptimizationType::Maximize => {
            let (_, max) = column_bounds(column);
            if max == 0.0 {
                vec![0.0; column.len()]
            } else {
                column.iter().map(|x| x / max).collect()
            }
        }
        OptimizationType::Minimize => {
            let min_nonzero = column
                .iter()
                .copied()
                .filter(|&x| x != 0.0)
                .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.min(x))));

            match min_nonzero {
                Some(min) => column
                    .iter()
                    .map(|&x| if x != 0.0 { min / x } else { 0.0 })
                    .collect(),
                None => vec![0.0; column.len()],
            }
        }
    }
}

fn vector_column(column: &[f64], direction: OptimizationType) -> Vec<f64> {
    // Squares are taken on scaled values so huge entries do not overflow
    // and tiny ones do not vanish.
    let scale = column_scale(column);
    let scaled: Vec<f64> = column.iter().map(|x| x / scale).collect();
    let norm = scaled.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return vec![0.0; column.len()];
    }

    let sign = if direction.is_cost() { -1.0 } else { 1.0 };
    scaled.iter().map(|x| sign * x / norm).collect()
}
