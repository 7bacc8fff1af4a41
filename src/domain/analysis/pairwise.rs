//! Priority vectors and consistency for reciprocal comparison matrices.
//!
//! A positive reciprocal matrix has a unique positive dominant eigenvector
//! (Perron), so plain power iteration finds it without a general eigen-solver.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Saaty's random consistency index for matrix orders 1 through 15.
pub const RANDOM_INDEX: [f64; 15] = [
    0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.59,
];

/// Random index for orders past the table.
pub const RANDOM_INDEX_BEYOND_TABLE: f64 = 1.59;

/// Random consistency index for a matrix of order `n`.
pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        n if n <= RANDOM_INDEX.len() => RANDOM_INDEX[n - 1],
        _ => RANDOM_INDEX_BEYOND_TABLE,
    }
}

/// How a priority vector is derived from a comparison matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightDerivation {
    /// Principal eigenvector by power iteration.
    Eigenvector,
    /// Normalized geometric means of the rows.
    GeometricMean,
}

impl WeightDerivation {
    pub const KEYS: [&'static str; 3] = ["eigenvector", "geometric_mean", "approximate"];

    /// Parses a key; `approximate` is accepted for the geometric mean.
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "eigenvector" => Some(WeightDerivation::Eigenvector),
            "geometric_mean" | "approximate" => Some(WeightDerivation::GeometricMean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightDerivation::Eigenvector => "eigenvector",
            WeightDerivation::GeometricMean => "geometric_mean",
        }
    }
}

/// Why a comparison matrix could not be turned into priorities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairwiseError {
    #[error("Comparison matrix must be {expected}x{expected}, got {rows}x{cols}")]
    WrongShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Comparison matrix entry ({row}, {col}) must be positive and finite, got {value}")]
    NonPositiveEntry { row: usize, col: usize, value: f64 },

    #[error("Power iteration did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// Consistency figures for one comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub consistency_index: f64,
    pub consistency_ratio: f64,
    pub is_consistent: bool,
    pub max_eigenvalue: f64,
    pub method: String,
}

impl ConsistencyReport {
    /// Report for priorities that were not derived from judgments
    /// (`weights_derived`, `uniform_values`).
    pub fn perfect(order: usize, method: impl Into<String>) -> Self {
        Self {
            consistency_index: 0.0,
            consistency_ratio: 0.0,
            is_consistent: true,
            max_eigenvalue: order as f64,
            method: method.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Priority vector (sums to 1) with its consistency figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Priorities {
    pub weights: Vec<f64>,
    pub consistency: ConsistencyReport,
}

/// Convergence settings for power iteration.
#[derive(Debug, Clone, Copy)]
pub struct PowerIterationConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PowerIterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-12,
        }
    }
}

/// Stateless calculator over reciprocal comparison matrices.
pub struct PairwiseComparison;

impl PairwiseComparison {
    /// Derives priorities and checks consistency against `threshold`.
    pub fn priorities(
        matrix: &[Vec<f64>],
        order: usize,
        derivation: WeightDerivation,
        threshold: f64,
    ) -> Result<Priorities, PairwiseError> {
        Self::check(matrix, order)?;

        let weights = match derivation {
            WeightDerivation::Eigenvector => {
                Self::principal_eigenvector(matrix, PowerIterationConfig::default())?
            }
            WeightDerivation::GeometricMean => Self::geometric_mean(matrix),
        };

        let max_eigenvalue = Self::max_eigenvalue(matrix, &weights);
        let consistency_index = if order > 1 {
            (max_eigenvalue - order as f64) / (order as f64 - 1.0)
        } else {
            0.0
        };
        let ri = random_index(order);
        let consistency_ratio = if ri > 0.0 { consistency_index / ri } else { 0.0 };

        Ok(Priorities {
            weights,
            consistency: ConsistencyReport {
                consistency_index,
                consistency_ratio,
                is_consistent: consistency_ratio <= threshold,
                max_eigenvalue,
                method: derivation.as_str().to_string(),
            },
        })
    }

    /// Rejects non-square matrices and non-positive or non-finite entries.
    pub fn check(matrix: &[Vec<f64>], order: usize) -> Result<(), PairwiseError> {
        let cols = matrix.first().map_or(0, Vec::len);
        if matrix.len() != order || matrix.iter().any(|row| row.len() != order) {
            return Err(PairwiseError::WrongShape {
                expected: order,
                rows: matrix.len(),
                cols,
            });
        }

        for (row, values) in matrix.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(PairwiseError::NonPositiveEntry { row, col, value });
                }
            }
        }
        Ok(())
    }

    /// Dominant eigenvector normalized to sum 1.
    pub fn principal_eigenvector(
        matrix: &[Vec<f64>],
        config: PowerIterationConfig,
    ) -> Result<Vec<f64>, PairwiseError> {
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut w = vec![1.0 / n as f64; n];
        let mut next = vec![0.0; n];

        for _ in 0..config.max_iterations {
            for (i, row) in matrix.iter().enumerate() {
                next[i] = row.iter().zip(&w).map(|(a, x)| a * x).sum();
            }

            let total: f64 = next.iter().sum();
            for v in &mut next {
                *v /= total;
            }

            let diff: f64 = next.iter().zip(&w).map(|(a, b)| (a - b).abs()).sum();
            w.copy_from_slice(&next);

            if diff < config.tolerance {
                return Ok(w);
            }
        }

        Err(PairwiseError::NotConverged {
            iterations: config.max_iterations,
        })
    }

    /// Row geometric means normalized to sum 1.
    pub fn geometric_mean(matrix: &[Vec<f64>]) -> Vec<f64> {
        let n = matrix.len() as f64;
        let means: Vec<f64> = matrix
            .iter()
            .map(|row| (row.iter().map(|v| v.ln()).sum::<f64>() / n).exp())
            .collect();
        let total: f64 = means.iter().sum();
        means.iter().map(|g| g / total).collect()
    }

    /// Estimates lambda max as the mean of `(A w)_i / w_i`.
    pub fn max_eigenvalue(matrix: &[Vec<f64>], weights: &[f64]) -> f64 {
        if matrix.is_empty() {
            return 0.0;
        }
        let sum: f64 = matrix
            .iter()
            .zip(weights)
            .map(|(row, wi)| {
                let aw: f64 = row.iter().zip(weights).map(|(a, w)| a * w).sum();
                aw / wi
            })
            .sum();
        sum / matrix.len() as f64
    }
}
