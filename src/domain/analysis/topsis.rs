//! TOPSIS - ranking by closeness to the ideal solution.
//!
//! Each alternative is scored by `d- / (d+ + d-)`, where `d+` and `d-` are its
//! distances to the best and worst value observed on every criterion.
//!
//! Normalization here treats every column as benefit. Criterion direction is
//! applied once, when picking the ideal vectors, so cost columns are never
//! inverted twice.

use serde_json::{json, Map, Value};
use std::fmt;
use tracing::{debug, warn};

use super::normalization::{normalize_with_directions, NormalizationMethod};
use super::{
    invalid_parameters, parameters_from_value, AnalysisResult, McdmMethod, ParameterReader,
    Parameters,
};
use crate::domain::foundation::{McdmError, OptimizationType};
use crate::domain::matrix::DecisionMatrix;

/// Distance used between an alternative and an ideal vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl DistanceMetric {
    pub const KEYS: [&'static str; 3] = ["euclidean", "manhattan", "chebyshev"];

    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "euclidean" => Some(DistanceMetric::Euclidean),
            "manhattan" => Some(DistanceMetric::Manhattan),
            "chebyshev" => Some(DistanceMetric::Chebyshev),
            _ => None,
        }
    }

    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
        match self {
            DistanceMetric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            DistanceMetric::Manhattan => diffs.sum(),
            DistanceMetric::Chebyshev => diffs.fold(0.0, f64::max),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Chebyshev => "chebyshev",
        };
        f.write_str(s)
    }
}

/// Typed TOPSIS settings read from a parameter object.
#[derive(Debug, Clone, PartialEq)]
pub struct TopsisConfig {
    pub normalization: NormalizationMethod,
    pub normalize_matrix: bool,
    pub distance_metric: DistanceMetric,
    /// When false, weights scale the raw columns before normalization. Every
    /// scheme is scale-invariant per column, so with `normalize_matrix` on the
    /// weights cancel out and all criteria count equally.
    pub apply_weights_after_normalization: bool,
    pub consider_criteria_type: bool,
}

impl TopsisConfig {
    pub fn from_parameters(params: &Parameters) -> Result<Self, Vec<String>> {
        let mut reader = ParameterReader::new(params);
        let config = TopsisConfig {
            normalization: reader.choice(
                "normalization_method",
                NormalizationMethod::Vector,
                &["minimax", "minmax", "sum", "max", "vector"],
                |s| NormalizationMethod::parse(s).ok(),
            ),
            normalize_matrix: reader.bool("normalize_matrix", true),
            distance_metric: reader.choice(
                "distance_metric",
                DistanceMetric::Euclidean,
                &DistanceMetric::KEYS,
                DistanceMetric::parse,
            ),
            apply_weights_after_normalization: reader
                .bool("apply_weights_after_normalization", true),
            consider_criteria_type: reader.bool("consider_criteria_type", true),
        };
        reader.finish(config)
    }
}

/// Technique for Order of Preference by Similarity to Ideal Solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopsisMethod;

impl TopsisMethod {
    pub const NAME: &'static str = "TOPSIS";

    pub fn new() -> Self {
        Self
    }
}

/// Multiplies column `j` of every row by `weights[j]`.
fn scale_columns(values: &[Vec<f64>], weights: &[f64]) -> Vec<Vec<f64>> {
    values
        .iter()
        .map(|row| row.iter().zip(weights).map(|(v, w)| v * w).collect())
        .collect()
}

impl McdmMethod for TopsisMethod {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn full_name(&self) -> &str {
        "Technique for Order of Preference by Similarity to Ideal Solution"
    }

    fn description(&self) -> &str {
        "Ranks alternatives by their relative closeness to a positive ideal \
         solution (best value on every criterion) and distance from a negative \
         ideal solution. Compensatory: a weakness on one criterion can be offset \
         by strength on another. Produces a complete ranking."
    }

    fn default_parameters(&self) -> Parameters {
        parameters_from_value(json!({
            "normalization_method": "vector",
            "normalize_matrix": true,
            "distance_metric": "euclidean",
            "apply_weights_after_normalization": true,
            "consider_criteria_type": true,
        }))
    }

    fn parameter_errors(&self, params: &Parameters) -> Vec<String> {
        TopsisConfig::from_parameters(params).err().unwrap_or_default()
    }

    fn execute(
        &self,
        matrix: &DecisionMatrix,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError> {
        let effective = self.prepare_execution(params)?;
        let config = TopsisConfig::from_parameters(&effective)
            .map_err(|errors| invalid_parameters(self.name(), errors))?;

        let (m, n) = matrix.shape();
        debug!(
            method = %self.name(),
            alternatives = m,
            criteria = n,
            metric = %config.distance_metric,
            "Executing TOPSIS"
        );

        let weights = matrix.normalized_weights();
        let neutral = vec![OptimizationType::Maximize; n];

        let (normalized, weighted) = if config.apply_weights_after_normalization {
            let normalized = if config.normalize_matrix {
                normalize_with_directions(matrix.values(), &neutral, config.normalization)
            } else {
                matrix.values().to_vec()
            };
            let weighted = scale_columns(&normalized, &weights);
            (normalized, weighted)
        } else {
            if config.normalize_matrix {
                debug!(
                    method = %self.name(),
                    normalization = %config.normalization,
                    "Weights applied before normalization are cancelled by it"
                );
            }
            let scaled = scale_columns(matrix.values(), &weights);
            let weighted = if config.normalize_matrix {
                normalize_with_directions(&scaled, &neutral, config.normalization)
            } else {
                scaled
            };
            (weighted.clone(), weighted)
        };

        let mut ideal_positive = vec![0.0; n];
        let mut ideal_negative = vec![0.0; n];
        for (j, criterion) in matrix.criteria().iter().enumerate() {
            let (lo, hi) = weighted
                .iter()
                .map(|row| row[j])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                    (lo.min(x), hi.max(x))
                });

            if config.consider_criteria_type && criterion.is_cost() {
                ideal_positive[j] = lo;
                ideal_negative[j] = hi;
            } else {
                ideal_positive[j] = hi;
                ideal_negative[j] = lo;
            }
        }

        let metric = config.distance_metric;
        let distances_positive: Vec<f64> = weighted
            .iter()
            .map(|row| metric.distance(row, &ideal_positive))
            .collect();
        let distances_negative: Vec<f64> = weighted
            .iter()
            .map(|row| metric.distance(row, &ideal_negative))
            .collect();

        let mut scores = Vec::with_capacity(m);
        for (i, (d_pos, d_neg)) in distances_positive.iter().zip(&distances_negative).enumerate() {
            let denominator = d_pos + d_neg;
            if denominator > 0.0 {
                scores.push(d_neg / denominator);
            } else {
                warn!(
                    method = %self.name(),
                    alternative = %matrix.alternatives()[i].id(),
                    "Alternative coincides with both ideal solutions, closeness set to 0"
                );
                scores.push(0.0);
            }
        }

        let mut metadata = Map::new();
        metadata.insert("normalized_values".to_string(), json!(normalized));
        metadata.insert("weighted_values".to_string(), json!(weighted));
        metadata.insert("ideal_positive".to_string(), json!(ideal_positive));
        metadata.insert("ideal_negative".to_string(), json!(ideal_negative));
        metadata.insert("distances_positive".to_string(), json!(distances_positive));
        metadata.insert("distances_negative".to_string(), json!(distances_negative));
        metadata.insert("weights".to_string(), Value::from(weights));

        Ok(AnalysisResult::for_matrix(self.name(), matrix, scores, effective)?
            .with_metadata(metadata))
    }
}
