//! ELECTRE - outranking by concordance and discordance.
//!
//! Variant I builds a crisp outranking relation: `a` outranks `b` when enough
//! weight agrees that `a` is at least as good (concordance) and no criterion
//! objects too strongly (discordance). The kernel is the set of alternatives
//! nobody outranks.
//!
//! Variant III replaces the crisp tests with pseudo-criteria thresholds and a
//! credibility degree, then orders alternatives by descending and ascending
//! distillation.
//!
//! Both variants only define a partial order. The scores are a convenience
//! projection for presentation, flagged as such in the metadata.

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::normalization::{orient_values, NormalizationMethod};
use super::{
    invalid_parameters, parameters_from_value, AnalysisResult, McdmMethod, ParameterReader,
    Parameters,
};
use crate::domain::foundation::McdmError;
use crate::domain::matrix::{Criterion, DecisionMatrix};

/// Share of the credibility spread below the maximum that still counts as
/// outranking during distillation.
pub const DISTILLATION_CUT: f64 = 0.15;

pub const DEFAULT_PREFERENCE_THRESHOLD: f64 = 0.2;
pub const DEFAULT_INDIFFERENCE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_VETO_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectreVariant {
    I,
    III,
}

impl ElectreVariant {
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "I" => Some(ElectreVariant::I),
            "III" => Some(ElectreVariant::III),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElectreVariant::I => "I",
            ElectreVariant::III => "III",
        }
    }
}

/// How the partial order is projected onto a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMethod {
    NetFlow,
    PureDominance,
    Mixed,
}

impl ScoringMethod {
    pub const KEYS: [&'static str; 3] = ["net_flow", "pure_dominance", "mixed"];

    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "net_flow" => Some(ScoringMethod::NetFlow),
            "pure_dominance" => Some(ScoringMethod::PureDominance),
            "mixed" => Some(ScoringMethod::Mixed),
            _ => None,
        }
    }
}

/// Typed ELECTRE settings read from a parameter object.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectreConfig {
    pub variant: ElectreVariant,
    pub concordance_threshold: f64,
    pub discordance_threshold: f64,
    pub normalization: NormalizationMethod,
    pub normalize_matrix: bool,
    pub scoring_method: ScoringMethod,
    pub dominance_weight: f64,
    pub preference_thresholds: HashMap<String, f64>,
    pub indifference_thresholds: HashMap<String, f64>,
    pub veto_thresholds: HashMap<String, f64>,
}

impl ElectreConfig {
    pub fn from_parameters(params: &Parameters) -> Result<Self, Vec<String>> {
        let mut reader = ParameterReader::new(params);
        let config = ElectreConfig {
            variant: reader.choice("variant", ElectreVariant::I, &["I", "III"], ElectreVariant::parse),
            concordance_threshold: reader.number_in("concordance_threshold", 0.7, 0.5, 1.0),
            discordance_threshold: reader.number_in("discordance_threshold", 0.3, 0.0, 1.0),
            normalization: reader.choice(
                "normalization_method",
                NormalizationMethod::Minimax,
                &["minimax", "minmax", "sum", "max", "vector"],
                |s| NormalizationMethod::parse(s).ok(),
            ),
            normalize_matrix: reader.bool("normalize_matrix", true),
            scoring_method: reader.choice(
                "scoring_method",
                ScoringMethod::NetFlow,
                &ScoringMethod::KEYS,
                ScoringMethod::parse,
            ),
            dominance_weight: reader.number_in("dominance_weight", 0.6, 0.0, 1.0),
            preference_thresholds: reader.threshold_map("preference_thresholds"),
            indifference_thresholds: reader.threshold_map("indifference_thresholds"),
            veto_thresholds: reader.threshold_map("veto_thresholds"),
        };

        let mut keys: Vec<&String> = config
            .preference_thresholds
            .keys()
            .chain(config.indifference_thresholds.keys())
            .chain(config.veto_thresholds.keys())
            .collect();
        keys.sort();
        keys.dedup();
        for key in keys {
            let (q, p, v) = config.thresholds_for(key);
            if p < q {
                reader.push_error(format!(
                    "Preference threshold for '{}' ({}) must not be below its indifference threshold ({})",
                    key, p, q
                ));
            }
            if v < p {
                reader.push_error(format!(
                    "Veto threshold for '{}' ({}) must not be below its preference threshold ({})",
                    key, v, p
                ));
            }
        }

        reader.finish(config)
    }

    /// `(indifference, preference, veto)` for a criterion id.
    pub fn thresholds_for(&self, criterion_id: &str) -> (f64, f64, f64) {
        (
            self.indifference_thresholds
                .get(criterion_id)
                .copied()
                .unwrap_or(DEFAULT_INDIFFERENCE_THRESHOLD),
            self.preference_thresholds
                .get(criterion_id)
                .copied()
                .unwrap_or(DEFAULT_PREFERENCE_THRESHOLD),
            self.veto_thresholds
                .get(criterion_id)
                .copied()
                .unwrap_or(DEFAULT_VETO_THRESHOLD),
        )
    }
}

/// Elimination and choice expressing reality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElectreMethod;

impl ElectreMethod {
    pub const NAME: &'static str = "ELECTRE";

    pub fn new() -> Self {
        Self
    }

    /// `c(a, b)`: total weight of criteria on which `a` is at least as good as `b`.
    pub fn concordance_matrix(values: &[Vec<f64>], weights: &[f64]) -> Vec<Vec<f64>> {
        let m = values.len();
        let mut c = vec![vec![0.0; m]; m];
        for a in 0..m {
            for b in 0..m {
                if a != b {
                    c[a][b] = weights
                        .iter()
                        .enumerate()
                        .filter(|(k, _)| values[a][*k] >= values[b][*k])
                        .map(|(_, w)| w)
                        .sum();
                }
            }
        }
        c
    }

    /// `d(a, b)`: largest disadvantage of `a` against `b`, each scaled by its
    /// criterion's value range.
    pub fn discordance_matrix(values: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let m = values.len();
        let n = values.first().map_or(0, Vec::len);
        let ranges: Vec<f64> = (0..n)
            .map(|k| {
                let (lo, hi) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
                    (lo.min(row[k]), hi.max(row[k]))
                });
                hi - lo
            })
            .collect();

        let mut d = vec![vec![0.0; m]; m];
        for a in 0..m {
            for b in 0..m {
                if a == b {
                    continue;
                }
                d[a][b] = (0..n)
                    .filter(|&k| values[b][k] > values[a][k] && ranges[k] > 0.0)
                    .map(|k| (values[b][k] - values[a][k]) / ranges[k])
                    .fold(0.0, f64::max);
            }
        }
        d
    }

    /// Alternatives no other alternative outranks.
    pub fn kernel(outranks: &[Vec<bool>]) -> Vec<usize> {
        let m = outranks.len();
        (0..m)
            .filter(|&b| !(0..m).any(|a| a != b && outranks[a][b]))
            .collect()
    }

    fn score_counts(outranks: &[Vec<bool>], scoring: ScoringMethod, dominance_weight: f64) -> Vec<f64> {
        let m = outranks.len();
        let denom = if m > 1 { (m - 1) as f64 } else { 0.0 };

        (0..m)
            .map(|a| {
                let dominates = (0..m).filter(|&b| b != a && outranks[a][b]).count() as f64;
                let dominated = (0..m).filter(|&b| b != a && outranks[b][a]).count() as f64;
                match scoring {
                    ScoringMethod::NetFlow => dominates - dominated,
                    ScoringMethod::PureDominance => dominates,
                    ScoringMethod::Mixed => {
                        let (dom_ratio, dominated_ratio) = if denom > 0.0 {
                            (dominates / denom, dominated / denom)
                        } else {
                            (0.0, 0.0)
                        };
                        dominance_weight * dom_ratio + (1.0 - dominance_weight) * (1.0 - dominated_ratio)
                    }
                }
            })
            .collect()
    }

    fn run_variant_i(
        &self,
        values: &[Vec<f64>],
        weights: &[f64],
        matrix: &DecisionMatrix,
        config: &ElectreConfig,
    ) -> (Vec<f64>, Map<String, Value>) {
        let m = values.len();
        let concordance = Self::concordance_matrix(values, weights);
        let discordance = Self::discordance_matrix(values);

        let outranks: Vec<Vec<bool>> = (0..m)
            .map(|a| {
                (0..m)
                    .map(|b| {
                        a != b
                            && concordance[a][b] >= config.concordance_threshold
                            && discordance[a][b] <= config.discordance_threshold
                    })
                    .collect()
            })
            .collect();

        let dominance: Vec<Vec<bool>> = (0..m)
            .map(|a| (0..m).map(|b| outranks[a][b] && !outranks[b][a]).collect())
            .collect();

        let kernel = Self::kernel(&outranks);
        let kernel_ids: Vec<String> = kernel
            .iter()
            .map(|&i| matrix.alternatives()[i].id().to_string())
            .collect();

        let scores = Self::score_counts(&outranks, config.scoring_method, config.dominance_weight);

        let mut metadata = Map::new();
        metadata.insert("concordance_matrix".to_string(), json!(concordance));
        metadata.insert("discordance_matrix".to_string(), json!(discordance));
        metadata.insert("outranking_matrix".to_string(), json!(outranks));
        metadata.insert("dominance_matrix".to_string(), json!(dominance));
        metadata.insert("kernel".to_string(), json!(kernel));
        metadata.insert("kernel_ids".to_string(), json!(kernel_ids));
        (scores, metadata)
    }

    /// Credibility of "a outranks b" under pseudo-criteria thresholds.
    fn credibility_matrix(
        values: &[Vec<f64>],
        weights: &[f64],
        criteria: &[Criterion],
        config: &ElectreConfig,
    ) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let m = values.len();
        let thresholds: Vec<(f64, f64, f64)> = criteria
            .iter()
            .map(|c| config.thresholds_for(c.id().as_str()))
            .collect();

        let mut concordance = vec![vec![0.0; m]; m];
        let mut credibility = vec![vec![0.0; m]; m];

        for a in 0..m {
            for b in 0..m {
                if a == b {
                    continue;
                }

                let mut partial_discordance = Vec::with_capacity(thresholds.len());
                let mut c = 0.0;
                for (k, &(q, p, v)) in thresholds.iter().enumerate() {
                    // Advantage of b over a on criterion k.
                    let delta = values[b][k] - values[a][k];

                    let ck = if delta <= q {
                        1.0
                    } else if delta >= p {
                        0.0
                    } else {
                        (p - delta) / (p - q)
                    };
                    c += weights[k] * ck;

                    let dk = if delta <= p {
                        0.0
                    } else if delta >= v {
                        1.0
                    } else {
                        (delta - p) / (v - p)
                    };
                    partial_discordance.push(dk);
                }

                let mut s = c;
                for dk in partial_discordance {
                    if dk > c {
                        s *= (1.0 - dk) / (1.0 - c);
                    }
                }

                concordance[a][b] = c;
                credibility[a][b] = s;
            }
        }

        (concordance, credibility)
    }

    /// Ranks by repeatedly extracting the best (descending) or worst
    /// (ascending) qualified alternatives. Ties share a rank.
    pub fn distillation(credibility: &[Vec<f64>], descending: bool) -> Vec<usize> {
        let m = credibility.len();
        let mut ranks = vec![0; m];
        let mut remaining: Vec<usize> = (0..m).collect();
        let mut next_rank = if descending { 1 } else { m };

        while !remaining.is_empty() {
            if remaining.len() == 1 {
                ranks[remaining[0]] = next_rank;
                break;
            }

            let pair_values: Vec<f64> = remaining
                .iter()
                .flat_map(|&a| remaining.iter().filter(move |&&b| b != a).map(move |&b| (a, b)))
                .map(|(a, b)| credibility[a][b])
                .collect();
            let max = pair_values.iter().copied().fold(0.0, f64::max);
            let min_positive = pair_values
                .iter()
                .copied()
                .filter(|&s| s > 0.0)
                .fold(f64::INFINITY, f64::min);
            let min_positive = if min_positive.is_finite() { min_positive } else { 0.0 };
            let cut = max - DISTILLATION_CUT * (max - min_positive);

            let outranks = |a: usize, b: usize| {
                let s = credibility[a][b];
                s > 0.0 && s >= cut
            };
            let qualification: Vec<i64> = remaining
                .iter()
                .map(|&a| {
                    let strength = remaining.iter().filter(|&&b| b != a && outranks(a, b)).count();
                    let weakness = remaining.iter().filter(|&&b| b != a && outranks(b, a)).count();
                    strength as i64 - weakness as i64
                })
                .collect();

            let target = if descending {
                qualification.iter().copied().max()
            } else {
                qualification.iter().copied().min()
            }
            .unwrap_or(0);

            let selected: Vec<usize> = remaining
                .iter()
                .zip(&qualification)
                .filter(|(_, q)| **q == target)
                .map(|(&a, _)| a)
                .collect();

            for &a in &selected {
                ranks[a] = next_rank;
            }
            remaining.retain(|a| !selected.contains(a));
            if descending {
                next_rank += selected.len();
            } else {
                next_rank = next_rank.saturating_sub(selected.len());
            }
        }

        ranks
    }

    fn run_variant_iii(
        &self,
        values: &[Vec<f64>],
        weights: &[f64],
        matrix: &DecisionMatrix,
        config: &ElectreConfig,
    ) -> (Vec<f64>, Map<String, Value>) {
        let m = values.len();
        let (concordance, credibility) =
            Self::credibility_matrix(values, weights, matrix.criteria(), config);

        let denom = if m > 1 { (m - 1) as f64 } else { 0.0 };
        let flow = |sum: f64| if denom > 0.0 { sum / denom } else { 0.0 };
        let positive_flow: Vec<f64> = (0..m)
            .map(|a| flow(credibility[a].iter().sum()))
            .collect();
        let negative_flow: Vec<f64> = (0..m)
            .map(|a| flow(credibility.iter().map(|row| row[a]).sum()))
            .collect();
        let net_flows: Vec<f64> = positive_flow
            .iter()
            .zip(&negative_flow)
            .map(|(p, n)| p - n)
            .collect();

        let w = config.dominance_weight;
        let scores: Vec<f64> = match config.scoring_method {
            ScoringMethod::NetFlow => net_flows.clone(),
            ScoringMethod::PureDominance => positive_flow.clone(),
            ScoringMethod::Mixed => positive_flow
                .iter()
                .zip(&negative_flow)
                .map(|(p, n)| w * p + (1.0 - w) * (1.0 - n))
                .collect(),
        };

        let mut metadata = Map::new();
        metadata.insert("concordance_matrix".to_string(), json!(concordance));
        metadata.insert("credibility_matrix".to_string(), json!(credibility));
        metadata.insert(
            "descending_distillation".to_string(),
            json!(Self::distillation(&credibility, true)),
        );
        metadata.insert(
            "ascending_distillation".to_string(),
            json!(Self::distillation(&credibility, false)),
        );
        metadata.insert("positive_flow".to_string(), json!(positive_flow));
        metadata.insert("negative_flow".to_string(), json!(negative_flow));
        metadata.insert("net_flows".to_string(), json!(net_flows));
        (scores, metadata)
    }
}

impl McdmMethod for ElectreMethod {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn full_name(&self) -> &str {
        "Elimination Et Choix Traduisant la Realite"
    }

    fn description(&self) -> &str {
        "Builds an outranking relation from concordance and discordance indices \
         and extracts the kernel of alternatives not outranked by any other. \
         Non-compensatory: a strong weakness on one criterion can veto an \
         alternative regardless of its other strengths."
    }

    fn default_parameters(&self) -> Parameters {
        parameters_from_value(json!({
            "variant": "I",
            "concordance_threshold": 0.7,
            "discordance_threshold": 0.3,
            "normalization_method": "minmax",
            "normalize_matrix": true,
            "scoring_method": "net_flow",
            "dominance_weight": 0.6,
            "preference_thresholds": null,
            "indifference_thresholds": null,
            "veto_thresholds": null,
        }))
    }

    fn parameter_errors(&self, params: &Parameters) -> Vec<String> {
        ElectreConfig::from_parameters(params).err().unwrap_or_default()
    }

    fn execute(
        &self,
        matrix: &DecisionMatrix,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError> {
        let effective = self.prepare_execution(params)?;
        let config = ElectreConfig::from_parameters(&effective)
            .map_err(|errors| invalid_parameters(self.name(), errors))?;

        debug!(
            method = %self.name(),
            variant = config.variant.as_str(),
            alternatives = matrix.num_alternatives(),
            criteria = matrix.num_criteria(),
            "Executing ELECTRE"
        );

        let values = orient_values(
            matrix.values(),
            matrix.criteria(),
            config.normalize_matrix.then_some(config.normalization),
        );
        let weights = matrix.normalized_weights();

        let (scores, mut metadata) = match config.variant {
            ElectreVariant::I => self.run_variant_i(&values, &weights, matrix, &config),
            ElectreVariant::III => self.run_variant_iii(&values, &weights, matrix, &config),
        };
        metadata.insert("variant".to_string(), json!(config.variant.as_str()));
        metadata.insert("ranking_is_projection".to_string(), Value::Bool(true));

        Ok(AnalysisResult::for_matrix(self.name(), matrix, scores, effective)?
            .with_metadata(metadata))
    }
}
