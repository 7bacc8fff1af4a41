//! PROMETHEE - outranking flows from pairwise preference degrees.
//!
//! For every ordered pair the per-criterion differences go through a
//! preference function and are aggregated with the criterion weights. The
//! positive flow measures how much an alternative is preferred to the others,
//! the negative flow how much the others are preferred to it. Variant II ranks
//! by net flow; variant I additionally reports the partial preorder, where an
//! alternative that wins on one flow and loses on the other is incomparable.

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::normalization::{orient_values, NormalizationMethod};
use super::preference_function::{
    PreferenceFunction, PreferenceThresholds, DEFAULT_GAUSSIAN_THRESHOLD,
    DEFAULT_INDIFFERENCE_THRESHOLD, DEFAULT_PREFERENCE_THRESHOLD,
};
use super::{
    invalid_parameters, parameters_from_value, AnalysisResult, McdmMethod, ParameterReader,
    Parameters,
};
use crate::domain::foundation::McdmError;
use crate::domain::matrix::{Criterion, DecisionMatrix};

/// Flows closer than this are treated as equal when building the preorder.
const FLOW_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrometheeVariant {
    I,
    II,
}

impl PrometheeVariant {
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "I" => Some(PrometheeVariant::I),
            "II" => Some(PrometheeVariant::II),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrometheeVariant::I => "I",
            PrometheeVariant::II => "II",
        }
    }
}

/// Typed PROMETHEE settings read from a parameter object.
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheeConfig {
    pub variant: PrometheeVariant,
    pub default_function: PreferenceFunction,
    pub preference_functions: HashMap<String, PreferenceFunction>,
    pub preference_threshold: f64,
    pub indifference_threshold: f64,
    pub gaussian_threshold: f64,
    pub p_thresholds: HashMap<String, f64>,
    pub q_thresholds: HashMap<String, f64>,
    pub s_thresholds: HashMap<String, f64>,
    pub normalization: NormalizationMethod,
    pub normalize_matrix: bool,
}

impl PrometheeConfig {
    pub fn from_parameters(params: &Parameters) -> Result<Self, Vec<String>> {
        let mut reader = ParameterReader::new(params);

        let variant = reader.choice("variant", PrometheeVariant::II, &["I", "II"], PrometheeVariant::parse);
        let default_function = reader.choice(
            "default_preference_function",
            PreferenceFunction::VShape,
            &PreferenceFunction::KEYS,
            PreferenceFunction::parse,
        );

        let mut preference_functions = HashMap::new();
        for (criterion, key) in reader.name_map("preference_functions") {
            match PreferenceFunction::parse(&key) {
                Some(function) => {
                    preference_functions.insert(criterion, function);
                }
                None => reader.push_error(format!(
                    "Preference function '{}' for criterion '{}' must be one of [{}]",
                    key,
                    criterion,
                    PreferenceFunction::KEYS.join(", ")
                )),
            }
        }

        let config = PrometheeConfig {
            variant,
            default_function,
            preference_functions,
            preference_threshold: reader.non_negative("preference_threshold", DEFAULT_PREFERENCE_THRESHOLD),
            indifference_threshold: reader
                .non_negative("indifference_threshold", DEFAULT_INDIFFERENCE_THRESHOLD),
            gaussian_threshold: reader.positive("gaussian_threshold", DEFAULT_GAUSSIAN_THRESHOLD),
            p_thresholds: reader.threshold_map("p_thresholds"),
            q_thresholds: reader.threshold_map("q_thresholds"),
            s_thresholds: reader.threshold_map("s_thresholds"),
            normalization: reader.choice(
                "normalization_method",
                NormalizationMethod::Minimax,
                &["minimax", "minmax", "sum", "max", "vector"],
                |s| NormalizationMethod::parse(s).ok(),
            ),
            normalize_matrix: reader.bool("normalize_matrix", true),
        };

        if config.preference_threshold < config.indifference_threshold {
            reader.push_error(format!(
                "Parameter 'preference_threshold' ({}) must not be below 'indifference_threshold' ({})",
                config.preference_threshold, config.indifference_threshold
            ));
        }

        let mut keys: Vec<&String> = config
            .p_thresholds
            .keys()
            .chain(config.q_thresholds.keys())
            .collect();
        keys.sort();
        keys.dedup();
        for key in keys {
            let t = config.thresholds_for(key);
            if t.preference < t.indifference {
                reader.push_error(format!(
                    "Preference threshold for '{}' ({}) must not be below its indifference threshold ({})",
                    key, t.preference, t.indifference
                ));
            }
        }

        reader.finish(config)
    }

    /// Per-criterion thresholds, falling back to the scalar settings.
    pub fn thresholds_for(&self, criterion_id: &str) -> PreferenceThresholds {
        PreferenceThresholds {
            indifference: self
                .q_thresholds
                .get(criterion_id)
                .copied()
                .unwrap_or(self.indifference_threshold),
            preference: self
                .p_thresholds
                .get(criterion_id)
                .copied()
                .unwrap_or(self.preference_threshold),
            gaussian: self
                .s_thresholds
                .get(criterion_id)
                .copied()
                .unwrap_or(self.gaussian_threshold),
        }
    }

    pub fn function_for(&self, criterion_id: &str) -> PreferenceFunction {
        self.preference_functions
            .get(criterion_id)
            .copied()
            .unwrap_or(self.default_function)
    }
}

/// Leaving and entering flows of every alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct Flows {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
    pub net: Vec<f64>,
}

/// Preference ranking organization method.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheeMethod;

impl PrometheeMethod {
    pub const NAME: &'static str = "PROMETHEE";

    pub fn new() -> Self {
        Self
    }

    /// `pi(a, b)`: weighted preference degree of `a` over `b`.
    pub fn preference_matrix(
        values: &[Vec<f64>],
        weights: &[f64],
        criteria: &[Criterion],
        config: &PrometheeConfig,
    ) -> Vec<Vec<f64>> {
        let m = values.len();
        let judged: Vec<(PreferenceFunction, PreferenceThresholds)> = criteria
            .iter()
            .map(|c| (config.function_for(c.id().as_str()), config.thresholds_for(c.id().as_str())))
            .collect();

        let mut pi = vec![vec![0.0; m]; m];
        for a in 0..m {
            for b in 0..m {
                if a == b {
                    continue;
                }
                pi[a][b] = judged
                    .iter()
                    .enumerate()
                    .map(|(k, (function, thresholds))| {
                        weights[k] * function.degree(values[a][k] - values[b][k], thresholds)
                    })
                    .sum();
            }
        }
        pi
    }

    /// Flows averaged over the other `m - 1` alternatives; all zero when `m == 1`.
    pub fn flows(pi: &[Vec<f64>]) -> Flows {
        let m = pi.len();
        let denom = if m > 1 { (m - 1) as f64 } else { 0.0 };
        let flow = |sum: f64| if denom > 0.0 { sum / denom } else { 0.0 };

        let positive: Vec<f64> = (0..m).map(|a| flow(pi[a].iter().sum())).collect();
        let negative: Vec<f64> = (0..m)
            .map(|a| flow(pi.iter().map(|row| row[a]).sum()))
            .collect();
        let net = positive.iter().zip(&negative).map(|(p, n)| p - n).collect();

        Flows {
            positive,
            negative,
            net,
        }
    }

    /// PROMETHEE I preorder.
    ///
    /// Returns the outranking matrix (`1` preferred, `0.5` indifferent) and
    /// the incomparable pairs, each listed once with the smaller index first.
    pub fn partial_order(positive: &[f64], negative: &[f64]) -> (Vec<Vec<f64>>, Vec<[usize; 2]>) {
        let m = positive.len();
        let eq = |x: f64, y: f64| (x - y).abs() <= FLOW_TOLERANCE;

        let mut outranking = vec![vec![0.0; m]; m];
        let mut incomparable = Vec::new();
        for a in 0..m {
            for b in 0..m {
                if a == b {
                    continue;
                }
                let (pa, pb) = (positive[a], positive[b]);
                let (na, nb) = (negative[a], negative[b]);

                let better_plus = pa > pb && !eq(pa, pb);
                let better_minus = na < nb && !eq(na, nb);
                let worse_plus = pa < pb && !eq(pa, pb);
                let worse_minus = na > nb && !eq(na, nb);

                if (better_plus && better_minus)
                    || (eq(pa, pb) && better_minus)
                    || (better_plus && eq(na, nb))
                {
                    outranking[a][b] = 1.0;
                } else if eq(pa, pb) && eq(na, nb) {
                    outranking[a][b] = 0.5;
                } else if a < b && ((better_plus && worse_minus) || (worse_plus && better_minus)) {
                    incomparable.push([a, b]);
                }
            }
        }
        (outranking, incomparable)
    }
}

impl McdmMethod for PrometheeMethod {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn full_name(&self) -> &str {
        "Preference Ranking Organization Method for Enrichment of Evaluations"
    }

    fn description(&self) -> &str {
        "Compares every pair of alternatives through per-criterion preference \
         functions and ranks them by the balance of outgoing and incoming \
         preference flows."
    }

    fn default_parameters(&self) -> Parameters {
        parameters_from_value(json!({
            "variant": "II",
            "default_preference_function": "v-shape",
            "preference_functions": null,
            "preference_threshold": DEFAULT_PREFERENCE_THRESHOLD,
            "indifference_threshold": DEFAULT_INDIFFERENCE_THRESHOLD,
            "gaussian_threshold": DEFAULT_GAUSSIAN_THRESHOLD,
            "p_thresholds": null,
            "q_thresholds": null,
            "s_thresholds": null,
            "normalization_method": "minmax",
            "normalize_matrix": true,
        }))
    }

    fn parameter_errors(&self, params: &Parameters) -> Vec<String> {
        PrometheeConfig::from_parameters(params).err().unwrap_or_default()
    }

    fn execute(
        &self,
        matrix: &DecisionMatrix,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError> {
        let effective = self.prepare_execution(params)?;
        let config = PrometheeConfig::from_parameters(&effective)
            .map_err(|errors| invalid_parameters(self.name(), errors))?;

        debug!(
            method = %self.name(),
            variant = config.variant.as_str(),
            alternatives = matrix.num_alternatives(),
            criteria = matrix.num_criteria(),
            "Executing PROMETHEE"
        );

        let values = orient_values(
            matrix.values(),
            matrix.criteria(),
            config.normalize_matrix.then_some(config.normalization),
        );
        let weights = matrix.normalized_weights();

        let pi = Self::preference_matrix(&values, &weights, matrix.criteria(), &config);
        let flows = Self::flows(&pi);

        let mut metadata = Map::new();
        metadata.insert("preference_matrix".to_string(), json!(pi));
        metadata.insert("positive_flow".to_string(), json!(flows.positive));
        metadata.insert("negative_flow".to_string(), json!(flows.negative));
        metadata.insert("net_flow".to_string(), json!(flows.net));
        metadata.insert("variant".to_string(), json!(config.variant.as_str()));

        if config.variant == PrometheeVariant::I {
            let (outranking, incomparable) = Self::partial_order(&flows.positive, &flows.negative);
            let pairs: Vec<Value> = incomparable
                .iter()
                .map(|&[a, b]| {
                    json!([
                        matrix.alternatives()[a].id().to_string(),
                        matrix.alternatives()[b].id().to_string()
                    ])
                })
                .collect();
            metadata.insert("outranking_matrix".to_string(), json!(outranking));
            metadata.insert("incomparable_pairs".to_string(), json!(incomparable));
            metadata.insert("incomparabilities".to_string(), Value::Array(pairs));
        }

        Ok(AnalysisResult::for_matrix(self.name(), matrix, flows.net, effective)?
            .with_metadata(metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::matrix::Alternative;

    fn params(value: Value) -> Parameters {
        parameters_from_value(value)
    }

    fn three_options() -> DecisionMatrix {
        DecisionMatrix::new(
            "M",
            vec![
                Alternative::new("a", "A"),
                Alternative::new("b", "B"),
                Alternative::new("c", "C"),
            ],
            vec![Criterion::new("x", "X"), Criterion::new("y", "Y")],
            vec![vec![5.0, 5.0], vec![3.0, 5.0], vec![1.0, 9.0]],
        )
        .unwrap()
    }

    #[test]
    fn net_flow_ranks_the_alternatives() {
        let result = PrometheeMethod.execute(&three_options(), None).unwrap();
        let meta = result.metadata();

        assert_eq!(meta["positive_flow"], json!([0.5, 0.25, 0.5]));
        assert_eq!(meta["negative_flow"], json!([0.25, 0.5, 0.5]));
        assert_eq!(result.scores(), &[0.25, -0.25, 0.0]);
        assert_eq!(result.rankings(), &[1, 3, 2]);
        assert_eq!(meta["variant"], "II");
        assert!(meta.get("outranking_matrix").is_none());
    }

    #[test]
    fn flows_balance() {
        let result = PrometheeMethod.execute(&three_options(), None).unwrap();
        let sum = |key: &str| -> f64 {
            result.metadata()[key]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_f64().unwrap())
                .sum()
        };
        assert!((sum("positive_flow") - sum("negative_flow")).abs() < 1e-12);
    }

    #[test]
    fn higher_net_flow_ranks_strictly_better() {
        let result = PrometheeMethod.execute(&three_options(), None).unwrap();
        let (scores, ranks) = (result.scores(), result.rankings());
        for i in 0..scores.len() {
            for j in 0..scores.len() {
                if scores[i] > scores[j] {
                    assert!(ranks[i] < ranks[j]);
                }
            }
        }
    }

    #[test]
    fn variant_i_reports_the_preorder() {
        let p = params(json!({"variant": "I"}));
        let result = PrometheeMethod.execute(&three_options(), Some(&p)).unwrap();
        let meta = result.metadata();

        assert_eq!(
            meta["outranking_matrix"],
            json!([[0.0, 1.0, 1.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        );
        assert_eq!(meta["incomparabilities"], json!([]));
    }

    #[test]
    fn crossing_flows_are_incomparable() {
        let (outranking, incomparable) = PrometheeMethod::partial_order(&[0.6, 0.4], &[0.3, 0.1]);
        assert_eq!(incomparable, vec![[0, 1]]);
        assert_eq!(outranking[0][1], 0.0);
        assert_eq!(outranking[1][0], 0.0);
    }

    #[test]
    fn equal_flows_are_indifferent() {
        let (outranking, incomparable) = PrometheeMethod::partial_order(&[0.5, 0.5], &[0.5, 0.5]);
        assert!(incomparable.is_empty());
        assert_eq!(outranking[0][1], 0.5);
        assert_eq!(outranking[1][0], 0.5);
    }

    #[test]
    fn single_alternative_has_zero_flows() {
        let matrix = DecisionMatrix::new(
            "M",
            vec![Alternative::new("only", "Only")],
            vec![Criterion::new("x", "X")],
            vec![vec![3.0]],
        )
        .unwrap();
        let result = PrometheeMethod.execute(&matrix, None).unwrap();
        assert_eq!(result.scores(), &[0.0]);
        assert_eq!(result.rankings(), &[1]);
    }

    #[test]
    fn cost_criterion_prefers_lower_values() {
        let matrix = DecisionMatrix::new(
            "M",
            vec![Alternative::new("cheap", "Cheap"), Alternative::new("pricey", "Pricey")],
            vec![Criterion::new("price", "Price").minimize()],
            vec![vec![100.0], vec![200.0]],
        )
        .unwrap();

        for p in [json!({}), json!({"normalize_matrix": false})] {
            let result = PrometheeMethod.execute(&matrix, Some(&params(p))).unwrap();
            assert_eq!(result.scores(), &[1.0, -1.0]);
        }
    }

    #[test]
    fn per_criterion_functions_and_thresholds_apply() {
        let p = params(json!({
            "preference_functions": {"x": "usual", "y": "level"},
            "p_thresholds": {"y": 0.5},
            "q_thresholds": {"y": 0.2}
        }));
        let config = PrometheeConfig::from_parameters(&p).unwrap();

        assert_eq!(config.function_for("x"), PreferenceFunction::Usual);
        assert_eq!(config.function_for("y"), PreferenceFunction::Level);
        assert_eq!(config.function_for("z"), PreferenceFunction::VShape);
        assert_eq!(config.thresholds_for("y").preference, 0.5);
        assert_eq!(config.thresholds_for("x").preference, DEFAULT_PREFERENCE_THRESHOLD);
    }

    #[test]
    fn invalid_settings_are_all_reported() {
        let p = params(json!({
            "variant": "III",
            "default_preference_function": "sigmoid",
            "preference_functions": {"x": "cubic"},
            "preference_threshold": 0.05
        }));
        let err = PrometheeMethod.execute(&three_options(), Some(&p)).unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidParameters);
        // variant, default function, per-criterion function, p < q
        assert_eq!(err.as_validation().unwrap().errors.len(), 4);
    }

    #[test]
    fn per_criterion_preference_below_indifference_is_rejected() {
        let p = params(json!({"p_thresholds": {"x": 0.05}}));
        let errors = PrometheeMethod.parameter_errors(&p);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'x'"));
    }
}
