//! AHP - Analytic Hierarchy Process.
//!
//! Criteria weights come from a reciprocal criteria comparison matrix (or
//! from the criteria's own weights when none is given). Alternatives are then
//! scored either directly from the decision values or from per-criterion
//! comparison matrices over the alternatives.
//!
//! Inconsistent judgments are reported in the metadata, not rejected, unless
//! `strict_consistency` is set.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::normalization::{normalize, orient_values, NormalizationMethod};
use super::pairwise::{ConsistencyReport, PairwiseComparison, PairwiseError, Priorities, WeightDerivation};
use super::{
    invalid_parameters, parameters_from_value, AnalysisResult, McdmMethod, ParameterReader,
    Parameters,
};
use crate::domain::foundation::{McdmError, ValidationError};
use crate::domain::matrix::{Criterion, DecisionMatrix};

/// Typed AHP settings read from a parameter object.
#[derive(Debug, Clone, PartialEq)]
pub struct AhpConfig {
    pub criteria_comparison_matrix: Option<Vec<Vec<f64>>>,
    pub alternatives_comparison_matrices: Option<Vec<Option<Vec<Vec<f64>>>>>,
    pub consistency_ratio_threshold: f64,
    pub weight_derivation: WeightDerivation,
    pub use_pairwise_comparison_for_alternatives: bool,
    pub show_consistency_details: bool,
    pub normalize_before_comparison: bool,
    pub normalization: NormalizationMethod,
    pub strict_consistency: bool,
}

fn is_square(matrix: &[Vec<f64>]) -> bool {
    matrix.iter().all(|row| row.len() == matrix.len())
}

impl AhpConfig {
    pub fn from_parameters(params: &Parameters) -> Result<Self, Vec<String>> {
        let mut reader = ParameterReader::new(params);

        let criteria_comparison_matrix = reader.matrix("criteria_comparison_matrix");
        if let Some(m) = &criteria_comparison_matrix {
            if !is_square(m) {
                reader.push_error("Parameter 'criteria_comparison_matrix' must be square");
            }
        }

        let alternatives_comparison_matrices = reader.matrices("alternatives_comparison_matrices");
        if let Some(list) = &alternatives_comparison_matrices {
            for (idx, m) in list.iter().enumerate() {
                if let Some(m) = m {
                    if !is_square(m) {
                        reader.push_error(format!(
                            "Parameter 'alternatives_comparison_matrices' entry {} must be square",
                            idx
                        ));
                    }
                }
            }
        }

        let config = AhpConfig {
            criteria_comparison_matrix,
            alternatives_comparison_matrices,
            consistency_ratio_threshold: reader.positive("consistency_ratio_threshold", 0.1),
            weight_derivation: reader.choice(
                "weight_calculation_method",
                WeightDerivation::Eigenvector,
                &WeightDerivation::KEYS,
                WeightDerivation::parse,
            ),
            use_pairwise_comparison_for_alternatives: reader
                .bool("use_pairwise_comparison_for_alternatives", true),
            show_consistency_details: reader.bool("show_consistency_details", true),
            normalize_before_comparison: reader.bool("normalize_before_comparison", true),
            normalization: reader.choice(
                "normalization_method",
                NormalizationMethod::Minimax,
                &["minimax", "minmax", "sum", "max", "vector"],
                |s| NormalizationMethod::parse(s).ok(),
            ),
            strict_consistency: reader.bool("strict_consistency", false),
        };
        reader.finish(config)
    }
}

/// Local priorities of one criterion's alternatives, with where they came from.
struct CriterionPriorities {
    weights: Vec<f64>,
    consistency: ConsistencyReport,
}

/// Analytic Hierarchy Process.
#[derive(Debug, Clone, Copy, Default)]
pub struct AhpMethod;

impl AhpMethod {
    pub const NAME: &'static str = "AHP";

    pub fn new() -> Self {
        Self
    }

    fn derive(
        &self,
        matrix: &[Vec<f64>],
        order: usize,
        config: &AhpConfig,
        subject: &str,
    ) -> Result<Priorities, McdmError> {
        PairwiseComparison::priorities(
            matrix,
            order,
            config.weight_derivation,
            config.consistency_ratio_threshold,
        )
        .map_err(|err| match err {
            PairwiseError::WrongShape { .. } => ValidationError::with_errors(
                format!("The {} has incorrect dimensions", subject),
                vec![err.to_string()],
            )
            .into(),
            other => McdmError::method(Self::NAME, format!("{}: {}", subject, other)),
        })
    }

    fn criteria_priorities(
        &self,
        matrix: &DecisionMatrix,
        config: &AhpConfig,
    ) -> Result<Priorities, McdmError> {
        let n = matrix.num_criteria();
        match &config.criteria_comparison_matrix {
            Some(cm) => self.derive(cm, n, config, "criteria comparison matrix"),
            None => Ok(Priorities {
                weights: matrix.normalized_weights(),
                consistency: ConsistencyReport::perfect(n, "weights_derived"),
            }),
        }
    }

    /// Comparison matrices built from `criterion_<id>` alternative metadata.
    fn matrices_from_metadata(
        &self,
        matrix: &DecisionMatrix,
        config: &AhpConfig,
    ) -> Vec<Vec<Vec<f64>>> {
        let criteria = matrix.criteria();
        let raw: Vec<Vec<f64>> = matrix
            .alternatives()
            .iter()
            .map(|alt| {
                criteria
                    .iter()
                    .map(|c| {
                        alt.get_metadata(&format!("criterion_{}", c.id()))
                            .and_then(Value::as_f64)
                            .unwrap_or(1.0)
                    })
                    .collect()
            })
            .collect();

        // Normalized values are already oriented higher-is-better.
        let (values, oriented) = if config.normalize_before_comparison {
            (normalize(&raw, criteria, config.normalization), true)
        } else {
            (raw, false)
        };

        criteria
            .iter()
            .enumerate()
            .map(|(j, criterion)| comparison_from_values(&values, j, criterion, oriented))
            .collect()
    }

    fn alternative_priorities(
        &self,
        matrix: &DecisionMatrix,
        config: &AhpConfig,
    ) -> Result<Vec<CriterionPriorities>, McdmError> {
        let (m, _) = matrix.shape();

        let supplied: Vec<Option<Vec<Vec<f64>>>> = match &config.alternatives_comparison_matrices {
            Some(list) => list.clone(),
            None => self
                .matrices_from_metadata(matrix, config)
                .into_iter()
                .map(Some)
                .collect(),
        };

        let mut out = Vec::with_capacity(matrix.num_criteria());
        for (j, criterion) in matrix.criteria().iter().enumerate() {
            let priorities = match supplied.get(j).and_then(Option::as_ref) {
                Some(comparison) => {
                    let subject = format!("comparison matrix for criterion {}", criterion.name());
                    let p = self.derive(comparison, m, config, &subject)?;
                    CriterionPriorities {
                        weights: p.weights,
                        consistency: p.consistency,
                    }
                }
                None => CriterionPriorities {
                    weights: vec![1.0 / m as f64; m],
                    consistency: ConsistencyReport::perfect(m, "uniform_values"),
                },
            };
            out.push(priorities);
        }
        Ok(out)
    }
}

/// Ratio comparison matrix over one column. Pairs with a non-positive value
/// carry no ratio information and are left at 1.
fn comparison_from_values(
    values: &[Vec<f64>],
    j: usize,
    criterion: &Criterion,
    oriented: bool,
) -> Vec<Vec<f64>> {
    let column: Vec<f64> = values.iter().map(|row| row[j]).collect();
    let higher_is_better = oriented || criterion.is_benefit();

    column
        .iter()
        .enumerate()
        .map(|(i, &vi)| {
            column
                .iter()
                .enumerate()
                .map(|(k, &vk)| {
                    if i == k || vi <= 0.0 || vk <= 0.0 {
                        1.0
                    } else if higher_is_better {
                        vi / vk
                    } else {
                        vk / vi
                    }
                })
                .collect()
        })
        .collect()
}

impl McdmMethod for AhpMethod {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn full_name(&self) -> &str {
        "Analytic Hierarchy Process"
    }

    fn description(&self) -> &str {
        "Derives criteria weights and alternative priorities from reciprocal \
         pairwise comparison matrices via their principal eigenvector, and checks \
         the consistency of the judgments with Saaty's consistency ratio."
    }

    fn default_parameters(&self) -> Parameters {
        parameters_from_value(json!({
            "criteria_comparison_matrix": null,
            "alternatives_comparison_matrices": null,
            "consistency_ratio_threshold": 0.1,
            "weight_calculation_method": "eigenvector",
            "use_pairwise_comparison_for_alternatives": true,
            "show_consistency_details": true,
            "normalize_before_comparison": true,
            "normalization_method": "minmax",
            "strict_consistency": false,
        }))
    }

    fn parameter_errors(&self, params: &Parameters) -> Vec<String> {
        AhpConfig::from_parameters(params).err().unwrap_or_default()
    }

    fn execute(
        &self,
        matrix: &DecisionMatrix,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError> {
        let effective = self.prepare_execution(params)?;
        let config = AhpConfig::from_parameters(&effective)
            .map_err(|errors| invalid_parameters(self.name(), errors))?;

        let (m, n) = matrix.shape();
        debug!(
            method = %self.name(),
            alternatives = m,
            criteria = n,
            pairwise_alternatives = config.use_pairwise_comparison_for_alternatives,
            derivation = config.weight_derivation.as_str(),
            "Executing AHP"
        );

        let criteria = self.criteria_priorities(matrix, &config)?;

        let (priorities, alternative_reports) = if config.use_pairwise_comparison_for_alternatives {
            let per_criterion = self.alternative_priorities(matrix, &config)?;
            let mut table = vec![vec![0.0; n]; m];
            for (j, cp) in per_criterion.iter().enumerate() {
                for (i, w) in cp.weights.iter().enumerate() {
                    table[i][j] = *w;
                }
            }
            let reports: Vec<ConsistencyReport> =
                per_criterion.into_iter().map(|cp| cp.consistency).collect();
            (table, Some(reports))
        } else {
            // Raw cost columns are negated so a higher value never helps them.
            let normalization = config
                .normalize_before_comparison
                .then_some(config.normalization);
            (orient_values(matrix.values(), matrix.criteria(), normalization), None)
        };

        let scores: Vec<f64> = priorities
            .iter()
            .map(|row| row.iter().zip(&criteria.weights).map(|(p, w)| p * w).sum())
            .collect();

        let mut worst_ratio = criteria.consistency.consistency_ratio;
        let mut all_consistent = criteria.consistency.is_consistent;
        for report in alternative_reports.iter().flatten() {
            all_consistent &= report.is_consistent;
            worst_ratio = worst_ratio.max(report.consistency_ratio);
        }

        if !all_consistent {
            warn!(
                method = %self.name(),
                consistency_ratio = worst_ratio,
                threshold = config.consistency_ratio_threshold,
                "Pairwise judgments are inconsistent"
            );
            if config.strict_consistency {
                return Err(McdmError::method(
                    self.name(),
                    format!(
                        "Pairwise judgments are inconsistent: consistency ratio {:.4} exceeds threshold {}",
                        worst_ratio, config.consistency_ratio_threshold
                    ),
                ));
            }
        }

        let mut metadata = Map::new();
        metadata.insert("criteria_weights".to_string(), json!(criteria.weights));
        metadata.insert("alternative_priorities".to_string(), json!(priorities));
        metadata.insert("consistency".to_string(), criteria.consistency.to_value());
        metadata.insert("is_consistent".to_string(), Value::Bool(all_consistent));

        if config.show_consistency_details {
            let mut info = Map::new();
            info.insert(
                "criteria_consistency".to_string(),
                criteria.consistency.to_value(),
            );
            if let Some(reports) = &alternative_reports {
                let blocks: Vec<Value> = matrix
                    .criteria()
                    .iter()
                    .zip(reports)
                    .map(|(criterion, report)| {
                        let mut block = Map::new();
                        block.insert("criterion_id".to_string(), json!(criterion.id()));
                        block.insert("criterion_name".to_string(), json!(criterion.name()));
                        if let Value::Object(fields) = report.to_value() {
                            block.extend(fields);
                        }
                        Value::Object(block)
                    })
                    .collect();
                info.insert("alternatives_consistency".to_string(), Value::Array(blocks));
            }
            metadata.insert("consistency_info".to_string(), Value::Object(info));
        }

        Ok(AnalysisResult::for_matrix(self.name(), matrix, scores, effective)?
            .with_metadata(metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::matrix::Alternative;

    const EPS: f64 = 1e-9;

    fn two_by_two() -> DecisionMatrix {
        DecisionMatrix::new(
            "M",
            vec![Alternative::new("a", "A"), Alternative::new("b", "B")],
            vec![Criterion::new("c1", "C1"), Criterion::new("c2", "C2")],
            vec![vec![10.0, 5.0], vec![20.0, 1.0]],
        )
        .unwrap()
    }

    fn params(value: Value) -> Parameters {
        parameters_from_value(value)
    }

    #[test]
    fn direct_path_uses_normalized_values() {
        let p = params(json!({
            "criteria_comparison_matrix": [[1.0, 3.0], [1.0 / 3.0, 1.0]],
            "use_pairwise_comparison_for_alternatives": false
        }));
        let result = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap();

        assert!((result.scores()[0] - 0.25).abs() < EPS);
        assert!((result.scores()[1] - 0.75).abs() < EPS);
        assert_eq!(result.rankings(), &[2, 1]);
    }

    #[test]
    fn pairwise_path_combines_local_priorities() {
        let p = params(json!({
            "criteria_comparison_matrix": [[1.0, 3.0], [1.0 / 3.0, 1.0]],
            "alternatives_comparison_matrices": [
                [[1.0, 4.0], [0.25, 1.0]],
                [[1.0, 0.5], [2.0, 1.0]]
            ]
        }));
        let result = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap();

        assert!((result.scores()[0] - (0.75 * 0.8 + 0.25 / 3.0)).abs() < 1e-9);
        assert!((result.scores()[1] - (0.75 * 0.2 + 0.25 * 2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn missing_alternative_matrix_gives_uniform_priorities() {
        let p = params(json!({
            "criteria_comparison_matrix": [[1.0, 3.0], [1.0 / 3.0, 1.0]],
            "alternatives_comparison_matrices": [[[1.0, 4.0], [0.25, 1.0]]]
        }));
        let result = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap();

        assert!((result.scores()[0] - 0.725).abs() < 1e-9);
        let blocks = result.metadata()["consistency_info"]["alternatives_consistency"]
            .as_array()
            .unwrap();
        assert_eq!(blocks[1]["method"], "uniform_values");
        assert_eq!(blocks[1]["criterion_id"], "c2");
    }

    #[test]
    fn comparison_matrices_are_built_from_metadata() {
        let matrix = DecisionMatrix::new(
            "M",
            vec![
                Alternative::new("a", "A")
                    .with_metadata("criterion_price", 100.0)
                    .with_metadata("criterion_quality", 8.0),
                Alternative::new("b", "B")
                    .with_metadata("criterion_price", 200.0)
                    .with_metadata("criterion_quality", 4.0),
            ],
            vec![
                Criterion::new("price", "Price").minimize(),
                Criterion::new("quality", "Quality"),
            ],
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
        )
        .unwrap();

        let p = params(json!({"normalize_before_comparison": false}));
        let result = AhpMethod.execute(&matrix, Some(&p)).unwrap();

        assert!((result.scores()[0] - 2.0 / 3.0).abs() < 1e-9);
        assert!((result.scores()[1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn direct_path_without_normalization_orients_cost_columns() {
        let matrix = DecisionMatrix::new(
            "M",
            vec![Alternative::new("cheap", "Cheap"), Alternative::new("pricey", "Pricey")],
            vec![
                Criterion::new("price", "Price").minimize(),
                Criterion::new("quality", "Quality"),
            ],
            vec![vec![100.0, 5.0], vec![300.0, 6.0]],
        )
        .unwrap();
        let p = params(json!({
            "use_pairwise_comparison_for_alternatives": false,
            "normalize_before_comparison": false
        }));

        let result = AhpMethod.execute(&matrix, Some(&p)).unwrap();
        assert!((result.scores()[0] - (-47.5)).abs() < 1e-9);
        assert!((result.scores()[1] - (-147.0)).abs() < 1e-9);
        assert_eq!(result.rankings(), &[1, 2]);
    }

    #[test]
    fn without_criteria_matrix_weights_are_derived() {
        let p = params(json!({"use_pairwise_comparison_for_alternatives": false}));
        let result = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap();

        assert_eq!(result.metadata()["criteria_weights"], json!([0.5, 0.5]));
        assert_eq!(result.metadata()["consistency"]["method"], "weights_derived");
        assert_eq!(result.metadata()["consistency"]["is_consistent"], true);
    }

    #[test]
    fn wrong_criteria_matrix_order_is_a_validation_error() {
        let p = params(json!({
            "criteria_comparison_matrix": [[1, 2, 3], [0.5, 1, 2], [1.0 / 3.0, 0.5, 1]]
        }));
        let err = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(err.to_string().contains("incorrect dimensions"));
    }

    #[test]
    fn non_positive_judgment_is_a_method_error() {
        let p = params(json!({
            "criteria_comparison_matrix": [[1.0, 0.0], [0.0, 1.0]]
        }));
        let err = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MethodFailed);
    }

    fn three_criteria() -> DecisionMatrix {
        DecisionMatrix::new(
            "M",
            vec![Alternative::new("a", "A"), Alternative::new("b", "B")],
            vec![
                Criterion::new("x", "X"),
                Criterion::new("y", "Y"),
                Criterion::new("z", "Z"),
            ],
            vec![vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]],
        )
        .unwrap()
    }

    fn cyclic_judgments() -> Value {
        json!([
            [1.0, 5.0, 1.0 / 7.0],
            [1.0 / 5.0, 1.0, 5.0],
            [7.0, 1.0 / 5.0, 1.0]
        ])
    }

    #[test]
    fn inconsistency_is_flagged_but_completes() {
        let p = params(json!({
            "criteria_comparison_matrix": cyclic_judgments(),
            "use_pairwise_comparison_for_alternatives": false
        }));
        let result = AhpMethod.execute(&three_criteria(), Some(&p)).unwrap();

        assert_eq!(result.metadata()["consistency"]["is_consistent"], false);
        assert_eq!(result.metadata()["is_consistent"], false);
    }

    #[test]
    fn strict_mode_rejects_inconsistency() {
        let p = params(json!({
            "criteria_comparison_matrix": cyclic_judgments(),
            "use_pairwise_comparison_for_alternatives": false,
            "strict_consistency": true
        }));
        let err = AhpMethod.execute(&three_criteria(), Some(&p)).unwrap_err();

        assert_eq!(err.code(), ErrorCode::MethodFailed);
        assert!(err.to_string().contains("inconsistent"));
    }

    #[test]
    fn consistency_details_can_be_hidden() {
        let p = params(json!({"show_consistency_details": false}));
        let result = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap();
        assert!(!result.metadata().contains_key("consistency_info"));
        assert!(result.metadata().contains_key("consistency"));
    }

    #[test]
    fn parameter_validation_collects_all_errors() {
        let p = params(json!({
            "consistency_ratio_threshold": 0,
            "weight_calculation_method": "svd",
            "criteria_comparison_matrix": [[1, 2]]
        }));
        let errors = AhpMethod.parameter_errors(&p);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn approximate_is_accepted_for_geometric_mean() {
        let p = params(json!({
            "weight_calculation_method": "approximate",
            "criteria_comparison_matrix": [[1.0, 3.0], [1.0 / 3.0, 1.0]]
        }));
        let result = AhpMethod.execute(&two_by_two(), Some(&p)).unwrap();
        assert_eq!(result.metadata()["consistency"]["method"], "geometric_mean");
    }
}
