//! DecisionMatrix - alternatives x criteria performance table.

use serde::Serialize;

use super::{Alternative, Criterion, MatrixValidator};
use crate::domain::analysis::normalization::{normalize, NormalizationMethod};
use crate::domain::foundation::{AlternativeId, CriterionId, ValidationError};

pub const DEFAULT_MATRIX_NAME: &str = "Decision Matrix";

/// Validated performance table: `values[i][j]` is alternative `i` on criterion `j`.
///
/// Construction checks every invariant. Once built the table is read-only;
/// replacing values goes through [`DecisionMatrix::with_values`], which
/// validates again and returns a new matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionMatrix {
    name: String,
    alternatives: Vec<Alternative>,
    criteria: Vec<Criterion>,
    values: Vec<Vec<f64>>,
}

impl DecisionMatrix {
    /// Creates a validated matrix.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` carrying every violated invariant.
    pub fn new(
        name: impl Into<String>,
        alternatives: Vec<Alternative>,
        criteria: Vec<Criterion>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        MatrixValidator::validate(&name, &alternatives, &criteria, &values)?;

        Ok(Self {
            name,
            alternatives,
            criteria,
            values,
        })
    }

    /// Creates a matrix with the default name.
    pub fn unnamed(
        alternatives: Vec<Alternative>,
        criteria: Vec<Criterion>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        Self::new(DEFAULT_MATRIX_NAME, alternatives, criteria, values)
    }

    /// Returns a new matrix with the same entities and replaced values.
    pub fn with_values(&self, values: Vec<Vec<f64>>) -> Result<Self, ValidationError> {
        Self::new(
            self.name.clone(),
            self.alternatives.clone(),
            self.criteria.clone(),
            values,
        )
    }

    /// Returns a new matrix with the criteria replaced, e.g. after reweighting.
    pub fn with_criteria(&self, criteria: Vec<Criterion>) -> Result<Self, ValidationError> {
        Self::new(
            self.name.clone(),
            self.alternatives.clone(),
            criteria,
            self.values.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Returns `(alternatives, criteria)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.alternatives.len(), self.criteria.len())
    }

    pub fn num_alternatives(&self) -> usize {
        self.alternatives.len()
    }

    pub fn num_criteria(&self) -> usize {
        self.criteria.len()
    }

    pub fn value(&self, alternative: usize, criterion: usize) -> Option<f64> {
        self.values.get(alternative)?.get(criterion).copied()
    }

    pub fn alternative_values(&self, alternative: usize) -> Option<&[f64]> {
        self.values.get(alternative).map(Vec::as_slice)
    }

    pub fn criterion_values(&self, criterion: usize) -> Option<Vec<f64>> {
        if criterion >= self.criteria.len() {
            return None;
        }
        Some(self.values.iter().map(|row| row[criterion]).collect())
    }

    pub fn alternative_by_id(&self, id: &AlternativeId) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.id() == id)
    }

    pub fn criterion_by_id(&self, id: &CriterionId) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id() == id)
    }

    pub fn criterion_index(&self, id: &CriterionId) -> Option<usize> {
        self.criteria.iter().position(|c| c.id() == id)
    }

    pub fn alternative_ids(&self) -> Vec<AlternativeId> {
        self.alternatives.iter().map(|a| a.id().clone()).collect()
    }

    pub fn alternative_names(&self) -> Vec<String> {
        self.alternatives.iter().map(|a| a.name().to_string()).collect()
    }

    /// Raw criterion weights in column order.
    pub fn weights(&self) -> Vec<f64> {
        self.criteria.iter().map(Criterion::weight).collect()
    }

    /// Weights scaled to sum to 1; uniform when they sum to 0.
    pub fn normalized_weights(&self) -> Vec<f64> {
        normalize_weights(&self.weights())
    }

    /// Returns a copy with every column normalized by its criterion's direction.
    pub fn normalized(&self, method: NormalizationMethod) -> DecisionMatrix {
        DecisionMatrix {
            values: normalize(&self.values, &self.criteria, method),
            ..self.clone()
        }
    }

    /// Returns a copy with every column multiplied by its normalized weight.
    pub fn weighted(&self) -> DecisionMatrix {
        let weights = self.normalized_weights();
        let values = self
            .values
            .iter()
            .map(|row| row.iter().zip(&weights).map(|(v, w)| v * w).collect())
            .collect();

        DecisionMatrix {
            values,
            ..self.clone()
        }
    }
}

/// Scales weights to sum to 1. All-zero (or empty-sum) input becomes uniform.
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() {
        return Vec::new();
    }
    if total == 0.0 {
        let uniform = 1.0 / weights.len() as f64;
        return vec![uniform; weights.len()];
    }
    weights.iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecisionMatrix {
        DecisionMatrix::new(
            "Laptops",
            vec![
                Alternative::new("a1", "Alpha"),
                Alternative::new("a2", "Beta"),
            ],
            vec![
                Criterion::new("perf", "Performance").with_weight(3.0),
                Criterion::new("price", "Price").minimize().with_weight(1.0),
            ],
            vec![vec![8.0, 1200.0], vec![6.0, 800.0]],
        )
        .unwrap()
    }

    #[test]
    fn new_reports_all_violations() {
        let err = DecisionMatrix::new(
            "M",
            vec![Alternative::new("a", "A"), Alternative::new("a", "B")],
            vec![Criterion::new("x", "X")],
            vec![vec![f64::INFINITY], vec![1.0]],
        )
        .unwrap_err();

        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.message, "Invalid decision matrix");
    }

    #[test]
    fn unnamed_uses_default_name() {
        let m = DecisionMatrix::unnamed(
            vec![Alternative::new("a", "A")],
            vec![Criterion::new("x", "X")],
            vec![vec![1.0]],
        )
        .unwrap();
        assert_eq!(m.name(), DEFAULT_MATRIX_NAME);
    }

    #[test]
    fn lookups_by_index_and_id() {
        let m = sample();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.value(1, 1), Some(800.0));
        assert_eq!(m.value(2, 0), None);
        assert_eq!(m.criterion_values(0), Some(vec![8.0, 6.0]));
        assert_eq!(m.alternative_values(0), Some(&[8.0, 1200.0][..]));
        assert_eq!(
            m.alternative_by_id(&AlternativeId::from("a2")).map(|a| a.name()),
            Some("Beta")
        );
        assert_eq!(m.criterion_index(&CriterionId::from("price")), Some(1));
    }

    #[test]
    fn with_values_revalidates_shape() {
        let m = sample();
        assert!(m.with_values(vec![vec![1.0, 2.0]]).is_err());

        let replaced = m.with_values(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(replaced.value(1, 0), Some(3.0));
        assert_eq!(m.value(1, 0), Some(6.0));
    }

    #[test]
    fn normalized_weights_sum_to_one() {
        let m = sample();
        assert_eq!(m.normalized_weights(), vec![0.75, 0.25]);
    }

    #[test]
    fn zero_weights_become_uniform() {
        assert_eq!(normalize_weights(&[0.0, 0.0, 0.0, 0.0]), vec![0.25; 4]);
    }

    #[test]
    fn normalized_matrix_respects_direction() {
        let m = sample().normalized(NormalizationMethod::Minimax);
        assert_eq!(m.values(), &[vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn weighted_scales_columns() {
        let m = sample().weighted();
        assert_eq!(m.value(0, 0), Some(6.0));
        assert_eq!(m.value(0, 1), Some(300.0));
    }
}
