//! Structural validation for decision matrices.
//!
//! Every check runs; the caller gets the full list of violations in one
//! `ValidationError` rather than fixing them one at a time.

use std::collections::HashSet;

use super::{Alternative, Criterion};
use crate::domain::foundation::ValidationError;

/// Stateless validator for the matrix invariants.
pub struct MatrixValidator;

impl MatrixValidator {
    /// Validates all matrix invariants.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing every violation found.
    pub fn validate(
        name: &str,
        alternatives: &[Alternative],
        criteria: &[Criterion],
        values: &[Vec<f64>],
    ) -> Result<(), ValidationError> {
        let errors = Self::collect_errors(name, alternatives, criteria, values);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::with_errors(
                "Invalid decision matrix",
                errors,
            ))
        }
    }

    /// Returns every violation found, empty when the matrix is valid.
    pub fn collect_errors(
        name: &str,
        alternatives: &[Alternative],
        criteria: &[Criterion],
        values: &[Vec<f64>],
    ) -> Vec<String> {
        let mut errors = Vec::new();

        if name.trim().is_empty() {
            errors.push("Matrix name cannot be empty".to_string());
        }
        if alternatives.is_empty() {
            errors.push("Matrix must contain at least one alternative".to_string());
        }
        if criteria.is_empty() {
            errors.push("Matrix must contain at least one criterion".to_string());
        }

        let mut seen = HashSet::new();
        for alt in alternatives {
            if alt.id().as_str().is_empty() {
                errors.push("Alternative id cannot be empty".to_string());
            } else if !seen.insert(alt.id().as_str()) {
                errors.push(format!("Duplicate alternative id '{}'", alt.id()));
            }
        }

        let mut seen = HashSet::new();
        for crit in criteria {
            if crit.id().as_str().is_empty() {
                errors.push("Criterion id cannot be empty".to_string());
            } else if !seen.insert(crit.id().as_str()) {
                errors.push(format!("Duplicate criterion id '{}'", crit.id()));
            }
            if !crit.weight().is_finite() || crit.weight() < 0.0 {
                errors.push(format!(
                    "Criterion '{}' has invalid weight {}: must be finite and >= 0",
                    crit.id(),
                    crit.weight()
                ));
            }
        }

        let m = alternatives.len();
        let n = criteria.len();
        if values.len() != m {
            errors.push(format!(
                "Values have {} rows but the matrix has {} alternatives",
                values.len(),
                m
            ));
        }
        for (i, row) in values.iter().enumerate() {
            if row.len() != n {
                errors.push(format!(
                    "Row {} has {} values but the matrix has {} criteria",
                    i,
                    row.len(),
                    n
                ));
            }
            for (j, v) in row.iter().enumerate() {
                if !v.is_finite() {
                    errors.push(format!("Value at ({}, {}) is not finite: {}", i, j, v));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts(ids: &[&str]) -> Vec<Alternative> {
        ids.iter().map(|id| Alternative::new(*id, *id)).collect()
    }

    fn crits(ids: &[&str]) -> Vec<Criterion> {
        ids.iter().map(|id| Criterion::new(*id, *id)).collect()
    }

    #[test]
    fn valid_matrix_has_no_errors() {
        let errors = MatrixValidator::collect_errors(
            "M",
            &alts(&["a", "b"]),
            &crits(&["x"]),
            &[vec![1.0], vec![2.0]],
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn collects_every_violation() {
        let errors = MatrixValidator::collect_errors(
            "",
            &alts(&["a", "a"]),
            &crits(&["x", "y"]),
            &[vec![1.0, f64::NAN], vec![2.0]],
        );

        assert!(errors.iter().any(|e| e.contains("name cannot be empty")));
        assert!(errors.iter().any(|e| e.contains("Duplicate alternative id 'a'")));
        assert!(errors.iter().any(|e| e.contains("not finite")));
        assert!(errors.iter().any(|e| e.contains("Row 1 has 1 values")));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn shape_is_checked_against_counts() {
        let result = MatrixValidator::validate(
            "M",
            &alts(&["a", "b", "c"]),
            &crits(&["x"]),
            &[vec![1.0], vec![2.0]],
        );
        let err = result.unwrap_err();
        assert_eq!(
            err.errors,
            vec!["Values have 2 rows but the matrix has 3 alternatives".to_string()]
        );
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        let errors = MatrixValidator::collect_errors("M", &[], &[], &[]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let criteria = vec![Criterion::new("x", "X").with_weight(-1.0)];
        let errors =
            MatrixValidator::collect_errors("M", &alts(&["a"]), &criteria, &[vec![1.0]]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid weight"));
    }
}
