//! Weight sensitivity: how rankings move when one criterion's weight varies.

use serde::Serialize;
use tracing::debug;

use crate::domain::analysis::{McdmMethod, Parameters};
use crate::domain::foundation::{AlternativeId, CriterionId, McdmError, ValidationError};
use crate::domain::matrix::DecisionMatrix;

/// The criterion being swept, as it was before the sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweptCriterion {
    pub id: CriterionId,
    pub name: String,
    pub original_weight: f64,
}

/// How often and how far one alternative's rank moved between steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankChange {
    pub alternative_id: AlternativeId,
    pub total_changes: usize,
    pub max_change: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingStability {
    /// Population variance of each alternative's rank across the sweep.
    pub ranking_variance: Vec<f64>,
    /// `1 / (1 + mean variance)`; 1.0 means no rank ever moved.
    pub stability_index: f64,
    pub rank_changes: Vec<RankChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub method: String,
    pub criterion: SweptCriterion,
    pub weight_range: [f64; 2],
    pub weights_tested: Vec<f64>,
    /// One ranking vector per tested weight.
    pub rankings: Vec<Vec<usize>>,
    /// One score vector per tested weight.
    pub scores: Vec<Vec<f64>>,
    pub stability: RankingStability,
}

/// `steps` evenly spaced values from `lo` to `hi`, both ends included.
pub fn linspace(lo: f64, hi: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (steps - 1) as f64;
            (0..steps)
                .map(|i| if i == steps - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Summarizes rank movement over a sweep. `rankings[step][alternative]`.
pub fn analyze_stability(rankings: &[Vec<usize>], ids: &[AlternativeId]) -> RankingStability {
    let steps = rankings.len();
    let m = ids.len();

    let ranking_variance: Vec<f64> = (0..m)
        .map(|a| {
            if steps == 0 {
                return 0.0;
            }
            let ranks: Vec<f64> = rankings.iter().map(|r| r[a] as f64).collect();
            let mean = ranks.iter().sum::<f64>() / steps as f64;
            ranks.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / steps as f64
        })
        .collect();

    let mean_variance = if m > 0 {
        ranking_variance.iter().sum::<f64>() / m as f64
    } else {
        0.0
    };

    let rank_changes = ids
        .iter()
        .enumerate()
        .map(|(a, id)| {
            let deltas: Vec<usize> = rankings
                .windows(2)
                .map(|w| w[0][a].abs_diff(w[1][a]))
                .collect();
            RankChange {
                alternative_id: id.clone(),
                total_changes: deltas.iter().filter(|&&d| d != 0).count(),
                max_change: deltas.iter().copied().max().unwrap_or(0),
            }
        })
        .collect();

    RankingStability {
        ranking_variance,
        stability_index: 1.0 / (1.0 + mean_variance),
        rank_changes,
    }
}

/// Re-runs `method` with the weight of `criterion_id` set to each of `steps`
/// evenly spaced values in `weight_range`.
///
/// Every step works on a fresh copy of `matrix`; the input is left untouched.
///
/// # Errors
///
/// - `ValidationError` for an unknown criterion, zero steps, or a weight
///   range that is not finite and non-negative
/// - whatever the method returns for a failing step
pub fn weight_sweep(
    method: &dyn McdmMethod,
    matrix: &DecisionMatrix,
    criterion_id: &CriterionId,
    weight_range: (f64, f64),
    steps: usize,
    params: Option<&Parameters>,
) -> Result<SensitivityReport, McdmError> {
    let (lo, hi) = weight_range;
    let mut errors = Vec::new();
    if steps == 0 {
        errors.push("Sensitivity analysis needs at least one step".to_string());
    }
    if !(lo.is_finite() && hi.is_finite() && lo >= 0.0 && hi >= 0.0) {
        errors.push(format!(
            "Weight range ({}, {}) must be finite and non-negative",
            lo, hi
        ));
    }
    let index = matrix.criterion_index(criterion_id);
    if index.is_none() {
        errors.push(format!("Criterion '{}' not found", criterion_id));
    }
    let Some(index) = index.filter(|_| errors.is_empty()) else {
        return Err(ValidationError::with_errors("Invalid sensitivity analysis request", errors).into());
    };

    let swept = &matrix.criteria()[index];
    let criterion = SweptCriterion {
        id: swept.id().clone(),
        name: swept.name().to_string(),
        original_weight: swept.weight(),
    };

    let weights_tested = linspace(lo, hi, steps);
    let mut rankings = Vec::with_capacity(steps);
    let mut scores = Vec::with_capacity(steps);
    for &weight in &weights_tested {
        let mut criteria = matrix.criteria().to_vec();
        criteria[index].set_weight(weight)?;
        let reweighted = matrix.with_criteria(criteria)?;

        let result = method.execute(&reweighted, params)?;
        rankings.push(result.rankings().to_vec());
        scores.push(result.scores().to_vec());
    }

    let stability = analyze_stability(&rankings, &matrix.alternative_ids());

    debug!(
        method = %method.name(),
        criterion = %criterion.id,
        steps,
        stability_index = stability.stability_index,
        "Sensitivity sweep finished"
    );

    Ok(SensitivityReport {
        method: method.name().to_string(),
        criterion,
        weight_range: [lo, hi],
        weights_tested,
        rankings,
        scores,
        stability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::TopsisMethod;
    use crate::domain::matrix::{Alternative, Criterion};

    fn trade_off() -> DecisionMatrix {
        DecisionMatrix::new(
            "M",
            vec![Alternative::new("fast", "Fast"), Alternative::new("cheap", "Cheap")],
            vec![
                Criterion::new("speed", "Speed"),
                Criterion::new("price", "Price").minimize(),
            ],
            vec![vec![10.0, 200.0], vec![2.0, 50.0]],
        )
        .unwrap()
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.3, 0.9, 1), vec![0.3]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn stable_rankings_have_unit_index() {
        let ids = vec![AlternativeId::new("a"), AlternativeId::new("b")];
        let stability = analyze_stability(&[vec![1, 2], vec![1, 2], vec![1, 2]], &ids);
        assert_eq!(stability.stability_index, 1.0);
        assert_eq!(stability.ranking_variance, vec![0.0, 0.0]);
        assert_eq!(stability.rank_changes[0].total_changes, 0);
    }

    #[test]
    fn rank_swaps_are_counted() {
        let ids = vec![AlternativeId::new("a"), AlternativeId::new("b")];
        let stability = analyze_stability(&[vec![1, 2], vec![2, 1]], &ids);
        // Each rank is 1 then 2: variance 0.25.
        assert_eq!(stability.ranking_variance, vec![0.25, 0.25]);
        assert!((stability.stability_index - 0.8).abs() < 1e-12);
        assert_eq!(stability.rank_changes[1].total_changes, 1);
        assert_eq!(stability.rank_changes[1].max_change, 1);
    }

    #[test]
    fn sweeping_a_weight_flips_the_winner() {
        let matrix = trade_off();
        let report = weight_sweep(
            &TopsisMethod,
            &matrix,
            &CriterionId::new("speed"),
            (0.0, 10.0),
            3,
            None,
        )
        .unwrap();

        assert_eq!(report.method, "TOPSIS");
        assert_eq!(report.weights_tested, vec![0.0, 5.0, 10.0]);
        assert_eq!(report.rankings.first().unwrap(), &vec![2, 1]);
        assert_eq!(report.rankings.last().unwrap(), &vec![1, 2]);
        assert!(report.stability.stability_index < 1.0);
        // Input matrix is unchanged.
        assert_eq!(matrix.criteria()[0].weight(), 1.0);
        assert_eq!(report.criterion.original_weight, 1.0);
    }

    #[test]
    fn unknown_criterion_and_bad_range_are_reported_together() {
        let err = weight_sweep(
            &TopsisMethod,
            &trade_off(),
            &CriterionId::new("comfort"),
            (-1.0, 1.0),
            0,
            None,
        )
        .unwrap_err();
        assert_eq!(err.as_validation().unwrap().errors.len(), 3);
    }
}
