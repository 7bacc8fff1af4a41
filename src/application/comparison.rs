//! Cross-method comparison: rank correlation and consensus.
//!
//! All results must rank the same alternatives in the same order, which is
//! what running several methods over one matrix produces.

use serde::Serialize;

use crate::domain::analysis::AnalysisResult;
use crate::domain::foundation::{AlternativeId, McdmError, ValidationError};

/// How many leading positions count towards consensus.
pub const CONSENSUS_TOP_K: usize = 3;

/// Spearman's rho over two rank vectors: `1 - 6 sum(d^2) / (m (m^2 - 1))`.
///
/// Returns 1.0 for fewer than two alternatives.
pub fn spearman_correlation(a: &[usize], b: &[usize]) -> f64 {
    let m = a.len().min(b.len());
    if m < 2 {
        return 1.0;
    }

    let d_squared: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    let m = m as f64;
    1.0 - (6.0 * d_squared) / (m * (m * m - 1.0))
}

/// How often one alternative made the top positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCount {
    pub id: AlternativeId,
    pub name: String,
    pub count: usize,
}

/// Agreement between methods on the alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consensus {
    /// Top-3 appearances per alternative, in matrix order.
    pub top_counts: Vec<TopCount>,
    /// `[i][j]`: share of methods ranking `i` strictly above `j`.
    pub concordance_matrix: Vec<Vec<f64>>,
    /// Alternative with the most top-3 appearances; first in matrix order on ties.
    pub consensus_alternative: Option<TopCount>,
    /// Mean of the concordance matrix.
    pub consensus_level: f64,
}

/// Comparison of several methods' results over the same matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodComparison {
    pub methods: Vec<String>,
    /// `[a][b]`: Spearman correlation between methods `a` and `b`.
    pub rankings_correlation: Vec<Vec<f64>>,
    pub consensus: Consensus,
}

/// Compares the rankings of `results`.
///
/// # Errors
///
/// Returns `ValidationError` when `results` is empty or the results rank
/// different alternatives.
pub fn compare_results(results: &[AnalysisResult]) -> Result<MethodComparison, McdmError> {
    let Some(first) = results.first() else {
        return Err(ValidationError::new("No results to compare").into());
    };

    let mismatched: Vec<String> = results
        .iter()
        .filter(|r| r.alternative_ids() != first.alternative_ids())
        .map(|r| {
            format!(
                "Result of {} ranks different alternatives than {}",
                r.method_name(),
                first.method_name()
            )
        })
        .collect();
    if !mismatched.is_empty() {
        return Err(ValidationError::with_errors("Results are not comparable", mismatched).into());
    }

    let rankings_correlation = results
        .iter()
        .map(|a| {
            results
                .iter()
                .map(|b| spearman_correlation(a.rankings(), b.rankings()))
                .collect()
        })
        .collect();

    Ok(MethodComparison {
        methods: results.iter().map(|r| r.method_name().to_string()).collect(),
        rankings_correlation,
        consensus: consensus(results),
    })
}

fn consensus(results: &[AnalysisResult]) -> Consensus {
    let ids = results[0].alternative_ids();
    let names = results[0].alternative_names();
    let m = ids.len();

    let mut counts = vec![0usize; m];
    let mut concordance = vec![vec![0.0; m]; m];
    for result in results {
        let ranks = result.rankings();

        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by_key(|&i| ranks[i]);
        for &i in order.iter().take(CONSENSUS_TOP_K) {
            counts[i] += 1;
        }

        for i in 0..m {
            for j in 0..m {
                if i != j && ranks[i] < ranks[j] {
                    concordance[i][j] += 1.0;
                }
            }
        }
    }

    let n_methods = results.len() as f64;
    for row in &mut concordance {
        for cell in row.iter_mut() {
            *cell /= n_methods;
        }
    }

    let top_counts: Vec<TopCount> = (0..m)
        .map(|i| TopCount {
            id: ids[i].clone(),
            name: names[i].clone(),
            count: counts[i],
        })
        .collect();

    let mut consensus_alternative: Option<&TopCount> = None;
    for candidate in &top_counts {
        if consensus_alternative.map_or(true, |best| candidate.count > best.count) {
            consensus_alternative = Some(candidate);
        }
    }
    let consensus_alternative = consensus_alternative.cloned();

    let cells = (m * m) as f64;
    let consensus_level = if cells > 0.0 {
        concordance.iter().flatten().sum::<f64>() / cells
    } else {
        0.0
    };

    Consensus {
        top_counts,
        concordance_matrix: concordance,
        consensus_alternative,
        consensus_level,
    }
}
