//! Property-based tests for the normalization schemes.
//!
//! Every scheme must keep the matrix shape, produce finite values, and hit
//! its defining property on arbitrary columns, including degenerate ones.

use mcdm_engine::domain::analysis::normalization::{normalize, NormalizationMethod};
use mcdm_engine::domain::matrix::Criterion;
use proptest::prelude::*;

const EPS: f64 = 1e-9;

/// A matrix of `m x n` values in `range` plus one direction flag per column.
fn matrix_with_directions(
    range: std::ops::Range<f64>,
) -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<bool>)> {
    (1usize..8, 1usize..5).prop_flat_map(move |(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(range.clone(), n), m),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

/// Like `matrix_with_directions`, but every value has magnitude >= 1e300 and
/// a random sign, so column ranges and totals overflow `f64`.
fn extreme_matrix_with_directions() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<bool>)> {
    let extreme = (1e300f64..1.7e308, any::<bool>()).prop_map(|(v, neg)| if neg { -v } else { v });
    (1usize..8, 1usize..5).prop_flat_map(move |(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(extreme.clone(), n), m),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

fn criteria(costs: &[bool]) -> Vec<Criterion> {
    costs
        .iter()
        .enumerate()
        .map(|(j, &cost)| {
            let c = Criterion::new(format!("c{}", j), format!("C{}", j));
            if cost {
                c.minimize()
            } else {
                c
            }
        })
        .collect()
}

fn column(values: &[Vec<f64>], j: usize) -> Vec<f64> {
    values.iter().map(|row| row[j]).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_scheme_keeps_shape_and_finiteness((values, costs) in matrix_with_directions(-1000.0..1000.0)) {
        let criteria = criteria(&costs);
        for method in NormalizationMethod::ALL {
            let out = normalize(&values, &criteria, method);
            prop_assert_eq!(out.len(), values.len());
            for (row, original) in out.iter().zip(&values) {
                prop_assert_eq!(row.len(), original.len());
                prop_assert!(row.iter().all(|v| v.is_finite()), "{:?} produced {:?}", method, row);
            }
        }
    }

    #[test]
    fn extreme_magnitudes_stay_finite((values, costs) in extreme_matrix_with_directions()) {
        let criteria = criteria(&costs);
        for method in NormalizationMethod::ALL {
            let out = normalize(&values, &criteria, method);
            for row in &out {
                prop_assert!(row.iter().all(|v| v.is_finite()), "{:?} produced {:?}", method, row);
            }
        }

        let minimax = normalize(&values, &criteria, NormalizationMethod::Minimax);
        prop_assert!(minimax.iter().flatten().all(|v| (-EPS..=1.0 + EPS).contains(v)));
    }

    #[test]
    fn vector_unit_norm_near_the_limits((values, costs) in matrix_with_directions(1e300..1e308)) {
        let out = normalize(&values, &criteria(&costs), NormalizationMethod::Vector);
        for j in 0..costs.len() {
            let norm = column(&out, j).iter().map(|v| v * v).sum::<f64>().sqrt();
            prop_assert!((norm - 1.0).abs() < EPS, "column {} has norm {}", j, norm);
        }
    }

    #[test]
    fn minimax_stays_in_unit_interval((values, costs) in matrix_with_directions(-1000.0..1000.0)) {
        let out = normalize(&values, &criteria(&costs), NormalizationMethod::Minimax);
        for row in &out {
            for &v in row {
                prop_assert!((-EPS..=1.0 + EPS).contains(&v), "value {} outside [0, 1]", v);
            }
        }
    }

    #[test]
    fn sum_columns_add_up_to_one((values, costs) in matrix_with_directions(0.1..1000.0)) {
        let out = normalize(&values, &criteria(&costs), NormalizationMethod::Sum);
        for j in 0..costs.len() {
            let total: f64 = column(&out, j).iter().sum();
            prop_assert!((total - 1.0).abs() < EPS, "column {} sums to {}", j, total);
        }
    }

    #[test]
    fn vector_columns_have_unit_norm((values, costs) in matrix_with_directions(0.1..1000.0)) {
        let out = normalize(&values, &criteria(&costs), NormalizationMethod::Vector);
        for (j, &cost) in costs.iter().enumerate() {
            let col = column(&out, j);
            let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
            prop_assert!((norm - 1.0).abs() < EPS, "column {} has norm {}", j, norm);
            if cost {
                prop_assert!(col.iter().all(|&v| v <= 0.0));
            }
        }
    }

    #[test]
    fn max_benefit_columns_peak_at_one((values, costs) in matrix_with_directions(0.1..1000.0)) {
        let out = normalize(&values, &criteria(&costs), NormalizationMethod::Max);
        for j in 0..costs.len() {
            let peak = column(&out, j).into_iter().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!((peak - 1.0).abs() < EPS, "column {} peaks at {}", j, peak);
        }
    }

    #[test]
    fn constant_columns_follow_direction(value in -100.0f64..100.0, m in 1usize..6) {
        let values = vec![vec![value, value]; m];
        let criteria = vec![Criterion::new("b", "Benefit"), Criterion::new("c", "Cost").minimize()];
        let out = normalize(&values, &criteria, NormalizationMethod::Minimax);
        for row in &out {
            prop_assert_eq!(row[0], 1.0);
            prop_assert_eq!(row[1], 0.0);
        }
    }

    #[test]
    fn normalization_does_not_touch_input((values, costs) in matrix_with_directions(-10.0..10.0)) {
        let snapshot = values.clone();
        let _ = normalize(&values, &criteria(&costs), NormalizationMethod::Sum);
        prop_assert_eq!(values, snapshot);
    }
}
