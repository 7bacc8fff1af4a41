//! End-to-end tests: matrices in, rankings out, through the public API.

use mcdm_engine::application::{DecisionService, ExecutionRequest};
use mcdm_engine::config::AnalysisConfig;
use mcdm_engine::domain::analysis::{
    parameters_from_value, AhpMethod, McdmMethod, Parameters, TopsisMethod,
};
use mcdm_engine::domain::matrix::{Alternative, Criterion, DecisionMatrix};
use serde_json::{json, Value};

fn cars() -> DecisionMatrix {
    DecisionMatrix::new(
        "Cars",
        vec![
            Alternative::new("sedan", "Sedan"),
            Alternative::new("suv", "SUV"),
            Alternative::new("hatch", "Hatchback"),
        ],
        vec![
            Criterion::new("price", "Price").minimize().with_unit("EUR"),
            Criterion::new("comfort", "Comfort"),
            Criterion::new("economy", "Economy").with_unit("km/l"),
            Criterion::new("safety", "Safety"),
        ],
        vec![
            vec![25_000.0, 7.0, 15.0, 4.0],
            vec![40_000.0, 9.0, 10.0, 5.0],
            vec![18_000.0, 5.0, 18.0, 3.0],
        ],
    )
    .unwrap()
}

fn ahp_direct_params() -> Parameters {
    parameters_from_value(json!({
        "criteria_comparison_matrix": [
            [1.0, 3.0, 5.0, 1.0],
            [1.0 / 3.0, 1.0, 2.0, 1.0 / 3.0],
            [0.2, 0.5, 1.0, 0.2],
            [1.0, 3.0, 5.0, 1.0]
        ],
        "use_pairwise_comparison_for_alternatives": false
    }))
}

fn floats(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn ahp_direct_path_is_deterministic() {
    let matrix = cars();
    let params = ahp_direct_params();

    let first = AhpMethod.execute(&matrix, Some(&params)).unwrap();
    let weights = floats(&first.metadata()["criteria_weights"]);
    let expected_weights = [0.393_618, 0.137_474, 0.075_290, 0.393_618];
    for (w, e) in weights.iter().zip(expected_weights) {
        assert!((w - e).abs() < 1e-5, "weight {} vs {}", w, e);
    }
    assert_eq!(first.metadata()["consistency"]["is_consistent"], true);

    let expected_scores = [0.580_978, 0.531_092, 0.468_908];
    for (s, e) in first.scores().iter().zip(expected_scores) {
        assert!((s - e).abs() < 1e-5, "score {} vs {}", s, e);
    }
    assert_eq!(first.rankings(), &[1, 2, 3]);

    for _ in 0..5 {
        let again = AhpMethod.execute(&matrix, Some(&params)).unwrap();
        assert_eq!(again.scores(), first.scores());
        assert_eq!(again.rankings(), first.rankings());
    }
}

#[test]
fn consistent_judgments_recover_weight_ratios() {
    let matrix = DecisionMatrix::unnamed(
        vec![Alternative::new("a", "A"), Alternative::new("b", "B")],
        vec![
            Criterion::new("x", "X"),
            Criterion::new("y", "Y"),
            Criterion::new("z", "Z"),
        ],
        vec![vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]],
    )
    .unwrap();
    let params = parameters_from_value(json!({
        "criteria_comparison_matrix": [
            [1.0, 2.0, 3.0],
            [0.5, 1.0, 1.5],
            [1.0 / 3.0, 2.0 / 3.0, 1.0]
        ],
        "use_pairwise_comparison_for_alternatives": false
    }));

    let result = AhpMethod.execute(&matrix, Some(&params)).unwrap();
    let w = floats(&result.metadata()["criteria_weights"]);
    assert!((w[0] / w[1] - 2.0).abs() < 1e-3);
    assert!((w[0] / w[2] - 3.0).abs() < 1e-3);
    assert!((w[1] / w[2] - 1.5).abs() < 1e-3);

    let cr = result.metadata()["consistency"]["consistency_ratio"]
        .as_f64()
        .unwrap();
    assert!(cr.abs() < 1e-9);
}

#[test]
fn topsis_ideal_alternatives_hit_the_bounds() {
    let matrix = DecisionMatrix::unnamed(
        vec![
            Alternative::new("best", "Best"),
            Alternative::new("mid", "Middle"),
            Alternative::new("worst", "Worst"),
        ],
        vec![Criterion::new("q", "Quality"), Criterion::new("p", "Price").minimize()],
        vec![vec![9.0, 10.0], vec![5.0, 20.0], vec![1.0, 30.0]],
    )
    .unwrap();

    let result = TopsisMethod.execute(&matrix, None).unwrap();
    assert!((result.scores()[0] - 1.0).abs() < 1e-12);
    assert!(result.scores()[2].abs() < 1e-12);
    assert_eq!(result.best_alternative().unwrap().id.as_str(), "best");
    assert_eq!(result.worst_alternative().unwrap().id.as_str(), "worst");
}

#[test]
fn json_request_produces_json_response() {
    let request: ExecutionRequest = serde_json::from_value(json!({
        "method_name": "Elimination Et Choix Traduisant la Realite",
        "decision_matrix": {
            "name": "Suppliers",
            "alternatives": [
                {"id": "s1", "name": "Supplier 1"},
                {"id": "s2", "name": "Supplier 2"},
                {"id": "s3", "name": "Supplier 3"}
            ],
            "criteria": [
                {"id": "quality", "name": "Quality", "weight": 2.0},
                {"id": "cost", "name": "Cost", "optimization_type": "minimize"}
            ],
            "values": [[8.0, 100.0], [6.0, 120.0], [9.0, 150.0]]
        },
        "parameters": {"scoring_method": "net_flow"}
    }))
    .unwrap();

    let service = DecisionService::with_builtin_methods(AnalysisConfig::default());
    let response = service.execute_request(&request).unwrap();
    assert_eq!(response.method_name, "ELECTRE");
    assert_eq!(response.metadata["ranking_is_projection"], true);

    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire["sorted_alternatives"].as_array().unwrap().len(), 3);
    assert!(wire["execution_time"].as_f64().unwrap() >= 0.0);
    // s2 is weakly dominated by s1 and never outranks anyone.
    let last = &wire["sorted_alternatives"][2];
    assert_eq!(last["id"], "s2");
}

#[test]
fn invalid_matrix_in_request_reports_every_problem() {
    let request: ExecutionRequest = serde_json::from_value(json!({
        "method_name": "TOPSIS",
        "decision_matrix": {
            "alternatives": [{"id": "a", "name": "A"}, {"id": "a", "name": "A2"}],
            "criteria": [{"id": "x", "name": "X", "weight": -1.0}],
            "values": [[1.0], [2.0, 3.0]]
        }
    }))
    .unwrap();

    let service = DecisionService::with_builtin_methods(AnalysisConfig::default());
    let err = service.execute_request(&request).unwrap_err();
    let validation = err.as_validation().unwrap();
    // duplicate id, negative weight, row 1 length
    assert_eq!(validation.errors.len(), 3);
}
