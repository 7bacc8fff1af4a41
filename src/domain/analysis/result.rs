//! AnalysisResult - scores and rankings produced by one method run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Parameters;
use crate::domain::foundation::{AlternativeId, AnalysisId, McdmError, Timestamp, ValidationError};
use crate::domain::matrix::DecisionMatrix;

/// One alternative's standing within a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    pub id: AlternativeId,
    pub name: String,
    pub score: f64,
    pub ranking: usize,
}

/// Side-by-side view of two alternatives from the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeComparison {
    pub alternative_a: RankedAlternative,
    pub alternative_b: RankedAlternative,
    /// `score_a - score_b`.
    pub score_difference: f64,
    /// `ranking_b - ranking_a`; positive when `a` ranks better.
    pub ranking_difference: i64,
    /// `None` when both score the same.
    pub better_alternative: Option<AlternativeId>,
}

/// Wire shape of a completed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub method_name: String,
    pub scores: Vec<f64>,
    pub sorted_alternatives: Vec<RankedAlternative>,
    pub metadata: Map<String, Value>,
    pub execution_time: f64,
}

/// Output of one method execution: index-aligned scores, ranks and metadata.
///
/// Higher score is better. Ranks use competition ranking: tied scores share
/// the best rank and the next distinct score skips accordingly (1, 1, 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    id: AnalysisId,
    method_name: String,
    alternative_ids: Vec<AlternativeId>,
    alternative_names: Vec<String>,
    scores: Vec<f64>,
    rankings: Vec<usize>,
    parameters: Parameters,
    metadata: Map<String, Value>,
    execution_time: f64,
    created_at: Timestamp,
}

impl AnalysisResult {
    /// Creates a result and derives its rankings.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the ids, names and scores differ in
    /// length or a score is not finite.
    pub fn new(
        method_name: impl Into<String>,
        alternative_ids: Vec<AlternativeId>,
        alternative_names: Vec<String>,
        scores: Vec<f64>,
        parameters: Parameters,
    ) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        if alternative_ids.len() != scores.len() || alternative_names.len() != scores.len() {
            errors.push(format!(
                "Expected matching lengths, got {} ids, {} names and {} scores",
                alternative_ids.len(),
                alternative_names.len(),
                scores.len()
            ));
        }
        for (i, s) in scores.iter().enumerate() {
            if !s.is_finite() {
                errors.push(format!("Score {} is not finite: {}", i, s));
            }
        }
        if !errors.is_empty() {
            return Err(ValidationError::with_errors("Invalid analysis result", errors));
        }

        let rankings = competition_ranking(&scores);
        Ok(Self {
            id: AnalysisId::new(),
            method_name: method_name.into(),
            alternative_ids,
            alternative_names,
            scores,
            rankings,
            parameters,
            metadata: Map::new(),
            execution_time: 0.0,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a result for the alternatives of `matrix`, in matrix order.
    pub fn for_matrix(
        method_name: impl Into<String>,
        matrix: &DecisionMatrix,
        scores: Vec<f64>,
        parameters: Parameters,
    ) -> Result<Self, McdmError> {
        Ok(Self::new(
            method_name,
            matrix.alternative_ids(),
            matrix.alternative_names(),
            scores,
            parameters,
        )?)
    }

    /// Replaces the metadata (builder style).
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> AnalysisId {
        self.id
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn alternative_ids(&self) -> &[AlternativeId] {
        &self.alternative_ids
    }

    pub fn alternative_names(&self) -> &[String] {
        &self.alternative_names
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn rankings(&self) -> &[usize] {
        &self.rankings
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    /// Records wall time in seconds, both on the field and in metadata.
    pub fn set_execution_time(&mut self, seconds: f64) {
        self.execution_time = seconds;
        self.metadata
            .insert("execution_time".to_string(), Value::from(seconds));
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn index_of(&self, id: &AlternativeId) -> Option<usize> {
        self.alternative_ids.iter().position(|a| a == id)
    }

    fn ranked(&self, idx: usize) -> RankedAlternative {
        RankedAlternative {
            id: self.alternative_ids[idx].clone(),
            name: self.alternative_names[idx].clone(),
            score: self.scores[idx],
            ranking: self.rankings[idx],
        }
    }

    /// Alternatives ordered best first; ties keep matrix order.
    pub fn sorted_alternatives(&self) -> Vec<RankedAlternative> {
        let mut order: Vec<usize> = (0..self.scores.len()).collect();
        order.sort_by(|&a, &b| self.scores[b].total_cmp(&self.scores[a]));
        order.into_iter().map(|idx| self.ranked(idx)).collect()
    }

    /// Highest-scoring alternative; the first one on ties.
    pub fn best_alternative(&self) -> Option<RankedAlternative> {
        let mut best: Option<usize> = None;
        for (i, s) in self.scores.iter().enumerate() {
            if best.map_or(true, |b| *s > self.scores[b]) {
                best = Some(i);
            }
        }
        best.map(|idx| self.ranked(idx))
    }

    /// Lowest-scoring alternative; the first one on ties.
    pub fn worst_alternative(&self) -> Option<RankedAlternative> {
        let mut worst: Option<usize> = None;
        for (i, s) in self.scores.iter().enumerate() {
            if worst.map_or(true, |w| *s < self.scores[w]) {
                worst = Some(i);
            }
        }
        worst.map(|idx| self.ranked(idx))
    }

    pub fn score_of(&self, id: &AlternativeId) -> Option<f64> {
        self.index_of(id).map(|idx| self.scores[idx])
    }

    pub fn ranking_of(&self, id: &AlternativeId) -> Option<usize> {
        self.index_of(id).map(|idx| self.rankings[idx])
    }

    pub fn alternative_info(&self, id: &AlternativeId) -> Option<RankedAlternative> {
        self.index_of(id).map(|idx| self.ranked(idx))
    }

    /// Compares two alternatives of this result.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming each id that is not in the result.
    pub fn compare_alternatives(
        &self,
        a: &AlternativeId,
        b: &AlternativeId,
    ) -> Result<AlternativeComparison, ValidationError> {
        let (idx_a, idx_b) = match (self.index_of(a), self.index_of(b)) {
            (Some(ia), Some(ib)) => (ia, ib),
            (ia, ib) => {
                let missing = [(a, ia), (b, ib)]
                    .into_iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(id, _)| format!("No alternative was found with ID: {}", id))
                    .collect();
                return Err(ValidationError::with_errors(
                    "Cannot compare alternatives",
                    missing,
                ));
            }
        };

        let info_a = self.ranked(idx_a);
        let info_b = self.ranked(idx_b);
        let better_alternative = if info_a.score > info_b.score {
            Some(info_a.id.clone())
        } else if info_b.score > info_a.score {
            Some(info_b.id.clone())
        } else {
            None
        };

        Ok(AlternativeComparison {
            score_difference: info_a.score - info_b.score,
            ranking_difference: info_b.ranking as i64 - info_a.ranking as i64,
            better_alternative,
            alternative_a: info_a,
            alternative_b: info_b,
        })
    }

    pub fn to_response(&self) -> ExecutionResponse {
        ExecutionResponse {
            method_name: self.method_name.clone(),
            scores: self.scores.clone(),
            sorted_alternatives: self.sorted_alternatives(),
            metadata: self.metadata.clone(),
            execution_time: self.execution_time,
        }
    }
}

/// Competition ranking of `scores`, higher is better, 1-based.
pub fn competition_ranking(scores: &[f64]) -> Vec<usize> {
    scores
        .iter()
        .map(|s| 1 + scores.iter().filter(|other| *other > s).count())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(scores: Vec<f64>) -> AnalysisResult {
        let ids = (0..scores.len())
            .map(|i| AlternativeId::new(format!("a{}", i)))
            .collect();
        let names = (0..scores.len()).map(|i| format!("Alt {}", i)).collect();
        AnalysisResult::new("TOPSIS", ids, names, scores, Parameters::new()).unwrap()
    }

    #[test]
    fn competition_ranking_shares_best_rank_on_ties() {
        assert_eq!(competition_ranking(&[0.9, 0.5, 0.9, 0.1]), vec![1, 3, 1, 4]);
    }

    #[test]
    fn new_rejects_mismatched_lengths_and_nan() {
        let err = AnalysisResult::new(
            "X",
            vec![AlternativeId::from("a")],
            vec!["A".to_string()],
            vec![f64::NAN, 1.0],
            Parameters::new(),
        )
        .unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn sorted_alternatives_is_descending_and_stable() {
        let r = result(vec![0.2, 0.8, 0.2]);
        let sorted: Vec<String> = r
            .sorted_alternatives()
            .into_iter()
            .map(|a| a.id.to_string())
            .collect();
        assert_eq!(sorted, vec!["a1", "a0", "a2"]);
    }

    #[test]
    fn best_and_worst() {
        let r = result(vec![0.2, 0.8, 0.1]);
        assert_eq!(r.best_alternative().unwrap().id.as_str(), "a1");
        assert_eq!(r.worst_alternative().unwrap().id.as_str(), "a2");
    }

    #[test]
    fn lookups_by_id() {
        let r = result(vec![0.2, 0.8]);
        let a0 = AlternativeId::from("a0");
        assert_eq!(r.score_of(&a0), Some(0.2));
        assert_eq!(r.ranking_of(&a0), Some(2));
        assert_eq!(r.alternative_info(&a0).unwrap().name, "Alt 0");
        assert!(r.score_of(&AlternativeId::from("zz")).is_none());
    }

    #[test]
    fn compare_alternatives_reports_differences() {
        let r = result(vec![0.2, 0.8]);
        let cmp = r
            .compare_alternatives(&AlternativeId::from("a1"), &AlternativeId::from("a0"))
            .unwrap();

        assert!((cmp.score_difference - 0.6).abs() < 1e-12);
        assert_eq!(cmp.ranking_difference, 1);
        assert_eq!(cmp.better_alternative, Some(AlternativeId::from("a1")));
    }

    #[test]
    fn compare_alternatives_names_missing_ids() {
        let r = result(vec![0.2, 0.8]);
        let err = r
            .compare_alternatives(&AlternativeId::from("x"), &AlternativeId::from("y"))
            .unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn execution_time_lands_in_field_and_metadata() {
        let mut r = result(vec![1.0]);
        r.set_execution_time(0.25);

        assert_eq!(r.execution_time(), 0.25);
        assert_eq!(r.metadata().get("execution_time"), Some(&Value::from(0.25)));
        assert_eq!(r.to_response().execution_time, 0.25);
    }
}
