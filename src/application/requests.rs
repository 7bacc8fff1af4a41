//! Request payloads accepted by the decision service.

use serde::{Deserialize, Serialize};

use crate::domain::analysis::Parameters;
use crate::domain::foundation::ValidationError;
use crate::domain::matrix::{Alternative, Criterion, DecisionMatrix, DEFAULT_MATRIX_NAME};

/// Unvalidated decision matrix as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixPayload {
    #[serde(default)]
    pub name: Option<String>,
    pub alternatives: Vec<Alternative>,
    pub criteria: Vec<Criterion>,
    pub values: Vec<Vec<f64>>,
}

impl MatrixPayload {
    /// Validates the payload into a decision matrix.
    pub fn to_matrix(&self) -> Result<DecisionMatrix, ValidationError> {
        DecisionMatrix::new(
            self.name.clone().unwrap_or_else(|| DEFAULT_MATRIX_NAME.to_string()),
            self.alternatives.clone(),
            self.criteria.clone(),
            self.values.clone(),
        )
    }
}

impl From<&DecisionMatrix> for MatrixPayload {
    fn from(matrix: &DecisionMatrix) -> Self {
        Self {
            name: Some(matrix.name().to_string()),
            alternatives: matrix.alternatives().to_vec(),
            criteria: matrix.criteria().to_vec(),
            values: matrix.values().to_vec(),
        }
    }
}

/// Run one method over one matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub method_name: String,
    pub decision_matrix: MatrixPayload,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}
