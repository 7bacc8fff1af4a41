//! Matrix module - the data a decision is made over.
//!
//! Alternatives and criteria are entities with fixed ids; the decision
//! matrix ties them to a validated table of performance values.

mod alternative;
mod criterion;
mod decision_matrix;
mod validator;

pub use alternative::Alternative;
pub use criterion::Criterion;
pub use decision_matrix::{normalize_weights, DecisionMatrix, DEFAULT_MATRIX_NAME};
pub use validator::MatrixValidator;
