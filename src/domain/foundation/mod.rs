//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the decision engine.

mod criterion_direction;
mod errors;
mod ids;
mod timestamp;

pub use criterion_direction::{OptimizationType, ScaleType};
pub use errors::{ErrorCode, McdmError, ValidationError};
pub use ids::{AlternativeId, AnalysisId, CriterionId};
pub use timestamp::Timestamp;
