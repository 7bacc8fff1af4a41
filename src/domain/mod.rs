//! Domain layer containing the decision model and the ranking methods.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, criterion direction, errors)
//! - `matrix` - Alternatives, criteria and the validated decision matrix
//! - `analysis` - Normalization, parameters, results and the MCDM methods

pub mod analysis;
pub mod foundation;
pub mod matrix;
