//! MCDM Engine - multi-criteria decision making.
//!
//! This crate ranks decision alternatives evaluated against several weighted,
//! possibly conflicting criteria with four standard methods: TOPSIS, AHP,
//! ELECTRE and PROMETHEE.
//!
//! # Example
//!
//! ```
//! use mcdm_engine::application::DecisionService;
//! use mcdm_engine::config::AnalysisConfig;
//! use mcdm_engine::domain::matrix::{Alternative, Criterion, DecisionMatrix};
//!
//! let matrix = DecisionMatrix::new(
//!     "Laptops",
//!     vec![Alternative::new("a", "Light"), Alternative::new("b", "Cheap")],
//!     vec![
//!         Criterion::new("weight", "Weight").minimize(),
//!         Criterion::new("price", "Price").minimize(),
//!     ],
//!     vec![vec![1.2, 1500.0], vec![2.1, 800.0]],
//! )
//! .unwrap();
//!
//! let service = DecisionService::with_builtin_methods(AnalysisConfig::default());
//! let result = service.execute_method(&matrix, "TOPSIS", None).unwrap();
//! assert_eq!(result.scores().len(), 2);
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod telemetry;
