//! Analysis module - the ranking methods and what they share.
//!
//! Every method is a stateless unit struct implementing [`McdmMethod`]. A
//! method reads its settings from a JSON parameter object through
//! [`ParameterReader`], ranks the alternatives of a [`DecisionMatrix`], and
//! returns an [`AnalysisResult`] carrying scores, competition rankings and
//! method-specific metadata.
//!
//! # Methods
//!
//! - `TopsisMethod` - closeness to the ideal solution
//! - `AhpMethod` - pairwise comparison priorities with consistency checks
//! - `ElectreMethod` - concordance/discordance outranking (variants I and III)
//! - `PrometheeMethod` - preference flows (variants I and II)
//!
//! [`DecisionMatrix`]: crate::domain::matrix::DecisionMatrix

mod ahp;
mod electre;
mod method;
pub mod normalization;
pub mod pairwise;
mod parameters;
pub mod preference_function;
mod promethee;
mod result;
mod topsis;

pub use ahp::{AhpConfig, AhpMethod};
pub use electre::{ElectreConfig, ElectreMethod, ElectreVariant, ScoringMethod};
pub use method::McdmMethod;
pub use normalization::NormalizationMethod;
pub use parameters::{
    invalid_parameters, merge_parameters, parameters_from_value, ParameterReader, Parameters,
};
pub use preference_function::{PreferenceFunction, PreferenceThresholds};
pub use promethee::{Flows, PrometheeConfig, PrometheeMethod, PrometheeVariant};
pub use result::{
    competition_ranking, AlternativeComparison, AnalysisResult, ExecutionResponse,
    RankedAlternative,
};
pub use topsis::{DistanceMetric, TopsisConfig, TopsisMethod};
