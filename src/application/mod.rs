//! Application layer - registry, service façade and cross-method analysis.
//!
//! Everything here is synchronous and in-memory. The domain methods do the
//! ranking; this layer resolves them by name, layers configured defaults
//! under caller parameters, and compares or stress-tests their output.

mod comparison;
mod decision_service;
mod method_registry;
mod requests;
mod sensitivity;

pub use comparison::{
    compare_results, spearman_correlation, Consensus, MethodComparison, TopCount,
    CONSENSUS_TOP_K,
};
pub use decision_service::DecisionService;
pub use method_registry::{ConfiguredMethod, MethodConstructor, MethodInfo, MethodRegistry};
pub use requests::{ExecutionRequest, MatrixPayload};
pub use sensitivity::{
    analyze_stability, linspace, weight_sweep, RankChange, RankingStability, SensitivityReport,
    SweptCriterion,
};
