//! DecisionService - entry point for running and comparing analyses.
//!
//! The service resolves methods through a [`MethodRegistry`] and layers
//! parameters in three stages: the method's built-in defaults, the
//! engine-wide defaults from [`AnalysisConfig`], then the caller's keys.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::comparison::{compare_results, MethodComparison};
use super::method_registry::{MethodInfo, MethodRegistry};
use super::requests::ExecutionRequest;
use super::sensitivity::{weight_sweep, SensitivityReport};
use crate::config::AnalysisConfig;
use crate::domain::analysis::{
    merge_parameters, AnalysisResult, ExecutionResponse, McdmMethod, Parameters,
};
use crate::domain::foundation::{CriterionId, McdmError};
use crate::domain::matrix::DecisionMatrix;

/// Parameter key switching AHP inconsistency from a warning to an error.
const STRICT_CONSISTENCY_KEY: &str = "strict_consistency";

/// Synchronous façade over the registry and the analysis helpers.
#[derive(Clone)]
pub struct DecisionService {
    registry: Arc<MethodRegistry>,
    config: AnalysisConfig,
}

impl DecisionService {
    pub fn new(registry: Arc<MethodRegistry>, config: AnalysisConfig) -> Self {
        Self { registry, config }
    }

    /// A service over a private registry of the built-in methods.
    pub fn with_builtin_methods(config: AnalysisConfig) -> Self {
        Self::new(Arc::new(MethodRegistry::with_builtin_methods()), config)
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn available_methods(&self) -> Result<Vec<String>, McdmError> {
        self.registry.available_methods()
    }

    pub fn method_info(&self, name: &str) -> Result<MethodInfo, McdmError> {
        self.registry.method_info(name)
    }

    /// Parameters handed to `method`: configured defaults, then `params`.
    fn layered_parameters(&self, method: &dyn McdmMethod, params: Option<&Parameters>) -> Parameters {
        let mut layered = self
            .config
            .defaults_for(method.name())
            .cloned()
            .unwrap_or_default();

        if self.config.strict_consistency
            && method.default_parameters().contains_key(STRICT_CONSISTENCY_KEY)
            && !layered.contains_key(STRICT_CONSISTENCY_KEY)
        {
            layered.insert(STRICT_CONSISTENCY_KEY.to_string(), Value::Bool(true));
        }

        match params {
            Some(p) => merge_parameters(&layered, p),
            None => layered,
        }
    }

    /// Runs one method over `matrix` and records its execution time.
    ///
    /// # Errors
    ///
    /// Unknown methods, invalid parameters, and method failures, unchanged.
    pub fn execute_method(
        &self,
        matrix: &DecisionMatrix,
        method_name: &str,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError> {
        let method = self.registry.create(method_name)?;
        let layered = self.layered_parameters(method.as_ref(), params);
        method.run_with_timing(matrix, Some(&layered))
    }

    /// Validates the request's matrix, runs the method and shapes the response.
    pub fn execute_request(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, McdmError> {
        let matrix = request.decision_matrix.to_matrix()?;
        let result = self.execute_method(&matrix, &request.method_name, request.parameters.as_ref())?;
        Ok(result.to_response())
    }

    /// Runs every registered method, in name order.
    ///
    /// `params` is keyed by method name (case-insensitive). Failing methods
    /// are skipped; when some failed, each successful result carries the
    /// failures under `execution_errors`.
    ///
    /// # Errors
    ///
    /// Fails only when no method succeeded.
    pub fn execute_all_methods(
        &self,
        matrix: &DecisionMatrix,
        params: &HashMap<String, Parameters>,
    ) -> Result<Vec<AnalysisResult>, McdmError> {
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for name in self.available_methods()? {
            let method_params = params
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&name))
                .map(|(_, p)| p);

            match self.execute_method(matrix, &name, method_params) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(method = %name, error = %e, "Method failed during batch execution");
                    errors.push(format!("{}: {}", name, e));
                }
            }
        }

        if results.is_empty() {
            return Err(McdmError::method(
                "ALL",
                format!("Could not execute any MCDM method: {}", errors.join("; ")),
            ));
        }

        if !errors.is_empty() {
            for result in &mut results {
                result.set_metadata("execution_errors", errors.clone());
            }
        }

        debug!(
            succeeded = results.len(),
            failed = errors.len(),
            "Batch execution finished"
        );
        Ok(results)
    }

    /// Rank correlation and consensus across `results`.
    pub fn compare_methods(&self, results: &[AnalysisResult]) -> Result<MethodComparison, McdmError> {
        compare_results(results)
    }

    /// Sweeps the weight of one criterion and reports how rankings respond.
    pub fn sensitivity_analysis(
        &self,
        matrix: &DecisionMatrix,
        method_name: &str,
        criterion_id: &CriterionId,
        weight_range: (f64, f64),
        steps: usize,
    ) -> Result<SensitivityReport, McdmError> {
        let method = self.registry.create(method_name)?;
        let layered = self.layered_parameters(method.as_ref(), None);
        weight_sweep(
            method.as_ref(),
            matrix,
            criterion_id,
            weight_range,
            steps,
            Some(&layered),
        )
    }
}
