//! The contract every ranking method implements.

use std::time::Instant;

use tracing::debug;

use super::{invalid_parameters, merge_parameters, AnalysisResult, Parameters};
use crate::domain::foundation::McdmError;
use crate::domain::matrix::DecisionMatrix;

/// A multi-criteria ranking method.
///
/// Implementations hold no per-call state, so one instance can serve any
/// number of threads. Parameters are resolved in two stages: the caller's
/// keys are laid over [`McdmMethod::default_parameters`], then the merged
/// object is validated as a whole.
pub trait McdmMethod: Send + Sync {
    /// Canonical short name, e.g. `TOPSIS`.
    fn name(&self) -> &str;

    fn full_name(&self) -> &str;

    fn description(&self) -> &str;

    /// Every parameter the method reads, with its default value.
    fn default_parameters(&self) -> Parameters;

    /// Returns one message per invalid field; empty when `params` is acceptable.
    ///
    /// Missing keys take their defaults.
    fn parameter_errors(&self, params: &Parameters) -> Vec<String>;

    fn validate_parameters(&self, params: &Parameters) -> bool {
        self.parameter_errors(params).is_empty()
    }

    /// Ranks the alternatives of `matrix`.
    ///
    /// # Errors
    ///
    /// - `McdmError::Validation` for bad parameters or parameter shapes
    /// - `McdmError::Method` when the computation itself cannot proceed
    fn execute(
        &self,
        matrix: &DecisionMatrix,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError>;

    /// Merges `params` over the defaults and validates the result.
    fn prepare_execution(&self, params: Option<&Parameters>) -> Result<Parameters, McdmError> {
        let effective = match params {
            Some(p) => merge_parameters(&self.default_parameters(), p),
            None => self.default_parameters(),
        };

        let errors = self.parameter_errors(&effective);
        if !errors.is_empty() {
            return Err(invalid_parameters(self.name(), errors));
        }
        Ok(effective)
    }

    /// Runs [`McdmMethod::execute`] and records its wall time in seconds.
    fn run_with_timing(
        &self,
        matrix: &DecisionMatrix,
        params: Option<&Parameters>,
    ) -> Result<AnalysisResult, McdmError> {
        let start = Instant::now();
        let mut result = self.execute(matrix, params)?;
        let elapsed = start.elapsed().as_secs_f64();
        result.set_execution_time(elapsed);

        debug!(
            method = %self.name(),
            alternatives = matrix.num_alternatives(),
            criteria = matrix.num_criteria(),
            elapsed_secs = elapsed,
            "Method execution finished"
        );
        Ok(result)
    }
}
