//! Criterion entity - one axis alternatives are judged on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{CriterionId, OptimizationType, ScaleType, ValidationError};

/// A weighted evaluation dimension with a direction of preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    id: CriterionId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    optimization_type: OptimizationType,
    #[serde(default)]
    scale_type: ScaleType,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

fn default_weight() -> f64 {
    1.0
}

impl Criterion {
    /// Creates a benefit criterion on a quantitative scale with weight 1.
    pub fn new(id: impl Into<CriterionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            optimization_type: OptimizationType::Maximize,
            scale_type: ScaleType::Quantitative,
            weight: default_weight(),
            unit: String::new(),
            metadata: Map::new(),
        }
    }

    pub fn with_optimization(mut self, optimization_type: OptimizationType) -> Self {
        self.optimization_type = optimization_type;
        self
    }

    /// Shorthand for `with_optimization(OptimizationType::Minimize)`.
    pub fn minimize(self) -> Self {
        self.with_optimization(OptimizationType::Minimize)
    }

    pub fn with_scale(mut self, scale_type: ScaleType) -> Self {
        self.scale_type = scale_type;
        self
    }

    /// Sets the weight without checking it; the matrix validator reports bad weights.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &CriterionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn optimization_type(&self) -> OptimizationType {
        self.optimization_type
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Updates the weight.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the weight is negative or not finite.
    pub fn set_weight(&mut self, weight: f64) -> Result<(), ValidationError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValidationError::invalid_format(
                "weight",
                format!("must be a finite value >= 0, got {}", weight),
            ));
        }
        self.weight = weight;
        Ok(())
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_benefit(&self) -> bool {
        self.optimization_type.is_benefit()
    }

    pub fn is_cost(&self) -> bool {
        self.optimization_type.is_cost()
    }

    /// Returns a copy of the metadata; mutating it does not affect the criterion.
    pub fn metadata(&self) -> Map<String, Value> {
        self.metadata.clone()
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_criterion_is_benefit_with_unit_weight() {
        let c = Criterion::new("quality", "Quality");
        assert!(c.is_benefit());
        assert_eq!(c.weight(), 1.0);
        assert_eq!(c.scale_type(), ScaleType::Quantitative);
    }

    #[test]
    fn minimize_makes_cost_criterion() {
        let c = Criterion::new("price", "Price").minimize();
        assert!(c.is_cost());
        assert!(!c.is_benefit());
    }

    #[test]
    fn set_weight_rejects_negative() {
        let mut c = Criterion::new("price", "Price");
        assert!(c.set_weight(-0.5).is_err());
        assert!(c.set_weight(f64::NAN).is_err());
        assert!(c.set_weight(0.0).is_ok());
        assert_eq!(c.weight(), 0.0);
    }

    #[test]
    fn deserializes_lowercase_enums() {
        let c: Criterion = serde_json::from_value(json!({
            "id": "cost",
            "name": "Cost",
            "optimization_type": "minimize",
            "scale_type": "fuzzy",
            "weight": 0.4
        }))
        .unwrap();

        assert!(c.is_cost());
        assert_eq!(c.scale_type(), ScaleType::Fuzzy);
        assert_eq!(c.weight(), 0.4);
    }

    #[test]
    fn metadata_returns_defensive_copy() {
        let c = Criterion::new("q", "Q").with_metadata("source", "survey");
        let mut copy = c.metadata();
        copy.clear();
        assert_eq!(c.get_metadata("source"), Some(&json!("survey")));
    }
}
