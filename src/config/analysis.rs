//! Analysis configuration

use std::collections::HashMap;

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::MethodRegistry;
use crate::domain::analysis::Parameters;

/// Engine-wide analysis settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Turn AHP consistency warnings into errors
    #[serde(default)]
    pub strict_consistency: bool,

    /// Default parameters per method, layered between a method's built-in
    /// defaults and the caller's parameters. Keys are method names or aliases.
    #[serde(default)]
    pub method_defaults: HashMap<String, Parameters>,
}

impl AnalysisConfig {
    /// Configured defaults for a canonical method name, if any.
    ///
    /// Lookup is case-insensitive since environment keys arrive lowercased.
    pub fn defaults_for(&self, method: &str) -> Option<&Parameters> {
        self.method_defaults
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(method))
            .map(|(_, params)| params)
    }

    /// Validate analysis configuration against the built-in methods
    pub fn validate(&self) -> Result<(), ValidationError> {
        let registry = MethodRegistry::global();

        let mut names: Vec<&String> = self.method_defaults.keys().collect();
        names.sort();
        for name in names {
            let method = registry
                .create(name)
                .map_err(|_| ValidationError::UnknownMethod(name.clone()))?;
            let errors = method.parameter_errors(&self.method_defaults[name]);
            if !errors.is_empty() {
                return Err(ValidationError::InvalidMethodDefaults {
                    method: method.name().to_string(),
                    errors,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::parameters_from_value;
    use serde_json::json;

    fn with_defaults(method: &str, params: serde_json::Value) -> AnalysisConfig {
        let mut method_defaults = HashMap::new();
        method_defaults.insert(method.to_string(), parameters_from_value(params));
        AnalysisConfig {
            strict_consistency: false,
            method_defaults,
        }
    }

    #[test]
    fn test_empty_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_lookup_ignores_case() {
        let config = with_defaults("topsis", json!({"distance_metric": "manhattan"}));
        assert!(config.defaults_for("TOPSIS").is_some());
        assert!(config.defaults_for("AHP").is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let config = with_defaults("vikor", json!({}));
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnknownMethod(name)) if name == "vikor"
        ));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let config = with_defaults("electre", json!({"concordance_threshold": 0.2}));
        match config.validate() {
            Err(ValidationError::InvalidMethodDefaults { method, errors }) => {
                assert_eq!(method, "ELECTRE");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected InvalidMethodDefaults, got {:?}", other),
        }
    }
}
