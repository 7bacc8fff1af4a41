//! Closed enums describing how a criterion is read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Whether larger or smaller values of a criterion are better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationType {
    /// Benefit criterion: higher is better.
    #[default]
    Maximize,
    /// Cost criterion: lower is better.
    Minimize,
}

impl OptimizationType {
    /// Returns true for benefit criteria.
    pub fn is_benefit(&self) -> bool {
        matches!(self, OptimizationType::Maximize)
    }

    /// Returns true for cost criteria.
    pub fn is_cost(&self) -> bool {
        matches!(self, OptimizationType::Minimize)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationType::Maximize => "maximize",
            OptimizationType::Minimize => "minimize",
        }
    }
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maximize" => Ok(OptimizationType::Maximize),
            "minimize" => Ok(OptimizationType::Minimize),
            other => Err(ValidationError::invalid_format(
                "optimization_type",
                format!("expected 'maximize' or 'minimize', got '{}'", other),
            )),
        }
    }
}

/// Measurement scale of a criterion. Informational; no algorithm branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Quantitative,
    Qualitative,
    Fuzzy,
}

impl ScaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleType::Quantitative => "quantitative",
            ScaleType::Qualitative => "qualitative",
            ScaleType::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quantitative" => Ok(ScaleType::Quantitative),
            "qualitative" => Ok(ScaleType::Qualitative),
            "fuzzy" => Ok(ScaleType::Fuzzy),
            other => Err(ValidationError::invalid_format(
                "scale_type",
                format!("unknown scale '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimization_type_predicates() {
        assert!(OptimizationType::Maximize.is_benefit());
        assert!(!OptimizationType::Maximize.is_cost());
        assert!(OptimizationType::Minimize.is_cost());
    }

    #[test]
    fn optimization_type_serializes_lowercase() {
        let json = serde_json::to_string(&OptimizationType::Minimize).unwrap();
        assert_eq!(json, "\"minimize\"");

        let parsed: OptimizationType = serde_json::from_str("\"maximize\"").unwrap();
        assert_eq!(parsed, OptimizationType::Maximize);
    }

    #[test]
    fn optimization_type_parses_case_insensitively() {
        assert_eq!("MINIMIZE".parse::<OptimizationType>().unwrap(), OptimizationType::Minimize);
        assert!("lower".parse::<OptimizationType>().is_err());
    }

    #[test]
    fn scale_type_round_trips() {
        for scale in [ScaleType::Quantitative, ScaleType::Qualitative, ScaleType::Fuzzy] {
            assert_eq!(scale.as_str().parse::<ScaleType>().unwrap(), scale);
        }
    }

    #[test]
    fn scale_type_rejects_unknown() {
        let err = "ordinal".parse::<ScaleType>().unwrap_err();
        assert!(err.message.contains("scale_type"));
    }
}
