//! Method parameters and their error-collecting reader.
//!
//! Parameters travel as an open JSON object. Each method reads the keys it
//! knows into a typed config through a [`ParameterReader`], which records a
//! message for every bad field and hands back the default in its place, so a
//! single pass reports all problems at once.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::domain::foundation::{ErrorCode, McdmError, ValidationError};

/// Open parameter object: scalars, enum strings, matrices and per-criterion maps.
pub type Parameters = Map<String, Value>;

/// Unwraps a JSON object into parameters; any other value yields an empty set.
pub fn parameters_from_value(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        _ => Parameters::new(),
    }
}

/// Overlays `overrides` onto `base`, key by key.
pub fn merge_parameters(base: &Parameters, overrides: &Parameters) -> Parameters {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Builds the error returned when a method rejects its parameters.
pub fn invalid_parameters(method: &str, errors: Vec<String>) -> McdmError {
    ValidationError::with_errors(format!("Invalid parameters for method {}", method), errors)
        .with_code(ErrorCode::InvalidParameters)
        .into()
}

/// Reads typed values out of a parameter object, collecting every failure.
///
/// A missing key or an explicit `null` yields the default without error.
pub struct ParameterReader<'a> {
    params: &'a Parameters,
    errors: Vec<String>,
}

impl<'a> ParameterReader<'a> {
    pub fn new(params: &'a Parameters) -> Self {
        Self {
            params,
            errors: Vec::new(),
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        match self.params.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// Records a failure that the typed accessors cannot express.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn bool(&mut self, key: &str, default: bool) -> bool {
        match self.present(key) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.push_error(format!("Parameter '{}' must be a boolean", key));
                default
            }
        }
    }

    pub fn number(&mut self, key: &str, default: f64) -> f64 {
        match self.present(key) {
            None => default,
            Some(value) => match value.as_f64().filter(|v| v.is_finite()) {
                Some(v) => v,
                None => {
                    self.push_error(format!("Parameter '{}' must be a finite number", key));
                    default
                }
            },
        }
    }

    /// Reads a number in the closed range `[min, max]`.
    pub fn number_in(&mut self, key: &str, default: f64, min: f64, max: f64) -> f64 {
        let before = self.errors.len();
        let v = self.number(key, default);
        if self.errors.len() > before {
            return default;
        }
        if v < min || v > max {
            self.push_error(format!(
                "Parameter '{}' must be between {} and {}, got {}",
                key, min, max, v
            ));
            return default;
        }
        v
    }

    /// Reads a strictly positive number.
    pub fn positive(&mut self, key: &str, default: f64) -> f64 {
        let before = self.errors.len();
        let v = self.number(key, default);
        if self.errors.len() > before {
            return default;
        }
        if v <= 0.0 {
            self.push_error(format!("Parameter '{}' must be greater than 0, got {}", key, v));
            return default;
        }
        v
    }

    /// Reads a number that must be zero or more.
    pub fn non_negative(&mut self, key: &str, default: f64) -> f64 {
        let before = self.errors.len();
        let v = self.number(key, default);
        if self.errors.len() > before {
            return default;
        }
        if v < 0.0 {
            self.push_error(format!("Parameter '{}' must be >= 0, got {}", key, v));
            return default;
        }
        v
    }

    pub fn string(&mut self, key: &str, default: &str) -> String {
        match self.present(key) {
            None => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.push_error(format!("Parameter '{}' must be a string", key));
                default.to_string()
            }
        }
    }

    /// Reads an enum-like string through `parse`; `valid` names the accepted keys.
    pub fn choice<T>(
        &mut self,
        key: &str,
        default: T,
        valid: &[&str],
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        match self.present(key) {
            None => default,
            Some(Value::String(s)) => match parse(s) {
                Some(v) => v,
                None => {
                    self.push_error(format!(
                        "Parameter '{}' must be one of [{}], got '{}'",
                        key,
                        valid.join(", "),
                        s
                    ));
                    default
                }
            },
            Some(_) => {
                self.push_error(format!(
                    "Parameter '{}' must be one of [{}]",
                    key,
                    valid.join(", ")
                ));
                default
            }
        }
    }

    /// Reads an optional square-or-rectangular numeric matrix (array of arrays).
    pub fn matrix(&mut self, key: &str) -> Option<Vec<Vec<f64>>> {
        let value = self.present(key)?;
        match value_to_matrix(value) {
            Some(m) => Some(m),
            None => {
                self.push_error(format!(
                    "Parameter '{}' must be a matrix of finite numbers",
                    key
                ));
                None
            }
        }
    }

    /// Reads an optional list of matrices; `null` entries stay `None`.
    pub fn matrices(&mut self, key: &str) -> Option<Vec<Option<Vec<Vec<f64>>>>> {
        let value = self.present(key)?;
        let Some(items) = value.as_array() else {
            self.push_error(format!("Parameter '{}' must be a list of matrices", key));
            return None;
        };

        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            if item.is_null() {
                out.push(None);
                continue;
            }
            match value_to_matrix(item) {
                Some(m) => out.push(Some(m)),
                None => {
                    ok = false;
                    self.push_error(format!(
                        "Parameter '{}' entry {} must be a matrix of finite numbers",
                        key, idx
                    ));
                }
            }
        }
        ok.then_some(out)
    }

    /// Reads an optional map of non-negative numbers keyed by criterion id.
    pub fn threshold_map(&mut self, key: &str) -> HashMap<String, f64> {
        let Some(value) = self.present(key) else {
            return HashMap::new();
        };
        let Some(object) = value.as_object() else {
            self.push_error(format!("Parameter '{}' must be an object", key));
            return HashMap::new();
        };

        let mut out = HashMap::new();
        for (name, v) in object {
            match v.as_f64().filter(|x| x.is_finite() && *x >= 0.0) {
                Some(x) => {
                    out.insert(name.clone(), x);
                }
                None => self.push_error(format!(
                    "Parameter '{}' entry '{}' must be a finite number >= 0",
                    key, name
                )),
            }
        }
        out
    }

    /// Reads an optional map of strings keyed by criterion id.
    pub fn name_map(&mut self, key: &str) -> HashMap<String, String> {
        let Some(value) = self.present(key) else {
            return HashMap::new();
        };
        let Some(object) = value.as_object() else {
            self.push_error(format!("Parameter '{}' must be an object", key));
            return HashMap::new();
        };

        let mut out = HashMap::new();
        for (name, v) in object {
            match v.as_str() {
                Some(s) => {
                    out.insert(name.clone(), s.to_string());
                }
                None => self.push_error(format!(
                    "Parameter '{}' entry '{}' must be a string",
                    key, name
                )),
            }
        }
        out
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `value` when no error was recorded, every message otherwise.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<String>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn value_to_matrix(value: &Value) -> Option<Vec<Vec<f64>>> {
    value
        .as_array()?
        .iter()
        .map(|row| {
            row.as_array()?
                .iter()
                .map(|cell| cell.as_f64().filter(|x| x.is_finite()))
                .collect::<Option<Vec<f64>>>()
        })
        .collect()
}
