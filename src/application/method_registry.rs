//! MethodRegistry - name-keyed lookup of ranking methods.
//!
//! Names are case-insensitive. Each canonical name maps to a constructor;
//! an alias table maps full scientific names onto canonical ones. Built-in
//! methods are stateless, so a constructor just hands out a fresh `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::info;

use crate::domain::analysis::{
    invalid_parameters, merge_parameters, AhpMethod, AnalysisResult, ElectreMethod, McdmMethod,
    Parameters, PrometheeMethod, TopsisMethod,
};
use crate::domain::foundation::{ErrorCode, McdmError, ValidationError};
use crate::domain::matrix::DecisionMatrix;

/// Builds a method instance.
pub type MethodConstructor = fn() -> Arc<dyn McdmMethod>;

const BUILTIN_ALIASES: [(&str, &str); 5] = [
    ("TECHNIQUE FOR ORDER OF PREFERENCE BY SIMILARITY TO IDEAL SOLUTION", TopsisMethod::NAME),
    ("ANALYTIC HIERARCHY PROCESS", AhpMethod::NAME),
    ("ELIMINATION ET CHOIX TRADUISANT LA REALITE", ElectreMethod::NAME),
    ("ELIMINATION AND CHOICE EXPRESSING REALITY", ElectreMethod::NAME),
    (
        "PREFERENCE RANKING ORGANIZATION METHOD FOR ENRICHMENT OF EVALUATIONS",
        PrometheeMethod::NAME,
    ),
];

static GLOBAL_REGISTRY: Lazy<MethodRegistry> = Lazy::new(MethodRegistry::with_builtin_methods);

fn topsis() -> Arc<dyn McdmMethod> {
    Arc::new(TopsisMethod::new())
}

fn ahp() -> Arc<dyn McdmMethod> {
    Arc::new(AhpMethod::new())
}

fn electre() -> Arc<dyn McdmMethod> {
    Arc::new(ElectreMethod::new())
}

fn promethee() -> Arc<dyn McdmMethod> {
    Arc::new(PrometheeMethod::new())
}

/// Descriptive view of a registered method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub default_parameters: Parameters,
}

/// A method bound to an already merged and validated parameter set.
#[derive(Clone)]
pub struct ConfiguredMethod {
    method: Arc<dyn McdmMethod>,
    parameters: Parameters,
}

impl ConfiguredMethod {
    pub fn method(&self) -> &Arc<dyn McdmMethod> {
        &self.method
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Runs the method with the bound parameters, timing the execution.
    pub fn execute(&self, matrix: &DecisionMatrix) -> Result<AnalysisResult, McdmError> {
        self.method.run_with_timing(matrix, Some(&self.parameters))
    }
}

impl std::fmt::Debug for ConfiguredMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredMethod")
            .field("method", &self.method.name())
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[derive(Default)]
struct RegistryState {
    methods: HashMap<String, MethodConstructor>,
    aliases: HashMap<String, String>,
}

impl RegistryState {
    fn resolve(&self, name: &str) -> Option<MethodConstructor> {
        let key = normalize_key(name);
        let canonical = self.aliases.get(&key).unwrap_or(&key);
        self.methods.get(canonical).copied()
    }

    fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Thread-safe registry of ranking methods.
///
/// Lookups take a shared lock; registration takes the write lock once and
/// inserts only if the name is still free, so concurrent registrations of
/// the same name admit exactly one.
#[derive(Default)]
pub struct MethodRegistry {
    state: RwLock<RegistryState>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding TOPSIS, AHP, ELECTRE and PROMETHEE plus
    /// their full-name aliases.
    pub fn with_builtin_methods() -> Self {
        let mut state = RegistryState::default();
        let builtins: [(&str, MethodConstructor); 4] = [
            (TopsisMethod::NAME, topsis),
            (AhpMethod::NAME, ahp),
            (ElectreMethod::NAME, electre),
            (PrometheeMethod::NAME, promethee),
        ];
        for (name, constructor) in builtins {
            state.methods.insert(name.to_string(), constructor);
        }
        for (alias, canonical) in BUILTIN_ALIASES {
            state.aliases.insert(alias.to_string(), canonical.to_string());
        }

        Self {
            state: RwLock::new(state),
        }
    }

    /// The process-wide registry, pre-populated with the built-in methods.
    pub fn global() -> &'static MethodRegistry {
        &GLOBAL_REGISTRY
    }

    /// Instantiates a method by canonical name or alias.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` (code `UnknownMethod`) listing every
    /// registered canonical name when `name` resolves to nothing.
    pub fn create(&self, name: &str) -> Result<Arc<dyn McdmMethod>, McdmError> {
        let state = self.read()?;
        match state.resolve(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(ValidationError::with_errors(
                format!("Unknown method '{}'. Available methods", name),
                state.sorted_names(),
            )
            .with_code(ErrorCode::UnknownMethod)
            .into()),
        }
    }

    /// Instantiates a method and binds `params` merged over its defaults.
    ///
    /// # Errors
    ///
    /// Unknown names as [`MethodRegistry::create`]; invalid parameters as a
    /// `ValidationError` listing every bad field.
    pub fn create_with_params(
        &self,
        name: &str,
        params: Option<&Parameters>,
    ) -> Result<ConfiguredMethod, McdmError> {
        let method = self.create(name)?;
        let parameters = match params {
            Some(p) => merge_parameters(&method.default_parameters(), p),
            None => method.default_parameters(),
        };

        let errors = method.parameter_errors(&parameters);
        if !errors.is_empty() {
            return Err(invalid_parameters(method.name(), errors));
        }

        Ok(ConfiguredMethod { method, parameters })
    }

    /// Registers a new method under `name`.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if `name` is empty, or the implementation reports
    ///   an empty name or rejects its own default parameters
    /// - `ValidationError` (code `DuplicateRegistration`) if `name` is taken,
    ///   as a canonical name or an alias
    pub fn register(&self, name: &str, constructor: MethodConstructor) -> Result<(), McdmError> {
        let key = normalize_key(name);
        if key.is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }

        let probe = constructor();
        let mut contract_errors = Vec::new();
        if probe.name().trim().is_empty() {
            contract_errors.push("Method reports an empty name".to_string());
        }
        contract_errors.extend(
            probe
                .parameter_errors(&probe.default_parameters())
                .into_iter()
                .map(|e| format!("Default parameters rejected: {}", e)),
        );
        if !contract_errors.is_empty() {
            return Err(ValidationError::with_errors(
                format!("Method '{}' does not satisfy the method contract", name),
                contract_errors,
            )
            .into());
        }

        let mut state = self.write()?;
        if state.methods.contains_key(&key) || state.aliases.contains_key(&key) {
            return Err(ValidationError::new(format!("Method '{}' is already registered", key))
                .with_code(ErrorCode::DuplicateRegistration)
                .into());
        }
        state.methods.insert(key.clone(), constructor);
        drop(state);

        info!(method = %key, "Registered MCDM method");
        Ok(())
    }

    /// Canonical names, sorted.
    pub fn available_methods(&self) -> Result<Vec<String>, McdmError> {
        Ok(self.read()?.sorted_names())
    }

    /// Whether `name` (or an alias) resolves to a method.
    pub fn contains(&self, name: &str) -> bool {
        self.read()
            .map(|state| state.resolve(name).is_some())
            .unwrap_or(false)
    }

    pub fn method_info(&self, name: &str) -> Result<MethodInfo, McdmError> {
        let method = self.create(name)?;
        Ok(MethodInfo {
            name: method.name().to_string(),
            full_name: method.full_name().to_string(),
            description: method.description().to_string(),
            default_parameters: method.default_parameters(),
        })
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, RegistryState>, McdmError> {
        self.state
            .read()
            .map_err(|_| McdmError::Internal("Method registry lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, RegistryState>, McdmError> {
        self.state
            .write()
            .map_err(|_| McdmError::Internal("Method registry lock poisoned".to_string()))
    }
}
