//! Alternative entity - one option being ranked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::AlternativeId;

/// A decision option evaluated against every criterion of a matrix.
///
/// The id is fixed at construction; name, description and metadata may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    id: AlternativeId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl Alternative {
    pub fn new(id: impl Into<AlternativeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            metadata: Map::new(),
        }
    }

    /// Sets the description (builder style).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds one metadata entry (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &AlternativeId {
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

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns a copy of the metadata; mutating it does not affect the alternative.
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
