//! In-memory [`VariableHost`], serializable so the CLI can keep host state in
//! a JSON store file between runs.
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{CollectionHandle, VariableHandle, VariableHost, VariableType, VariableValue};
use crate::error::HostError;

const DEFAULT_MODE_NAME: &str = "Mode 1";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryHost {
    next_id: u64,
    collections: Vec<StoredCollection>,
    variables: Vec<StoredVariable>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCollection {
    pub id: String,
    pub name: String,
    pub modes: Vec<Mode>,
    pub default_mode_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    pub mode_id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredVariable {
    pub id: String,
    pub name: String,
    pub variable_collection_id: String,
    pub resolved_type: VariableType,
    pub values_by_mode: IndexMap<String, VariableValue>,
}

// ------------------------------- Store file ------------------------------- //

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing file → empty host.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let source = std::fs::read_to_string(path)?;
        crate::path_de::from_str_with_path::<Self>(&source)
            .map_err(|e| HostError::Store(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), HostError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let source = serde_json::to_string_pretty(self)
            .map_err(|e| HostError::Store(e.to_string()))?;
        std::fs::write(path, source)?;
        Ok(())
    }

    // ------------------------------ Lookups ------------------------------- //

    pub fn collections(&self) -> &[StoredCollection] {
        &self.collections
    }

    pub fn variables(&self) -> &[StoredVariable] {
        &self.variables
    }

    pub fn variable(&self, id: &str) -> Option<&StoredVariable> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Default-mode value of a variable.
    pub fn default_value(&self, variable_id: &str) -> Option<&VariableValue> {
        let var = self.variable(variable_id)?;
        let collection = self.collection(&var.variable_collection_id)?;
        var.values_by_mode.get(&collection.default_mode_id)
    }

    fn collection(&self, id: &str) -> Option<&StoredCollection> {
        self.collections.iter().find(|c| c.id == id)
    }

    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}:{}", self.next_id)
    }
}

impl StoredCollection {
    fn handle(&self) -> CollectionHandle {
        CollectionHandle {
            id: self.id.clone(),
            name: self.name.clone(),
            default_mode_id: self.default_mode_id.clone(),
        }
    }
}

impl StoredVariable {
    fn handle(&self) -> VariableHandle {
        VariableHandle {
            id: self.id.clone(),
            name: self.name.clone(),
            variable_collection_id: self.variable_collection_id.clone(),
            resolved_type: self.resolved_type,
        }
    }
}

// ------------------------------- Host API --------------------------------- //

impl VariableHost for MemoryHost {
    fn create_collection(&mut self, name: &str) -> Result<CollectionHandle, HostError> {
        let id = self.mint("VariableCollectionId");
        let mode_id = self.mint("Mode");
        let collection = StoredCollection {
            id,
            name: name.to_string(),
            modes: vec![Mode { mode_id: mode_id.clone(), name: DEFAULT_MODE_NAME.to_string() }],
            default_mode_id: mode_id,
        };
        let handle = collection.handle();
        self.collections.push(collection);
        Ok(handle)
    }

    fn list_collections(&self) -> Result<Vec<CollectionHandle>, HostError> {
        Ok(self.collections.iter().map(StoredCollection::handle).collect())
    }

    fn list_variables(&self, collection_id: &str) -> Result<Vec<VariableHandle>, HostError> {
        if self.collection(collection_id).is_none() {
            return Err(HostError::UnknownCollection(collection_id.to_string()));
        }
        Ok(self
            .variables
            .iter()
            .filter(|v| v.variable_collection_id == collection_id)
            .map(StoredVariable::handle)
            .collect())
    }

    fn create_variable(
        &mut self,
        name: &str,
        collection_id: &str,
        resolved_type: VariableType,
    ) -> Result<VariableHandle, HostError> {
        if self.collection(collection_id).is_none() {
            return Err(HostError::UnknownCollection(collection_id.to_string()));
        }
        let variable = StoredVariable {
            id: self.mint("VariableID"),
            name: name.to_string(),
            variable_collection_id: collection_id.to_string(),
            resolved_type,
            values_by_mode: IndexMap::new(),
        };
        let handle = variable.handle();
        self.variables.push(variable);
        Ok(handle)
    }

    fn set_value(
        &mut self,
        variable_id: &str,
        mode_id: &str,
        value: VariableValue,
    ) -> Result<(), HostError> {
        let var = self
            .variables
            .iter()
            .find(|v| v.id == variable_id)
            .ok_or_else(|| HostError::UnknownVariable(variable_id.to_string()))?;
        let collection = self
            .collection(&var.variable_collection_id)
            .ok_or_else(|| HostError::UnknownCollection(var.variable_collection_id.clone()))?;
        if !collection.modes.iter().any(|m| m.mode_id == mode_id) {
            return Err(HostError::UnknownMode {
                collection: collection.id.clone(),
                mode: mode_id.to_string(),
            });
        }
        if let Some(found) = value.literal_type() {
            if found != var.resolved_type {
                return Err(HostError::TypeMismatch {
                    variable: var.name.clone(),
                    expected: var.resolved_type,
                    found,
                });
            }
        }
        if let Some(target) = value.alias_target() {
            if self.variable(target).is_none() {
                return Err(HostError::UnknownVariable(target.to_string()));
            }
        }
        if let Some(var) = self.variables.iter_mut().find(|v| v.id == variable_id) {
            var.values_by_mode.insert(mode_id.to_string(), value);
        }
        Ok(())
    }

    fn create_alias(&self, target_id: &str) -> Result<VariableValue, HostError> {
        match self.variable(target_id) {
            Some(var) => Ok(VariableValue::Alias { id: var.id.clone() }),
            None => Err(HostError::UnknownVariable(target_id.to_string())),
        }
    }
}
