//! The narrow slice of the design tool's variables API the importer needs.
//!
//! The importer never touches host globals; everything flows through
//! [`VariableHost`], so tests and the CLI run against [`MemoryHost`].
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

pub use memory::MemoryHost;

// ------------------------------- Handles ---------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionHandle {
    pub id: String,
    pub name: String,
    pub default_mode_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableHandle {
    pub id: String,
    pub name: String,
    pub variable_collection_id: String,
    pub resolved_type: VariableType,
}

// ------------------------------- Values ----------------------------------- //

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    Float,
    Color,
    String,
}

/// Normalized color; every channel in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b), byte(self.a))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableValue {
    Float(f64),
    Color(Rgba),
    String(String),
    /// Reference to another variable.
    Alias { id: String },
}

impl VariableValue {
    /// Literal kind; `None` for aliases, which any variable type may hold.
    pub fn literal_type(&self) -> Option<VariableType> {
        match self {
            VariableValue::Float(_) => Some(VariableType::Float),
            VariableValue::Color(_) => Some(VariableType::Color),
            VariableValue::String(_) => Some(VariableType::String),
            VariableValue::Alias { .. } => None,
        }
    }

    pub fn alias_target(&self) -> Option<&str> {
        match self {
            VariableValue::Alias { id } => Some(id.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableValue::Float(n) => write!(f, "{n}"),
            VariableValue::Color(c) => f.write_str(&c.to_hex()),
            VariableValue::String(s) => write!(f, "{s:?}"),
            VariableValue::Alias { id } => write!(f, "-> {id}"),
        }
    }
}

// ------------------------------- Interface -------------------------------- //

pub trait VariableHost {
    /// New collection with a single default mode.
    fn create_collection(&mut self, name: &str) -> Result<CollectionHandle, HostError>;

    /// Every collection, in creation order.
    fn list_collections(&self) -> Result<Vec<CollectionHandle>, HostError>;

    /// Every variable of one collection, in creation order.
    fn list_variables(&self, collection_id: &str) -> Result<Vec<VariableHandle>, HostError>;

    fn create_variable(
        &mut self,
        name: &str,
        collection_id: &str,
        resolved_type: VariableType,
    ) -> Result<VariableHandle, HostError>;

    fn set_value(
        &mut self,
        variable_id: &str,
        mode_id: &str,
        value: VariableValue,
    ) -> Result<(), HostError>;

    /// Alias payload pointing at `target_id`.
    fn create_alias(&self, target_id: &str) -> Result<VariableValue, HostError>;
}
