//! Typed view over a design-token document.
//!
//! A token file is `{ "<category>": { ...tree... } }`. Each node of the tree
//! is classified once, at parse time: an object carrying a `value` field is a
//! leaf, any other object is a group to descend into. Enumeration order is the
//! document order (`serde_json` is built with `preserve_order`).
pub mod category;

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{CoerceError, ImportError};

pub use category::Category;

// ------------------------------- Types ------------------------------------ //

#[derive(Clone, Debug, PartialEq)]
pub enum TokenNode {
    Leaf(TokenLeaf),
    Group(IndexMap<String, TokenNode>),
    /// Anything that is neither a leaf nor a group (a bare string, number, ...).
    Stray(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenLeaf {
    pub value: Value,
    pub group: Option<String>,
}

/// The one category consumed from a token file.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenFile {
    /// Raw top-level key; validated later against [`Category`].
    pub category: String,
    pub tree: IndexMap<String, TokenNode>,
}

// ------------------------------- Parsing ---------------------------------- //

impl TokenFile {
    pub fn parse(source: &str) -> Result<Self, ImportError> {
        let value = serde_json::from_str::<Value>(source)?;
        Self::from_value(value)
    }

    /// Only the first top-level entry is read; later categories are ignored.
    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        let Value::Object(map) = value else {
            return Err(ImportError::EmptyFile);
        };
        let Some((category, properties)) = map.into_iter().next() else {
            return Err(ImportError::EmptyFile);
        };
        let Value::Object(properties) = properties else {
            return Err(ImportError::EmptyFile);
        };
        Ok(TokenFile { category, tree: group_from_map(properties) })
    }
}

impl TokenNode {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.shift_remove("value") {
                Some(value) => {
                    let group = map.shift_remove("group").and_then(|g| match g {
                        Value::Null => None,
                        Value::String(s) => Some(s),
                        other => Some(other.to_string()),
                    });
                    TokenNode::Leaf(TokenLeaf { value, group })
                }
                None => TokenNode::Group(group_from_map(map)),
            },
            other => TokenNode::Stray(other),
        }
    }
}

fn group_from_map(map: Map<String, Value>) -> IndexMap<String, TokenNode> {
    map.into_iter()
        .map(|(k, v)| (k, TokenNode::from_value(v)))
        .collect()
}

// ------------------------------- Leaves ----------------------------------- //

impl TokenLeaf {
    /// Raw alias text when the value is a reference (`{...}`) rather than a literal.
    pub fn alias(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) if s.starts_with('{') => Some(s.as_str()),
            _ => None,
        }
    }

    /// Literal value as text. Numbers are accepted in their JSON spelling.
    pub fn raw_value(&self) -> Result<Cow<'_, str>, CoerceError> {
        match &self.value {
            Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Ok(Cow::Owned(n.to_string())),
            Value::Null => Err(CoerceError::NotAString("null".into())),
            Value::Bool(_) => Err(CoerceError::NotAString("a boolean".into())),
            Value::Array(_) => Err(CoerceError::NotAString("an array".into())),
            Value::Object(_) => Err(CoerceError::NotAString("an object".into())),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
