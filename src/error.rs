//! Error taxonomy for an import run.
//!
//! Two tiers:
//! - [`ImportError`] aborts the whole run (nothing else is processed).
//! - [`LeafError`] fails one token and is collected; sibling tokens keep going.
use thiserror::Error;

use crate::tokens::Category;

/// Failure while turning a raw token string into a typed payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("`{0}` does not start with a number")]
    NotANumber(String),
    #[error("`{value}` is not a valid color ({reason})")]
    InvalidColor { value: String, reason: String },
    #[error("expected a string value, found {0}")]
    NotAString(String),
}

/// Failure reported by a [`crate::host::VariableHost`].
#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown collection `{0}`")]
    UnknownCollection(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("collection `{collection}` has no mode `{mode}`")]
    UnknownMode { collection: String, mode: String },
    #[error("variable `{variable}` is {expected:?}, cannot hold a {found:?} value")]
    TypeMismatch {
        variable: String,
        expected: crate::host::VariableType,
        found: crate::host::VariableType,
    },
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is malformed: {0}")]
    Store(String),
}

/// Fatal, run-level failure.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to parse token file: {0}")]
    MalformedInput(#[from] serde_json::Error),
    #[error("Token file must be a JSON object mapping a category to a token tree")]
    EmptyFile,
    #[error("We currently only support the following categories: {}", Category::allowed_list())]
    UnsupportedCategory(String),
    #[error("host failure: {0}")]
    Host(#[from] HostError),
}

/// Non-fatal failure scoped to one token.
#[derive(Debug, Error)]
pub enum LeafError {
    #[error("Failed to import token \"{path}\": {source}")]
    MalformedValue {
        path: String,
        #[source]
        source: CoerceError,
    },
    #[error("Failed to import token \"{path}\": expected a token object")]
    NotAToken { path: String },
    #[error("Failed to import token \"{path}\": {source}")]
    Host {
        path: String,
        #[source]
        source: HostError,
    },
    #[error("Could not resolve alias \"{raw}\" for token \"{path}\"")]
    UnresolvedAlias { path: String, raw: String },
}

impl LeafError {
    pub fn path(&self) -> &str {
        match self {
            LeafError::MalformedValue { path, .. }
            | LeafError::NotAToken { path }
            | LeafError::Host { path, .. }
            | LeafError::UnresolvedAlias { path, .. } => path,
        }
    }
}
