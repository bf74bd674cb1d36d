//! Import design-token JSON files into a design tool's typed variables.
//!
//! Pipeline: token file text → [`tokens::TokenFile`] → [`walk::Walker`]
//! (literal leaves become variables, aliases are parked) →
//! [`alias::resolve_aliases`] → reports. The host is injected through
//! [`host::VariableHost`].
pub mod alias;
pub mod cli;
pub mod coerce;
pub mod collections;
pub mod error;
pub mod host;
pub mod import;
pub mod jq_exec;
pub mod messages;
pub mod path_de;
pub mod tokens;
pub mod walk;

pub use error::{CoerceError, HostError, ImportError, LeafError};
pub use host::{MemoryHost, VariableHost};
pub use import::{import_tokens, ImportMode, ImportOptions, ImportOutcome};
