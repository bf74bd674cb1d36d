//! Per-run mapping from collection keys to host collections, plus the
//! read-only collection listing shown to the UI.
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HostError;
use crate::host::{CollectionHandle, VariableHandle, VariableHost, VariableType};
use crate::import::ImportMode;

/// Name given to the collection of the ungrouped bucket.
pub const UNGROUPED_COLLECTION: &str = "ungrouped";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Named(String),
    /// Tokens that select no name; kept apart from every named key.
    Ungrouped,
}

impl CollectionKey {
    pub fn collection_name(&self) -> &str {
        match self {
            CollectionKey::Named(name) => name.as_str(),
            CollectionKey::Ungrouped => UNGROUPED_COLLECTION,
        }
    }
}

/// Collections touched by one import run. Never shared between runs.
#[derive(Debug)]
pub struct CollectionsStore {
    mode: ImportMode,
    handles: IndexMap<CollectionKey, CollectionHandle>,
    /// Variables created or reused by this run; never reused a second time.
    claimed: IndexSet<String>,
}

impl CollectionsStore {
    pub fn new(mode: ImportMode) -> Self {
        Self { mode, handles: IndexMap::new(), claimed: IndexSet::new() }
    }

    pub fn get(&self, key: &CollectionKey) -> Option<&CollectionHandle> {
        self.handles.get(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handle for `key`, created at most once per run. In replace mode an
    /// existing host collection whose name matches case-insensitively wins.
    pub fn resolve<H: VariableHost + ?Sized>(
        &mut self,
        key: &CollectionKey,
        host: &mut H,
    ) -> Result<CollectionHandle, HostError> {
        if let Some(handle) = self.handles.get(key) {
            return Ok(handle.clone());
        }
        let name = key.collection_name();
        let existing = match self.mode {
            ImportMode::New => None,
            ImportMode::Replace => {
                let wanted = name.to_lowercase();
                host.list_collections()?
                    .into_iter()
                    .find(|c| c.name.to_lowercase() == wanted)
            }
        };
        let handle = match existing {
            Some(handle) => {
                debug!(collection = %handle.name, id = %handle.id, "reusing collection");
                handle
            }
            None => {
                let handle = host.create_collection(name)?;
                debug!(collection = %handle.name, id = %handle.id, "created collection");
                handle
            }
        };
        self.handles.insert(key.clone(), handle.clone());
        Ok(handle)
    }

    /// Variable named `name` inside `collection`. Replace mode reuses a
    /// same-named variable that existed before this run; new mode always
    /// creates. A variable is handed out at most once per run.
    pub fn variable<H: VariableHost + ?Sized>(
        &mut self,
        host: &mut H,
        collection: &CollectionHandle,
        name: &str,
        resolved_type: VariableType,
    ) -> Result<VariableHandle, HostError> {
        if self.mode == ImportMode::Replace {
            let existing = host
                .list_variables(&collection.id)?
                .into_iter()
                .find(|v| v.name == name && !self.claimed.contains(&v.id));
            if let Some(var) = existing {
                debug!(variable = %var.name, id = %var.id, "replacing variable");
                self.claimed.insert(var.id.clone());
                return Ok(var);
            }
        }
        let var = host.create_variable(name, &collection.id, resolved_type)?;
        debug!(variable = %var.name, id = %var.id, collection = %collection.name, "created variable");
        self.claimed.insert(var.id.clone());
        Ok(var)
    }
}

// ------------------------------- Query ------------------------------------ //

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
}

pub fn list_collections<H: VariableHost + ?Sized>(host: &H) -> Result<Vec<CollectionSummary>, HostError> {
    Ok(host
        .list_collections()?
        .into_iter()
        .map(|c| CollectionSummary { id: c.id, name: c.name })
        .collect())
}
