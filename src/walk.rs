//! Depth-first, pre-order descent over a token tree.
//!
//! Pass one of an import: literal leaves become host variables right away,
//! alias leaves are parked as [`PendingAlias`] for the alias pass.
use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::collections::{CollectionKey, CollectionsStore};
use crate::error::LeafError;
use crate::host::{VariableHandle, VariableHost, VariableValue};
use crate::import::CollectionKeyRule;
use crate::tokens::{Category, TokenLeaf, TokenNode};

#[derive(Clone, Debug, PartialEq)]
pub struct PendingAlias {
    /// `/`-joined path of the alias token itself.
    pub path: String,
    pub raw: String,
    pub key: CollectionKey,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterializedVariable {
    pub path: String,
    pub handle: VariableHandle,
    pub value: VariableValue,
}

#[derive(Debug, Default)]
pub struct WalkOutput {
    pub variables: Vec<MaterializedVariable>,
    pub aliases: Vec<PendingAlias>,
    pub issues: Vec<LeafError>,
}

pub struct Walker<'a, H: VariableHost + ?Sized> {
    host: &'a mut H,
    collections: &'a mut CollectionsStore,
    category: Category,
    key_rule: CollectionKeyRule,
}

impl<'a, H: VariableHost + ?Sized> Walker<'a, H> {
    pub fn new(
        host: &'a mut H,
        collections: &'a mut CollectionsStore,
        category: Category,
        key_rule: CollectionKeyRule,
    ) -> Self {
        Self { host, collections, category, key_rule }
    }

    pub fn walk(mut self, tree: &IndexMap<String, TokenNode>) -> WalkOutput {
        let mut out = WalkOutput::default();
        self.walk_group(tree, &[], &mut out);
        out
    }

    fn walk_group<'t>(
        &mut self,
        children: &'t IndexMap<String, TokenNode>,
        prefix: &[&'t str],
        out: &mut WalkOutput,
    ) {
        for (key, child) in children {
            let mut path = prefix.to_vec();
            path.push(key.as_str());
            match child {
                TokenNode::Group(grandchildren) => self.walk_group(grandchildren, &path, out),
                TokenNode::Leaf(leaf) => self.visit_leaf(leaf, path.join("/"), out),
                TokenNode::Stray(_) => {
                    let issue = LeafError::NotAToken { path: path.join("/") };
                    warn!("{issue}");
                    out.issues.push(issue);
                }
            }
        }
    }

    fn visit_leaf(&mut self, leaf: &TokenLeaf, path: String, out: &mut WalkOutput) {
        let key = self.collection_key(leaf);
        if let Some(raw) = leaf.alias() {
            trace!(%path, raw, "deferring alias");
            out.aliases.push(PendingAlias { path, raw: raw.to_string(), key });
            return;
        }
        match self.materialize(leaf, &path, &key) {
            Ok((handle, value)) => out.variables.push(MaterializedVariable { path, handle, value }),
            Err(issue) => {
                warn!("{issue}");
                out.issues.push(issue);
            }
        }
    }

    /// Legacy: a `group` selects the category-named collection and its absence
    /// the ungrouped bucket. By-group: the group names the collection.
    fn collection_key(&self, leaf: &TokenLeaf) -> CollectionKey {
        match (self.key_rule, &leaf.group) {
            (CollectionKeyRule::Legacy, Some(_)) => CollectionKey::Named(self.category.to_string()),
            (CollectionKeyRule::Legacy, None) => CollectionKey::Ungrouped,
            (CollectionKeyRule::ByGroup, Some(group)) => CollectionKey::Named(group.clone()),
            (CollectionKeyRule::ByGroup, None) => CollectionKey::Named(self.category.to_string()),
        }
    }

    // coercion runs before any host call so a malformed value leaves no trace
    fn materialize(
        &mut self,
        leaf: &TokenLeaf,
        path: &str,
        key: &CollectionKey,
    ) -> Result<(VariableHandle, VariableValue), LeafError> {
        let malformed = |source| LeafError::MalformedValue { path: path.to_string(), source };
        let raw = leaf.raw_value().map_err(malformed)?;
        let value = crate::coerce::coerce(self.category, &raw).map_err(malformed)?;

        let host_err = |source| LeafError::Host { path: path.to_string(), source };
        let collection = self.collections.resolve(key, &mut *self.host).map_err(host_err)?;
        let handle = self
            .collections
            .variable(&mut *self.host, &collection, path, self.category.variable_type())
            .map_err(host_err)?;
        self.host
            .set_value(&handle.id, &collection.default_mode_id, value.clone())
            .map_err(host_err)?;
        Ok((handle, value))
    }
}
