//! Pass two of an import: bind parked aliases to the variables pass one made.
//!
//! Lookup is against literal variables only; an alias pointing at another
//! alias does not resolve.
use tracing::debug;

use crate::collections::CollectionsStore;
use crate::error::LeafError;
use crate::host::{VariableHandle, VariableHost};
use crate::tokens::Category;
use crate::walk::{MaterializedVariable, PendingAlias};

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAlias {
    pub path: String,
    pub handle: VariableHandle,
    /// Path of the variable the alias points at.
    pub target_path: String,
    pub target_id: String,
}

#[derive(Debug, Default)]
pub struct AliasOutput {
    pub resolved: Vec<ResolvedAlias>,
    /// Aliases whose target was never materialized. Dropped without a report.
    pub unresolved: Vec<PendingAlias>,
    pub issues: Vec<LeafError>,
}

/// `{color.brand.primary}` → `brand/primary`
pub fn normalize_alias(raw: &str) -> String {
    let inner = raw.strip_prefix('{').unwrap_or(raw);
    let inner = inner.strip_suffix('}').unwrap_or(inner);
    let inner = inner.strip_prefix("color.").unwrap_or(inner);
    inner.replace('.', "/")
}

pub fn resolve_aliases<H: VariableHost + ?Sized>(
    host: &mut H,
    collections: &mut CollectionsStore,
    category: Category,
    variables: &[MaterializedVariable],
    aliases: Vec<PendingAlias>,
) -> AliasOutput {
    let mut out = AliasOutput::default();
    for alias in aliases {
        let wanted = normalize_alias(&alias.raw);
        let Some(target) = variables.iter().find(|v| v.path == wanted) else {
            debug!(path = %alias.path, raw = %alias.raw, "dropping unresolved alias");
            out.unresolved.push(alias);
            continue;
        };
        match bind(host, collections, category, &alias, target) {
            Ok(handle) => out.resolved.push(ResolvedAlias {
                path: alias.path,
                handle,
                target_path: target.path.clone(),
                target_id: target.handle.id.clone(),
            }),
            Err(source) => out.issues.push(LeafError::Host { path: alias.path, source }),
        }
    }
    out
}

fn bind<H: VariableHost + ?Sized>(
    host: &mut H,
    collections: &mut CollectionsStore,
    category: Category,
    alias: &PendingAlias,
    target: &MaterializedVariable,
) -> Result<VariableHandle, crate::error::HostError> {
    let collection = collections.resolve(&alias.key, host)?;
    let handle = collections.variable(host, &collection, &alias.path, category.variable_type())?;
    let reference = host.create_alias(&target.handle.id)?;
    host.set_value(&handle.id, &collection.default_mode_id, reference)?;
    debug!(path = %alias.path, target = %target.path, "bound alias");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, VariableValue};
    use crate::import::{CollectionKeyRule, ImportMode};
    use crate::tokens::TokenFile;
    use crate::walk::Walker;
    use serde_json::json;

    #[test]
    fn normalization_rules() {
        assert_eq!(normalize_alias("{colors.primary}"), "colors/primary");
        assert_eq!(normalize_alias("{color.brand.primary}"), "brand/primary");
        assert_eq!(normalize_alias("{spacing.sm}"), "spacing/sm");
        assert_eq!(normalize_alias("{flat}"), "flat");
        assert_eq!(normalize_alias("{open.ended"), "open/ended");
    }

    fn run(doc: serde_json::Value) -> (MemoryHost, Vec<MaterializedVariable>, AliasOutput) {
        let mut host = MemoryHost::new();
        let file = TokenFile::from_value(doc).unwrap();
        let category = Category::parse(&file.category).unwrap();
        let mut store = CollectionsStore::new(ImportMode::New);
        let walked = Walker::new(&mut host, &mut store, category, CollectionKeyRule::Legacy).walk(&file.tree);
        let out = resolve_aliases(&mut host, &mut store, category, &walked.variables, walked.aliases);
        (host, walked.variables, out)
    }

    #[test]
    fn alias_binds_to_target_regardless_of_order() {
        let (host, vars, out) = run(json!({"color": {"colors": {
            "secondary": {"value": "{colors.primary}"},
            "primary": {"value": "#ff0000"}
        }}}));
        assert_eq!(out.resolved.len(), 1);
        let alias = &out.resolved[0];
        assert_eq!(alias.path, "colors/secondary");
        assert_eq!(alias.target_path, "colors/primary");
        assert_eq!(alias.target_id, vars[0].handle.id);
        assert_eq!(
            host.default_value(&alias.handle.id),
            Some(&VariableValue::Alias { id: vars[0].handle.id.clone() })
        );
        assert_eq!(host.variable(&alias.handle.id).unwrap().resolved_type, crate::host::VariableType::Color);
    }

    #[test]
    fn unresolved_and_chained_aliases_are_dropped() {
        let (host, vars, out) = run(json!({"size": {
            "base": {"value": "4"},
            "ghost": {"value": "{does.not.exist}"},
            "one": {"value": "{base}"},
            "two": {"value": "{one}"}
        }}));
        assert_eq!(vars.len(), 1);
        assert_eq!(out.resolved.len(), 1);
        assert_eq!(out.resolved[0].path, "one");
        let dropped: Vec<&str> = out.unresolved.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(dropped, ["ghost", "two"]);
        assert!(out.issues.is_empty());
        assert_eq!(host.variables().len(), 2);
    }

    #[test]
    fn alias_lands_in_its_own_collection() {
        let (host, _, out) = run(json!({"content": {
            "greeting": {"value": "hello", "group": "copy"},
            "salute": {"value": "{greeting}"}
        }}));
        let alias_var = host.variable(&out.resolved[0].handle.id).unwrap();
        let collection = host
            .collections()
            .iter()
            .find(|c| c.id == alias_var.variable_collection_id)
            .unwrap();
        assert_eq!(collection.name, crate::collections::UNGROUPED_COLLECTION);
        assert_eq!(alias_var.resolved_type, crate::host::VariableType::String);
    }

    #[test]
    fn first_created_wins_on_duplicate_paths() {
        let mut host = MemoryHost::new();
        let mut store = CollectionsStore::new(ImportMode::New);
        let c = host.create_collection("size").unwrap();
        let mk = |host: &mut MemoryHost| {
            let handle = host.create_variable("dup", &c.id, crate::host::VariableType::Float).unwrap();
            MaterializedVariable { path: "dup".into(), handle, value: VariableValue::Float(1.0) }
        };
        let vars = vec![mk(&mut host), mk(&mut host)];
        let pending = vec![PendingAlias {
            path: "ref".into(),
            raw: "{dup}".into(),
            key: crate::collections::CollectionKey::Named("size".into()),
        }];
        let out = resolve_aliases(&mut host, &mut store, Category::Size, &vars, pending);
        assert_eq!(out.resolved[0].target_id, vars[0].handle.id);
    }
}
