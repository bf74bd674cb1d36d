//! One import run: parse, validate the category, walk, resolve aliases, report.
//!
//! Nothing is rolled back. Whatever the host accepted before a failure stays.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::alias::{resolve_aliases, ResolvedAlias};
use crate::collections::CollectionsStore;
use crate::error::{ImportError, LeafError};
use crate::host::VariableHost;
use crate::tokens::{Category, TokenFile};
use crate::walk::{MaterializedVariable, Walker};

// ------------------------------- Options ---------------------------------- //

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// always create fresh collections
    #[default]
    New,
    /// reuse collections (and their variables) by name
    Replace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Report an unsupported category and carry on.
    #[default]
    Lenient,
    /// Unsupported category aborts the run.
    Strict,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKeyRule {
    #[default]
    Legacy,
    ByGroup,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub category_policy: CategoryPolicy,
    pub collection_keys: CollectionKeyRule,
    pub warn_unresolved_aliases: bool,
}

impl ImportOptions {
    pub fn with_mode(mode: ImportMode) -> Self {
        Self { mode, ..Self::default() }
    }
}

// ------------------------------- Outcome ---------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Report {
    Error(String),
    Success(String),
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub category: String,
    pub variables: Vec<MaterializedVariable>,
    pub aliases: Vec<ResolvedAlias>,
    pub dropped_aliases: usize,
    pub issues: Vec<LeafError>,
    /// Outbound messages, in emission order.
    pub reports: Vec<Report>,
}

impl ImportOutcome {
    pub fn success_count(&self) -> usize {
        self.variables.len() + self.aliases.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().filter_map(|r| match r {
            Report::Error(msg) => Some(msg.as_str()),
            Report::Success(_) => None,
        })
    }

    pub fn success(&self) -> Option<&str> {
        self.reports.iter().find_map(|r| match r {
            Report::Success(msg) => Some(msg.as_str()),
            Report::Error(_) => None,
        })
    }
}

// ------------------------------- Front API -------------------------------- //

pub fn import_tokens<H: VariableHost + ?Sized>(
    host: &mut H,
    source: &str,
    options: &ImportOptions,
) -> Result<ImportOutcome, ImportError> {
    let file = TokenFile::parse(source)?;
    import_file(host, file, options)
}

pub fn import_value<H: VariableHost + ?Sized>(
    host: &mut H,
    value: Value,
    options: &ImportOptions,
) -> Result<ImportOutcome, ImportError> {
    let file = TokenFile::from_value(value)?;
    import_file(host, file, options)
}

pub fn import_file<H: VariableHost + ?Sized>(
    host: &mut H,
    file: TokenFile,
    options: &ImportOptions,
) -> Result<ImportOutcome, ImportError> {
    let mut outcome = ImportOutcome { category: file.category.clone(), ..ImportOutcome::default() };

    let Some(category) = Category::parse(&file.category) else {
        if options.category_policy == CategoryPolicy::Strict {
            return Err(ImportError::UnsupportedCategory(file.category));
        }
        // nothing can be coerced for an unknown category, so the run ends empty
        let message = ImportError::UnsupportedCategory(file.category).to_string();
        warn!("{message}");
        outcome.reports.push(Report::Error(message));
        return Ok(outcome);
    };

    let mut collections = CollectionsStore::new(options.mode);
    let walked = Walker::new(host, &mut collections, category, options.collection_keys).walk(&file.tree);
    let resolved = resolve_aliases(host, &mut collections, category, &walked.variables, walked.aliases);

    outcome.variables = walked.variables;
    outcome.aliases = resolved.resolved;
    outcome.dropped_aliases = resolved.unresolved.len();
    outcome.issues = walked.issues;
    outcome.issues.extend(resolved.issues);

    for issue in &outcome.issues {
        outcome.reports.push(Report::Error(issue.to_string()));
    }
    if options.warn_unresolved_aliases {
        for alias in resolved.unresolved {
            let issue = LeafError::UnresolvedAlias { path: alias.path, raw: alias.raw };
            outcome.reports.push(Report::Error(issue.to_string()));
        }
    }
    if !outcome.variables.is_empty() {
        outcome
            .reports
            .push(Report::Success(format!("Successfully imported {} variables", outcome.success_count())));
    }

    info!(
        category = %category,
        mode = ?options.mode,
        variables = outcome.variables.len(),
        aliases = outcome.aliases.len(),
        dropped_aliases = outcome.dropped_aliases,
        issues = outcome.issues.len(),
        collections = collections.len(),
        "import finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, VariableValue};
    use serde_json::json;

    fn import(host: &mut MemoryHost, doc: Value, options: &ImportOptions) -> ImportOutcome {
        import_tokens(host, &doc.to_string(), options).unwrap()
    }

    #[test]
    fn size_tokens_take_leading_integer() {
        let mut host = MemoryHost::new();
        let out = import(
            &mut host,
            json!({"size": {"spacing": {"sm": {"value": "8px"}, "md": {"value": "16px"}}}}),
            &ImportOptions::default(),
        );
        let values: Vec<(&str, &VariableValue)> =
            out.variables.iter().map(|v| (v.path.as_str(), &v.value)).collect();
        assert_eq!(
            values,
            [("spacing/sm", &VariableValue::Float(8.0)), ("spacing/md", &VariableValue::Float(16.0))]
        );
        assert_eq!(out.reports, vec![Report::Success("Successfully imported 2 variables".into())]);
    }

    #[test]
    fn success_counts_variables_plus_resolved_aliases() {
        let mut host = MemoryHost::new();
        let out = import(
            &mut host,
            json!({"color": {"colors": {
                "primary": {"value": "#ff0000"},
                "secondary": {"value": "{colors.primary}"},
                "accent": {"value": "{color.colors.primary}"},
                "ghost": {"value": "{colors.missing}"}
            }}}),
            &ImportOptions::default(),
        );
        assert_eq!(out.variables.len(), 1);
        assert_eq!(out.aliases.len(), 2);
        assert_eq!(out.dropped_aliases, 1);
        assert_eq!(out.success_count(), 3);
        assert_eq!(out.errors().count(), 0);
        assert_eq!(out.success(), Some("Successfully imported 3 variables"));
    }

    #[test]
    fn aliases_only_reports_nothing() {
        let mut host = MemoryHost::new();
        let out = import(&mut host, json!({"size": {"a": {"value": "{b}"}}}), &ImportOptions::default());
        assert!(out.reports.is_empty());
        assert_eq!(out.success_count(), 0);
        assert!(host.variables().is_empty());
    }

    #[test]
    fn unsupported_category_reports_once() {
        let mut host = MemoryHost::new();
        let out = import(&mut host, json!({"shadow": {"x": {"value": "1"}}}), &ImportOptions::default());
        assert_eq!(
            out.reports,
            vec![Report::Error(
                "We currently only support the following categories: size, color, content".into()
            )]
        );
        assert!(host.collections().is_empty());
    }

    #[test]
    fn strict_policy_aborts_on_unsupported_category() {
        let mut host = MemoryHost::new();
        let options = ImportOptions { category_policy: CategoryPolicy::Strict, ..ImportOptions::default() };
        let err = import_tokens(&mut host, r#"{"shadow": {}}"#, &options).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedCategory(c) if c == "shadow"));
    }

    #[test]
    fn malformed_json_is_fatal_and_touches_nothing() {
        let mut host = MemoryHost::new();
        let err = import_tokens(&mut host, "{\"size\": {", &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::MalformedInput(_)));
        assert!(err.to_string().starts_with("Failed to parse token file:"));
        assert!(host.collections().is_empty());
    }

    #[test]
    fn malformed_leaves_are_reported_individually() {
        let mut host = MemoryHost::new();
        let out = import(
            &mut host,
            json!({"color": {"ok": {"value": "#000"}, "bad": {"value": "#zz"}, "worse": {"value": "nope"}}}),
            &ImportOptions::default(),
        );
        let errors: Vec<&str> = out.errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Failed to import token \"bad\""));
        assert!(errors[1].starts_with("Failed to import token \"worse\""));
        assert_eq!(out.success(), Some("Successfully imported 1 variables"));
    }

    #[test]
    fn replace_mode_is_idempotent() {
        let mut host = MemoryHost::new();
        let doc = json!({"size": {
            "sm": {"value": "4", "group": "x"},
            "lg": {"value": "{sm}", "group": "x"}
        }});
        let options = ImportOptions::with_mode(ImportMode::Replace);
        let first = import(&mut host, doc.clone(), &options);
        let second = import(&mut host, doc, &options);

        assert_eq!(host.collections().len(), 1);
        assert_eq!(host.variables().len(), 2);
        assert_eq!(first.variables[0].handle, second.variables[0].handle);
        assert_eq!(second.success_count(), 2);
    }

    #[test]
    fn replace_mode_updates_values_and_matches_case() {
        let mut host = MemoryHost::new();
        host.create_collection("SIZE").unwrap();
        let options = ImportOptions::with_mode(ImportMode::Replace);
        import(&mut host, json!({"size": {"sm": {"value": "4", "group": "g"}}}), &options);
        let out = import(&mut host, json!({"size": {"sm": {"value": "6", "group": "g"}}}), &options);
        assert_eq!(host.collections().len(), 1);
        assert_eq!(host.variables().len(), 1);
        assert_eq!(host.default_value(&out.variables[0].handle.id), Some(&VariableValue::Float(6.0)));
    }

    #[test]
    fn replace_mode_never_rebinds_a_variable_from_the_same_run() {
        let doc = json!({"size": {
            "a/b": {"value": "1", "group": "g"},
            "a": {"b": {"value": "{a.b}", "group": "g"}}
        }});
        let mut host = MemoryHost::new();
        let out = import(&mut host, doc, &ImportOptions::with_mode(ImportMode::Replace));

        assert_eq!(host.variables().len(), 2);
        assert_eq!(out.success_count(), 2);
        let literal = &out.variables[0].handle;
        assert_eq!(host.default_value(&literal.id), Some(&VariableValue::Float(1.0)));
        let alias = &out.aliases[0].handle;
        assert_ne!(alias.id, literal.id);
        assert_eq!(host.default_value(&alias.id), Some(&VariableValue::Alias { id: literal.id.clone() }));
    }

    #[test]
    fn replace_mode_keeps_duplicate_leaves_apart() {
        let doc = json!({"size": {
            "a/b": {"value": "1", "group": "g"},
            "a": {"b": {"value": "2", "group": "g"}}
        }});
        let mut host = MemoryHost::new();
        let out = import(&mut host, doc, &ImportOptions::with_mode(ImportMode::Replace));
        assert_eq!(out.variables.len(), 2);
        assert_ne!(out.variables[0].handle.id, out.variables[1].handle.id);
        assert_eq!(host.default_value(&out.variables[0].handle.id), Some(&VariableValue::Float(1.0)));
        assert_eq!(host.default_value(&out.variables[1].handle.id), Some(&VariableValue::Float(2.0)));
    }

    #[test]
    fn new_mode_duplicates_collections() {
        let mut host = MemoryHost::new();
        let doc = json!({"size": {"sm": {"value": "4", "group": "x"}}});
        import(&mut host, doc.clone(), &ImportOptions::default());
        import(&mut host, doc, &ImportOptions::default());
        assert_eq!(host.collections().len(), 2);
    }

    #[test]
    fn unresolved_alias_warning_is_opt_in() {
        let mut host = MemoryHost::new();
        let options = ImportOptions { warn_unresolved_aliases: true, ..ImportOptions::default() };
        let out = import(
            &mut host,
            json!({"size": {"a": {"value": "1"}, "b": {"value": "{nowhere}"}}}),
            &options,
        );
        assert_eq!(
            out.errors().collect::<Vec<_>>(),
            ["Could not resolve alias \"{nowhere}\" for token \"b\""]
        );
        assert_eq!(out.success_count(), 1);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ImportOptions =
            serde_json::from_value(json!({"mode": "replace", "collection_keys": "by_group"})).unwrap();
        assert_eq!(options.mode, ImportMode::Replace);
        assert_eq!(options.collection_keys, CollectionKeyRule::ByGroup);
        assert_eq!(options.category_policy, CategoryPolicy::Lenient);
        assert!(!options.warn_unresolved_aliases);
    }
}
