//! CLI: import token files into a JSON-backed variable store, list its
//! collections, or speak the message protocol over stdio.
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};

use crate::collections::list_collections;
use crate::error::ImportError;
use crate::host::MemoryHost;
use crate::import::{
    import_tokens, import_value, CategoryPolicy, CollectionKeyRule, ImportMode, ImportOptions, ImportOutcome,
    Report,
};
use crate::messages::{dispatch, Inbound, Outbound};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// import design-token JSON files into typed variable collections
#[derive(Parser, Debug)]
#[command(name = "token-vars", version)]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// import one or more token files
    Import(ImportCmd),
    /// list the collections in the store
    Collections(CollectionsCmd),
    /// read NDJSON messages on stdin, answer with NDJSON on stdout
    Serve(ServeCmd),
}

#[derive(Args, Debug, Clone)]
struct StoreSettings {
    /// JSON file holding collections and variables between runs
    #[arg(long, default_value = "token-vars.store.json")]
    store: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ImportSettings {
    /// create fresh collections, or reuse existing ones by name
    #[arg(long, value_enum, default_value_t = ImportMode::New)]
    mode: ImportMode,

    /// abort on an unsupported top-level category instead of reporting it
    #[arg(long, default_value_t = false)]
    strict_category: bool,

    /// name collections after each token's `group` (category when absent)
    #[arg(long, default_value_t = false)]
    group_collections: bool,

    /// report aliases whose target does not exist
    #[arg(long, default_value_t = false)]
    warn_unresolved: bool,
}

#[derive(clap::Parser, Debug)]
struct ImportCmd {
    #[command(flatten)]
    store: StoreSettings,

    #[command(flatten)]
    settings: ImportSettings,

    /// JQ pre-process filter for each document; every output is imported
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// parse and import against the store but do not write it back
    #[arg(long)]
    dry_run: bool,
}

#[derive(clap::Parser, Debug)]
struct CollectionsCmd {
    #[command(flatten)]
    store: StoreSettings,

    /// print as a JSON array of {id, name}
    #[arg(long)]
    json: bool,

    /// also list every variable with its default-mode value
    #[arg(long, conflicts_with = "json")]
    variables: bool,
}

/// `--mode` applies to messages that carry no `importMode` of their own.
#[derive(clap::Parser, Debug)]
struct ServeCmd {
    #[command(flatten)]
    store: StoreSettings,

    #[command(flatten)]
    settings: ImportSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl From<&ImportSettings> for ImportOptions {
    fn from(settings: &ImportSettings) -> Self {
        ImportOptions {
            mode: settings.mode,
            category_policy: if settings.strict_category {
                CategoryPolicy::Strict
            } else {
                CategoryPolicy::Lenient
            },
            collection_keys: if settings.group_collections {
                CollectionKeyRule::ByGroup
            } else {
                CollectionKeyRule::Legacy
            },
            warn_unresolved_aliases: settings.warn_unresolved,
        }
    }
}

impl ImportCmd {
    /// Import one token file, or every jq output of it. Parse failures surface
    /// as [`ImportError::MalformedInput`] like on the message path.
    fn import_path(
        &self,
        host: &mut MemoryHost,
        source_path: &Path,
        options: &ImportOptions,
    ) -> Result<Vec<ImportOutcome>> {
        let source = std::fs::read_to_string(source_path).context("Failed to read token file")?;
        let Some(jq_expr) = self.jq_expr.as_deref() else {
            return Ok(vec![import_tokens(host, &source, options)?]);
        };
        let value = serde_json::from_str::<serde_json::Value>(&source).map_err(ImportError::MalformedInput)?;
        let documents = crate::jq_exec::apply_filter(jq_expr, &value).context("Failed to apply jq expression")?;
        debug!(file = %source_path.display(), outputs = documents.len(), "jq filter applied");
        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            outcomes.push(import_value(host, document, options)?);
        }
        Ok(outcomes)
    }

    fn run(&self) -> Result<()> {
        let options = ImportOptions::from(&self.settings);
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut host = MemoryHost::load(&self.store.store)?;

        let mut failures = 0usize;
        for source_path in source_paths {
            let label = source_path.to_string_lossy().to_string();
            info!(file = %label, "importing");
            match self.import_path(&mut host, &source_path, &options) {
                Ok(outcomes) => {
                    for report in outcomes.iter().flat_map(|o| &o.reports) {
                        print_report(&label, report);
                    }
                    if outcomes.iter().all(|o| o.reports.is_empty()) {
                        println!("{} {label}: nothing imported", "·".dimmed());
                    }
                }
                Err(err) => {
                    failures += 1;
                    print_report(&label, &Report::Error(format!("{err:#}")));
                }
            }
        }

        if self.dry_run {
            info!("dry run, store left untouched");
        } else {
            host.save(&self.store.store)?;
        }
        if failures > 0 {
            bail!("{failures} token file(s) could not be imported");
        }
        Ok(())
    }
}

impl CollectionsCmd {
    fn run(&self) -> Result<()> {
        let host = MemoryHost::load(&self.store.store)?;
        let collections = list_collections(&host)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&collections)?);
            return Ok(());
        }
        for collection in collections {
            let members: Vec<_> = host
                .variables()
                .iter()
                .filter(|v| v.variable_collection_id == collection.id)
                .collect();
            println!("{}  {}  ({} variables)", collection.id.dimmed(), collection.name.bold(), members.len());
            if self.variables {
                for var in members {
                    let value = host
                        .default_value(&var.id)
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "<unset>".to_string());
                    println!("    {}  {} = {value}", var.id.dimmed(), var.name);
                }
            }
        }
        Ok(())
    }
}

impl ServeCmd {
    fn run(&self) -> Result<()> {
        let options = ImportOptions::from(&self.settings);
        let mut host = MemoryHost::load(&self.store.store)?;
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout().lock();
        for line in stdin.lock().lines() {
            let line = line.context("Failed to read message from stdin")?;
            if line.trim().is_empty() {
                continue;
            }
            let replies = match serde_json::from_str::<Inbound>(&line) {
                Ok(message) => {
                    let mutates = matches!(message, Inbound::ImportTokens { .. });
                    let replies = dispatch(&mut host, message, &options);
                    if mutates {
                        host.save(&self.store.store)?;
                    }
                    replies
                }
                Err(err) => vec![Outbound::ReportError { message: format!("Malformed message: {err}") }],
            };
            for reply in replies {
                writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
            }
            stdout.flush()?;
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Import(cmd) => cmd.run(),
            Command::Collections(cmd) => cmd.run(),
            Command::Serve(cmd) => cmd.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn print_report(label: &str, report: &Report) {
    match report {
        Report::Error(message) => eprintln!("{} {label}: {message}", "✗".red().bold()),
        Report::Success(message) => println!("{} {label}: {message}", "✓".green().bold()),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {pattern}"))?
                .collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.append(&mut matched);
        } else {
            out.push(Path::new(pattern).to_path_buf());
        }
    }

    Ok(out)
}
