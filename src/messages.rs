//! Message contract between the UI shell and the importer.
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::collections::{list_collections, CollectionSummary};
use crate::host::VariableHost;
use crate::import::{import_tokens, ImportMode, ImportOptions, Report};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inbound {
    ImportTokens {
        tokens: String,
        /// Falls back to the caller's configured mode when absent.
        #[serde(rename = "importMode", default, skip_serializing_if = "Option::is_none")]
        import_mode: Option<ImportMode>,
    },
    GetCollections,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outbound {
    ReportError { message: String },
    ReportSuccess { message: String },
    GetCollectionsResult { collections: Vec<CollectionSummary> },
}

impl From<Report> for Outbound {
    fn from(report: Report) -> Self {
        match report {
            Report::Error(message) => Outbound::ReportError { message },
            Report::Success(message) => Outbound::ReportSuccess { message },
        }
    }
}

/// Handle one inbound message. A message's own import mode overrides
/// `options.mode`.
pub fn dispatch<H: VariableHost + ?Sized>(
    host: &mut H,
    message: Inbound,
    options: &ImportOptions,
) -> Vec<Outbound> {
    match message {
        Inbound::ImportTokens { tokens, import_mode } => {
            let options = ImportOptions { mode: import_mode.unwrap_or(options.mode), ..options.clone() };
            match import_tokens(host, &tokens, &options) {
                Ok(outcome) => outcome.reports.into_iter().map(Outbound::from).collect(),
                Err(err) => {
                    error!("import aborted: {err}");
                    vec![Outbound::ReportError { message: err.to_string() }]
                }
            }
        }
        Inbound::GetCollections => match list_collections(&*host) {
            Ok(collections) => vec![Outbound::GetCollectionsResult { collections }],
            Err(err) => vec![Outbound::ReportError { message: err.to_string() }],
        },
    }
}
