//! Per-document extraction records and header configuration

use crate::classification::ClassificationResult;
use crate::direction::Direction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// The central record produced for each document.
///
/// Invariant: `fields` contains exactly the header set requested for this
/// record's `direction`, with `null` for any header the model omitted. Keys
/// are never dropped or invented. Once `direction` is set (forced by the
/// caller or taken from the classification) it is never reconsidered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Source contract file
    pub contract_path: PathBuf,

    /// Resolved direction; selects which header set `fields` carries
    pub direction: Direction,

    /// The party treated as "us" during extraction
    pub my_party: String,

    /// Header name → extracted value (`null` when absent from the contract)
    pub fields: Map<String, Value>,

    /// The extraction stage's unmodified reply text
    pub raw_extraction: Option<String>,

    /// The classification stage's verdict
    pub classification: ClassificationResult,

    /// Version tag of the prompt set that produced this record
    pub prompt_version: String,

    /// Free-text notes (e.g. the resolved contract type)
    pub notes: Option<String>,
}

impl ExtractionResult {
    /// File stem the record is persisted under
    pub fn stem(&self) -> String {
        self.contract_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Ordered output columns for each direction.
///
/// Loaded once per run from external column lists; read-only configuration
/// for the orchestrator. Column order is significant and preserved through
/// extraction and aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderDefinition {
    /// Columns requested for upstream contracts
    pub upstream_headers: Vec<String>,

    /// Columns requested for downstream contracts
    pub downstream_headers: Vec<String>,
}

impl HeaderDefinition {
    /// The header list for one direction
    pub fn headers_for(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Upstream => &self.upstream_headers,
            Direction::Downstream => &self.downstream_headers,
        }
    }
}
