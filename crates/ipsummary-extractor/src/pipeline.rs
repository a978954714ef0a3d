//! The extraction orchestrator
//!
//! Drives the per-document state machine (classify → resolve direction →
//! extract → optional note stage) and fans out across all documents of a
//! batch. Concurrency is bounded only by the gateway's admission limiter;
//! the join is position-stable, so callers see results in scan order no
//! matter what order documents finish in.

use crate::config::FailurePolicy;
use crate::contract_types::{ContractTypeCatalog, GENERIC_TYPE};
use crate::error::ExtractorError;
use crate::parser::{parse_object_lossy, strip_code_fence};
use crate::prompt::{
    classification_messages, extraction_messages, note_generation_messages,
    type_classification_messages, PROMPT_VERSION,
};
use futures::future;
use ipsummary_domain::{
    ChatMessage, ChatOptions, ClassificationResult, Direction, ExtractionResult, HeaderDefinition,
    LlmProvider, LoadedDocument,
};
use ipsummary_llm::Gateway;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Field that receives the generated note when the header set carries it
const NOTES_FIELD: &str = "合同备注";

/// What went wrong with one document under the isolate policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport/API failure from the gateway
    Gateway,
    /// The record could not be persisted
    Store,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Gateway => f.write_str("gateway"),
            FailureKind::Store => f.write_str("store"),
        }
    }
}

/// Per-document error marker for the batch report
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    /// The document that failed
    pub document: PathBuf,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable detail
    pub detail: String,
}

/// Outcome of one batch run.
///
/// `results` preserves the original document scan order. Under the abort
/// policy `failures` is always empty (the first failure ends the run);
/// under the isolate policy it lists every document that produced no
/// record, also in scan order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully extracted and persisted records, in scan order
    pub results: Vec<ExtractionResult>,
    /// Documents that failed, in scan order
    pub failures: Vec<DocumentFailure>,
}

/// The per-batch extraction orchestrator.
///
/// Holds everything a run needs up front: the admission-limited gateway,
/// the header configuration, the optional contract-type catalog, and the
/// batch policies. One instance drives one batch.
pub struct ContractPipeline<P: LlmProvider> {
    gateway: Gateway<P>,
    headers: HeaderDefinition,
    my_party: String,
    intermediate_dir: PathBuf,
    contract_types: Option<ContractTypeCatalog>,
    force_direction: Option<Direction>,
    failure_policy: FailurePolicy,
}

impl<P> ContractPipeline<P>
where
    P: LlmProvider,
{
    /// Create a pipeline for one batch
    pub fn new(
        gateway: Gateway<P>,
        headers: HeaderDefinition,
        my_party: impl Into<String>,
        intermediate_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gateway,
            headers,
            my_party: my_party.into(),
            intermediate_dir: intermediate_dir.into(),
            contract_types: None,
            force_direction: None,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Enable the note stage with a contract-type catalog.
    ///
    /// An empty catalog leaves the stage disabled.
    pub fn with_contract_types(mut self, catalog: ContractTypeCatalog) -> Self {
        if !catalog.is_empty() {
            self.contract_types = Some(catalog);
        }
        self
    }

    /// Force every document to one direction, skipping the classifier's verdict
    pub fn with_force_direction(mut self, direction: Option<Direction>) -> Self {
        self.force_direction = direction;
        self
    }

    /// Choose how a document's gateway failure affects the batch
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Process a batch of documents.
    ///
    /// Every document runs the four-stage state machine independently; the
    /// shared admission limiter is the only coupling between them. Each
    /// record is persisted the moment its document finishes, so a later
    /// failure never loses earlier documents' work.
    pub async fn run(&self, documents: &[LoadedDocument]) -> Result<BatchReport, ExtractorError> {
        let upstream_dir = self.intermediate_dir.join("upstream");
        let downstream_dir = self.intermediate_dir.join("downstream");
        ipsummary_store::ensure_directories([
            self.intermediate_dir.as_path(),
            upstream_dir.as_path(),
            downstream_dir.as_path(),
        ])
        .map_err(|e| ExtractorError::Store(e.to_string()))?;

        info!(
            documents = documents.len(),
            my_party = %self.my_party,
            note_stage = self.contract_types.is_some(),
            "starting batch"
        );

        let tasks = documents.iter().map(|doc| self.process_document(doc));
        let outcomes = future::join_all(tasks).await;

        let mut report = BatchReport::default();
        for (doc, outcome) in documents.iter().zip(outcomes) {
            match outcome {
                Ok(result) => report.results.push(result),
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Isolate => {
                        let kind = match &e {
                            ExtractorError::Store(_) => FailureKind::Store,
                            _ => FailureKind::Gateway,
                        };
                        warn!(document = %doc.path.display(), error = %e, "document isolated");
                        report.failures.push(DocumentFailure {
                            document: doc.path.clone(),
                            kind,
                            detail: e.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            succeeded = report.results.len(),
            failed = report.failures.len(),
            "batch finished"
        );
        Ok(report)
    }

    /// Run the four-stage state machine for one document
    async fn process_document(
        &self,
        doc: &LoadedDocument,
    ) -> Result<ExtractionResult, ExtractorError> {
        let classification = self.classify(doc).await?;
        let direction = self.force_direction.unwrap_or(classification.direction);
        debug!(
            document = %doc.path.display(),
            direction = %direction,
            forced = self.force_direction.is_some(),
            "direction resolved"
        );

        let headers = self.headers.headers_for(direction);
        let (mut fields, raw_extraction) = self.extract(doc, headers, direction).await?;

        let mut notes = None;
        if let Some(catalog) = &self.contract_types {
            let (type_name, note) = self.generate_note(doc, catalog).await?;
            if fields.contains_key(NOTES_FIELD) {
                fields.insert(NOTES_FIELD.to_string(), Value::String(note));
            }
            notes = Some(format!("合同类型：{type_name}"));
        }

        let result = ExtractionResult {
            contract_path: doc.path.clone(),
            direction,
            my_party: self.my_party.clone(),
            fields,
            raw_extraction: Some(raw_extraction),
            classification,
            prompt_version: PROMPT_VERSION.to_string(),
            notes,
        };

        let saved = ipsummary_store::save_intermediate(&result, &self.intermediate_dir)
            .map_err(|e| ExtractorError::Store(e.to_string()))?;
        info!(
            document = %doc.path.display(),
            record = %saved.display(),
            "document persisted"
        );
        Ok(result)
    }

    /// Stage 1: direction classification
    async fn classify(&self, doc: &LoadedDocument) -> Result<ClassificationResult, ExtractorError> {
        let messages = classification_messages(&doc.text, &self.my_party);
        let raw = self.call(&messages).await?;
        let parsed = parse_object_lossy(&raw);

        let direction = Direction::normalize(
            parsed
                .get("direction")
                .and_then(Value::as_str)
                .unwrap_or("upstream"),
        );
        let confidence = parsed
            .get("confidence")
            .map(number_or_parsed)
            .unwrap_or(0.0);
        let reason = parsed.get("reason").map(value_to_text).unwrap_or_default();

        Ok(ClassificationResult::new(direction, confidence, reason, raw))
    }

    /// Stage 3: field extraction against the resolved header set.
    ///
    /// Whatever the model returned, the resulting map's key-set is exactly
    /// `headers`: omitted keys become null, surplus keys are discarded.
    async fn extract(
        &self,
        doc: &LoadedDocument,
        headers: &[String],
        direction: Direction,
    ) -> Result<(Map<String, Value>, String), ExtractorError> {
        let messages = extraction_messages(&doc.text, headers, &self.my_party, direction);
        let raw = self.call(&messages).await?;
        let parsed = parse_object_lossy(&raw);

        let mut fields = Map::new();
        for header in headers {
            let value = parsed.get(header).cloned().unwrap_or(Value::Null);
            fields.insert(header.clone(), value);
        }
        Ok((fields, raw))
    }

    /// Stage 4: resolve the contract type, then fill its note template
    async fn generate_note(
        &self,
        doc: &LoadedDocument,
        catalog: &ContractTypeCatalog,
    ) -> Result<(String, String), ExtractorError> {
        let type_name = self.identify_contract_type(doc, catalog).await?;

        let contract_type = catalog
            .get(&type_name)
            .or_else(|| catalog.get(GENERIC_TYPE));
        let Some(contract_type) = contract_type else {
            warn!(contract_type = %type_name, "no template for resolved type");
            return Ok((type_name, "无法生成备注：未找到对应模板".to_string()));
        };

        let messages = note_generation_messages(
            &doc.text,
            &type_name,
            &contract_type.template,
            &self.my_party,
        );
        let raw = self.call(&messages).await?;
        Ok((type_name, strip_code_fence(&raw)))
    }

    /// Resolve the contract type through the keyword hint and the model.
    ///
    /// The model's answer only counts when it names a configured type;
    /// anything else falls back to the keyword hint, then the generic type.
    async fn identify_contract_type(
        &self,
        doc: &LoadedDocument,
        catalog: &ContractTypeCatalog,
    ) -> Result<String, ExtractorError> {
        let hint = catalog.keyword_hint(&doc.text);
        let listing = catalog.prompt_listing();
        let messages = type_classification_messages(&doc.text, &listing, hint);
        let raw = self.call(&messages).await?;
        let parsed = parse_object_lossy(&raw);

        if let Some(name) = parsed.get("contract_type").and_then(Value::as_str) {
            if catalog.get(name).is_some() {
                return Ok(name.to_string());
            }
            debug!(returned = name, "model named an unconfigured type");
        }
        Ok(hint.unwrap_or(GENERIC_TYPE).to_string())
    }

    async fn call(&self, messages: &[ChatMessage]) -> Result<String, ExtractorError> {
        self.gateway
            .chat(messages, ChatOptions::default())
            .await
            .map_err(|e| ExtractorError::Gateway(e.to_string()))
    }
}

/// Coerce a JSON value to a float the way the replies actually arrive:
/// numbers directly, numeric strings parsed, everything else zero.
fn number_or_parsed(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn confidence_coercion_handles_strings() {
        assert_eq!(number_or_parsed(&Value::String("1.5".to_string())), 1.5);
        assert_eq!(number_or_parsed(&Value::String("oops".to_string())), 0.0);
        assert_eq!(
            number_or_parsed(&serde_json::json!(0.82)),
            0.82
        );
        assert_eq!(number_or_parsed(&Value::Null), 0.0);
    }
}
