//! ipsummary Extractor
//!
//! The concurrent extraction pipeline: classifies contract direction,
//! extracts the configured fields, optionally resolves a contract type and
//! generates a templated note, then persists one record per document.
//!
//! # Architecture
//!
//! ```text
//! Documents → ContractPipeline → Gateway (admission-limited) → LLM
//!                  │                                            │
//!                  └── parser (lossy normalize) ←───────────────┘
//!                  └── store (one JSON record per document)
//! ```
//!
//! # Key Properties
//!
//! - **Key-set invariant**: every record's `fields` map carries exactly the
//!   header list for its resolved direction, nulls for the rest
//! - **Lossy normalization**: a malformed model reply degrades that
//!   document's fields to null instead of aborting the batch
//! - **Bounded fan-out**: all stages of all documents share one admission
//!   limiter; the result order is the scan order regardless of completion
//!   order
//! - **Immediate persistence**: each record is written as its document
//!   finishes, not when the batch ends

#![warn(missing_docs)]

mod config;
mod contract_types;
mod error;
mod parser;
mod pipeline;
mod prompt;


pub use config::{FailurePolicy, LlmSettings, PipelineSettings, Settings};
pub use contract_types::{ContractTypeCatalog, GENERIC_TYPE};
pub use error::ExtractorError;
pub use parser::{parse_object, parse_object_lossy, strip_code_fence, ParseError};
pub use pipeline::{
    BatchReport, ContractPipeline, DocumentFailure, FailureKind,
};
pub use prompt::{
    classification_messages, extraction_messages, note_generation_messages,
    type_classification_messages, PROMPT_VERSION,
};
