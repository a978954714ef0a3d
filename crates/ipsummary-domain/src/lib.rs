//! ipsummary Domain Layer
//!
//! Core data model for the contract extraction pipeline. This crate defines
//! the records that flow between the orchestrator, the LLM gateway, and the
//! result store, plus the trait seam for text-generation providers.
//!
//! ## Key Concepts
//!
//! - **Direction**: whether a contract brings rights in (upstream) or grants
//!   them out (downstream), relative to "our" party
//! - **ClassificationResult**: the model's direction verdict with a clamped
//!   confidence and a short reason
//! - **ExtractionResult**: the central per-document record; its `fields` map
//!   always carries exactly the header set for its direction
//! - **HeaderDefinition**: the ordered output columns per direction
//!
//! ## Architecture
//!
//! Infrastructure implementations (HTTP providers, on-disk stores) live in
//! other crates; this crate holds only data and the `LlmProvider` trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classification;
pub mod contract_type;
pub mod direction;
pub mod document;
pub mod extraction;
pub mod traits;

// Re-exports for convenience
pub use classification::ClassificationResult;
pub use contract_type::ContractType;
pub use direction::Direction;
pub use document::LoadedDocument;
pub use extraction::{ExtractionResult, HeaderDefinition};
pub use traits::{ChatMessage, ChatOptions, LlmProvider};
