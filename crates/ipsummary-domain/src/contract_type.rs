//! Contract type definitions for the note-generation stage

use serde::{Deserialize, Serialize};

/// A named contract category with its note template.
///
/// `keywords` drive the cheap pre-filter before the model confirms the
/// type; `template` contains `{占位符}` markers the note-generation stage
/// asks the model to fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractType {
    /// Category name (e.g. "作品授权合同")
    pub name: String,

    /// Literal keywords scored against the contract text
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Note template with placeholder markers
    #[serde(default)]
    pub template: String,
}
