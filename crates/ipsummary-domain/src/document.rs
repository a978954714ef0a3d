//! Input document representation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A contract document after text extraction.
///
/// Immutable once loaded; everything downstream (classification, field
/// extraction, persisted records) derives from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedDocument {
    /// Original file path
    pub path: PathBuf,

    /// Full contract text, trimmed
    pub text: String,

    /// Loader-provided metadata (filename, relative path, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl LoadedDocument {
    /// File stem used as the persisted record's key
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_extension() {
        let doc = LoadedDocument {
            path: PathBuf::from("/contracts/授权合同A.txt"),
            text: "text".to_string(),
            metadata: HashMap::new(),
        };
        assert_eq!(doc.stem(), "授权合同A");
    }
}
