//! Document scanning and loading
//!
//! The pipeline only needs `(path, text)` pairs; anything that can produce
//! clean UTF-8 text belongs here. PDF/DOCX parsing is not implemented:
//! convert those to text before dropping them into the input folder.

use crate::error::{CliError, Result};
use ipsummary_domain::LoadedDocument;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions the scanner picks up
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Recursively scan `root` for supported contract files, sorted by path.
///
/// The sort fixes the batch's scan order, which in turn fixes the order of
/// the pipeline's result list.
pub fn scan_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, files)?;
        } else if is_supported(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Load one document as UTF-8 text with loader metadata
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    if !is_supported(path) {
        return Err(CliError::InvalidInput(format!(
            "unsupported file type for {}",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;

    let mut metadata = HashMap::new();
    metadata.insert(
        "filename".to_string(),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    metadata.insert("relative_path".to_string(), path.display().to_string());

    Ok(LoadedDocument {
        path: path.to_path_buf(),
        text: text.trim().to_string(),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("nested/a.md"), "a").unwrap();
        fs::write(dir.path().join("skip.pdf"), "binary").unwrap();

        let files = scan_documents(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.txt"));
        assert!(files[1].ends_with("nested/a.md"));
    }

    #[test]
    fn load_trims_and_fills_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("合同.txt");
        fs::write(&path, "\n  合同正文  \n").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.text, "合同正文");
        assert_eq!(doc.metadata["filename"], "合同.txt");
        assert_eq!(doc.stem(), "合同");
    }

    #[test]
    fn load_rejects_unsupported_types() {
        let result = load_document(Path::new("contract.pdf"));
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
