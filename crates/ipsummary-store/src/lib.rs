//! ipsummary Result Store
//!
//! Persists one JSON record per document under
//! `{intermediate_dir}/{direction}/{stem}.json`, reloads them for review and
//! aggregation, and reshapes a direction's records into tabular outputs.
//!
//! Records are written pretty-printed UTF-8 so reviewers can edit them in
//! place between the extraction run and aggregation. Saving overwrites
//! unconditionally; aggregation only reads. Concurrent runs against the same
//! directory are unsupported.

#![warn(missing_docs)]

mod aggregate;
mod field_converter;
mod headers;

pub use aggregate::{
    aggregate_for_database, aggregate_results, append_history, write_database_outputs,
    write_tabular_outputs, Table, TabularOutputs,
};
pub use field_converter::FieldConverter;
pub use headers::load_header_columns;

use ipsummary_domain::{Direction, ExtractionResult};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors from store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Mapping/config file failure
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Tabular output failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Create every directory in `paths`, parents included
pub fn ensure_directories<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Result<(), StoreError> {
    for path in paths {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Persist one extraction record.
///
/// Writes `{intermediate_dir}/{direction}/{stem}.json`, creating the
/// direction folder on demand. Last write wins; there is no merge with a
/// previously persisted or hand-edited record.
pub fn save_intermediate(
    result: &ExtractionResult,
    intermediate_dir: &Path,
) -> Result<PathBuf, StoreError> {
    let target_dir = intermediate_dir.join(result.direction.as_str());
    fs::create_dir_all(&target_dir)?;
    let output_path = target_dir.join(format!("{}.json", result.stem()));
    let payload = serde_json::to_string_pretty(result)?;
    fs::write(&output_path, payload)?;
    Ok(output_path)
}

/// Load every record in `folder`, filtered to `direction`.
///
/// Files are read in name-ascending order so aggregation output is
/// deterministic. A record whose stored direction disagrees with the folder
/// it sits in is dropped with a warning: hand-moved files carry the wrong
/// header set and would corrupt the table.
pub fn load_intermediate_folder(
    folder: &Path,
    direction: Direction,
) -> Result<Vec<ExtractionResult>, StoreError> {
    let mut files: Vec<PathBuf> = match fs::read_dir(folder) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    files.sort();

    let mut results = Vec::new();
    for path in files {
        let payload = fs::read_to_string(&path)?;
        let record: ExtractionResult = serde_json::from_str(&payload)?;
        if record.direction != direction {
            warn!(
                path = %path.display(),
                stored = %record.direction,
                expected = %direction,
                "dropping record with mismatched direction"
            );
            continue;
        }
        results.push(record);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipsummary_domain::ClassificationResult;
    use serde_json::{Map, Value};

    pub(crate) fn sample_result(stem: &str, direction: Direction) -> ExtractionResult {
        let mut fields = Map::new();
        fields.insert("作品名称".to_string(), Value::String("示例作品".to_string()));
        fields.insert("合同类型".to_string(), Value::Null);
        ExtractionResult {
            contract_path: PathBuf::from(format!("input/{stem}.txt")),
            direction,
            my_party: "上海玄霆".to_string(),
            fields,
            raw_extraction: Some("{}".to_string()),
            classification: ClassificationResult::new(direction, 0.9, "取得授权", "raw"),
            prompt_version: "v1.2".to_string(),
            notes: None,
        }
    }

    #[test]
    fn save_creates_direction_folder_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result("合同A", Direction::Upstream);

        let path = save_intermediate(&result, dir.path()).unwrap();
        assert!(path.ends_with("upstream/合同A.json"));

        let mut edited = result.clone();
        edited.my_party = "改写后".to_string();
        let second = save_intermediate(&edited, dir.path()).unwrap();
        assert_eq!(path, second);

        let loaded = load_intermediate_folder(&dir.path().join("upstream"), Direction::Upstream)
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].my_party, "改写后");
    }

    #[test]
    fn load_drops_mismatched_direction() {
        let dir = tempfile::tempdir().unwrap();
        save_intermediate(&sample_result("a", Direction::Upstream), dir.path()).unwrap();

        // Simulate a hand-moved file: downstream record in the upstream folder.
        let stray = sample_result("b", Direction::Downstream);
        let payload = serde_json::to_string_pretty(&stray).unwrap();
        fs::write(dir.path().join("upstream").join("b.json"), payload).unwrap();

        let loaded =
            load_intermediate_folder(&dir.path().join("upstream"), Direction::Upstream).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].stem(), "a");
    }

    #[test]
    fn load_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded =
            load_intermediate_folder(&dir.path().join("nowhere"), Direction::Upstream).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn load_reads_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for stem in ["c", "a", "b"] {
            save_intermediate(&sample_result(stem, Direction::Upstream), dir.path()).unwrap();
        }
        let loaded =
            load_intermediate_folder(&dir.path().join("upstream"), Direction::Upstream).unwrap();
        let stems: Vec<String> = loaded.iter().map(|r| r.stem()).collect();
        assert_eq!(stems, ["a", "b", "c"]);
    }
}
