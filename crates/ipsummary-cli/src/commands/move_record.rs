//! `move`: re-home a reviewed record to the other direction
//!
//! Reviewers sometimes overrule the classifier. Moving the file alone would
//! leave a record whose stored direction disagrees with its folder, and the
//! loader drops those, so the stored direction is rewritten along with the
//! move. The fields keep the original direction's header set; the reviewer
//! is expected to fix them up before aggregating.

use crate::cli::MoveArgs;
use crate::error::{CliError, Result};
use ipsummary_domain::ExtractionResult;
use ipsummary_extractor::Settings;
use std::fs;
use std::path::Path;

pub fn execute_move(args: MoveArgs, config_path: &Path) -> Result<()> {
    if args.direction_from == args.direction_to {
        return Err(CliError::InvalidInput(
            "source and target direction are the same".to_string(),
        ));
    }

    let intermediate_dir = match &args.intermediate_dir {
        Some(dir) => dir.clone(),
        None => Settings::load(config_path)?.pipeline.intermediate_dir,
    };

    let source = intermediate_dir
        .join(args.direction_from.as_str())
        .join(&args.filename);
    if !source.exists() {
        return Err(CliError::InvalidInput(format!(
            "no record at {}",
            source.display()
        )));
    }

    let payload = fs::read_to_string(&source)?;
    let mut record: ExtractionResult = serde_json::from_str(&payload)?;
    record.direction = args.direction_to;

    let target_dir = intermediate_dir.join(args.direction_to.as_str());
    fs::create_dir_all(&target_dir)?;
    let target = target_dir.join(&args.filename);
    fs::write(&target, serde_json::to_string_pretty(&record)?)?;
    fs::remove_file(&source)?;

    println!("Moved {} -> {}", source.display(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MoveArgs;
    use ipsummary_domain::{ClassificationResult, Direction};
    use serde_json::Map;
    use std::path::PathBuf;

    fn record(direction: Direction) -> ExtractionResult {
        ExtractionResult {
            contract_path: PathBuf::from("input/合同A.txt"),
            direction,
            my_party: "上海玄霆".to_string(),
            fields: Map::new(),
            raw_extraction: None,
            classification: ClassificationResult::new(direction, 0.5, "r", "raw"),
            prompt_version: "v1.2".to_string(),
            notes: None,
        }
    }

    #[test]
    fn move_rewrites_stored_direction() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = dir.path().join("upstream");
        fs::create_dir_all(&upstream).unwrap();
        fs::write(
            upstream.join("合同A.json"),
            serde_json::to_string_pretty(&record(Direction::Upstream)).unwrap(),
        )
        .unwrap();

        let args = MoveArgs {
            filename: "合同A.json".to_string(),
            direction_from: Direction::Upstream,
            direction_to: Direction::Downstream,
            intermediate_dir: Some(dir.path().to_path_buf()),
        };
        execute_move(args, Path::new("unused.yaml")).unwrap();

        assert!(!upstream.join("合同A.json").exists());
        let moved = dir.path().join("downstream").join("合同A.json");
        let parsed: ExtractionResult =
            serde_json::from_str(&fs::read_to_string(&moved).unwrap()).unwrap();
        assert_eq!(parsed.direction, Direction::Downstream);
    }

    #[test]
    fn same_direction_is_rejected() {
        let args = MoveArgs {
            filename: "x.json".to_string(),
            direction_from: Direction::Upstream,
            direction_to: Direction::Upstream,
            intermediate_dir: Some(PathBuf::from(".")),
        };
        assert!(matches!(
            execute_move(args, Path::new("unused.yaml")),
            Err(CliError::InvalidInput(_))
        ));
    }
}
