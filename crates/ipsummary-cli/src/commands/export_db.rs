//! `export-db`: aggregation with text-to-code conversion

use super::aggregate::prepare;
use crate::cli::ExportDbArgs;
use crate::error::Result;
use ipsummary_store::{aggregate_for_database, write_database_outputs, FieldConverter};
use std::path::Path;

pub fn execute_export_db(args: ExportDbArgs, config_path: &Path) -> Result<()> {
    let (settings, headers, basename) = prepare(&args.aggregate, config_path)?;

    let converter = match &args.field_mappings {
        Some(path) => FieldConverter::load(path)?,
        None => FieldConverter::empty(),
    };

    let table = aggregate_for_database(
        &settings.pipeline.intermediate_dir,
        &headers,
        args.aggregate.direction,
        &converter,
    )?;
    let outputs = write_database_outputs(&table, &settings.pipeline.final_dir, &basename)?;

    println!(
        "Exported {} rows for database import: {} and {}",
        table.rows.len(),
        outputs.csv.display(),
        outputs.excel.display()
    );
    Ok(())
}
