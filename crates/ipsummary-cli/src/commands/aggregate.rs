//! `aggregate`: assemble reviewed records into CSV tables

use crate::cli::AggregateArgs;
use crate::error::Result;
use ipsummary_extractor::Settings;
use ipsummary_store::{aggregate_results, append_history, load_header_columns, write_tabular_outputs};
use std::path::Path;

/// Shared setup for the aggregation-style commands: settings with overrides
/// applied, the header list for the requested direction, and the resolved
/// output basename.
pub(super) fn prepare(
    args: &AggregateArgs,
    config_path: &Path,
) -> Result<(Settings, Vec<String>, String)> {
    let mut settings = Settings::load(config_path)?;
    if let Some(dir) = &args.intermediate_dir {
        settings.pipeline.intermediate_dir = dir.clone();
    }
    if let Some(dir) = &args.final_dir {
        settings.pipeline.final_dir = dir.clone();
    }
    if let Some(dir) = &args.history_dir {
        settings.pipeline.history_dir = dir.clone();
    }

    let headers_path = match args.direction {
        ipsummary_domain::Direction::Upstream => &args.upstream_headers,
        ipsummary_domain::Direction::Downstream => &args.downstream_headers,
    };
    let headers = load_header_columns(headers_path)?;

    let basename = args.basename.clone().unwrap_or_else(|| {
        format!(
            "{}_{}",
            args.direction,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )
    });
    Ok((settings, headers, basename))
}

pub fn execute_aggregate(args: AggregateArgs, config_path: &Path) -> Result<()> {
    let (settings, headers, basename) = prepare(&args, config_path)?;

    let table = aggregate_results(
        &settings.pipeline.intermediate_dir,
        &headers,
        args.direction,
    )?;
    let outputs = write_tabular_outputs(&table, &settings.pipeline.final_dir, &basename)?;

    let history_file = settings
        .pipeline
        .history_dir
        .join(format!("{}_history.csv", args.direction));
    append_history(&table, &history_file)?;

    println!(
        "Aggregated {} rows: {} and {} (history: {})",
        table.rows.len(),
        outputs.csv.display(),
        outputs.excel.display(),
        history_file.display()
    );
    Ok(())
}
