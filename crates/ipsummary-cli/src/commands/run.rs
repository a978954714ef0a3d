//! `run`: classify and extract a batch of contracts

use crate::cli::RunArgs;
use crate::document::{load_document, scan_documents};
use crate::error::Result;
use crate::tasks::TaskManager;
use ipsummary_domain::HeaderDefinition;
use ipsummary_extractor::{ContractPipeline, ContractTypeCatalog, Settings};
use ipsummary_llm::{DeepSeekConfig, DeepSeekProvider, Gateway};
use ipsummary_store::load_header_columns;
use std::path::Path;
use tracing::info;

pub async fn execute_run(args: RunArgs, config_path: &Path) -> Result<()> {
    let mut settings = Settings::load(config_path)?;

    // A task's folders apply first; explicit flags still win.
    let tracker = match &args.task {
        Some(task_id) => {
            let manager = TaskManager::new(&args.task_root)?;
            let task = manager.get_task(task_id)?;
            settings.pipeline.input_dir = task.input_dir.clone();
            settings.pipeline.intermediate_dir = task.intermediate_dir.clone();
            settings.pipeline.final_dir = task.final_dir.clone();
            Some((manager, task.id))
        }
        None => None,
    };

    if let Some(dir) = args.input_dir {
        settings.pipeline.input_dir = dir;
    }
    if let Some(dir) = args.intermediate_dir {
        settings.pipeline.intermediate_dir = dir;
    }
    if let Some(concurrency) = args.concurrency {
        settings.pipeline.concurrent_requests = concurrency;
    }
    settings.validate()?;

    let headers = HeaderDefinition {
        upstream_headers: load_header_columns(&args.upstream_headers)?,
        downstream_headers: load_header_columns(&args.downstream_headers)?,
    };

    let paths = scan_documents(&settings.pipeline.input_dir)?;
    let documents = paths
        .iter()
        .map(|p| load_document(p))
        .collect::<Result<Vec<_>>>()?;
    info!(
        documents = documents.len(),
        input_dir = %settings.pipeline.input_dir.display(),
        "documents loaded"
    );

    let provider = DeepSeekProvider::new(DeepSeekConfig::from(&settings.llm))?;
    let gateway = Gateway::new(provider, settings.pipeline.concurrent_requests);

    let mut pipeline = ContractPipeline::new(
        gateway,
        headers,
        &args.my_party,
        &settings.pipeline.intermediate_dir,
    )
    .with_force_direction(args.force_direction)
    .with_failure_policy(settings.pipeline.failure_policy);

    let note_templates = args
        .note_templates
        .or_else(|| settings.pipeline.note_templates.clone());
    if let Some(path) = note_templates {
        if path.exists() {
            pipeline = pipeline.with_contract_types(ContractTypeCatalog::load(&path)?);
        }
    }

    if let Some((manager, task_id)) = &tracker {
        manager.update_status(task_id, "running", None)?;
    }

    let report = match pipeline.run(&documents).await {
        Ok(report) => report,
        Err(e) => {
            if let Some((manager, task_id)) = &tracker {
                manager.update_status(task_id, "failed", Some(e.to_string()))?;
            }
            return Err(e.into());
        }
    };

    if let Some((manager, task_id)) = &tracker {
        manager.update_status(
            task_id,
            "completed",
            Some(format!(
                "{} extracted, {} failed",
                report.results.len(),
                report.failures.len()
            )),
        )?;
    }

    println!(
        "Extracted {} of {} documents into {}",
        report.results.len(),
        documents.len(),
        settings.pipeline.intermediate_dir.display()
    );
    for failure in &report.failures {
        println!(
            "  failed ({}): {}: {}",
            failure.kind,
            failure.document.display(),
            failure.detail
        );
    }
    Ok(())
}
