//! Command-line argument definitions

use clap::{Args, Parser, Subcommand};
use ipsummary_domain::Direction;
use std::path::PathBuf;

/// LLM-based IP contract summarizer
#[derive(Debug, Parser)]
#[command(name = "ipsummary", version, about)]
pub struct Cli {
    /// Path to the YAML config
    #[arg(long, global = true, default_value = "config/deepseek_config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify and extract contracts
    Run(RunArgs),
    /// Aggregate reviewed records into CSV tables
    Aggregate(AggregateArgs),
    /// Aggregate with text→code conversion for database import
    ExportDb(ExportDbArgs),
    /// Move a reviewed record to the other direction
    Move(MoveArgs),
    /// Task-directory bookkeeping
    Task(TaskArgs),
}

/// Arguments for `run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// 我方主体, e.g. 上海玄霆
    #[arg(long)]
    pub my_party: String,

    /// CSV export of the upstream header sheet
    #[arg(long)]
    pub upstream_headers: PathBuf,

    /// CSV export of the downstream header sheet
    #[arg(long)]
    pub downstream_headers: PathBuf,

    /// Override the input folder containing contracts
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Override the intermediate output folder
    #[arg(long)]
    pub intermediate_dir: Option<PathBuf>,

    /// Max concurrent LLM calls (default from config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Force direction for all contracts (skip auto classification)
    #[arg(long)]
    pub force_direction: Option<Direction>,

    /// Contract-type templates for the note stage (default from config)
    #[arg(long)]
    pub note_templates: Option<PathBuf>,

    /// Run against a task's folders and track its status
    #[arg(long)]
    pub task: Option<String>,

    /// Root folder holding task directories
    #[arg(long, default_value = "tasks")]
    pub task_root: PathBuf,
}

/// Arguments for `aggregate`
#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Which contract direction to aggregate
    #[arg(long)]
    pub direction: Direction,

    /// Output file basename (default: direction_YYYYMMDD_HHMMSS)
    #[arg(long)]
    pub basename: Option<String>,

    /// CSV export of the upstream header sheet
    #[arg(long)]
    pub upstream_headers: PathBuf,

    /// CSV export of the downstream header sheet
    #[arg(long)]
    pub downstream_headers: PathBuf,

    /// Override the intermediate folder
    #[arg(long)]
    pub intermediate_dir: Option<PathBuf>,

    /// Override the final output folder
    #[arg(long)]
    pub final_dir: Option<PathBuf>,

    /// Override the history folder
    #[arg(long)]
    pub history_dir: Option<PathBuf>,
}

/// Arguments for `export-db`
#[derive(Debug, Args)]
pub struct ExportDbArgs {
    #[command(flatten)]
    pub aggregate: AggregateArgs,

    /// YAML file mapping text values back to database codes
    #[arg(long)]
    pub field_mappings: Option<PathBuf>,
}

/// Arguments for `move`
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Record file name, e.g. 合同A.json
    #[arg(long)]
    pub filename: String,

    /// Direction folder the record currently sits in
    #[arg(long = "from")]
    pub direction_from: Direction,

    /// Direction folder to move it to
    #[arg(long = "to")]
    pub direction_to: Direction,

    /// Override the intermediate folder
    #[arg(long)]
    pub intermediate_dir: Option<PathBuf>,
}

/// Arguments for `task`
#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Root folder holding task directories
    #[arg(long, default_value = "tasks")]
    pub task_root: PathBuf,

    #[command(subcommand)]
    pub action: TaskAction,
}

/// Task subcommands
#[derive(Debug, Subcommand)]
pub enum TaskAction {
    /// Create a task with its folder skeleton
    New {
        /// Human-readable label
        #[arg(long)]
        name: String,
        /// Party treated as "us" for this task
        #[arg(long)]
        my_party: String,
    },
    /// List all tasks
    List,
    /// Show one task
    Show {
        /// Task identifier
        id: String,
    },
}
