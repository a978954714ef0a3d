//! Run settings
//!
//! Loaded once from a YAML file before any document is processed; every
//! problem found here is fatal at startup. The API key may come from the
//! `DEEPSEEK_API_KEY` environment variable instead of the file so secrets
//! stay out of checked-in configs.

use crate::error::ExtractorError;
use ipsummary_llm::DeepSeekConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// LLM backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider label (informational)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key; overridable via `DEEPSEEK_API_KEY`
    #[serde(default)]
    pub api_key: String,

    /// Service root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Default sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling parameter
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Default output token cap
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// What a gateway failure on one document means for the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// First failure aborts the whole batch (reference behavior)
    #[default]
    Abort,
    /// The failed document is recorded and the rest continue
    Isolate,
}

/// Batch pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Folder scanned for contract documents
    pub input_dir: PathBuf,

    /// Per-document JSON records land here, split by direction
    pub intermediate_dir: PathBuf,

    /// Aggregated tables land here
    pub final_dir: PathBuf,

    /// Cumulative history logs land here
    pub history_dir: PathBuf,

    /// Admission cap on concurrent gateway calls
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Batch-level reaction to a document's gateway failure
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Contract-type templates for the note stage; absent = stage disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_templates: Option<PathBuf>,
}

impl PipelineSettings {
    /// Resolve every configured path relative to `base`
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.input_dir = resolve(base, self.input_dir);
        self.intermediate_dir = resolve(base, self.intermediate_dir);
        self.final_dir = resolve(base, self.final_dir);
        self.history_dir = resolve(base, self.history_dir);
        self.note_templates = self.note_templates.map(|p| resolve(base, p));
        self
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Full run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// LLM backend settings
    pub llm: LlmSettings,
    /// Batch pipeline settings
    pub pipeline: PipelineSettings,
}

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// The `DEEPSEEK_API_KEY` environment variable, when set, replaces the
    /// file's API key. Pipeline paths resolve relative to the project root:
    /// the config file's grandparent when the file sits in a `config/`
    /// folder, otherwise its parent.
    pub fn load(config_path: &Path) -> Result<Self, ExtractorError> {
        if !config_path.exists() {
            return Err(ExtractorError::Config(format!(
                "missing config file at {}; copy the example config and fill in your values",
                config_path.display()
            )));
        }

        let payload = fs::read_to_string(config_path)?;
        let mut settings: Settings = serde_yaml::from_str(&payload)?;

        if let Ok(key) = std::env::var("DEEPSEEK_API_KEY") {
            if !key.is_empty() {
                settings.llm.api_key = key;
            }
        }

        let parent = config_path.parent().unwrap_or_else(|| Path::new("."));
        let base = if parent.file_name().is_some_and(|name| name == "config") {
            parent.parent().unwrap_or(parent).to_path_buf()
        } else {
            parent.to_path_buf()
        };
        settings.pipeline = settings.pipeline.resolve_paths(&base);

        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings before any document is processed
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ExtractorError::Config(
                "llm.api_key is empty (set it in the config file or via DEEPSEEK_API_KEY)"
                    .to_string(),
            ));
        }
        if self.pipeline.concurrent_requests == 0 {
            return Err(ExtractorError::Config(
                "pipeline.concurrent_requests must be greater than 0".to_string(),
            ));
        }
        if self.llm.request_timeout == 0 {
            return Err(ExtractorError::Config(
                "llm.request_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&LlmSettings> for DeepSeekConfig {
    fn from(settings: &LlmSettings) -> Self {
        DeepSeekConfig {
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
            request_timeout_secs: settings.request_timeout,
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_output_tokens() -> u32 {
    2000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_concurrent_requests() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("deepseek_config.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    const MINIMAL: &str = concat!(
        "llm:\n",
        "  api_key: sk-test\n",
        "pipeline:\n",
        "  input_dir: input\n",
        "  intermediate_dir: intermediate\n",
        "  final_dir: final\n",
        "  history_dir: history\n",
    );

    #[test]
    fn load_applies_defaults_and_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), MINIMAL);

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.llm.model, "deepseek-chat");
        assert_eq!(settings.llm.temperature, 0.1);
        assert_eq!(settings.pipeline.concurrent_requests, 3);
        assert_eq!(settings.pipeline.failure_policy, FailurePolicy::Abort);
        // Paths resolve against the project root (config/ parent's parent).
        assert_eq!(settings.pipeline.input_dir, dir.path().join("input"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = Settings::load(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn empty_api_key_fails_validation() {
        let mut settings: Settings = serde_yaml::from_str(MINIMAL).unwrap();
        settings.llm.api_key = String::new();
        assert!(matches!(
            settings.validate(),
            Err(ExtractorError::Config(_))
        ));
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let mut settings: Settings = serde_yaml::from_str(MINIMAL).unwrap();
        settings.pipeline.concurrent_requests = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn failure_policy_parses_lowercase() {
        let body = format!("{MINIMAL}  failure_policy: isolate\n");
        let settings: Settings = serde_yaml::from_str(&body).unwrap();
        assert_eq!(settings.pipeline.failure_policy, FailurePolicy::Isolate);
    }
}
