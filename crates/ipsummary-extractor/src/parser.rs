//! Normalize raw model replies into typed mappings
//!
//! Models wrap structured output in markdown fences, prepend prose, or emit
//! things that are not JSON at all. A single malformed reply must not abort
//! a batch, so the orchestrator consumes the lossy variant; the `Result`
//! form stays available for anything that wants to observe parse failures.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Why a reply could not be normalized
#[derive(Error, Debug)]
pub enum ParseError {
    /// Reply was not valid JSON
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply parsed, but to something other than an object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Remove a surrounding markdown code fence, if present.
///
/// Handles the common shapes: triple backticks with or without a `json`
/// language tag, with the closing fence on its own line.
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        // One-line reply that is all fence; salvage whatever is between the backticks.
        return trimmed.trim_matches('`').trim().to_string();
    }
    if lines
        .last()
        .is_some_and(|line| line.trim_start().starts_with("```"))
    {
        lines.pop();
    }
    lines.remove(0);
    lines.join("\n").trim().to_string()
}

/// Parse a reply into a JSON object after fence stripping.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(&cleaned)?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(ParseError::NotAnObject("array")),
        Value::String(_) => Err(ParseError::NotAnObject("string")),
        Value::Number(_) => Err(ParseError::NotAnObject("number")),
        Value::Bool(_) => Err(ParseError::NotAnObject("boolean")),
        Value::Null => Err(ParseError::NotAnObject("null")),
    }
}

/// Lossy variant of [`parse_object`]: any failure becomes an empty map.
///
/// "No fields recognized" is a valid outcome for the pipeline, not a crash;
/// affected headers degrade to null and the raw reply is kept for review.
pub fn parse_object_lossy(raw: &str) -> Map<String, Value> {
    match parse_object(raw) {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "discarding unparseable model reply");
            Map::new()
        }
    }
}
