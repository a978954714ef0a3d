//! Text→code conversion for database ingestion
//!
//! The extraction prompts force human-readable Chinese values for
//! categorical fields; the downstream database wants the numeric codes
//! back. Mappings are user-configured YAML; header names are fuzzy-matched
//! because the spreadsheet headers often embed the code legend
//! ("合同类型 1：主合同，2 补充合同3 终止合同").

use crate::StoreError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Converts field values back to their configured numeric codes.
///
/// Mappings keep their configuration-file order: the substring fallbacks
/// resolve to the first entry that matches, so order is meaningful.
#[derive(Debug, Clone, Default)]
pub struct FieldConverter {
    mappings: Vec<(String, Vec<(String, i64)>)>,
}

impl FieldConverter {
    /// A converter with no mappings; every value passes through unchanged
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load mappings from a YAML file.
    ///
    /// Expected shape: `field_mappings: {字段名: {文字值: 编号, ...}, ...}`.
    /// A missing file yields an empty converter.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let payload = fs::read_to_string(path)?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&payload)?;

        let mut mappings = Vec::new();
        if let Some(serde_yaml::Value::Mapping(fields)) = doc.get("field_mappings") {
            for (field, values) in fields {
                let Some(field_name) = field.as_str() else {
                    continue;
                };
                let mut pairs = Vec::new();
                if let serde_yaml::Value::Mapping(entries) = values {
                    for (text, code) in entries {
                        if let (Some(text), Some(code)) = (text.as_str(), code.as_i64()) {
                            pairs.push((text.to_string(), code));
                        }
                    }
                }
                mappings.push((field_name.to_string(), pairs));
            }
        }
        Ok(Self { mappings })
    }

    /// Number of configured field mappings
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True when no mappings are configured
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn mapping_for(&self, field_name: &str) -> Option<&[(String, i64)]> {
        let normalized = normalize_field_name(field_name);

        if let Some((_, pairs)) = self.mappings.iter().find(|(key, _)| key == normalized) {
            return Some(pairs);
        }
        self.mappings
            .iter()
            .find(|(key, _)| normalized.contains(key.as_str()) || key.contains(normalized))
            .map(|(_, pairs)| pairs.as_slice())
    }

    /// Convert one field value to its code.
    ///
    /// Nulls and numbers pass through; strings that parse as integers are
    /// taken as already-coded; otherwise the field's mapping is consulted
    /// (exact match, then bidirectional substring match). Unconvertible
    /// values come back unchanged rather than being dropped.
    pub fn convert(&self, field_name: &str, value: &Value) -> Value {
        let text = match value {
            Value::Null | Value::Number(_) | Value::Bool(_) => return value.clone(),
            Value::String(s) => s.trim(),
            other => return other.clone(),
        };

        if let Ok(code) = text.parse::<i64>() {
            return Value::Number(code.into());
        }

        let Some(mapping) = self.mapping_for(field_name) else {
            return value.clone();
        };

        if let Some((_, code)) = mapping.iter().find(|(entry, _)| entry == text) {
            return Value::Number((*code).into());
        }
        if let Some((_, code)) = mapping
            .iter()
            .find(|(entry, _)| text.contains(entry.as_str()) || entry.contains(text))
        {
            return Value::Number((*code).into());
        }

        value.clone()
    }
}

/// Cut a header name down to its bare field name.
///
/// Headers embed their code legend after the first digit or punctuation
/// ("合同类型 1：主合同..." → "合同类型").
fn normalize_field_name(field_name: &str) -> &str {
    for (idx, ch) in field_name.char_indices() {
        if ch.is_numeric() || matches!(ch, '：' | ':' | '（' | '(') {
            return field_name[..idx].trim();
        }
    }
    field_name.trim()
}
