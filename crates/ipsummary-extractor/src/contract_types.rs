//! Contract-type catalog and keyword pre-filtering

use crate::error::ExtractorError;
use ipsummary_domain::ContractType;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the catch-all type used when nothing else matches
pub const GENERIC_TYPE: &str = "通用类型";

#[derive(Deserialize, Default)]
struct RawContractType {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    template: String,
}

/// The configured contract types, in definition order.
///
/// Definition order matters twice: keyword-score ties resolve to the
/// first-defined type, and the prompt listing numbers types in this order.
#[derive(Debug, Clone, Default)]
pub struct ContractTypeCatalog {
    types: Vec<ContractType>,
}

impl ContractTypeCatalog {
    /// Load the catalog from a YAML file (`contract_types: {name: {keywords, template}}`)
    pub fn load(path: &Path) -> Result<Self, ExtractorError> {
        let payload = fs::read_to_string(path)?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&payload)?;

        let mut types = Vec::new();
        if let Some(serde_yaml::Value::Mapping(entries)) = doc.get("contract_types") {
            for (name, cfg) in entries {
                let Some(name) = name.as_str() else {
                    continue;
                };
                let raw: RawContractType = serde_yaml::from_value(cfg.clone())?;
                types.push(ContractType {
                    name: name.to_string(),
                    keywords: raw.keywords,
                    template: raw.template,
                });
            }
        }
        Ok(Self { types })
    }

    /// True when no types are configured (note stage disabled)
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of configured types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Look up a type by name
    pub fn get(&self, name: &str) -> Option<&ContractType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Cheap keyword pre-filter ahead of the model call.
    ///
    /// Counts literal keyword occurrences per type and returns the type
    /// with the highest nonzero score. Ties go to the first-defined type;
    /// types without keywords (like the generic fallback) never score.
    pub fn keyword_hint(&self, contract_text: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for ct in &self.types {
            if ct.keywords.is_empty() {
                continue;
            }
            let score = ct
                .keywords
                .iter()
                .filter(|kw| contract_text.contains(kw.as_str()))
                .count();
            if score > 0 && best.is_none_or(|(_, s)| score > s) {
                best = Some((&ct.name, score));
            }
        }
        best.map(|(name, _)| name)
    }

    /// Numbered type listing embedded in the type-classification prompt
    pub fn prompt_listing(&self) -> String {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ct)| {
                let keywords = if ct.keywords.is_empty() {
                    "无特定关键词".to_string()
                } else {
                    ct.keywords
                        .iter()
                        .take(3)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("、")
                };
                format!("{}. {}（关键特征：{}）", i + 1, ct.name, keywords)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
