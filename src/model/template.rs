//! # Response Templates
//!
//! The response half of a contract: per-output-field templates and the
//! anonymization rules applied after rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Redaction method named by an anonymization rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymizationMethod {
    /// Pattern or full-length `*` masking
    Mask,
    /// SHA-256 hex digest
    Hash,
    /// Random opaque token
    Randomize,
    /// Any other name; the value passes through unchanged
    Passthrough,
}

impl AnonymizationMethod {
    pub fn from_name(name: &str) -> Self {
        match name {
            "mask" => AnonymizationMethod::Mask,
            "hash" => AnonymizationMethod::Hash,
            "randomize" => AnonymizationMethod::Randomize,
            _ => AnonymizationMethod::Passthrough,
        }
    }
}

/// Redaction policy for one output field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationRule {
    /// Output field name (a template key, not a source column)
    pub field: String,

    /// `mask`, `hash`, `randomize`; anything else is a no-op
    pub method: String,

    /// Mask pattern; `X` marks a slot filled from the source value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl AnonymizationRule {
    pub fn new(field: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            method: method.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn method(&self) -> AnonymizationMethod {
        AnonymizationMethod::from_name(&self.method)
    }

    /// The mask pattern, treating an empty pattern as absent
    pub fn mask_pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}

/// Declarative response shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Output field -> template. Only string values are rendered.
    #[serde(default)]
    pub template: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anonymization: Vec<AnonymizationRule>,
}

impl ResponseTemplate {
    /// Build a template from `(output field, template string)` pairs
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let template = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self {
            template,
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: AnonymizationRule) -> Self {
        self.anonymization.push(rule);
        self
    }

    /// First rule targeting `field`, in declaration order
    pub fn rule_for(&self, field: &str) -> Option<&AnonymizationRule> {
        self.anonymization.iter().find(|r| r.field == field)
    }
}
