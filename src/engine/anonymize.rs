//! # Anonymization Pipeline
//!
//! Post-processes projected output fields. The first rule whose `field`
//! equals the output field name wins; fields without a rule pass through.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{AnonymizationMethod, AnonymizationRule};

use super::template::ProjectedRow;

const MASK_SLOT: char = 'X';
const MASK_FILL: char = '*';
const SEPARATOR: char = '-';

/// Apply the first matching rule in `rules` to `value`
pub fn anonymize(field: &str, value: &str, rules: &[AnonymizationRule]) -> String {
    match rules.iter().find(|r| r.field == field) {
        Some(rule) => apply_rule(rule, value),
        None => value.to_string(),
    }
}

/// Apply `rules` to every field of a projected row in place
pub fn anonymize_row(row: &mut ProjectedRow, rules: &[AnonymizationRule]) {
    if rules.is_empty() {
        return;
    }
    for (field, value) in row.iter_mut() {
        *value = anonymize(field, value, rules);
    }
}

fn apply_rule(rule: &AnonymizationRule, value: &str) -> String {
    match rule.method() {
        AnonymizationMethod::Mask => match rule.mask_pattern() {
            Some(pattern) => mask_with_pattern(value, pattern),
            None => mask(value),
        },
        AnonymizationMethod::Hash => hash(value),
        AnonymizationMethod::Randomize => randomize(),
        AnonymizationMethod::Passthrough => value.to_string(),
    }
}

/// `*` repeated once per character of `value`
pub fn mask(value: &str) -> String {
    value.chars().map(|_| MASK_FILL).collect()
}

/// Fill each `X` in `pattern` with the next non-separator character of
/// `value`, or `*` once `value` runs out. Other pattern characters are copied.
pub fn mask_with_pattern(value: &str, pattern: &str) -> String {
    let mut source = value.chars().filter(|c| *c != SEPARATOR);
    pattern
        .chars()
        .map(|p| {
            if p == MASK_SLOT {
                source.next().unwrap_or(MASK_FILL)
            } else {
                p
            }
        })
        .collect()
}

/// Lowercase hex SHA-256 digest
pub fn hash(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// A fresh random token, unrelated to any input
pub fn randomize() -> String {
    Uuid::new_v4().to_string()
}
