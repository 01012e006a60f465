//! # Template Projector
//!
//! Renders each output field's template against one result row.
//!
//! Syntax: literal text with `{{ .column }}` actions. `{{- ` trims whitespace
//! before the action and ` -}}` trims whitespace after it.
//!
//! Cell values render as: strings verbatim, null as empty, numbers and
//! booleans in JSON form, arrays and objects as compact JSON.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::decode::ResultRow;
use super::errors::{ExecutionError, ExecutionResult};

/// One projected row: output field -> rendered text
pub type ProjectedRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Column(String),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    /// Parse a template string
    pub fn parse(source: &str) -> ExecutionResult<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            text.push_str(&rest[..open]);
            let mut inner = &rest[open + 2..];

            if let Some(after) = trim_marker_left(inner) {
                text.truncate(text.trim_end().len());
                inner = after;
            }

            let close = inner.find("}}").ok_or_else(|| {
                ExecutionError::TemplateParse(format!("unclosed action in {:?}", source))
            })?;
            let mut action = &inner[..close];
            rest = &inner[close + 2..];

            if let Some(before) = trim_marker_right(action) {
                action = before;
                rest = rest.trim_start();
            }

            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Column(parse_action(action, source)?));
        }

        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { segments })
    }

    /// Render against one row. A referenced column missing from the row fails.
    pub fn render(&self, row: &ResultRow) -> ExecutionResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Column(column) => {
                    let value = row.get(column).ok_or_else(|| {
                        ExecutionError::TemplateRender(format!(
                            "column {:?} not present in row",
                            column
                        ))
                    })?;
                    push_value(&mut out, value);
                }
            }
        }
        Ok(out)
    }

    /// Columns referenced by this template, in order of appearance
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Column(c) => Some(c.as_str()),
            Segment::Text(_) => None,
        })
    }
}

/// The compiled template set of one response shape.
///
/// Non-string template values are skipped and never appear in the output.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    fields: Vec<(String, CompiledTemplate)>,
}

impl Projector {
    pub fn compile(templates: &Map<String, Value>) -> ExecutionResult<Self> {
        let mut fields = Vec::with_capacity(templates.len());
        for (field, template) in templates {
            if let Value::String(source) = template {
                fields.push((field.clone(), CompiledTemplate::parse(source)?));
            }
        }
        Ok(Self { fields })
    }

    /// Render every field for `row`; the first failure aborts the row.
    pub fn project(&self, row: &ResultRow) -> ExecutionResult<ProjectedRow> {
        self.fields
            .iter()
            .map(|(field, template)| Ok((field.clone(), template.render(row)?)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Compile `templates` and render them against `row`
pub fn project(row: &ResultRow, templates: &Map<String, Value>) -> ExecutionResult<ProjectedRow> {
    Projector::compile(templates)?.project(row)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

fn trim_marker_left(inner: &str) -> Option<&str> {
    let after = inner.strip_prefix('-')?;
    after.starts_with(char::is_whitespace).then_some(after)
}

fn trim_marker_right(action: &str) -> Option<&str> {
    let before = action.strip_suffix('-')?;
    before.ends_with(char::is_whitespace).then_some(before)
}

fn parse_action(action: &str, source: &str) -> ExecutionResult<String> {
    let action = action.trim();
    if action.is_empty() {
        return Err(ExecutionError::TemplateParse(format!(
            "empty action in {:?}",
            source
        )));
    }

    match action.strip_prefix('.') {
        Some(column)
            if !column.is_empty()
                && column.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            Ok(column.to_string())
        }
        _ => Err(ExecutionError::TemplateParse(format!(
            "unsupported action {:?} in {:?}",
            action, source
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ResultRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn test_render_substitutes_columns() {
        let template = CompiledTemplate::parse("{{.first}} {{ .last }}").unwrap();
        let rendered = template
            .render(&row(json!({"first": "Ada", "last": "Lovelace"})))
            .unwrap();
        assert_eq!(rendered, "Ada Lovelace");
    }

    #[test]
    fn test_value_text_forms() {
        let template = CompiledTemplate::parse("{{.n}}|{{.f}}|{{.b}}|{{.z}}|{{.a}}").unwrap();
        let rendered = template
            .render(&row(json!({"n": 42, "f": 1.5, "b": true, "z": null, "a": [1, "x"]})))
            .unwrap();
        assert_eq!(rendered, "42|1.5|true||[1,\"x\"]");
    }

    #[test]
    fn test_trim_markers() {
        let template = CompiledTemplate::parse("id:  {{- .id -}}  !").unwrap();
        assert_eq!(template.render(&row(json!({"id": 7}))).unwrap(), "id:7!");
    }

    #[test]
    fn test_literal_only_template() {
        let template = CompiledTemplate::parse("constant").unwrap();
        assert_eq!(template.render(&ResultRow::new()).unwrap(), "constant");
        assert_eq!(template.columns().count(), 0);
    }

    #[test]
    fn test_parse_errors() {
        for source in ["{{.name", "{{}}", "{{ }}", "{{name}}", "{{.}}", "{{.a.b}}", "{{ print 1 }}"] {
            let err = CompiledTemplate::parse(source).unwrap_err();
            assert!(
                matches!(err, ExecutionError::TemplateParse(_)),
                "{:?} should fail to parse",
                source
            );
        }
    }

    #[test]
    fn test_missing_column_is_render_error() {
        let template = CompiledTemplate::parse("{{.email}}").unwrap();
        let err = template.render(&row(json!({"name": "x"}))).unwrap_err();
        assert!(matches!(err, ExecutionError::TemplateRender(_)));
        assert_eq!(err.to_string(), "Template execution failed");
    }

    #[test]
    fn test_project_skips_non_string_templates() {
        let templates = row(json!({
            "full_name": "{{.first}} {{.last}}",
            "fixed": 5,
            "nested": {"a": "{{.first}}"}
        }));
        let projected = project(&row(json!({"first": "A", "last": "B"})), &templates).unwrap();

        assert_eq!(projected.len(), 1);
        assert_eq!(projected["full_name"], "A B");
    }

    #[test]
    fn test_project_fails_whole_row() {
        let templates = row(json!({"a": "{{.a}}", "b": "{{.missing}}"}));
        let err = project(&row(json!({"a": 1})), &templates).unwrap_err();
        assert!(matches!(err, ExecutionError::TemplateRender(_)));
    }
}
