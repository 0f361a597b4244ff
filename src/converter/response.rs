//! Markdown documentation for response variants.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::warn;

use super::types::ResponseVariant;
use crate::error::{GenError, Result};
use crate::schema::{translate_schema, AdditionalProperties, Schema};
use crate::spec::ApiDocument;

/// Build one variant per `(status code, content type)` pair that carries a
/// schema, ordered by [`compare_status_codes`] then content type, with
/// suffixes assigned by position.
pub fn build_responses(
    doc: &ApiDocument,
    responses: Option<&serde_json::Map<String, Value>>,
    operation: &str,
) -> Result<Vec<ResponseVariant>> {
    let Some(responses) = responses else {
        return Ok(Vec::new());
    };

    let mut codes: Vec<&String> = responses.keys().collect();
    codes.sort_by(|a, b| compare_status_codes(a, b));

    let mut variants = Vec::new();
    for code in codes {
        let response = match doc.resolve(&responses[code.as_str()]) {
            Ok(response) => response,
            Err(GenError::UnresolvedRef { reference }) => {
                warn!(%operation, status = %code, %reference, "response does not resolve; skipped");
                continue;
            }
            Err(e) => return Err(e),
        };
        let Some(content) = response.get("content").and_then(Value::as_object) else {
            continue;
        };
        let description = response
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut content_types: Vec<&String> = content.keys().collect();
        content_types.sort();
        for content_type in content_types {
            let Some(schema_node) = content[content_type.as_str()].get("schema") else {
                continue;
            };
            let context = format!("{operation} response {code} {content_type}");
            let schema = match translate_schema(doc, schema_node, &context) {
                Ok(schema) => schema,
                Err(GenError::UnresolvedRef { reference }) => {
                    warn!(%operation, status = %code, %content_type, %reference, "response schema does not resolve; skipped");
                    continue;
                }
                Err(e) => return Err(e),
            };
            variants.push(ResponseVariant {
                status_code: code.clone(),
                content_type: content_type.clone(),
                body: render_response_markdown(code, content_type, description, &schema),
                suffix: String::new(),
            });
        }
    }

    for (index, variant) in variants.iter_mut().enumerate() {
        variant.suffix = alpha_suffix(index);
    }
    Ok(variants)
}

/// Numeric codes ascending, then non-numeric codes (`default`, `4XX`)
/// lexically.
pub fn compare_status_codes(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Bijective base-26 suffix: 0 → `A`, 25 → `Z`, 26 → `AA`, 27 → `AB`.
pub fn alpha_suffix(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

/// Full Markdown document for one response variant.
pub fn render_response_markdown(
    status_code: &str,
    content_type: &str,
    description: &str,
    schema: &Schema,
) -> String {
    let mut out = String::new();
    out.push_str("# API Response Information\n\n");
    out.push_str("Below is the response template for this API endpoint.\n\n");
    out.push_str(
        "The template shows a possible response, including its status code and content type, \
         to help you understand and generate correct outputs.\n\n",
    );
    out.push_str(&format!("**Status Code:** {status_code}\n\n"));
    out.push_str(&format!("**Content-Type:** {content_type}\n\n"));
    if !description.is_empty() {
        out.push_str(&format!("> {description}\n\n"));
    }
    out.push_str("## Response Structure\n\n");
    write_node(&mut out, schema, 0, None);
    out
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

fn write_node(out: &mut String, schema: &Schema, level: usize, label: Option<&str>) {
    let ind = indent(level);
    let ty = type_label(schema);
    let description = schema.description.as_deref().unwrap_or_default();
    let line = match (label, description.is_empty()) {
        (Some(label), true) => format!("{ind}- **{label}** (Type: {ty}):\n"),
        (Some(label), false) => format!("{ind}- **{label}**: {description} (Type: {ty}):\n"),
        (None, true) => format!("{ind}- Structure (Type: {ty}):\n"),
        (None, false) => format!("{ind}- {description} (Type: {ty}):\n"),
    };
    out.push_str(&line);

    write_details(out, schema, level + 1);

    if let Some(object) = &schema.object {
        for (name, property) in &object.properties {
            write_node(out, property, level + 1, Some(name.as_str()));
        }
    }
    if let Some(items) = schema.array.as_ref().and_then(|a| a.items.as_deref()) {
        write_node(out, items, level + 1, Some("Items"));
    }

    write_combinators(out, schema, level);

    match schema.object.as_ref().and_then(|o| o.additional.as_ref()) {
        Some(AdditionalProperties::ConstrainedBy(value)) => {
            out.push_str(&format!("{ind}  - **Additional Properties**:\n"));
            write_node(out, value, level + 2, Some("property value"));
        }
        Some(AdditionalProperties::Unconstrained) => {
            out.push_str(&format!("{ind}  - **Allows Additional Properties**\n"));
        }
        Some(AdditionalProperties::Disallowed) | None => {}
    }
}

fn write_combinators(out: &mut String, schema: &Schema, level: usize) {
    let ind = indent(level);
    let groups = [
        (&schema.one_of, "**One Of the following structures**:", "Option"),
        (&schema.any_of, "**Any Of the following structures**:", "Option"),
        (&schema.all_of, "**Combines All Of the following structures**:", "Part"),
    ];
    for (members, heading, label) in groups {
        if members.is_empty() {
            continue;
        }
        out.push_str(&format!("{ind}  - {heading}\n"));
        for (i, member) in members.iter().enumerate() {
            let name = format!("{label} {}", i + 1);
            write_node(out, member, level + 2, Some(name.as_str()));
        }
    }
    if let Some(not) = &schema.not {
        out.push_str(&format!("{ind}  - **Not**: Cannot be the following structure:\n"));
        write_node(out, not, level + 2, Some("Forbidden Structure"));
    }
}

fn write_details(out: &mut String, schema: &Schema, level: usize) {
    let mut details = Vec::new();

    if let Some(rules) = &schema.string {
        if rules.min_length > 0 {
            details.push(format!("Min Length: {}", rules.min_length));
        }
        if let Some(max) = rules.max_length.filter(|m| *m > 0) {
            details.push(format!("Max Length: {max}"));
        }
        if let Some(pattern) = &rules.pattern {
            details.push(format!("Pattern: '{}'", pattern.replace('`', "'")));
        }
    }
    if let Some(rules) = &schema.number {
        if let Some(min) = &rules.minimum {
            details.push(format!("Minimum: {min}"));
        }
        if let Some(max) = &rules.maximum {
            details.push(format!("Maximum: {max}"));
        }
        if rules.exclusive_minimum {
            details.push("Exclusive Minimum: true".to_string());
        }
        if rules.exclusive_maximum {
            details.push("Exclusive Maximum: true".to_string());
        }
        if let Some(step) = &rules.multiple_of {
            details.push(format!("Multiple Of: {step}"));
        }
    }
    if let Some(rules) = &schema.array {
        if rules.min_items > 0 {
            details.push(format!("Min Items: {}", rules.min_items));
        }
        if let Some(max) = rules.max_items.filter(|m| *m > 0) {
            details.push(format!("Max Items: {max}"));
        }
        if rules.unique_items {
            details.push("Unique Items: true".to_string());
        }
    }
    if schema.is_nullable() {
        details.push("Nullable: true".to_string());
    }
    if let Some(default) = &schema.default {
        details.push(format!("Default: '{}'", format_value(schema, default)));
    }
    if let Some(example) = &schema.example {
        details.push(format!("Example: '{}'", format_value(schema, example)));
    }
    if !schema.enum_values.is_empty() {
        let values: Vec<String> = schema
            .enum_values
            .iter()
            .map(|v| format!("'{}'", format_value(schema, v)))
            .collect();
        details.push(format!("Enum: [{}]", values.join(", ")));
    }

    let ind = indent(level);
    for detail in details {
        out.push_str(&format!("{ind}- {detail}\n"));
    }
}

/// Types (without `null`), then format, then `nullable`; `Combinator` or
/// `unknown` when nothing is declared.
fn type_label(schema: &Schema) -> String {
    let mut parts: Vec<&str> = schema
        .types
        .iter()
        .map(String::as_str)
        .filter(|t| *t != "null")
        .collect();
    if let Some(format) = &schema.format {
        parts.push(format);
    }
    if schema.is_nullable() {
        parts.push("nullable");
    }
    if parts.is_empty() {
        if schema.has_combinators() {
            return "Combinator".to_string();
        }
        return "unknown".to_string();
    }
    parts.join(", ")
}

/// String-typed schemas print values verbatim (redundant quotes removed);
/// everything else is printed as JSON. Backticks become `'` so the text can
/// live inside any quoting the renderer picks.
pub fn format_value(schema: &Schema, value: &Value) -> String {
    let string_typed = schema.types.first().is_some_and(|t| t == "string");
    let text = match value {
        Value::String(s) if string_typed => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    };
    let text = if string_typed {
        text.trim_matches('"').to_string()
    } else {
        text
    };
    text.replace('`', "'")
}
