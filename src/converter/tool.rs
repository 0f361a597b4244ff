use tracing::{debug, instrument};

use super::args::{extract_body, extract_params};
use super::request::build_request_template;
use super::response::build_responses;
use super::types::Tool;
use crate::error::{GenError, Result};
use crate::schema::emit_input_schema;
use crate::spec::{ApiDocument, OperationRef};

/// Knobs for [`convert_document`].
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Replaces the document's first server URL in request templates.
    pub server_url: Option<String>,
}

/// Convert every operation of `doc` into a [`Tool`], sorted by name.
///
/// # Errors
///
/// Any structural translation error aborts the whole conversion; no partial
/// tool list is returned.
#[instrument(skip_all, fields(title = doc.title().unwrap_or_default()))]
pub fn convert_document(doc: &ApiDocument, options: &ConvertOptions) -> Result<Vec<Tool>> {
    let server_url = options.server_url.as_deref().or_else(|| doc.server_url());
    let mut tools = doc
        .operations()?
        .iter()
        .map(|op| convert_operation(doc, op, server_url))
        .collect::<Result<Vec<_>>>()?;
    tools.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = tools.len(), "tools assembled");
    Ok(tools)
}

/// Build the [`Tool`] for a single `(path, method)` pair.
pub fn convert_operation(
    doc: &ApiDocument,
    op: &OperationRef<'_>,
    server_url: Option<&str>,
) -> Result<Tool> {
    let name = tool_name(op);
    let label = format!("{} {}", op.method.to_uppercase(), op.path);

    let params = doc.parameters(op)?;
    let mut args = extract_params(doc, &params, &label)?;
    if let Some(body) = extract_body(doc, op.request_body(), &label)? {
        args.push(body);
    }
    args.sort_by(|a, b| a.name.cmp(&b.name));

    let input = emit_input_schema(&args);
    let input_schema = serde_json::to_string_pretty(&input).map_err(|source| GenError::Serialize {
        what: format!("input schema of {name}"),
        source,
    })?;

    let body = op.request_body().and_then(|b| doc.resolve(b).ok());
    let request = build_request_template(server_url, op.path, op.method, body);
    let responses = build_responses(doc, op.responses(), &label)?;

    Ok(Tool {
        name,
        description: tool_description(op.summary(), op.description()),
        args,
        input_schema,
        request,
        responses,
    })
}

/// `operationId` when present, otherwise derived from method and path.
pub fn tool_name(op: &OperationRef<'_>) -> String {
    op.operation_id()
        .map(str::to_string)
        .unwrap_or_else(|| synthesize_tool_name(op.method, op.path))
}

/// `post` + `/foo/{bar}` → `post_foo_bar`.
pub fn synthesize_tool_name(method: &str, path: &str) -> String {
    let mut parts = vec![method.to_lowercase()];
    for segment in path.split('/') {
        let cleaned: String = segment
            .chars()
            .filter(|c| *c != '{' && *c != '}')
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let cleaned = cleaned.trim_matches('_');
        if !cleaned.is_empty() {
            parts.push(cleaned.to_string());
        }
    }
    parts.join("_")
}

/// `summary - description` when both are present, otherwise whichever is.
pub fn tool_description(summary: Option<&str>, description: Option<&str>) -> String {
    match (summary, description) {
        (Some(s), Some(d)) => format!("{s} - {d}"),
        (Some(s), None) => s.to_string(),
        (None, Some(d)) => d.to_string(),
        (None, None) => String::new(),
    }
}
