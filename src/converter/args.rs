use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::types::{Arg, ArgSchema, ArgSource};
use crate::error::{GenError, Result};
use crate::schema::translate_schema;
use crate::spec::ApiDocument;

/// Turn resolved parameter objects into args.
///
/// Parameters without a usable schema (no `schema`, no `content`, or a
/// reference that points nowhere) are skipped with a warning: they cannot be
/// validated, so they are not emitted as untyped inputs.
pub fn extract_params(doc: &ApiDocument, params: &[&Value], operation: &str) -> Result<Vec<Arg>> {
    let mut args = Vec::with_capacity(params.len());
    for param in params {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            warn!(%operation, "parameter without a name; skipped");
            continue;
        };
        let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
        let Some(source) = ArgSource::from_location(location) else {
            warn!(%operation, parameter = %name, %location, "unknown parameter location; skipped");
            continue;
        };
        let Some(schema_node) = parameter_schema(param) else {
            warn!(%operation, parameter = %name, "parameter has no schema; skipped");
            continue;
        };

        let context = format!("{operation} parameter {name}");
        let schema = match translate_schema(doc, schema_node, &context) {
            Ok(schema) => schema,
            Err(GenError::UnresolvedRef { reference }) => {
                warn!(%operation, parameter = %name, %reference, "parameter schema does not resolve; skipped");
                continue;
            }
            Err(e) => return Err(e),
        };

        args.push(Arg {
            name: name.to_string(),
            description: param
                .get("description")
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            source,
            // Path parameters are always required, whatever the flag says.
            required: source == ArgSource::Path
                || param.get("required").and_then(Value::as_bool).unwrap_or(false),
            deprecated: param
                .get("deprecated")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            schema: ArgSchema::Single(schema),
        });
    }
    Ok(args)
}

/// `schema`, or the schema of the lexically first `content` entry.
fn parameter_schema(param: &Value) -> Option<&Value> {
    if let Some(schema) = param.get("schema") {
        return Some(schema);
    }
    param
        .get("content")
        .and_then(Value::as_object)?
        .iter()
        .min_by(|a, b| a.0.cmp(b.0))
        .and_then(|(_, media)| media.get("schema"))
}

/// Turn a request body into the single `body` arg.
///
/// Returns `Ok(None)` when no content type carries a usable schema.
pub fn extract_body(doc: &ApiDocument, body: Option<&Value>, operation: &str) -> Result<Option<Arg>> {
    let Some(body) = body else {
        return Ok(None);
    };
    let body = match doc.resolve(body) {
        Ok(body) => body,
        Err(GenError::UnresolvedRef { reference }) => {
            warn!(%operation, %reference, "request body does not resolve; omitted");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let mut by_type = BTreeMap::new();
    if let Some(content) = body.get("content").and_then(Value::as_object) {
        for (content_type, media) in content {
            let Some(schema_node) = media.get("schema") else {
                continue;
            };
            let context = format!("{operation} requestBody {content_type}");
            match translate_schema(doc, schema_node, &context) {
                Ok(schema) => {
                    by_type.insert(content_type.clone(), schema);
                }
                Err(GenError::UnresolvedRef { reference }) => {
                    warn!(%operation, %content_type, %reference, "body schema does not resolve; content type skipped");
                }
                Err(e) => return Err(e),
            }
        }
    }

    if by_type.is_empty() {
        return Ok(None);
    }

    Ok(Some(Arg {
        name: "body".to_string(),
        description: body
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        source: ArgSource::Body,
        required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
        deprecated: false,
        schema: ArgSchema::ByContentType(by_type),
    }))
}
