use std::path::Path;

use anyhow::Context;
use oas3::OpenApiV3Spec;
use serde_json::Value;
use tracing::{debug, instrument};

use super::document::{ApiDocument, METHODS};

/// Drop path-item keys that are neither HTTP methods nor known path-item
/// fields, so strict deserialisers do not reject vendor-specific verbs.
fn strip_unknown_verbs(val: &mut Value) {
    let Some(Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        if let Value::Object(obj) = item {
            let keys: Vec<String> = obj.keys().cloned().collect();
            for k in keys {
                let lk = k.to_ascii_lowercase();
                let keep = match lk.as_str() {
                    "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                    m if METHODS.contains(&m) => true,
                    _ => k.starts_with("x-"),
                };
                if !keep {
                    obj.remove(&k);
                }
            }
        }
    }
}

/// Parse document text. JSON is tried when the hint says so; everything else
/// goes through the YAML parser, which also accepts JSON.
pub fn parse_document(content: &str, json_hint: bool) -> anyhow::Result<ApiDocument> {
    let value: Value = if json_hint {
        serde_json::from_str(content).context("Failed to parse JSON document")?
    } else {
        serde_yaml::from_str(content).context("Failed to parse YAML document")?
    };
    if !value.is_object() {
        anyhow::bail!("document root must be a mapping");
    }
    Ok(ApiDocument::new(value))
}

/// Load an OpenAPI document from disk.
///
/// # Arguments
///
/// * `file_path` - `.yaml`, `.yml` or `.json` file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
#[instrument(fields(path = %file_path.display()))]
pub fn load_document(file_path: &Path) -> anyhow::Result<ApiDocument> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read spec {:?}", file_path))?;
    let json_hint = file_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let doc = parse_document(&content, json_hint)
        .with_context(|| format!("Failed to load spec {:?}", file_path))?;
    debug!(title = doc.title().unwrap_or_default(), "document loaded");
    Ok(doc)
}

/// Check the document against the OpenAPI 3 object model.
///
/// Generation itself only needs the JSON tree; this is the opt-in structural
/// check behind `--validate`.
pub fn validate_document(doc: &ApiDocument) -> anyhow::Result<()> {
    let mut value = doc.root().clone();
    strip_unknown_verbs(&mut value);
    let spec: OpenApiV3Spec =
        serde_json::from_value(value).context("Document is not a valid OpenAPI 3 spec")?;
    debug!(
        title = %spec.info.title,
        paths = spec.paths.as_ref().map_or(0, |p| p.len()),
        "document validated"
    );
    Ok(())
}
