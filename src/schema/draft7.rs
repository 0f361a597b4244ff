//! Projection of [`Schema`] values into a draft-7 JSON Schema document.
//!
//! Every keyword is emitted only when it carries information: zero minimums,
//! empty lists and absent policies produce no output at all.

use serde_json::{json, Map, Value};

use super::types::{AdditionalProperties, Schema};
use crate::converter::{Arg, ArgSchema};

/// Draft-7 form of a single schema.
pub fn emit_schema(schema: &Schema) -> Value {
    let mut out = Map::new();
    add_metadata(&mut out, schema);
    add_type(&mut out, schema);
    add_string_rules(&mut out, schema);
    add_number_rules(&mut out, schema);
    add_combinators(&mut out, schema);
    add_array_rules(&mut out, schema);
    add_object_rules(&mut out, schema);
    Value::Object(out)
}

/// Root input document for a tool: one property per arg and a `required`
/// list following the order of `args`.
pub fn emit_input_schema(args: &[Arg]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for arg in args {
        let Some(property) = emit_arg(arg) else {
            continue;
        };
        properties.insert(arg.name.clone(), property);
        if arg.required {
            required.push(Value::String(arg.name.clone()));
        }
    }

    let mut root = Map::new();
    root.insert("type".into(), json!("object"));
    if !properties.is_empty() {
        root.insert("properties".into(), Value::Object(properties));
    }
    if !required.is_empty() {
        root.insert("required".into(), Value::Array(required));
    }
    Value::Object(root)
}

/// Property schema for one arg, with the arg description folded in when the
/// schema does not carry its own.
fn emit_arg(arg: &Arg) -> Option<Value> {
    let mut property = match &arg.schema {
        ArgSchema::Single(schema) => emit_schema(schema),
        ArgSchema::ByContentType(by_type) => match by_type.len() {
            0 => return None,
            1 => by_type.values().next().map(emit_schema)?,
            _ => {
                let branches = by_type
                    .iter()
                    .map(|(content_type, schema)| {
                        let mut branch = emit_schema(schema);
                        tag_content_type(&mut branch, content_type);
                        branch
                    })
                    .collect();
                json!({ "oneOf": Value::Array(branches) })
            }
        },
    };

    if let (Some(description), Value::Object(map)) = (&arg.description, &mut property) {
        let missing = map
            .get("description")
            .and_then(Value::as_str)
            .map_or(true, str::is_empty);
        if missing {
            map.insert("description".into(), json!(description));
        }
    }
    Some(property)
}

/// Mark a `oneOf` branch with the content type it stands for.
fn tag_content_type(branch: &mut Value, content_type: &str) {
    let Value::Object(map) = branch else {
        return;
    };
    if let Some(description) = map.get("description").and_then(Value::as_str) {
        let tagged = format!("[{content_type}] {description}");
        map.insert("description".into(), json!(tagged));
    } else if let Some(title) = map.get("title").and_then(Value::as_str) {
        let tagged = format!("[{content_type}] {title}");
        map.insert("title".into(), json!(tagged));
    } else {
        map.insert("title".into(), json!(format!("Schema for {content_type}")));
    }
}

fn add_metadata(out: &mut Map<String, Value>, s: &Schema) {
    if let Some(title) = &s.title {
        out.insert("title".into(), json!(title));
    }
    if let Some(description) = &s.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(format) = &s.format {
        out.insert("format".into(), json!(format));
    }
    if let Some(default) = &s.default {
        out.insert("default".into(), default.clone());
    }
    if let Some(example) = &s.example {
        out.insert("examples".into(), json!([example]));
    }
    if !s.enum_values.is_empty() {
        out.insert("enum".into(), Value::Array(s.enum_values.clone()));
    }
    if s.read_only {
        out.insert("readOnly".into(), json!(true));
    }
    if s.write_only {
        out.insert("writeOnly".into(), json!(true));
    }
}

fn add_type(out: &mut Map<String, Value>, s: &Schema) {
    match s.types.as_slice() {
        [] => {}
        [single] => {
            out.insert("type".into(), json!(single));
        }
        many => {
            out.insert("type".into(), json!(many));
        }
    }
}

fn add_string_rules(out: &mut Map<String, Value>, s: &Schema) {
    let Some(rules) = &s.string else {
        return;
    };
    if rules.min_length > 0 {
        out.insert("minLength".into(), json!(rules.min_length));
    }
    if let Some(max) = rules.max_length {
        out.insert("maxLength".into(), json!(max));
    }
    if let Some(pattern) = &rules.pattern {
        out.insert("pattern".into(), json!(pattern));
    }
}

fn add_number_rules(out: &mut Map<String, Value>, s: &Schema) {
    let Some(rules) = &s.number else {
        return;
    };
    if let Some(min) = &rules.minimum {
        let key = if rules.exclusive_minimum {
            "exclusiveMinimum"
        } else {
            "minimum"
        };
        out.insert(key.into(), Value::Number(min.clone()));
    }
    if let Some(max) = &rules.maximum {
        let key = if rules.exclusive_maximum {
            "exclusiveMaximum"
        } else {
            "maximum"
        };
        out.insert(key.into(), Value::Number(max.clone()));
    }
    if let Some(step) = &rules.multiple_of {
        out.insert("multipleOf".into(), Value::Number(step.clone()));
    }
}

fn add_combinators(out: &mut Map<String, Value>, s: &Schema) {
    for (keyword, list) in [("oneOf", &s.one_of), ("anyOf", &s.any_of), ("allOf", &s.all_of)] {
        if !list.is_empty() {
            out.insert(keyword.into(), list.iter().map(emit_schema).collect());
        }
    }
    if let Some(not) = &s.not {
        out.insert("not".into(), emit_schema(not));
    }
}

fn add_array_rules(out: &mut Map<String, Value>, s: &Schema) {
    let Some(rules) = &s.array else {
        return;
    };
    if let Some(items) = &rules.items {
        out.insert("items".into(), emit_schema(items));
    }
    if rules.min_items > 0 {
        out.insert("minItems".into(), json!(rules.min_items));
    }
    if let Some(max) = rules.max_items {
        out.insert("maxItems".into(), json!(max));
    }
    if rules.unique_items {
        out.insert("uniqueItems".into(), json!(true));
    }
}

fn add_object_rules(out: &mut Map<String, Value>, s: &Schema) {
    let Some(rules) = &s.object else {
        return;
    };
    if !rules.properties.is_empty() {
        let properties: Map<String, Value> = rules
            .properties
            .iter()
            .map(|(name, schema)| (name.clone(), emit_schema(schema)))
            .collect();
        out.insert("properties".into(), Value::Object(properties));
    }
    if !rules.required.is_empty() {
        out.insert("required".into(), json!(rules.required));
    }
    if rules.min_properties > 0 {
        out.insert("minProperties".into(), json!(rules.min_properties));
    }
    if let Some(max) = rules.max_properties {
        out.insert("maxProperties".into(), json!(max));
    }
    match &rules.additional {
        None => {}
        Some(AdditionalProperties::Disallowed) => {
            out.insert("additionalProperties".into(), json!(false));
        }
        Some(AdditionalProperties::Unconstrained) => {
            out.insert("additionalProperties".into(), json!(true));
        }
        Some(AdditionalProperties::ConstrainedBy(schema)) => {
            out.insert("additionalProperties".into(), emit_schema(schema));
        }
    }
}
