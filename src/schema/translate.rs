use serde_json::{Map, Number, Value};
use tracing::warn;

use super::types::{
    AdditionalProperties, ArrayRules, NumberRules, ObjectRules, Schema, StringRules,
};
use crate::error::{CombinatorKind, GenError, Result};
use crate::spec::{reference_of, ApiDocument};

/// Translate one source schema node into a [`Schema`].
///
/// `location` is only used in error messages and warnings (e.g.
/// `GET /todos requestBody application/json`).
///
/// # Errors
///
/// [`GenError::DanglingCombinator`] when a `oneOf`/`anyOf`/`allOf`/`not`
/// branch is missing or its reference resolves to nothing, and
/// [`GenError::CyclicRef`] for self-referencing schemas.
pub fn translate_schema(doc: &ApiDocument, node: &Value, location: &str) -> Result<Schema> {
    SchemaTranslator::new(doc).translate(node, location)
}

/// Recursive translator. Tracks the `$ref` chain currently being expanded so
/// self-referencing schemas are reported instead of recursing forever.
pub struct SchemaTranslator<'d> {
    doc: &'d ApiDocument,
    expanding: Vec<String>,
}

impl<'d> SchemaTranslator<'d> {
    pub fn new(doc: &'d ApiDocument) -> Self {
        Self {
            doc,
            expanding: Vec::new(),
        }
    }

    pub fn translate(&mut self, node: &Value, location: &str) -> Result<Schema> {
        if let Some(reference) = reference_of(node) {
            return self.translate_ref(reference, location);
        }
        match node {
            Value::Object(map) => self.translate_object(map, location),
            // Boolean schemas: `true` accepts anything, `false` nothing.
            Value::Bool(true) => Ok(Schema::default()),
            Value::Bool(false) => Ok(Schema {
                not: Some(Box::default()),
                ..Schema::default()
            }),
            _ => Ok(Schema::default()),
        }
    }

    fn translate_ref(&mut self, reference: &str, location: &str) -> Result<Schema> {
        if self.expanding.iter().any(|r| r == reference) {
            return Err(GenError::CyclicRef {
                reference: reference.to_string(),
            });
        }
        let target = self
            .doc
            .lookup(reference)
            .ok_or_else(|| GenError::UnresolvedRef {
                reference: reference.to_string(),
            })?;
        self.expanding.push(reference.to_string());
        let result = self.translate(target, location);
        self.expanding.pop();
        result
    }

    fn translate_object(&mut self, node: &Map<String, Value>, location: &str) -> Result<Schema> {
        let mut schema = Schema {
            title: string_field(node, "title"),
            description: string_field(node, "description"),
            format: string_field(node, "format"),
            default: node.get("default").cloned(),
            example: node.get("example").cloned().or_else(|| {
                node.get("examples")
                    .and_then(Value::as_array)
                    .and_then(|list| list.first())
                    .cloned()
            }),
            enum_values: node
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            read_only: bool_field(node, "readOnly"),
            write_only: bool_field(node, "writeOnly"),
            types: collect_types(node),
            ..Schema::default()
        };

        if schema.has_type("string") {
            schema.string = Some(string_rules(node));
        }
        if schema.has_type("number") || schema.has_type("integer") {
            schema.number = Some(number_rules(node));
        }
        if schema.has_type("array") {
            schema.array = Some(self.array_rules(node, location)?);
        }
        if schema.has_type("object") {
            schema.object = Some(self.object_rules(node, location)?);
        }

        schema.one_of = self.branches(node, CombinatorKind::OneOf, location)?;
        schema.any_of = self.branches(node, CombinatorKind::AnyOf, location)?;
        schema.all_of = self.branches(node, CombinatorKind::AllOf, location)?;
        if let Some(not) = node.get("not") {
            let translated = self.branch(not, CombinatorKind::Not, 0, location)?;
            schema.not = Some(Box::new(translated));
        }

        Ok(schema)
    }

    fn branches(
        &mut self,
        node: &Map<String, Value>,
        kind: CombinatorKind,
        location: &str,
    ) -> Result<Vec<Schema>> {
        let Some(list) = node.get(kind.keyword()) else {
            return Ok(Vec::new());
        };
        let Some(list) = list.as_array() else {
            return Err(GenError::DanglingCombinator {
                kind,
                index: 0,
                location: location.to_string(),
            });
        };
        list.iter()
            .enumerate()
            .map(|(index, member)| self.branch(member, kind, index, location))
            .collect()
    }

    /// A combinator member may not vanish: anything that is not a schema, or a
    /// reference that points nowhere, aborts translation.
    fn branch(
        &mut self,
        member: &Value,
        kind: CombinatorKind,
        index: usize,
        location: &str,
    ) -> Result<Schema> {
        let dangling = || GenError::DanglingCombinator {
            kind,
            index,
            location: location.to_string(),
        };
        if !(member.is_object() || member.is_boolean()) {
            return Err(dangling());
        }
        let nested = format!("{location}/{kind}/{index}");
        match self.translate(member, &nested) {
            Err(GenError::UnresolvedRef { .. }) => Err(dangling()),
            other => other,
        }
    }

    fn array_rules(&mut self, node: &Map<String, Value>, location: &str) -> Result<ArrayRules> {
        let items = match node.get("items") {
            None => None,
            Some(items) => {
                match self.translate(items, &format!("{location}/items")) {
                    Ok(schema) => Some(Box::new(schema)),
                    Err(GenError::UnresolvedRef { reference }) => {
                        warn!(%location, %reference, "array items reference does not resolve; items left unconstrained");
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        Ok(ArrayRules {
            items,
            min_items: u64_field(node, "minItems").unwrap_or(0),
            max_items: u64_field(node, "maxItems"),
            unique_items: bool_field(node, "uniqueItems"),
        })
    }

    fn object_rules(&mut self, node: &Map<String, Value>, location: &str) -> Result<ObjectRules> {
        let mut rules = ObjectRules {
            required: node
                .get("required")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            min_properties: u64_field(node, "minProperties").unwrap_or(0),
            max_properties: u64_field(node, "maxProperties"),
            ..ObjectRules::default()
        };

        if let Some(properties) = node.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                if !(property.is_object() || property.is_boolean()) {
                    warn!(%location, property = %name, "property has no schema; skipped");
                    continue;
                }
                let nested = format!("{location}/properties/{name}");
                match self.translate(property, &nested) {
                    Ok(schema) => {
                        rules.properties.insert(name.clone(), schema);
                    }
                    Err(GenError::UnresolvedRef { reference }) => {
                        warn!(%location, property = %name, %reference, "property reference does not resolve; skipped");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        rules.additional = match node.get("additionalProperties") {
            None => None,
            Some(Value::Bool(false)) => Some(AdditionalProperties::Disallowed),
            Some(Value::Bool(true)) => Some(AdditionalProperties::Unconstrained),
            Some(extra) if extra.is_object() => {
                let nested = format!("{location}/additionalProperties");
                match self.translate(extra, &nested) {
                    Ok(schema) => Some(AdditionalProperties::ConstrainedBy(Box::new(schema))),
                    Err(GenError::UnresolvedRef { reference }) => {
                        warn!(%location, %reference, "additionalProperties reference does not resolve; allowing any value");
                        Some(AdditionalProperties::Unconstrained)
                    }
                    Err(e) => return Err(e),
                }
            }
            Some(_) => {
                warn!(%location, "additionalProperties is neither a boolean nor a schema; ignored");
                None
            }
        };

        Ok(rules)
    }
}

/// Declared types plus the nullable fold.
///
/// A nullable node without any declared type becomes `["string", "null"]`;
/// this keeps the long-standing default-to-string behaviour for untyped
/// nullable schemas.
fn collect_types(node: &Map<String, Value>) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    match node.get("type") {
        Some(Value::String(t)) => types.push(t.clone()),
        Some(Value::Array(list)) => {
            for t in list.iter().filter_map(Value::as_str) {
                if !types.iter().any(|existing| existing == t) {
                    types.push(t.to_string());
                }
            }
        }
        _ => {}
    }
    if bool_field(node, "nullable") && !types.iter().any(|t| t == "null") {
        if types.is_empty() {
            types.push("string".to_string());
        }
        types.push("null".to_string());
    }
    types
}

fn string_rules(node: &Map<String, Value>) -> StringRules {
    StringRules {
        min_length: u64_field(node, "minLength").unwrap_or(0),
        max_length: u64_field(node, "maxLength"),
        pattern: string_field(node, "pattern"),
    }
}

/// Handles both the 3.0 form (`minimum` + boolean `exclusiveMinimum`) and the
/// 3.1 form (numeric `exclusiveMinimum` is the bound itself). A 3.1 schema
/// carrying both an inclusive and an exclusive bound keeps the tighter one.
fn number_rules(node: &Map<String, Value>) -> NumberRules {
    let (minimum, exclusive_minimum) = bound(node, "minimum", "exclusiveMinimum", true);
    let (maximum, exclusive_maximum) = bound(node, "maximum", "exclusiveMaximum", false);
    NumberRules {
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of: number_field(node, "multipleOf"),
    }
}

fn bound(
    node: &Map<String, Value>,
    inclusive: &str,
    exclusive: &str,
    lower: bool,
) -> (Option<Number>, bool) {
    match node.get(exclusive) {
        Some(Value::Number(n)) => match number_field(node, inclusive) {
            Some(inclusive_bound) if is_tighter(&inclusive_bound, n, lower) => {
                (Some(inclusive_bound), false)
            }
            _ => (Some(n.clone()), true),
        },
        Some(Value::Bool(flag)) => {
            let value = number_field(node, inclusive);
            let flagged = *flag && value.is_some();
            (value, flagged)
        }
        _ => (number_field(node, inclusive), false),
    }
}

/// Whether the inclusive bound excludes more values than the exclusive one.
/// On a tie the exclusive bound wins.
fn is_tighter(inclusive: &Number, exclusive: &Number, lower: bool) -> bool {
    match (inclusive.as_f64(), exclusive.as_f64()) {
        (Some(i), Some(e)) if lower => i > e,
        (Some(i), Some(e)) => i < e,
        _ => false,
    }
}

fn string_field(node: &Map<String, Value>, key: &str) -> Option<String> {
    node.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_field(node: &Map<String, Value>, key: &str) -> bool {
    node.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn u64_field(node: &Map<String, Value>, key: &str) -> Option<u64> {
    node.get(key).and_then(Value::as_u64)
}

fn number_field(node: &Map<String, Value>, key: &str) -> Option<Number> {
    match node.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}
