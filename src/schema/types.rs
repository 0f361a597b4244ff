use std::collections::BTreeMap;

use serde_json::{Number, Value};

/// Normalised description of a data shape.
///
/// Built once per source schema node by [`translate_schema`](super::translate_schema)
/// and never mutated afterwards. Nullability lives in `types` (as a `"null"`
/// tag) rather than in a separate flag, and each rule bundle is only present
/// when the matching type tag is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Primitive type tags in declaration order, without duplicates.
    pub types: Vec<String>,
    pub one_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub all_of: Vec<Schema>,
    pub not: Option<Box<Schema>>,

    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub default: Option<Value>,
    pub example: Option<Value>,
    pub enum_values: Vec<Value>,
    pub read_only: bool,
    pub write_only: bool,

    pub string: Option<StringRules>,
    pub number: Option<NumberRules>,
    pub array: Option<ArrayRules>,
    pub object: Option<ObjectRules>,
}

/// Constraints for `string`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    /// Zero means unconstrained.
    pub min_length: u64,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

/// Constraints for `number` and `integer`.
///
/// Bounds keep their JSON representation so an integer bound is emitted as an
/// integer again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<Number>,
}

/// Constraints for `array`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayRules {
    pub items: Option<Box<Schema>>,
    /// Zero means unconstrained.
    pub min_items: u64,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

/// Constraints for `object`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRules {
    pub properties: BTreeMap<String, Schema>,
    pub required: Vec<String>,
    /// Zero means unconstrained.
    pub min_properties: u64,
    pub max_properties: Option<u64>,
    /// `None` when the keyword is absent from the source.
    pub additional: Option<AdditionalProperties>,
}

/// Policy for properties not named in `properties`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `additionalProperties: false`
    Disallowed,
    /// `additionalProperties: true` (any value)
    Unconstrained,
    /// `additionalProperties: { ... }`
    ConstrainedBy(Box<Schema>),
}

impl Schema {
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    pub fn is_nullable(&self) -> bool {
        self.has_type("null")
    }

    pub fn has_combinators(&self) -> bool {
        !self.one_of.is_empty()
            || !self.any_of.is_empty()
            || !self.all_of.is_empty()
            || self.not.is_some()
    }
}
