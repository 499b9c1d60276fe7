//! Deserializers - evaluate a schema against a payload
//!
//! Every deserializer normalizes its input keys on construction, then
//! `parse` walks the schema's rules in declaration order. Relationship
//! rules build a nested deserializer per related resource, so a parse
//! forms a tree that mirrors the schema references.
//!
//! - `JsonDeserializer`: plain key-value payloads
//! - `JsonApiDeserializer`: `{ data, included }` documents
//! - `BaseDeserializer`: holds normalized data only; `parse` is not implemented

pub mod base;
pub mod included;
pub mod json;
pub mod jsonapi;
pub mod resolver;

pub use base::BaseDeserializer;
pub use included::{Identifier, IncludedTable};
pub use json::JsonDeserializer;
pub use jsonapi::JsonApiDeserializer;

use crate::error::{value_kind, DeserializeError, Result};
use crate::schema::{Rule, RuleOptions, Schema};
use crate::types::{AttributeMap, Mode, ParseOptions, Parsed};
use log::trace;
use serde_json::Value;
use std::sync::Arc;

/// A schema bound to one payload
pub trait Deserializer {
    fn schema(&self) -> &Schema;

    /// The payload after key normalization
    fn data(&self) -> &Value;

    fn options(&self) -> &ParseOptions;

    fn parse(&self) -> Result<Parsed> {
        Err(DeserializeError::NotImplemented)
    }
}

/// Parse `input` with `schema` in the given mode
///
/// # Example
/// ```rust
/// use remold::{parse, Mode, ParseOptions, Schema};
/// use serde_json::json;
///
/// let schema = Schema::builder("person").attributes(["name", "email"]).freeze();
/// let parsed = parse(&json!({"Name": "Alice", "extra": 1}), schema, Mode::Json, ParseOptions::default()).unwrap();
///
/// assert_eq!(parsed.into_value(), json!({"name": "Alice"}));
/// ```
pub fn parse(input: &Value, schema: impl Into<Arc<Schema>>, mode: Mode, options: ParseOptions) -> Result<Parsed> {
    match mode {
        Mode::Json => JsonDeserializer::new(input, schema, options).parse(),
        Mode::JsonApi => JsonApiDeserializer::new(input, schema, options).parse(),
    }
}

/// The rule-walking half shared by the JSON and JSON-API layers
pub(crate) trait Transform: Deserializer {
    /// The bound schema, shared with recursive relationships
    fn shared_schema(&self) -> &Arc<Schema>;

    fn parse_attribute(&self, output: &mut AttributeMap, input: &Value, key: &str, options: &RuleOptions) -> Result<()>;

    fn parse_has_one(
        &self,
        output: &mut AttributeMap,
        input: &Value,
        key: &str,
        nested: &Arc<Schema>,
        options: &RuleOptions,
    ) -> Result<()>;

    fn parse_has_many(
        &self,
        output: &mut AttributeMap,
        input: &Value,
        key: &str,
        nested: &Arc<Schema>,
        options: &RuleOptions,
    ) -> Result<()>;

    /// Apply every rule to `input`, accumulating into `output`
    fn apply_transforms(&self, mut output: AttributeMap, input: &Value) -> Result<AttributeMap> {
        let schema = self.schema();

        for (key, rule) in schema.rules() {
            let options = rule.options();
            if !resolver::should_apply(schema, options, input)? {
                trace!("{}: condition skipped `{}`", schema.name(), key);
                continue;
            }

            match rule {
                Rule::Attribute(_) => self.parse_attribute(&mut output, input, key, options)?,
                Rule::HasOne { schema: related, .. } => {
                    let nested = related.resolve(self.shared_schema());
                    self.parse_has_one(&mut output, input, key, &nested, options)?
                }
                Rule::HasMany { schema: related, .. } => {
                    let nested = related.resolve(self.shared_schema());
                    self.parse_has_many(&mut output, input, key, &nested, options)?
                }
            }
        }

        Ok(output)
    }
}

pub(crate) fn check_depth(depth: usize, options: &ParseOptions) -> Result<()> {
    if depth > options.max_depth {
        return Err(DeserializeError::DepthExceeded {
            limit: options.max_depth,
        });
    }
    Ok(())
}

/// Require a related resource to be an object
pub(crate) fn expect_object<'a>(key: &str, value: &'a Value) -> Result<&'a Value> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(DeserializeError::InvalidResource {
            key: key.to_string(),
            found: value_kind(value),
        })
    }
}

/// A to-many value as a list; a lone object counts as a one-element list
pub(crate) fn as_collection<'a>(key: &str, value: &'a Value) -> Result<Vec<&'a Value>> {
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(_) => Ok(vec![value]),
        other => Err(DeserializeError::InvalidResource {
            key: key.to_string(),
            found: value_kind(other),
        }),
    }
}
