//! Declarative schema definitions
//!
//! Schemas can be described in a JSON document and loaded by name, which is
//! how the `remold` binary gets its schemas:
//!
//! ```json
//! {
//!   "schemas": {
//!     "person": { "rules": [{ "kind": "attribute", "name": "name" }] },
//!     "form": {
//!       "key_transform": "snake_case",
//!       "rules": [
//!         { "kind": "attributes", "names": ["name", "description"] },
//!         { "kind": "belongs_to", "name": "author", "key": "target", "schema": "person" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Functions cannot be written in a document, so `if`, `unless` and
//! `resolve_with` name entries of a host-supplied `FunctionTable`.

use super::builder::{Schema, SchemaBuilder};
use super::rule::{FunctionTable, Related, RuleOptions};
use crate::error::{DeserializeError, Result};
use crate::normalize::KeyTransform;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Top-level definitions document
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Definitions {
    pub schemas: IndexMap<String, SchemaDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Parent schema whose rules are copied first
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub key_transform: Option<KeyTransformDefinition>,

    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyTransformDefinition {
    /// One of the named casing strategies
    Named(String),
    /// Regex rewrite of every key
    Replace { pattern: String, replacement: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDefinitionKind {
    Attribute,
    Attributes,
    HasOne,
    BelongsTo,
    HasMany,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub kind: RuleDefinitionKind,
    #[serde(default)]
    pub name: Option<String>,
    /// Only for `attributes`
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub namespace: Option<Vec<String>>,
    /// Nested schema name, required for relationships
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default, rename = "if")]
    pub when: Option<String>,
    #[serde(default)]
    pub unless: Option<String>,
    #[serde(default)]
    pub resolve_with: Option<String>,
}

impl Definitions {
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

impl KeyTransformDefinition {
    fn to_transform(&self) -> Result<KeyTransform> {
        match self {
            KeyTransformDefinition::Named(name) => KeyTransform::from_name(name).ok_or_else(|| {
                DeserializeError::InvalidDefinition(format!("unknown key transform `{}`", name))
            }),
            KeyTransformDefinition::Replace { pattern, replacement } => {
                let pattern = Regex::new(pattern).map_err(|e| {
                    DeserializeError::InvalidDefinition(format!("bad key transform pattern: {}", e))
                })?;
                Ok(KeyTransform::Replace {
                    pattern,
                    replacement: replacement.clone(),
                })
            }
        }
    }
}

impl RuleDefinition {
    fn options(&self, functions: &FunctionTable) -> Result<RuleOptions> {
        let mut options = RuleOptions {
            key: self.key.clone(),
            prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
            ..RuleOptions::default()
        };

        if let Some(name) = &self.when {
            functions.condition(name)?;
            options = options.when_named(name.clone());
        }
        if let Some(name) = &self.unless {
            functions.condition(name)?;
            options = options.unless_named(name.clone());
        }
        if let Some(name) = &self.resolve_with {
            functions.resolver(name)?;
            options = options.resolve_with(name.clone());
        }

        Ok(options)
    }

    fn required_name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| DeserializeError::InvalidDefinition(format!("{:?} rule without a name", self.kind)))
    }
}

/// Builds schemas from definitions, parents and nested schemas first
pub(crate) struct DefinitionLoader<'a> {
    definitions: &'a Definitions,
    functions: &'a FunctionTable,
    built: HashMap<String, Arc<Schema>>,
    visiting: HashSet<String>,
}

impl<'a> DefinitionLoader<'a> {
    pub(crate) fn new(definitions: &'a Definitions, functions: &'a FunctionTable) -> Self {
        DefinitionLoader {
            definitions,
            functions,
            built: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    /// Build every defined schema, in definition order
    pub(crate) fn load_all(mut self) -> Result<Vec<Arc<Schema>>> {
        let definitions = self.definitions;
        let names: Vec<&String> = definitions.schemas.keys().collect();
        let mut schemas = Vec::with_capacity(names.len());
        for name in names {
            schemas.push(self.load(name)?);
        }
        Ok(schemas)
    }

    fn load(&mut self, name: &str) -> Result<Arc<Schema>> {
        if let Some(schema) = self.built.get(name) {
            return Ok(schema.clone());
        }

        let definitions = self.definitions;
        let definition = definitions
            .schemas
            .get(name)
            .ok_or_else(|| DeserializeError::UnknownSchema { name: name.to_string() })?;

        if !self.visiting.insert(name.to_string()) {
            return Err(DeserializeError::CyclicSchema { name: name.to_string() });
        }

        let mut builder = match &definition.extends {
            Some(parent) => self.load(parent)?.extend(name),
            None => SchemaBuilder::new(name),
        };
        builder.functions(self.functions);

        if let Some(transform) = &definition.key_transform {
            builder.key_transform(transform.to_transform()?);
        }

        for rule in &definition.rules {
            self.apply_rule(&mut builder, rule)?;
        }

        self.visiting.remove(name);
        let schema = builder.freeze();
        log::debug!("loaded schema `{}` with {} rules", name, schema.len());
        self.built.insert(name.to_string(), schema.clone());
        Ok(schema)
    }

    fn apply_rule(&mut self, builder: &mut SchemaBuilder, rule: &RuleDefinition) -> Result<()> {
        let options = rule.options(self.functions)?;

        match rule.kind {
            RuleDefinitionKind::Attribute => {
                builder.attribute_with(rule.required_name()?, options);
            }
            RuleDefinitionKind::Attributes => {
                if rule.names.is_empty() {
                    return Err(DeserializeError::InvalidDefinition(
                        "attributes rule without names".to_string(),
                    ));
                }
                builder.attributes_with(rule.names.iter().cloned(), options);
            }
            RuleDefinitionKind::HasOne | RuleDefinitionKind::BelongsTo | RuleDefinitionKind::HasMany => {
                let key = rule.required_name()?;
                let nested_name = rule.schema.as_deref().ok_or_else(|| {
                    DeserializeError::InvalidDefinition(format!("relationship `{}` without a schema", key))
                })?;
                // a schema naming itself parses its related resources recursively
                let nested = if nested_name == builder.name() {
                    Related::Recursive
                } else {
                    Related::Schema(self.load(nested_name)?)
                };

                if rule.kind == RuleDefinitionKind::HasMany {
                    builder.has_many_with(key, nested, options);
                } else {
                    builder.has_one_with(key, nested, options);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RuleKind;

    fn load(source: &str, functions: &FunctionTable) -> Result<Vec<Arc<Schema>>> {
        let definitions = Definitions::from_json_str(source)?;
        DefinitionLoader::new(&definitions, functions).load_all()
    }

    #[test]
    fn test_nested_schema_defined_later() {
        let source = r#"{
            "schemas": {
                "form": {
                    "rules": [
                        {"kind": "attributes", "names": ["name", "description"]},
                        {"kind": "belongs_to", "name": "author", "key": "target", "schema": "person"},
                        {"kind": "has_many", "name": "versions", "schema": "person"}
                    ]
                },
                "person": {"rules": [{"kind": "attribute", "name": "name"}]}
            }
        }"#;

        let schemas = load(source, &FunctionTable::new()).unwrap();
        assert_eq!(schemas.len(), 2);

        let form = &schemas[0];
        assert_eq!(form.attribute_fields(), vec!["name", "description"]);
        let author = form.rule("author").unwrap();
        assert_eq!(author.kind(), RuleKind::HasOne);
        assert_eq!(author.options().key.as_deref(), Some("target"));
        assert!(matches!(author.nested_schema(), Some(Related::Schema(nested)) if nested.name() == "person"));
    }

    #[test]
    fn test_extends_and_key_transform() {
        let source = r#"{
            "schemas": {
                "base": {"key_transform": "camel_case", "rules": [{"kind": "attribute", "name": "id"}]},
                "child": {"extends": "base", "rules": [{"kind": "attribute", "name": "title", "prefix": "post_"}]}
            }
        }"#;

        let schemas = load(source, &FunctionTable::new()).unwrap();
        let child = &schemas[1];
        assert_eq!(child.attribute_fields(), vec!["id", "title"]);
        assert!(matches!(child.key_transform(), KeyTransform::CamelCase));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let source = r#"{
            "schemas": {
                "a": {"rules": [{"kind": "has_one", "name": "b", "schema": "b"}]},
                "b": {"rules": [{"kind": "has_many", "name": "a", "schema": "a"}]}
            }
        }"#;

        assert!(matches!(
            load(source, &FunctionTable::new()),
            Err(DeserializeError::CyclicSchema { .. })
        ));
    }

    #[test]
    fn test_self_reference_is_recursive() {
        let source = r#"{
            "schemas": {
                "comment": {
                    "rules": [
                        {"kind": "attribute", "name": "body"},
                        {"kind": "has_many", "name": "replies", "schema": "comment"}
                    ]
                }
            }
        }"#;

        let schemas = load(source, &FunctionTable::new()).unwrap();
        let replies = schemas[0].rule("replies").unwrap();
        assert_eq!(replies.kind(), RuleKind::HasMany);
        assert!(matches!(replies.nested_schema(), Some(Related::Recursive)));
    }

    #[test]
    fn test_missing_references() {
        let unknown_schema = r#"{"schemas": {"a": {"rules": [{"kind": "has_one", "name": "b", "schema": "nope"}]}}}"#;
        assert!(matches!(
            load(unknown_schema, &FunctionTable::new()),
            Err(DeserializeError::UnknownSchema { .. })
        ));

        let unknown_condition = r#"{"schemas": {"a": {"rules": [{"kind": "attribute", "name": "b", "if": "nope"}]}}}"#;
        assert!(matches!(
            load(unknown_condition, &FunctionTable::new()),
            Err(DeserializeError::UnknownCondition { .. })
        ));

        let bad_transform = r#"{"schemas": {"a": {"key_transform": "shouting"}}}"#;
        assert!(matches!(
            load(bad_transform, &FunctionTable::new()),
            Err(DeserializeError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_named_functions_are_attached() {
        let mut functions = FunctionTable::new();
        functions.define_condition("has_name", |input| input.get("name").is_some());

        let source = r#"{"schemas": {"a": {"rules": [{"kind": "attribute", "name": "b", "if": "has_name"}]}}}"#;
        let schemas = load(source, &functions).unwrap();
        assert!(schemas[0].condition("has_name").is_ok());
    }
}
