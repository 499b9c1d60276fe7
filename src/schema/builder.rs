//! Schema builder and frozen schema
//!
//! A `SchemaBuilder` accumulates declarations in order. `build` freezes it
//! into a `Schema`, which the deserializers read but never change. Deriving
//! a schema from another with `extend` copies the parent's rule table, key
//! transform and named functions; the two evolve independently afterwards.

use super::rule::{ConditionFn, FunctionTable, Related, ResolverFn, Rule, RuleKind, RuleOptions};
use crate::error::Result;
use crate::normalize::KeyTransform;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Canonical name of the JSON-API local identifier member
pub const LOCAL_ID_MEMBER: &str = "localId";

/// Canonical name of the JSON-API identifier member
pub const ID_MEMBER: &str = "id";

/// Mutable, ordered collection of rule declarations
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    rules: IndexMap<String, Rule>,
    key_transform: KeyTransform,
    functions: FunctionTable,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new(name: impl Into<String>) -> Self {
        SchemaBuilder {
            name: name.into(),
            rules: IndexMap::new(),
            key_transform: KeyTransform::default(),
            functions: FunctionTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a plain attribute
    pub fn attribute(&mut self, key: impl Into<String>) -> &mut Self {
        self.attribute_with(key, RuleOptions::default())
    }

    /// Declare a plain attribute with options. Redeclaring a key replaces
    /// its rule but keeps its original position.
    pub fn attribute_with(&mut self, key: impl Into<String>, options: RuleOptions) -> &mut Self {
        self.rules.insert(key.into(), Rule::Attribute(options));
        self
    }

    pub fn attributes<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_with(keys, RuleOptions::default())
    }

    /// Declare several attributes sharing the same options
    pub fn attributes_with<I, S>(&mut self, keys: I, options: RuleOptions) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.attribute_with(key, options.clone());
        }
        self
    }

    /// Declare a single related resource parsed with `schema`
    pub fn has_one(&mut self, key: impl Into<String>, schema: impl Into<Related>) -> &mut Self {
        self.has_one_with(key, schema, RuleOptions::default())
    }

    pub fn has_one_with(
        &mut self,
        key: impl Into<String>,
        schema: impl Into<Related>,
        options: RuleOptions,
    ) -> &mut Self {
        self.rules.insert(
            key.into(),
            Rule::HasOne {
                schema: schema.into(),
                options,
            },
        );
        self
    }

    /// Alias of `has_one`
    pub fn belongs_to(&mut self, key: impl Into<String>, schema: impl Into<Related>) -> &mut Self {
        self.has_one(key, schema)
    }

    pub fn belongs_to_with(
        &mut self,
        key: impl Into<String>,
        schema: impl Into<Related>,
        options: RuleOptions,
    ) -> &mut Self {
        self.has_one_with(key, schema, options)
    }

    /// Declare a collection of related resources parsed with `schema`
    pub fn has_many(&mut self, key: impl Into<String>, schema: impl Into<Related>) -> &mut Self {
        self.has_many_with(key, schema, RuleOptions::default())
    }

    pub fn has_many_with(
        &mut self,
        key: impl Into<String>,
        schema: impl Into<Related>,
        options: RuleOptions,
    ) -> &mut Self {
        self.rules.insert(
            key.into(),
            Rule::HasMany {
                schema: schema.into(),
                options,
            },
        );
        self
    }

    /// Set the strategy applied to every input key before parsing
    pub fn key_transform(&mut self, transform: KeyTransform) -> &mut Self {
        self.key_transform = transform;
        self
    }

    /// Register a resolver rules can reference with `resolve_with`
    pub fn define_resolver<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value, &str, &RuleOptions) -> Option<Value> + Send + Sync + 'static,
    {
        self.functions.define_resolver(name, f);
        self
    }

    /// Register a condition rules can reference with `when_named`/`unless_named`
    pub fn define_condition<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.functions.define_condition(name, f);
        self
    }

    /// Attach every function of `table` to this schema
    pub fn functions(&mut self, table: &FunctionTable) -> &mut Self {
        self.functions.merge(table);
        self
    }

    /// Freeze the declarations into a schema
    pub fn build(&self) -> Schema {
        Schema {
            name: self.name.clone(),
            rules: self.rules.clone(),
            key_transform: self.key_transform.clone(),
            functions: self.functions.clone(),
        }
    }

    /// Freeze and wrap for sharing between rules and threads
    pub fn freeze(&self) -> Arc<Schema> {
        Arc::new(self.build())
    }
}

/// Immutable rule table describing how to parse one resource shape
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    rules: IndexMap<String, Rule>,
    key_transform: KeyTransform,
    functions: FunctionTable,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a new builder from a copy of this schema
    pub fn extend(&self, name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            rules: self.rules.clone(),
            key_transform: self.key_transform.clone(),
            functions: self.functions.clone(),
        }
    }

    /// Rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(key, rule)| (key.as_str(), rule))
    }

    pub fn rule(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Keys of plain attribute rules, in declaration order
    pub fn attribute_fields(&self) -> Vec<&str> {
        self.keys_of(RuleKind::Attribute)
    }

    pub fn keys_of(&self, kind: RuleKind) -> Vec<&str> {
        self.rules()
            .filter(|(_, rule)| rule.kind() == kind)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn key_transform(&self) -> &KeyTransform {
        &self.key_transform
    }

    pub fn resolver(&self, name: &str) -> Result<&ResolverFn> {
        self.functions.resolver(name)
    }

    pub fn condition(&self, name: &str) -> Result<&ConditionFn> {
        self.functions.condition(name)
    }

    /// Name of a document member once payload keys are normalized
    pub fn member(&self, name: &str) -> String {
        self.key_transform.apply(name)
    }

    /// Member holding a resource's identifier, after key normalization
    pub fn id_member(&self) -> String {
        self.member(ID_MEMBER)
    }

    /// Member holding a resource's local identifier, after key normalization
    pub fn local_id_member(&self) -> String {
        self.member(LOCAL_ID_MEMBER)
    }
}

impl From<&SchemaBuilder> for Schema {
    fn from(builder: &SchemaBuilder) -> Self {
        builder.build()
    }
}
