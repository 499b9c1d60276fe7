//! Rule types held by a schema

use super::builder::Schema;
use crate::error::{DeserializeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Custom lookup: `(container, declared key, rule options) -> value`
pub type ResolverFn = Arc<dyn Fn(&Value, &str, &RuleOptions) -> Option<Value> + Send + Sync>;

/// Predicate evaluated against the resource being parsed
pub type ConditionFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// The three rule shapes a schema understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Attribute,
    HasOne,
    HasMany,
}

/// A gate on rule inclusion, either inline or named on the schema
#[derive(Clone)]
pub enum Condition {
    Inline(ConditionFn),
    Named(String),
}

impl Condition {
    pub fn evaluate(&self, schema: &Schema, input: &Value) -> Result<bool> {
        match self {
            Condition::Inline(f) => Ok(f(input)),
            Condition::Named(name) => {
                let f = schema.condition(name)?;
                Ok(f(input))
            }
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Inline(_) => write!(f, "Inline(..)"),
            Condition::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// Options shared by every rule kind
#[derive(Clone, Default)]
pub struct RuleOptions {
    /// Source key to read instead of the declared key
    pub key: Option<String>,

    /// Prepended to the declared key when reading the source. Wins over `key`.
    pub prefix: Option<String>,

    /// Path of keys to descend through before the lookup
    pub namespace: Option<Vec<String>>,

    /// Include the rule only when this holds
    pub when: Option<Condition>,

    /// Skip the rule when this holds
    pub unless: Option<Condition>,

    /// Inline resolver replacing the default lookup
    pub with: Option<ResolverFn>,

    /// Named resolver on the owning schema, used when `with` is not set
    pub resolve_with: Option<String>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn namespace<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace = Some(path.into_iter().map(Into::into).collect());
        self
    }

    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Condition::Inline(Arc::new(f)));
        self
    }

    pub fn when_named(mut self, name: impl Into<String>) -> Self {
        self.when = Some(Condition::Named(name.into()));
        self
    }

    pub fn unless<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.unless = Some(Condition::Inline(Arc::new(f)));
        self
    }

    pub fn unless_named(mut self, name: impl Into<String>) -> Self {
        self.unless = Some(Condition::Named(name.into()));
        self
    }

    pub fn with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &str, &RuleOptions) -> Option<Value> + Send + Sync + 'static,
    {
        self.with = Some(Arc::new(f));
        self
    }

    pub fn resolve_with(mut self, name: impl Into<String>) -> Self {
        self.resolve_with = Some(name.into());
        self
    }

    /// Key used to read the source value for `declared`
    pub fn source_key(&self, declared: &str) -> String {
        match (&self.prefix, &self.key) {
            (Some(prefix), _) => format!("{}{}", prefix, declared),
            (None, Some(key)) => key.clone(),
            (None, None) => declared.to_string(),
        }
    }
}

impl fmt::Debug for RuleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleOptions")
            .field("key", &self.key)
            .field("prefix", &self.prefix)
            .field("namespace", &self.namespace)
            .field("when", &self.when)
            .field("unless", &self.unless)
            .field("with", &self.with.as_ref().map(|_| ".."))
            .field("resolve_with", &self.resolve_with)
            .finish()
    }
}

/// Schema a relationship parses its related resources with
#[derive(Debug, Clone)]
pub enum Related {
    Schema(Arc<Schema>),
    /// The schema that owns the rule, for self-referencing resources
    Recursive,
}

impl Related {
    /// The schema to parse with, given the schema owning the rule
    pub fn resolve(&self, owner: &Arc<Schema>) -> Arc<Schema> {
        match self {
            Related::Schema(schema) => schema.clone(),
            Related::Recursive => owner.clone(),
        }
    }
}

impl From<Arc<Schema>> for Related {
    fn from(schema: Arc<Schema>) -> Self {
        Related::Schema(schema)
    }
}

impl From<Schema> for Related {
    fn from(schema: Schema) -> Self {
        Related::Schema(Arc::new(schema))
    }
}

/// A single declaration in a schema
#[derive(Debug, Clone)]
pub enum Rule {
    Attribute(RuleOptions),
    HasOne { schema: Related, options: RuleOptions },
    HasMany { schema: Related, options: RuleOptions },
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Attribute(_) => RuleKind::Attribute,
            Rule::HasOne { .. } => RuleKind::HasOne,
            Rule::HasMany { .. } => RuleKind::HasMany,
        }
    }

    pub fn options(&self) -> &RuleOptions {
        match self {
            Rule::Attribute(options) => options,
            Rule::HasOne { options, .. } | Rule::HasMany { options, .. } => options,
        }
    }

    /// Schema used to parse related resources, for relationship rules
    pub fn nested_schema(&self) -> Option<&Related> {
        match self {
            Rule::Attribute(_) => None,
            Rule::HasOne { schema, .. } | Rule::HasMany { schema, .. } => Some(schema),
        }
    }
}

/// Named resolvers and conditions attached to a schema
#[derive(Clone, Default)]
pub struct FunctionTable {
    resolvers: HashMap<String, ResolverFn>,
    conditions: HashMap<String, ConditionFn>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_resolver<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value, &str, &RuleOptions) -> Option<Value> + Send + Sync + 'static,
    {
        self.resolvers.insert(name.into(), Arc::new(f));
    }

    pub fn define_condition<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.conditions.insert(name.into(), Arc::new(f));
    }

    pub fn resolver(&self, name: &str) -> Result<&ResolverFn> {
        self.resolvers
            .get(name)
            .ok_or_else(|| DeserializeError::UnknownResolver { name: name.to_string() })
    }

    pub fn condition(&self, name: &str) -> Result<&ConditionFn> {
        self.conditions
            .get(name)
            .ok_or_else(|| DeserializeError::UnknownCondition { name: name.to_string() })
    }

    pub fn has_resolver(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    pub fn has_condition(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    /// Copy every entry of `other` into this table, replacing same-named ones
    pub fn merge(&mut self, other: &FunctionTable) {
        for (name, f) in &other.resolvers {
            self.resolvers.insert(name.clone(), f.clone());
        }
        for (name, f) in &other.conditions {
            self.conditions.insert(name.clone(), f.clone());
        }
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut resolvers: Vec<&String> = self.resolvers.keys().collect();
        let mut conditions: Vec<&String> = self.conditions.keys().collect();
        resolvers.sort();
        conditions.sort();
        f.debug_struct("FunctionTable")
            .field("resolvers", &resolvers)
            .field("conditions", &conditions)
            .finish()
    }
}
