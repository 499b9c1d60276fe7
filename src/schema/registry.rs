use super::builder::Schema;
use super::definition::{DefinitionLoader, Definitions};
use super::rule::FunctionTable;
use crate::error::{DeserializeError, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Frozen schemas looked up by name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every schema of a definitions document
    pub fn from_definitions(definitions: &Definitions, functions: &FunctionTable) -> Result<Self> {
        let mut registry = SchemaRegistry::new();
        for schema in DefinitionLoader::new(definitions, functions).load_all()? {
            registry.register(schema);
        }
        Ok(registry)
    }

    pub fn from_json_str(source: &str, functions: &FunctionTable) -> Result<Self> {
        Self::from_definitions(&Definitions::from_json_str(source)?, functions)
    }

    /// Add a schema under its own name, returning any schema it replaced
    pub fn register(&mut self, schema: impl Into<Arc<Schema>>) -> Option<Arc<Schema>> {
        let schema = schema.into();
        self.schemas.insert(schema.name().to_string(), schema)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Schema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| DeserializeError::UnknownSchema { name: name.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
