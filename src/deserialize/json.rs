use super::resolver::find_attribute;
use super::{as_collection, check_depth, expect_object, Deserializer, Transform};
use crate::error::Result;
use crate::schema::{RuleOptions, Schema};
use crate::types::{AttributeMap, ParseOptions, Parsed};
use log::{debug, trace};
use serde_json::Value;
use std::sync::Arc;

/// Deserializer for plain key-value payloads
#[derive(Debug, Clone)]
pub struct JsonDeserializer {
    schema: Arc<Schema>,
    data: Value,
    options: Arc<ParseOptions>,
    depth: usize,
}

impl JsonDeserializer {
    pub fn new(input: &Value, schema: impl Into<Arc<Schema>>, options: ParseOptions) -> Self {
        Self::nested(input, schema.into(), Arc::new(options), 0)
    }

    fn nested(input: &Value, schema: Arc<Schema>, options: Arc<ParseOptions>, depth: usize) -> Self {
        let data = schema.key_transform().normalize(input);
        JsonDeserializer {
            schema,
            data,
            options,
            depth,
        }
    }

    /// Parse into a single attribute map
    pub fn parse_map(&self) -> Result<AttributeMap> {
        check_depth(self.depth, &self.options)?;
        debug!("{}: parsing JSON at depth {}", self.schema.name(), self.depth);
        self.apply_transforms(AttributeMap::new(), &self.data)
    }

    fn parse_related(&self, key: &str, resource: &Value, nested: &Arc<Schema>) -> Result<Value> {
        let resource = expect_object(key, resource)?;
        let deserializer = Self::nested(resource, nested.clone(), self.options.clone(), self.depth + 1);
        Ok(Value::Object(deserializer.parse_map()?))
    }
}

impl Deserializer for JsonDeserializer {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn data(&self) -> &Value {
        &self.data
    }

    fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn parse(&self) -> Result<Parsed> {
        self.parse_map().map(Parsed::Resource)
    }
}

impl Transform for JsonDeserializer {
    fn shared_schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn parse_attribute(&self, output: &mut AttributeMap, input: &Value, key: &str, options: &RuleOptions) -> Result<()> {
        match find_attribute(&self.schema, Some(input), key, options)? {
            Some(value) => {
                output.insert(key.to_string(), value);
            }
            None => trace!("{}: `{}` absent", self.schema.name(), key),
        }
        Ok(())
    }

    fn parse_has_one(
        &self,
        output: &mut AttributeMap,
        input: &Value,
        key: &str,
        nested: &Arc<Schema>,
        options: &RuleOptions,
    ) -> Result<()> {
        let Some(resource) = find_attribute(&self.schema, Some(input), key, options)? else {
            trace!("{}: relationship `{}` absent", self.schema.name(), key);
            return Ok(());
        };

        let parsed = self.parse_related(key, &resource, nested)?;
        output.insert(key.to_string(), parsed);
        Ok(())
    }

    fn parse_has_many(
        &self,
        output: &mut AttributeMap,
        input: &Value,
        key: &str,
        nested: &Arc<Schema>,
        options: &RuleOptions,
    ) -> Result<()> {
        let Some(resources) = find_attribute(&self.schema, Some(input), key, options)? else {
            trace!("{}: relationship `{}` absent", self.schema.name(), key);
            return Ok(());
        };

        let parsed = as_collection(key, &resources)?
            .into_iter()
            .map(|resource| self.parse_related(key, resource, nested))
            .collect::<Result<Vec<_>>>()?;
        output.insert(key.to_string(), Value::Array(parsed));
        Ok(())
    }
}
