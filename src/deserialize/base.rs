use super::Deserializer;
use crate::schema::Schema;
use crate::types::ParseOptions;
use serde_json::Value;
use std::sync::Arc;

/// Normalized payload bound to a schema, without a transform layer.
///
/// Useful for inspecting what a schema's key transform does to a payload;
/// calling `parse` fails with `NotImplemented`.
#[derive(Debug, Clone)]
pub struct BaseDeserializer {
    schema: Arc<Schema>,
    data: Value,
    options: ParseOptions,
}

impl BaseDeserializer {
    pub fn new(input: &Value, schema: impl Into<Arc<Schema>>, options: ParseOptions) -> Self {
        let schema = schema.into();
        let data = schema.key_transform().normalize(input);
        BaseDeserializer { schema, data, options }
    }
}

impl Deserializer for BaseDeserializer {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn data(&self) -> &Value {
        &self.data
    }

    fn options(&self) -> &ParseOptions {
        &self.options
    }
}
