use super::included::{Identifier, IncludedTable};
use super::resolver::find_attribute;
use super::{as_collection, check_depth, expect_object, Deserializer, Transform};
use crate::error::{DeserializeError, Result};
use crate::schema::{RuleOptions, Schema, ID_MEMBER, LOCAL_ID_MEMBER};
use crate::types::{AttributeMap, ParseOptions, Parsed};
use log::{debug, trace};
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::sync::Arc;

/// Deserializer for JSON-API documents
///
/// Attributes are read from each resource's `attributes` member and
/// relationships from `relationships`. Relationship stubs are swapped for
/// the matching resource in `included` when there is one.
///
/// Document members are looked up under the schema's key transform, since
/// the whole document is normalized before parsing.
#[derive(Debug)]
pub struct JsonApiDeserializer {
    schema: Arc<Schema>,
    data: Value,
    options: Arc<ParseOptions>,
    depth: usize,
    included: OnceCell<Arc<IncludedTable>>,
}

impl JsonApiDeserializer {
    pub fn new(input: &Value, schema: impl Into<Arc<Schema>>, options: ParseOptions) -> Self {
        let schema = schema.into();
        let data = schema.key_transform().normalize(input);
        JsonApiDeserializer {
            schema,
            data,
            options: Arc::new(options),
            depth: 0,
            included: OnceCell::new(),
        }
    }

    fn nested(&self, resource: &Value, schema: Arc<Schema>) -> Self {
        let data = schema.key_transform().normalize(resource);
        JsonApiDeserializer {
            schema,
            data,
            options: self.options.clone(),
            depth: self.depth + 1,
            included: OnceCell::from(self.included().clone()),
        }
    }

    /// The resource lookup table, built on first use.
    ///
    /// `ParseOptions::included` takes precedence over the document's own
    /// `included` member.
    pub fn included(&self) -> &Arc<IncludedTable> {
        self.included.get_or_init(|| {
            let resources = match &self.options.included {
                Some(external) => external
                    .iter()
                    .map(|resource| self.schema.key_transform().normalize(resource))
                    .collect(),
                None => match self.data.get(&self.schema.member("included")) {
                    Some(Value::Array(resources)) => resources.clone(),
                    _ => Vec::new(),
                },
            };
            Arc::new(IncludedTable::new(
                resources,
                &self.schema.member("type"),
                &self.schema.id_member(),
                &self.schema.local_id_member(),
            ))
        })
    }

    /// Parse one resource object
    fn parse_resource(&self, resource: &Value) -> Result<AttributeMap> {
        let resource = expect_object("data", resource)?;
        let output = self.data_id(resource);
        self.apply_transforms(output, resource)
    }

    /// Seed the output with the resource's `id`, or its `localId` without one.
    /// The seed keeps the canonical member name whatever the key transform.
    fn data_id(&self, resource: &Value) -> AttributeMap {
        let mut output = AttributeMap::new();

        if let Some(id) = resource.get(&self.schema.id_member()).filter(|v| !v.is_null()) {
            output.insert(ID_MEMBER.to_string(), id.clone());
        } else if let Some(lid) = resource.get(&self.schema.local_id_member()).filter(|v| !v.is_null()) {
            output.insert(LOCAL_ID_MEMBER.to_string(), lid.clone());
        }

        output
    }

    /// `data` of the relationship declared as `key`, if present
    fn find_relationship_data(&self, input: &Value, key: &str, options: &RuleOptions) -> Result<Option<Value>> {
        let relationships = input.get(&self.schema.member("relationships"));
        let relationship = find_attribute(&self.schema, relationships, key, options)?;
        let data_member = self.schema.member("data");
        Ok(relationship
            .and_then(|mut relationship| relationship.get_mut(&data_member).map(Value::take))
            .filter(|data| !data.is_null()))
    }

    /// Replace a stub with its full body from `included`, or keep the stub
    fn lookup_relationship(&self, key: &str, stub: &Value) -> Result<Value> {
        let stub = expect_object(key, stub)?;

        let Some(kind) = stub.get(&self.schema.member("type")).filter(|v| !v.is_null()) else {
            return Err(DeserializeError::MalformedRelationship {
                key: key.to_string(),
                reason: "missing `type`".to_string(),
            });
        };

        let id = stub.get(&self.schema.id_member()).filter(|v| !v.is_null()).map(Identifier::id);
        let identifier = match id {
            Some(id) => id,
            None => stub
                .get(&self.schema.local_id_member())
                .filter(|v| !v.is_null())
                .map(Identifier::local_id)
                .ok_or_else(|| DeserializeError::MalformedRelationship {
                    key: key.to_string(),
                    reason: format!(
                        "neither `{}` nor `{}` present",
                        self.schema.id_member(),
                        self.schema.local_id_member()
                    ),
                })?,
        };

        match self.included().find(kind, &identifier) {
            Some(resource) => Ok(resource.clone()),
            None => {
                debug!("{}: `{}` {:?} not included, using the stub", self.schema.name(), key, identifier);
                Ok(stub.clone())
            }
        }
    }

    fn parse_related(&self, key: &str, stub: &Value, nested: &Arc<Schema>) -> Result<Value> {
        let resource = self.lookup_relationship(key, stub)?;
        let deserializer = self.nested(&resource, nested.clone());
        check_depth(deserializer.depth, &deserializer.options)?;
        let data = deserializer.data();
        Ok(Value::Object(deserializer.parse_resource(data)?))
    }
}

impl Deserializer for JsonApiDeserializer {
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
        check_depth(self.depth, &self.options)?;
        debug!("{}: parsing JSON-API at depth {}", self.schema.name(), self.depth);

        let input = match self.data.get(&self.schema.member("data")) {
            Some(data) if !data.is_null() => data,
            _ => &self.data,
        };

        match input {
            Value::Array(resources) => resources
                .iter()
                .map(|resource| self.parse_resource(resource))
                .collect::<Result<Vec<_>>>()
                .map(Parsed::Collection),
            resource => self.parse_resource(resource).map(Parsed::Resource),
        }
    }
}

impl Transform for JsonApiDeserializer {
    fn shared_schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn parse_attribute(&self, output: &mut AttributeMap, input: &Value, key: &str, options: &RuleOptions) -> Result<()> {
        let attributes = input.get(&self.schema.member("attributes"));
        match find_attribute(&self.schema, attributes, key, options)? {
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
        let Some(data) = self.find_relationship_data(input, key, options)? else {
            trace!("{}: relationship `{}` absent", self.schema.name(), key);
            return Ok(());
        };

        let parsed = self.parse_related(key, &data, nested)?;
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
        let Some(data) = self.find_relationship_data(input, key, options)? else {
            trace!("{}: relationship `{}` absent", self.schema.name(), key);
            return Ok(());
        };

        let parsed = as_collection(key, &data)?
            .into_iter()
            .map(|stub| self.parse_related(key, stub, nested))
            .collect::<Result<Vec<_>>>()?;
        output.insert(key.to_string(), Value::Array(parsed));
        Ok(())
    }
}
