use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized output of a deserializer: declared key to resolved value
pub type AttributeMap = Map<String, Value>;

/// Result of a parse: one resource, or one map per element of a `data` array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Parsed {
    Resource(AttributeMap),
    Collection(Vec<AttributeMap>),
}

impl Parsed {
    /// The single resource, if this parse produced one
    pub fn as_resource(&self) -> Option<&AttributeMap> {
        match self {
            Parsed::Resource(map) => Some(map),
            Parsed::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[AttributeMap]> {
        match self {
            Parsed::Resource(_) => None,
            Parsed::Collection(maps) => Some(maps),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Parsed::Resource(map) => Value::Object(map),
            Parsed::Collection(maps) => Value::Array(maps.into_iter().map(Value::Object).collect()),
        }
    }
}

/// Which payload layout the transform driver expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Plain key-value payloads
    #[default]
    Json,
    /// `{ data, included }` documents with typed resources and relationships
    JsonApi,
}

/// Per-parse configuration
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// External resource table used to resolve relationship stubs.
    /// Takes precedence over the document's own `included` member.
    pub included: Option<Vec<Value>>,

    /// Maximum nesting of related resources before parsing fails
    pub max_depth: usize,

    /// Ambient host values, handed unchanged to every nested deserializer
    pub context: Map<String, Value>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            included: None,
            max_depth: 32,
            context: Map::new(),
        }
    }
}

impl ParseOptions {
    pub fn with_included(mut self, included: Vec<Value>) -> Self {
        self.included = Some(included);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}
