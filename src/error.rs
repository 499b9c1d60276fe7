use thiserror::Error;

/// Errors raised while building schemas or parsing payloads
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// `parse` was called on a deserializer with no transform layer
    #[error("#parse not implemented")]
    NotImplemented,

    /// A relationship reference cannot be resolved to a resource
    #[error("malformed relationship `{key}`: {reason}")]
    MalformedRelationship { key: String, reason: String },

    /// A nested resource was not an object
    #[error("expected an object for `{key}`, found {found}")]
    InvalidResource { key: String, found: &'static str },

    #[error("nested resources exceed the maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("no resolver named `{name}`")]
    UnknownResolver { name: String },

    #[error("no condition named `{name}`")]
    UnknownCondition { name: String },

    #[error("no schema named `{name}`")]
    UnknownSchema { name: String },

    #[error("schema `{name}` is part of a reference cycle")]
    CyclicSchema { name: String },

    #[error("invalid schema definition: {0}")]
    InvalidDefinition(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeserializeError>;

/// Name of a JSON value's type, used in error messages
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
