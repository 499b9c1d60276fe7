//! Key normalization
//!
//! Every key of a raw payload, at every depth, is rewritten by the schema's
//! key transform before any rule looks at it. Values are walked but never
//! changed.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// User-supplied key rewrite
pub type KeyFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Strategy used to rewrite raw payload keys
#[derive(Clone, Default)]
pub enum KeyTransform {
    /// `twoWords` / `TwoWords` / `two-words` become `two_words`
    #[default]
    SnakeCase,
    CamelCase,
    PascalCase,
    KebabCase,
    /// Keys are kept as they arrive
    Identity,
    /// Every match of `pattern` is replaced with `replacement`
    Replace { pattern: Regex, replacement: String },
    Custom(KeyFn),
}

impl KeyTransform {
    /// Wrap a closure as a custom transform
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyTransform::Custom(Arc::new(f))
    }

    /// Look up a named casing strategy
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "snake_case" | "underscore" => Some(KeyTransform::SnakeCase),
            "camel_case" | "camelize_lower" => Some(KeyTransform::CamelCase),
            "pascal_case" | "camelize" => Some(KeyTransform::PascalCase),
            "kebab_case" | "dasherize" => Some(KeyTransform::KebabCase),
            "identity" | "none" => Some(KeyTransform::Identity),
            _ => None,
        }
    }

    /// Rewrite a single key
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyTransform::SnakeCase => key.to_snake_case(),
            KeyTransform::CamelCase => key.to_lower_camel_case(),
            KeyTransform::PascalCase => key.to_upper_camel_case(),
            KeyTransform::KebabCase => key.to_kebab_case(),
            KeyTransform::Identity => key.to_string(),
            KeyTransform::Replace { pattern, replacement } => {
                pattern.replace_all(key, replacement.as_str()).into_owned()
            }
            KeyTransform::Custom(f) => f(key),
        }
    }

    /// Rewrite every key of `input`, recursing through objects and arrays
    pub fn normalize(&self, input: &Value) -> Value {
        match input {
            Value::Object(map) => Value::Object(self.normalize_map(map)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.normalize(v)).collect()),
            other => other.clone(),
        }
    }

    fn normalize_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| (self.apply(key), self.normalize(value)))
            .collect()
    }
}

impl fmt::Debug for KeyTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyTransform::SnakeCase => write!(f, "SnakeCase"),
            KeyTransform::CamelCase => write!(f, "CamelCase"),
            KeyTransform::PascalCase => write!(f, "PascalCase"),
            KeyTransform::KebabCase => write!(f, "KebabCase"),
            KeyTransform::Identity => write!(f, "Identity"),
            KeyTransform::Replace { pattern, replacement } => f
                .debug_struct("Replace")
                .field("pattern", &pattern.as_str())
                .field("replacement", replacement)
                .finish(),
            KeyTransform::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Normalize `input` with the default snake_case strategy
pub fn normalize_keys(input: &Value) -> Value {
    KeyTransform::SnakeCase.normalize(input)
}
