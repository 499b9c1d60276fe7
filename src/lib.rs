//! # Remold - Declarative Payload Deserialization
//!
//! Turns loosely shaped request payloads into normalized attribute maps.
//! A `Schema` declares which attributes and relationships to pick out and
//! where to find them; a deserializer applies it to one payload.
//!
//! ## Modules
//!
//! - **schema**: rule declarations, inheritance, named schemas and definition files
//! - **normalize**: key casing strategies applied to every input key
//! - **deserialize**: the JSON and JSON-API transform drivers
//!
//! ## Quick Start
//!
//! ### Plain JSON
//!
//! ```rust
//! use remold::{JsonDeserializer, ParseOptions, RuleOptions, Schema};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let person = Schema::builder("person").attribute("name").freeze();
//! let form = Schema::builder("form")
//!     .attribute("name")
//!     .attribute_with("treasure", RuleOptions::new().namespace(["deep", "namespaced"]))
//!     .belongs_to_with("author", person, RuleOptions::new().key("target"))
//!     .freeze();
//!
//! let input = json!({
//!     "Name": "Test Form",
//!     "deep": {"namespaced": {"treasure": "gold"}},
//!     "target": {"name": "harold"}
//! });
//!
//! let output = JsonDeserializer::new(&input, form, ParseOptions::default()).parse_map()?;
//! assert_eq!(output["treasure"], "gold");
//! assert_eq!(output["author"]["name"], "harold");
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON-API
//!
//! ```rust
//! use remold::{Deserializer, JsonApiDeserializer, ParseOptions, Schema};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let person = Schema::builder("person").attribute("name").freeze();
//! let form = Schema::builder("form").attribute("name").has_one("author", person).freeze();
//!
//! let document = json!({
//!     "data": {
//!         "id": "b903",
//!         "attributes": {"name": "Test Form"},
//!         "relationships": {"author": {"data": {"type": "person", "localId": "a421"}}}
//!     },
//!     "included": [{"type": "person", "localId": "a421", "attributes": {"name": "harold"}}]
//! });
//!
//! let parsed = JsonApiDeserializer::new(&document, form, ParseOptions::default()).parse()?;
//! assert_eq!(
//!     parsed.into_value(),
//!     json!({"id": "b903", "name": "Test Form", "author": {"localId": "a421", "name": "harold"}})
//! );
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::sync::Arc;

pub mod deserialize;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod types;

// Re-export commonly used types for convenience
pub use deserialize::{parse, BaseDeserializer, Deserializer, JsonApiDeserializer, JsonDeserializer};
pub use error::DeserializeError;
pub use normalize::{normalize_keys, KeyTransform};
pub use schema::{FunctionTable, Related, Rule, RuleKind, RuleOptions, Schema, SchemaBuilder, SchemaRegistry};
pub use types::{AttributeMap, Mode, ParseOptions, Parsed};

/// Parse every JSON document in `reader` and write one result per line.
///
/// Documents may be separated by newlines or simply concatenated. Returns
/// the number of documents written.
pub fn deserialize_stream<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    schema: &Arc<Schema>,
    mode: Mode,
    options: &ParseOptions,
) -> Result<usize> {
    let stream = serde_json::Deserializer::from_reader(reader).into_iter::<Value>();
    let mut count = 0;

    for document in stream {
        let document = document.context("Failed to parse JSON")?;
        let parsed = parse(&document, schema.clone(), mode, options.clone())
            .with_context(|| format!("Failed to deserialize document {}", count + 1))?;

        let line = serde_json::to_string(&parsed).context("Failed to serialize output")?;
        writeln!(writer, "{}", line).context("Failed to write output")?;
        count += 1;
    }

    Ok(count)
}
