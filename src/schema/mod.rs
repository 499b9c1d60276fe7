//! Declarative schemas
//!
//! A schema is an ordered table of attribute and relationship rules,
//! built once and shared read-only by every deserializer that uses it.

pub mod builder;
pub mod definition;
pub mod registry;
pub mod rule;

pub use builder::{Schema, SchemaBuilder, ID_MEMBER, LOCAL_ID_MEMBER};
pub use definition::{Definitions, KeyTransformDefinition, RuleDefinition, RuleDefinitionKind, SchemaDefinition};
pub use registry::SchemaRegistry;
pub use rule::{Condition, ConditionFn, FunctionTable, Related, ResolverFn, Rule, RuleKind, RuleOptions};
