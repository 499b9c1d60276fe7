//! Lookup table over a JSON-API document's `included` resources

use serde_json::Value;
use std::collections::HashMap;

/// Which identifier a relationship stub carries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Id(String),
    LocalId(String),
}

impl Identifier {
    /// Identifiers match on their exact JSON form, so `"1"` and `1` differ
    pub fn id(value: &Value) -> Self {
        Identifier::Id(value.to_string())
    }

    pub fn local_id(value: &Value) -> Self {
        Identifier::LocalId(value.to_string())
    }
}

/// Full resource bodies indexed by `type` and identifier
#[derive(Debug, Default)]
pub struct IncludedTable {
    resources: Vec<Value>,
    index: HashMap<(String, Identifier), usize>,
}

impl IncludedTable {
    /// Index `resources`. When two resources share a type and identifier,
    /// the first one wins.
    pub fn new(resources: Vec<Value>, type_member: &str, id_member: &str, local_id_member: &str) -> Self {
        let mut index = HashMap::new();

        for (position, resource) in resources.iter().enumerate() {
            let Some(kind) = resource.get(type_member).filter(|v| !v.is_null()) else {
                continue;
            };

            if let Some(id) = resource.get(id_member).filter(|v| !v.is_null()) {
                index.entry((kind.to_string(), Identifier::id(id))).or_insert(position);
            }
            if let Some(lid) = resource.get(local_id_member).filter(|v| !v.is_null()) {
                index.entry((kind.to_string(), Identifier::local_id(lid))).or_insert(position);
            }
        }

        IncludedTable { resources, index }
    }

    pub fn find(&self, kind: &Value, identifier: &Identifier) -> Option<&Value> {
        self.index
            .get(&(kind.to_string(), identifier.clone()))
            .map(|&position| &self.resources[position])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> IncludedTable {
        IncludedTable::new(
            vec![
                json!({"type": "misc", "local_id": "a421", "attributes": {"name": "harold"}}),
                json!({"type": "user", "id": "1", "attributes": {"name": "first"}}),
                json!({"type": "user", "id": "1", "attributes": {"name": "second"}}),
                json!({"type": "user", "id": 2}),
                json!({"id": "untyped"}),
            ],
            "type",
            "id",
            "local_id",
        )
    }

    #[test]
    fn test_find_by_id_and_local_id() {
        let table = table();
        assert_eq!(table.len(), 5);

        let harold = table.find(&json!("misc"), &Identifier::local_id(&json!("a421"))).unwrap();
        assert_eq!(harold["attributes"]["name"], "harold");

        let user = table.find(&json!("user"), &Identifier::id(&json!("1"))).unwrap();
        assert_eq!(user["attributes"]["name"], "first");
    }

    #[test]
    fn test_exact_matching() {
        let table = table();
        assert!(table.find(&json!("user"), &Identifier::id(&json!(1))).is_none());
        assert!(table.find(&json!("user"), &Identifier::id(&json!(2))).is_some());
        assert!(table.find(&json!("misc"), &Identifier::id(&json!("a421"))).is_none());
        assert!(table.find(&json!("other"), &Identifier::id(&json!("1"))).is_none());
    }

    #[test]
    fn test_transformed_member_names() {
        let table = IncludedTable::new(
            vec![json!({"Type": "misc", "LocalId": "a421", "Attributes": {"Name": "harold"}})],
            "Type",
            "Id",
            "LocalId",
        );

        let harold = table.find(&json!("misc"), &Identifier::local_id(&json!("a421"))).unwrap();
        assert_eq!(harold["Attributes"]["Name"], "harold");
    }
}
