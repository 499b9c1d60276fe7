use pretty_assertions::assert_eq;
use remold::{
    DeserializeError, Deserializer, FunctionTable, JsonApiDeserializer, ParseOptions, Parsed, RuleOptions, Schema,
    SchemaRegistry,
};
use serde_json::{json, Value};

fn registry() -> SchemaRegistry {
    let mut functions = FunctionTable::new();
    functions.define_resolver("method_check", |_, _, _| None);
    functions.define_condition("is_admin", |_| false);

    SchemaRegistry::from_json_str(include_str!("fixtures/schemas.json"), &functions).unwrap()
}

fn request() -> Value {
    serde_json::from_str(include_str!("fixtures/deserialize_jsonapi.json")).unwrap()
}

fn parse_one(deserializer: &JsonApiDeserializer) -> Value {
    match deserializer.parse().unwrap() {
        Parsed::Resource(map) => Value::Object(map),
        Parsed::Collection(_) => panic!("expected a single resource"),
    }
}

#[test]
fn parses_the_jsonapi_fixture() {
    let registry = registry();
    let deserializer = JsonApiDeserializer::new(&request(), registry.get("form").unwrap(), ParseOptions::default());

    assert_eq!(
        parse_one(&deserializer),
        json!({
            "localId": "b9037e4a-ba86-4e0d-960c-c793baeee678",
            "name": "Test Form",
            "description": "A form used for testing",
            "odd": "z-o-r-p",
            "author": {"localId": "a4217889-4997-456c-99ce-cda87a1b5448", "name": "harold"},
            "owner": {"id": "1"},
            "environments": [{"id": "1"}, {"id": "2"}],
            "versions": [{"id": "7", "name": "initial-commit"}]
        })
    );
}

#[test]
fn resolves_stubs_against_included() {
    let misc = Schema::builder("misc").attribute("name").freeze();
    let form = Schema::builder("form").attribute("name").has_one("author", misc).freeze();
    let document = json!({
        "data": {
            "id": "b903",
            "attributes": {"name": "Test Form"},
            "relationships": {"author": {"data": {"type": "misc", "localId": "a421"}}}
        },
        "included": [{"type": "misc", "localId": "a421", "attributes": {"name": "harold"}}]
    });

    let deserializer = JsonApiDeserializer::new(&document, form, ParseOptions::default());
    assert_eq!(
        parse_one(&deserializer),
        json!({"id": "b903", "name": "Test Form", "author": {"localId": "a421", "name": "harold"}})
    );
}

#[test]
fn nested_relationships_share_the_included_table() {
    let user = Schema::builder("user").attribute("name").freeze();
    let comment = Schema::builder("comment").attribute("body").has_one("author", user).freeze();
    let post = Schema::builder("post").has_many("comments", comment).freeze();
    let document = json!({
        "data": {"id": "p1", "relationships": {"comments": {"data": [{"type": "comment", "id": "c1"}]}}},
        "included": [
            {"type": "comment", "id": "c1", "attributes": {"body": "hi"},
             "relationships": {"author": {"data": {"type": "user", "id": "u1"}}}},
            {"type": "user", "id": "u1", "attributes": {"name": "alice"}}
        ]
    });

    let deserializer = JsonApiDeserializer::new(&document, post, ParseOptions::default());
    assert_eq!(
        parse_one(&deserializer),
        json!({"id": "p1", "comments": [{"id": "c1", "body": "hi", "author": {"id": "u1", "name": "alice"}}]})
    );

    let shallow = JsonApiDeserializer::new(&document, deserializer.schema().clone(), ParseOptions::default().with_max_depth(1));
    assert!(matches!(shallow.parse(), Err(DeserializeError::DepthExceeded { limit: 1 })));
}

#[test]
fn renamed_relationship_and_camel_case_schema() {
    let misc = Schema::builder("misc").attribute("name").freeze();
    let form = Schema::builder("form")
        .key_transform(remold::KeyTransform::CamelCase)
        .has_one_with("author", misc, RuleOptions::new().key("createdBy"))
        .freeze();
    let document = json!({
        "data": {"id": "1", "relationships": {"created_by": {"data": {"type": "misc", "id": "9"}}}}
    });

    let deserializer = JsonApiDeserializer::new(&document, form, ParseOptions::default());
    assert_eq!(parse_one(&deserializer), json!({"id": "1", "author": {"id": "9"}}));
}
