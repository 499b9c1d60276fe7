use pretty_assertions::assert_eq;
use remold::{FunctionTable, JsonDeserializer, ParseOptions, SchemaRegistry};
use serde_json::{json, Value};

fn registry() -> SchemaRegistry {
    let mut functions = FunctionTable::new();
    functions.define_resolver("method_check", |input, _, _| {
        let two_word = input.get("two_word")?.as_str()?;
        Some(json!(format!("method_{}", two_word)))
    });
    functions.define_condition("is_admin", |input| input.get("is_admin") == Some(&json!(true)));

    SchemaRegistry::from_json_str(include_str!("fixtures/schemas.json"), &functions).unwrap()
}

fn request() -> Value {
    serde_json::from_str(include_str!("fixtures/deserialize_json.json")).unwrap()
}

#[test]
fn parses_the_json_fixture() {
    let registry = registry();
    let form = registry.get("form").unwrap();

    let output = JsonDeserializer::new(&request(), form, ParseOptions::default())
        .parse_map()
        .unwrap();

    assert_eq!(
        Value::Object(output),
        json!({
            "name": "Test Form",
            "description": "A form used for testing",
            "id": "42-form",
            "lid": "b9037e4a-ba86-4e0d-960c-c793baeee678",
            "interesting": "tetris",
            "treasure": "gold",
            "other": "other",
            "odd": "z-o-r-p",
            "methody": "method_keys",
            "author": {"name": "harold", "lid": "a4217889-4997-456c-99ce-cda87a1b5448"},
            "owner": {"id": "42"},
            "environments": [
                {"name": "staging", "id": "1"},
                {"name": "production", "id": "2"}
            ],
            "versions": [{"name": "initial-commit", "id": "3"}]
        })
    );
}

#[test]
fn keeps_declaration_order() {
    let registry = registry();
    let output = JsonDeserializer::new(&request(), registry.get("form").unwrap(), ParseOptions::default())
        .parse_map()
        .unwrap();

    let keys: Vec<&str> = output.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "name",
            "description",
            "id",
            "lid",
            "interesting",
            "treasure",
            "other",
            "odd",
            "methody",
            "author",
            "owner",
            "environments",
            "versions",
        ]
    );
}

#[test]
fn condition_admits_admins() {
    let registry = registry();
    let mut request = request();
    request["isAdmin"] = json!(true);

    let output = JsonDeserializer::new(&request, registry.get("form").unwrap(), ParseOptions::default())
        .parse_map()
        .unwrap();
    assert_eq!(output["audit"], "should not appear");
}
