//! Value lookup for a single rule

use crate::error::Result;
use crate::schema::{RuleOptions, Schema};
use serde_json::Value;

/// Find the raw value for `key` in `container`.
///
/// An inline resolver wins over a named one, and either replaces the
/// default key lookup. Missing and `null` values both come back as `None`.
pub fn find_attribute(
    schema: &Schema,
    container: Option<&Value>,
    key: &str,
    options: &RuleOptions,
) -> Result<Option<Value>> {
    let Some(container) = container else {
        return Ok(None);
    };

    let value = if let Some(with) = &options.with {
        with(container, key, options)
    } else if let Some(name) = &options.resolve_with {
        let resolver = schema.resolver(name)?;
        resolver(container, key, options)
    } else {
        find_by_key(container, key, options).cloned()
    };

    Ok(value.filter(|v| !v.is_null()))
}

/// Default lookup honoring `prefix`, `key` and `namespace`
pub fn find_by_key<'a>(container: &'a Value, key: &str, options: &RuleOptions) -> Option<&'a Value> {
    let source_key = options.source_key(key);

    let scope = match &options.namespace {
        Some(path) => path.iter().try_fold(container, |current, segment| current.get(segment))?,
        None => container,
    };

    scope.get(&source_key)
}

/// Whether a rule's `when`/`unless` gates let it run against `input`
pub fn should_apply(schema: &Schema, options: &RuleOptions, input: &Value) -> Result<bool> {
    if let Some(condition) = &options.when {
        if !condition.evaluate(schema, input)? {
            return Ok(false);
        }
    }
    if let Some(condition) = &options.unless {
        if condition.evaluate(schema, input)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeserializeError;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::builder("test")
            .define_resolver("shout", |input, key, _| {
                input.get(key).and_then(Value::as_str).map(|s| json!(s.to_uppercase()))
            })
            .define_condition("has_name", |input| input.get("name").is_some())
            .build()
    }

    #[test]
    fn test_plain_and_renamed_lookup() {
        let schema = schema();
        let input = json!({"name": "Test Form", "local:id": "abc"});

        let found = find_attribute(&schema, Some(&input), "name", &RuleOptions::new()).unwrap();
        assert_eq!(found, Some(json!("Test Form")));

        let renamed = find_attribute(&schema, Some(&input), "lid", &RuleOptions::new().key("local:id")).unwrap();
        assert_eq!(renamed, Some(json!("abc")));
    }

    #[test]
    fn test_prefix_and_namespace() {
        let schema = schema();
        let input = json!({
            "prefixed_interesting": "tetris",
            "deep": {"namespaced": {"treasure": "gold"}}
        });

        let prefixed = RuleOptions::new().prefix("prefixed_");
        assert_eq!(
            find_attribute(&schema, Some(&input), "interesting", &prefixed).unwrap(),
            Some(json!("tetris"))
        );

        let namespaced = RuleOptions::new().namespace(["deep", "namespaced"]);
        assert_eq!(
            find_attribute(&schema, Some(&input), "treasure", &namespaced).unwrap(),
            Some(json!("gold"))
        );

        let broken_path = RuleOptions::new().namespace(["deep", "missing"]);
        assert_eq!(find_attribute(&schema, Some(&input), "treasure", &broken_path).unwrap(), None);
    }

    #[test]
    fn test_null_and_missing_are_absent_but_false_is_not() {
        let schema = schema();
        let input = json!({"empty": null, "flag": false, "count": 0, "text": ""});
        let options = RuleOptions::new();

        assert_eq!(find_attribute(&schema, Some(&input), "missing", &options).unwrap(), None);
        assert_eq!(find_attribute(&schema, Some(&input), "empty", &options).unwrap(), None);
        assert_eq!(find_attribute(&schema, Some(&input), "flag", &options).unwrap(), Some(json!(false)));
        assert_eq!(find_attribute(&schema, Some(&input), "count", &options).unwrap(), Some(json!(0)));
        assert_eq!(find_attribute(&schema, Some(&input), "text", &options).unwrap(), Some(json!("")));
        assert_eq!(find_attribute(&schema, None, "flag", &options).unwrap(), None);
    }

    #[test]
    fn test_resolver_precedence() {
        let schema = schema();
        let input = json!({"name": "quiet"});

        let named = RuleOptions::new().resolve_with("shout");
        assert_eq!(find_attribute(&schema, Some(&input), "name", &named).unwrap(), Some(json!("QUIET")));

        let inline = RuleOptions::new()
            .resolve_with("shout")
            .with(|_, key, _| Some(json!(format!("inline {}", key))));
        assert_eq!(
            find_attribute(&schema, Some(&input), "name", &inline).unwrap(),
            Some(json!("inline name"))
        );

        let unknown = RuleOptions::new().resolve_with("whisper");
        assert!(matches!(
            find_attribute(&schema, Some(&input), "name", &unknown),
            Err(DeserializeError::UnknownResolver { .. })
        ));
    }

    #[test]
    fn test_conditions() {
        let schema = schema();
        let named = json!({"name": "x"});
        let unnamed = json!({});

        let when = RuleOptions::new().when_named("has_name");
        assert!(should_apply(&schema, &when, &named).unwrap());
        assert!(!should_apply(&schema, &when, &unnamed).unwrap());

        let unless = RuleOptions::new().unless(|input| input.get("name").is_some());
        assert!(!should_apply(&schema, &unless, &named).unwrap());
        assert!(should_apply(&schema, &unless, &unnamed).unwrap());

        assert!(should_apply(&schema, &RuleOptions::new(), &unnamed).unwrap());
    }
}
