//! `{{variable}}` placeholder substitution.
//!
//! Unknown placeholders are left verbatim so partially filled environments
//! still produce a request. Substitution is a single pass: a value that itself
//! contains `{{...}}` is inserted as-is and not expanded again.

use crate::types::collection::VariableMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex"));

/// Replace every known `{{name}}` in `text` with its value.
pub fn substitute(text: &str, variables: &VariableMap) -> String {
    if variables.is_empty() || !text.contains("{{") {
        return text.to_owned();
    }

    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Substitute inside every string of a JSON value.
///
/// Object keys are kept as written; numbers, booleans and null pass through.
pub fn substitute_value(value: &Value, variables: &VariableMap) -> Value {
    match value {
        Value::String(text) => Value::String(substitute(text, variables)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, variables))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), substitute_value(item, variables)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Substitute the values of a string map, producing an ordered copy.
pub fn substitute_map(
    map: &HashMap<String, String>,
    variables: &VariableMap,
) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| (key.clone(), substitute(value, variables)))
        .collect()
}

/// Names of the `{{...}}` placeholders still present in `text`.
pub fn placeholder_names(text: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> VariableMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("Bearer {{token}}", "Bearer abc123")]
    #[case("{{host}}/{{token}}", "example.com/abc123")]
    #[case("{{token}}{{token}}", "abc123abc123")]
    #[case("no placeholders", "no placeholders")]
    #[case("", "")]
    fn test_substitute_known(#[case] input: &str, #[case] expected: &str) {
        let variables = vars(&[("token", "abc123"), ("host", "example.com")]);
        let result = substitute(input, &variables);
        assert_eq!(result, expected);
        assert_eq!(placeholder_names(&result).count(), 0);
    }

    #[rstest]
    #[case("{{missing}}")]
    #[case("id={{missing}}&t={{token}}")]
    #[case("{{ token }}")]
    fn test_substitute_unknown_left_verbatim(#[case] input: &str) {
        let variables = vars(&[("token", "abc123")]);
        let once = substitute(input, &variables);
        let twice = substitute(&once, &variables);
        assert_eq!(once, twice);
        assert!(placeholder_names(&once).all(|name| name != "token"));
    }

    #[rstest]
    fn test_substitute_partial_environment() {
        let variables = vars(&[("user", "42")]);
        assert_eq!(
            substitute("/users/{{user}}/posts/{{post}}", &variables),
            "/users/42/posts/{{post}}"
        );
    }

    #[rstest]
    fn test_substitute_does_not_expand_values() {
        let variables = vars(&[("a", "{{b}}"), ("b", "never")]);
        assert_eq!(substitute("{{a}}", &variables), "{{b}}");
    }

    #[rstest]
    fn test_substitute_empty_variables() {
        assert_eq!(substitute("{{token}}", &VariableMap::new()), "{{token}}");
    }

    #[rstest]
    fn test_substitute_value_nested() {
        let variables = vars(&[("name", "Ada"), ("key", "renamed")]);
        let input = json!({
            "{{key}}": "{{name}}",
            "count": 3,
            "active": true,
            "nothing": null,
            "tags": ["{{name}}", 1],
            "profile": {"display": "Hi {{name}}"}
        });
        let expected = json!({
            "{{key}}": "Ada",
            "count": 3,
            "active": true,
            "nothing": null,
            "tags": ["Ada", 1],
            "profile": {"display": "Hi Ada"}
        });
        assert_eq!(substitute_value(&input, &variables), expected);
    }

    #[rstest]
    fn test_substitute_map_orders_keys() {
        let variables = vars(&[("token", "t")]);
        let mut headers = HashMap::new();
        headers.insert("X-B".to_string(), "{{token}}".to_string());
        headers.insert("X-A".to_string(), "plain".to_string());

        let result = substitute_map(&headers, &variables);
        let keys: Vec<&str> = result.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["X-A", "X-B"]);
        assert_eq!(result["X-B"], "t");
    }

    #[rstest]
    #[case("{{a}} and {{b}}", vec!["a", "b"])]
    #[case("{single}", vec![])]
    #[case("{{{a}}}", vec!["a"])]
    fn test_placeholder_names(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(placeholder_names(input).collect::<Vec<_>>(), expected);
    }
}
