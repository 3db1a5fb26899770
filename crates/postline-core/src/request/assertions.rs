//! Response assertions.

use crate::request::response::ExecutedResponse;
use crate::types::request::AssertionSet;
use serde_json::Value;
use std::collections::BTreeMap;

pub const STATUS_CODE: &str = "status_code";
pub const CONTAINS: &str = "contains";
pub const JSON_FIELD_EQUALS: &str = "json_field_equals";

/// Result of each check that was requested, keyed by check name.
pub type AssertionResults = BTreeMap<String, bool>;

/// Run every present check of `assertions` against `response`.
///
/// Checks are independent: a body that is not JSON only fails
/// `json_field_equals`. Empty `contains` lists and empty
/// `json_field_equals` maps are treated as absent.
pub fn evaluate(response: &ExecutedResponse, assertions: &AssertionSet) -> AssertionResults {
    let mut results = AssertionResults::new();

    if let Some(expected) = assertions.status_code {
        results.insert(STATUS_CODE.to_string(), response.status == expected);
    }

    if let Some(needles) = assertions.contains.as_ref().filter(|n| !n.is_empty()) {
        let passed = needles
            .iter()
            .all(|needle| response.body.contains(needle.as_str()));
        results.insert(CONTAINS.to_string(), passed);
    }

    if let Some(fields) = assertions
        .json_field_equals
        .as_ref()
        .filter(|f| !f.is_empty())
    {
        let passed = match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(actual)) => fields.iter().all(|(key, expected)| {
                actual
                    .get(key)
                    .is_some_and(|value| json_equal(expected, value))
            }),
            Ok(_) => false,
            Err(err) => {
                tracing::debug!(error = %err, "Response body is not JSON");
                false
            }
        };
        results.insert(JSON_FIELD_EQUALS.to_string(), passed);
    }

    results
}

/// Structural equality where numbers compare by value, so `2` equals `2.0`.
fn json_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, a)| b.get(key).is_some_and(|b| json_equal(a, b)))
        }
        _ => expected == actual,
    }
}

/// True when every check passed (vacuously true for no checks).
pub fn all_passed(results: &AssertionResults) -> bool {
    results.values().all(|passed| *passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Map};
    use std::time::Duration;

    fn response(status: u16, body: &str) -> ExecutedResponse {
        ExecutedResponse {
            status,
            headers: BTreeMap::new(),
            body: body.to_string(),
            elapsed: Duration::ZERO,
        }
    }

    fn fields(value: Value) -> Option<Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[rstest]
    #[case(404, false)]
    #[case(200, true)]
    fn test_status_code(#[case] status: u16, #[case] expected: bool) {
        let assertions = AssertionSet {
            status_code: Some(200),
            ..AssertionSet::default()
        };
        let results = evaluate(&response(status, ""), &assertions);
        assert_eq!(results, AssertionResults::from([(STATUS_CODE.to_string(), expected)]));
    }

    #[rstest]
    #[case("foobarbaz", true)]
    #[case("foobaz", false)]
    fn test_contains(#[case] body: &str, #[case] expected: bool) {
        let assertions = AssertionSet {
            contains: Some(vec!["foo".to_string(), "bar".to_string()]),
            ..AssertionSet::default()
        };
        let results = evaluate(&response(200, body), &assertions);
        assert_eq!(results[CONTAINS], expected);
        assert_eq!(results.len(), 1);
    }

    #[rstest]
    #[case(r#"{"status": "ok", "count": 2, "extra": null}"#, true)]
    #[case(r#"{"status": "ok", "count": 2.0}"#, true)]
    #[case(r#"{"status": "ok", "count": 2.5}"#, false)]
    #[case(r#"{"status": "ok", "count": "2"}"#, false)]
    #[case(r#"{"status": "ok"}"#, false)]
    #[case(r#"["status", "ok"]"#, false)]
    #[case("<html>status ok</html>", false)]
    fn test_json_field_equals(#[case] body: &str, #[case] expected: bool) {
        let assertions = AssertionSet {
            json_field_equals: fields(json!({"status": "ok", "count": 2})),
            ..AssertionSet::default()
        };
        assert_eq!(evaluate(&response(200, body), &assertions)[JSON_FIELD_EQUALS], expected);
    }

    #[rstest]
    #[case(json!({"a": [1, {"b": 2}]}), json!({"a": [1.0, {"b": 2.0}]}), true)]
    #[case(json!({"a": [1, 2]}), json!({"a": [1, 2, 3]}), false)]
    #[case(json!({"a": {"b": 1}}), json!({"a": {"b": 1, "c": 2}}), false)]
    #[case(json!({"a": null}), json!({"a": null}), true)]
    #[case(json!({"a": 1}), json!({"a": true}), false)]
    fn test_json_field_equals_nested(
        #[case] expected: Value,
        #[case] body: Value,
        #[case] passed: bool,
    ) {
        let assertions = AssertionSet {
            json_field_equals: fields(expected),
            ..AssertionSet::default()
        };
        let results = evaluate(&response(200, &body.to_string()), &assertions);
        assert_eq!(results[JSON_FIELD_EQUALS], passed);
    }

    #[rstest]
    fn test_checks_are_independent() {
        let assertions = AssertionSet {
            status_code: Some(200),
            contains: Some(vec!["ok".to_string()]),
            json_field_equals: fields(json!({"a": 1})),
        };
        let results = evaluate(&response(200, "ok but not json"), &assertions);
        assert!(results[STATUS_CODE]);
        assert!(results[CONTAINS]);
        assert!(!results[JSON_FIELD_EQUALS]);
        assert!(!all_passed(&results));
    }

    #[rstest]
    fn test_empty_checks_are_skipped() {
        let assertions = AssertionSet {
            status_code: None,
            contains: Some(vec![]),
            json_field_equals: Some(Map::new()),
        };
        let results = evaluate(&response(500, ""), &assertions);
        assert!(results.is_empty());
        assert!(all_passed(&results));
    }
}
