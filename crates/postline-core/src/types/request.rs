//! Request definition types.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP method for collection requests and mock endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Parse a method name ignoring ASCII case.
    ///
    /// Mock documents accept `get` as well as `GET`; collection documents go
    /// through the strict [`FromStr`] impl instead.
    pub fn parse_lenient(name: &str) -> Result<Self, ValidationError> {
        name.trim().to_ascii_uppercase().parse()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedMethod {
                method: s.to_string(),
            })
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Request body.
///
/// A structured body is sent JSON-encoded, a raw body is sent as text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Map<String, Value>),
    Raw(String),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Document form of the body (`null`, an object, or a string).
    pub fn to_value(&self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Json(map) => Value::Object(map.clone()),
            Body::Raw(text) => Value::String(text.clone()),
        }
    }
}

impl TryFrom<Value> for Body {
    /// The rejected value, so callers can name the offending request.
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Body::Empty),
            Value::Object(map) => Ok(Body::Json(map)),
            Value::String(text) => Ok(Body::Raw(text)),
            other => Err(other),
        }
    }
}

/// Checks to run against a response. Absent checks are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssertionSet {
    /// Expected HTTP status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Substrings that must all appear in the response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<String>>,
    /// Top-level JSON fields and their expected values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_field_equals: Option<Map<String, Value>>,
}

impl AssertionSet {
    pub fn is_empty(&self) -> bool {
        self.status_code.is_none()
            && self.contains.as_ref().map_or(true, Vec::is_empty)
            && self.json_field_equals.as_ref().map_or(true, Map::is_empty)
    }
}

/// A single request of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefinition {
    pub name: String,
    pub method: HttpMethod,
    /// Path appended to the collection base URL
    pub endpoint: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body: Body,
    pub tests: Option<AssertionSet>,
}

impl RequestDefinition {
    pub fn new(name: impl Into<String>, method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            endpoint: endpoint.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            body: Body::Empty,
            tests: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_tests(mut self, tests: AssertionSet) -> Self {
        self.tests = Some(tests);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("GET", HttpMethod::Get)]
    #[case("POST", HttpMethod::Post)]
    #[case("PUT", HttpMethod::Put)]
    #[case("DELETE", HttpMethod::Delete)]
    #[case("PATCH", HttpMethod::Patch)]
    fn test_http_method_from_str(#[case] input: &str, #[case] expected: HttpMethod) {
        assert_eq!(input.parse::<HttpMethod>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("get")]
    #[case("HEAD")]
    #[case("OPTIONS")]
    #[case("")]
    fn test_http_method_from_str_rejects(#[case] input: &str) {
        let err = input.parse::<HttpMethod>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedMethod {
                method: input.to_string()
            }
        );
    }

    #[rstest]
    #[case("get", HttpMethod::Get)]
    #[case(" Post ", HttpMethod::Post)]
    #[case("patch", HttpMethod::Patch)]
    fn test_http_method_parse_lenient(#[case] input: &str, #[case] expected: HttpMethod) {
        assert_eq!(HttpMethod::parse_lenient(input).unwrap(), expected);
    }

    #[rstest]
    fn test_http_method_into_reqwest() {
        let method: reqwest::Method = HttpMethod::Patch.into();
        assert_eq!(method, reqwest::Method::PATCH);
    }

    #[rstest]
    #[case(json!(null), Body::Empty)]
    #[case(json!("raw text"), Body::Raw("raw text".to_string()))]
    #[case(json!({"a": 1}), Body::Json(json!({"a": 1}).as_object().unwrap().clone()))]
    fn test_body_try_from_value(#[case] value: Value, #[case] expected: Body) {
        assert_eq!(Body::try_from(value.clone()).unwrap(), expected);
        assert_eq!(expected.to_value(), value);
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!(42))]
    #[case(json!(true))]
    fn test_body_try_from_value_rejects(#[case] value: Value) {
        assert_eq!(Body::try_from(value.clone()).unwrap_err(), value);
    }

    #[rstest]
    fn test_assertion_set_is_empty() {
        assert!(AssertionSet::default().is_empty());
        assert!(AssertionSet {
            contains: Some(vec![]),
            ..Default::default()
        }
        .is_empty());
        assert!(!AssertionSet {
            status_code: Some(200),
            ..Default::default()
        }
        .is_empty());
    }

    #[rstest]
    fn test_assertion_set_deserialize_partial() {
        let set: AssertionSet = serde_yaml::from_str("contains:\n  - ok\n").unwrap();
        assert_eq!(set.status_code, None);
        assert_eq!(set.contains, Some(vec!["ok".to_string()]));
        assert_eq!(set.json_field_equals, None);
    }
}
