//! Mock endpoint types.

use crate::types::request::HttpMethod;
use serde_json::Value;

/// Mock server configuration: the endpoints to serve, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockConfig {
    pub endpoints: Vec<EndpointSpec>,
}

/// A mocked endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSpec {
    /// Path template (supports `{param}` segments)
    pub path: String,
    pub method: HttpMethod,
    /// Default response body, rendered with path parameters
    pub response: Value,
    /// Default status code
    pub status_code: u16,
    /// Conditions evaluated in declaration order before falling back to the default
    pub conditions: Vec<Condition>,
}

/// Alternative response chosen when `when` evaluates to true.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Predicate over path parameters, e.g. `id == "1"`
    pub when: String,
    pub response: Value,
    pub status_code: u16,
}

impl EndpointSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>, response: Value) -> Self {
        Self {
            path: path.into(),
            method,
            response,
            status_code: 200,
            conditions: Vec::new(),
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_condition(
        mut self,
        when: impl Into<String>,
        response: Value,
        status_code: u16,
    ) -> Self {
        self.conditions.push(Condition {
            when: when.into(),
            response,
            status_code,
        });
        self
    }
}
