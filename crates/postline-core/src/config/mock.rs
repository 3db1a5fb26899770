//! Mock server document format.

use crate::error::ValidationError;
use crate::matching::PathTemplate;
use crate::types::endpoint::{Condition, EndpointSpec, MockConfig};
use crate::types::request::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mock configuration file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfigDocument {
    pub endpoints: Vec<EndpointDocument>,
}

/// Endpoint entry of a mock configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDocument {
    /// Path template (supports {param} placeholders)
    pub path: String,
    /// HTTP method, case-insensitive
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "empty_object")]
    pub response: Value,
    #[serde(default = "default_status")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionDocument>,
}

/// Conditional response of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDocument {
    /// Predicate over path parameters
    pub when: String,
    #[serde(default = "empty_object")]
    pub response: Value,
    #[serde(default = "default_status")]
    pub status_code: u16,
}

fn default_method() -> String {
    HttpMethod::Get.to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn default_status() -> u16 {
    200
}

fn validate_status(code: u16) -> Result<u16, ValidationError> {
    if (100..=599).contains(&code) {
        Ok(code)
    } else {
        Err(ValidationError::InvalidStatusCode { code })
    }
}

impl TryFrom<ConditionDocument> for Condition {
    type Error = ValidationError;

    fn try_from(doc: ConditionDocument) -> Result<Self, Self::Error> {
        Ok(Condition {
            when: doc.when,
            response: doc.response,
            status_code: validate_status(doc.status_code)?,
        })
    }
}

impl TryFrom<EndpointDocument> for EndpointSpec {
    type Error = ValidationError;

    fn try_from(doc: EndpointDocument) -> Result<Self, Self::Error> {
        PathTemplate::parse(&doc.path)?;
        let conditions = doc
            .conditions
            .into_iter()
            .map(Condition::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EndpointSpec {
            path: doc.path,
            method: HttpMethod::parse_lenient(&doc.method)?,
            response: doc.response,
            status_code: validate_status(doc.status_code)?,
            conditions,
        })
    }
}

impl TryFrom<MockConfigDocument> for MockConfig {
    type Error = ValidationError;

    fn try_from(doc: MockConfigDocument) -> Result<Self, Self::Error> {
        let endpoints = doc
            .endpoints
            .into_iter()
            .map(EndpointSpec::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MockConfig { endpoints })
    }
}

impl From<&MockConfig> for MockConfigDocument {
    fn from(config: &MockConfig) -> Self {
        let endpoints = config
            .endpoints
            .iter()
            .map(|endpoint| EndpointDocument {
                path: endpoint.path.clone(),
                method: endpoint.method.to_string(),
                response: endpoint.response.clone(),
                status_code: endpoint.status_code,
                conditions: endpoint
                    .conditions
                    .iter()
                    .map(|condition| ConditionDocument {
                        when: condition.when.clone(),
                        response: condition.response.clone(),
                        status_code: condition.status_code,
                    })
                    .collect(),
            })
            .collect();
        MockConfigDocument { endpoints }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_yaml;
    use rstest::rstest;
    use serde_json::json;

    const MOCK_YAML: &str = r#"
endpoints:
  - path: /api/v1/health
    response:
      status: healthy
  - path: /users/{id}
    method: get
    response:
      id: "{id}"
    conditions:
      - when: id == "1"
        response:
          special: true
      - when: '{id} == "404"'
        response:
          error: missing
        status_code: 404
  - path: /users
    method: POST
    response:
      message: created
    status_code: 201
"#;

    #[rstest]
    fn test_mock_document_defaults() {
        let doc: MockConfigDocument = parse_yaml(MOCK_YAML).unwrap();
        let config = MockConfig::try_from(doc).unwrap();
        assert_eq!(config.endpoints.len(), 3);

        let health = &config.endpoints[0];
        assert_eq!(health.method, HttpMethod::Get);
        assert_eq!(health.status_code, 200);
        assert!(health.conditions.is_empty());

        let user = &config.endpoints[1];
        assert_eq!(user.method, HttpMethod::Get);
        assert_eq!(user.response, json!({"id": "{id}"}));
        assert_eq!(user.conditions.len(), 2);
        assert_eq!(user.conditions[0].when, "id == \"1\"");
        assert_eq!(user.conditions[0].status_code, 200);
        assert_eq!(user.conditions[1].status_code, 404);

        let create = &config.endpoints[2];
        assert_eq!(create.method, HttpMethod::Post);
        assert_eq!(create.status_code, 201);
    }

    #[rstest]
    fn test_endpoint_document_missing_response_defaults_to_empty_object() {
        let doc: EndpointDocument = parse_yaml("path: /ping").unwrap();
        assert_eq!(doc.response, json!({}));
        assert_eq!(doc.method, "GET");
    }

    fn endpoint_doc(path: &str, method: &str, status_code: u16) -> EndpointDocument {
        EndpointDocument {
            path: path.to_string(),
            method: method.to_string(),
            response: json!({}),
            status_code,
            conditions: vec![],
        }
    }

    #[rstest]
    #[case(endpoint_doc("/ok", "TRACE", 200))]
    #[case(endpoint_doc("no-slash", "GET", 200))]
    #[case(endpoint_doc("/users/{}", "GET", 200))]
    #[case(endpoint_doc("/ok", "GET", 42))]
    #[case(endpoint_doc("/ok", "GET", 600))]
    fn test_endpoint_document_validation(#[case] doc: EndpointDocument) {
        assert!(EndpointSpec::try_from(doc).is_err());
    }

    #[rstest]
    fn test_condition_document_status_validation() {
        let doc = ConditionDocument {
            when: "true".to_string(),
            response: json!({}),
            status_code: 1000,
        };
        assert_eq!(
            Condition::try_from(doc).unwrap_err(),
            ValidationError::InvalidStatusCode { code: 1000 }
        );
    }

    #[rstest]
    fn test_mock_config_document_roundtrip() {
        let doc: MockConfigDocument = parse_yaml(MOCK_YAML).unwrap();
        let config = MockConfig::try_from(doc).unwrap();

        let yaml = serde_yaml::to_string(&MockConfigDocument::from(&config)).unwrap();
        let reparsed: MockConfigDocument = parse_yaml(&yaml).unwrap();
        assert_eq!(MockConfig::try_from(reparsed).unwrap(), config);
    }
}
