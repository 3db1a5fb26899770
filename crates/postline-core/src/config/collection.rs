//! Collection document format.
//!
//! Documents are deserialized as written and then validated into the domain
//! [`Collection`], so shape problems (bad method, bad base URL, wrong body
//! type) surface as [`ValidationError`] rather than parse errors.

use crate::error::ValidationError;
use crate::types::collection::{validate_base_url, Collection};
use crate::types::request::{AssertionSet, Body, RequestDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Collection file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub collection_name: String,
    pub base_url: String,
    pub requests: Vec<RequestDocument>,
}

/// Request entry of a collection file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDocument {
    pub name: String,
    pub method: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<HashMap<String, String>>,
    /// Object (sent as JSON) or string (sent as text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<AssertionSet>,
}

impl TryFrom<RequestDocument> for RequestDefinition {
    type Error = ValidationError;

    fn try_from(doc: RequestDocument) -> Result<Self, Self::Error> {
        let method = doc.method.parse()?;
        let body = Body::try_from(doc.body.unwrap_or(Value::Null)).map_err(|_| {
            ValidationError::InvalidBody {
                request: doc.name.clone(),
            }
        })?;

        Ok(RequestDefinition {
            name: doc.name,
            method,
            endpoint: doc.endpoint,
            headers: doc.headers.unwrap_or_default(),
            query_params: doc.query_params.unwrap_or_default(),
            body,
            tests: doc.tests,
        })
    }
}

impl TryFrom<CollectionDocument> for Collection {
    type Error = ValidationError;

    fn try_from(doc: CollectionDocument) -> Result<Self, Self::Error> {
        validate_base_url(&doc.base_url)?;
        let requests = doc
            .requests
            .into_iter()
            .map(RequestDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Collection {
            name: doc.collection_name,
            base_url: doc.base_url,
            requests,
        })
    }
}
