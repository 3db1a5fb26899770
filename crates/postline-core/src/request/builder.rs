//! Outbound request composition.

use crate::template::{placeholder_names, substitute, substitute_map, substitute_value};
use crate::types::collection::VariableMap;
use crate::types::request::{Body, HttpMethod, RequestDefinition};
use std::collections::BTreeMap;

/// A fully resolved request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Body,
}

/// Join a base URL and an endpoint, dropping trailing slashes from the base.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), endpoint)
}

/// Build the request for `definition`.
///
/// Headers, query parameters and the body are substituted; the endpoint is
/// used as written. Pure: the same inputs always give the same request.
pub fn build_request(
    definition: &RequestDefinition,
    variables: &VariableMap,
    base_url: &str,
) -> PreparedRequest {
    let body = match &definition.body {
        Body::Empty => Body::Empty,
        Body::Raw(text) => Body::Raw(substitute(text, variables)),
        Body::Json(map) => {
            let substituted = map
                .iter()
                .map(|(key, value)| (key.clone(), substitute_value(value, variables)))
                .collect();
            Body::Json(substituted)
        }
    };

    let prepared = PreparedRequest {
        method: definition.method,
        url: join_url(base_url, &definition.endpoint),
        headers: substitute_map(&definition.headers, variables),
        query: substitute_map(&definition.query_params, variables),
        body,
    };

    tracing::debug!(
        request = %definition.name,
        method = %prepared.method,
        url = %prepared.url,
        headers = prepared.headers.len(),
        query = prepared.query.len(),
        "Built request"
    );

    let raw_body = match &prepared.body {
        Body::Raw(text) => Some(text),
        _ => None,
    };
    let unresolved: Vec<&str> = prepared
        .headers
        .values()
        .chain(prepared.query.values())
        .chain(raw_body)
        .flat_map(|text| placeholder_names(text))
        .collect();
    if !unresolved.is_empty() {
        tracing::warn!(
            request = %definition.name,
            variables = ?unresolved,
            "Request has unresolved variables"
        );
    }

    prepared
}
