//! Collection types.

use crate::error::ValidationError;
use crate::types::request::RequestDefinition;
use std::collections::HashMap;

/// Flat variable map used for `{{name}}` substitution.
pub type VariableMap = HashMap<String, String>;

/// Ordered set of requests sharing a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    /// Display name of the collection
    pub name: String,
    /// Absolute `http`/`https` URL every endpoint is appended to
    pub base_url: String,
    pub requests: Vec<RequestDefinition>,
}

impl Collection {
    /// Create a collection, validating the base URL.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        requests: Vec<RequestDefinition>,
    ) -> Result<Self, ValidationError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        Ok(Self {
            name: name.into(),
            base_url,
            requests,
        })
    }

    /// Requests selected by an optional name filter.
    ///
    /// Names are not unique, so every request with a matching name is
    /// returned in collection order.
    pub fn select<'a>(&'a self, name: Option<&str>) -> Vec<&'a RequestDefinition> {
        self.requests
            .iter()
            .filter(|request| name.map_or(true, |name| request.name == name))
            .collect()
    }
}

/// Check that `url` is an absolute `http` or `https` URL with a host.
pub fn validate_base_url(url: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidBaseUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = url::Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}
