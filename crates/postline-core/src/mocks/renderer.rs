//! Response selection and `{param}` rendering.

use crate::matching::PathParams;
use crate::mocks::registry::Route;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid regex"));

/// Status code and body chosen for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    pub status_code: u16,
    pub body: Value,
}

/// Pick the response for a matched route.
///
/// Conditions are tried in declaration order and the first one that holds
/// wins; otherwise the route's default response is used.
pub fn render(route: &Route, params: &PathParams) -> RenderedResponse {
    let chosen = route
        .conditions
        .iter()
        .find(|condition| condition.matches(params));

    let (template, status_code) = match chosen {
        Some(condition) => {
            tracing::debug!(
                path = %route.template.as_str(),
                condition = %condition.source,
                "Condition matched"
            );
            (&condition.response, condition.status_code)
        }
        None => (&route.response, route.status_code),
    };

    RenderedResponse {
        status_code,
        body: render_template(template, params),
    }
}

/// Replace `{name}` with the matching parameter value; unknown names stay as written.
pub fn render_text(text: &str, params: &PathParams) -> String {
    if params.is_empty() || !text.contains('{') {
        return text.to_owned();
    }

    PARAM
        .replace_all(text, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Render every string of a response template, object keys included.
pub fn render_template(value: &Value, params: &PathParams) -> Value {
    match value {
        Value::String(text) => Value::String(render_text(text, params)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_template(item, params))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (render_text(key, params), render_template(item, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}
