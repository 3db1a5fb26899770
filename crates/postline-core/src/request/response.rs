//! Received responses.

use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// A response read in full.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedResponse {
    pub status: u16,
    /// Header names are lowercase; non-UTF-8 values are replaced lossily
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// From just before sending until the body was read
    pub elapsed: Duration,
}

impl ExecutedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as JSON, if it is valid JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn response(status: u16, body: &str) -> ExecutedResponse {
        ExecutedResponse {
            status,
            headers: BTreeMap::new(),
            body: body.to_string(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(301, false)]
    #[case(500, false)]
    fn test_is_success(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(response(status, "").is_success(), expected);
    }

    #[rstest]
    fn test_json() {
        assert_eq!(response(200, r#"{"a": 1}"#).json(), Some(json!({"a": 1})));
        assert_eq!(response(200, "not json").json(), None);
    }
}
