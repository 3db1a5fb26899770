//! Execution history records.

use crate::types::request::HttpMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one completed HTTP call.
///
/// Only created for responses actually received; entries are never mutated
/// after being appended to a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub method: HttpMethod,
    /// Endpoint as written in the request definition (before the base URL is joined)
    pub endpoint: String,
    /// When the request was sent
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
    /// Wall-clock duration in seconds, including reading the body
    pub response_time: f64,
}

impl HistoryEntry {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
