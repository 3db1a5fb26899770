//! Request execution and session history.

use crate::error::ExecutionError;
use crate::request::assertions::{self, AssertionResults};
use crate::request::builder::{build_request, PreparedRequest};
use crate::request::response::ExecutedResponse;
use crate::types::collection::{Collection, VariableMap};
use crate::types::history::HistoryEntry;
use crate::types::request::{Body, HttpMethod, RequestDefinition};
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Per-request timeout, covering connect, send and body read
    pub timeout: Duration,
    pub user_agent: String,
}

impl ExecutorConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("postline/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Outcome of one request in a run.
#[derive(Debug)]
pub enum RequestOutcome {
    Completed {
        response: ExecutedResponse,
        assertions: AssertionResults,
    },
    Failed(ExecutionError),
}

#[derive(Debug)]
pub struct RequestReport {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub outcome: RequestOutcome,
}

impl RequestReport {
    /// Response received and every assertion held.
    pub fn passed(&self) -> bool {
        match &self.outcome {
            RequestOutcome::Completed { assertions, .. } => assertions::all_passed(assertions),
            RequestOutcome::Failed(_) => false,
        }
    }
}

/// Result of running a list of requests.
#[derive(Debug, Default)]
pub struct RunReport {
    pub requests: Vec<RequestReport>,
    /// The run stopped early because it was cancelled
    pub cancelled: bool,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn all_passed(&self) -> bool {
        self.requests.iter().all(RequestReport::passed)
    }

    pub fn failed_count(&self) -> usize {
        self.requests.iter().filter(|r| !r.passed()).count()
    }
}

/// Sends requests against one base URL with one variable map.
///
/// Every response received is appended to the session history; failed
/// calls are not recorded and never retried.
#[derive(Debug)]
pub struct Executor {
    client: reqwest::Client,
    base_url: String,
    variables: VariableMap,
    history: Vec<HistoryEntry>,
}

impl Executor {
    pub fn new(
        base_url: impl Into<String>,
        variables: VariableMap,
        config: &ExecutorConfig,
    ) -> Result<Self, ExecutionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ExecutionError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            variables,
            history: Vec::new(),
        })
    }

    pub fn for_collection(
        collection: &Collection,
        variables: VariableMap,
        config: &ExecutorConfig,
    ) -> Result<Self, ExecutionError> {
        Self::new(collection.base_url.clone(), variables, config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Entries in call order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn prepare(&self, definition: &RequestDefinition) -> PreparedRequest {
        build_request(definition, &self.variables, &self.base_url)
    }

    /// Build and send `definition`.
    pub async fn execute(
        &mut self,
        definition: &RequestDefinition,
    ) -> Result<ExecutedResponse, ExecutionError> {
        let prepared = self.prepare(definition);
        self.send(&prepared, &definition.endpoint).await
    }

    /// Send a prepared request; `endpoint` is what the history records.
    pub async fn send(
        &mut self,
        prepared: &PreparedRequest,
        endpoint: &str,
    ) -> Result<ExecutedResponse, ExecutionError> {
        let mut builder = self
            .client
            .request(prepared.method.into(), prepared.url.as_str());
        if !prepared.query.is_empty() {
            builder = builder.query(&prepared.query);
        }
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &prepared.body {
            Body::Empty => builder,
            Body::Json(map) => builder.json(map),
            Body::Raw(text) => builder.body(text.clone()),
        };

        let timestamp = Utc::now();
        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| ExecutionError::from_send(&prepared.url, e))?;

        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExecutionError::from_body(&prepared.url, e))?;
        let elapsed = started.elapsed();

        tracing::info!(
            method = %prepared.method,
            url = %prepared.url,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        self.history.push(HistoryEntry {
            method: prepared.method,
            endpoint: endpoint.to_string(),
            timestamp,
            status_code: status,
            response_time: elapsed.as_secs_f64(),
        });

        Ok(ExecutedResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            elapsed,
        })
    }

    /// Run `requests` one after another, evaluating each one's assertions
    /// before the next starts.
    ///
    /// A failed request is recorded in the report and the run continues.
    /// `cancel` is checked before every request.
    pub async fn run(
        &mut self,
        requests: &[&RequestDefinition],
        cancel: &CancellationToken,
    ) -> RunReport {
        let mut report = RunReport::default();

        for definition in requests {
            if cancel.is_cancelled() {
                tracing::info!(
                    completed = report.requests.len(),
                    remaining = requests.len() - report.requests.len(),
                    "Run cancelled"
                );
                report.cancelled = true;
                break;
            }

            let prepared = self.prepare(definition);
            let outcome = match self.send(&prepared, &definition.endpoint).await {
                Ok(response) => {
                    let assertions = definition
                        .tests
                        .as_ref()
                        .map(|tests| assertions::evaluate(&response, tests))
                        .unwrap_or_default();
                    RequestOutcome::Completed {
                        response,
                        assertions,
                    }
                }
                Err(err) => {
                    tracing::warn!(request = %definition.name, error = %err, "Request failed");
                    RequestOutcome::Failed(err)
                }
            };

            report.requests.push(RequestReport {
                name: definition.name.clone(),
                method: prepared.method,
                url: prepared.url,
                outcome,
            });
        }

        report
    }

    /// Run the requests of `collection` matching `filter` (all when `None`).
    pub async fn run_collection(
        &mut self,
        collection: &Collection,
        filter: Option<&str>,
        cancel: &CancellationToken,
    ) -> RunReport {
        let selected = collection.select(filter);
        if selected.is_empty() {
            tracing::info!(collection = %collection.name, filter = ?filter, "No requests selected");
        }
        self.run(&selected, cancel).await
    }
}
