//! HTTP server for mock endpoints.

use crate::mocks::registry::RouteTable;
use crate::mocks::renderer::{render, RenderedResponse};
use crate::types::request::HttpMethod;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Errors that stop the mock server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind mock server to {address}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Pause before accepting again after the listener runs out of resources.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Listening address of the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, resolved when binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5000,
        }
    }
}

/// Serves a [`RouteTable`] over HTTP/1.1.
///
/// The table is shared read-only between connections.
pub struct MockServer {
    config: ServerConfig,
    routes: Arc<RouteTable>,
}

impl MockServer {
    pub fn new(config: ServerConfig, routes: RouteTable) -> Self {
        Self {
            config,
            routes: Arc::new(routes),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.address();
        TcpListener::bind(address.as_str())
            .await
            .map_err(|source| ServerError::Bind { address, source })
    }

    /// Bind the configured address and serve until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        let local = listener.local_addr().ok();
        tracing::info!(
            address = %local.map_or_else(|| self.config.address(), |addr| addr.to_string()),
            endpoints = self.routes.len(),
            "Mock server started"
        );

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => self.spawn_connection(stream, remote_addr),
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to accept connection");
                        if let Some(pause) = accept_backoff(&err) {
                            tokio::time::sleep(pause).await;
                        }
                    }
                },
                _ = shutdown.cancelled() => {
                    tracing::info!("Mock server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, remote_addr: SocketAddr) {
        let io = TokioIo::new(stream);
        let routes = Arc::clone(&self.routes);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let routes = Arc::clone(&routes);
                async move { handle(req, &routes) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                if !e.is_incomplete_message() {
                    tracing::warn!(remote = %remote_addr, error = %e, "HTTP connection error");
                }
            }
        });
    }
}

/// How long to wait after a failed `accept`.
///
/// Errors tied to a single peer are skipped at once; anything else, such as
/// running out of file descriptors, waits [`ACCEPT_BACKOFF`].
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

fn handle(
    req: Request<Incoming>,
    routes: &RouteTable,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().as_str();
    let path = req.uri().path();
    let rendered = dispatch(routes, method, path);

    tracing::debug!(
        method = %method,
        path = %path,
        status = rendered.status_code,
        "Mock request"
    );
    Ok(json_response(&rendered))
}

/// Resolve one request against the table; unmatched requests get a 404 body.
pub fn dispatch(routes: &RouteTable, method: &str, path: &str) -> RenderedResponse {
    let found = method
        .parse::<HttpMethod>()
        .ok()
        .and_then(|method| routes.find(method, path));

    match found {
        Some(found) => render(found.route, &found.params),
        None => RenderedResponse {
            status_code: StatusCode::NOT_FOUND.as_u16(),
            body: json!({
                "error": "Not found",
                "method": method,
                "path": path,
            }),
        },
    }
}

fn json_response(rendered: &RenderedResponse) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(&rendered.body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() =
        StatusCode::from_u16(rendered.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
