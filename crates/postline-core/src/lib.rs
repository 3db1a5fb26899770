//! Core library for postline: collection execution with assertions, and a
//! configurable mock HTTP server.

pub mod config;
pub mod error;
pub mod expression;
pub mod matching;
pub mod mocks;
pub mod request;
pub mod template;
pub mod types;

pub use error::{Error, ErrorKind, ExecutionError, Result, ValidationError};
pub use mocks::{MockServer, RouteTable, ServerConfig};
pub use request::{Executor, ExecutorConfig, RunReport};
pub use types::collection::{Collection, VariableMap};
pub use types::endpoint::MockConfig;
pub use types::history::HistoryEntry;
pub use types::request::{AssertionSet, Body, HttpMethod, RequestDefinition};
