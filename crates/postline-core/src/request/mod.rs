//! Request execution.
//!
//! - [`builder`]: turns a definition plus variables into a [`PreparedRequest`]
//! - [`executor`]: sends requests, records history and runs whole collections
//! - [`assertions`]: checks a response against a request's tests

pub mod assertions;
pub mod builder;
pub mod executor;
pub mod response;

pub use builder::{build_request, PreparedRequest};
pub use executor::{Executor, ExecutorConfig, RequestOutcome, RequestReport, RunReport};
pub use response::ExecutedResponse;
