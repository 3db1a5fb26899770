//! Mock server.
//!
//! - [`registry`]: compiles endpoint specs into a [`RouteTable`]
//! - [`renderer`]: condition selection and `{param}` rendering
//! - [`server`]: hyper listener dispatching every request through the table

pub mod registry;
pub mod renderer;
pub mod server;

pub use registry::{CompiledCondition, Route, RouteMatch, RouteTable};
pub use renderer::{render, RenderedResponse};
pub use server::{MockServer, ServerConfig, ServerError};
