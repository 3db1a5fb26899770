//! Request path matching.

mod path;

pub use path::{PathParams, PathTemplate};
