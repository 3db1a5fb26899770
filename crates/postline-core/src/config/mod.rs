//! Configuration documents and loading.
//!
//! - [`parser`]: YAML/JSON/JSONC parsing by file type
//! - [`collection`] / [`mock`]: document formats and their validation into domain types
//! - [`environment`]: `KEY=VALUE` environment files
//! - [`loader`]: filesystem entry points

pub mod collection;
pub mod environment;
pub mod error;
pub mod loader;
pub mod mock;
pub mod parser;

pub use error::ConfigError;
pub use loader::{
    default_mock_config, load_collection, load_environment, load_mock_config, save_mock_config,
    write_default_mock_config,
};
