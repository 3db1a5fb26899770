//! Loading collections, environments and mock configurations from disk.

use crate::config::collection::CollectionDocument;
use crate::config::environment::parse_environment;
use crate::config::error::ConfigError;
use crate::config::mock::MockConfigDocument;
use crate::config::parser::{parse_config, ConfigFileType};
use crate::types::collection::{Collection, VariableMap};
use crate::types::endpoint::{EndpointSpec, MockConfig};
use crate::types::request::HttpMethod;
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};

/// Read a whole file, mapping a missing file to [`ConfigError::NotFound`].
pub async fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load and validate a collection (YAML, JSON or JSONC; other extensions are read as JSON).
pub async fn load_collection(path: impl AsRef<Path>) -> Result<Collection, ConfigError> {
    let path = path.as_ref();
    let content = read_to_string(path).await?;
    let file_type = ConfigFileType::detect(path).or(ConfigFileType::Json);
    let doc: CollectionDocument = parse_config(&content, file_type, path)?;
    let collection = Collection::try_from(doc)?;

    tracing::debug!(
        path = %path.display(),
        name = %collection.name,
        requests = collection.requests.len(),
        "Loaded collection"
    );
    Ok(collection)
}

/// Load a `KEY=VALUE` environment file.
pub async fn load_environment(path: impl AsRef<Path>) -> Result<VariableMap, ConfigError> {
    let path = path.as_ref();
    let content = read_to_string(path).await?;
    let variables = parse_environment(&content)?;

    tracing::debug!(path = %path.display(), variables = variables.len(), "Loaded environment");
    Ok(variables)
}

/// Load a mock configuration from a file path or a glob pattern.
///
/// With a pattern, every matching file is loaded in sorted path order and
/// their endpoints are concatenated. Unrecognised extensions are read as YAML.
pub async fn load_mock_config(path_or_pattern: &str) -> Result<MockConfig, ConfigError> {
    let mut endpoints = Vec::new();

    for path in resolve_paths(path_or_pattern)? {
        let content = read_to_string(&path).await?;
        let file_type = ConfigFileType::detect(&path).or(ConfigFileType::Yaml);
        let doc: MockConfigDocument = parse_config(&content, file_type, &path)?;
        let config = MockConfig::try_from(doc)?;

        tracing::debug!(
            path = %path.display(),
            endpoints = config.endpoints.len(),
            "Loaded mock configuration"
        );
        endpoints.extend(config.endpoints);
    }

    Ok(MockConfig { endpoints })
}

/// Expand a glob pattern into matching files; plain paths are returned as-is.
pub fn resolve_paths(path_or_pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    if !path_or_pattern.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(path_or_pattern)]);
    }

    let mut paths = Vec::new();
    for entry in glob::glob(path_or_pattern)? {
        let path = entry.map_err(|e| ConfigError::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(ConfigError::NotFound {
            path: PathBuf::from(path_or_pattern),
        });
    }
    paths.sort();
    Ok(paths)
}

/// Write a mock configuration (JSON for `.json`/`.jsonc`, YAML otherwise).
///
/// Missing parent directories are created.
pub async fn save_mock_config(config: &MockConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let doc = MockConfigDocument::from(config);
    let content = match ConfigFileType::detect(path) {
        ConfigFileType::Json | ConfigFileType::Jsonc => serde_json::to_string_pretty(&doc)?,
        _ => serde_yaml::to_string(&doc)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "Saved mock configuration");
    Ok(())
}

/// Starter configuration written by `mock init`.
pub fn default_mock_config() -> MockConfig {
    MockConfig {
        endpoints: vec![
            EndpointSpec::new(
                HttpMethod::Get,
                "/api/v1/health",
                json!({"status": "healthy", "version": "1.0.0"}),
            ),
            EndpointSpec::new(
                HttpMethod::Get,
                "/api/v1/users",
                json!({
                    "users": [
                        {"id": 1, "name": "John Doe"},
                        {"id": 2, "name": "Jane Smith"}
                    ]
                }),
            ),
            EndpointSpec::new(
                HttpMethod::Post,
                "/api/v1/users",
                json!({"message": "User created successfully", "id": 3}),
            )
            .with_status(201),
        ],
    }
}

/// Write [`default_mock_config`] to `path`.
pub async fn write_default_mock_config(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    save_mock_config(&default_mock_config(), path).await
}
