//! Environment files: `KEY=VALUE` lines feeding the variable map.

use crate::config::error::ConfigError;
use crate::types::collection::VariableMap;

/// Parse environment file content.
///
/// Blank lines and lines starting with `#` are skipped. Keys and values are
/// trimmed and split at the first `=`, so values may themselves contain `=`.
/// Later assignments of the same key win.
pub fn parse_environment(content: &str) -> Result<VariableMap, ConfigError> {
    let mut variables = VariableMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::Environment {
            line: index + 1,
            content: line.to_string(),
        })?;
        variables.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(variables)
}
