//! Mock commands - serve a mock configuration or write a starter one.

use super::table;
use anyhow::{Context, Result};
use postline_core::config::{load_mock_config, write_default_mock_config};
use postline_core::{MockServer, RouteTable, ServerConfig};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Serve `config_path` (a file or glob pattern) until Ctrl+C.
pub async fn run(config_path: &str, host: &str, port: u16) -> Result<()> {
    let config = load_mock_config(config_path).await?;
    let routes = RouteTable::from_config(&config)?;
    let server = MockServer::new(ServerConfig::new(host, port), routes);

    println!("Mock server");
    println!("Address: http://{}", server.config().address());
    println!("Config: {config_path}\n");
    println!("{}\n", describe_routes(server.routes()));
    println!("Press Ctrl+C to stop.");

    let shutdown = CancellationToken::new();
    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            on_ctrl_c.cancel();
        }
    });

    server.run(shutdown).await?;
    println!("Mock server stopped");
    Ok(())
}

/// Write the starter configuration to `output_path`.
pub async fn init(output_path: &Path) -> Result<()> {
    write_default_mock_config(output_path)
        .await
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    println!("Created mock server configuration: {}", output_path.display());
    Ok(())
}

pub fn describe_routes(routes: &RouteTable) -> String {
    let rows: Vec<Vec<String>> = routes
        .routes()
        .iter()
        .map(|route| {
            vec![
                route.method.to_string(),
                route.template.as_str().to_string(),
                route.status_code.to_string(),
                route.conditions.len().to_string(),
                route.template.param_names().collect::<Vec<_>>().join(", "),
            ]
        })
        .collect();
    table(&["Method", "Path", "Status", "Conditions", "Params"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postline_core::config::default_mock_config;
    use postline_core::types::endpoint::EndpointSpec;
    use postline_core::{HttpMethod, MockConfig};
    use serde_json::json;
    use rstest::rstest;

    #[rstest]
    fn test_describe_routes_default_config() {
        let routes = RouteTable::from_config(&default_mock_config()).unwrap();
        let text = describe_routes(&routes);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("GET     /api/v1/health"));
        assert!(lines[4].starts_with("POST    /api/v1/users"));
        assert!(lines[4].contains("201"));
    }

    #[rstest]
    fn test_describe_routes_lists_params() {
        let config = MockConfig {
            endpoints: vec![EndpointSpec::new(
                HttpMethod::Get,
                "/orgs/{org}/repos/{repo}",
                json!({}),
            )],
        };
        let routes = RouteTable::from_config(&config).unwrap();
        let text = describe_routes(&routes);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("Params"));
        assert!(lines[2].ends_with("org, repo"), "{text}");
    }
}
