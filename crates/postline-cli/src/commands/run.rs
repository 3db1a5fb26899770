//! Run command - execute a collection and report results.

use super::{error_chain, table};
use anyhow::Result;
use postline_core::config::{load_collection, load_environment};
use postline_core::request::{RequestOutcome, RequestReport};
use postline_core::{Executor, ExecutorConfig, HistoryEntry, RunReport, VariableMap};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct RunOptions<'a> {
    pub collection_file: &'a Path,
    pub env_file: Option<&'a Path>,
    pub request_name: Option<&'a str>,
    pub timeout: Duration,
}

/// Run the collection; exit code 1 when a request or an assertion failed.
pub async fn run(options: RunOptions<'_>) -> Result<ExitCode> {
    let collection = load_collection(options.collection_file).await?;
    let variables = match options.env_file {
        Some(path) => load_environment(path).await?,
        None => VariableMap::new(),
    };

    let config = ExecutorConfig::default().with_timeout(options.timeout);
    let mut executor = Executor::for_collection(&collection, variables, &config)?;
    println!(
        "Collection: {}\nBase URL: {}\nVariables: {}\n",
        collection.name,
        executor.base_url(),
        executor.variables().len()
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current request");
            on_ctrl_c.cancel();
        }
    });

    let report = executor
        .run_collection(&collection, options.request_name, &cancel)
        .await;

    if report.is_empty() && !report.cancelled {
        match options.request_name {
            Some(name) => println!("No requests found matching {name}"),
            None => println!("No requests found"),
        }
        return Ok(ExitCode::SUCCESS);
    }

    for request in &report.requests {
        println!("{}\n", format_request(request));
    }
    if !executor.history().is_empty() {
        println!("Request History\n{}\n", format_history(executor.history()));
    }
    println!("{}", summary(&report));

    Ok(if report.all_passed() && !report.cancelled {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

pub fn format_request(request: &RequestReport) -> String {
    let mut lines = vec![format!("Request: {} ({} {})", request.name, request.method, request.url)];

    match &request.outcome {
        RequestOutcome::Completed {
            response,
            assertions,
        } => {
            lines.push(format!(
                "Status: {}{} ({:.3}s)",
                response.status,
                if response.is_success() { "" } else { " [error]" },
                response.elapsed.as_secs_f64()
            ));
            lines.push(format!("Response: {}", pretty_body(&response.body)));
            if !assertions.is_empty() {
                lines.push("Tests:".to_string());
                for (check, passed) in assertions {
                    lines.push(format!("  {check}: {}", if *passed { "PASS" } else { "FAIL" }));
                }
            }
        }
        RequestOutcome::Failed(err) => lines.push(format!("Error: {}", error_chain(err))),
    }

    lines.join("\n")
}

fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

pub fn format_history(history: &[HistoryEntry]) -> String {
    let rows: Vec<Vec<String>> = history
        .iter()
        .map(|entry| {
            vec![
                entry.method.to_string(),
                entry.endpoint.clone(),
                entry.status_code.to_string(),
                if entry.is_success() { "Yes" } else { "No" }.to_string(),
                entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{:.2}s", entry.response_time),
            ]
        })
        .collect();
    table(
        &["Method", "Endpoint", "Status", "Success", "Time", "Duration"],
        &rows,
    )
}

pub fn summary(report: &RunReport) -> String {
    let total = report.requests.len();
    let passed = total - report.failed_count();
    let mut line = format!("{passed}/{total} requests passed");
    if report.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}
