//! postline - run API request collections and serve mock APIs.

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logging::LogFormat;
use postline_core::config::ConfigError;
use postline_core::{Error, ErrorKind, ValidationError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Exit code for configuration and validation errors.
const EXIT_CONFIG: u8 = 2;
/// Exit code for failed requests, failed assertions and server errors.
const EXIT_FAILURE: u8 = 1;

/// API testing and mock server toolkit.
#[derive(Parser)]
#[command(name = "postline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the requests of a collection file
    Run {
        /// Path to the collection file (YAML or JSON)
        collection: PathBuf,

        /// Environment file with KEY=VALUE lines
        #[arg(short, long)]
        env_file: Option<PathBuf>,

        /// Only run requests with this name
        #[arg(short, long)]
        request_name: Option<String>,

        /// Request timeout in seconds
        #[arg(long, env = "POSTLINE_TIMEOUT", default_value_t = 30)]
        timeout: u64,
    },

    /// Display collection details
    Show {
        /// Path to the collection file (YAML or JSON)
        collection: PathBuf,
    },

    /// Mock server commands
    Mock {
        #[command(subcommand)]
        action: MockAction,
    },
}

#[derive(Subcommand)]
enum MockAction {
    /// Run a mock API server
    Run {
        /// Configuration file or glob pattern
        config: String,

        /// Host to bind to
        #[arg(short = 'H', long, env = "POSTLINE_MOCK_HOST", default_value = "localhost")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "POSTLINE_MOCK_PORT", default_value_t = 5000)]
        port: u16,
    },

    /// Create a mock server configuration file
    Init {
        /// Where to write the configuration
        output: PathBuf,
    },
}

async fn dispatch(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run {
            collection,
            env_file,
            request_name,
            timeout,
        } => {
            commands::run::run(commands::run::RunOptions {
                collection_file: &collection,
                env_file: env_file.as_deref(),
                request_name: request_name.as_deref(),
                timeout: Duration::from_secs(timeout),
            })
            .await
        }
        Commands::Show { collection } => {
            commands::show::run(&collection).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Mock { action } => {
            match action {
                MockAction::Run { config, host, port } => {
                    commands::mock::run(&config, &host, port).await?
                }
                MockAction::Init { output } => commands::mock::init(&output).await?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Map an error to the process exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() || cause.is::<ValidationError>() {
            return EXIT_CONFIG;
        }
        if let Some(error) = cause.downcast_ref::<Error>() {
            return match error.kind() {
                ErrorKind::ConfigNotFound | ErrorKind::ConfigParse | ErrorKind::Validation => {
                    EXIT_CONFIG
                }
                ErrorKind::Execution | ErrorKind::Server => EXIT_FAILURE,
            };
        }
    }
    EXIT_FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.log_format, cli.verbose) {
        eprintln!("Error: {err:#}");
        return ExitCode::from(EXIT_FAILURE);
    }

    match dispatch(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
