//! iDempiere WS CLI - run server-side processes from the terminal
//!
//! - `run`: invoke a process and report its summary or classified failure
//! - `envelope`: print the request document without sending it
//! - `config`: show the effective configuration

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{envelope, run, ProcessArgs};
use config::CliConfig;
use error::CliResult;
use output::{print_error, print_single, OutputFormat};

/// iDempiere WS CLI application
#[derive(Parser)]
#[command(name = "idempiere-ws")]
#[command(about = "Run iDempiere processes through the ADInterface web service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "IDEMPIERE_WS_CONFIG")]
    config: Option<String>,

    /// Server base URL, overrides [client].server
    #[arg(short, long, env = "IDEMPIERE_SERVER")]
    server: Option<String>,

    /// Login user, overrides [context].username
    #[arg(short, long, env = "IDEMPIERE_USERNAME")]
    username: Option<String>,

    /// Login password, overrides [context].password
    #[arg(long, env = "IDEMPIERE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run a process on the server
    Run(ProcessArgs),

    /// Print the request document without sending it
    Envelope(ProcessArgs),

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> CliResult<bool> {
    let config = CliConfig::load(cli.config.as_deref())?.with_overrides(
        cli.server,
        cli.username,
        cli.password,
    );

    match cli.command {
        Commands::Run(args) => run::execute(args, &config, cli.output).await,
        Commands::Envelope(args) => envelope::execute(args, &config, cli.output).map(|()| true),
        Commands::Config => {
            let shown = config.redacted();
            match cli.output {
                OutputFormat::Text => {
                    println!("Server: {}", shown.client.server);
                    println!("Timeout: {}s", shown.client.timeout_secs);
                    println!("Locale: {}", shown.client.locale);
                    println!("System proxy: {}", shown.client.use_system_proxy);
                    match &shown.context {
                        Some(context) => println!("Context: {}", context),
                        None => println!("Context: (none)"),
                    }
                }
                format => print_single(&shown, format)?,
            }
            Ok(true)
        }
    }
}
