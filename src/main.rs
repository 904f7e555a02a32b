//! Finreport main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use finreport_api::start_server;
use finreport_config::{Config, ConfigError};
use finreport_core::{generate_report, ReportFormat};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "finreport")]
#[command(author = "Finreport Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Spreadsheet and PDF exports for personal finance movements", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Render a single report from a JSON payload file
    Render {
        /// Payload file with `movimientos` and optional `titulo`
        #[arg(short, long)]
        input: PathBuf,
        /// Output format: xlsx or pdf
        #[arg(short, long, default_value = "xlsx")]
        format: ReportFormat,
        /// Destination file (defaults to the configured filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::DefaultConfig) = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(&args.config) {
        Ok(config) => (config, None),
        Err(ConfigError::FileNotFound { path }) => (Config::default(), Some(path)),
        Err(e) => {
            let details = e.to_details();
            eprintln!("[ERROR] {}", details);
            for suggestion in &details.suggestions {
                eprintln!("  - {}", suggestion);
            }
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if let Some(path) = missing {
        log::warn!("Config file not found: {}, using defaults", path);
    }

    match args.command {
        Some(Command::Render { input, format, output }) => render(&config, &input, format, output),
        Some(Command::Serve { host, port }) => serve(config, host, port),
        _ => serve(config, None, None),
    }
}

fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate().context("Invalid server configuration")?;

    let rt = Runtime::new()?;
    rt.block_on(start_server(config))
}

fn render(
    config: &Config,
    input: &Path,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let body = std::fs::read(input)
        .with_context(|| format!("Failed to read payload: {}", input.display()))?;
    let bytes = generate_report(format, &body, &config.report)
        .with_context(|| format!("Failed to render {} report", format))?;

    let output = output.unwrap_or_else(|| PathBuf::from(format.filename(&config.report)));
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write report: {}", output.display()))?;

    log::info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
