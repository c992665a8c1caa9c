//! CLI entry point for the data.gouv.fr catalog dashboard.
//!
//! Provides subcommands for serving the dashboard page, running a one-off
//! refresh, and exporting the aggregate tables as CSV.

use anyhow::Result;
use catalog_dashboard::{
    config::Settings,
    dashboard::Dashboard,
    fetch::BasicClient,
    output::{export_tables, print_pretty, print_summary, to_json},
    server::run_server,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "catalog_dashboard")]
#[command(about = "Object creation charts for the data.gouv.fr catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard page
    Serve {
        /// Address to listen on (defaults to DASHBOARD_BIND or 127.0.0.1:8050)
        #[arg(short, long)]
        bind: Option<String>,

        /// Recompute the charts on every request
        #[arg(long, default_value_t = false)]
        debug: bool,
    },
    /// Download missing exports and compute the tables once
    Refresh {
        /// Print the tables as JSON instead of a summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compute the tables and write them as CSV files
    Export {
        /// Directory to write the CSV files to
        #[arg(short, long, default_value = "aggregates")]
        output_dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/catalog_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("catalog_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve { bind, debug } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            let debug = debug || settings.debug;
            if debug {
                info!("Debug mode: charts are recomputed on every request");
            }

            let dashboard = Dashboard::new(BasicClient::new()?, settings.catalog, &settings.data_dir)
                .with_always_recompute(debug);
            run_server(&bind, Arc::new(dashboard)).await?;
        }
        Commands::Refresh { json } => {
            let dashboard =
                Dashboard::new(BasicClient::new()?, settings.catalog, &settings.data_dir);
            let aggregates = dashboard.refresh().await?;

            if json {
                println!("{}", to_json(&aggregates)?);
            } else {
                print_summary(&aggregates);
                print_pretty(&aggregates);
            }
        }
        Commands::Export { output_dir } => {
            let dashboard =
                Dashboard::new(BasicClient::new()?, settings.catalog, &settings.data_dir);
            let aggregates = dashboard.refresh().await?;

            let written = export_tables(Path::new(&output_dir), &aggregates)?;
            info!(files = written.len(), output_dir = %output_dir, "Tables exported");
        }
    }

    Ok(())
}
