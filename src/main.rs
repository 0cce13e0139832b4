mod cli;
mod config;
mod envelope;
mod error;
mod operations;
mod service;
mod sheets;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the result envelope
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
