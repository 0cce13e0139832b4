use crate::config::Config;
use crate::error::Result;
use clap::Subcommand;
use std::process::ExitCode;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show configuration path and the effective settings
    Paths,
}

impl ShowResource {
    pub async fn execute(&self) -> Result<ExitCode> {
        match self {
            ShowResource::Paths => show_paths(),
        }
    }
}

fn show_paths() -> Result<ExitCode> {
    let config_path = Config::config_file()?;
    let config = Config::load()?;

    info!(path = ?config_path, exists = config_path.exists(), "Config path");
    info!(
        worksheet = %config.sheets.worksheet_name,
        cell_update = ?config.sheets.cell_update,
        append = ?config.sheets.append,
        service_account_file = ?config.sheets.service_account_file,
        "Sheet defaults"
    );

    Ok(ExitCode::SUCCESS)
}
