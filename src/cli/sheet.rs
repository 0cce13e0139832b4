use crate::config::{Config, SheetsConfig};
use crate::error::{AppError, Result};
use crate::operations::Operation;
use crate::service::{SheetRequest, SheetService};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct SheetArgs {
    /// Spreadsheet name, or the ID from its URL
    #[arg(long = "sheet", env = "SHEET_IDENTIFIER")]
    pub sheet_identifier: String,

    /// Worksheet (tab) name [default: from config, else Sheet1]
    #[arg(long = "worksheet", env = "WORKSHEET_NAME")]
    pub worksheet_name: Option<String>,

    /// Cell or range, e.g. A1, B2:C5, A:A, 1:1
    #[arg(long = "range", default_value = "A1")]
    pub cell_range: String,

    /// Literal value for a single cell, or JSON rows for ranges and appends
    #[arg(long)]
    pub data: Option<String>,

    /// Expected operation; checked against the subcommand when set
    #[arg(long)]
    pub operation: Option<String>,

    /// Raw service account JSON
    #[arg(long, env = "SERVICE_ACCOUNT_JSON", hide_env_values = true)]
    pub service_account_json: Option<String>,

    /// Path to a service account JSON file
    #[arg(long, env = "SERVICE_ACCOUNT_FILE")]
    pub service_account_file: Option<PathBuf>,
}

impl SheetArgs {
    pub async fn execute(&self, operation: Option<Operation>) -> Result<ExitCode> {
        let envelope = match self.prepare() {
            Ok((service, request)) => match operation {
                Some(operation) => service.invoke(operation, &request).await,
                None => service.run(&request).await,
            },
            Err(e) => e.into(),
        };

        println!("{}", serde_json::to_string_pretty(&envelope)?);

        match envelope.is_success() {
            true => Ok(ExitCode::SUCCESS),
            false => Ok(ExitCode::FAILURE),
        }
    }

    fn prepare(&self) -> Result<(SheetService, SheetRequest)> {
        let config = Config::load()?;
        let request = self.to_request(&config.sheets)?;
        Ok((SheetService::new(&config.sheets), request))
    }

    fn to_request(&self, config: &SheetsConfig) -> Result<SheetRequest> {
        let service_account_json = self.service_account_json(config)?;

        Ok(SheetRequest {
            worksheet_name: self
                .worksheet_name
                .clone()
                .unwrap_or_else(|| config.worksheet_name.clone()),
            operation: self.operation.clone(),
            cell_range: self.cell_range.clone(),
            data: self.data.clone(),
            ..SheetRequest::new(&self.sheet_identifier, service_account_json)
        })
    }

    /// Inline JSON wins over a file argument, which wins over the config file.
    fn service_account_json(&self, config: &SheetsConfig) -> Result<String> {
        if let Some(json) = &self.service_account_json {
            return Ok(json.clone());
        }

        let path = self
            .service_account_file
            .as_deref()
            .or(config.service_account_file.as_deref())
            .ok_or_else(|| {
                AppError::Config(
                    "No service account given: use --service-account-json, --service-account-file or service_account_file in the config file".to_string(),
                )
            })?;

        read_service_account_file(path)
    }
}

fn read_service_account_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "Failed to read service account file {:?}: {}",
            path, e
        ))
    })
}
