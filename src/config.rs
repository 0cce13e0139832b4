use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR_PREFIX: &str = "sheet-service";

pub const DEFAULT_WORKSHEET: &str = "Sheet1";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub sheets: SheetsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SheetsConfig {
    /// Service account key used when none is passed on the command line
    pub service_account_file: Option<PathBuf>,
    pub worksheet_name: String,
    pub cell_update: CellUpdateMode,
    pub append: AppendMode,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            service_account_file: None,
            worksheet_name: DEFAULT_WORKSHEET.to_string(),
            cell_update: CellUpdateMode::default(),
            append: AppendMode::default(),
        }
    }
}

/// How a write to a single cell (no colon in the range) reaches the API.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CellUpdateMode {
    /// Split the address into a 1-based (row, column) pair and write that cell.
    #[default]
    Decomposed,
    /// Write the raw range string as given.
    Direct,
}

/// Where appended rows land.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AppendMode {
    /// Write at column A of the first row after the existing data.
    #[default]
    ColumnA,
    /// Use the API's own append, which picks the table position itself.
    Native,
}

impl Config {
    /// Load the config file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        if config.sheets.worksheet_name.trim().is_empty() {
            return Err(AppError::Config(
                "worksheet_name must not be empty in config file".to_string(),
            ));
        }

        Ok(config)
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }
}
