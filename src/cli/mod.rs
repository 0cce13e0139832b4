mod sheet;
mod show;

use crate::error::Result;
use crate::operations::Operation;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

pub use sheet::SheetArgs;
pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "sheet-service")]
#[command(about = "Read, update and append Google Sheets data with a service account", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<ExitCode> {
        match &self.command {
            Commands::Read(args) => args.execute(Some(Operation::Read)).await,
            Commands::Update(args) => args.execute(Some(Operation::Update)).await,
            Commands::Append(args) => args.execute(Some(Operation::Append)).await,
            Commands::Run(args) => args.execute(None).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a cell or a range
    Read(SheetArgs),
    /// Write a value to a cell, or JSON rows to a range
    Update(SheetArgs),
    /// Append JSON rows below the existing data
    Append(SheetArgs),
    /// Perform whichever operation --operation names (default: read)
    Run(SheetArgs),
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
