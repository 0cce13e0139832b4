mod auth;
mod client;
pub mod identifier;
pub mod range;

pub use client::SheetsClient;
pub use identifier::SheetIdentifier;
pub use range::{CellAddress, CellRange};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Turns a spreadsheet reference and a tab title into a worksheet handle.
#[async_trait]
pub trait SheetResolver {
    type Worksheet: WorksheetOperations + Send + Sync;

    async fn open_worksheet(
        &self,
        spreadsheet: &SheetIdentifier,
        worksheet_name: &str,
    ) -> Result<Self::Worksheet>;
}

/// Reads and writes against a single worksheet. Ranges are unqualified A1
/// expressions; the worksheet adds its own title.
#[async_trait]
pub trait WorksheetOperations {
    fn title(&self) -> &str;

    /// Rows of cell values, exactly as the API returns them.
    async fn get_range(&self, range: &str) -> Result<Vec<Vec<Value>>>;

    /// `None` for an empty cell.
    async fn get_cell(&self, cell: &str) -> Result<Option<Value>>;

    async fn update_cell(&self, cell: CellAddress, value: Value) -> Result<()>;

    async fn update_range(&self, range: &str, values: Vec<Vec<Value>>) -> Result<()>;

    /// Append through the API's own table detection.
    async fn append_rows(&self, values: Vec<Vec<Value>>) -> Result<()>;

    /// Every row up to the last one holding data.
    async fn all_values(&self) -> Result<Vec<Vec<Value>>>;
}
