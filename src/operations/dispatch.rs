use super::Operation;
use super::payload::{parse_grid, parse_rows};
use crate::config::{AppendMode, CellUpdateMode, SheetsConfig};
use crate::error::{AppError, Result};
use crate::sheets::range::column_letters;
use crate::sheets::{CellAddress, CellRange, WorksheetOperations};
use serde_json::Value;
use tracing::{debug, info, instrument};

const RANGE_UPDATE_JSON: &str = "For range updates, data must be valid JSON format";
const APPEND_JSON: &str = "For append operations, data must be valid JSON array format";

/// Where a single-cell write goes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellTarget {
    Address(CellAddress),
    Raw(String),
}

/// A validated request, ready to run against a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Read(CellRange),
    UpdateCell {
        range: String,
        target: CellTarget,
        value: String,
    },
    UpdateRange {
        range: String,
        rows: Vec<Vec<Value>>,
    },
    Append {
        rows: Vec<Vec<Value>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Data(Value),
    Message(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    cell_update: CellUpdateMode,
    append: AppendMode,
}

impl Dispatcher {
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            cell_update: config.cell_update,
            append: config.append,
        }
    }

    /// Validate the inputs of `operation` without touching the network.
    pub fn plan(&self, operation: Operation, cell_range: &str, data: Option<&str>) -> Result<Action> {
        let range = CellRange::parse(cell_range);

        match (operation, range) {
            (Operation::Read, range) => Ok(Action::Read(range)),
            (Operation::Update, CellRange::Cell(cell)) => {
                let value = required(operation, data)?;
                let target = match self.cell_update {
                    CellUpdateMode::Decomposed => CellTarget::Address(CellAddress::parse(&cell)?),
                    CellUpdateMode::Direct => CellTarget::Raw(cell.clone()),
                };
                Ok(Action::UpdateCell {
                    range: cell,
                    target,
                    value: value.to_string(),
                })
            }
            (Operation::Update, CellRange::Range(range)) => Ok(Action::UpdateRange {
                rows: parse_grid(required(operation, data)?, RANGE_UPDATE_JSON)?,
                range,
            }),
            (Operation::Append, _) => Ok(Action::Append {
                rows: parse_rows(required(operation, data)?, APPEND_JSON)?,
            }),
        }
    }

    #[instrument(name = "Dispatching", skip_all, fields(worksheet = worksheet.title()))]
    pub async fn apply<W>(&self, worksheet: &W, action: Action) -> Result<Outcome>
    where
        W: WorksheetOperations + Sync + ?Sized,
    {
        match action {
            Action::Read(range) => read(worksheet, &range)
                .await
                .map(Outcome::Data)
                .map_err(|e| AppError::Remote(format!("Failed to read data: {}", e))),
            Action::UpdateCell {
                range,
                target,
                value,
            } => update_cell(worksheet, target, value)
                .await
                .map(|_| Outcome::Message(format!("Successfully updated {}", range)))
                .map_err(|e| AppError::Remote(format!("Failed to update data: {}", e))),
            Action::UpdateRange { range, rows } => worksheet
                .update_range(&range, rows)
                .await
                .map(|_| Outcome::Message(format!("Successfully updated range {}", range)))
                .map_err(|e| AppError::Remote(format!("Failed to update data: {}", e))),
            Action::Append { rows } => self
                .append(worksheet, rows)
                .await
                .map(Outcome::Message)
                .map_err(|e| AppError::Remote(format!("Failed to append data: {}", e))),
        }
    }

    async fn append<W>(&self, worksheet: &W, rows: Vec<Vec<Value>>) -> Result<String>
    where
        W: WorksheetOperations + Sync + ?Sized,
    {
        let count = rows.len();

        if rows.is_empty() {
            debug!("Nothing to append");
            return Ok(self.appended(count));
        }

        match self.append {
            AppendMode::ColumnA => {
                let next_row = worksheet.all_values().await?.len() + 1;
                let range = append_range(next_row, &rows);
                debug!(%range, "Appending at column A");
                worksheet.update_range(&range, rows).await?;
                info!(rows = count, "Rows appended");
                Ok(self.appended(count))
            }
            AppendMode::Native => {
                worksheet.append_rows(rows).await?;
                info!(rows = count, "Rows appended");
                Ok(self.appended(count))
            }
        }
    }

    fn appended(&self, count: usize) -> String {
        match self.append {
            AppendMode::ColumnA => format!(
                "Successfully appended {} row(s) starting from column A",
                count
            ),
            AppendMode::Native => format!("Successfully appended {} row(s)", count),
        }
    }
}

fn required<'a>(operation: Operation, data: Option<&'a str>) -> Result<&'a str> {
    data.filter(|data| !data.is_empty())
        .ok_or(AppError::MissingData(operation.as_str()))
}

async fn read<W>(worksheet: &W, range: &CellRange) -> Result<Value>
where
    W: WorksheetOperations + Sync + ?Sized,
{
    match range {
        CellRange::Cell(cell) => Ok(worksheet.get_cell(cell).await?.unwrap_or(Value::Null)),
        CellRange::Range(range) => {
            let rows = worksheet.get_range(range).await?;
            Ok(Value::Array(rows.into_iter().map(Value::Array).collect()))
        }
    }
}

async fn update_cell<W>(worksheet: &W, target: CellTarget, value: String) -> Result<()>
where
    W: WorksheetOperations + Sync + ?Sized,
{
    match target {
        CellTarget::Address(address) => worksheet.update_cell(address, Value::String(value)).await,
        CellTarget::Raw(cell) => {
            worksheet
                .update_range(&cell, vec![vec![Value::String(value)]])
                .await
        }
    }
}

/// The rectangle starting at column A of `first_row` that `rows` fill.
fn append_range(first_row: usize, rows: &[Vec<Value>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    match width {
        0 => format!("A{}", first_row),
        _ => format!(
            "A{}:{}{}",
            first_row,
            column_letters(width as u32),
            first_row + rows.len() - 1
        ),
    }
}
