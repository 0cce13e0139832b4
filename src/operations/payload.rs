use crate::error::{AppError, Result};
use serde_json::Value;

/// Shape an arbitrary JSON value into rows of cells.
///
/// A non-array is treated as a single row. Within the rows, arrays are kept
/// as-is, objects become their values in key order, and anything else
/// becomes a one-cell row.
pub fn normalize_rows(value: Value) -> Vec<Vec<Value>> {
    let rows = match value {
        Value::Array(rows) => rows,
        other => vec![other],
    };

    rows.into_iter()
        .map(|row| match row {
            Value::Array(cells) => cells,
            Value::Object(fields) => fields.into_iter().map(|(_, v)| v).collect(),
            scalar => vec![scalar],
        })
        .collect()
}

pub(super) fn parse_rows(data: &str, invalid: &'static str) -> Result<Vec<Vec<Value>>> {
    let value: Value = serde_json::from_str(data).map_err(|_| AppError::InvalidJson(invalid))?;
    Ok(normalize_rows(value))
}

/// Parse the grid for a range update. An array of arrays is written as-is;
/// a flat array of scalars is a single row. Any other shape is rejected.
pub(super) fn parse_grid(data: &str, invalid: &'static str) -> Result<Vec<Vec<Value>>> {
    let rows = match serde_json::from_str(data) {
        Ok(Value::Array(rows)) => rows,
        _ => return Err(AppError::InvalidJson(invalid)),
    };

    if rows.iter().all(Value::is_array) {
        return Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Array(cells) => Some(cells),
                _ => None,
            })
            .collect());
    }

    match rows.iter().all(|cell| !cell.is_array() && !cell.is_object()) {
        true => Ok(vec![rows]),
        false => Err(AppError::InvalidJson(invalid)),
    }
}
