use crate::error::{AppError, Result};

/// A cell range expression. A colon is the only thing that makes it a range,
/// so `A1:B5`, `A:A`, `1:1` and `A2:A` are all ranges and `A1` is a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRange {
    Cell(String),
    Range(String),
}

impl CellRange {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.contains(':') {
            true => CellRange::Range(raw.to_string()),
            false => CellRange::Cell(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CellRange::Cell(s) | CellRange::Range(s) => s,
        }
    }
}

/// 1-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}

impl CellAddress {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Split an address such as `b12` into its column letters and row digits.
    /// Characters that are neither (e.g. `$` in `$A$1`) are ignored.
    pub fn parse(cell: &str) -> Result<Self> {
        let cell_ref = cell.to_ascii_uppercase();
        let letters: String = cell_ref.chars().filter(char::is_ascii_alphabetic).collect();
        let digits: String = cell_ref.chars().filter(char::is_ascii_digit).collect();

        let invalid = || AppError::InvalidCell(cell.to_string());

        let column = column_number(&letters).ok_or_else(invalid)?;
        let row = digits
            .parse::<u32>()
            .ok()
            .filter(|row| *row > 0)
            .ok_or_else(invalid)?;

        Ok(Self::new(row, column))
    }

    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row)
    }
}

/// Bijective base-26 column number: `A` is 1, `Z` is 26, `AA` is 27.
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    letters.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = c as u32 - 'A' as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Inverse of [`column_number`]; `0` has no letters.
pub fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Prefix a range with a quoted worksheet title, e.g. `'My Tab'!A1:B2`.
/// An empty range addresses the whole worksheet.
pub fn qualified(worksheet: &str, range: &str) -> String {
    let title = format!("'{}'", worksheet.replace('\'', "''"));
    match range.is_empty() {
        true => title,
        false => format!("{}!{}", title, range),
    }
}
