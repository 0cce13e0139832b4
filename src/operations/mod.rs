mod dispatch;
mod payload;

pub use dispatch::{Action, Dispatcher, Outcome};

#[cfg(test)]
pub(crate) use dispatch::mocks;

use crate::error::{AppError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Update,
    Append,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Append => "append",
        }
    }

    /// Gate for callers that name a branch up front. A blank or missing
    /// `requested` operation carries no opinion and always passes.
    pub fn check(&self, requested: Option<&str>) -> Result<()> {
        match requested.map(str::trim) {
            None | Some("") => Ok(()),
            Some(op) if op.eq_ignore_ascii_case(self.as_str()) => Ok(()),
            Some(op) => Err(AppError::OperationMismatch {
                expected: self.as_str(),
                got: op.to_string(),
            }),
        }
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "update" => Ok(Operation::Update),
            "append" => Ok(Operation::Append),
            _ => Err(AppError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("read".parse::<Operation>().unwrap(), Operation::Read);
        assert_eq!("UPDATE".parse::<Operation>().unwrap(), Operation::Update);
        assert_eq!(" Append ".parse::<Operation>().unwrap(), Operation::Append);
    }

    #[test]
    fn test_parse_unknown_lists_allowed_set() {
        let err = "delete".parse::<Operation>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid operation 'delete'. Allowed operations: read, update, append"
        );
    }

    #[test]
    fn test_check_passes_without_opinion() {
        assert!(Operation::Read.check(None).is_ok());
        assert!(Operation::Update.check(Some("")).is_ok());
        assert!(Operation::Append.check(Some("  ")).is_ok());
    }

    #[test]
    fn test_check_matches_case_insensitively() {
        assert!(Operation::Update.check(Some("Update")).is_ok());
    }

    #[test]
    fn test_check_mismatch() {
        let err = Operation::Read.check(Some("append")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation mismatch: expected 'read', got 'append'"
        );
    }
}
