use crate::error::AppError;
use crate::operations::Outcome;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// The result mapping handed back for every invocation. Always carries a
/// `status` of `success` or `error`, plus one of `data`, `message` or `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Data { data: Value },
    Message { message: String },
    Error { error: String },
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        !matches!(self, Envelope::Error { .. })
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Envelope::Data { data } => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("data", data)?;
            }
            Envelope::Message { message } => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("message", message)?;
            }
            Envelope::Error { error } => {
                map.serialize_entry("status", "error")?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

impl From<Outcome> for Envelope {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Data(data) => Envelope::Data { data },
            Outcome::Message(message) => Envelope::Message { message },
        }
    }
}

impl From<AppError> for Envelope {
    fn from(err: AppError) -> Self {
        let error = match err {
            AppError::Auth(_) => format!("Failed to set up Google Sheets client: {}", err),
            other => other.to_string(),
        };
        Envelope::Error { error }
    }
}
