use std::fmt;

// Drive file IDs are long runs of URL-safe characters; anything shorter is a title.
const MIN_KEY_LEN: usize = 31;

/// A spreadsheet reference as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetIdentifier {
    Key(String),
    Name(String),
}

impl SheetIdentifier {
    pub fn classify(raw: &str) -> Self {
        let looks_like_key = raw.len() >= MIN_KEY_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        match looks_like_key {
            true => SheetIdentifier::Key(raw.to_string()),
            false => SheetIdentifier::Name(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SheetIdentifier::Key(s) | SheetIdentifier::Name(s) => s,
        }
    }
}

impl fmt::Display for SheetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
