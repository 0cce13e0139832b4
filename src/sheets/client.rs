use super::auth::{AUTH_SCOPES, create_and_verify_authenticator};
use super::range::qualified;
use super::{CellAddress, SheetIdentifier, SheetResolver, WorksheetOperations};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use google_drive3::api::DriveHub;
use google_sheets4::api::{Sheets, Spreadsheet, ValueRange};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;
use tracing::{debug, instrument};

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

type Hub = Sheets<HttpsConnector<HttpConnector>>;

pub struct SheetsClient {
    sheets: Hub,
    drive: DriveHub<HttpsConnector<HttpConnector>>,
}

impl SheetsClient {
    /// Create a new SheetsClient with authenticated access
    #[instrument(name = "Authenticating to Google Sheets", skip_all)]
    pub async fn new(service_account_json: &str) -> Result<Self> {
        let auth = create_and_verify_authenticator(service_account_json).await?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| AppError::Auth(format!("Failed to load native roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);

        let sheets = Sheets::new(client.clone(), auth.clone());
        let drive = DriveHub::new(client, auth);

        Ok(Self { sheets, drive })
    }

    #[instrument(name = "Opening spreadsheet by key", skip(self))]
    async fn open_by_key(&self, key: &str) -> Result<Spreadsheet> {
        let (_, spreadsheet) = self
            .sheets
            .spreadsheets()
            .get(key)
            .include_grid_data(false)
            .add_scopes(AUTH_SCOPES)
            .doit()
            .await
            .map_err(|e| match is_not_found(&e) {
                true => AppError::SpreadsheetNotFound(key.to_string()),
                false => AppError::Open(e.to_string()),
            })?;

        Ok(spreadsheet)
    }

    #[instrument(name = "Finding spreadsheet by name", skip(self))]
    async fn open_by_name(&self, name: &str) -> Result<Spreadsheet> {
        let query = format!(
            "name='{}' and mimeType='{}' and trashed=false",
            escape_query(name),
            SPREADSHEET_MIME_TYPE
        );

        let (_, file_list) = self
            .drive
            .files()
            .list()
            .q(&query)
            .supports_all_drives(true)
            .include_items_from_all_drives(true)
            .page_size(1)
            .add_scopes(AUTH_SCOPES)
            .doit()
            .await
            .map_err(|e| AppError::Open(format!("Failed to search spreadsheet: {}", e)))?;

        let key = file_list
            .files
            .and_then(|files| files.into_iter().next())
            .and_then(|file| file.id)
            .ok_or_else(|| AppError::SpreadsheetNotFound(name.to_string()))?;
        debug!(%key, "Found spreadsheet");

        self.open_by_key(&key).await.map_err(|e| match e {
            AppError::SpreadsheetNotFound(_) => AppError::SpreadsheetNotFound(name.to_string()),
            other => other,
        })
    }
}

#[async_trait]
impl SheetResolver for SheetsClient {
    type Worksheet = Worksheet;

    async fn open_worksheet(
        &self,
        spreadsheet: &SheetIdentifier,
        worksheet_name: &str,
    ) -> Result<Worksheet> {
        let opened = match spreadsheet {
            SheetIdentifier::Key(key) => self.open_by_key(key).await?,
            SheetIdentifier::Name(name) => self.open_by_name(name).await?,
        };

        find_worksheet(&opened, worksheet_name)?;

        let spreadsheet_id = opened
            .spreadsheet_id
            .ok_or_else(|| AppError::Open("Spreadsheet has empty ID".to_string()))?;

        Ok(Worksheet {
            hub: self.sheets.clone(),
            spreadsheet_id,
            title: worksheet_name.to_string(),
        })
    }
}

/// Handle to one tab of an opened spreadsheet.
pub struct Worksheet {
    hub: Hub,
    spreadsheet_id: String,
    title: String,
}

impl Worksheet {
    async fn values(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let range = qualified(&self.title, range);
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &range)
            .major_dimension("ROWS")
            .add_scopes(AUTH_SCOPES)
            .doit()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        Ok(response.values.unwrap_or_default())
    }

    async fn write(
        &self,
        range: &str,
        values: Vec<Vec<Value>>,
        value_input_option: &str,
    ) -> Result<()> {
        let range = qualified(&self.title, range);
        let value_range = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(range.clone()),
            values: Some(values),
        };

        self.hub
            .spreadsheets()
            .values_update(value_range, &self.spreadsheet_id, &range)
            .value_input_option(value_input_option)
            .add_scopes(AUTH_SCOPES)
            .doit()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl WorksheetOperations for Worksheet {
    fn title(&self) -> &str {
        &self.title
    }

    #[instrument(name = "Reading range", skip(self))]
    async fn get_range(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        self.values(range).await
    }

    #[instrument(name = "Reading cell", skip(self))]
    async fn get_cell(&self, cell: &str) -> Result<Option<Value>> {
        let rows = self.values(cell).await?;
        Ok(rows.into_iter().next().and_then(|row| row.into_iter().next()))
    }

    #[instrument(name = "Updating cell", skip(self, value))]
    async fn update_cell(&self, cell: CellAddress, value: Value) -> Result<()> {
        self.write(&cell.to_a1(), vec![vec![value]], "USER_ENTERED")
            .await
    }

    #[instrument(name = "Updating range", skip(self, values))]
    async fn update_range(&self, range: &str, values: Vec<Vec<Value>>) -> Result<()> {
        self.write(range, values, "RAW").await
    }

    #[instrument(name = "Appending rows", skip_all, fields(rows = values.len()))]
    async fn append_rows(&self, values: Vec<Vec<Value>>) -> Result<()> {
        let range = qualified(&self.title, "A1");
        let value_range = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(range.clone()),
            values: Some(values),
        };

        self.hub
            .spreadsheets()
            .values_append(value_range, &self.spreadsheet_id, &range)
            .value_input_option("RAW")
            .insert_data_option("INSERT_ROWS")
            .add_scopes(AUTH_SCOPES)
            .doit()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        Ok(())
    }

    #[instrument(name = "Fetching all values", skip(self))]
    async fn all_values(&self) -> Result<Vec<Vec<Value>>> {
        self.values("").await
    }
}

/// Tab titles are matched exactly, case included.
fn find_worksheet(spreadsheet: &Spreadsheet, worksheet_name: &str) -> Result<()> {
    let found = spreadsheet
        .sheets
        .iter()
        .flatten()
        .filter_map(|sheet| sheet.properties.as_ref()?.title.as_deref())
        .any(|title| title == worksheet_name);

    match found {
        true => Ok(()),
        false => Err(AppError::WorksheetNotFound(worksheet_name.to_string())),
    }
}

fn is_not_found(err: &google_sheets4::Error) -> bool {
    match err {
        google_sheets4::Error::BadRequest(body) => {
            body.pointer("/error/code").and_then(Value::as_u64) == Some(404)
        }
        google_sheets4::Error::Failure(response) => response.status().as_u16() == 404,
        _ => false,
    }
}

/// Drive query strings are single-quoted; quotes and backslashes need escaping.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use google_sheets4::api::{Sheet, SheetProperties};
    use serde_json::json;

    fn with_tabs(titles: &[&str]) -> Spreadsheet {
        let sheets = titles
            .iter()
            .map(|title| Sheet {
                properties: Some(SheetProperties {
                    title: Some(title.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();

        Spreadsheet {
            spreadsheet_id: Some("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms".to_string()),
            sheets: Some(sheets),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_worksheet() {
        let spreadsheet = with_tabs(&["Sheet1", "Responses"]);
        assert!(find_worksheet(&spreadsheet, "Responses").is_ok());
        assert!(find_worksheet(&spreadsheet, "Sheet1").is_ok());
    }

    #[test]
    fn test_find_worksheet_missing() {
        let spreadsheet = with_tabs(&["Sheet1"]);
        for name in ["Missing", "sheet1", ""] {
            let err = find_worksheet(&spreadsheet, name).unwrap_err();
            assert_eq!(err.to_string(), format!("Worksheet '{}' not found.", name));
        }
    }

    #[test]
    fn test_find_worksheet_without_tabs() {
        let untitled = Spreadsheet {
            sheets: Some(vec![Sheet::default()]),
            ..Default::default()
        };
        assert!(matches!(
            find_worksheet(&untitled, "Sheet1"),
            Err(AppError::WorksheetNotFound(_))
        ));
        assert!(find_worksheet(&Spreadsheet::default(), "Sheet1").is_err());
    }

    #[test]
    fn test_is_not_found() {
        let not_found = google_sheets4::Error::BadRequest(json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        }));
        assert!(is_not_found(&not_found));

        let forbidden = google_sheets4::Error::BadRequest(json!({
            "error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}
        }));
        assert!(!is_not_found(&forbidden));

        assert!(!is_not_found(&google_sheets4::Error::Cancelled));
    }

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("Budget"), "Budget");
        assert_eq!(escape_query("Bob's sheet"), "Bob\\'s sheet");
        assert_eq!(escape_query("a\\b"), "a\\\\b");
    }
}
