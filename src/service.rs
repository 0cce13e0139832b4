use crate::config::{DEFAULT_WORKSHEET, SheetsConfig};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::operations::{Action, Dispatcher, Operation, Outcome};
use crate::sheets::{SheetIdentifier, SheetResolver, SheetsClient};
use std::fmt;
use tracing::{info, instrument, warn};

/// Inputs for one invocation.
#[derive(Clone)]
pub struct SheetRequest {
    pub sheet_identifier: String,
    pub worksheet_name: String,
    pub service_account_json: String,
    pub operation: Option<String>,
    pub cell_range: String,
    pub data: Option<String>,
}

impl SheetRequest {
    pub fn new(sheet_identifier: impl Into<String>, service_account_json: impl Into<String>) -> Self {
        Self {
            sheet_identifier: sheet_identifier.into(),
            worksheet_name: DEFAULT_WORKSHEET.to_string(),
            service_account_json: service_account_json.into(),
            operation: None,
            cell_range: "A1".to_string(),
            data: None,
        }
    }

    /// Blank worksheet names fall back to the default tab.
    pub fn worksheet_name(&self) -> &str {
        match self.worksheet_name.trim() {
            "" => DEFAULT_WORKSHEET,
            name => name,
        }
    }
}

impl fmt::Debug for SheetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetRequest")
            .field("sheet_identifier", &self.sheet_identifier)
            .field("worksheet_name", &self.worksheet_name)
            .field("service_account_json", &"<redacted>")
            .field("operation", &self.operation)
            .field("cell_range", &self.cell_range)
            .field("data", &self.data)
            .finish()
    }
}

pub struct SheetService {
    dispatcher: Dispatcher,
}

impl SheetService {
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
        }
    }

    /// Run the branch named by `operation`, checking it against the request's
    /// own `operation` field when that is set.
    pub async fn invoke(&self, operation: Operation, request: &SheetRequest) -> Envelope {
        self.respond(self.try_invoke(Some(operation), request).await)
    }

    /// Dispatch on the request's `operation` field, defaulting to read.
    pub async fn run(&self, request: &SheetRequest) -> Envelope {
        self.respond(self.try_invoke(None, request).await)
    }

    fn respond(&self, result: Result<Outcome>) -> Envelope {
        match result {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                warn!(error = %e, "Sheet operation failed");
                e.into()
            }
        }
    }

    #[instrument(name = "Sheet operation", skip_all, fields(sheet = %request.sheet_identifier))]
    async fn try_invoke(&self, branch: Option<Operation>, request: &SheetRequest) -> Result<Outcome> {
        let (operation, action) = self.plan(branch, request)?;
        info!(%operation, range = %request.cell_range, "Starting");

        let client = SheetsClient::new(&request.service_account_json).await?;
        self.execute(&client, request, action).await
    }

    fn plan(&self, branch: Option<Operation>, request: &SheetRequest) -> Result<(Operation, Action)> {
        let requested = request.operation.as_deref();
        let operation = match branch {
            Some(operation) => {
                operation.check(requested)?;
                operation
            }
            None => match requested.map(str::trim) {
                None | Some("") => Operation::Read,
                Some(op) => op.parse()?,
            },
        };

        let action = self
            .dispatcher
            .plan(operation, &request.cell_range, request.data.as_deref())?;
        Ok((operation, action))
    }

    async fn execute<R>(&self, resolver: &R, request: &SheetRequest, action: Action) -> Result<Outcome>
    where
        R: SheetResolver + Sync,
    {
        let spreadsheet = SheetIdentifier::classify(request.sheet_identifier.trim());
        let worksheet = resolver
            .open_worksheet(&spreadsheet, request.worksheet_name())
            .await?;

        self.dispatcher.apply(&worksheet, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppendMode;
    use crate::operations::mocks::{MockResolver, MockWorksheet, Write};
    use serde_json::json;

    const KEY: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";

    fn service() -> SheetService {
        SheetService::new(&SheetsConfig::default())
    }

    fn request(operation: Option<&str>, cell_range: &str, data: Option<&str>) -> SheetRequest {
        SheetRequest {
            operation: operation.map(str::to_string),
            cell_range: cell_range.to_string(),
            data: data.map(str::to_string),
            ..SheetRequest::new(KEY, "{}")
        }
    }

    async fn execute_against(
        resolver: &MockResolver,
        branch: Option<Operation>,
        request: &SheetRequest,
    ) -> Envelope {
        let service = service();
        let result = match service.plan(branch, request) {
            Ok((_, action)) => service.execute(resolver, request, action).await,
            Err(e) => Err(e),
        };
        service.respond(result)
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let request = SheetRequest::new("Budget", r#"{"private_key": "secret"}"#);
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_blank_worksheet_defaults() {
        let mut request = SheetRequest::new("Budget", "{}");
        request.worksheet_name = "  ".to_string();
        assert_eq!(request.worksheet_name(), "Sheet1");
        request.worksheet_name = "Data".to_string();
        assert_eq!(request.worksheet_name(), "Data");
    }

    #[test]
    fn test_plan_defaults_to_read() {
        let (operation, _) = service().plan(None, &request(None, "A1", None)).unwrap();
        assert_eq!(operation, Operation::Read);
        let (operation, _) = service().plan(None, &request(Some(""), "A1", None)).unwrap();
        assert_eq!(operation, Operation::Read);
    }

    // The following fail during planning, before any credential is used, so
    // the bogus "{}" key never reaches the network.

    #[tokio::test]
    async fn test_unknown_operation() {
        let envelope = service().run(&request(Some("delete"), "A1", None)).await;
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "status": "error",
                "error": "Invalid operation 'delete'. Allowed operations: read, update, append"
            })
        );
    }

    #[tokio::test]
    async fn test_operation_mismatch() {
        let envelope = service()
            .invoke(Operation::Update, &request(Some("read"), "A1", Some("x")))
            .await;
        assert_eq!(
            envelope,
            Envelope::Error {
                error: "Operation mismatch: expected 'update', got 'read'".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_data() {
        let envelope = service()
            .invoke(Operation::Append, &request(None, "A1", None))
            .await;
        assert_eq!(
            envelope,
            Envelope::Error {
                error: "No data provided for append operation".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_credentials() {
        let mut request = request(Some("read"), "A1", None);
        request.service_account_json = "not json".to_string();
        let envelope = service().run(&request).await;
        match envelope {
            Envelope::Error { error } => assert!(
                error.starts_with("Failed to set up Google Sheets client: Authentication error:"),
                "unexpected error: {error}"
            ),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_by_key() {
        let worksheet = MockWorksheet::with_rows(vec![vec![json!("a"), json!("b")]]);
        let resolver = MockResolver::new(SheetIdentifier::Key(KEY.to_string()), worksheet);

        let envelope =
            execute_against(&resolver, None, &request(Some("READ"), "A1:B1", None)).await;

        assert_eq!(
            envelope,
            Envelope::Data {
                data: json!([["a", "b"]])
            }
        );
        assert_eq!(
            *resolver.opened.lock().unwrap(),
            vec![SheetIdentifier::Key(KEY.to_string())]
        );
    }

    #[tokio::test]
    async fn test_opens_short_identifier_by_name() {
        let resolver = MockResolver::new(
            SheetIdentifier::Name("Budget".to_string()),
            MockWorksheet::default(),
        );
        let mut request = request(None, "A1", None);
        request.sheet_identifier = "Budget".to_string();

        let envelope = execute_against(&resolver, Some(Operation::Read), &request).await;
        assert_eq!(envelope, Envelope::Data { data: json!(null) });
    }

    #[tokio::test]
    async fn test_spreadsheet_not_found() {
        let resolver = MockResolver::new(
            SheetIdentifier::Name("Other".to_string()),
            MockWorksheet::default(),
        );
        let envelope = execute_against(&resolver, None, &request(None, "A1", None)).await;
        assert_eq!(
            envelope,
            Envelope::Error {
                error: format!(
                    "Spreadsheet '{}' not found. Make sure it's shared with the service account.",
                    KEY
                )
            }
        );
    }

    #[tokio::test]
    async fn test_worksheet_not_found() {
        let resolver = MockResolver::new(
            SheetIdentifier::Key(KEY.to_string()),
            MockWorksheet::default(),
        );
        let mut request = request(None, "A1", None);
        request.worksheet_name = "Responses".to_string();

        let envelope = execute_against(&resolver, None, &request).await;
        assert_eq!(
            envelope,
            Envelope::Error {
                error: "Worksheet 'Responses' not found.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_range_json_writes_nothing() {
        let worksheet = MockWorksheet::default();
        let resolver = MockResolver::new(SheetIdentifier::Key(KEY.to_string()), worksheet);

        let envelope = execute_against(
            &resolver,
            Some(Operation::Update),
            &request(None, "A1:B2", Some("[[1, 2]")),
        )
        .await;

        assert_eq!(
            envelope,
            Envelope::Error {
                error: "For range updates, data must be valid JSON format".to_string()
            }
        );
        assert!(resolver.opened.lock().unwrap().is_empty());
        assert!(resolver.worksheet.writes().is_empty());
    }

    #[tokio::test]
    async fn test_append_through_pipeline() {
        let worksheet = MockWorksheet::with_rows(vec![vec![json!("Header")]]);
        let resolver = MockResolver::new(SheetIdentifier::Key(KEY.to_string()), worksheet);

        let envelope = execute_against(
            &resolver,
            None,
            &request(Some("append"), "A1", Some(r#"[{"a": 1, "b": 2}]"#)),
        )
        .await;

        assert_eq!(
            envelope,
            Envelope::Message {
                message: "Successfully appended 1 row(s) starting from column A".to_string()
            }
        );
        assert_eq!(
            resolver.worksheet.writes(),
            vec![Write::Range(
                "A2:B2".to_string(),
                vec![vec![json!(1), json!(2)]]
            )]
        );
    }

    #[tokio::test]
    async fn test_native_append_config() {
        let service = SheetService::new(&SheetsConfig {
            append: AppendMode::Native,
            ..Default::default()
        });
        let resolver = MockResolver::new(
            SheetIdentifier::Key(KEY.to_string()),
            MockWorksheet::default(),
        );
        let request = request(None, "A1", Some("[[1]]"));

        let (_, action) = service.plan(Some(Operation::Append), &request).unwrap();
        let outcome = service.execute(&resolver, &request, action).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Message("Successfully appended 1 row(s)".to_string())
        );
        assert_eq!(
            resolver.worksheet.writes(),
            vec![Write::Append(vec![vec![json!(1)]])]
        );
    }
}
