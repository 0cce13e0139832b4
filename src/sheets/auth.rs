use crate::error::{AppError, Result};
use hyper_util::client::legacy::connect::HttpConnector;
use std::env;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, instrument};
use yup_oauth2::{
    ServiceAccountAuthenticator, ServiceAccountKey, authenticator::Authenticator,
    hyper_rustls::HttpsConnector,
};

/// Spreadsheet feed and Drive access, needed to open sheets by name.
pub(crate) const AUTH_SCOPES: [&str; 2] = [
    "https://spreadsheets.google.com/feeds",
    "https://www.googleapis.com/auth/drive",
];

pub(super) type AuthType = Authenticator<HttpsConnector<HttpConnector>>;

/// Create and verify authenticator by fetching a token
#[instrument(name = "Authenticating service account", skip_all)]
pub(super) async fn create_and_verify_authenticator(service_account_json: &str) -> Result<AuthType> {
    let key = read_service_account_key(service_account_json).await?;

    let auth = ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))?;

    // Rejected key material only shows up once a token is requested
    let _token = auth
        .token(&AUTH_SCOPES)
        .await
        .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

    log_client_email(service_account_json);

    Ok(auth)
}

async fn read_service_account_key(service_account_json: &str) -> Result<ServiceAccountKey> {
    read_service_account_key_in(&env::temp_dir(), service_account_json).await
}

/// Parse the key through a private temporary file in `dir` that is gone by
/// the time this returns, whether or not parsing succeeded.
async fn read_service_account_key_in(dir: &Path, service_account_json: &str) -> Result<ServiceAccountKey> {
    let file = materialize_in(dir, service_account_json)?;
    yup_oauth2::read_service_account_key(file.path())
        .await
        .map_err(|e| AppError::Auth(format!("Invalid service account JSON: {}", e)))
}

fn materialize_in(dir: &Path, service_account_json: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("service-account-")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(|e| AppError::Auth(format!("Failed to create credential file: {}", e)))?;

    file.write_all(service_account_json.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| AppError::Auth(format!("Failed to write credential file: {}", e)))?;

    Ok(file)
}

fn client_email(service_account_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(service_account_json).ok()?;
    value
        .get("client_email")
        .and_then(|email| email.as_str())
        .map(str::to_string)
}

fn log_client_email(service_account_json: &str) {
    match client_email(service_account_json) {
        Some(email) => info!(email = %email, "Authenticated with service account"),
        None => info!("Authenticated with service account (email unknown)"),
    }
}
