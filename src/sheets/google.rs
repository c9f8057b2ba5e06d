//! Implements the `Sheet` trait with the Google Sheets v4 REST API.
//!
//! Requests are authenticated with a service account: the key file is loaded once at startup and
//! `yup_oauth2` caches and refreshes the access token.

use std::{path::Path, time::Duration};

use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};
use yup_oauth2::{ServiceAccountAuthenticator, authenticator::DefaultAuthenticator};

use super::{Row, Sheet, SheetError, first_column};

/// The OAuth scope that grants read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// A client for one Google spreadsheet.
pub struct GoogleSheet {
    client: Client,
    authenticator: DefaultAuthenticator,
    spreadsheet_id: String,
    timeout: Duration,
}

impl GoogleSheet {
    /// Create a client for the spreadsheet `spreadsheet_id` using the service account key file
    /// at `service_account_key`.
    ///
    /// `timeout` bounds every request to the service, including fetching access tokens.
    ///
    /// # Errors
    /// Returns [SheetError::Auth] if the key file cannot be read or the authenticator cannot be
    /// built, and [SheetError::Request] if the HTTP client cannot be built.
    pub async fn new(
        spreadsheet_id: &str,
        service_account_key: &Path,
        timeout: Duration,
    ) -> Result<Self, SheetError> {
        let key = yup_oauth2::read_service_account_key(service_account_key)
            .await
            .map_err(|error| {
                SheetError::Auth(format!(
                    "could not read service account key {}: {error}",
                    service_account_key.display()
                ))
            })?;

        let authenticator = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|error| SheetError::Auth(error.to_string()))?;

        let client = Client::builder().timeout(timeout).build()?;

        debug!("Created Google Sheets client for spreadsheet {spreadsheet_id}");

        Ok(Self {
            client,
            authenticator,
            spreadsheet_id: spreadsheet_id.to_owned(),
            timeout,
        })
    }

    async fn access_token(&self) -> Result<String, SheetError> {
        let token = tokio::time::timeout(
            self.timeout,
            self.authenticator.token(&[SPREADSHEETS_SCOPE]),
        )
        .await
        .map_err(|_| SheetError::Timeout)?
        .map_err(|error| SheetError::Auth(error.to_string()))?;

        token
            .token()
            .map(str::to_owned)
            .ok_or_else(|| SheetError::Auth("no access token was issued".to_owned()))
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn create_sheet(&self, title: &str) -> Result<(), SheetError> {
        trace!("create_sheet {title}");
        let url = spreadsheet_url(&self.spreadsheet_id, ":batchUpdate")?;
        let body = json!({
            "requests": [
                { "addSheet": { "properties": { "title": title } } }
            ]
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token().await?)
            .json(&body)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    async fn append_rows(&self, range: &str, rows: &[Row]) -> Result<(), SheetError> {
        trace!("append_rows {} rows to {range}", rows.len());
        let mut url = values_url(&self.spreadsheet_id, range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token().await?)
            .json(&json!({ "values": rows }))
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    async fn read_column(&self, range: &str) -> Result<Vec<String>, SheetError> {
        trace!("read_column {range}");
        let url = values_url(&self.spreadsheet_id, range, "")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token().await?)
            .send()
            .await?;

        let value_range: ValueRange = check_status(response)
            .await?
            .json()
            .await
            .map_err(|error| SheetError::Request(format!("malformed value range: {error}")))?;

        Ok(first_column(&value_range.values))
    }
}

/// The subset of the API's `ValueRange` resource that is read back.
///
/// The API omits `values` entirely when the range is empty.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

async fn check_status(response: Response) -> Result<Response, SheetError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_owned());

    Err(SheetError::Status {
        status: status.as_u16(),
        body,
    })
}

/// `https://sheets.googleapis.com/v4/spreadsheets/{id}{method}`, e.g. `{id}:batchUpdate`.
fn spreadsheet_url(spreadsheet_id: &str, method: &str) -> Result<Url, SheetError> {
    build_url(&[&format!("{spreadsheet_id}{method}")])
}

/// `https://sheets.googleapis.com/v4/spreadsheets/{id}/values/{range}{method}`.
fn values_url(spreadsheet_id: &str, range: &str, method: &str) -> Result<Url, SheetError> {
    build_url(&[spreadsheet_id, "values", &format!("{range}{method}")])
}

fn build_url(segments: &[&str]) -> Result<Url, SheetError> {
    let mut url = Url::parse(SHEETS_API).map_err(|error| SheetError::Request(error.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| SheetError::Request(format!("{SHEETS_API} cannot be a base URL")))?
        .extend(segments);

    Ok(url)
}
