use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::Publisher;
use crate::config::Destination;
use crate::error::PublishError;
use crate::record::OfferRecord;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_MINUTES: i64 = 60;

/// Grid size of a freshly created tab.
const NEW_TAB_ROWS: usize = 1000;
const NEW_TAB_COLUMNS: usize = 9;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

/// The fields of a Google service account key file that signing needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    fn claims(&self, now: DateTime<Utc>) -> Claims<'_> {
        Claims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(TOKEN_LIFETIME_MINUTES)).timestamp(),
        }
    }

    /// Signed JWT exchanged for an OAuth access token.
    fn assertion(&self, now: DateTime<Utc>) -> Result<String, PublishError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)?)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// A1 notation for a whole tab. Quotes inside the name are doubled.
fn tab_range(tab_name: &str) -> String {
    format!("'{}'", tab_name.replace('\'', "''"))
}

fn add_tab_request(tab_name: &str) -> serde_json::Value {
    json!({
        "requests": [{
            "addSheet": {
                "properties": {
                    "title": tab_name,
                    "gridProperties": {
                        "rowCount": NEW_TAB_ROWS,
                        "columnCount": NEW_TAB_COLUMNS,
                    }
                }
            }
        }]
    })
}

fn value_range(tab_name: &str, header: &[&str], records: &[OfferRecord]) -> ValueRange {
    let mut values = Vec::with_capacity(records.len() + 1);
    values.push(header.iter().map(|cell| cell.to_string()).collect());
    values.extend(records.iter().map(|record| record.to_row().to_vec()));
    ValueRange {
        range: format!("{}!A1", tab_range(tab_name)),
        major_dimension: "ROWS",
        values,
    }
}

async fn check(response: Response, operation: &'static str) -> Result<Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PublishError::Api {
        operation,
        status,
        body,
    })
}

/// Publishes to a Google Sheets spreadsheet as a service account.
#[derive(Clone, Debug)]
pub struct GoogleSheets {
    client: Client,
    key: ServiceAccountKey,
    api_base: Url,
}

impl GoogleSheets {
    pub fn new(key: ServiceAccountKey) -> Result<Self, PublishError> {
        Ok(GoogleSheets {
            client: Client::builder().build()?,
            key,
            api_base: Url::parse(SHEETS_API)?,
        })
    }

    /// Sends Sheets API calls under `api_base` instead of the public endpoint.
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    /// `api_base` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn access_token(&self) -> Result<String, PublishError> {
        let assertion = self.key.assertion(Utc::now())?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check(response, "token exchange").await?.json().await?;
        debug!(service_account = %self.key.client_email, "obtained access token");
        Ok(token.access_token)
    }

    async fn tab_exists(
        &self,
        token: &str,
        destination: &Destination,
    ) -> Result<bool, PublishError> {
        let mut url = self.endpoint(&[destination.spreadsheet_id.as_str()]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let spreadsheet: Spreadsheet = check(response, "spreadsheet lookup").await?.json().await?;
        Ok(spreadsheet
            .sheets
            .iter()
            .any(|sheet| sheet.properties.title == destination.tab_name))
    }

    async fn add_tab(&self, token: &str, destination: &Destination) -> Result<(), PublishError> {
        let url = self.endpoint(&[format!("{}:batchUpdate", destination.spreadsheet_id).as_str()]);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&add_tab_request(&destination.tab_name))
            .send()
            .await?;
        check(response, "add tab").await?;
        debug!(tab = %destination.tab_name, "created tab");
        Ok(())
    }

    async fn clear_tab(&self, token: &str, destination: &Destination) -> Result<(), PublishError> {
        let range = format!("{}:clear", tab_range(&destination.tab_name));
        let url = self.endpoint(&[destination.spreadsheet_id.as_str(), "values", range.as_str()]);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        check(response, "clear tab").await?;
        debug!(tab = %destination.tab_name, "cleared tab");
        Ok(())
    }

    async fn write_rows(
        &self,
        token: &str,
        destination: &Destination,
        body: &ValueRange,
    ) -> Result<(), PublishError> {
        let mut url = self.endpoint(&[destination.spreadsheet_id.as_str(), "values", body.range.as_str()]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        check(response, "write rows").await?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for GoogleSheets {
    async fn replace(
        &self,
        destination: &Destination,
        header: &[&str],
        records: &[OfferRecord],
    ) -> Result<(), PublishError> {
        let token = self.access_token().await?;
        if self.tab_exists(&token, destination).await? {
            self.clear_tab(&token, destination).await?;
        } else {
            self.add_tab(&token, destination).await?;
        }
        let body = value_range(&destination.tab_name, header, records);
        self.write_rows(&token, destination, &body).await?;
        info!(
            spreadsheet = %destination.spreadsheet_id,
            tab = %destination.tab_name,
            rows = records.len(),
            "published offers"
        );
        Ok(())
    }
}
