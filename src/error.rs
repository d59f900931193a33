use reqwest::StatusCode;

/// Failure to retrieve one offer page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
}

/// Failure to replace the destination sheet's contents.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("service account key rejected: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("invalid sheets url: {0}")]
    Url(#[from] url::ParseError),
}

/// Missing or malformed configuration, detected before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("GOOGLE_CREDENTIALS_JSON is not a service account key: {0}")]
    InvalidCredentials(#[from] serde_json::Error),
    #[error("invalid source url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
