pub use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for talking to the triage API.
///
/// None of these are fatal: read paths absorb them into an empty result,
/// and mutation callers log and leave their form state untouched so the
/// user can retry manually.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request rejected with status {status}")]
    Rejected { status: StatusCode },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("websocket failure: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}
