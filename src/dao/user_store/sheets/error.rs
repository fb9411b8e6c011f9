//! Error types shared by the spreadsheet storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`SheetsApiError`] failures.
pub type SheetsResult<T> = Result<T, SheetsApiError>;

/// Failures that can occur while talking to the spreadsheet API.
#[derive(Debug, Error)]
pub enum SheetsApiError {
    /// Required environment variable is missing.
    #[error("missing spreadsheet environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build spreadsheet client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send spreadsheet request for `{range}`")]
    RequestSend {
        /// Cell range the request targeted.
        range: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The API signaled quota exhaustion (HTTP 429).
    #[error("spreadsheet API rate limited request for `{range}`")]
    RateLimited {
        /// Cell range the request targeted.
        range: String,
    },
    /// The API returned an unexpected status code.
    #[error("unexpected spreadsheet response status {status} for `{range}`")]
    RequestStatus {
        /// Cell range the request targeted.
        range: String,
        /// Status returned by the API.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode spreadsheet response for `{range}`")]
    DecodeResponse {
        /// Cell range the request targeted.
        range: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// A structured field could not be JSON-encoded into its cell.
    #[error("failed to encode a record field into its cell")]
    EncodeCell {
        /// Underlying serialization failure.
        #[source]
        source: serde_json::Error,
    },
}

impl From<SheetsApiError> for StorageError {
    fn from(err: SheetsApiError) -> Self {
        match err {
            SheetsApiError::RateLimited { ref range } => StorageError::RateLimited {
                message: format!("request for `{range}` hit the API quota"),
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
