//! Generative-text "oracle" adapter.
//!
//! The backend trait mirrors the storage trait shape: object-safe, boxed
//! futures, a concrete REST implementation behind it. Failures never reach
//! the routes as errors; the service layer converts them into user-visible
//! oracle responses.

pub mod gemini;

use futures::future::BoxFuture;
use thiserror::Error;

/// Result alias for oracle backend operations.
pub type OracleResult<T> = Result<T, OracleError>;

/// Failures that can occur while talking to the generative-text provider.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Building the HTTP client failed.
    #[error("failed to build oracle client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send oracle request to `{path}`")]
    RequestSend {
        /// API path the request targeted.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The provider returned an unexpected status code.
    #[error("unexpected oracle response status {status} for `{path}`")]
    RequestStatus {
        /// API path the request targeted.
        path: String,
        /// Status returned by the provider.
        status: reqwest::StatusCode,
    },
    /// Response payload could not be parsed.
    #[error("failed to decode oracle response for `{path}`")]
    DecodeResponse {
        /// API path the request targeted.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered without any generated text.
    #[error("oracle returned an empty response")]
    EmptyResponse,
}

/// One entry of the provider's model list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier, without any provider prefix.
    pub name: String,
    /// Whether the model supports text generation.
    pub supports_generation: bool,
}

/// Abstraction over the generative-text provider.
pub trait OracleBackend: Send + Sync {
    /// List the models currently offered by the provider.
    fn list_models(&self) -> BoxFuture<'static, OracleResult<Vec<ModelInfo>>>;
    /// Generate a plain-text response from a single string prompt.
    fn generate(&self, model: &str, prompt: &str) -> BoxFuture<'static, OracleResult<String>>;
}
