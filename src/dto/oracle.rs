use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Free-text question for the oracle.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OracleRequest {
    /// The question; blank questions are rejected before any call is made.
    #[validate(length(min = 1, max = 500))]
    pub question: String,
}

/// Oracle answer. Failures are folded into `answer`, never surfaced as errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct OracleResponse {
    /// Model that produced the answer, when one was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// The response text, or a user-visible failure notice.
    pub answer: String,
}
