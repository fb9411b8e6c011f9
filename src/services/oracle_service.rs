use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    dto::oracle::{OracleRequest, OracleResponse},
    error::ServiceError,
    oracle::OracleBackend,
    state::SharedState,
};

/// Answer given when no provider credential is configured.
const NOT_CONFIGURED: &str =
    "The oracle is silent; no seer has been summoned to this realm.";
/// Answer given when the provider call fails.
const PROVIDER_FAILED: &str =
    "The oracle's vision is clouded; ask again later.";

/// Framing put in front of every question.
const PERSONA_PREAMBLE: &str =
    "You are a wise oracle watching over diligent students. \
     Answer briefly and a little mysteriously. Question: ";

/// Models tried in order when picking one at first use.
const PREFERRED_MODELS: [&str; 3] = ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];
/// Model used when discovery fails or matches nothing.
const FALLBACK_MODEL: &str = "gemini-1.5-flash";

/// Put a question to the oracle.
///
/// Provider failures are folded into the answer text: the player always gets
/// a themed reply, never a 5xx. Only an empty question is a caller error.
pub async fn ask(
    state: &SharedState,
    request: OracleRequest,
) -> Result<OracleResponse, ServiceError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ServiceError::InvalidInput("the question must not be blank".into()));
    }

    let Some(backend) = state.oracle() else {
        return Ok(OracleResponse {
            model: None,
            answer: NOT_CONFIGURED.to_string(),
        });
    };

    let model = state
        .oracle_model()
        .get_or_init(|| select_model(backend.clone()))
        .await
        .clone();

    let prompt = format!("{PERSONA_PREAMBLE}{question}");
    match backend.generate(&model, &prompt).await {
        Ok(answer) => Ok(OracleResponse {
            model: Some(model),
            answer,
        }),
        Err(err) => {
            warn!(error = %err, model, "oracle call failed");
            Ok(OracleResponse {
                model: Some(model),
                answer: PROVIDER_FAILED.to_string(),
            })
        }
    }
}

/// Pick the model once per process: the first preferred model the provider
/// actually offers for generation, or the fallback when discovery fails.
async fn select_model(backend: Arc<dyn OracleBackend>) -> String {
    match backend.list_models().await {
        Ok(models) => {
            let generating: Vec<&str> = models
                .iter()
                .filter(|model| model.supports_generation)
                .map(|model| model.name.as_str())
                .collect();
            let selected = PREFERRED_MODELS
                .iter()
                .find(|preferred| generating.contains(preferred))
                .copied()
                .or_else(|| generating.first().copied())
                .unwrap_or(FALLBACK_MODEL);
            info!(model = selected, "oracle model selected");
            selected.to_string()
        }
        Err(err) => {
            warn!(error = %err, fallback = FALLBACK_MODEL, "model discovery failed");
            FALLBACK_MODEL.to_string()
        }
    }
}
