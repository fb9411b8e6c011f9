//! REST backend for a Gemini-style generative language API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ModelInfo, OracleBackend, OracleError, OracleResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Generation method a model must advertise to be usable as the oracle.
const GENERATE_METHOD: &str = "generateContent";

/// Client for the provider's `v1beta` REST surface.
#[derive(Clone)]
pub struct GeminiOracle {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl GeminiOracle {
    /// Build a client for the given API key.
    pub fn new(api_key: impl Into<String>) -> OracleResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Build a client against a non-default endpoint (used by test doubles).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> OracleResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| OracleError::ClientBuilder { source })?;
        Ok(Self {
            client,
            base_url: Arc::<str>::from(base_url.as_ref().trim_end_matches('/')),
            api_key: Arc::<str>::from(api_key.into()),
        })
    }

    /// Build a client from the `STUDY_OS_GEMINI_API_KEY` environment
    /// variable; `None` when no credential is configured.
    pub fn from_env() -> Option<OracleResult<Self>> {
        let api_key = std::env::var("STUDY_OS_GEMINI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        match std::env::var("STUDY_OS_GEMINI_BASE_URL") {
            Ok(base_url) => Some(Self::with_base_url(api_key, base_url)),
            Err(_) => Some(Self::new(api_key)),
        }
    }

    async fn get_models(&self) -> OracleResult<Vec<ModelInfo>> {
        const PATH: &str = "v1beta/models";
        let url = format!("{}/{PATH}", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_ref())])
            .send()
            .await
            .map_err(|source| OracleError::RequestSend {
                path: PATH.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(OracleError::RequestStatus {
                path: PATH.to_string(),
                status: response.status(),
            });
        }

        let payload =
            response
                .json::<ListModelsResponse>()
                .await
                .map_err(|source| OracleError::DecodeResponse {
                    path: PATH.to_string(),
                    source,
                })?;

        Ok(payload
            .models
            .into_iter()
            .map(|model| ModelInfo {
                name: strip_prefix(&model.name),
                supports_generation: model
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_METHOD),
            })
            .collect())
    }

    async fn generate_text(&self, model: &str, prompt: &str) -> OracleResult<String> {
        let path = format!("v1beta/models/{model}:generateContent");
        let url = format!("{}/{path}", self.base_url);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_ref())])
            .json(&body)
            .send()
            .await
            .map_err(|source| OracleError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(OracleError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        let payload = response
            .json::<GenerateResponse>()
            .await
            .map_err(|source| OracleError::DecodeResponse {
                path: path.clone(),
                source,
            })?;

        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or(OracleError::EmptyResponse)
    }
}

/// Model identifiers come back as "models/<name>"; keep only the name.
fn strip_prefix(name: &str) -> String {
    name.strip_prefix("models/").unwrap_or(name).to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl OracleBackend for GeminiOracle {
    fn list_models(&self) -> BoxFuture<'static, OracleResult<Vec<ModelInfo>>> {
        let oracle = self.clone();
        Box::pin(async move { oracle.get_models().await })
    }

    fn generate(&self, model: &str, prompt: &str) -> BoxFuture<'static, OracleResult<String>> {
        let oracle = self.clone();
        let model = model.to_string();
        let prompt = prompt.to_string();
        Box::pin(async move { oracle.generate_text(&model, &prompt).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_lose_the_provider_prefix() {
        assert_eq!(strip_prefix("models/gemini-1.5-flash"), "gemini-1.5-flash");
        assert_eq!(strip_prefix("gemini-1.5-flash"), "gemini-1.5-flash");
    }

    #[test]
    fn model_list_decodes_capability_flags() {
        let payload = r#"{
            "models": [
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}
            ]
        }"#;
        let parsed: ListModelsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.models.len(), 2);
        assert!(parsed.models[0]
            .supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_METHOD));
    }

    #[test]
    fn generation_response_yields_first_candidate_text() {
        let payload = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "The stars align."}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(payload).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text);
        assert_eq!(text.as_deref(), Some("The stars align."));
    }
}
