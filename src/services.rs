use crate::config::{Config, MalformedResponsePolicy};
use crate::enrichment::{
    build_prompt, parse_model_output, response_schema, LeadEnricher, SYSTEM_INSTRUCTION,
};
use crate::errors::AppError;
use crate::models::EnrichmentResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

// ============ Gemini wire types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated. `None` when there is no text at all.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    code: u16,
    message: String,
}

// ============ Client ============

/// Gemini `generateContent` client used as the lead enricher.
#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    malformed_policy: MalformedResponsePolicy,
}

impl GeminiService {
    /// Builds the client from configuration. No timeout is set unless
    /// `gemini_timeout_secs` is configured.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.gemini_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create Gemini client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
            malformed_policy: config.malformed_policy,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(raw_text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: build_prompt(raw_text),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }

    /// Sends one completion request and returns the model's raw text answer.
    pub async fn generate(&self, raw_text: &str) -> Result<Option<String>, AppError> {
        let url = self.endpoint();
        tracing::info!("Requesting enrichment from {}", self.model);
        tracing::debug!("Gemini URL: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(raw_text))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let (code, message) = serde_json::from_str::<GeminiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!("Gemini returned error {}: {}", code, message);
            return Err(AppError::ExternalApiError(format!(
                "Gemini returned status {}: {}",
                code, message
            )));
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(envelope.text())
    }
}

#[async_trait]
impl LeadEnricher for GeminiService {
    async fn enrich(&self, raw_text: &str) -> Result<EnrichmentResult, AppError> {
        let text = self.generate(raw_text).await?;
        parse_model_output(text.as_deref(), self.malformed_policy)
    }
}
