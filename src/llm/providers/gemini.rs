//! Google Gemini `generateContent` provider.
//!
//! `POST {api_base_url}/models/{model}:generateContent` with the key in the
//! `x-goog-api-key` header. Prior turns become `contents` entries ahead of
//! the new request (`user` / `model` roles); an attached image travels as a
//! base64 `inline_data` part next to the instruction text. All Gemini wire
//! types are private to this module.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::config::GeminiConfig;
use crate::credential::Credential;
use crate::error::AppError;
use crate::llm::{CompletionRequest, GatewayError, GatewayErrorKind};
use crate::session::Role;

/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    credential: Credential,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig, credential: Credential) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/models/{}:generateContent", config.api_base_url, config.model),
            model: config.model.clone(),
            temperature: config.temperature,
            credential,
        })
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        let payload = build_payload(request, self.temperature);

        debug!(
            model = %self.model,
            history = request.history.len(),
            image = request.image.is_some(),
            text_len = request.text.len(),
            "sending Gemini request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            // Image bytes are elided; the key is in a header and never serialised.
            trace!(text = %request.text, "Gemini request text");
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.credential.expose())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.endpoint, error = %e, "Gemini HTTP request failed (transport)");
                GatewayError::new(GatewayErrorKind::Network, e.to_string())
            })?;

        let response = check_status(response).await?;

        let body = response.text().await.map_err(|e| {
            GatewayError::new(GatewayErrorKind::Network, format!("failed to read body: {e}"))
        })?;
        trace!(body = %body, "Gemini response body");

        extract_text(&body)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn build_payload<'a>(request: &CompletionRequest<'a>, default_temperature: f32) -> GenerateContentRequest<'a> {
    let mut contents: Vec<Content<'a>> = request
        .history
        .iter()
        .map(|&turn| Content {
            role: wire_role(turn.role()),
            parts: vec![Part::Text { text: turn.text() }],
        })
        .collect();

    let mut parts = vec![Part::Text { text: request.text }];
    if let Some(image) = request.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: &image.mime_type,
                data: STANDARD.encode(&image.data),
            },
        });
    }
    contents.push(Content { role: "user", parts });

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: request.temperature.unwrap_or(default_temperature),
        },
    }
}

fn classify_status(status: StatusCode, message: &str) -> GatewayErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayErrorKind::Auth,
        // Gemini reports a bad key as 400 INVALID_ARGUMENT.
        StatusCode::BAD_REQUEST if message.contains("API key") => GatewayErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => GatewayErrorKind::RateLimit,
        s if s.is_server_error() => GatewayErrorKind::Network,
        _ => GatewayErrorKind::InvalidResponse,
    }
}

/// Consume the response and return it if successful, or a classified error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => match env.error.status {
            Some(s) => format!("HTTP {status} [{s}]: {}", env.error.message),
            None => format!("HTTP {status}: {}", env.error.message),
        },
        Err(_) => format!("HTTP {status}: {body}"),
    };

    let kind = classify_status(status, &message);
    error!(%status, ?kind, %message, "Gemini request returned HTTP error");
    Err(GatewayError::new(kind, message))
}

fn extract_text(body: &str) -> Result<String, GatewayError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "failed to deserialize Gemini response");
        GatewayError::new(GatewayErrorKind::InvalidResponse, format!("failed to parse response body: {e}"))
    })?;

    debug!(candidates = parsed.candidates.len(), "received Gemini response");

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            GatewayError::new(GatewayErrorKind::InvalidResponse, "empty or missing text in response")
        })
}
