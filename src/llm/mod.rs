//! Model gateway — one round-trip to a hosted completion model.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Each `complete` call is exactly one request: no retry, no streaming.

pub mod providers;

use std::fmt;

use thiserror::Error;

use crate::session::Turn;

// ── Error ─────────────────────────────────────────────────────────────────────

/// Coarse failure class of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Key rejected by the provider.
    Auth,
    RateLimit,
    /// Transport failure or provider-side outage.
    Network,
    /// Unexpected status, malformed body, or no text in the reply.
    InvalidResponse,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GatewayErrorKind::Auth => "authentication failed",
            GatewayErrorKind::RateLimit => "rate limited",
            GatewayErrorKind::Network => "network error",
            GatewayErrorKind::InvalidResponse => "invalid response",
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// Binary image attached to a multi-modal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { mime_type: mime_type.into(), data }
    }
}

/// Everything a provider needs for one call.
///
/// `history` holds the prior turns, oldest first; they are presented to the
/// model before `text` with their roles preserved.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest<'a> {
    pub text: &'a str,
    pub image: Option<&'a ImagePayload>,
    pub history: Vec<&'a Turn>,
    /// Overrides the provider's configured temperature.
    pub temperature: Option<f32>,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, ..Default::default() }
    }

    pub fn with_history(mut self, turns: impl IntoIterator<Item = &'a Turn>) -> Self {
        self.history = turns.into_iter().collect();
        self
    }

    pub fn with_image(mut self, image: &'a ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Gemini(providers::gemini::GeminiProvider),
}

impl LlmProvider {
    /// Send the request and return the model's text reply.
    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(request).await,
            LlmProvider::Gemini(p) => p.complete(request).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Gemini(_) => "gemini",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn error_display_includes_kind_and_message() {
        let e = GatewayError::new(GatewayErrorKind::Auth, "HTTP 401");
        assert_eq!(e.to_string(), "authentication failed: HTTP 401");
    }

    #[test]
    fn request_builder_keeps_history_order() {
        let turns = vec![Turn::new(Role::User, "a"), Turn::new(Role::Assistant, "b")];
        let img = ImagePayload::new("image/png", vec![1, 2, 3]);
        let req = CompletionRequest::new("c")
            .with_history(&turns)
            .with_image(&img)
            .with_temperature(0.5);
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[0].text(), "a");
        assert_eq!(req.history[1].role(), Role::Assistant);
        assert_eq!(req.image.map(|i| i.data.len()), Some(3));
        assert_eq!(req.temperature, Some(0.5));
    }
}
