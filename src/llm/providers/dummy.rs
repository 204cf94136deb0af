//! Dummy LLM provider — echoes the request text back prefixed with `[echo]`.
//! Used for offline runs and tests; can be told to fail with a fixed kind.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::llm::{CompletionRequest, GatewayError, GatewayErrorKind};
use crate::session::Role;

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    /// Shared between clones so a test can keep a handle and inspect it.
    calls: Arc<AtomicUsize>,
    /// History of the most recent request as `(role, text)` pairs.
    last_history: Arc<Mutex<Vec<(Role, String)>>>,
    fail_with: Option<GatewayErrorKind>,
}

impl DummyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every call fails with `kind`.
    pub fn failing(kind: GatewayErrorKind) -> Self {
        Self { fail_with: Some(kind), ..Self::default() }
    }

    /// Number of `complete` calls made so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prior turns passed with the most recent `complete` call, oldest first.
    /// Empty before the first call.
    pub fn last_history(&self) -> Vec<(Role, String)> {
        self.last_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let history = request.history.iter().map(|t| (t.role(), t.text().to_string())).collect();
        if let Ok(mut last) = self.last_history.lock() {
            *last = history;
        }
        if let Some(kind) = self.fail_with {
            return Err(GatewayError::new(kind, "dummy provider configured to fail"));
        }
        let mut reply = format!("[echo] {}", request.text);
        if let Some(image) = request.image {
            reply.push_str(&format!(" [image {} {} bytes]", image.mime_type, image.data.len()));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImagePayload;
    use crate::session::Turn;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider::new();
        let reply = p.complete(&CompletionRequest::new("hello")).await.unwrap();
        assert_eq!(reply, "[echo] hello");
    }

    #[tokio::test]
    async fn complete_mentions_image() {
        let p = DummyProvider::new();
        let img = ImagePayload::new("image/jpeg", vec![0; 4]);
        let reply = p.complete(&CompletionRequest::new("where").with_image(&img)).await.unwrap();
        assert_eq!(reply, "[echo] where [image image/jpeg 4 bytes]");
    }

    #[tokio::test]
    async fn records_history_of_last_call() {
        let p = DummyProvider::new();
        let handle = p.clone();
        let turns = vec![Turn::new(Role::User, "Hi"), Turn::new(Role::Assistant, "Hello")];
        p.complete(&CompletionRequest::new("next").with_history(&turns)).await.unwrap();
        assert_eq!(
            handle.last_history(),
            vec![(Role::User, "Hi".to_string()), (Role::Assistant, "Hello".to_string())]
        );

        p.complete(&CompletionRequest::new("again")).await.unwrap();
        assert!(handle.last_history().is_empty());
    }

    #[tokio::test]
    async fn failing_provider_counts_calls() {
        let p = DummyProvider::failing(GatewayErrorKind::RateLimit);
        let handle = p.clone();
        let err = p.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::RateLimit);
        assert_eq!(handle.calls(), 1);
    }
}
