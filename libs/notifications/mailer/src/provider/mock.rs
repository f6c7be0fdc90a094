//! Mock email provider for testing

use super::EmailProvider;
use crate::models::OutboundMessage;
use async_trait::async_trait;
use eyre::Result;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock provider that records every attempt.
///
/// Clones share state, so a test can keep one handle while the dispatcher
/// owns another.
#[derive(Clone)]
pub struct MockProvider {
    name: &'static str,
    configured: bool,
    failure_message: Option<String>,
    attempts: Arc<AtomicUsize>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl MockProvider {
    /// A configured provider that accepts everything
    pub fn succeeding(name: &'static str) -> Self {
        Self {
            name,
            configured: true,
            failure_message: None,
            attempts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A configured provider whose every attempt fails
    pub fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            failure_message: Some(message.into()),
            ..Self::succeeding(name)
        }
    }

    /// A provider with missing credentials
    pub fn unconfigured(name: &'static str) -> Self {
        Self {
            configured: false,
            ..Self::succeeding(name)
        }
    }

    /// Number of times `attempt` was called
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Messages accepted so far
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl EmailProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn attempt(&self, message: &OutboundMessage) -> Result<Value> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(failure) = &self.failure_message {
            return Err(eyre::eyre!("{}", failure));
        }

        self.sent.lock().await.push(message.clone());

        Ok(json!({ "id": format!("{}-{}", self.name, attempt) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;

    #[tokio::test]
    async fn test_mock_provider_records_message() {
        let provider = MockProvider::succeeding("resend");
        let message = Message::new("a@b.com", "Hi").with_text("Hello").resolve("me@b.com");

        let payload = provider.attempt(&message).await.unwrap();
        assert_eq!(payload["id"], "resend-1");
        assert_eq!(provider.sent_messages().await, vec![message]);
    }

    #[tokio::test]
    async fn test_mock_provider_fails_and_counts() {
        let provider = MockProvider::failing("sendgrid", "Simulated failure");
        let handle = provider.clone();
        let message = Message::new("a@b.com", "Hi").resolve("me@b.com");

        let err = provider.attempt(&message).await.unwrap_err();
        assert!(err.to_string().contains("Simulated failure"));
        assert_eq!(handle.attempts(), 1);
        assert_eq!(handle.sent_count().await, 0);
    }
}
