//! Email provider implementations

pub mod mailgun;
pub mod mock;
pub mod resend;
pub mod sendgrid;
pub mod smtp;

pub use mailgun::MailgunProvider;
pub use mock::MockProvider;
pub use resend::ResendProvider;
pub use sendgrid::SendGridProvider;
pub use smtp::SmtpProvider;

use crate::models::OutboundMessage;
use async_trait::async_trait;
use eyre::{eyre, Report, Result, WrapErr};
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// A single delivery path in the dispatcher's chain.
///
/// `attempt` reports every failure as an error; it must not panic. The
/// returned value is the provider's success payload and is passed to the
/// caller unchanged.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Provider name used in logs and results
    fn name(&self) -> &'static str;

    /// Whether every credential this provider needs is present
    fn is_configured(&self) -> bool;

    /// Try to deliver the message exactly once
    async fn attempt(&self, message: &OutboundMessage) -> Result<Value>;
}

/// Shared HTTP client for the API-based providers.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .wrap_err("Failed to build HTTP client")
}

/// Body of a 2xx response, or a small status object when it is not JSON.
pub(crate) async fn success_payload(response: Response) -> Value {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str(&body).unwrap_or_else(|_| json!({ "statusCode": status }))
}

/// Turn a non-2xx response into an error carrying a human-readable reason.
pub(crate) async fn response_error(provider: &str, response: Response) -> Report {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string());

    eyre!("{} API error ({}): {}", provider, status.as_u16(), detail)
}

/// Pull `message` (Resend, Mailgun) or `errors[0].message` (SendGrid) out of
/// an error body, falling back to the raw text.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| {
                value
                    .get("errors")
                    .and_then(|errors| errors.get(0))
                    .and_then(|first| first.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}
