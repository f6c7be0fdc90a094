//! Resend email provider
//!
//! Sends emails via the Resend HTTP API with bearer-token auth.

use crate::config::ResendCredentials;
use crate::models::OutboundMessage;
use crate::provider::{response_error, success_payload, EmailProvider};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Resend API endpoint
const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend email provider
pub struct ResendProvider {
    credentials: ResendCredentials,
    endpoint: String,
    client: Client,
}

impl ResendProvider {
    pub fn new(credentials: ResendCredentials, client: Client) -> Self {
        Self {
            credentials,
            endpoint: RESEND_API_URL.to_string(),
            client,
        }
    }

    /// Point the provider at a different API URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl<'a> ResendRequest<'a> {
    fn from_message(message: &'a OutboundMessage) -> Self {
        Self {
            from: &message.from,
            to: message.to.addresses(),
            subject: &message.subject,
            html: message.html.as_deref(),
            text: message.text.as_deref(),
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    fn is_configured(&self) -> bool {
        !self.credentials.api_key.trim().is_empty()
    }

    async fn attempt(&self, message: &OutboundMessage) -> Result<Value> {
        let request = ResendRequest::from_message(message);

        debug!(to = %message.to, subject = %message.subject, "Sending email via Resend");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.credentials.api_key)
            .json(&request)
            .send()
            .await
            .wrap_err("Resend request failed")?;

        if !response.status().is_success() {
            return Err(response_error("Resend", response).await);
        }

        let payload = success_payload(response).await;
        debug!(payload = %payload, "Resend accepted email");
        Ok(payload)
    }
}
