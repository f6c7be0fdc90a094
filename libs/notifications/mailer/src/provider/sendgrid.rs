//! SendGrid email provider
//!
//! Sends emails via SendGrid HTTP API.

use crate::config::SendGridCredentials;
use crate::models::OutboundMessage;
use crate::provider::{response_error, EmailProvider};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// SendGrid API endpoint
const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid email provider
pub struct SendGridProvider {
    credentials: SendGridCredentials,
    endpoint: String,
    client: Client,
}

impl SendGridProvider {
    pub fn new(credentials: SendGridCredentials, client: Client) -> Self {
        Self {
            credentials,
            endpoint: SENDGRID_API_URL.to_string(),
            client,
        }
    }

    /// Point the provider at a different API URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// SendGrid API request payload
#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

impl<'a> SendGridRequest<'a> {
    fn from_message(message: &'a OutboundMessage) -> Result<Self> {
        // SendGrid requires text/plain before text/html
        let mut content = Vec::new();

        if let Some(text) = &message.text {
            content.push(Content {
                content_type: "text/plain",
                value: text,
            });
        }

        if let Some(html) = &message.html {
            content.push(Content {
                content_type: "text/html",
                value: html,
            });
        }

        if content.is_empty() {
            return Err(eyre!("Email must have text or HTML content"));
        }

        Ok(Self {
            personalizations: vec![Personalization {
                to: message
                    .to
                    .addresses()
                    .into_iter()
                    .map(|email| EmailAddress { email })
                    .collect(),
            }],
            from: EmailAddress {
                email: &message.from,
            },
            subject: &message.subject,
            content,
        })
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    fn is_configured(&self) -> bool {
        !self.credentials.api_key.trim().is_empty()
    }

    async fn attempt(&self, message: &OutboundMessage) -> Result<Value> {
        let request = SendGridRequest::from_message(message)?;

        debug!(to = %message.to, subject = %message.subject, "Sending email via SendGrid");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.credentials.api_key)
            .json(&request)
            .send()
            .await
            .wrap_err("SendGrid request failed")?;

        let status = response.status();

        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => eyre!("SendGrid rate limit exceeded"),
                401 | 403 => eyre!("SendGrid authentication failed ({})", status),
                _ => response_error("SendGrid", response).await,
            });
        }

        // SendGrid answers 202 with an empty body and the ID in X-Message-Id
        let message_id = response
            .headers()
            .get("X-Message-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        debug!(message_id = ?message_id, "SendGrid accepted email");

        Ok(json!({
            "statusCode": status.as_u16(),
            "messageId": message_id,
        }))
    }
}
